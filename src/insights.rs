use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

/// One passed build plotted on the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildSample {
    #[serde(serialize_with = "serialize_iso_millis")]
    pub date: DateTime<Utc>,
    /// Minutes, may be fractional.
    pub duration: f64,
}

impl BuildSample {
    /// Start timestamp rendered as `2024-01-01T00:00:00.000Z`.
    pub fn iso_date(&self) -> String {
        self.date.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

fn serialize_iso_millis<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Snapshot of a loaded dashboard, used by the exporters.
#[derive(Debug, Serialize)]
pub struct BuildTimes {
    pub provider: String,
    pub repository: String,
    pub collected_at: DateTime<Utc>,
    pub total_builds: usize,
    pub stats: DurationStats,
    pub builds: Vec<BuildSample>,
}

impl BuildTimes {
    pub fn new(repository: &str, builds: Vec<BuildSample>) -> Self {
        Self {
            provider: "Travis CI".to_string(),
            repository: repository.to_string(),
            collected_at: Utc::now(),
            total_builds: builds.len(),
            stats: DurationStats::from_samples(&builds),
            builds,
        }
    }
}

/// Aggregate durations in minutes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DurationStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub duration_p50: f64,
    pub duration_p95: f64,
}

impl DurationStats {
    pub fn from_samples(samples: &[BuildSample]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sorted: Vec<f64> = samples.iter().map(|s| s.duration).collect();
        sorted.sort_by(f64::total_cmp);

        let len = sorted.len();
        #[allow(clippy::cast_precision_loss)]
        let mean = sorted.iter().sum::<f64>() / len as f64;

        Self {
            mean,
            min: sorted[0],
            max: sorted[len - 1],
            duration_p50: sorted[(len / 2).min(len - 1)],
            duration_p95: sorted[(len * 95 / 100).min(len - 1)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(date: &str, duration: f64) -> BuildSample {
        BuildSample {
            date: date.parse().unwrap(),
            duration,
        }
    }

    #[test]
    fn iso_date_uses_millisecond_precision_and_z_suffix() {
        let s = sample("2024-01-01T00:00:00Z", 1.0);
        assert_eq!(s.iso_date(), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn sample_serializes_date_as_iso_string() {
        let s = sample("2024-01-02T03:04:05Z", 2.5);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["date"], "2024-01-02T03:04:05.000Z");
        assert_eq!(json["duration"], 2.5);
    }

    mod duration_stats {
        use super::*;

        #[test]
        fn returns_zeros_for_no_samples() {
            assert_eq!(DurationStats::from_samples(&[]), DurationStats::default());
        }

        #[test]
        fn single_sample_fills_every_field() {
            let stats = DurationStats::from_samples(&[sample("2024-01-01T00:00:00Z", 4.0)]);
            assert_eq!(stats.mean, 4.0);
            assert_eq!(stats.min, 4.0);
            assert_eq!(stats.max, 4.0);
            assert_eq!(stats.duration_p50, 4.0);
            assert_eq!(stats.duration_p95, 4.0);
        }

        #[test]
        fn unsorted_durations_are_ranked() {
            let samples = [
                sample("2024-01-01T00:00:00Z", 5.0),
                sample("2024-01-02T00:00:00Z", 1.0),
                sample("2024-01-03T00:00:00Z", 3.0),
                sample("2024-01-04T00:00:00Z", 2.0),
                sample("2024-01-05T00:00:00Z", 4.0),
            ];
            let stats = DurationStats::from_samples(&samples);
            assert_eq!(stats.mean, 3.0);
            assert_eq!(stats.min, 1.0);
            assert_eq!(stats.max, 5.0);
            // len=5: p50_idx=2 (3.0), p95_idx=4 (5.0)
            assert_eq!(stats.duration_p50, 3.0);
            assert_eq!(stats.duration_p95, 5.0);
        }
    }

    #[test]
    fn build_times_counts_builds() {
        let report = BuildTimes::new("foo/bar", vec![sample("2024-01-01T00:00:00Z", 1.0)]);
        assert_eq!(report.provider, "Travis CI");
        assert_eq!(report.repository, "foo/bar");
        assert_eq!(report.total_builds, 1);
    }
}
