use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Body of `GET /repo/{slug}/builds`.
#[derive(Debug, Deserialize)]
pub struct BuildsResponse {
    /// Absent or `null` means no builds.
    #[serde(default)]
    builds: Option<Vec<TravisBuild>>,
}

impl BuildsResponse {
    pub fn into_builds(self) -> Vec<TravisBuild> {
        self.builds.unwrap_or_default()
    }
}

/// Travis CI build record, trimmed to the fields the chart needs.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TravisBuild {
    pub started_at: DateTime<Utc>,
    /// Seconds.
    pub duration: u64,
}
