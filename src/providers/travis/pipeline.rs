use log::{debug, info};

use crate::credentials::Credentials;
use crate::dashboard::BuildSource;
use crate::error::Result;
use crate::insights::BuildSample;

use super::client::TravisClient;
use super::types::TravisBuild;

/// Converts raw builds into chart samples sorted by start time.
///
/// Durations go from seconds to minutes. Builds sharing a start time are all
/// kept.
pub fn to_samples(builds: Vec<TravisBuild>) -> Vec<BuildSample> {
    #[allow(clippy::cast_precision_loss)]
    let mut samples: Vec<BuildSample> = builds
        .into_iter()
        .map(|build| BuildSample {
            date: build.started_at,
            duration: build.duration as f64 / 60.0,
        })
        .collect();

    samples.sort_by_key(|sample| sample.date);
    samples
}

/// Fetches and transforms the build history for one repository.
///
/// # Errors
///
/// Propagates any client error; callers turn it into a failed fetch.
pub async fn fetch_build_samples(
    client: &TravisClient,
    credentials: &Credentials,
) -> Result<Vec<BuildSample>> {
    info!(
        "Fetching build times for repository: {}",
        credentials.repository_slug
    );

    let builds = client
        .fetch_builds(&credentials.repository_slug, &credentials.travis_token)
        .await?;

    debug!("Received {} builds", builds.len());

    Ok(to_samples(builds))
}

impl BuildSource for TravisClient {
    async fn fetch_samples(&self, credentials: &Credentials) -> Result<Vec<BuildSample>> {
        fetch_build_samples(self, credentials).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BuildTimesError;
    use crate::providers::travis::client::BuildQuery;
    use mockito::Matcher;

    const TWO_BUILDS: &str = r#"{
        "builds": [
            {"started_at": "2024-01-02T00:00:00Z", "duration": 120},
            {"started_at": "2024-01-01T00:00:00Z", "duration": 60}
        ]
    }"#;

    fn credentials() -> Credentials {
        Credentials::new("foo/bar", "abc")
    }

    /// Keeps the server and its mock alive for as long as the client is used.
    async fn serve(status: usize, body: &str) -> (mockito::ServerGuard, mockito::Mock, TravisClient) {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;
        let client = TravisClient::new(&server.url(), BuildQuery::default()).unwrap();
        (server, mock, client)
    }

    mod to_samples {
        use super::*;

        #[test]
        fn sorts_ascending_and_converts_to_minutes() {
            let builds = vec![
                TravisBuild {
                    started_at: "2024-01-02T00:00:00Z".parse().unwrap(),
                    duration: 90,
                },
                TravisBuild {
                    started_at: "2024-01-01T00:00:00Z".parse().unwrap(),
                    duration: 30,
                },
            ];

            let samples = to_samples(builds);
            assert_eq!(samples[0].iso_date(), "2024-01-01T00:00:00.000Z");
            assert_eq!(samples[0].duration, 0.5);
            assert_eq!(samples[1].iso_date(), "2024-01-02T00:00:00.000Z");
            assert_eq!(samples[1].duration, 1.5);
        }

        #[test]
        fn keeps_duplicate_dates() {
            let build = TravisBuild {
                started_at: "2024-01-01T00:00:00Z".parse().unwrap(),
                duration: 60,
            };
            let samples = to_samples(vec![build.clone(), build]);
            assert_eq!(samples.len(), 2);
        }

        #[test]
        fn empty_input_yields_empty_output() {
            assert!(to_samples(Vec::new()).is_empty());
        }
    }

    #[tokio::test]
    async fn maps_mocked_response_to_sorted_samples() {
        let (_server, _mock, client) = serve(200, TWO_BUILDS).await;

        let samples = fetch_build_samples(&client, &credentials()).await.unwrap();

        let rendered: Vec<(String, f64)> = samples
            .iter()
            .map(|s| (s.iso_date(), s.duration))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("2024-01-01T00:00:00.000Z".to_string(), 1.0),
                ("2024-01-02T00:00:00.000Z".to_string(), 2.0),
            ]
        );
    }

    #[tokio::test]
    async fn missing_builds_key_yields_empty_list() {
        let (_server, _mock, client) = serve(200, "{}").await;
        let samples = fetch_build_samples(&client, &credentials()).await;
        tokio_test::assert_ok!(&samples);
        assert!(samples.unwrap().is_empty());
    }

    #[tokio::test]
    async fn error_statuses_fail() {
        for status in [401, 404, 500] {
            let (_server, _mock, client) = serve(status, "{}").await;
            let result = fetch_build_samples(&client, &credentials()).await;
            match result {
                Err(BuildTimesError::Api { status: got }) => assert_eq!(usize::from(got), status),
                other => panic!("expected API error for {status}, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn refetching_identical_response_is_idempotent() {
        let (_server, _mock, client) = serve(200, TWO_BUILDS).await;
        let first = client.fetch_samples(&credentials()).await.unwrap();
        let second = client.fetch_samples(&credentials()).await.unwrap();
        assert_eq!(first, second);
    }
}
