use log::{debug, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use url::Url;

use crate::auth::Token;
use crate::error::{BuildTimesError, Result};

use super::types::{BuildsResponse, TravisBuild};

pub const DEFAULT_API_URL: &str = "https://api.travis-ci.com";
const API_VERSION: &str = "3";

/// Filters applied to every builds request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildQuery {
    pub branch: String,
    pub limit: usize,
}

impl Default for BuildQuery {
    fn default() -> Self {
        Self {
            branch: "master".to_string(),
            limit: 100,
        }
    }
}

/// Travis CI v3 REST client.
///
/// The token is passed per request so one client can serve a dashboard whose
/// token field changes while it runs.
pub struct TravisClient {
    client: Client,
    api_url: Url,
    query: BuildQuery,
}

impl TravisClient {
    /// Creates a client for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or `base_url` is not
    /// a valid base URL.
    pub fn new(base_url: &str, query: BuildQuery) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("travis-build-times/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BuildTimesError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(base_url)
            .map_err(|e| BuildTimesError::Config(format!("Invalid base URL: {e}")))?;

        if api_url.cannot_be_a_base() {
            return Err(BuildTimesError::Config(format!(
                "Invalid base URL: {base_url}"
            )));
        }

        Ok(Self {
            client,
            api_url,
            query,
        })
    }

    fn auth_request(&self, request: reqwest::RequestBuilder, token: &Token) -> reqwest::RequestBuilder {
        request
            .header("Travis-API-Version", API_VERSION)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("token {}", token.as_str()))
    }

    /// Builds endpoint for a repository, with the slug encoded as one path
    /// segment (`owner/name` becomes `owner%2Fname`).
    pub fn builds_url(&self, repository_slug: &str) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["repo", repository_slug, "builds"]);
        }
        url.query_pairs_mut()
            .append_pair("state", "passed")
            .append_pair("event_type", "push")
            .append_pair("limit", &self.query.limit.to_string())
            .append_pair("branch.name", &self.query.branch);
        url
    }

    /// Fetches passed push builds on the configured branch. One request, no
    /// retries.
    ///
    /// # Errors
    ///
    /// Returns [`BuildTimesError::Api`] on a non-success status,
    /// [`BuildTimesError::Network`] on transport failure and
    /// [`BuildTimesError::Json`] when the body does not parse.
    pub async fn fetch_builds(&self, repository_slug: &str, token: &Token) -> Result<Vec<TravisBuild>> {
        let url = self.builds_url(repository_slug);
        debug!("GET {url}");

        let response = self
            .auth_request(self.client.get(url), token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Travis API responded with status {status} for {repository_slug}");
            return Err(BuildTimesError::Api {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: BuildsResponse = serde_json::from_str(&body)?;
        Ok(parsed.into_builds())
    }
}
