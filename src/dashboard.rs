//! View state controller.
//!
//! [`Dashboard`] holds the input fields, the fetch status and the plotted
//! samples. [`run`] wires it to the debouncer and to a [`BuildSource`]: every
//! trigger spawns one fetch, and outcomes are applied in the order they arrive,
//! so the last response to resolve wins.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use url::Url;

use crate::auth::Token;
use crate::credentials::{with_repository_param, Credentials};
use crate::debounce::{self, DebounceConfig};
use crate::error::Result;
use crate::insights::BuildSample;

/// Anything that can turn credentials into a build history.
pub trait BuildSource: Send + Sync + 'static {
    fn fetch_samples(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Vec<BuildSample>>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Edits coming from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Repository(String),
    Token(String),
}

#[derive(Debug)]
pub struct Dashboard {
    repository_slug: String,
    travis_token: Token,
    debounced_slug: String,
    location: Url,
    status: FetchStatus,
    builds: Vec<BuildSample>,
    last_trigger: Option<Credentials>,
}

impl Dashboard {
    /// Seeds the fields from `defaults`, then from the `repository` and
    /// `travis-token` query parameters of `location`.
    pub fn new(defaults: Credentials, location: Url) -> Self {
        let mut credentials = defaults;
        credentials.seed_from_location(&location);

        Self {
            repository_slug: credentials.repository_slug,
            travis_token: credentials.travis_token,
            debounced_slug: String::new(),
            location,
            status: FetchStatus::Idle,
            builds: Vec::new(),
            last_trigger: None,
        }
    }

    /// Replaces the seeded token before the dashboard starts.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.travis_token = token;
        self
    }

    pub fn repository_slug(&self) -> &str {
        &self.repository_slug
    }

    pub fn travis_token(&self) -> &Token {
        &self.travis_token
    }

    /// Shareable location reflecting the current repository field.
    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    /// Samples sorted ascending by start time.
    pub fn builds(&self) -> &[BuildSample] {
        &self.builds
    }

    /// Updates the repository field and rewrites the location's `repository`
    /// parameter. Does not fetch; the debounced value does.
    pub fn set_repository(&mut self, repository_slug: String) {
        self.location = with_repository_param(&self.location, &repository_slug);
        self.repository_slug = repository_slug;
    }

    /// Updates the token field. The location is left untouched so the secret
    /// never lands in a shareable URL.
    pub fn set_token(&mut self, token: String) -> Option<Credentials> {
        self.travis_token = Token::from(token);
        self.trigger()
    }

    /// Records a settled repository value.
    pub fn apply_debounced(&mut self, repository_slug: String) -> Option<Credentials> {
        self.debounced_slug = repository_slug;
        self.trigger()
    }

    /// Returns credentials to fetch with when both fields are set and differ
    /// from the previous trigger. Moves to `Loading` and clears results.
    ///
    /// An incomplete pair forgets the previous trigger, so re-entering the
    /// same value after clearing a field fetches again.
    fn trigger(&mut self) -> Option<Credentials> {
        let credentials = Credentials {
            repository_slug: self.debounced_slug.clone(),
            travis_token: self.travis_token.clone(),
        };

        if !credentials.is_complete() {
            self.last_trigger = None;
            return None;
        }
        if self.last_trigger.as_ref() == Some(&credentials) {
            return None;
        }

        self.builds.clear();
        self.status = FetchStatus::Loading;
        self.last_trigger = Some(credentials.clone());
        Some(credentials)
    }

    /// Applies a fetch outcome. Errors are logged and collapse into `Failed`.
    pub fn finish_fetch(&mut self, outcome: Result<Vec<BuildSample>>) {
        match outcome {
            Ok(builds) => {
                info!("Loaded {} builds", builds.len());
                self.builds = builds;
                self.status = FetchStatus::Loaded;
            }
            Err(e) => {
                error!("Error fetching build information: {e}");
                self.builds.clear();
                self.status = FetchStatus::Failed;
            }
        }
    }
}

/// Drives a dashboard until `inputs` closes and every pending debounce and
/// in-flight fetch has resolved. `render` is called after every change.
///
/// A fetch task that panics counts as a failed fetch.
pub async fn run<S, R>(
    mut dashboard: Dashboard,
    source: Arc<S>,
    mut inputs: mpsc::Receiver<Input>,
    delay: Duration,
    mut render: R,
) -> Dashboard
where
    S: BuildSource,
    R: FnMut(&Dashboard),
{
    let (slug_tx, mut debouncer) = debounce::channel(
        dashboard.repository_slug.clone(),
        DebounceConfig::new(delay).ignore(String::is_empty),
    );
    let mut slug_tx = Some(slug_tx);

    let mut fetches = JoinSet::new();
    let mut inputs_closed = false;
    let mut debounce_done = false;

    render(&dashboard);

    loop {
        let trigger = tokio::select! {
            input = inputs.recv(), if !inputs_closed => match input {
                Some(Input::Repository(slug)) => {
                    if let Some(tx) = &slug_tx {
                        tx.send_if_modified(|current| {
                            if *current == slug {
                                false
                            } else {
                                current.clone_from(&slug);
                                true
                            }
                        });
                    }
                    dashboard.set_repository(slug);
                    None
                }
                Some(Input::Token(token)) => dashboard.set_token(token),
                None => {
                    inputs_closed = true;
                    slug_tx = None;
                    None
                }
            },
            settled = debouncer.settled(), if !debounce_done => match settled {
                Some(slug) => {
                    debug!("Repository settled on {slug}");
                    dashboard.apply_debounced(slug)
                }
                None => {
                    debounce_done = true;
                    None
                }
            },
            Some(joined) = fetches.join_next(), if !fetches.is_empty() => {
                dashboard.finish_fetch(joined.unwrap_or_else(|e| Err(e.into())));
                None
            }
        };

        if let Some(credentials) = trigger {
            let source = Arc::clone(&source);
            fetches.spawn(async move { source.fetch_samples(&credentials).await });
        }

        render(&dashboard);

        if inputs_closed && debounce_done && fetches.is_empty() {
            break;
        }
    }

    dashboard
}
