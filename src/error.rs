use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildTimesError {
    #[error("Travis API returned HTTP {status}")]
    Api { status: u16 },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Fetch task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, BuildTimesError>;
