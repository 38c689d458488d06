mod travis;

pub use travis::{BuildQuery, TravisClient, DEFAULT_API_URL};
