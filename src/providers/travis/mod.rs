mod client;
mod pipeline;
mod types;

pub use client::{BuildQuery, TravisClient, DEFAULT_API_URL};
