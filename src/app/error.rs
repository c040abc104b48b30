use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Unknown site: {0}")]
    UnknownSite(String),

    #[error("Failed to fetch {url}: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure reported by a [`Fetcher`](crate::fetcher::Fetcher).
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Not an HTML document (content-type: {0})")]
    NotDocument(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;
