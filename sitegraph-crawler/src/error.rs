use thiserror::Error;

/// Errors that abort an entire audit run. Everything else is recorded
/// on the page record and the crawl moves on.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("failed to start page fetcher: {0}")]
    Fetcher(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

/// A page fetch that produced no usable snapshot.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("redirect loop or too many redirects")]
    TooManyRedirects,

    #[error("{0}")]
    Other(String),
}

/// An existence probe that produced no status code. Probe failures are
/// logged, never treated as proof the target is missing.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
