use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the crawler, the pagination oracle and the recovery tool
#[derive(Error, Debug)]
pub enum Error {
    /// A page fetch failed; terminal for the whole crawl
    #[error(
        "{message} (status code: {})",
        .status_code.map_or_else(|| "None".to_string(), |code| code.to_string())
    )]
    Fetch {
        status_code: Option<u16>,
        message: String,
    },

    /// No credential configured, or the oracle backend could not be reached
    #[error("Pagination oracle unavailable: {0}")]
    OracleUnavailable(String),

    /// The oracle answered with an error or an unreadable response
    #[error("Pagination oracle request failed: {0}")]
    Oracle(String),

    /// A single pagination suggestion could not be turned into a URL
    #[error("Malformed candidate URL '{candidate}': {reason}")]
    MalformedCandidate { candidate: String, reason: String },

    /// Saved page 1 output is absent or has no `URL:` line
    #[error("First page not found in {0}")]
    FirstPageMissing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pagination pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
