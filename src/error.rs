//! Error types for upstream calls and the comparison pipeline.

use thiserror::Error;

/// Failure talking to one of the upstream APIs.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Transport-level failure (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Configured base URL cannot be turned into a request URL.
    #[error("invalid url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Response body did not have the expected shape.
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Why a submission produced no table.
#[derive(Debug, Error)]
pub enum CompareError {
    #[error("could not resolve postcode {postcode}: {source}")]
    Geocode {
        postcode: String,
        #[source]
        source: SourceError,
    },

    #[error("could not fetch observations for {selector}: {source}")]
    Observations {
        selector: String,
        #[source]
        source: SourceError,
    },
}
