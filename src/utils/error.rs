//! Error types for the boardhound crawler
//!
//! Domain errors raised by the fetch, parse and harvest layers. Storage and
//! command code wraps these in `anyhow` with context.

use thiserror::Error;

/// Errors that can occur during HTTP fetching operations
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error not covered by a more specific variant
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status returned by the server
    #[error("HTTP status {0}")]
    Status(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// DNS resolution or TCP connect failure
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Map a transport error onto the most specific variant
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Http(err)
        }
    }

    /// Status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(code) => Some(*code),
            _ => None,
        }
    }
}

/// Errors that can occur while extracting records from a board page
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// A required child element was absent
    #[error("Missing element: {0}")]
    MissingElement(&'static str),

    /// A required attribute was absent
    #[error("Missing attribute: {0}")]
    MissingAttribute(&'static str),

    /// The URL does not belong to a supported board
    #[error("Unsupported board URL: {0}")]
    UnsupportedBoard(String),
}

/// Errors raised while distributing harvest work
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Worker process could not be started
    #[error("Failed to launch worker for chunk {chunk}: {source}")]
    Launch {
        chunk: usize,
        #[source]
        source: std::io::Error,
    },

    /// Worker process exited unsuccessfully
    #[error("Worker for chunk {chunk} exited with {status}")]
    WorkerExit { chunk: usize, status: String },

    /// Worker finished but its report could not be read
    #[error("Unreadable report from chunk {chunk}: {source}")]
    Report {
        chunk: usize,
        #[source]
        source: serde_json::Error,
    },
}
