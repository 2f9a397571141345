//! Error types for gridwatch
//!
//! Every failure is either a transport problem (the bridge could not be
//! reached) or a protocol problem (the bridge answered, but not with a
//! usable management result). An empty result set is never an error.

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, GridError>;

/// Coarse classification of a [`GridError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection, timeout or body read failure
    Transport,
    /// Non-200 status, undecodable body, or missing/malformed `value`
    Protocol,
}

/// Unified error type for gridwatch
#[derive(Error, Debug)]
pub enum GridError {
    // ===== Transport Errors =====
    #[error("Transport error for URL {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to create HTTP session for host {host}: {source}")]
    Session {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    // ===== Protocol Errors =====
    #[error("URL {url} responded with status: {status}")]
    Status { url: String, status: u16 },

    #[error("URL {url} returned a body that is not valid JSON: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("URL {url} JSON has invalid management result (bridge error: {})", or_none(.error))]
    MissingValue { url: String, error: Option<String> },

    #[error("Malformed {attribute} in {object}: {reason}")]
    MalformedValue {
        object: String,
        attribute: String,
        reason: String,
    },
}

fn or_none(error: &Option<String>) -> &str {
    error.as_deref().unwrap_or("none")
}

impl GridError {
    /// Classify the error as a transport or protocol failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            GridError::Transport { .. } | GridError::Session { .. } => ErrorKind::Transport,
            GridError::Status { .. }
            | GridError::InvalidJson { .. }
            | GridError::MissingValue { .. }
            | GridError::MalformedValue { .. } => ErrorKind::Protocol,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn is_protocol(&self) -> bool {
        self.kind() == ErrorKind::Protocol
    }

    /// URL of the failed request, when the failure happened on one
    pub fn url(&self) -> Option<&str> {
        match self {
            GridError::Transport { url, .. }
            | GridError::Status { url, .. }
            | GridError::InvalidJson { url, .. }
            | GridError::MissingValue { url, .. } => Some(url),
            GridError::Session { .. } | GridError::MalformedValue { .. } => None,
        }
    }

    /// HTTP status code for non-200 responses
    pub fn status(&self) -> Option<u16> {
        match self {
            GridError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn malformed(
        object: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        GridError::MalformedValue {
            object: object.into(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }
}
