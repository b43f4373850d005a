use thiserror::Error;

/// Failure of a single API call. Raised by the transport and surfaced to
/// callers unchanged; nothing in this crate retries or reinterprets it.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Path segment {0:?} cannot be addressed in a URL")]
    UnaddressableSegment(String),

    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Cannot encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
