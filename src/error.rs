use thiserror::Error;

/// A request to the backend that did not produce a usable body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport succeeded with a non-2xx status
    #[error("Server responded with {0}")]
    Status(u16),
    /// The request never completed
    #[error("Connection failed: {0}")]
    Network(String),
    /// The body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None if e.is_decode() => FetchError::Decode(e.to_string()),
            None => FetchError::Network(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}

/// Why a position source could not deliver a fix.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    Unavailable,
    #[error("{0}")]
    Other(String),
}
