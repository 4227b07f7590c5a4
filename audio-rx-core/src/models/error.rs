use thiserror::Error;

/// Errors that can occur while configuring or running a capture session.
///
/// Only configuration and control failures reach the caller. Failures inside
/// the capture loop are logged and reported through the terminal stop event.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("storage error: {0}")]
    Io(String),

    #[error("incomplete input: {0}")]
    IncompleteInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("a capture session is already active")]
    SessionActive,

    #[error("recorder is not configured")]
    NotConfigured,

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<std::io::Error> for CaptureError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
