use std::path::PathBuf;

use serde::Serialize;

/// Sentinel reported as the file path when no waveform file was produced.
pub const FILE_PATH_NA: &str = "FILE_PATH_NA";

/// Capture session state machine.
///
/// ```text
/// idle → running → stopping → stopped
/// ```
///
/// Each session passes through every state exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Running or stopping: the capture thread still owns the session.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Stopping)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Why a capture session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StopCause {
    #[serde(rename = "STOP_CODE_USER_REQUEST")]
    UserRequest,
    #[serde(rename = "STOP_CODE_MAX_NUM_SAMPLES_REACHED")]
    MaxSamplesReached,
    #[serde(rename = "STOP_CODE_ERROR")]
    Error,
}

impl StopCause {
    /// Wire code carried by the terminal event.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UserRequest => "STOP_CODE_USER_REQUEST",
            Self::MaxSamplesReached => "STOP_CODE_MAX_NUM_SAMPLES_REACHED",
            Self::Error => "STOP_CODE_ERROR",
        }
    }
}

/// Outcome of a finished session, delivered once as the terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopStatus {
    pub cause: StopCause,
    /// Final waveform file, if one was produced.
    pub file_path: Option<PathBuf>,
}

impl StopStatus {
    /// File path as reported to the host, or [`FILE_PATH_NA`].
    pub fn file_path_or_na(&self) -> String {
        self.file_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_else(|| FILE_PATH_NA.to_string())
    }
}
