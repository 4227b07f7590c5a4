use serde::Serialize;

use super::state::StopStatus;

pub const FRAME_DATA_EVENT: &str = "frameDataEvent";
pub const VOLUME_EVENT: &str = "volumeEvent";
pub const STOP_EVENT: &str = "stopEvent";

/// Terminal event payload: `{"code": ..., "filePath": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopEventPayload {
    pub code: &'static str,
    pub file_path: String,
}

impl From<&StopStatus> for StopEventPayload {
    fn from(status: &StopStatus) -> Self {
        Self {
            code: status.cause.code(),
            file_path: status.file_path_or_na(),
        }
    }
}

/// An outbound event, as carried over a channel to the host's event bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    /// Base64 copy of one raw frame.
    FrameData(String),
    /// Frame loudness in dBFS.
    Volume(f64),
    Stopped(StopStatus),
}

impl CaptureEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FrameData(_) => FRAME_DATA_EVENT,
            Self::Volume(_) => VOLUME_EVENT,
            Self::Stopped(_) => STOP_EVENT,
        }
    }

    /// JSON body the host bridge emits under [`CaptureEvent::name`].
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::FrameData(data) => serde_json::Value::from(data.as_str()),
            Self::Volume(dbfs) => serde_json::Value::from(*dbfs),
            Self::Stopped(status) => serde_json::json!(StopEventPayload::from(status)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped(_))
    }
}
