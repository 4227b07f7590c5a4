//! Output locations inside the application-private data directory.
//!
//! Recordings go to: `<data_local_dir>/audio-rx/`

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;

const APP_DIR_NAME: &str = "audio-rx";
const TEMP_PCM_FILE_NAME: &str = "temp.pcm";
const WAV_FILE_NAME: &str = "audio-rx.wav";

/// Default application-private directory.
/// Returns: `<data_local_dir>/audio-rx/`, or `./audio-rx/` when the platform
/// has no data directory.
pub fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Scratch and final file paths for a recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Raw PCM written during capture, removed after finalization.
    pub temp_pcm: PathBuf,
    /// Finished waveform file.
    pub wav: PathBuf,
}

impl OutputPaths {
    /// Derive both paths inside `dir`, creating the directory if needed.
    pub fn in_dir(dir: &Path) -> Result<Self, CaptureError> {
        fs::create_dir_all(dir).map_err(|e| {
            CaptureError::InvalidConfig(format!("cannot create storage directory {}: {}", dir.display(), e))
        })?;

        Ok(Self {
            temp_pcm: dir.join(TEMP_PCM_FILE_NAME),
            wav: dir.join(WAV_FILE_NAME),
        })
    }
}
