use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;

/// Append-only writer for the raw PCM scratch file.
///
/// Holds accepted sample bytes during capture. The WAV header is only
/// written at finalization, once the payload size is known.
pub struct PcmScratchWriter {
    file_path: PathBuf,
    writer: Option<BufWriter<File>>,
    total_bytes_written: u64,
}

impl PcmScratchWriter {
    /// Create (or truncate) the scratch file.
    pub fn create(file_path: &Path) -> Result<Self, CaptureError> {
        let file = File::create(file_path).map_err(|e| {
            CaptureError::Io(format!("failed to create {}: {}", file_path.display(), e))
        })?;

        Ok(Self {
            file_path: file_path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
            total_bytes_written: 0,
        })
    }

    pub fn write(&mut self, data: &[u8]) -> Result<(), CaptureError> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| CaptureError::Io("scratch file is closed".into()))?;
        writer
            .write_all(data)
            .map_err(|e| CaptureError::Io(format!("write failed: {}", e)))?;
        self.total_bytes_written += data.len() as u64;
        Ok(())
    }

    /// Flush and close the file. Returns the total payload size.
    ///
    /// Closing twice is harmless.
    pub fn close(&mut self) -> Result<u64, CaptureError> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| CaptureError::Io(format!("flush failed: {}", e)))?;
            writer
                .get_ref()
                .sync_all()
                .map_err(|e| CaptureError::Io(format!("sync failed: {}", e)))?;
        }
        Ok(self.total_bytes_written)
    }

    pub fn bytes_written(&self) -> u64 {
        self.total_bytes_written
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}
