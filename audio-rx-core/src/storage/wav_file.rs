use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::models::audio_models::PcmFormat;
use crate::models::error::CaptureError;
use crate::processing::wav_format;

/// Build the final waveform file from a raw PCM scratch file.
///
/// The header is computed from the scratch file's exact length, then the
/// payload is streamed across. Returns the number of payload bytes written.
/// Removing the scratch file is left to the caller.
///
/// Fails with [`CaptureError::IncompleteInput`] if either path is missing,
/// or if the scratch file does not exist. A waveform file that could not be
/// completed is removed so no header ever disagrees with its payload.
pub fn finalize(temp_pcm: Option<&Path>, wav: Option<&Path>, format: &PcmFormat) -> Result<u64, CaptureError> {
    let (Some(temp_pcm), Some(wav)) = (temp_pcm, wav) else {
        return Err(CaptureError::IncompleteInput("finalize needs both a source and a destination".into()));
    };

    let source = File::open(temp_pcm).map_err(|e| {
        CaptureError::IncompleteInput(format!("cannot open {}: {}", temp_pcm.display(), e))
    })?;
    let data_size = source.metadata()?.len();

    log::info!("saving {} ({} payload bytes)", wav.display(), data_size);

    let result = write_wav(source, data_size, wav, format);
    if result.is_err() && wav.exists() {
        if let Err(e) = fs::remove_file(wav) {
            log::warn!("failed to remove incomplete {}: {}", wav.display(), e);
        }
    }
    result
}

fn write_wav(source: File, data_size: u64, wav: &Path, format: &PcmFormat) -> Result<u64, CaptureError> {
    let dest = File::create(wav)
        .map_err(|e| CaptureError::Io(format!("failed to create {}: {}", wav.display(), e)))?;
    let mut dest = BufWriter::new(dest);

    wav_format::write_header(&mut dest, data_size, format)?;

    let copied = io::copy(&mut BufReader::new(source), &mut dest)
        .map_err(|e| CaptureError::Io(format!("failed to copy sample data: {}", e)))?;
    if copied != data_size {
        return Err(CaptureError::Io(format!(
            "sample data changed during save: expected {} bytes, copied {}",
            data_size, copied
        )));
    }

    dest.flush()
        .map_err(|e| CaptureError::Io(format!("flush failed: {}", e)))?;
    dest.get_ref()
        .sync_all()
        .map_err(|e| CaptureError::Io(format!("sync failed: {}", e)))?;

    log::debug!("wav file size: {}", data_size + wav_format::WAV_HEADER_SIZE as u64);
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONO_16: PcmFormat = PcmFormat {
        sample_rate: 16000,
        channels: 1,
        byte_depth: 2,
    };

    #[test]
    fn header_matches_payload() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("temp.pcm");
        let wav = dir.path().join("out.wav");
        let payload: Vec<u8> = (0..=255u8).cycle().take(3000).collect();
        fs::write(&temp, &payload).unwrap();

        let written = finalize(Some(&temp), Some(&wav), &MONO_16).unwrap();
        assert_eq!(written, 3000);

        let file_data = fs::read(&wav).unwrap();
        assert_eq!(file_data.len(), 44 + 3000);
        assert_eq!(&file_data[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(file_data[4..8].try_into().unwrap()), 3036);
        assert_eq!(u32::from_le_bytes(file_data[40..44].try_into().unwrap()), 3000);
        assert_eq!(&file_data[44..], &payload[..]);

        // The scratch file is the caller's to delete.
        assert!(temp.exists());
    }

    #[test]
    fn empty_scratch_gives_header_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("temp.pcm");
        let wav = dir.path().join("out.wav");
        fs::write(&temp, b"").unwrap();

        assert_eq!(finalize(Some(&temp), Some(&wav), &MONO_16).unwrap(), 0);
        let file_data = fs::read(&wav).unwrap();
        assert_eq!(file_data.len(), 44);
        assert_eq!(u32::from_le_bytes(file_data[4..8].try_into().unwrap()), 36);
    }

    #[test]
    fn missing_paths_are_incomplete_input() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("out.wav");

        let err = finalize(None, Some(&wav), &MONO_16).unwrap_err();
        assert!(matches!(err, CaptureError::IncompleteInput(_)));

        let err = finalize(Some(&dir.path().join("temp.pcm")), None, &MONO_16).unwrap_err();
        assert!(matches!(err, CaptureError::IncompleteInput(_)));

        // Source path given but nothing was ever recorded there.
        let err = finalize(Some(&dir.path().join("temp.pcm")), Some(&wav), &MONO_16).unwrap_err();
        assert!(matches!(err, CaptureError::IncompleteInput(_)));
        assert!(!wav.exists());
    }

    #[test]
    fn unwritable_destination_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let temp = dir.path().join("temp.pcm");
        fs::write(&temp, [0u8; 8]).unwrap();
        let wav = dir.path().join("taken.wav");
        fs::create_dir(&wav).unwrap();

        let err = finalize(Some(&temp), Some(&wav), &MONO_16).unwrap_err();
        assert!(matches!(err, CaptureError::Io(_)));
        assert!(wav.is_dir());
    }
}
