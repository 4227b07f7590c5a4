//! WAV container header generation.
//!
//! Produces the standard 44-byte RIFF/PCM header. All multi-byte fields
//! are little-endian.

use std::io::Write;

use crate::models::audio_models::PcmFormat;
use crate::models::error::CaptureError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Generate a 44-byte WAV RIFF header for `data_size` bytes of PCM payload.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    file size - 8 (= data_size + 36)
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * byte_depth
/// [32-33]  block_align = channels * byte_depth
/// [34-35]  bits per sample = byte_depth * 8
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
///
/// Fails with [`CaptureError::Encoding`] if the byte rate overflows its field.
pub fn generate_wav_header(format: &PcmFormat, data_size: u32) -> Result<[u8; WAV_HEADER_SIZE], CaptureError> {
    let byte_rate = format.byte_rate().ok_or_else(|| {
        CaptureError::Encoding(format!(
            "byte rate of {} Hz x {} bytes does not fit a WAV header",
            format.sample_rate,
            format.block_align()
        ))
    })?;
    let chunk_size = data_size.wrapping_add((WAV_HEADER_SIZE - 8) as u32);

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample().to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    Ok(header)
}

/// Write the header for `data_size` payload bytes to `sink`.
///
/// Payloads that do not fit the 32-bit RIFF size fields are rejected rather
/// than written with a wrapped size.
pub fn write_header<W: Write>(sink: &mut W, data_size: u64, format: &PcmFormat) -> Result<(), CaptureError> {
    let max_payload = u32::MAX as u64 - (WAV_HEADER_SIZE - 8) as u64;
    if data_size > max_payload {
        return Err(CaptureError::Encoding(format!(
            "{} bytes of sample data exceed the WAV size limit",
            data_size
        )));
    }

    let header = generate_wav_header(format, data_size as u32)?;
    sink.write_all(&header)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(header: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([header[offset], header[offset + 1], header[offset + 2], header[offset + 3]])
    }

    fn u16_at(header: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([header[offset], header[offset + 1]])
    }

    const MONO_16: PcmFormat = PcmFormat {
        sample_rate: 44100,
        channels: 1,
        byte_depth: 2,
    };

    #[test]
    fn header_magic_and_pcm_format() {
        let header = generate_wav_header(&MONO_16, 0).unwrap();
        assert_eq!(header.len(), 44);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
        assert_eq!(u32_at(&header, 16), 16);
        assert_eq!(u16_at(&header, 20), 1);
    }

    #[test]
    fn header_44khz_mono_16bit() {
        let header = generate_wav_header(&MONO_16, 1000).unwrap();

        assert_eq!(u32_at(&header, 4), 1036);
        assert_eq!(u16_at(&header, 22), 1);
        assert_eq!(u32_at(&header, 24), 44100);
        assert_eq!(u32_at(&header, 28), 88200);
        assert_eq!(header[32], 2);
        assert_eq!(header[34], 16);
        assert_eq!(u32_at(&header, 40), 1000);
    }

    #[test]
    fn header_stereo_8bit() {
        let format = PcmFormat {
            sample_rate: 8000,
            channels: 2,
            byte_depth: 1,
        };
        let header = generate_wav_header(&format, 64).unwrap();

        assert_eq!(u16_at(&header, 22), 2);
        assert_eq!(u32_at(&header, 28), 16000);
        assert_eq!(u16_at(&header, 32), 2);
        assert_eq!(u16_at(&header, 34), 8);
    }

    #[test]
    fn write_header_emits_exactly_44_bytes() {
        let mut sink = Vec::new();
        write_header(&mut sink, 32000, &MONO_16).unwrap();
        assert_eq!(sink.len(), WAV_HEADER_SIZE);
        assert_eq!(u32_at(&sink, 4), 32036);
        assert_eq!(u32_at(&sink, 40), 32000);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let mut sink = Vec::new();
        let err = write_header(&mut sink, u32::MAX as u64, &MONO_16).unwrap_err();
        assert!(matches!(err, CaptureError::Encoding(_)));
        assert!(sink.is_empty());
    }

    #[test]
    fn unrepresentable_byte_rate_is_rejected() {
        let format = PcmFormat {
            sample_rate: u32::MAX / 2,
            channels: 2,
            byte_depth: 2,
        };
        let mut sink = Vec::new();
        let err = write_header(&mut sink, 0, &format).unwrap_err();
        assert!(matches!(err, CaptureError::Encoding(_)));
        assert!(sink.is_empty());
    }
}
