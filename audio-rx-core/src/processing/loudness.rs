//! Frame loudness in dBFS.
//!
//! This is a deliberately cheap meter: it averages the absolute amplitude of
//! the first channel only and converts that mean to decibels. It is neither
//! an RMS measurement nor a multi-channel one.

/// Loudest reported level (full scale).
pub const MAX_DBFS: f64 = 0.0;

/// Floor for the reported level. Silence and empty frames land here.
pub const MIN_DBFS: f64 = -100.0;

/// Measure an interleaved PCM frame.
///
/// - `byte_depth == 2`: signed 16-bit little-endian, normalized by 32767.
/// - `byte_depth == 1`: unsigned 8-bit centred on 127, normalized by 127.
///
/// Trailing bytes that do not form a whole sample-frame are ignored.
/// The result is clamped to `[MIN_DBFS, MAX_DBFS]`.
pub fn measure_dbfs(frame: &[u8], byte_depth: u16, channels: u16) -> f64 {
    let byte_depth = byte_depth.max(1) as usize;
    let stride = byte_depth * channels.max(1) as usize;
    let num_samples = frame.len() / stride;
    if num_samples == 0 {
        return MIN_DBFS;
    }

    let (sum, full_scale) = if byte_depth == 2 {
        let sum: f64 = frame
            .chunks_exact(stride)
            .map(|sf| (i16::from_le_bytes([sf[0], sf[1]]) as f64).abs())
            .sum();
        (sum, i16::MAX as f64)
    } else {
        let sum: f64 = frame
            .chunks_exact(stride)
            .map(|sf| (sf[0] as i32 - 127).abs() as f64)
            .sum();
        (sum, i8::MAX as f64)
    };

    let mean = sum / num_samples as f64 / full_scale;
    let dbfs = if mean > 0.0 { 20.0 * mean.log10() } else { MIN_DBFS };
    dbfs.clamp(MIN_DBFS, MAX_DBFS)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn pcm16(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn silence_hits_the_floor() {
        assert_eq!(measure_dbfs(&[0u8; 512], 2, 1), MIN_DBFS);
        assert_eq!(measure_dbfs(&[127u8; 64], 1, 1), MIN_DBFS);
    }

    #[test]
    fn full_scale_16bit_is_zero_db() {
        let frame = pcm16(&[32767, -32767, 32767, -32767]);
        assert_abs_diff_eq!(measure_dbfs(&frame, 2, 1), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn half_scale_is_about_minus_six_db() {
        let frame = pcm16(&[16384; 32]);
        assert_abs_diff_eq!(measure_dbfs(&frame, 2, 1), -6.02, epsilon = 0.01);
    }

    #[test]
    fn only_first_channel_counts() {
        // Left silent, right full scale.
        let frame = pcm16(&[0, 32767, 0, 32767, 0, 32767]);
        assert_eq!(measure_dbfs(&frame, 2, 2), MIN_DBFS);

        // Left full scale, right silent.
        let frame = pcm16(&[32767, 0, -32767, 0]);
        assert_abs_diff_eq!(measure_dbfs(&frame, 2, 2), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn eight_bit_offset_and_clamp() {
        // 0 and 254 are both 127 away from the centre.
        assert_abs_diff_eq!(measure_dbfs(&[0, 254, 0, 254], 1, 1), 0.0, epsilon = 1e-9);
        // 255 overshoots full scale by one step and is clamped.
        assert_eq!(measure_dbfs(&[255; 8], 1, 1), MAX_DBFS);
    }

    #[test]
    fn very_quiet_signal_is_clamped_to_floor() {
        let mut samples = vec![0i16; 200_000];
        samples[0] = 1;
        let frame = pcm16(&samples);
        assert_eq!(measure_dbfs(&frame, 2, 1), MIN_DBFS);
    }

    #[test]
    fn empty_and_partial_frames() {
        assert_eq!(measure_dbfs(&[], 2, 1), MIN_DBFS);
        assert_eq!(measure_dbfs(&[0xFF], 2, 1), MIN_DBFS);
        // The dangling byte after one full sample is ignored.
        let mut frame = pcm16(&[32767]);
        frame.push(0x12);
        assert_abs_diff_eq!(measure_dbfs(&frame, 2, 1), 0.0, epsilon = 1e-9);
    }
}
