use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use super::audio_models::{AudioSourceKind, PcmFormat};
use super::error::CaptureError;
use crate::storage::paths::OutputPaths;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;
pub const DEFAULT_NUM_CHANNELS: u16 = 1;
pub const DEFAULT_BYTE_DEPTH: u16 = 2;
pub const DEFAULT_MAX_DURATION_SECS: u64 = 10;

/// Highest rate whose byte rate fits the 32-bit WAV field at the widest
/// layout (2 channels of 2 bytes).
pub const MAX_SAMPLE_RATE: u32 = u32::MAX / 4;

/// Caller-supplied capture options. Every key is optional.
///
/// Keys use the host's camelCase spelling (`sampleRate`, `numChannels`, ...).
/// Values are resolved into a [`SessionConfig`] by
/// [`SessionConfig::from_options`], which never rejects a value: anything
/// out of range falls back to its default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureOptions {
    pub sample_rate: Option<i64>,
    pub num_channels: Option<i64>,
    pub byte_depth: Option<i64>,
    /// Maximum recording length in whole seconds.
    pub max_duration: Option<i64>,
    pub report_frame_data: Option<bool>,
    pub report_volume: Option<bool>,
    pub record_to_file: Option<bool>,
    pub audio_source: Option<i64>,
}

impl CaptureOptions {
    /// Parse an options mapping from JSON.
    ///
    /// Keys holding a value of the wrong type are ignored as if absent.
    /// Only input that is not JSON at all is an error.
    pub fn from_json(json: &str) -> Result<Self, CaptureError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| CaptureError::InvalidConfig(format!("options are not valid JSON: {}", e)))?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            log::warn!("capture options are not a mapping, using defaults");
            return Self::default();
        };
        let int = |key: &str| map.get(key).and_then(Value::as_i64);
        let flag = |key: &str| map.get(key).and_then(Value::as_bool);

        Self {
            sample_rate: int("sampleRate"),
            num_channels: int("numChannels"),
            byte_depth: int("byteDepth"),
            max_duration: int("maxDuration"),
            report_frame_data: flag("reportFrameData"),
            report_volume: flag("reportVolume"),
            record_to_file: flag("recordToFile"),
            audio_source: int("audioSource"),
        }
    }
}

/// Validated, immutable parameters for one capture session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub format: PcmFormat,

    /// Sample-frame limit: `sample_rate * max_duration_secs`.
    pub max_num_samples: u64,

    pub report_frame_data: bool,
    pub report_volume: bool,

    /// Scratch and final file locations. `None` when not recording to file.
    pub output: Option<OutputPaths>,

    pub audio_source: AudioSourceKind,
}

impl SessionConfig {
    /// Resolve options against defaults.
    ///
    /// `storage_dir` is the application-private directory the output paths
    /// are rooted in. It is only touched when `recordToFile` is on.
    pub fn from_options(options: &CaptureOptions, storage_dir: &Path) -> Result<Self, CaptureError> {
        let sample_rate = match options.sample_rate {
            Some(rate) if rate > 0 && rate <= MAX_SAMPLE_RATE as i64 => rate as u32,
            Some(rate) => {
                log::warn!("ignoring sample rate {}, using {}", rate, DEFAULT_SAMPLE_RATE);
                DEFAULT_SAMPLE_RATE
            }
            None => DEFAULT_SAMPLE_RATE,
        };

        // Stereo and 8-bit are opt-in: only the exact value switches them on.
        let channels = if options.num_channels == Some(2) { 2 } else { DEFAULT_NUM_CHANNELS };
        let byte_depth = if options.byte_depth == Some(1) { 1 } else { DEFAULT_BYTE_DEPTH };

        let default_max_num_samples = sample_rate as u64 * DEFAULT_MAX_DURATION_SECS;
        let max_num_samples = match options.max_duration {
            Some(secs) if secs >= 0 => (sample_rate as u64).checked_mul(secs as u64).unwrap_or_else(|| {
                log::warn!("max duration {}s overflows, using {}s", secs, DEFAULT_MAX_DURATION_SECS);
                default_max_num_samples
            }),
            Some(secs) => {
                log::warn!("ignoring max duration {}s, using {}s", secs, DEFAULT_MAX_DURATION_SECS);
                default_max_num_samples
            }
            None => default_max_num_samples,
        };

        let output = if options.record_to_file.unwrap_or(true) {
            Some(OutputPaths::in_dir(storage_dir)?)
        } else {
            None
        };

        Ok(Self {
            format: PcmFormat {
                sample_rate,
                channels,
                byte_depth,
            },
            max_num_samples,
            report_frame_data: options.report_frame_data.unwrap_or(false),
            report_volume: options.report_volume.unwrap_or(false),
            output,
            audio_source: options
                .audio_source
                .map(AudioSourceKind::from_code)
                .unwrap_or_default(),
        })
    }

    pub fn record_to_file(&self) -> bool {
        self.output.is_some()
    }

    pub fn log_summary(&self) {
        log::debug!("sampleRate: {}", self.format.sample_rate);
        log::debug!("numChannels: {}", self.format.channels);
        log::debug!("byteDepth: {}", self.format.byte_depth);
        log::debug!("maxNumSamples: {}", self.max_num_samples);
        log::debug!("reportVolume: {}", self.report_volume);
        log::debug!("reportFrameData: {}", self.report_frame_data);
        log::debug!("recordToFile: {}", self.record_to_file());
        log::debug!("audioSource: {:?}", self.audio_source);
        if let Some(ref output) = self.output {
            log::debug!("filePath: {}", output.wav.display());
        }
    }
}
