use serde::{Deserialize, Serialize};

/// Capture-device selector.
///
/// Codes follow the platform audio-source numbering hosts already pass in
/// (`Mic = 1`, `VoiceRecognition = 6`, ...). Unknown codes resolve to the
/// default, [`AudioSourceKind::VoiceRecognition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AudioSourceKind {
    Default,
    Mic,
    Camcorder,
    #[default]
    VoiceRecognition,
    VoiceCommunication,
    Unprocessed,
}

impl AudioSourceKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Default,
            1 => Self::Mic,
            5 => Self::Camcorder,
            6 => Self::VoiceRecognition,
            7 => Self::VoiceCommunication,
            9 => Self::Unprocessed,
            other => {
                log::debug!("unknown audio source code {}, using voice recognition", other);
                Self::VoiceRecognition
            }
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Default => 0,
            Self::Mic => 1,
            Self::Camcorder => 5,
            Self::VoiceRecognition => 6,
            Self::VoiceCommunication => 7,
            Self::Unprocessed => 9,
        }
    }

    /// Whether this source feeds speech processing rather than playback.
    pub fn is_speech(self) -> bool {
        matches!(self, Self::VoiceRecognition | Self::Unprocessed)
    }
}

/// Linear PCM stream layout shared by the frame source and the WAV encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
    /// Bytes per sample per channel: 1 (unsigned 8-bit) or 2 (signed 16-bit LE).
    pub byte_depth: u16,
}

impl PcmFormat {
    /// Bytes in one sample-frame (one time instant across all channels).
    pub fn block_align(&self) -> u16 {
        self.channels * self.byte_depth
    }

    /// Bytes per second, or `None` if it does not fit the 32-bit WAV field.
    pub fn byte_rate(&self) -> Option<u32> {
        self.sample_rate.checked_mul(self.block_align() as u32)
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.byte_depth * 8
    }
}

/// Transport type for an audio device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioTransportType {
    BuiltIn,
    Bluetooth,
    BluetoothLE,
    Usb,
    Virtual,
    Unknown,
}

/// An audio device available for capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    pub transport_type: Option<AudioTransportType>,
}
