use crate::models::audio_models::AudioDevice;
use crate::models::config::SessionConfig;
use crate::models::error::CaptureError;

use super::frame_source::FrameSource;

/// Interface for platform-specific capture devices.
///
/// Implemented by:
/// - `WasapiMicProvider` (Windows)
pub trait CaptureProvider: Send + Sync + 'static {
    type Source: FrameSource;

    /// Whether this capture device can currently be opened.
    fn is_available(&self) -> bool;

    /// Acquire the device for `config`'s format and audio source.
    ///
    /// Must turn off automatic gain control when the device exposes it, so
    /// loudness readings reflect the raw signal. Fails with
    /// [`CaptureError::DeviceUnavailable`] if the device cannot be opened.
    fn open(&self, config: &SessionConfig) -> Result<Self::Source, CaptureError>;

    /// Information about the device backing this provider.
    fn device_info(&self) -> AudioDevice;
}
