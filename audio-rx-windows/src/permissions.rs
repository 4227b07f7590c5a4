//! Windows microphone privacy check.
//!
//! Access is governed by Settings > Privacy > Microphone. Unpackaged desktop
//! apps get no consent dialog; when the toggle is off, activating an audio
//! client on a capture endpoint fails with `E_ACCESSDENIED`.

use windows::Win32::Foundation::E_ACCESSDENIED;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;

use audio_rx_core::CaptureError;

use crate::com::ComGuard;

/// Whether the default capture endpoint can be opened by this process.
///
/// Returns `Ok(false)` if there is no capture endpoint or if access is
/// denied by the privacy settings.
pub fn check_microphone_permission() -> Result<bool, CaptureError> {
    let _com = ComGuard::init()?;
    unsafe { check_mic_access() }
}

unsafe fn check_mic_access() -> Result<bool, CaptureError> {
    let enumerator: IMMDeviceEnumerator = CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
        .map_err(|e| CaptureError::Unknown(format!("failed to create enumerator: {}", e)))?;

    let device = match enumerator.GetDefaultAudioEndpoint(eCapture, eConsole) {
        Ok(d) => d,
        Err(_) => {
            log::info!("no capture endpoint present");
            return Ok(false);
        }
    };

    match device.Activate::<IAudioClient>(CLSCTX_ALL, None) {
        Ok(_) => Ok(true),
        Err(e) if e.code() == E_ACCESSDENIED => {
            log::warn!("microphone access is disabled in privacy settings");
            Ok(false)
        }
        Err(e) if e.code() == AUDCLNT_E_DEVICE_IN_USE => {
            log::warn!("capture endpoint is held exclusively by another application");
            Ok(false)
        }
        Err(e) => {
            log::warn!("unexpected error checking microphone access: {}", e);
            Ok(true)
        }
    }
}
