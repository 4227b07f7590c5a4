use windows::Win32::System::Com::{CoInitializeEx, CoUninitialize, COINIT_MULTITHREADED};

use audio_rx_core::CaptureError;

/// Keeps COM initialized (MTA) on the current thread while alive.
pub(crate) struct ComGuard {
    // COM initialization is per thread.
    _not_send: std::marker::PhantomData<*const ()>,
}

impl ComGuard {
    pub(crate) fn init() -> Result<Self, CaptureError> {
        unsafe {
            CoInitializeEx(None, COINIT_MULTITHREADED)
                .ok()
                .map_err(|e| CaptureError::Unknown(format!("CoInitializeEx failed: {}", e)))?;
        }
        Ok(Self {
            _not_send: std::marker::PhantomData,
        })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        unsafe {
            CoUninitialize();
        }
    }
}
