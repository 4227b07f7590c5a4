//! Capture endpoint enumeration via the MMDevice API.

use windows::core::PCWSTR;
use windows::Win32::Devices::FunctionDiscovery::{PKEY_Device_EnumeratorName, PKEY_Device_FriendlyName};
use windows::Win32::Foundation::PROPERTYKEY;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;
use windows::Win32::UI::Shell::PropertiesSystem::IPropertyStore;

use audio_rx_core::{AudioDevice, AudioTransportType, CaptureError};

use crate::com::ComGuard;

/// Lists microphones through `IMMDeviceEnumerator`.
///
/// Requires COM to be initialized on the calling thread; see
/// [`capture_devices`] for a self-contained variant.
pub struct DeviceEnumerator {
    enumerator: IMMDeviceEnumerator,
}

impl DeviceEnumerator {
    pub fn new() -> Result<Self, CaptureError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator = CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                .map_err(|e| CaptureError::DeviceUnavailable(format!("failed to create enumerator: {}", e)))?;
            Ok(Self { enumerator })
        }
    }

    /// Active capture endpoints, the default one flagged.
    pub fn list_capture_devices(&self) -> Result<Vec<AudioDevice>, CaptureError> {
        unsafe {
            let collection = self
                .enumerator
                .EnumAudioEndpoints(eCapture, DEVICE_STATE_ACTIVE)
                .map_err(|e| CaptureError::DeviceUnavailable(format!("EnumAudioEndpoints failed: {}", e)))?;
            let count = collection
                .GetCount()
                .map_err(|e| CaptureError::DeviceUnavailable(format!("GetCount failed: {}", e)))?;

            let default_id = self.default_device_id(eConsole).ok();

            let mut devices = Vec::with_capacity(count as usize);
            for i in 0..count {
                let Ok(device) = collection.Item(i) else {
                    continue;
                };
                let Some(id) = device_id(&device) else {
                    continue;
                };

                let store = device.OpenPropertyStore(STGM_READ).ok();
                let name = store
                    .as_ref()
                    .and_then(|s| read_string(s, &PKEY_Device_FriendlyName))
                    .unwrap_or_else(|| format!("Microphone {}", i));
                let transport_type = store
                    .as_ref()
                    .and_then(|s| read_string(s, &PKEY_Device_EnumeratorName))
                    .map(|bus| transport_from_bus(&bus))
                    .unwrap_or(AudioTransportType::Unknown);

                devices.push(AudioDevice {
                    is_default: default_id.as_deref() == Some(id.as_str()),
                    id,
                    name,
                    transport_type: Some(transport_type),
                });
            }

            log::debug!("found {} capture endpoints", devices.len());
            Ok(devices)
        }
    }

    /// Endpoint id of the default microphone for `role`.
    pub fn default_device_id(&self, role: ERole) -> Result<String, CaptureError> {
        unsafe {
            let device = self
                .enumerator
                .GetDefaultAudioEndpoint(eCapture, role)
                .map_err(|e| CaptureError::DeviceUnavailable(format!("no default capture endpoint: {}", e)))?;
            device_id(&device).ok_or_else(|| CaptureError::DeviceUnavailable("endpoint has no id".into()))
        }
    }

    /// Default capture endpoint for `role`, or the endpoint with `id`.
    pub(crate) fn capture_endpoint(&self, id: Option<&str>, role: ERole) -> Result<IMMDevice, CaptureError> {
        unsafe {
            match id {
                Some(id) => {
                    let wide: Vec<u16> = id.encode_utf16().chain(std::iter::once(0)).collect();
                    self.enumerator
                        .GetDevice(PCWSTR(wide.as_ptr()))
                        .map_err(|e| CaptureError::DeviceUnavailable(format!("endpoint {} not found: {}", id, e)))
                }
                None => self
                    .enumerator
                    .GetDefaultAudioEndpoint(eCapture, role)
                    .map_err(|e| CaptureError::DeviceUnavailable(format!("no default capture endpoint: {}", e))),
            }
        }
    }
}

/// Initialize COM on this thread and list capture endpoints.
pub fn capture_devices() -> Result<Vec<AudioDevice>, CaptureError> {
    let _com = ComGuard::init()?;
    DeviceEnumerator::new()?.list_capture_devices()
}

fn device_id(device: &IMMDevice) -> Option<String> {
    unsafe {
        let raw = device.GetId().ok()?;
        let id = raw.to_string().ok();
        CoTaskMemFree(Some(raw.0 as *const _));
        id
    }
}

fn read_string(store: &IPropertyStore, key: &PROPERTYKEY) -> Option<String> {
    let value = unsafe { store.GetValue(key) }.ok()?;
    let text = value.to_string();
    (!text.is_empty()).then_some(text)
}

/// Map a PnP enumerator name (`USB`, `BTHENUM`, ...) to a transport type.
fn transport_from_bus(bus: &str) -> AudioTransportType {
    match bus {
        "BTHENUM" => AudioTransportType::Bluetooth,
        "BTHLEENUM" => AudioTransportType::BluetoothLE,
        "USB" => AudioTransportType::Usb,
        "SWD" | "ROOT" => AudioTransportType::Virtual,
        _ => AudioTransportType::BuiltIn,
    }
}
