//! # audio-rx-windows
//!
//! Windows WASAPI backend for audio-rx.
//!
//! Provides:
//! - `WasapiMicProvider` / `WasapiFrameSource`: microphone capture via a WASAPI capture endpoint
//! - `DeviceEnumerator`: capture endpoint enumeration via the MMDevice API
//! - `permissions`: Windows microphone privacy check
//!
//! ## Platform Requirements
//! - Windows 10 (RAW stream mode needs 8.1 or later)
//! - Visual Studio Build Tools 2022 + Windows SDK for linking
//!
//! ## Usage
//! ```ignore
//! use audio_rx_core::{CaptureOptions, Recorder};
//! use audio_rx_windows::WasapiMicProvider;
//!
//! let mut recorder = Recorder::with_default_storage(WasapiMicProvider::default_device());
//! recorder.init(&CaptureOptions::from_json(r#"{"sampleRate": 16000, "maxDuration": 5}"#)?)?;
//! recorder.start()?;
//! ```

#[cfg(target_os = "windows")]
mod com;
#[cfg(target_os = "windows")]
pub mod device_enumerator;
#[cfg(target_os = "windows")]
pub mod permissions;
#[cfg(target_os = "windows")]
pub mod wasapi_mic;

#[cfg(target_os = "windows")]
pub use device_enumerator::{capture_devices, DeviceEnumerator};
#[cfg(target_os = "windows")]
pub use wasapi_mic::{WasapiFrameSource, WasapiMicProvider};
