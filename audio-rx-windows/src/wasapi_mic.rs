//! WASAPI microphone frame source.
//!
//! Opens a capture endpoint in shared, event-driven mode with the session's
//! exact PCM format (the audio engine converts from its mix format). Packets
//! are staged in a [`RingBuffer`] and handed out by blocking `read_frame`
//! calls on the session's capture thread.

use windows::core::Interface;
use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0, WAIT_TIMEOUT};
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Threading::{CreateEventW, WaitForSingleObject};

use audio_rx_core::{
    AudioDevice, AudioSourceKind, CaptureError, CaptureProvider, FrameSource, PcmFormat, RingBuffer, SessionConfig,
    BUFFER_SAFETY_FACTOR,
};

use crate::com::ComGuard;
use crate::device_enumerator::DeviceEnumerator;
use crate::permissions;

/// Requested engine buffer: 100 ms in 100-nanosecond units.
const ENGINE_BUFFER_DURATION: i64 = 1_000_000;

/// Longest wait for a packet before the device is considered stalled.
const PACKET_TIMEOUT_MS: u32 = 2_000;

/// Staged packets kept between reads, in frame buffers.
const STAGING_FRAMES: usize = 8;

/// Microphone capture through WASAPI.
///
/// Holds only the endpoint selection. COM objects live in the
/// [`WasapiFrameSource`] created on the capture thread.
pub struct WasapiMicProvider {
    device_id: Option<String>,
    device_name: String,
}

impl WasapiMicProvider {
    /// The system default microphone. `VoiceCommunication` sessions use the
    /// default communications device instead.
    pub fn default_device() -> Self {
        Self {
            device_id: None,
            device_name: "Default Microphone".into(),
        }
    }

    /// A specific endpoint, as listed by [`DeviceEnumerator`].
    pub fn with_device(device: &AudioDevice) -> Self {
        Self {
            device_id: Some(device.id.clone()),
            device_name: device.name.clone(),
        }
    }
}

impl CaptureProvider for WasapiMicProvider {
    type Source = WasapiFrameSource;

    fn is_available(&self) -> bool {
        permissions::check_microphone_permission().unwrap_or_else(|e| {
            log::warn!("microphone permission check failed: {}", e);
            false
        })
    }

    fn open(&self, config: &SessionConfig) -> Result<WasapiFrameSource, CaptureError> {
        let com = ComGuard::init()?;
        let role = endpoint_role(config.audio_source);
        let device = DeviceEnumerator::new()?.capture_endpoint(self.device_id.as_deref(), role)?;

        unsafe {
            let audio_client: IAudioClient = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|e| CaptureError::DeviceUnavailable(format!("Activate failed: {}", e)))?;

            set_stream_properties(&audio_client, config.audio_source);

            let wave_format = wave_format(&config.format)?;
            audio_client
                .Initialize(
                    AUDCLNT_SHAREMODE_SHARED,
                    AUDCLNT_STREAMFLAGS_EVENTCALLBACK
                        | AUDCLNT_STREAMFLAGS_AUTOCONVERTPCM
                        | AUDCLNT_STREAMFLAGS_SRC_DEFAULT_QUALITY
                        | AUDCLNT_STREAMFLAGS_NOPERSIST,
                    ENGINE_BUFFER_DURATION,
                    0,
                    &wave_format,
                    None,
                )
                .map_err(|e| {
                    CaptureError::DeviceUnavailable(format!(
                        "IAudioClient::Initialize failed for {} Hz, {} ch, {}-bit: {}",
                        config.format.sample_rate,
                        config.format.channels,
                        config.format.bits_per_sample(),
                        e
                    ))
                })?;

            let mut default_period: i64 = 0;
            audio_client
                .GetDevicePeriod(Some(&mut default_period), None)
                .map_err(|e| CaptureError::DeviceUnavailable(format!("GetDevicePeriod failed: {}", e)))?;
            let frame_capacity = frame_capacity(&config.format, default_period);

            let event = CreateEventW(None, false, false, None)
                .map_err(|e| CaptureError::Unknown(format!("CreateEventW failed: {}", e)))?;
            // From here on `source` owns the event handle.
            let mut source = WasapiFrameSource {
                capture_client: None,
                audio_client,
                event,
                staging: RingBuffer::new(frame_capacity * STAGING_FRAMES),
                block_align: config.format.block_align() as usize,
                silence: silence_byte(config.format.byte_depth),
                frame_capacity,
                started: false,
                _com: com,
            };
            source
                .audio_client
                .SetEventHandle(source.event)
                .map_err(|e| CaptureError::DeviceUnavailable(format!("SetEventHandle failed: {}", e)))?;
            source.capture_client = Some(
                source
                    .audio_client
                    .GetService()
                    .map_err(|e| CaptureError::DeviceUnavailable(format!("GetService failed: {}", e)))?,
            );

            log::info!(
                "opened {} (device period {} µs, frame capacity {} bytes)",
                self.device_name,
                default_period / 10,
                frame_capacity
            );
            Ok(source)
        }
    }

    fn device_info(&self) -> AudioDevice {
        AudioDevice {
            id: self.device_id.clone().unwrap_or_else(|| "default-mic".into()),
            name: self.device_name.clone(),
            is_default: self.device_id.is_none(),
            transport_type: None,
        }
    }
}

/// An opened, initialized WASAPI capture stream.
pub struct WasapiFrameSource {
    capture_client: Option<IAudioCaptureClient>,
    audio_client: IAudioClient,
    event: HANDLE,
    staging: RingBuffer,
    block_align: usize,
    silence: u8,
    frame_capacity: usize,
    started: bool,
    // Dropped last: COM must outlive the interfaces above.
    _com: ComGuard,
}

impl WasapiFrameSource {
    /// Move every pending packet into the staging buffer.
    fn drain_packets(&mut self) -> Result<(), CaptureError> {
        let client = self
            .capture_client
            .as_ref()
            .ok_or_else(|| CaptureError::DeviceUnavailable("capture client missing".into()))?;

        unsafe {
            loop {
                let packet_frames = client
                    .GetNextPacketSize()
                    .map_err(|e| CaptureError::DeviceUnavailable(format!("GetNextPacketSize failed: {}", e)))?;
                if packet_frames == 0 {
                    return Ok(());
                }

                let mut data: *mut u8 = std::ptr::null_mut();
                let mut num_frames: u32 = 0;
                let mut flags: u32 = 0;
                client
                    .GetBuffer(&mut data, &mut num_frames, &mut flags, None, None)
                    .map_err(|e| CaptureError::DeviceUnavailable(format!("GetBuffer failed: {}", e)))?;

                let len = num_frames as usize * self.block_align;
                let dropped = if flags & (AUDCLNT_BUFFERFLAGS_SILENT.0 as u32) != 0 || data.is_null() {
                    self.staging.write(&vec![self.silence; len])
                } else {
                    self.staging.write(std::slice::from_raw_parts(data, len))
                };
                if dropped > 0 {
                    log::warn!("staging buffer overflow, dropped {} bytes", dropped);
                }

                client
                    .ReleaseBuffer(num_frames)
                    .map_err(|e| CaptureError::DeviceUnavailable(format!("ReleaseBuffer failed: {}", e)))?;
            }
        }
    }
}

impl FrameSource for WasapiFrameSource {
    fn frame_capacity(&self) -> usize {
        self.frame_capacity
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        if self.started {
            return Ok(());
        }
        unsafe {
            self.audio_client
                .Start()
                .map_err(|e| CaptureError::DeviceUnavailable(format!("IAudioClient::Start failed: {}", e)))?;
        }
        self.started = true;
        Ok(())
    }

    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        // Hand out whole sample-frames only.
        let wanted = buf.len() - buf.len() % self.block_align;

        while self.started {
            if self.staging.count() >= self.block_align {
                let staged = self.staging.count() - self.staging.count() % self.block_align;
                return Ok(self.staging.read_into(&mut buf[..wanted.min(staged)]));
            }

            match unsafe { WaitForSingleObject(self.event, PACKET_TIMEOUT_MS) } {
                WAIT_OBJECT_0 => self.drain_packets()?,
                WAIT_TIMEOUT => {
                    return Err(CaptureError::DeviceUnavailable(format!(
                        "no audio from device for {} ms",
                        PACKET_TIMEOUT_MS
                    )))
                }
                other => {
                    return Err(CaptureError::DeviceUnavailable(format!(
                        "waiting for audio failed: {:?}",
                        other
                    )))
                }
            }
        }
        Ok(0)
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        if !self.started {
            return Ok(());
        }
        self.started = false;
        self.staging.reset();
        unsafe {
            self.audio_client
                .Stop()
                .map_err(|e| CaptureError::DeviceUnavailable(format!("IAudioClient::Stop failed: {}", e)))
        }
    }
}

impl Drop for WasapiFrameSource {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("{}", e);
        }
        unsafe {
            let _ = CloseHandle(self.event);
        }
    }
}

/// Role of the default endpoint opened for `source`.
fn endpoint_role(source: AudioSourceKind) -> ERole {
    match source {
        AudioSourceKind::VoiceCommunication => eCommunications,
        _ => eConsole,
    }
}

/// Ask for the RAW signal path, which bypasses endpoint effects including
/// AGC. Endpoints without RAW support keep their default processing.
unsafe fn set_stream_properties(audio_client: &IAudioClient, source: AudioSourceKind) {
    let Ok(client2) = audio_client.cast::<IAudioClient2>() else {
        log::debug!("IAudioClient2 not available, using default stream processing");
        return;
    };

    let category = match source {
        AudioSourceKind::VoiceCommunication => AudioCategory_Communications,
        kind if kind.is_speech() => AudioCategory_Speech,
        _ => AudioCategory_Other,
    };
    let mut properties = AudioClientProperties {
        cbSize: std::mem::size_of::<AudioClientProperties>() as u32,
        bIsOffload: false.into(),
        eCategory: category,
        Options: AUDCLNT_STREAMOPTIONS_RAW,
    };

    if let Err(e) = client2.SetClientProperties(&properties) {
        log::info!("RAW capture unsupported ({}), endpoint processing stays on", e);
        properties.Options = AUDCLNT_STREAMOPTIONS_NONE;
        if let Err(e) = client2.SetClientProperties(&properties) {
            log::warn!("SetClientProperties failed: {}", e);
        }
    }
}

fn wave_format(format: &PcmFormat) -> Result<WAVEFORMATEX, CaptureError> {
    let byte_rate = format
        .byte_rate()
        .ok_or_else(|| CaptureError::InvalidConfig(format!("unsupported sample rate {}", format.sample_rate)))?;
    Ok(WAVEFORMATEX {
        wFormatTag: WAVE_FORMAT_PCM as u16,
        nChannels: format.channels,
        nSamplesPerSec: format.sample_rate,
        nAvgBytesPerSec: byte_rate,
        nBlockAlign: format.block_align(),
        wBitsPerSample: format.bits_per_sample(),
        cbSize: 0,
    })
}

/// Bytes in one device period of `format`, times [`BUFFER_SAFETY_FACTOR`].
fn frame_capacity(format: &PcmFormat, device_period_hns: i64) -> usize {
    let period = device_period_hns.max(0) as u64;
    let frames_per_period = (format.sample_rate as u64 * period).div_ceil(10_000_000).max(1) as usize;
    frames_per_period * format.block_align() as usize * BUFFER_SAFETY_FACTOR
}

/// Unsigned 8-bit PCM is centred on 128.
fn silence_byte(byte_depth: u16) -> u8 {
    if byte_depth == 1 {
        128
    } else {
        0
    }
}
