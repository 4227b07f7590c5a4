use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::config::SessionConfig;
use crate::models::error::CaptureError;
use crate::models::state::{SessionState, StopCause, StopStatus};
use crate::processing::loudness;
use crate::storage::pcm_writer::PcmScratchWriter;
use crate::storage::wav_file;
use crate::traits::capture_provider::CaptureProvider;
use crate::traits::event_sink::EventSink;
use crate::traits::frame_source::FrameSource;

/// Frames discarded after capture starts. The first reads carry an audible
/// click from the hardware warming up.
pub const WARMUP_FRAMES: u64 = 2;

/// State touched from both the caller's context and the capture thread.
///
/// Lock order: `state` before `stop_cause`.
struct SharedState {
    running: AtomicBool,
    state: Mutex<SessionState>,
    stop_cause: Mutex<Option<StopCause>>,
}

impl SharedState {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            state: Mutex::new(SessionState::Idle),
            stop_cause: Mutex::new(None),
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Running → stopping with `cause`. Returns false (and changes nothing)
    /// if the session is not running.
    fn request_stop(&self, cause: StopCause) -> bool {
        let mut state = self.state.lock();
        if !state.is_running() {
            return false;
        }
        *state = SessionState::Stopping;
        self.stop_cause.lock().get_or_insert(cause);
        self.running.store(false, Ordering::SeqCst);
        true
    }

    /// Record a failure. Overrides any earlier cause.
    fn fail(&self) {
        let mut state = self.state.lock();
        if state.is_running() {
            *state = SessionState::Stopping;
        }
        *self.stop_cause.lock() = Some(StopCause::Error);
        self.running.store(false, Ordering::SeqCst);
    }

    fn set_state(&self, new_state: SessionState) {
        *self.state.lock() = new_state;
    }
}

/// One recording from start to terminal event.
///
/// `start` spawns a dedicated capture thread and returns immediately.
/// `stop` only requests a halt: the thread notices after its current
/// blocking read returns, finalizes the output and fires the terminal event.
///
/// ```text
/// [FrameSource] → warm-up skip → sample limit → ┬→ EventSink (frame data, volume)
///                                               └→ PcmScratchWriter → finalize → WAV
/// ```
pub struct CaptureSession<P: CaptureProvider> {
    id: Uuid,
    provider: Arc<P>,
    config: Arc<SessionConfig>,
    shared: Arc<SharedState>,
    sink: Option<Arc<dyn EventSink>>,
    capture_handle: Option<thread::JoinHandle<StopStatus>>,
}

impl<P: CaptureProvider> CaptureSession<P> {
    pub fn new(provider: Arc<P>, config: Arc<SessionConfig>) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider,
            config,
            shared: Arc::new(SharedState::new()),
            sink: None,
            capture_handle: None,
        }
    }

    pub fn set_event_sink(&mut self, sink: Arc<dyn EventSink>) {
        self.sink = Some(sink);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        *self.shared.state.lock()
    }

    /// True once a stop has been requested or the session has ended.
    pub fn is_stopping(&self) -> bool {
        matches!(self.state(), SessionState::Stopping | SessionState::Stopped)
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    pub fn stop_cause(&self) -> Option<StopCause> {
        *self.shared.stop_cause.lock()
    }

    /// Start capture. Transitions: idle → running.
    ///
    /// Device acquisition happens on the capture thread. If it fails, the
    /// session stops on its own with [`StopCause::Error`].
    pub fn start(&mut self) -> Result<(), CaptureError> {
        {
            let mut state = self.shared.state.lock();
            if !state.is_idle() {
                return Err(CaptureError::SessionActive);
            }
            *state = SessionState::Running;
            self.shared.running.store(true, Ordering::SeqCst);
        }

        let capture_loop = CaptureLoop {
            id: self.id,
            provider: Arc::clone(&self.provider),
            config: Arc::clone(&self.config),
            shared: Arc::clone(&self.shared),
            sink: self.sink.clone(),
        };

        let handle = thread::Builder::new()
            .name("audio-rx-capture".into())
            .spawn(move || capture_loop.run())
            .map_err(|e| {
                self.shared.running.store(false, Ordering::SeqCst);
                self.shared.set_state(SessionState::Idle);
                CaptureError::Unknown(format!("failed to spawn capture thread: {}", e))
            })?;

        self.capture_handle = Some(handle);
        log::info!("session {}: started", self.id);
        Ok(())
    }

    /// Request a halt. Transitions: running → stopping.
    ///
    /// No-op if the session is not running.
    pub fn stop(&self) {
        if self.shared.request_stop(StopCause::UserRequest) {
            log::info!("session {}: stop requested", self.id);
        }
    }

    /// Block until the capture thread has finished and return its outcome.
    ///
    /// Returns `None` if the session was never started or was already waited on.
    pub fn wait(&mut self) -> Option<StopStatus> {
        let handle = self.capture_handle.take()?;
        match handle.join() {
            Ok(status) => Some(status),
            Err(_) => {
                log::error!("session {}: capture thread panicked", self.id);
                None
            }
        }
    }
}

impl<P: CaptureProvider> Drop for CaptureSession<P> {
    fn drop(&mut self) {
        // The thread is left to finalize and report on its own.
        self.shared.request_stop(StopCause::UserRequest);
    }
}

/// Everything the capture thread owns.
struct CaptureLoop<P: CaptureProvider> {
    id: Uuid,
    provider: Arc<P>,
    config: Arc<SessionConfig>,
    shared: Arc<SharedState>,
    sink: Option<Arc<dyn EventSink>>,
}

impl<P: CaptureProvider> CaptureLoop<P> {
    fn run(self) -> StopStatus {
        let mut scratch = None;

        match self.provider.open(&self.config) {
            Ok(mut source) => {
                if let Err(e) = self.capture(&mut source, &mut scratch) {
                    log::error!("session {}: capture failed: {}", self.id, e);
                    self.shared.fail();
                }
                if let Err(e) = source.stop() {
                    log::warn!("session {}: failed to stop capture device: {}", self.id, e);
                }
            }
            Err(e) => {
                log::error!("session {}: failed to open capture device: {}", self.id, e);
                self.shared.fail();
            }
        }

        let file_path = self.finish(scratch);

        let cause = (*self.shared.stop_cause.lock()).unwrap_or(StopCause::Error);
        let status = StopStatus { cause, file_path };
        log::info!(
            "session {}: stopped with {} ({})",
            self.id,
            cause.code(),
            status.file_path_or_na()
        );

        // A recorder joins this thread before starting the next session, so
        // the terminal event still precedes any event of the next one.
        self.shared.set_state(SessionState::Stopped);
        if let Some(ref sink) = self.sink {
            sink.on_stopped(&status);
        }
        status
    }

    /// Pump frames until stopped. Errors end the session with `StopCause::Error`.
    fn capture(&self, source: &mut P::Source, scratch: &mut Option<PcmScratchWriter>) -> Result<(), CaptureError> {
        source.start()?;

        if let Some(ref output) = self.config.output {
            *scratch = Some(PcmScratchWriter::create(&output.temp_pcm)?);
        }

        let format = self.config.format;
        let bytes_per_sample_frame = format.block_align() as usize;
        let max_num_samples = self.config.max_num_samples;

        let mut frame = vec![0u8; source.frame_capacity().max(bytes_per_sample_frame)];
        log::debug!("session {}: frameBufferSize: {}", self.id, frame.len());

        let mut frames_read: u64 = 0;
        let mut num_samples_processed: u64 = 0;

        while self.shared.is_running() {
            let bytes_read = source.read_frame(&mut frame)?.min(frame.len());
            if bytes_read == 0 {
                if self.shared.is_running() {
                    log::warn!("session {}: capture stream ended", self.id);
                    self.shared.fail();
                }
                break;
            }

            frames_read += 1;
            if frames_read <= WARMUP_FRAMES {
                continue;
            }

            let data = &frame[..bytes_read];

            let mut num_samples = (bytes_read / bytes_per_sample_frame) as u64;
            let remaining = max_num_samples - num_samples_processed;
            if num_samples >= remaining {
                num_samples = remaining;
                self.shared.request_stop(StopCause::MaxSamplesReached);
            }

            if let Some(ref sink) = self.sink {
                if self.config.report_frame_data {
                    sink.on_frame_data(&BASE64.encode(data));
                }
                if self.config.report_volume {
                    sink.on_volume(loudness::measure_dbfs(data, format.byte_depth, format.channels));
                }
            }

            if let Some(writer) = scratch.as_mut() {
                writer.write(&data[..num_samples as usize * bytes_per_sample_frame])?;
            }

            num_samples_processed += num_samples;
        }

        log::info!(
            "session {}: captured {} samples from {} frames",
            self.id,
            num_samples_processed,
            frames_read
        );
        Ok(())
    }

    /// Close scratch storage, encode the WAV and remove the scratch file.
    /// Returns the final file path if a waveform file was produced.
    fn finish(&self, scratch: Option<PcmScratchWriter>) -> Option<PathBuf> {
        let output = self.config.output.as_ref()?;
        let Some(mut writer) = scratch else {
            log::warn!("session {}: no sample data was stored, skipping save", self.id);
            return None;
        };

        if let Err(e) = writer.close() {
            log::error!("session {}: failed to close scratch file: {}", self.id, e);
            self.shared.fail();
        }

        let temp_pcm = writer.file_path();
        let file_path = match wav_file::finalize(Some(temp_pcm), Some(&output.wav), &self.config.format) {
            Ok(bytes) => {
                log::info!("session {}: saved {} sample bytes to {}", self.id, bytes, output.wav.display());
                Some(output.wav.clone())
            }
            Err(e) => {
                log::error!("session {}: failed to save {}: {}", self.id, output.wav.display(), e);
                self.shared.fail();
                None
            }
        };

        match fs::remove_file(temp_pcm) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                log::error!("session {}: failed to delete {}: {}", self.id, temp_pcm.display(), e);
                self.shared.fail();
            }
        }

        file_path
    }
}
