use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::config::{CaptureOptions, SessionConfig};
use crate::models::error::CaptureError;
use crate::models::state::{SessionState, StopStatus};
use crate::storage::paths;
use crate::traits::capture_provider::CaptureProvider;
use crate::traits::event_sink::EventSink;

use super::capture::CaptureSession;

/// Host-facing recorder: `init`, `start`, `stop`.
///
/// Holds the resolved configuration and at most one active
/// [`CaptureSession`]. Hosts typically keep it behind a mutex in their
/// managed state.
pub struct Recorder<P: CaptureProvider> {
    provider: Arc<P>,
    storage_dir: PathBuf,
    config: Option<Arc<SessionConfig>>,
    sink: Option<Arc<dyn EventSink>>,
    session: Option<CaptureSession<P>>,
}

impl<P: CaptureProvider> Recorder<P> {
    /// Recorder storing output under `storage_dir`.
    pub fn new(provider: P, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            provider: Arc::new(provider),
            storage_dir: storage_dir.into(),
            config: None,
            sink: None,
            session: None,
        }
    }

    /// Recorder storing output in the platform's local data directory.
    pub fn with_default_storage(provider: P) -> Self {
        Self::new(provider, paths::default_storage_dir())
    }

    /// Route events of every later session to `sink`.
    pub fn subscribe(&mut self, sink: Arc<dyn EventSink>) {
        self.sink = Some(sink);
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_deref()
    }

    /// Resolve and store capture options.
    ///
    /// Fails with [`CaptureError::SessionActive`] while a session is running,
    /// since a session's configuration cannot change under it.
    pub fn init(&mut self, options: &CaptureOptions) -> Result<(), CaptureError> {
        if self.is_recording() {
            return Err(CaptureError::SessionActive);
        }

        let config = SessionConfig::from_options(options, &self.storage_dir)?;
        config.log_summary();
        self.config = Some(Arc::new(config));
        Ok(())
    }

    /// Start a new session. Recording proceeds on the capture thread.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        let config = self.config.clone().ok_or(CaptureError::NotConfigured)?;
        if self.is_recording() {
            return Err(CaptureError::SessionActive);
        }

        // The previous session has already fired its terminal event.
        if let Some(mut previous) = self.session.take() {
            previous.wait();
        }

        let mut session = CaptureSession::new(Arc::clone(&self.provider), config);
        if let Some(ref sink) = self.sink {
            session.set_event_sink(Arc::clone(sink));
        }
        session.start()?;

        self.session = Some(session);
        Ok(())
    }

    /// Request the active session to stop. No-op without one.
    pub fn stop(&self) {
        match self.session {
            Some(ref session) => session.stop(),
            None => log::debug!("stop requested with no active session"),
        }
    }

    /// Whether a session is running or still finalizing.
    pub fn is_recording(&self) -> bool {
        self.session_state().is_active()
    }

    pub fn session_state(&self) -> SessionState {
        self.session
            .as_ref()
            .map(CaptureSession::state)
            .unwrap_or(SessionState::Idle)
    }

    /// Block until the current session finishes. See [`CaptureSession::wait`].
    pub fn wait(&mut self) -> Option<StopStatus> {
        self.session.as_mut()?.wait()
    }
}
