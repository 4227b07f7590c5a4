//! # audio-rx-core
//!
//! Platform-agnostic microphone capture core library.
//!
//! Pulls fixed-size PCM frames from a blocking device source on a dedicated
//! thread, enforces a maximum recording length, optionally streams frame
//! data and loudness to an event sink, and persists the accepted samples as
//! a standard WAV file. Platform backends (Windows WASAPI) implement the
//! `CaptureProvider` and `FrameSource` traits and plug into `CaptureSession`.
//!
//! ## Architecture
//!
//! ```text
//! audio-rx-core (this crate)
//! ├── traits/       ← CaptureProvider, FrameSource, EventSink
//! ├── models/       ← CaptureError, SessionConfig, SessionState, StopCause, events
//! ├── processing/   ← loudness meter, WAV header generation, RingBuffer
//! ├── session/      ← CaptureSession (capture loop), Recorder (single active session)
//! └── storage/      ← output paths, PCM scratch writer, WAV finalization
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{AudioDevice, AudioSourceKind, AudioTransportType, PcmFormat};
pub use models::config::{CaptureOptions, SessionConfig};
pub use models::error::CaptureError;
pub use models::events::{CaptureEvent, StopEventPayload, FRAME_DATA_EVENT, STOP_EVENT, VOLUME_EVENT};
pub use models::state::{SessionState, StopCause, StopStatus, FILE_PATH_NA};
pub use processing::loudness::measure_dbfs;
pub use processing::ring_buffer::RingBuffer;
pub use session::capture::CaptureSession;
pub use session::recorder::Recorder;
pub use storage::paths::OutputPaths;
pub use traits::capture_provider::CaptureProvider;
pub use traits::event_sink::{ChannelEventSink, EventSink};
pub use traits::frame_source::{FrameSource, BUFFER_SAFETY_FACTOR};
