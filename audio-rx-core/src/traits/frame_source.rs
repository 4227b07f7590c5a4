use crate::models::error::CaptureError;

/// Safety multiplier applied to the device-reported minimum buffer size.
pub const BUFFER_SAFETY_FACTOR: usize = 2;

/// A blocking source of raw interleaved PCM frames.
///
/// Created by [`CaptureProvider::open`](super::capture_provider::CaptureProvider::open)
/// on the capture thread and used only there, so implementations may hold
/// thread-affine device handles.
pub trait FrameSource {
    /// Byte capacity a frame buffer should have: the device minimum for the
    /// configured format times [`BUFFER_SAFETY_FACTOR`].
    fn frame_capacity(&self) -> usize;

    /// Begin hardware capture.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Block until at least one sample is available, then copy as many
    /// bytes as fit into `buf`.
    ///
    /// Returns `Ok(0)` once the stream has ended or the device was stopped.
    /// The session applies no timeout of its own. A backend that gives up on
    /// a stalled device returns an error, which ends the session with
    /// [`StopCause::Error`](crate::models::state::StopCause::Error).
    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError>;

    /// Halt hardware capture. Calling it again is a no-op.
    fn stop(&mut self) -> Result<(), CaptureError>;
}
