use std::sync::mpsc::Sender;

use crate::models::events::CaptureEvent;
use crate::models::state::StopStatus;

/// Receiver for capture session events.
///
/// All methods are called from the capture thread, in frame order, and
/// `on_stopped` is always the last call for a session. Delivery is
/// fire-and-forget: implementations must not block for long and have no
/// way to fail the session.
pub trait EventSink: Send + Sync {
    /// Base64 copy of a raw frame.
    fn on_frame_data(&self, encoded: &str);

    /// Frame loudness in dBFS.
    fn on_volume(&self, dbfs: f64);

    /// Called exactly once when the session has fully stopped.
    fn on_stopped(&self, status: &StopStatus);
}

/// [`EventSink`] that forwards every event into an mpsc channel.
///
/// A dropped receiver does not disturb capture; events are discarded.
pub struct ChannelEventSink {
    tx: Sender<CaptureEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: Sender<CaptureEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: CaptureEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("event receiver dropped, discarding event");
        }
    }
}

impl EventSink for ChannelEventSink {
    fn on_frame_data(&self, encoded: &str) {
        self.send(CaptureEvent::FrameData(encoded.to_string()));
    }

    fn on_volume(&self, dbfs: f64) {
        self.send(CaptureEvent::Volume(dbfs));
    }

    fn on_stopped(&self, status: &StopStatus) {
        self.send(CaptureEvent::Stopped(status.clone()));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::models::state::StopCause;

    #[test]
    fn forwards_events_in_order() {
        let (tx, rx) = mpsc::channel();
        let sink = ChannelEventSink::new(tx);

        sink.on_frame_data("AAA=");
        sink.on_volume(-20.0);
        sink.on_stopped(&StopStatus {
            cause: StopCause::UserRequest,
            file_path: None,
        });

        let events: Vec<CaptureEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], CaptureEvent::FrameData("AAA=".into()));
        assert_eq!(events[1], CaptureEvent::Volume(-20.0));
        assert!(events[2].is_terminal());
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let sink = ChannelEventSink::new(tx);
        sink.on_volume(-3.0);
        sink.on_frame_data("");
    }
}
