#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use audio_rx_core::{
    AudioDevice, CaptureError, CaptureEvent, CaptureProvider, ChannelEventSink, FrameSource, SessionConfig,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Counters shared between a provider and the sources it opens.
#[derive(Debug, Default)]
pub struct DeviceCounters {
    pub opened: AtomicUsize,
    pub started: AtomicUsize,
    pub stopped: AtomicUsize,
    pub frames_delivered: AtomicUsize,
}

/// In-memory capture device replaying a fixed list of frames.
pub struct ScriptedProvider {
    script: Vec<Vec<u8>>,
    capacity: usize,
    live_tail: Option<Vec<u8>>,
    fail_open: bool,
    fail_read_after: Option<usize>,
    pub counters: Arc<DeviceCounters>,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Vec<u8>>) -> Self {
        let capacity = script.iter().map(Vec::len).max().unwrap_or(64);
        Self {
            script,
            capacity,
            live_tail: None,
            fail_open: false,
            fail_read_after: None,
            counters: Arc::new(DeviceCounters::default()),
        }
    }

    /// After the script runs out, keep delivering `frame` every couple of
    /// milliseconds, like a live microphone, instead of ending the stream.
    pub fn live(mut self, frame: Vec<u8>) -> Self {
        self.capacity = self.capacity.max(frame.len());
        self.live_tail = Some(frame);
        self
    }

    pub fn failing_open() -> Self {
        let mut provider = Self::new(Vec::new());
        provider.fail_open = true;
        provider
    }

    /// Fail the read that follows `frames` successful reads.
    pub fn fail_read_after(mut self, frames: usize) -> Self {
        self.fail_read_after = Some(frames);
        self
    }
}

impl CaptureProvider for ScriptedProvider {
    type Source = ScriptedSource;

    fn is_available(&self) -> bool {
        !self.fail_open
    }

    fn open(&self, _config: &SessionConfig) -> Result<ScriptedSource, CaptureError> {
        if self.fail_open {
            return Err(CaptureError::DeviceUnavailable("scripted device is unplugged".into()));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedSource {
            frames: self.script.iter().cloned().collect(),
            capacity: self.capacity,
            live_tail: self.live_tail.clone(),
            fail_read_after: self.fail_read_after,
            reads: 0,
            started: false,
            counters: Arc::clone(&self.counters),
        })
    }

    fn device_info(&self) -> AudioDevice {
        AudioDevice {
            id: "scripted".into(),
            name: "Scripted Microphone".into(),
            is_default: true,
            transport_type: None,
        }
    }
}

pub struct ScriptedSource {
    frames: VecDeque<Vec<u8>>,
    capacity: usize,
    live_tail: Option<Vec<u8>>,
    fail_read_after: Option<usize>,
    reads: usize,
    started: bool,
    counters: Arc<DeviceCounters>,
}

impl FrameSource for ScriptedSource {
    fn frame_capacity(&self) -> usize {
        self.capacity
    }

    fn start(&mut self) -> Result<(), CaptureError> {
        self.started = true;
        self.counters.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        if !self.started {
            return Ok(0);
        }
        if self.fail_read_after == Some(self.reads) {
            return Err(CaptureError::DeviceUnavailable("scripted read failure".into()));
        }
        self.reads += 1;

        let frame = match self.frames.pop_front() {
            Some(frame) => frame,
            None => match self.live_tail {
                Some(ref tail) => {
                    thread::sleep(Duration::from_millis(2));
                    tail.clone()
                }
                None => return Ok(0),
            },
        };

        let n = frame.len().min(buf.len());
        buf[..n].copy_from_slice(&frame[..n]);
        self.counters.frames_delivered.fetch_add(1, Ordering::SeqCst);
        Ok(n)
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        if self.started {
            self.started = false;
            self.counters.stopped.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

pub fn channel_sink() -> (Arc<ChannelEventSink>, Receiver<CaptureEvent>) {
    let (tx, rx) = mpsc::channel();
    (Arc::new(ChannelEventSink::new(tx)), rx)
}

/// Signed 16-bit little-endian samples.
pub fn pcm16(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// A mono 16-bit frame of `samples` copies of `value`.
pub fn mono16_frame(value: i16, samples: usize) -> Vec<u8> {
    pcm16(&vec![value; samples])
}

pub fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}
