use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wake_watch::actuator::{ActuatorCommand, CommandChannel};
use wake_watch::detection::{AnnotatedFrame, Frame};
use wake_watch::services::{Alarm, AlarmError, GeoError, GeoLocator, Location, SmsError, SmsSender};
use wake_watch::session::{CaptureError, FrameSink, FrameSource, SinkControl};

/// Records every command written to the actuator, in order.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    commands: Arc<Mutex<Vec<ActuatorCommand>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingChannel {
    pub fn commands(&self) -> Vec<ActuatorCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl CommandChannel for RecordingChannel {
    fn write_command(&mut self, bytes: &[u8]) -> io::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"));
        }
        let command = match bytes {
            b"0\n" => ActuatorCommand::Run,
            b"1\n" => ActuatorCommand::Alert,
            other => panic!("unexpected actuator bytes {other:?}"),
        };
        self.commands.lock().unwrap().push(command);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct CountingAlarm {
    pub plays: Arc<AtomicUsize>,
    pub fail: bool,
}

impl Alarm for CountingAlarm {
    fn play(&self) -> Result<(), AlarmError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AlarmError::NotLoaded);
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeGeo {
    pub location: Option<Location>,
    pub calls: Arc<AtomicUsize>,
}

impl FakeGeo {
    pub fn at(lat: f64, lon: f64) -> Self {
        Self {
            location: Some(Location { lat, lon }),
            calls: Arc::default(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            location: None,
            calls: Arc::default(),
        }
    }
}

impl GeoLocator for FakeGeo {
    async fn locate(&self) -> Result<Location, GeoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.location
            .ok_or_else(|| GeoError::Unavailable("fail".to_string()))
    }
}

#[derive(Clone, Default)]
pub struct FakeSms {
    pub sent: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
}

impl FakeSms {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl SmsSender for FakeSms {
    async fn send(&self, body: &str) -> Result<String, SmsError> {
        if self.fail {
            return Err(SmsError::ApiError {
                status: 401,
                message: "Authenticate".to_string(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(body.to_string());
        Ok(format!("SM{}", sent.len()))
    }
}

/// Yields `frames` pixel-less frames, then fails with a read error.
pub struct FailingSource {
    pub frames: u64,
    next: u64,
}

impl FailingSource {
    pub fn new(frames: u64) -> Self {
        Self { frames, next: 0 }
    }
}

impl FrameSource for FailingSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if self.next >= self.frames {
            return Err(CaptureError::Read("camera disconnected".to_string()));
        }
        self.next += 1;
        Ok(Some(Frame::empty(self.next - 1)))
    }
}

/// Counts presented frames and requests quit after `quit_after`.
#[derive(Default)]
pub struct CountingSink {
    pub presented: usize,
    pub contours: usize,
    pub quit_after: Option<usize>,
}

impl FrameSink for CountingSink {
    fn present(&mut self, frame: &AnnotatedFrame) -> SinkControl {
        self.presented += 1;
        self.contours += frame.contours.len();
        match self.quit_after {
            Some(n) if self.presented >= n => SinkControl::Quit,
            _ => SinkControl::Continue,
        }
    }
}
