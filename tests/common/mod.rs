//! Host fakes for the relay collaborators.
//!
//! All fakes share one [`FakeClock`]. The speaker and microphone advance it
//! by the real-time duration of each chunk, the way the I2S drivers block
//! on target.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use walkie_relay::hal::{
    AudioCapture, AudioSink, Clock, HalError, PushToTalk, RadioLink, StatusIndicator,
};
use walkie_relay::sample::duration_us;
use walkie_relay::{FrameHandler, Sample};

pub const SAMPLE_RATE: u32 = 16_000;

#[derive(Clone, Default)]
pub struct FakeClock {
    now: Rc<Cell<u64>>,
}

impl FakeClock {
    pub fn advance_us(&self, us: u64) {
        self.now.set(self.now.get() + us);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance_us(ms * 1000);
    }

    pub fn set_us(&self, us: u64) {
        self.now.set(us);
    }
}

impl Clock for FakeClock {
    fn now_us(&self) -> u64 {
        self.now.get()
    }
}

/// Microphone replaying a fixed script of samples, then silence.
pub struct FakeMic {
    pub clock: FakeClock,
    pub script: VecDeque<Sample>,
    pub running: bool,
    pub starts: u32,
    pub stops: u32,
    pub fail_start: bool,
    pub fail_reads: bool,
}

impl FakeMic {
    pub fn new(clock: FakeClock) -> Self {
        Self {
            clock,
            script: VecDeque::new(),
            running: false,
            starts: 0,
            stops: 0,
            fail_start: false,
            fail_reads: false,
        }
    }
}

impl AudioCapture for FakeMic {
    fn start(&mut self) -> Result<(), HalError> {
        if self.fail_start {
            return Err(HalError::Driver(-1));
        }
        self.running = true;
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HalError> {
        self.running = false;
        self.stops += 1;
        Ok(())
    }

    fn read(&mut self, buf: &mut [Sample]) -> Result<usize, HalError> {
        if !self.running {
            return Err(HalError::NotStarted);
        }
        self.clock.advance_us(duration_us(buf.len(), SAMPLE_RATE));
        if self.fail_reads {
            return Err(HalError::Driver(-2));
        }
        let n = buf.len().min(self.script.len());
        for slot in buf[..n].iter_mut() {
            *slot = self.script.pop_front().unwrap_or_default();
        }
        Ok(n)
    }
}

/// Speaker recording everything it plays.
#[derive(Clone)]
pub struct FakeSpeaker {
    pub clock: FakeClock,
    pub played: Rc<RefCell<Vec<Sample>>>,
    pub running: Rc<Cell<bool>>,
    pub rates: Rc<RefCell<Vec<u32>>>,
    pub stops: Rc<Cell<u32>>,
}

impl FakeSpeaker {
    pub fn new(clock: FakeClock) -> Self {
        Self {
            clock,
            played: Rc::default(),
            running: Rc::default(),
            rates: Rc::default(),
            stops: Rc::default(),
        }
    }
}

impl AudioSink for FakeSpeaker {
    fn start(&mut self, sample_rate_hz: u32) -> Result<(), HalError> {
        self.rates.borrow_mut().push(sample_rate_hz);
        self.running.set(true);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HalError> {
        self.running.set(false);
        self.stops.set(self.stops.get() + 1);
        Ok(())
    }

    fn write(&mut self, buf: &[Sample]) -> Result<(), HalError> {
        if !self.running.get() {
            return Err(HalError::NotStarted);
        }
        self.clock.advance_us(duration_us(buf.len(), SAMPLE_RATE));
        self.played.borrow_mut().extend_from_slice(buf);
        Ok(())
    }
}

/// Radio recording broadcast frames. Optionally refuses every send.
#[derive(Clone, Default)]
pub struct FakeRadio {
    pub sent: Rc<RefCell<Vec<Vec<u8>>>>,
    pub begun: Rc<Cell<bool>>,
    pub fail_with: Rc<Cell<Option<HalError>>>,
}

impl RadioLink for FakeRadio {
    fn begin(&mut self) -> Result<(), HalError> {
        self.begun.set(true);
        Ok(())
    }

    fn broadcast(&mut self, frame: &[u8]) -> Result<(), HalError> {
        if let Some(e) = self.fail_with.get() {
            return Err(e);
        }
        self.sent.borrow_mut().push(frame.to_vec());
        Ok(())
    }

    fn set_frame_handler<H>(&mut self, _handler: H) -> Result<(), HalError>
    where
        H: FrameHandler + Send + 'static,
    {
        Ok(())
    }
}

/// Radio that hands every registered frame handler to the test.
#[derive(Default)]
pub struct LoopbackRadio {
    pub handler: Option<Box<dyn FrameHandler + Send>>,
}

impl LoopbackRadio {
    pub fn deliver(&self, frame: &[u8]) {
        if let Some(handler) = self.handler.as_ref() {
            handler.on_frame(frame);
        }
    }
}

impl RadioLink for LoopbackRadio {
    fn begin(&mut self) -> Result<(), HalError> {
        Ok(())
    }

    fn broadcast(&mut self, _frame: &[u8]) -> Result<(), HalError> {
        Ok(())
    }

    fn set_frame_handler<H>(&mut self, handler: H) -> Result<(), HalError>
    where
        H: FrameHandler + Send + 'static,
    {
        self.handler = Some(Box::new(handler));
        Ok(())
    }
}

/// Indicator recording the last state it was asked to show.
#[derive(Clone, Default)]
pub struct FakeIndicator {
    pub default_color: Rc<Cell<u32>>,
    pub defaults: Rc<RefCell<Vec<u32>>>,
    pub flashing: Rc<Cell<Option<u32>>>,
    pub history: Rc<RefCell<Vec<(bool, u32)>>>,
}

impl StatusIndicator for FakeIndicator {
    fn set_default_color(&mut self, color: u32) {
        self.default_color.set(color);
        self.defaults.borrow_mut().push(color);
    }

    fn set_flashing(&mut self, enabled: bool, color: u32) {
        self.flashing.set(if enabled { Some(color) } else { None });
        self.history.borrow_mut().push((enabled, color));
    }
}

/// Button held down over `[from_us, until_us)` windows of the fake clock.
#[derive(Clone)]
pub struct ScriptedPtt {
    pub clock: FakeClock,
    pub windows: Rc<RefCell<Vec<(u64, u64)>>>,
    pub reads: Rc<Cell<u32>>,
}

impl ScriptedPtt {
    pub fn new(clock: FakeClock) -> Self {
        Self {
            clock,
            windows: Rc::default(),
            reads: Rc::default(),
        }
    }

    pub fn hold(&self, from_us: u64, until_us: u64) {
        self.windows.borrow_mut().push((from_us, until_us));
    }
}

impl PushToTalk for ScriptedPtt {
    fn is_asserted(&mut self) -> bool {
        self.reads.set(self.reads.get() + 1);
        let now = self.clock.now_us();
        self.windows
            .borrow()
            .iter()
            .any(|&(from, until)| now >= from && now < until)
    }
}
