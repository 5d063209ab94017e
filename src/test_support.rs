//! Scripted stand-ins for the gamepad and the virtual pad
//!
//! Both doubles are cheap clones around shared state so a test can hand one
//! copy to the session and keep another for assertions.

use crate::controller::source::{DeviceError, DeviceInfo, InputSource, RawEvent};
use crate::mapping::{LogicalButton, TriggerSide};
use crate::output::sink::{SinkError, StickSide, VirtualSink};
use std::cell::RefCell;
use std::collections::{BTreeSet, VecDeque};
use std::rc::Rc;
use tokio_util::sync::CancellationToken;

/// One scripted `poll` result
#[derive(Debug, Clone)]
pub enum Step {
    Events(Vec<RawEvent>),
    Fault(DeviceError),
    /// Device drops out: `is_initialized` turns false
    Unplug,
}

#[derive(Debug, Default)]
struct SourceInner {
    counts: VecDeque<usize>,
    fallback_count: usize,
    steps: VecDeque<Step>,
    initialized: bool,
    opened: Vec<usize>,
    closes: u32,
    polls: u32,
    failing_close: bool,
    cancel_when_done: Option<CancellationToken>,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    inner: Rc<RefCell<SourceInner>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers for successive `enumerate` calls
    pub fn with_counts(self, counts: impl IntoIterator<Item = usize>) -> Self {
        self.inner.borrow_mut().counts.extend(counts);
        self
    }

    /// Answer once the scripted counts run out
    pub fn with_fallback_count(self, count: usize) -> Self {
        self.inner.borrow_mut().fallback_count = count;
        self
    }

    pub fn with_steps(self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.inner.borrow_mut().steps.extend(steps);
        self
    }

    /// Cancels `token` on the first poll after the script is exhausted
    pub fn cancel_when_done(self, token: CancellationToken) -> Self {
        self.inner.borrow_mut().cancel_when_done = Some(token);
        self
    }

    /// Every `close` call is counted but reports an error
    pub fn fail_close(self) -> Self {
        self.inner.borrow_mut().failing_close = true;
        self
    }

    pub fn opened(&self) -> Vec<usize> {
        self.inner.borrow().opened.clone()
    }

    pub fn closes(&self) -> u32 {
        self.inner.borrow().closes
    }

    pub fn polls(&self) -> u32 {
        self.inner.borrow().polls
    }
}

impl InputSource for ScriptedSource {
    fn enumerate(&mut self) -> usize {
        let mut inner = self.inner.borrow_mut();
        let fallback = inner.fallback_count;
        inner.counts.pop_front().unwrap_or(fallback)
    }

    fn open(&mut self, index: usize) -> Result<DeviceInfo, DeviceError> {
        let mut inner = self.inner.borrow_mut();
        inner.opened.push(index);
        inner.initialized = true;
        Ok(DeviceInfo {
            index,
            name: "Scripted Joy-Con (L/R)".to_string(),
        })
    }

    fn poll(&mut self, events: &mut Vec<RawEvent>) -> Result<(), DeviceError> {
        let mut inner = self.inner.borrow_mut();
        inner.polls += 1;
        match inner.steps.pop_front() {
            Some(Step::Events(batch)) => {
                events.extend(batch);
                Ok(())
            }
            Some(Step::Fault(e)) => Err(e),
            Some(Step::Unplug) => {
                inner.initialized = false;
                Ok(())
            }
            None => {
                if let Some(token) = &inner.cancel_when_done {
                    token.cancel();
                }
                Ok(())
            }
        }
    }

    fn is_initialized(&self) -> bool {
        self.inner.borrow().initialized
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        let mut inner = self.inner.borrow_mut();
        inner.closes += 1;
        inner.initialized = false;
        if inner.failing_close {
            return Err(DeviceError::NotOpen);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SinkCall {
    Stick(StickSide, f32, f32),
    Trigger(TriggerSide, f32),
    Button(LogicalButton, bool),
    Flush,
    Reset,
    Close,
}

/// What the virtual pad reported after a flush
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PadReport {
    pub left_stick: (f32, f32),
    pub right_stick: (f32, f32),
    pub left_trigger: f32,
    pub right_trigger: f32,
    pub pressed: BTreeSet<LogicalButton>,
}

impl PadReport {
    pub fn is_neutral(&self) -> bool {
        self == &PadReport::default()
    }
}

#[derive(Debug, Default)]
struct SinkInner {
    calls: Vec<SinkCall>,
    staged: PadReport,
    commits: Vec<PadReport>,
    failing_flushes: u32,
    broken: bool,
    closed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Rc<RefCell<SinkInner>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_flushes(&self, count: u32) {
        self.inner.borrow_mut().failing_flushes = count;
    }

    /// From now on `reset`, `flush` and `close` are recorded but fail
    pub fn break_device(&self) {
        self.inner.borrow_mut().broken = true;
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.inner.borrow().calls.clone()
    }

    pub fn commits(&self) -> Vec<PadReport> {
        self.inner.borrow().commits.clone()
    }

    /// Last successfully flushed report
    pub fn published(&self) -> PadReport {
        self.inner.borrow().commits.last().cloned().unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.borrow().closed
    }

    pub fn boxed(&self) -> Box<dyn VirtualSink> {
        Box::new(self.clone())
    }

    fn record(&mut self, call: SinkCall) -> Result<(), SinkError> {
        let mut inner = self.inner.borrow_mut();
        if inner.closed {
            return Err(SinkError::Closed);
        }
        inner.calls.push(call);
        Ok(())
    }

    fn check_broken(&self) -> Result<(), SinkError> {
        if self.inner.borrow().broken {
            return Err(SinkError::WriteError("scripted device failure".to_string()));
        }
        Ok(())
    }
}

impl VirtualSink for RecordingSink {
    fn set_stick(&mut self, side: StickSide, x: f32, y: f32) -> Result<(), SinkError> {
        self.record(SinkCall::Stick(side, x, y))?;
        let mut inner = self.inner.borrow_mut();
        match side {
            StickSide::Left => inner.staged.left_stick = (x, y),
            StickSide::Right => inner.staged.right_stick = (x, y),
        }
        Ok(())
    }

    fn set_trigger(&mut self, side: TriggerSide, value: f32) -> Result<(), SinkError> {
        self.record(SinkCall::Trigger(side, value))?;
        let mut inner = self.inner.borrow_mut();
        match side {
            TriggerSide::Left => inner.staged.left_trigger = value,
            TriggerSide::Right => inner.staged.right_trigger = value,
        }
        Ok(())
    }

    fn set_button(&mut self, button: LogicalButton, pressed: bool) -> Result<(), SinkError> {
        self.record(SinkCall::Button(button, pressed))?;
        let mut inner = self.inner.borrow_mut();
        if pressed {
            inner.staged.pressed.insert(button);
        } else {
            inner.staged.pressed.remove(&button);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.record(SinkCall::Flush)?;
        self.check_broken()?;
        let mut inner = self.inner.borrow_mut();
        if inner.failing_flushes > 0 {
            inner.failing_flushes -= 1;
            return Err(SinkError::WriteError("scripted flush failure".to_string()));
        }
        let report = inner.staged.clone();
        inner.commits.push(report);
        Ok(())
    }

    fn reset(&mut self) -> Result<(), SinkError> {
        self.record(SinkCall::Reset)?;
        self.check_broken()?;
        self.inner.borrow_mut().staged = PadReport::default();
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        self.record(SinkCall::Close)?;
        self.check_broken()?;
        self.inner.borrow_mut().closed = true;
        Ok(())
    }
}
