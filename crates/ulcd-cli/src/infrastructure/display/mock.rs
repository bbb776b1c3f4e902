//! Recording display for tests.
//!
//! # Why a mock display?
//!
//! The real driver needs a module on a serial port.  `MockDisplay` replaces
//! every device call with in-memory recording: each call is pushed onto a
//! shared log so a test can assert exactly what was sent and in what order.
//!
//! Clones share the same log, so a test keeps one handle while the session
//! owns the driver:
//!
//! ```ignore
//! let display = MockDisplay::new();
//! let connector = MockConnector::new(display.clone());
//! session.open(&connector, "/dev/ttyUSB0", 9600)?;
//! dispatcher.dispatch(&mut session, "clear", &[]).await?;
//! assert_eq!(display.calls(), vec![DisplayCall::ClearScreen]);
//! ```
//!
//! # Failure injection
//!
//! [`MockDisplay::fail_on`] makes one kind of call fail with a chosen error,
//! which lets tests drive error paths without broken hardware.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use ulcd_core::{BaudRate, Colour, Point, TouchEvent, VersionInfo};

use crate::application::cancel::CancelToken;
use crate::application::display::{DeviceError, DisplayConnector, DisplayDriver};

/// One recorded driver call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayCall {
    SetBaudRate(BaudRate),
    Reset,
    ClearScreen,
    SetDisplayPower(bool),
    SetContrast(u8),
    ResetText,
    WriteText(String),
    QueryVersion,
    InitTouch,
    DrawFilledCircle {
        centre: Point,
        radius: u16,
        colour: Colour,
    },
    PollTouch,
    Close,
}

impl DisplayCall {
    /// Name used with [`MockDisplay::fail_on`].
    pub fn name(&self) -> &'static str {
        match self {
            DisplayCall::SetBaudRate(_) => "set_baud_rate",
            DisplayCall::Reset => "reset",
            DisplayCall::ClearScreen => "clear_screen",
            DisplayCall::SetDisplayPower(_) => "set_display_power",
            DisplayCall::SetContrast(_) => "set_contrast",
            DisplayCall::ResetText => "reset_text",
            DisplayCall::WriteText(_) => "write_text",
            DisplayCall::QueryVersion => "query_version",
            DisplayCall::InitTouch => "init_touch",
            DisplayCall::DrawFilledCircle { .. } => "draw_filled_circle",
            DisplayCall::PollTouch => "poll_touch",
            DisplayCall::Close => "close",
        }
    }
}

#[derive(Default)]
struct State {
    calls: Vec<DisplayCall>,
    touch_script: VecDeque<TouchEvent>,
    cancel_when_drained: Option<CancelToken>,
    failure: Option<(&'static str, DeviceError)>,
    baud: u32,
    version: Option<VersionInfo>,
}

/// A [`DisplayDriver`] that records calls instead of talking to hardware.
#[derive(Clone)]
pub struct MockDisplay {
    state: Arc<Mutex<State>>,
}

impl MockDisplay {
    /// A display at 9600 baud with an empty touch script.
    pub fn new() -> Self {
        let state = State {
            baud: BaudRate::DEFAULT.bits_per_second(),
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Queues touch events returned by successive polls.
    ///
    /// Once the queue is empty, polls return idle events.  If `cancel` is
    /// given it is triggered when the last scripted event has been handed
    /// out, which ends an interactive loop deterministically.
    pub fn script_touches(&self, events: impl IntoIterator<Item = TouchEvent>, cancel: Option<CancelToken>) {
        let mut state = self.lock();
        state.touch_script.extend(events);
        state.cancel_when_drained = cancel;
    }

    /// Makes every call named `call` (see [`DisplayCall::name`]) fail with `err`.
    pub fn fail_on(&self, call: &'static str, err: DeviceError) {
        self.lock().failure = Some((call, err));
    }

    /// Sets the answer to `version`.
    pub fn set_version(&self, info: VersionInfo) {
        self.lock().version = Some(info);
    }

    /// All recorded calls, oldest first.
    pub fn calls(&self) -> Vec<DisplayCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls named `call`.
    pub fn count(&self, call: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.name() == call).count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A test that panicked while holding the lock already failed.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records `call`, then returns the injected failure if it matches.
    fn record(&self, call: DisplayCall) -> Result<(), DeviceError> {
        let mut state = self.lock();
        let name = call.name();
        state.calls.push(call);
        match &state.failure {
            Some((failing, err)) if *failing == name => Err(err.clone()),
            _ => Ok(()),
        }
    }
}

impl Default for MockDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayDriver for MockDisplay {
    fn baud_rate(&self) -> Result<u32, DeviceError> {
        Ok(self.lock().baud)
    }

    fn set_baud_rate(&mut self, rate: BaudRate) -> Result<u32, DeviceError> {
        self.record(DisplayCall::SetBaudRate(rate))?;
        let mut state = self.lock();
        state.baud = rate.bits_per_second();
        Ok(state.baud)
    }

    fn reset(&mut self) -> Result<(), DeviceError> {
        self.record(DisplayCall::Reset)
    }

    fn clear_screen(&mut self) -> Result<(), DeviceError> {
        self.record(DisplayCall::ClearScreen)
    }

    fn set_display_power(&mut self, on: bool) -> Result<(), DeviceError> {
        self.record(DisplayCall::SetDisplayPower(on))
    }

    fn set_contrast(&mut self, level: u8) -> Result<(), DeviceError> {
        self.record(DisplayCall::SetContrast(level))
    }

    fn reset_text(&mut self) -> Result<(), DeviceError> {
        self.record(DisplayCall::ResetText)
    }

    fn write_text(&mut self, text: &str) -> Result<(), DeviceError> {
        self.record(DisplayCall::WriteText(text.to_string()))
    }

    fn query_version(&mut self) -> Result<VersionInfo, DeviceError> {
        self.record(DisplayCall::QueryVersion)?;
        Ok(self.lock().version.clone().unwrap_or_else(|| VersionInfo {
            model: "mock".to_string(),
            spe_version: 0x0100,
            pmmc_version: 0x0100,
        }))
    }

    fn init_touch(&mut self) -> Result<(), DeviceError> {
        self.record(DisplayCall::InitTouch)
    }

    fn draw_filled_circle(
        &mut self,
        centre: Point,
        radius: u16,
        colour: Colour,
    ) -> Result<(), DeviceError> {
        self.record(DisplayCall::DrawFilledCircle {
            centre,
            radius,
            colour,
        })
    }

    fn poll_touch(&mut self) -> Result<TouchEvent, DeviceError> {
        self.record(DisplayCall::PollTouch)?;
        let mut state = self.lock();
        let event = state.touch_script.pop_front().unwrap_or_else(TouchEvent::idle);
        if state.touch_script.is_empty() {
            if let Some(cancel) = state.cancel_when_drained.take() {
                cancel.cancel();
            }
        }
        Ok(event)
    }

    fn close(&mut self) -> Result<(), DeviceError> {
        self.record(DisplayCall::Close)
    }
}

/// Hands out clones of one [`MockDisplay`], or fails like a missing port.
pub struct MockConnector {
    display: Option<MockDisplay>,
}

impl MockConnector {
    pub fn new(display: MockDisplay) -> Self {
        Self {
            display: Some(display),
        }
    }

    /// A connector whose device never exists.
    pub fn unreachable() -> Self {
        Self { display: None }
    }
}

impl DisplayConnector for MockConnector {
    fn connect(&self, path: &str, baud: BaudRate) -> Result<Box<dyn DisplayDriver>, DeviceError> {
        let display = self
            .display
            .clone()
            .ok_or_else(|| DeviceError::transport(format!("{path}: No such file or directory")))?;
        display.lock().baud = baud.bits_per_second();
        Ok(Box::new(display))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ulcd_core::TouchStatus;

    #[test]
    fn test_clones_share_the_call_log() {
        let display = MockDisplay::new();
        let mut handle: Box<dyn DisplayDriver> = Box::new(display.clone());

        handle.clear_screen().unwrap();
        handle.set_contrast(7).unwrap();

        assert_eq!(
            display.calls(),
            vec![DisplayCall::ClearScreen, DisplayCall::SetContrast(7)]
        );
    }

    #[test]
    fn test_fail_on_only_affects_the_named_call() {
        let mut display = MockDisplay::new();
        display.fail_on("reset", DeviceError::transport("unplugged"));

        assert_eq!(display.reset(), Err(DeviceError::transport("unplugged")));
        assert_eq!(display.clear_screen(), Ok(()));
        assert_eq!(display.count("reset"), 1);
    }

    #[test]
    fn test_touch_script_cancels_when_drained() {
        // Arrange
        let mut display = MockDisplay::new();
        let cancel = CancelToken::new();
        display.script_touches(
            [
                TouchEvent::new(TouchStatus::Press, 1, 2),
                TouchEvent::new(TouchStatus::Release, 1, 2),
            ],
            Some(cancel.clone()),
        );

        // Act + Assert
        assert_eq!(display.poll_touch().unwrap().status, TouchStatus::Press);
        assert!(!cancel.is_cancelled());
        assert_eq!(display.poll_touch().unwrap().status, TouchStatus::Release);
        assert!(cancel.is_cancelled());
        assert_eq!(display.poll_touch().unwrap(), TouchEvent::idle());
    }

    #[test]
    fn test_connector_applies_requested_baud() {
        let display = MockDisplay::new();
        let connector = MockConnector::new(display.clone());

        let driver = connector.connect("/dev/ttyUSB0", BaudRate::B57600).unwrap();

        assert_eq!(driver.baud_rate(), Ok(57_600));
    }

    #[test]
    fn test_unreachable_connector_is_transport_error() {
        let err = MockConnector::unreachable()
            .connect("/dev/missing", BaudRate::B9600)
            .err()
            .unwrap();

        assert!(matches!(err, DeviceError::Transport(_)));
    }
}
