//! Fixed-interval frame scheduling
//!
//! The platform calls [`FrameScheduler::tick`] from its animation callback.
//! Each tick re-arms the callback first, then decides whether enough time has
//! passed for a frame. Frames that arrive early are skipped outright, which
//! throttles a fast display down to the configured rate without busy-waiting.
//! When a frame runs, the leftover `elapsed % interval` is kept so the
//! long-run cadence does not drift.

use crate::foundation::time::{Clock, FrameRequester};

/// Per-frame callback, invoked with the elapsed milliseconds since the last frame
pub type FrameCallback = Box<dyn FnMut(f64)>;

/// Scheduler run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Ticks are no-ops
    Stopped,
    /// Ticks run frames at the configured rate
    Running,
}

/// Throttled frame loop driven by an external animation callback
pub struct FrameScheduler {
    clock: Box<dyn Clock>,
    requester: Box<dyn FrameRequester>,
    frames_per_second: f64,
    state: SchedulerState,
    then: f64,
    on_frame: Option<FrameCallback>,
}

impl FrameScheduler {
    /// Create a stopped scheduler targeting `frames_per_second`
    pub fn new(
        clock: Box<dyn Clock>,
        requester: Box<dyn FrameRequester>,
        frames_per_second: f64,
    ) -> Self {
        Self {
            clock,
            requester,
            frames_per_second,
            state: SchedulerState::Stopped,
            then: 0.0,
            on_frame: None,
        }
    }

    /// Current run state
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Whether ticks currently run frames
    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Timestamp the next frame's elapsed time is measured from
    pub fn then(&self) -> f64 {
        self.then
    }

    /// Minimum time between frames, in milliseconds
    pub fn frame_interval(&self) -> f64 {
        1000.0 / self.frames_per_second
    }

    /// Change the target rate; applies from the next tick
    pub fn set_frames_per_second(&mut self, frames_per_second: f64) {
        self.frames_per_second = frames_per_second;
    }

    /// Register (or replace) the per-frame callback
    ///
    /// A replacement made while running is used from the next tick.
    pub fn set_frame_callback(&mut self, on_frame: impl FnMut(f64) + 'static) {
        self.on_frame = Some(Box::new(on_frame));
    }

    /// Start running and immediately tick once
    ///
    /// Returns the elapsed time if that first tick produced a frame.
    pub fn start(&mut self) -> Option<f64> {
        log::info!("Starting frame loop at {} fps...", self.frames_per_second);

        self.state = SchedulerState::Running;
        self.then = self.clock.now();
        self.tick()
    }

    /// Stop running; the next tick becomes a no-op
    pub fn stop(&mut self) {
        log::info!("Stopping frame loop...");

        self.state = SchedulerState::Stopped;
    }

    /// Return to the default stopped state without invoking the callback
    pub fn reset(&mut self) {
        log::debug!("Resetting frame loop...");

        self.state = SchedulerState::Stopped;
        self.then = 0.0;
    }

    /// Handle one animation callback from the platform
    ///
    /// Returns `Some(elapsed)` when a frame ran. The registered callback, if
    /// any, has already been invoked with the same value by then.
    pub fn tick(&mut self) -> Option<f64> {
        if self.state != SchedulerState::Running {
            return None;
        }

        // Re-arm before any frame work so a slow frame cannot delay the next request
        self.requester.request_frame();

        let now = self.clock.now();
        let elapsed = now - self.then;
        let interval = self.frame_interval();

        if elapsed <= interval {
            return None;
        }

        self.then = now - (elapsed % interval);

        if let Some(on_frame) = self.on_frame.as_mut() {
            on_frame(elapsed);
        }

        Some(elapsed)
    }
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("frames_per_second", &self.frames_per_second)
            .field("state", &self.state)
            .field("then", &self.then)
            .field("has_callback", &self.on_frame.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::time::{CountingRequester, ManualClock};
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    const INTERVAL_60: f64 = 1000.0 / 60.0;

    fn scheduler_at_60() -> (FrameScheduler, ManualClock, CountingRequester, Rc<RefCell<Vec<f64>>>) {
        let clock = ManualClock::new(1_000.0);
        let requester = CountingRequester::new();
        let mut scheduler =
            FrameScheduler::new(Box::new(clock.clone()), Box::new(requester.clone()), 60.0);

        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&frames);
        scheduler.set_frame_callback(move |dt| sink.borrow_mut().push(dt));

        (scheduler, clock, requester, frames)
    }

    #[test]
    fn test_start_records_then_and_skips_zero_elapsed() {
        let (mut scheduler, _clock, requester, frames) = scheduler_at_60();

        assert_eq!(scheduler.start(), None);
        assert!(scheduler.is_running());
        assert_relative_eq!(scheduler.then(), 1_000.0);
        assert!(frames.borrow().is_empty());
        assert_eq!(requester.requested(), 1);
    }

    #[test]
    fn test_callback_fires_once_per_elapsed_interval() {
        let (mut scheduler, clock, _requester, frames) = scheduler_at_60();
        scheduler.start();

        clock.advance(INTERVAL_60 + 0.5);
        let elapsed = scheduler.tick();

        assert_eq!(frames.borrow().len(), 1);
        assert_relative_eq!(elapsed.unwrap(), INTERVAL_60 + 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_exactly_one_interval_is_throttled() {
        let (mut scheduler, clock, _requester, frames) = scheduler_at_60();
        scheduler.start();

        clock.advance(INTERVAL_60);
        assert_eq!(scheduler.tick(), None);
        assert!(frames.borrow().is_empty());
    }

    #[test]
    fn test_early_ticks_still_request_frames() {
        let (mut scheduler, clock, requester, frames) = scheduler_at_60();
        scheduler.start();

        for _ in 0..3 {
            clock.advance(1.0);
            scheduler.tick();
        }

        assert!(frames.borrow().is_empty());
        assert_eq!(requester.requested(), 4);
    }

    #[test]
    fn test_remainder_is_retained() {
        let (mut scheduler, clock, _requester, _frames) = scheduler_at_60();
        scheduler.start();

        clock.advance(40.0);
        scheduler.tick();

        // 40 % 16.667 = 6.667 carried into the next frame
        assert_relative_eq!(scheduler.then(), 1_040.0 - (40.0 % INTERVAL_60), epsilon = 1e-9);
    }

    #[test]
    fn test_stop_prevents_further_frames() {
        let (mut scheduler, clock, requester, frames) = scheduler_at_60();
        scheduler.start();

        clock.advance(INTERVAL_60 * 2.0);
        scheduler.tick();
        assert_eq!(frames.borrow().len(), 1);

        scheduler.stop();
        let requested = requester.requested();
        for _ in 0..5 {
            clock.advance(INTERVAL_60 * 2.0);
            assert_eq!(scheduler.tick(), None);
        }

        assert_eq!(frames.borrow().len(), 1);
        assert_eq!(requester.requested(), requested);
    }

    #[test]
    fn test_reset_returns_to_default_without_callback() {
        let (mut scheduler, clock, _requester, frames) = scheduler_at_60();
        scheduler.start();
        clock.advance(100.0);
        scheduler.reset();

        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_relative_eq!(scheduler.then(), 0.0);
        assert!(frames.borrow().is_empty());
    }

    #[test]
    fn test_replacing_callback_mid_run() {
        let (mut scheduler, clock, _requester, first) = scheduler_at_60();
        scheduler.start();

        let second = Rc::new(RefCell::new(0_u32));
        let counter = Rc::clone(&second);
        scheduler.set_frame_callback(move |_| *counter.borrow_mut() += 1);

        clock.advance(INTERVAL_60 * 1.5);
        scheduler.tick();

        assert!(first.borrow().is_empty());
        assert_eq!(*second.borrow(), 1);
    }

    #[test]
    fn test_tick_without_callback_reports_elapsed() {
        let clock = ManualClock::new(0.0);
        let mut scheduler =
            FrameScheduler::new(Box::new(clock.clone()), Box::new(CountingRequester::new()), 30.0);
        scheduler.start();

        clock.advance(50.0);
        assert_relative_eq!(scheduler.tick().unwrap(), 50.0);
    }
}
