//! Time management utilities
//!
//! The frame scheduler never reads the wall clock directly. It asks a [`Clock`]
//! for a millisecond timestamp and a [`FrameRequester`] for the next animation
//! frame, so the loop can be driven by a browser-style callback, a native
//! event loop or a test.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Source of monotonic timestamps in milliseconds
pub trait Clock {
    /// Current timestamp in milliseconds
    fn now(&self) -> f64;
}

/// Platform hook used to schedule the next animation frame
pub trait FrameRequester {
    /// Ask the platform to call the scheduler's `tick` again on the next frame
    fn request_frame(&mut self);
}

/// Wall clock measured from its creation
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose zero is now
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-driven clock for deterministic loops and tests
///
/// Clones share the same timestamp, so a test can keep one handle while the
/// scheduler owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Create a clock starting at `start` milliseconds
    pub fn new(start: f64) -> Self {
        Self { now: Rc::new(Cell::new(start)) }
    }

    /// Move the clock forward by `millis`
    pub fn advance(&self, millis: f64) {
        self.now.set(self.now.get() + millis);
    }

    /// Jump to an absolute timestamp
    pub fn set(&self, millis: f64) {
        self.now.set(millis);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Requester that only counts how many frames were asked for
///
/// Useful when the caller drives `tick` itself (fixed loops, tests).
#[derive(Debug, Clone, Default)]
pub struct CountingRequester {
    requested: Rc<Cell<u64>>,
}

impl CountingRequester {
    /// Create a requester with a zero count
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames requested so far
    pub fn requested(&self) -> u64 {
        self.requested.get()
    }
}

impl FrameRequester for CountingRequester {
    fn request_frame(&mut self) {
        self.requested.set(self.requested.get() + 1);
    }
}
