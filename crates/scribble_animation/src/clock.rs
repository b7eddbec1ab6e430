//! Virtual clock
//!
//! Scripted calls are timed against virtual milliseconds, not wall time:
//! every enqueue advances the clock by the configured delay, so the clock
//! doubles as the choreography cursor. Real elapsed time (measured from a
//! stored epoch) only enters the picture when the frame timer drains the
//! queue, and in immediate mode.
//!
//! Immediate mode is a stack: event handlers push before running user code
//! so that handler-issued animations start "now" (at real elapsed time)
//! instead of at the end of the scripted timeline, and pop afterwards to
//! restore the cursor.

use std::time::Instant;

/// Virtual milliseconds with an immediate-mode save stack
#[derive(Debug)]
pub struct VirtualClock {
    now_ms: i64,
    epoch: Instant,
    immediate_stack: Vec<i64>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            epoch: Instant::now(),
            immediate_stack: Vec::new(),
        }
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> i64 {
        self.now_ms
    }

    /// Advance the virtual cursor by `ms` (negative values allowed)
    pub fn advance(&mut self, ms: i64) {
        self.now_ms += ms;
    }

    /// Move the virtual cursor to an absolute time
    pub fn rebase(&mut self, ms: i64) {
        self.now_ms = ms;
    }

    /// Wall-clock milliseconds since the clock was created
    pub fn elapsed_real_ms(&self) -> i64 {
        self.epoch.elapsed().as_millis() as i64
    }

    /// Save the virtual cursor and rebase onto the real elapsed clock
    pub fn push_immediate(&mut self) {
        self.immediate_stack.push(self.now_ms);
        self.now_ms = self.elapsed_real_ms();
    }

    /// Restore the cursor saved by the matching [`push_immediate`]
    ///
    /// An unbalanced pull is a caller bug but not fatal: it logs a warning
    /// and leaves the clock unchanged.
    ///
    /// [`push_immediate`]: VirtualClock::push_immediate
    pub fn pull_immediate(&mut self) {
        match self.immediate_stack.pop() {
            Some(saved) => self.now_ms = saved,
            None => tracing::warn!("pull_immediate() without matching push_immediate()"),
        }
    }

    pub fn is_immediate(&self) -> bool {
        !self.immediate_stack.is_empty()
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}
