//! Queued actions
//!
//! Everything the library does over time is one of these variants sitting
//! in the sequencer's queue. Each tick, every action is asked to `process`
//! against the current drain time and reports whether it is still waiting,
//! mid-flight, or finished. Finished actions are removed; the rest stay for
//! the next tick.
//!
//! Actions reach mutable scene state only through the [`AnimTarget`] /
//! [`OutlineTarget`] traits. `apply` returns `false` once the owning shape
//! is gone, which turns any interpolator that outlived its shape into a
//! no-op that retires on its next tick.

use std::sync::Mutex;

use scribble_core::{Easing, Outline, Value};

use crate::morph::morph;
use crate::queue::TimeState;

/// What an action reports after processing one tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionStatus {
    /// Not yet due
    Pending,
    /// Due and still in progress
    Running,
    /// Finished; remove from the queue
    Done,
}

/// Write access to an animatable value slot
pub trait AnimTarget: Send {
    /// Read the current (private) value
    fn fetch(&self) -> Value;
    /// Write an interpolated value; `false` means the owner is gone
    fn apply(&self, value: Value) -> bool;
}

/// Write access to a morphable vertex outline
pub trait OutlineTarget: Send {
    fn fetch(&self) -> Outline;
    fn apply(&self, outline: Outline) -> bool;
}

/// Identifier for a registered periodic loop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LoopId(pub(crate) u64);

/// Timed interpolation of one value slot
pub struct Interpolate {
    pub begin_time: i64,
    pub end_time: i64,
    pub begin: Value,
    pub end: Value,
    pub easing: Easing,
    pub target: Box<dyn AnimTarget>,
    pub started: bool,
}

impl Interpolate {
    fn process(&mut self, now: i64) -> ActionStatus {
        if now < self.begin_time {
            // Keep the starting point fresh until we actually begin, so
            // earlier animations finishing first do not get rewound
            self.begin = self.target.fetch();
            return ActionStatus::Pending;
        }
        if !self.started {
            // An abutting predecessor may have landed earlier in this same
            // drain; the begin value is whatever the slot holds now
            self.begin = self.target.fetch();
            self.started = true;
        }
        // Zero-duration transitions snap straight to the end value
        if now >= self.end_time || self.end_time <= self.begin_time {
            self.target.apply(self.end.clone());
            return ActionStatus::Done;
        }
        let raw = (now - self.begin_time) as f32 / (self.end_time - self.begin_time) as f32;
        let value = Value::interpolate(&self.begin, &self.end, raw, self.easing);
        if self.target.apply(value) {
            ActionStatus::Running
        } else {
            ActionStatus::Done
        }
    }
}

/// Timed morph of one vertex outline
pub struct MatchOutline {
    pub begin_time: i64,
    pub end_time: i64,
    pub begin: Outline,
    pub end: Outline,
    pub easing: Easing,
    pub target: Box<dyn OutlineTarget>,
    pub started: bool,
}

impl MatchOutline {
    fn process(&mut self, now: i64) -> ActionStatus {
        if now < self.begin_time {
            self.begin = self.target.fetch();
            return ActionStatus::Pending;
        }
        if !self.started {
            self.begin = self.target.fetch();
            self.started = true;
        }
        if now >= self.end_time || self.end_time <= self.begin_time {
            self.target.apply(self.end.clone());
            return ActionStatus::Done;
        }
        let raw = (now - self.begin_time) as f32 / (self.end_time - self.begin_time) as f32;
        let eased = self.easing.apply(raw);
        if self.target.apply(morph(&self.begin, &self.end, eased)) {
            ActionStatus::Running
        } else {
            ActionStatus::Done
        }
    }
}

/// Periodic callback that stays in the queue until removed
pub struct Loop {
    pub id: LoopId,
    pub period_ms: i64,
    pub next_due: i64,
    pub callback: Box<dyn FnMut() + Send>,
}

impl Loop {
    fn process(&mut self, now: i64, time: &Mutex<TimeState>) -> ActionStatus {
        if now < self.next_due {
            return ActionStatus::Running;
        }
        // Rebase the choreography cursor onto this iteration's due time so
        // work enqueued by the callback lands at the right virtual time,
        // then restore the cursor for the surrounding script.
        let saved = {
            let mut state = time.lock().unwrap();
            let saved = state.clock.now();
            state.clock.rebase(self.next_due);
            saved
        };
        (self.callback)();
        time.lock().unwrap().clock.rebase(saved);

        self.next_due = if self.period_ms > 0 {
            now - now.rem_euclid(self.period_ms) + self.period_ms
        } else {
            now + 1
        };
        ActionStatus::Running
    }
}

/// Callback that fires once at its due time
pub struct OneShot {
    pub due_time: i64,
    pub callback: Option<Box<dyn FnOnce() + Send>>,
}

impl OneShot {
    fn process(&mut self, now: i64) -> ActionStatus {
        if now < self.due_time {
            return ActionStatus::Pending;
        }
        if let Some(callback) = self.callback.take() {
            callback();
        }
        ActionStatus::Done
    }
}

/// Deferred write of a value that cannot be numerically interpolated
///
/// The applied value is captured inside the closure; structurally this is a
/// one-shot, but it is kept as its own variant because it represents a
/// property write, not arbitrary user code.
pub struct Deferred {
    pub due_time: i64,
    pub apply: Option<Box<dyn FnOnce() + Send>>,
}

impl Deferred {
    fn process(&mut self, now: i64) -> ActionStatus {
        if now < self.due_time {
            return ActionStatus::Pending;
        }
        if let Some(apply) = self.apply.take() {
            apply();
        }
        ActionStatus::Done
    }
}

/// Message emitted when the timeline reaches its due time
pub struct LogMessage {
    pub due_time: i64,
    pub message: String,
}

impl LogMessage {
    fn process(&mut self, now: i64) -> ActionStatus {
        if now < self.due_time {
            return ActionStatus::Pending;
        }
        tracing::info!(due_ms = self.due_time, "{}", self.message);
        ActionStatus::Done
    }
}

/// Synchronization point: halts everything queued after it until released
pub struct Barrier {
    pub release_time: i64,
}

impl Barrier {
    fn process(&mut self, now: i64) -> ActionStatus {
        if now < self.release_time {
            ActionStatus::Pending
        } else {
            ActionStatus::Done
        }
    }
}

/// One queued unit of timed work
pub enum Action {
    Interpolate(Interpolate),
    MatchOutline(MatchOutline),
    Loop(Loop),
    OneShot(OneShot),
    Deferred(Deferred),
    Log(LogMessage),
    Barrier(Barrier),
}

impl Action {
    /// Process one tick at drain time `now`
    ///
    /// `time` is the shared clock/timing state; only loops touch it, and
    /// only while the queue lock is not held.
    pub fn process(&mut self, now: i64, time: &Mutex<TimeState>) -> ActionStatus {
        match self {
            Action::Interpolate(a) => a.process(now),
            Action::MatchOutline(a) => a.process(now),
            Action::Loop(a) => a.process(now, time),
            Action::OneShot(a) => a.process(now),
            Action::Deferred(a) => a.process(now),
            Action::Log(a) => a.process(now),
            Action::Barrier(a) => a.process(now),
        }
    }

    /// The virtual time at which this action is finished, if it has one
    ///
    /// Loops run forever and report `None`; barriers report their release
    /// time so stacked barriers chain correctly.
    pub fn end_time(&self) -> Option<i64> {
        match self {
            Action::Interpolate(a) => Some(a.end_time),
            Action::MatchOutline(a) => Some(a.end_time),
            Action::Loop(_) => None,
            Action::OneShot(a) => Some(a.due_time),
            Action::Deferred(a) => Some(a.due_time),
            Action::Log(a) => Some(a.due_time),
            Action::Barrier(a) => Some(a.release_time),
        }
    }

    pub fn loop_id(&self) -> Option<LoopId> {
        match self {
            Action::Loop(a) => Some(a.id),
            _ => None,
        }
    }

    pub fn is_barrier(&self) -> bool {
        matches!(self, Action::Barrier(_))
    }
}
