//! Action sequencer
//!
//! The [`Sequencer`] owns the action queue together with the shared clock,
//! timing configuration, and easing selection. Components enqueue through a
//! cloneable [`SequencerHandle`] holding weak references, so handles left
//! behind in callbacks can never keep a torn-down timeline alive.
//!
//! Every enqueue stamps its action with the current virtual time and then
//! advances the clock by the configured delay; a straight-line script of
//! calls therefore schedules itself k * delay_ms apart. Draining visits
//! each queued action once per tick, drops finished ones, and stops early
//! at an unreleased barrier. The queue lock is never held while an action
//! processes, so loop callbacks are free to enqueue more work.

use std::sync::{Arc, Mutex, Weak};

use scribble_core::{Easing, Outline, Value};
use smallvec::SmallVec;

use crate::action::{
    Action, ActionStatus, AnimTarget, Barrier, Deferred, Interpolate, Loop, LogMessage, LoopId,
    MatchOutline, OneShot, OutlineTarget,
};
use crate::clock::VirtualClock;
use crate::timing::AnimationTiming;

/// Clock, timing, and easing shared by the sequencer and its handles
pub struct TimeState {
    pub clock: VirtualClock,
    pub timing: AnimationTiming,
    pub easing: Easing,
}

impl TimeState {
    pub fn new() -> Self {
        Self {
            clock: VirtualClock::new(),
            timing: AnimationTiming::new(),
            easing: Easing::default(),
        }
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}

struct SequencerInner {
    /// Slots are taken (set to `None`) while their action processes, so the
    /// lock can be dropped around user callbacks; indices stay stable
    /// because enqueues only append.
    actions: Vec<Option<Action>>,
    next_loop_id: u64,
    /// Loops removed during the current drain; their taken actions must not
    /// be restored.
    dead_loops: SmallVec<[LoopId; 4]>,
}

/// Owner of the action queue and the shared time state
pub struct Sequencer {
    time: Arc<Mutex<TimeState>>,
    inner: Arc<Mutex<SequencerInner>>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            time: Arc::new(Mutex::new(TimeState::new())),
            inner: Arc::new(Mutex::new(SequencerInner {
                actions: Vec::new(),
                next_loop_id: 0,
                dead_loops: SmallVec::new(),
            })),
        }
    }

    /// Get a weak handle for enqueuing from components and callbacks
    pub fn handle(&self) -> SequencerHandle {
        SequencerHandle {
            time: Arc::downgrade(&self.time),
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Drain the queue at the real elapsed time
    ///
    /// This is what the external frame timer calls once per frame.
    pub fn tick(&self) {
        let now = self.time.lock().unwrap().clock.elapsed_real_ms();
        self.drain_at(now);
    }

    /// Drain the queue at an explicit drain time
    ///
    /// Visits every action queued before this call exactly once. Finished
    /// actions are removed; an unreleased barrier stops the scan so nothing
    /// queued after it runs early. Actions enqueued during the drain (by
    /// loop callbacks) wait for the next tick.
    pub fn drain_at(&self, now: i64) {
        let len = self.inner.lock().unwrap().actions.len();
        for i in 0..len {
            let taken = self
                .inner
                .lock()
                .unwrap()
                .actions
                .get_mut(i)
                .and_then(Option::take);
            let Some(mut action) = taken else { continue };

            let status = action.process(now, &self.time);
            if status == ActionStatus::Done {
                continue;
            }
            let halt = action.is_barrier() && status == ActionStatus::Pending;

            let mut inner = self.inner.lock().unwrap();
            let removed = action
                .loop_id()
                .is_some_and(|id| inner.dead_loops.contains(&id));
            if !removed {
                if let Some(slot) = inner.actions.get_mut(i) {
                    *slot = Some(action);
                }
            }
            drop(inner);

            if halt {
                break;
            }
        }

        let mut inner = self.inner.lock().unwrap();
        inner.actions.retain(Option::is_some);
        inner.dead_loops.clear();
    }

    /// Number of actions still queued
    pub fn pending_len(&self) -> usize {
        self.inner.lock().unwrap().actions.iter().flatten().count()
    }

    pub fn is_idle(&self) -> bool {
        self.pending_len() == 0
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// A weak handle to the sequencer
///
/// All operations silently no-op once the sequencer is dropped, the same
/// contract a detached scheduler handle has.
#[derive(Clone)]
pub struct SequencerHandle {
    time: Weak<Mutex<TimeState>>,
    inner: Weak<Mutex<SequencerInner>>,
}

impl SequencerHandle {
    /// Stamp an action at the delay cursor and advance the cursor
    fn push(&self, action: Action) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        inner.lock().unwrap().actions.push(Some(action));
    }

    /// Run `f` against the shared time state
    pub fn with_time<R>(&self, f: impl FnOnce(&mut TimeState) -> R) -> Option<R> {
        self.time
            .upgrade()
            .map(|time| f(&mut time.lock().unwrap()))
    }

    /// Current position of the choreography cursor
    pub fn now(&self) -> i64 {
        self.with_time(|state| state.clock.now()).unwrap_or(0)
    }

    /// Enqueue an eased interpolation towards `end` and advance the cursor
    pub fn animate(&self, target: Box<dyn AnimTarget>, end: Value) {
        let begin = target.fetch();
        let Some((begin_time, end_time, easing)) = self.with_time(|state| {
            let now = state.clock.now();
            let end_time = now + state.timing.animation_ms();
            state.clock.advance(state.timing.delay_ms());
            (now, end_time, state.easing)
        }) else {
            return;
        };
        self.push(Action::Interpolate(Interpolate {
            begin_time,
            end_time,
            begin,
            end,
            easing,
            target,
            started: false,
        }));
    }

    /// Enqueue an outline morph towards `end` and advance the cursor
    pub fn animate_outline(&self, target: Box<dyn OutlineTarget>, end: Outline) {
        let begin = target.fetch();
        let Some((begin_time, end_time, easing)) = self.with_time(|state| {
            let now = state.clock.now();
            let end_time = now + state.timing.animation_ms();
            state.clock.advance(state.timing.delay_ms());
            (now, end_time, state.easing)
        }) else {
            return;
        };
        self.push(Action::MatchOutline(MatchOutline {
            begin_time,
            end_time,
            begin,
            end,
            easing,
            target,
            started: false,
        }));
    }

    /// Enqueue a one-shot callback at the cursor and advance the cursor
    pub fn run(&self, callback: impl FnOnce() + Send + 'static) {
        let Some(due_time) = self.with_time(|state| {
            let now = state.clock.now();
            state.clock.advance(state.timing.delay_ms());
            now
        }) else {
            return;
        };
        self.push(Action::OneShot(OneShot {
            due_time,
            callback: Some(Box::new(callback)),
        }));
    }

    /// Enqueue a deferred value write at the cursor and advance the cursor
    pub fn defer(&self, apply: impl FnOnce() + Send + 'static) {
        let Some(due_time) = self.with_time(|state| {
            let now = state.clock.now();
            state.clock.advance(state.timing.delay_ms());
            now
        }) else {
            return;
        };
        self.push(Action::Deferred(Deferred {
            due_time,
            apply: Some(Box::new(apply)),
        }));
    }

    /// Enqueue a log message at the cursor and advance the cursor
    pub fn log(&self, message: impl Into<String>) {
        let Some(due_time) = self.with_time(|state| {
            let now = state.clock.now();
            state.clock.advance(state.timing.delay_ms());
            now
        }) else {
            return;
        };
        self.push(Action::Log(LogMessage {
            due_time,
            message: message.into(),
        }));
    }

    /// Enqueue a barrier releasing when everything queued so far is done
    ///
    /// The release time is the latest end time currently in the queue
    /// (clamped to now); the cursor jumps there so later calls schedule
    /// after the barrier.
    pub fn barrier(&self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let latest = inner
            .lock()
            .unwrap()
            .actions
            .iter()
            .flatten()
            .filter_map(Action::end_time)
            .max();
        let Some(release_time) = self.with_time(|state| {
            let release = latest.unwrap_or(0).max(state.clock.now());
            state.clock.rebase(release);
            state.clock.advance(state.timing.delay_ms());
            release
        }) else {
            return;
        };
        self.push(Action::Barrier(Barrier { release_time }));
    }

    /// Register a periodic callback; first fires on the first drain at or
    /// after its begin time, then at each period multiple
    ///
    /// Loops registered in immediate mode (event handlers, startup) anchor
    /// at time zero so their phase is stable across the whole run; loops
    /// registered mid-script anchor at the cursor. Loops do not advance the
    /// delay cursor.
    pub fn add_loop(&self, period_ms: i64, callback: impl FnMut() + Send + 'static) -> Option<LoopId> {
        let begin = self.with_time(|state| {
            if state.clock.is_immediate() {
                0
            } else {
                state.clock.now()
            }
        })?;
        let inner = self.inner.upgrade()?;
        let mut inner = inner.lock().unwrap();
        inner.next_loop_id += 1;
        let id = LoopId(inner.next_loop_id);
        inner.actions.push(Some(Action::Loop(Loop {
            id,
            period_ms: period_ms.max(1),
            next_due: begin,
            callback: Box::new(callback),
        })));
        tracing::debug!(loop_id = id.0, period_ms, "registered loop");
        Some(id)
    }

    /// Remove a registered loop
    ///
    /// Safe to call from inside the loop's own callback: the slot is
    /// cleared in place and the drain will not restore it.
    pub fn remove_loop(&self, id: LoopId) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut inner = inner.lock().unwrap();
        for slot in inner.actions.iter_mut() {
            if slot.as_ref().and_then(Action::loop_id) == Some(id) {
                *slot = None;
            }
        }
        inner.dead_loops.push(id);
        tracing::debug!(loop_id = id.0, "removed loop");
    }

    // =========================================================================
    // Clock and timing passthroughs
    // =========================================================================

    /// Advance the choreography cursor without queueing anything
    pub fn advance(&self, ms: i64) {
        self.with_time(|state| state.clock.advance(ms));
    }

    pub fn push_immediate(&self) {
        self.with_time(|state| state.clock.push_immediate());
    }

    pub fn pull_immediate(&self) {
        self.with_time(|state| state.clock.pull_immediate());
    }

    pub fn scale(&self, factor: f32) {
        self.with_time(|state| state.timing.scale(factor));
    }

    pub fn unscale(&self) {
        self.with_time(|state| state.timing.unscale());
    }

    pub fn animation_ms(&self) -> i64 {
        self.with_time(|state| state.timing.animation_ms())
            .unwrap_or(0)
    }

    pub fn delay_ms(&self) -> i64 {
        self.with_time(|state| state.timing.delay_ms()).unwrap_or(0)
    }

    pub fn set_animation_ms(&self, ms: i64) {
        self.with_time(|state| state.timing.set_animation_ms(ms));
    }

    pub fn set_delay_ms(&self, ms: i64) {
        self.with_time(|state| state.timing.set_delay_ms(ms));
    }

    /// Set the animation and delay durations together
    pub fn set_time_ms(&self, ms: i64) {
        self.with_time(|state| {
            state.timing.set_animation_ms(ms);
            state.timing.set_delay_ms(ms);
        });
    }

    pub fn easing(&self) -> Easing {
        self.with_time(|state| state.easing).unwrap_or_default()
    }

    pub fn set_easing(&self, easing: Easing) {
        self.with_time(|state| state.easing = easing);
    }

    /// Check if the sequencer is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct SlotTarget {
        value: Arc<Mutex<f32>>,
    }

    impl AnimTarget for SlotTarget {
        fn fetch(&self) -> Value {
            Value::Scalar(*self.value.lock().unwrap())
        }

        fn apply(&self, value: Value) -> bool {
            *self.value.lock().unwrap() = value.as_scalar().unwrap_or(0.0);
            true
        }
    }

    fn slot(initial: f32) -> (Box<SlotTarget>, Arc<Mutex<f32>>) {
        let value = Arc::new(Mutex::new(initial));
        (
            Box::new(SlotTarget {
                value: Arc::clone(&value),
            }),
            value,
        )
    }

    #[test]
    fn test_enqueue_advances_delay_cursor() {
        let seq = Sequencer::new();
        let handle = seq.handle();
        assert_eq!(handle.now(), 0);
        handle.log("a");
        handle.log("b");
        handle.log("c");
        // Three calls at the default 250 ms delay
        assert_eq!(handle.now(), 750);
        assert_eq!(seq.pending_len(), 3);
    }

    #[test]
    fn test_sequential_animations_play_in_order() {
        let seq = Sequencer::new();
        let handle = seq.handle();
        handle.set_animation_ms(100);
        handle.set_delay_ms(100);
        handle.set_easing(Easing::Linear);

        let (target, value) = slot(0.0);
        handle.animate(target, Value::Scalar(10.0));
        let (target, _) = slot(0.0);
        handle.animate(target, Value::Scalar(20.0));

        // First animation spans [0, 100], second [100, 200]
        seq.drain_at(50);
        assert!((*value.lock().unwrap() - 5.0).abs() < 1e-4);
        seq.drain_at(100);
        assert_eq!(*value.lock().unwrap(), 10.0);
        seq.drain_at(250);
        assert!(seq.is_idle());
    }

    #[test]
    fn test_barrier_halts_later_actions() {
        let seq = Sequencer::new();
        let handle = seq.handle();
        handle.set_animation_ms(500);
        handle.set_delay_ms(0);

        let (target, _) = slot(0.0);
        handle.animate(target, Value::Scalar(1.0));
        handle.barrier();

        let fired = Arc::new(AtomicBool::new(false));
        let fired_cb = Arc::clone(&fired);
        handle.run(move || fired_cb.store(true, Ordering::Relaxed));

        // Cursor jumped to the barrier's release time
        assert_eq!(handle.now(), 500);

        seq.drain_at(250);
        assert!(!fired.load(Ordering::Relaxed));
        seq.drain_at(600);
        assert!(fired.load(Ordering::Relaxed));
        assert!(seq.is_idle());
    }

    #[test]
    fn test_loop_callback_can_enqueue() {
        let seq = Sequencer::new();
        let handle = seq.handle();
        handle.set_delay_ms(0);

        let count = Arc::new(AtomicUsize::new(0));
        let count_cb = Arc::clone(&count);
        let inner_handle = handle.clone();
        handle
            .add_loop(100, move || {
                let count_inner = Arc::clone(&count_cb);
                inner_handle.run(move || {
                    count_inner.fetch_add(1, Ordering::Relaxed);
                });
            })
            .unwrap();

        // The loop fires and enqueues a one-shot; that one-shot runs on the
        // following tick
        seq.drain_at(100);
        assert_eq!(count.load(Ordering::Relaxed), 0);
        seq.drain_at(150);
        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_loop_enqueued_work_lands_at_loop_time() {
        let seq = Sequencer::new();
        let handle = seq.handle();
        handle.set_delay_ms(0);
        // Move the scripted cursor far ahead of the loop
        handle.advance(10_000);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = Arc::clone(&seen);
        let inner_handle = handle.clone();
        // Registered in immediate mode, so the loop anchors at time zero
        handle.push_immediate();
        handle
            .add_loop(100, move || {
                seen_cb.lock().unwrap().push(inner_handle.now());
            })
            .unwrap();
        handle.pull_immediate();

        seq.drain_at(100);
        seq.drain_at(230);
        // The first fire happens on the first drain at the anchor time, the
        // second at the next period multiple; inside the callback the cursor
        // sits at the iteration's due time
        assert_eq!(*seen.lock().unwrap(), vec![0, 200]);
        // And the scripted cursor is restored afterwards
        assert_eq!(handle.now(), 10_000);
    }

    #[test]
    fn test_back_to_back_on_same_slot_chains_without_rewind() {
        let seq = Sequencer::new();
        let handle = seq.handle();
        handle.set_animation_ms(100);
        handle.set_delay_ms(100);
        handle.set_easing(Easing::Linear);

        let value = Arc::new(Mutex::new(0.0));
        let first = Box::new(SlotTarget {
            value: Arc::clone(&value),
        });
        let second = Box::new(SlotTarget {
            value: Arc::clone(&value),
        });
        handle.animate(first, Value::Scalar(10.0));
        handle.animate(second, Value::Scalar(20.0));

        // The first spans [0, 100] and lands in the same drain in which the
        // second becomes due; the second must start from the landed value,
        // not from its enqueue-time snapshot
        seq.drain_at(100);
        assert!((*value.lock().unwrap() - 10.0).abs() < 1e-4);
        seq.drain_at(150);
        assert!((*value.lock().unwrap() - 15.0).abs() < 1e-4);
        seq.drain_at(200);
        assert_eq!(*value.lock().unwrap(), 20.0);
        assert!(seq.is_idle());
    }

    #[test]
    fn test_remove_loop_from_own_callback() {
        let seq = Sequencer::new();
        let handle = seq.handle();

        let count = Arc::new(AtomicUsize::new(0));
        let count_cb = Arc::clone(&count);
        let remover = handle.clone();
        let id = Arc::new(Mutex::new(None::<LoopId>));
        let id_cb = Arc::clone(&id);
        let registered = handle
            .add_loop(100, move || {
                count_cb.fetch_add(1, Ordering::Relaxed);
                if let Some(id) = *id_cb.lock().unwrap() {
                    remover.remove_loop(id);
                }
            })
            .unwrap();
        *id.lock().unwrap() = Some(registered);

        seq.drain_at(100);
        assert_eq!(count.load(Ordering::Relaxed), 1);
        // The loop removed itself; later ticks do nothing
        seq.drain_at(500);
        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert!(seq.is_idle());
    }

    #[test]
    fn test_handle_outlives_sequencer() {
        let handle = {
            let seq = Sequencer::new();
            seq.handle()
        };
        assert!(!handle.is_alive());
        handle.log("dropped");
        handle.advance(100);
        assert_eq!(handle.now(), 0);
        assert!(handle.add_loop(100, || {}).is_none());
    }
}
