//! Animatable properties
//!
//! Every visual attribute of a shape is a shared slot holding two values:
//! `target`, where the script has put it, and `current`, where it is right
//! now on screen. Public setters store the target synchronously and enqueue
//! an interpolation against the private side; public getters return the
//! target, so script logic composes without waiting for animations.
//!
//! Queued interpolators reach the slot through weak references plus the
//! shape's liveness flag, so an animation that outlives its shape applies
//! nothing and retires on its next tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use scribble_animation::{AnimTarget, OutlineTarget, SequencerHandle};
use scribble_core::{AnimValue, Color, Outline, Point, Value};

/// Liveness and dirty flags shared by a shape and its queued interpolators
pub struct ShapeFlags {
    alive: AtomicBool,
    needs_geometry: AtomicBool,
    needs_redraw: AtomicBool,
}

impl ShapeFlags {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            alive: AtomicBool::new(true),
            needs_geometry: AtomicBool::new(false),
            needs_redraw: AtomicBool::new(true),
        })
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Mark the shape dead; all further interpolator writes become no-ops
    pub fn kill(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    /// A geometry-driving value changed: vertices must be regenerated
    pub fn mark_geometry(&self) {
        self.needs_geometry.store(true, Ordering::Relaxed);
        self.needs_redraw.store(true, Ordering::Relaxed);
    }

    pub fn mark_redraw(&self) {
        self.needs_redraw.store(true, Ordering::Relaxed);
    }

    pub fn take_needs_geometry(&self) -> bool {
        self.needs_geometry.swap(false, Ordering::Relaxed)
    }

    pub fn take_needs_redraw(&self) -> bool {
        self.needs_redraw.swap(false, Ordering::Relaxed)
    }
}

pub(crate) struct Slot<T> {
    pub(crate) target: T,
    pub(crate) current: T,
}

/// A property animated through the action queue
///
/// `get()` returns the target; `current()` the lagging on-screen value.
/// `init()` writes both and bypasses the queue (used during construction).
pub struct AnimatableProperty<T: AnimValue> {
    slot: Arc<Mutex<Slot<T>>>,
    flags: Arc<ShapeFlags>,
    updates_geometry: bool,
}

impl<T: AnimValue> Clone for AnimatableProperty<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            flags: Arc::clone(&self.flags),
            updates_geometry: self.updates_geometry,
        }
    }
}

impl<T: AnimValue + Send + 'static> AnimatableProperty<T> {
    pub fn new(initial: T, flags: &Arc<ShapeFlags>, updates_geometry: bool) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                target: initial.clone(),
                current: initial,
            })),
            flags: Arc::clone(flags),
            updates_geometry,
        }
    }

    /// Where the script has put this property
    pub fn get(&self) -> T {
        self.slot.lock().unwrap().target.clone()
    }

    /// Where this property is right now on screen
    pub fn current(&self) -> T {
        self.slot.lock().unwrap().current.clone()
    }

    /// Write both sides without touching the queue
    pub fn init(&self, value: T) {
        let mut slot = self.slot.lock().unwrap();
        slot.target = value.clone();
        slot.current = value;
        drop(slot);
        if self.updates_geometry {
            self.flags.mark_geometry();
        } else {
            self.flags.mark_redraw();
        }
    }

    /// Store the target and enqueue an eased transition of the current side
    pub fn set(&self, value: T, seq: &SequencerHandle) {
        self.slot.lock().unwrap().target = value.clone();
        seq.animate(Box::new(self.target_handle()), value.to_value());
    }

    /// Overwrite the current side without marking anything dirty
    ///
    /// Used when the caller is already inside a redraw and has computed the
    /// up-to-date value itself (vertex regeneration).
    pub fn write_silent(&self, value: T) {
        self.slot.lock().unwrap().current = value;
    }

    pub(crate) fn target_handle(&self) -> SlotTarget<T> {
        SlotTarget {
            slot: Arc::downgrade(&self.slot),
            flags: Arc::downgrade(&self.flags),
            updates_geometry: self.updates_geometry,
        }
    }
}

impl AnimatableProperty<Point> {
    pub fn get_x(&self) -> f32 {
        self.slot.lock().unwrap().target.x
    }

    pub fn get_y(&self) -> f32 {
        self.slot.lock().unwrap().target.y
    }

    /// Animate one component; the other keeps its own timeline
    pub fn set_x(&self, x: f32, seq: &SequencerHandle) {
        self.slot.lock().unwrap().target.x = x;
        seq.animate(Box::new(self.component_handle(0)), Value::Scalar(x));
    }

    pub fn set_y(&self, y: f32, seq: &SequencerHandle) {
        self.slot.lock().unwrap().target.y = y;
        seq.animate(Box::new(self.component_handle(1)), Value::Scalar(y));
    }

    fn component_handle(&self, axis: usize) -> ComponentTarget {
        ComponentTarget {
            slot: Arc::downgrade(&self.slot),
            flags: Arc::downgrade(&self.flags),
            axis,
            updates_geometry: self.updates_geometry,
        }
    }
}

impl AnimatableProperty<Color> {
    /// Animate one channel: 0 = r, 1 = g, 2 = b, 3 = a
    pub fn set_channel(&self, channel: usize, value: u8, seq: &SequencerHandle) {
        self.slot.lock().unwrap().target.set_channel(channel, value);
        let handle = ChannelTarget {
            slot: Arc::downgrade(&self.slot),
            flags: Arc::downgrade(&self.flags),
            channel,
        };
        seq.animate(Box::new(handle), Value::Scalar(value as f32));
    }

    pub fn set_alpha(&self, alpha: u8, seq: &SequencerHandle) {
        self.set_channel(3, alpha, seq);
    }
}

impl AnimatableProperty<Outline> {
    /// Store the target vertices and enqueue a morph of the current side
    pub fn set_morph(&self, value: Outline, seq: &SequencerHandle) {
        self.slot.lock().unwrap().target = value.clone();
        let handle = OutlineSlotTarget {
            slot: Arc::downgrade(&self.slot),
            flags: Arc::downgrade(&self.flags),
        };
        seq.animate_outline(Box::new(handle), value);
    }
}

/// Animate the fill and line colors of a shape together as one action
pub fn animate_color_pair(
    fill: &AnimatableProperty<Color>,
    line: &AnimatableProperty<Color>,
    value: Color,
    seq: &SequencerHandle,
) {
    fill.slot.lock().unwrap().target = value;
    line.slot.lock().unwrap().target = value;
    let handle = ColorPairTarget {
        fill: Arc::downgrade(&fill.slot),
        line: Arc::downgrade(&line.slot),
        flags: Arc::downgrade(&fill.flags),
    };
    seq.animate(Box::new(handle), value.to_value());
}

pub(crate) struct SlotTarget<T> {
    slot: Weak<Mutex<Slot<T>>>,
    flags: Weak<ShapeFlags>,
    updates_geometry: bool,
}

impl<T: AnimValue + Send + 'static> AnimTarget for SlotTarget<T> {
    fn fetch(&self) -> Value {
        match self.slot.upgrade() {
            Some(slot) => slot.lock().unwrap().current.to_value(),
            None => Value::Scalar(0.0),
        }
    }

    fn apply(&self, value: Value) -> bool {
        let (Some(slot), Some(flags)) = (self.slot.upgrade(), self.flags.upgrade()) else {
            return false;
        };
        if !flags.is_alive() {
            return false;
        }
        slot.lock().unwrap().current = T::from_value(&value);
        if self.updates_geometry {
            flags.mark_geometry();
        } else {
            flags.mark_redraw();
        }
        true
    }
}

struct ComponentTarget {
    slot: Weak<Mutex<Slot<Point>>>,
    flags: Weak<ShapeFlags>,
    axis: usize,
    updates_geometry: bool,
}

impl AnimTarget for ComponentTarget {
    fn fetch(&self) -> Value {
        let Some(slot) = self.slot.upgrade() else {
            return Value::Scalar(0.0);
        };
        let current = slot.lock().unwrap().current;
        Value::Scalar(if self.axis == 0 { current.x } else { current.y })
    }

    fn apply(&self, value: Value) -> bool {
        let (Some(slot), Some(flags)) = (self.slot.upgrade(), self.flags.upgrade()) else {
            return false;
        };
        if !flags.is_alive() {
            return false;
        }
        let component = f32::from_value(&value);
        let mut slot = slot.lock().unwrap();
        if self.axis == 0 {
            slot.current.x = component;
        } else {
            slot.current.y = component;
        }
        drop(slot);
        if self.updates_geometry {
            flags.mark_geometry();
        } else {
            flags.mark_redraw();
        }
        true
    }
}

struct ChannelTarget {
    slot: Weak<Mutex<Slot<Color>>>,
    flags: Weak<ShapeFlags>,
    channel: usize,
}

impl AnimTarget for ChannelTarget {
    fn fetch(&self) -> Value {
        let Some(slot) = self.slot.upgrade() else {
            return Value::Scalar(0.0);
        };
        let current = slot.lock().unwrap().current;
        Value::Scalar(current.channel(self.channel) as f32)
    }

    fn apply(&self, value: Value) -> bool {
        let (Some(slot), Some(flags)) = (self.slot.upgrade(), self.flags.upgrade()) else {
            return false;
        };
        if !flags.is_alive() {
            return false;
        }
        let channel = f32::from_value(&value).round().clamp(0.0, 255.0) as u8;
        slot.lock().unwrap().current.set_channel(self.channel, channel);
        flags.mark_redraw();
        true
    }
}

struct ColorPairTarget {
    fill: Weak<Mutex<Slot<Color>>>,
    line: Weak<Mutex<Slot<Color>>>,
    flags: Weak<ShapeFlags>,
}

impl AnimTarget for ColorPairTarget {
    fn fetch(&self) -> Value {
        match self.fill.upgrade() {
            Some(slot) => slot.lock().unwrap().current.to_value(),
            None => Value::Scalar(0.0),
        }
    }

    fn apply(&self, value: Value) -> bool {
        let (Some(fill), Some(line), Some(flags)) = (
            self.fill.upgrade(),
            self.line.upgrade(),
            self.flags.upgrade(),
        ) else {
            return false;
        };
        if !flags.is_alive() {
            return false;
        }
        let color = Color::from_value(&value);
        fill.lock().unwrap().current = color;
        line.lock().unwrap().current = color;
        flags.mark_redraw();
        true
    }
}

struct OutlineSlotTarget {
    slot: Weak<Mutex<Slot<Outline>>>,
    flags: Weak<ShapeFlags>,
}

impl OutlineTarget for OutlineSlotTarget {
    fn fetch(&self) -> Outline {
        match self.slot.upgrade() {
            Some(slot) => slot.lock().unwrap().current.clone(),
            None => Vec::new(),
        }
    }

    fn apply(&self, outline: Outline) -> bool {
        let (Some(slot), Some(flags)) = (self.slot.upgrade(), self.flags.upgrade()) else {
            return false;
        };
        if !flags.is_alive() {
            return false;
        }
        slot.lock().unwrap().current = outline;
        // Morphs carry explicit vertices; geometry regeneration must not
        // overwrite them mid-flight
        flags.mark_redraw();
        true
    }
}

/// A property whose values cannot be numerically interpolated
///
/// Booleans, callbacks, strings. The target updates synchronously and the
/// current side flips through a deferred write when the queue reaches it.
pub struct OpaqueProperty<T: Clone + Send + 'static> {
    slot: Arc<Mutex<Slot<T>>>,
    flags: Arc<ShapeFlags>,
}

impl<T: Clone + Send + 'static> Clone for OpaqueProperty<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            flags: Arc::clone(&self.flags),
        }
    }
}

impl<T: Clone + Send + 'static> OpaqueProperty<T> {
    pub fn new(initial: T, flags: &Arc<ShapeFlags>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                target: initial.clone(),
                current: initial,
            })),
            flags: Arc::clone(flags),
        }
    }

    pub fn get(&self) -> T {
        self.slot.lock().unwrap().target.clone()
    }

    pub fn current(&self) -> T {
        self.slot.lock().unwrap().current.clone()
    }

    pub fn init(&self, value: T) {
        let mut slot = self.slot.lock().unwrap();
        slot.target = value.clone();
        slot.current = value;
    }

    /// Store the target and defer the current-side write into the queue
    pub fn set(&self, value: T, seq: &SequencerHandle) {
        self.slot.lock().unwrap().target = value.clone();
        let slot = Arc::downgrade(&self.slot);
        let flags = Arc::downgrade(&self.flags);
        seq.defer(move || {
            let (Some(slot), Some(flags)) = (slot.upgrade(), flags.upgrade()) else {
                return;
            };
            if !flags.is_alive() {
                return;
            }
            slot.lock().unwrap().current = value;
            flags.mark_redraw();
        });
    }

    /// Write only the target side
    pub fn set_target(&self, value: T) {
        self.slot.lock().unwrap().target = value;
    }

    /// Write the current side immediately, bypassing the queue
    pub fn force_current(&self, value: T) {
        self.slot.lock().unwrap().current = value;
        self.flags.mark_redraw();
    }
}
