//! Timing configuration
//!
//! Two durations shape every scripted call: `animation_ms` (how long a
//! transition takes) and `delay_ms` (how far the choreography cursor moves
//! per call). `scale()` multiplies both and saves the previous pair on a
//! stack so the change can be undone with `unscale()`. Scaling by zero is
//! the snap mode used while a shape is being constructed: its properties
//! jump to their initial values without animating.

/// The animation/delay duration pair with a save/restore stack
#[derive(Debug)]
pub struct AnimationTiming {
    animation_ms: i64,
    delay_ms: i64,
    stack: Vec<(i64, i64)>,
}

pub const DEFAULT_ANIMATION_MS: i64 = 250;
pub const DEFAULT_DELAY_MS: i64 = 250;

impl AnimationTiming {
    pub fn new() -> Self {
        Self {
            animation_ms: DEFAULT_ANIMATION_MS,
            delay_ms: DEFAULT_DELAY_MS,
            stack: Vec::new(),
        }
    }

    pub fn animation_ms(&self) -> i64 {
        self.animation_ms
    }

    pub fn delay_ms(&self) -> i64 {
        self.delay_ms
    }

    pub fn set_animation_ms(&mut self, ms: i64) {
        self.animation_ms = ms.max(0);
    }

    pub fn set_delay_ms(&mut self, ms: i64) {
        self.delay_ms = ms.max(0);
    }

    /// Save the current pair and multiply both durations by `factor`
    pub fn scale(&mut self, factor: f32) {
        self.stack.push((self.animation_ms, self.delay_ms));
        self.animation_ms = (self.animation_ms as f32 * factor) as i64;
        self.delay_ms = (self.delay_ms as f32 * factor) as i64;
    }

    /// Restore the pair saved by the matching [`scale`]; no-op on an empty stack
    ///
    /// [`scale`]: AnimationTiming::scale
    pub fn unscale(&mut self) {
        if let Some((animation_ms, delay_ms)) = self.stack.pop() {
            self.animation_ms = animation_ms;
            self.delay_ms = delay_ms;
        }
    }
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self::new()
    }
}
