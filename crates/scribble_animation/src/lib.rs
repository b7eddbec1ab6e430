//! Scribble animation core
//!
//! The heart of the library is a single ordered action queue driven by a
//! virtual clock. Calls into the public API do not mutate shapes directly:
//! they append actions to the queue and advance a virtual "delay cursor",
//! so a plain sequence of calls reads as a choreographed script. Each frame
//! the queue is drained against the real elapsed time and every due action
//! moves the scene a little further.
//!
//! - [`clock`]: virtual milliseconds plus the immediate-mode stack
//! - [`timing`]: the animation/delay duration pair with its scale stack
//! - [`action`]: the action variants and the target traits they write through
//! - [`queue`]: the [`Sequencer`] that owns the queue and its cloneable handle
//! - [`morph`]: outline resampling and cyclic alignment for shape morphing

pub mod action;
pub mod clock;
pub mod morph;
pub mod queue;
pub mod timing;

pub use action::{Action, ActionStatus, AnimTarget, LoopId, OutlineTarget};
pub use clock::VirtualClock;
pub use morph::{best_shift, morph, resample};
pub use queue::{Sequencer, SequencerHandle, TimeState};
pub use timing::AnimationTiming;
