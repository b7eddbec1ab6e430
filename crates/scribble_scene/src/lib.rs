//! Scribble scene model
//!
//! Shapes live in a registry and expose animatable properties. Reading a
//! property returns its *target* (where the script says it is); the
//! *current* value lags behind, moved by interpolators draining from the
//! shared action queue. The [`DrawingContext`] ties it together: a turtle
//! style cursor, shape factories, timing controls, and the event entry
//! points an embedding window calls into.

pub mod context;
pub mod property;
pub mod registry;
pub mod shape;

pub use context::{CursorState, DrawingContext};
pub use property::{AnimatableProperty, OpaqueProperty, ShapeFlags};
pub use registry::{ShapeId, ShapeRegistry};
pub use shape::{ClickHandler, Geometry, HoverHandler, RenderSnapshot, Shape, ShapeStyle};
