//! Scribble core types
//!
//! Shared primitives for the Scribble drawing/animation library:
//!
//! - **Geometry**: `Point` and polygon `Outline`s
//! - **Color**: RGBA color with byte channels and float interpolation
//! - **Easing**: the two built-in animation curves (linear, smoothed)
//! - **Value**: a recursive interpolation tree that scalars, vectors,
//!   colors, and vertex lists all lower into

pub mod color;
pub mod ease;
pub mod error;
pub mod geometry;
pub mod value;

pub use color::Color;
pub use ease::{cubic_ease_in_out, Easing};
pub use error::{Result, ScribbleError};
pub use geometry::{Outline, Point};
pub use value::{AnimValue, Value};
