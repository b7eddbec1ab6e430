//! Error types

use thiserror::Error;

/// Errors surfaced by Scribble's public API
///
/// Argument validation happens synchronously, before anything is enqueued,
/// so a failed call never leaves a half-applied animation behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScribbleError {
    /// A position/color slice had the wrong number of components
    #[error("{what}: expected {expected} components, got {got}")]
    ComponentCount {
        what: &'static str,
        expected: &'static str,
        got: usize,
    },

    /// A polygon needs at least three vertices
    #[error("polygon needs at least 3 vertices, got {got}")]
    DegeneratePolygon { got: usize },
}

pub type Result<T> = std::result::Result<T, ScribbleError>;
