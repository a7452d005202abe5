//! Error types.
//!
//! The frame loop itself has no recoverable failure modes: absent collaborators
//! are skipped and broken contracts panic. The only fallible surface is
//! renderer configuration.

use thiserror::Error;

/// Rejected [`RendererConfig`](crate::RendererConfig) values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The FPS ring buffer needs at least one slot.
    #[error("FPS sample window must hold at least one sample")]
    EmptyFpsWindow,

    /// A clip plane was zero, negative, NaN or infinite.
    #[error("clip plane {name} must be positive and finite (got {value})")]
    InvalidClipPlane {
        /// Which plane was rejected (`"z_near"` or `"z_far"`).
        name: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// The near plane sits on or behind the far plane.
    #[error("z_near ({near}) must be less than z_far ({far})")]
    InvertedClipPlanes {
        /// Configured near plane.
        near: f32,
        /// Configured far plane.
        far: f32,
    },
}
