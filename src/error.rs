//! Error types for stage construction.
//!
//! Gameplay operations (shots, damage, decals) never fail; they log and
//! degrade to a no-op. Only stage-build time work returns [`Result`].

use glam::Vec3;
use thiserror::Error;

use crate::layout::WallSide;
use crate::scene::ModelId;

/// Errors raised while building geometry or loading level descriptors.
#[derive(Debug, Error)]
pub enum BreachError {
    /// A primitive was requested with a zero or negative dimension.
    #[error("{shape} requires positive dimensions, got {dims:?}")]
    InvalidDimensions { shape: &'static str, dims: Vec3 },

    /// Two openings on the same wall side share part of the run.
    #[error("openings on the {side} wall overlap: {first:?} and {second:?}")]
    OverlappingOpenings {
        side: WallSide,
        first: (f32, f32),
        second: (f32, f32),
    },

    /// The wall is not tall enough to hold a window assembly.
    #[error("wall height {wall_height} is too short for a window assembly (needs more than {required})")]
    WallTooShort { wall_height: f32, required: f32 },

    /// A model id that is not (or no longer) registered with the stage.
    #[error("model {0:?} is not registered with the stage")]
    UnknownModel(ModelId),

    /// A room or layout descriptor failed to parse.
    #[cfg(feature = "descriptors")]
    #[error("invalid descriptor: {0}")]
    Descriptor(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, BreachError>;
