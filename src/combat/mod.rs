//! Shots, bullet holes, and destructible objects.
//!
//! Per shot, the fire-control caller resolves a ray against the targets
//! ([`ShotResolver`]), hurts the object owning the nearest hit
//! ([`DestructibleObject::hurt_by`]), and marks the struck surface with a
//! bullet hole ([`DecalPlacer`]).

pub mod decal;
pub mod destructible;
pub mod shot;

pub use decal::DecalPlacer;
pub use destructible::{DestructibleObject, DestructibleState, Energy, HurtOutcome, IgnoreReason};
pub use shot::{HitPoint, ShotResolver};
