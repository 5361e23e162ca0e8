//! Scene graph: the stage, its composite models, and the renderer seam.
//!
//! The [`Stage`] owns a `hecs::World` holding every surface entity. Models
//! group surfaces into logical objects (a wall, a crate) with one lifetime.
//! Drawing goes through [`SceneRenderer`] so the crate never depends on a
//! graphics backend.

pub mod model;
pub mod stage;

pub use model::{CompositeModel, ModelId};
pub use stage::Stage;

use glam::Mat4;

use crate::ecs::components::surface::Surface;

/// Receives visible surfaces during [`Stage::render`].
pub trait SceneRenderer {
    /// Draw one surface. `world` maps the shape's local frame (centred on
    /// the shape) to world space.
    fn draw_surface(&mut self, entity: hecs::Entity, surface: &Surface, world: Mat4);
}
