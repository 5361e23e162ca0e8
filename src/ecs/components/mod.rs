//! ECS components (transform, surface, physics).

pub mod physics;
pub mod surface;
pub mod transform;

pub use physics::*;
pub use surface::*;
pub use transform::*;
