//! Breachfire
//!
//! Procedural room layout, physics impostors, and destructible geometry
//! driven by shot rays, on top of a hecs scene.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **ecs** - hecs components (transform hierarchy, surfaces, impostors)
//! 2. **physics** - Physics profiles, ray queries, fixed-step body integration
//! 3. **material** - Texture identities, UV tiling policy, decal lookup
//! 4. **scene** - The [`Stage`] container and composite models
//! 5. **geometry** - Anchored primitive construction
//! 6. **layout** - Room descriptors and the room layout generator
//! 7. **combat** - Shot resolution, bullet holes, destructible objects
//!
//! # Example
//!
//! ```
//! use breachfire::glam::Vec3;
//! use breachfire::{
//!     DestructibleObject, Energy, Ray, RoomLayoutGenerator, RoomSpec, ShotResolver, Stage,
//! };
//!
//! let mut stage = Stage::default();
//! let layout = RoomLayoutGenerator::default()
//!     .build_room(&mut stage, &RoomSpec::default())
//!     .unwrap();
//!
//! let floor = DestructibleObject::new(layout.floor, Energy::Unbreakable);
//! let ray = Ray::new(Vec3::new(10.0, 4.0, 10.0), -Vec3::Y);
//! let hits = ShotResolver::new().resolve(&stage, &ray, &floor);
//! assert!((hits[0].point.y - 0.0).abs() < 1e-4);
//! ```

pub mod combat;
pub mod config;
pub mod ecs;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod material;
pub mod physics;
pub mod scene;

// Re-export commonly used types
pub use combat::{
    DecalPlacer, DestructibleObject, DestructibleState, Energy, HitPoint, HurtOutcome,
    IgnoreReason, ShotResolver,
};
pub use config::{DamageConfig, LayoutConfig};
pub use error::{BreachError, Result};
pub use geometry::{Anchor, PrimitiveBuilder, SurfaceDesc};
pub use layout::{RoomLayout, RoomLayoutGenerator, RoomSpec, SideSpec, Span, WallSide};
pub use material::{MaterialLibrary, MaterialLookup, TextureId, UvTiling};
pub use physics::profile::{BodyClass, ImpostorParams, PhysicsProfile};
pub use physics::ray::{Ray, RayHit};
pub use physics::{PhysicsConfig, PhysicsWorld};
pub use scene::{CompositeModel, ModelId, SceneRenderer, Stage};

pub use ecs::prelude::*;

// Re-export glam and hecs for convenience
pub use glam;
pub use hecs;
