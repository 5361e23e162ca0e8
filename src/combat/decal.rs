//! Bullet hole placement on struck surfaces.

use glam::{Quat, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::shot::HitPoint;
use crate::ecs::components::surface::{Decal, Surface};
use crate::ecs::components::transform::Transform;
use crate::geometry::spawn_decal;
use crate::material::MaterialLookup;
use crate::scene::Stage;

/// Default bullet hole size in world units.
const DEFAULT_DECAL_SIZE: Vec2 = Vec2::splat(0.25);

/// Places impact decals with random in-plane rotation.
pub struct DecalPlacer<R = StdRng> {
    rng: R,
    size: Vec2,
}

impl DecalPlacer<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic placer for replays and tests.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for DecalPlacer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> DecalPlacer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            size: DEFAULT_DECAL_SIZE,
        }
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Stick a bullet hole on the surface struck by `hit`.
    ///
    /// The decal texture comes from `lookup` keyed by the struck texture.
    /// `index` orders decals on one object: depth bias is `-(1 + index)`.
    /// Returns `None` (logged) if the struck surface is gone.
    pub fn place_bullet_hole(
        &mut self,
        stage: &mut Stage,
        hit: &HitPoint,
        lookup: &dyn MaterialLookup,
        index: u32,
    ) -> Option<hecs::Entity> {
        let texture = match stage.world().get::<&Surface>(hit.surface) {
            Ok(surface) => lookup.bullet_hole_for(&surface.texture),
            Err(_) => {
                tracing::debug!(surface = ?hit.surface, "struck surface is gone, no decal");
                return None;
            }
        };
        let to_local = stage.local_to_world(hit.surface)?.inverse();

        let local_normal = to_local.transform_vector3(hit.normal).normalize_or_zero();
        if local_normal == Vec3::ZERO {
            tracing::debug!(surface = ?hit.surface, "degenerate hit normal, no decal");
            return None;
        }

        let rotation_degrees = self.rng.gen_range(0..=359u32) as f32;
        let rotation = Quat::from_rotation_arc(Vec3::Z, local_normal)
            * Quat::from_rotation_z(rotation_degrees.to_radians());
        let local = Transform::from_position(to_local.transform_point3(hit.point)).with_rotation(rotation);

        let decal = Decal {
            host: hit.surface,
            index,
            rotation_degrees,
        };
        let entity = spawn_decal(stage, hit.surface, local, self.size, texture, decal)?;
        tracing::trace!(surface = ?hit.surface, ?entity, index, rotation_degrees, "bullet hole placed");
        Some(entity)
    }
}
