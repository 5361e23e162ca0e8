//! Shot resolution: ray casts against composite models and hit impulses.

use glam::Vec3;

use super::destructible::DestructibleObject;
use crate::ecs::components::physics::RigidBody;
use crate::ecs::components::surface::{CompoundChild, Surface};
use crate::physics::ray::{cast_shape, Ray};
use crate::scene::{ModelId, Stage};

/// One ray-surface intersection produced by a shot.
///
/// Transient: valid for the frame that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitPoint {
    pub model: ModelId,
    pub surface: hecs::Entity,
    /// World-space collision point.
    pub point: Vec3,
    /// World-space unit face normal, facing the shooter.
    pub normal: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
    /// Unit direction of the ray.
    pub direction: Vec3,
}

/// Casts shot rays against the surfaces of composite models.
#[derive(Debug, Clone, Copy)]
pub struct ShotResolver {
    skip_hidden: bool,
}

impl Default for ShotResolver {
    fn default() -> Self {
        Self { skip_hidden: true }
    }
}

impl ShotResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether invisible surfaces can be struck. Default: no.
    pub fn with_hidden_surfaces(mut self, hittable: bool) -> Self {
        self.skip_hidden = !hittable;
        self
    }

    /// All hits of `ray` on `target`, nearest first.
    ///
    /// Destroyed objects no longer respond to shots and yield no hits.
    pub fn resolve(&self, stage: &Stage, ray: &Ray, target: &DestructibleObject) -> Vec<HitPoint> {
        if target.is_destroyed() {
            tracing::trace!(model = ?target.model(), "target destroyed, shot passes through");
            return Vec::new();
        }
        self.resolve_model(stage, ray, target.model())
    }

    /// All hits of `ray` on the surfaces of one model, nearest first.
    pub fn resolve_model(&self, stage: &Stage, ray: &Ray, model: ModelId) -> Vec<HitPoint> {
        let mut hits = Vec::new();
        self.collect(stage, ray, model, &mut hits);
        sort_by_distance(&mut hits);
        hits
    }

    /// Hits across several targets, ranked together nearest first.
    pub fn resolve_all<'a>(
        &self,
        stage: &Stage,
        ray: &Ray,
        targets: impl IntoIterator<Item = &'a DestructibleObject>,
    ) -> Vec<HitPoint> {
        let mut hits = Vec::new();
        for target in targets {
            if !target.is_destroyed() {
                self.collect(stage, ray, target.model(), &mut hits);
            }
        }
        sort_by_distance(&mut hits);
        hits
    }

    fn collect(&self, stage: &Stage, ray: &Ray, model: ModelId, hits: &mut Vec<HitPoint>) {
        let Some(composite) = stage.model(model) else {
            tracing::debug!(?model, "shot against unknown model");
            return;
        };

        for &entity in composite.surfaces() {
            let Ok(surface) = stage.world().get::<&Surface>(entity) else {
                continue;
            };
            if self.skip_hidden && !surface.visible {
                continue;
            }
            let Some(shape_to_world) = stage.surface_to_world(entity) else {
                continue;
            };
            if let Some(hit) = cast_shape(ray, &surface.shape, shape_to_world) {
                hits.push(HitPoint {
                    model,
                    surface: entity,
                    point: hit.point,
                    normal: hit.normal,
                    distance: hit.distance,
                    direction: ray.direction,
                });
            }
        }
    }

    /// The hit with the smallest distance, if any.
    pub fn nearest(hits: &[HitPoint]) -> Option<&HitPoint> {
        let mut best: Option<&HitPoint> = None;
        for hit in hits {
            if best.map_or(true, |b| hit.distance < b.distance) {
                best = Some(hit);
            }
        }
        best
    }

    /// Push the struck body along the shot direction, scaled by `force`.
    ///
    /// The impulse is applied at the hit point. Surfaces attached to a
    /// compound push the compound's body. Returns `false` when there is no
    /// body to push or the body is static.
    pub fn apply_impulse(stage: &mut Stage, hit: &HitPoint, force: f32) -> bool {
        let body_entity = stage
            .world()
            .get::<&CompoundChild>(hit.surface)
            .map(|member| member.0)
            .unwrap_or(hit.surface);

        let frame = if body_entity == hit.surface {
            stage.surface_to_world(body_entity)
        } else {
            stage.local_to_world(body_entity)
        };
        let Some(frame) = frame else {
            tracing::debug!(surface = ?hit.surface, "struck surface is gone, no impulse");
            return false;
        };
        let (_, rotation, centre) = frame.to_scale_rotation_translation();

        let Ok(mut body) = stage.world().get::<&mut RigidBody>(body_entity) else {
            tracing::debug!(surface = ?hit.surface, "struck surface has no physics body, no impulse");
            return false;
        };
        let applied = body.apply_impulse(hit.direction * force, hit.point - centre, rotation);
        if !applied {
            tracing::debug!(surface = ?hit.surface, "static body absorbs impulse");
        }
        applied
    }
}

fn sort_by_distance(hits: &mut [HitPoint]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::destructible::Energy;
    use crate::geometry::{PrimitiveBuilder, SurfaceDesc};
    use crate::physics::profile::PhysicsProfile;

    fn two_crates(stage: &mut Stage, profile: PhysicsProfile) -> (ModelId, hecs::Entity, hecs::Entity) {
        let model = stage.create_model("crates");
        let mut builder = PrimitiveBuilder::new(stage, model);
        let near = builder
            .create_box(Vec3::ONE, &SurfaceDesc::new(Vec3::new(0.0, 0.0, -5.0), "crate").with_profile(profile))
            .unwrap();
        let far = builder
            .create_box(Vec3::ONE, &SurfaceDesc::new(Vec3::new(0.0, 0.0, -10.0), "crate").with_profile(profile))
            .unwrap();
        (model, near, far)
    }

    fn hit_at(distance: f32) -> HitPoint {
        let mut world = hecs::World::new();
        HitPoint {
            model: ModelId(0),
            surface: world.spawn(()),
            point: Vec3::ZERO,
            normal: Vec3::Z,
            distance,
            direction: -Vec3::Z,
        }
    }

    #[test]
    fn test_nearest_selection() {
        let hits = [hit_at(5.2), hit_at(1.1), hit_at(8.0)];
        assert_eq!(ShotResolver::nearest(&hits).unwrap().distance, 1.1);
        assert!(ShotResolver::nearest(&[]).is_none());
    }

    #[test]
    fn test_resolve_collects_all_sorted() {
        let mut stage = Stage::default();
        let (model, near, far) = two_crates(&mut stage, PhysicsProfile::STATIC);
        let target = DestructibleObject::new(model, Energy::Finite(10));

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let hits = ShotResolver::new().resolve(&stage, &ray, &target);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].surface, near);
        assert_eq!(hits[1].surface, far);
        assert!((hits[0].distance - 4.5).abs() < 1e-5);
        assert!((hits[0].normal - Vec3::Z).length() < 1e-5);
        assert_eq!(hits[0].direction, -Vec3::Z);
    }

    #[test]
    fn test_resolve_skips_hidden() {
        let mut stage = Stage::default();
        let (model, near, _) = two_crates(&mut stage, PhysicsProfile::STATIC);
        stage.world().get::<&mut Surface>(near).unwrap().visible = false;

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let hits = ShotResolver::new().resolve_model(&stage, &ray, model);
        assert_eq!(hits.len(), 1);
        let hits = ShotResolver::new()
            .with_hidden_surfaces(true)
            .resolve_model(&stage, &ray, model);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_resolve_all_ranks_across_targets() {
        let mut stage = Stage::default();
        let (a, _, _) = two_crates(&mut stage, PhysicsProfile::STATIC);
        let b = stage.create_model("barrel");
        PrimitiveBuilder::new(&mut stage, b)
            .create_cylinder(1.0, 2.0, &SurfaceDesc::new(Vec3::new(0.0, 0.0, -7.0), "metal"))
            .unwrap();

        let targets = [
            DestructibleObject::new(a, Energy::Finite(5)),
            DestructibleObject::new(b, Energy::Unbreakable),
        ];
        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let hits = ShotResolver::new().resolve_all(&stage, &ray, &targets);
        let models: Vec<ModelId> = hits.iter().map(|h| h.model).collect();
        assert_eq!(models, [a, b, a]);
    }

    #[test]
    fn test_impulse_on_dynamic_body() {
        let mut stage = Stage::default();
        let (model, near, _) = two_crates(&mut stage, PhysicsProfile::LIGHT_WOOD);
        let hit = ShotResolver::new().resolve_model(&stage, &Ray::new(Vec3::ZERO, -Vec3::Z), model)[0];

        assert!(ShotResolver::apply_impulse(&mut stage, &hit, 3.0));
        let body = stage.world().get::<&RigidBody>(near).unwrap();
        // Mass 0.6, impulse 3 along -Z.
        assert!((body.linear_velocity - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-4);
    }

    #[test]
    fn test_impulse_on_static_or_missing_body() {
        let mut stage = Stage::default();
        let (model, _, _) = two_crates(&mut stage, PhysicsProfile::STATIC);
        let hit = ShotResolver::new().resolve_model(&stage, &Ray::new(Vec3::ZERO, -Vec3::Z), model)[0];
        assert!(!ShotResolver::apply_impulse(&mut stage, &hit, 3.0));

        let inert = stage.create_model("poster");
        PrimitiveBuilder::new(&mut stage, inert)
            .create_box(
                Vec3::ONE,
                &SurfaceDesc::new(Vec3::new(0.0, 0.0, -2.0), "paper").with_profile(PhysicsProfile::INERT),
            )
            .unwrap();
        let hit = ShotResolver::new().resolve_model(&stage, &Ray::new(Vec3::ZERO, -Vec3::Z), inert)[0];
        assert!(!ShotResolver::apply_impulse(&mut stage, &hit, 3.0));
    }
}
