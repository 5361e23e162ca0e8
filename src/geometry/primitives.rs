//! Surface construction with anchor placement, UV tiling, and physics impostors.

use glam::{Quat, Vec2, Vec3};

use super::uv::box_face_uvs;
use super::Anchor;
use crate::ecs::components::physics::{Collider, ColliderShape, RigidBody};
use crate::ecs::components::surface::{Decal, Surface, SurfaceShape};
use crate::ecs::components::transform::{GlobalTransform, Transform};
use crate::error::{BreachError, Result};
use crate::material::TextureId;
use crate::physics::profile::{BodyClass, PhysicsProfile};
use crate::scene::{ModelId, Stage};

/// Collider thickness given to planes that are explicitly made physical.
const PLANE_COLLIDER_THICKNESS: f32 = 0.01;

/// Placement, material and physics parameters shared by every primitive.
#[derive(Debug, Clone)]
pub struct SurfaceDesc {
    pub position: Vec3,
    pub anchor: Anchor,
    /// Rotation applied about the anchor pivot.
    pub rotation: Quat,
    pub texture: TextureId,
    pub profile: PhysicsProfile,
    pub opacity: f32,
    physical_override: bool,
}

impl SurfaceDesc {
    /// Centre-anchored, unrotated, opaque, static surface.
    pub fn new(position: Vec3, texture: impl Into<TextureId>) -> Self {
        Self {
            position,
            anchor: Anchor::CenterXyz,
            rotation: Quat::IDENTITY,
            texture: texture.into(),
            profile: PhysicsProfile::STATIC,
            opacity: 1.0,
            physical_override: false,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_profile(mut self, profile: PhysicsProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Give a plane a collider. Planes have no volume, so the body is always static.
    pub fn physical(mut self) -> Self {
        self.physical_override = true;
        self
    }
}

/// Builds surfaces into one model of a stage.
pub struct PrimitiveBuilder<'s> {
    stage: &'s mut Stage,
    model: ModelId,
}

impl<'s> PrimitiveBuilder<'s> {
    pub fn new(stage: &'s mut Stage, model: ModelId) -> Self {
        Self { stage, model }
    }

    pub fn model(&self) -> ModelId {
        self.model
    }

    /// Box of `size`. Mass is `size.x * size.y * size.z * density` for
    /// movable profiles.
    pub fn create_box(&mut self, size: Vec3, desc: &SurfaceDesc) -> Result<hecs::Entity> {
        require_positive("box", size)?;
        let collider = ColliderShape::Box {
            half_extents: size * 0.5,
        };
        self.spawn(SurfaceShape::Box { size }, Some(collider), desc)
    }

    /// Cylinder along the local Y axis.
    pub fn create_cylinder(
        &mut self,
        diameter: f32,
        height: f32,
        desc: &SurfaceDesc,
    ) -> Result<hecs::Entity> {
        require_positive("cylinder", Vec3::new(diameter, height, diameter))?;
        let collider = ColliderShape::Cylinder {
            radius: diameter * 0.5,
            half_height: height * 0.5,
        };
        self.spawn(SurfaceShape::Cylinder { diameter, height }, Some(collider), desc)
    }

    pub fn create_sphere(&mut self, diameter: f32, desc: &SurfaceDesc) -> Result<hecs::Entity> {
        require_positive("sphere", Vec3::splat(diameter))?;
        let collider = ColliderShape::Sphere {
            radius: diameter * 0.5,
        };
        self.spawn(SurfaceShape::Sphere { diameter }, Some(collider), desc)
    }

    /// Quad in the local XY plane facing +Z. Non-physical unless
    /// [`SurfaceDesc::physical`] was requested.
    pub fn create_plane(&mut self, width: f32, height: f32, desc: &SurfaceDesc) -> Result<hecs::Entity> {
        require_positive("plane", Vec3::new(width, height, 1.0))?;
        let collider = (desc.physical_override && desc.profile.is_physical()).then(|| {
            ColliderShape::Box {
                half_extents: Vec3::new(width, height, PLANE_COLLIDER_THICKNESS) * 0.5,
            }
        });
        let mut desc = desc.clone();
        // Zero volume: never more than a static body.
        desc.profile = PhysicsProfile::new(
            BodyClass::Static,
            0.0,
            desc.profile.friction,
            desc.profile.restitution,
        );
        self.spawn(SurfaceShape::Plane { width, height }, collider, &desc)
    }

    /// Render-only polyline through `points`, relative to the desc position.
    pub fn create_line(&mut self, points: Vec<Vec3>, desc: &SurfaceDesc) -> Result<hecs::Entity> {
        if points.len() < 2 {
            return Err(BreachError::InvalidDimensions {
                shape: "line",
                dims: Vec3::new(points.len() as f32, 0.0, 0.0),
            });
        }
        self.spawn(SurfaceShape::Line { points }, None, desc)
    }

    /// Render-only flat polygon in the local XZ plane.
    pub fn create_polygon(&mut self, points: Vec<Vec2>, desc: &SurfaceDesc) -> Result<hecs::Entity> {
        if points.len() < 3 {
            return Err(BreachError::InvalidDimensions {
                shape: "polygon",
                dims: Vec3::new(points.len() as f32, 0.0, 0.0),
            });
        }
        self.spawn(SurfaceShape::Polygon { points }, None, desc)
    }

    fn spawn(
        &mut self,
        shape: SurfaceShape,
        collider: Option<ColliderShape>,
        desc: &SurfaceDesc,
    ) -> Result<hecs::Entity> {
        if self.stage.model(self.model).is_none() {
            return Err(BreachError::UnknownModel(self.model));
        }

        let tiling = self.stage.materials().tiling_for(&desc.texture);
        let kind = shape.kind();
        let extent = shape.extent();
        let mut surface = Surface::new(shape, desc.texture.clone());
        surface.center_offset = match surface.shape {
            SurfaceShape::Line { .. } | SurfaceShape::Polygon { .. } => Vec3::ZERO,
            _ => desc.anchor.center_offset(extent),
        };
        surface.tiling = tiling;
        if let SurfaceShape::Box { size } = surface.shape {
            surface.face_uvs = box_face_uvs(size, tiling);
        }
        surface.opacity = desc.opacity.clamp(0.0, 1.0);

        let body = collider
            .as_ref()
            .and_then(|shape| RigidBody::from_profile(&desc.profile, shape));
        let transform = Transform::from_position(desc.position).with_rotation(desc.rotation);

        let world = self.stage.world_mut();
        let entity = world.spawn((transform, GlobalTransform(transform.to_matrix()), surface));
        let mass = match (body, collider) {
            (Some(body), Some(shape)) => {
                let mass = body.mass;
                if let Err(err) = world.insert(entity, (body, Collider { shape })) {
                    tracing::warn!(?entity, %err, "cannot attach impostor body");
                }
                Some(mass)
            }
            _ => None,
        };
        self.stage.register_surface(self.model, entity)?;

        tracing::trace!(
            model = ?self.model,
            ?entity,
            kind,
            texture = %desc.texture,
            ?mass,
            "surface created"
        );
        Ok(entity)
    }
}

fn require_positive(shape: &'static str, dims: Vec3) -> Result<()> {
    if dims.cmpgt(Vec3::ZERO).all() && dims.is_finite() {
        Ok(())
    } else {
        Err(BreachError::InvalidDimensions { shape, dims })
    }
}

/// Spawn a decal quad parented to `host`.
///
/// `local` places the decal in the host's pivot frame. The decal has no
/// physics and is drawn with depth bias `-(1 + index)`. Returns `None` if
/// the host no longer exists or the size is not positive.
pub fn spawn_decal(
    stage: &mut Stage,
    host: hecs::Entity,
    local: Transform,
    size: Vec2,
    texture: TextureId,
    decal: Decal,
) -> Option<hecs::Entity> {
    if !(size.x > 0.0 && size.y > 0.0) {
        tracing::warn!(?size, "decal size must be positive, skipping");
        return None;
    }
    let Some(host_world) = stage.local_to_world(host) else {
        tracing::debug!(?host, "decal host is gone, skipping");
        return None;
    };

    let mut surface = Surface::new(
        SurfaceShape::Decal {
            width: size.x,
            height: size.y,
        },
        texture,
    );
    surface.z_bias = -(1 + decal.index as i32);

    let global = GlobalTransform(host_world * local.to_matrix());
    let entity = stage.world_mut().spawn((local, global, surface, decal));
    stage.attach_child(host, entity);
    Some(entity)
}
