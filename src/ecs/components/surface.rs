//! Renderable surface components.

use glam::{Vec2, Vec3};

use crate::geometry::uv::FaceUv;
use crate::material::{TextureId, UvTiling};

/// Geometric primitive of a surface, in the surface's local frame.
///
/// Boxes, cylinders and spheres are centred on the local origin; planes and
/// decals are quads in the local XY plane facing +Z.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceShape {
    Box { size: Vec3 },
    /// Cylinder along the local Y axis.
    Cylinder { diameter: f32, height: f32 },
    Sphere { diameter: f32 },
    Plane { width: f32, height: f32 },
    Decal { width: f32, height: f32 },
    Line { points: Vec<Vec3> },
    /// Flat polygon in the local XZ plane.
    Polygon { points: Vec<Vec2> },
}

impl SurfaceShape {
    pub fn kind(&self) -> &'static str {
        match self {
            SurfaceShape::Box { .. } => "box",
            SurfaceShape::Cylinder { .. } => "cylinder",
            SurfaceShape::Sphere { .. } => "sphere",
            SurfaceShape::Plane { .. } => "plane",
            SurfaceShape::Decal { .. } => "decal",
            SurfaceShape::Line { .. } => "line",
            SurfaceShape::Polygon { .. } => "polygon",
        }
    }

    /// Axis-aligned extent of the shape in its local frame.
    pub fn extent(&self) -> Vec3 {
        match self {
            SurfaceShape::Box { size } => *size,
            SurfaceShape::Cylinder { diameter, height } => Vec3::new(*diameter, *height, *diameter),
            SurfaceShape::Sphere { diameter } => Vec3::splat(*diameter),
            SurfaceShape::Plane { width, height } | SurfaceShape::Decal { width, height } => {
                Vec3::new(*width, *height, 0.0)
            }
            SurfaceShape::Line { points } => bounds(points.iter().copied()),
            SurfaceShape::Polygon { points } => {
                bounds(points.iter().map(|p| Vec3::new(p.x, 0.0, p.y)))
            }
        }
    }

    /// Whether shot rays can strike this shape.
    pub fn is_pickable(&self) -> bool {
        !matches!(
            self,
            SurfaceShape::Decal { .. } | SurfaceShape::Line { .. } | SurfaceShape::Polygon { .. }
        )
    }
}

fn bounds(points: impl Iterator<Item = Vec3>) -> Vec3 {
    let (min, max) = points.fold(
        (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
        |(min, max), p| (min.min(p), max.max(p)),
    );
    if min.x > max.x {
        Vec3::ZERO
    } else {
        max - min
    }
}

/// A renderable, optionally collidable primitive.
#[derive(Debug, Clone)]
pub struct Surface {
    pub shape: SurfaceShape,
    /// Offset from the entity pivot to the shape centre, in the local frame.
    /// Set by the anchor used at construction.
    pub center_offset: Vec3,
    pub texture: TextureId,
    pub tiling: UvTiling,
    pub face_uvs: [FaceUv; 6],
    pub opacity: f32,
    /// Darkening factor in `[0, 1]` applied on top of the texture.
    pub darkening: f32,
    /// Depth bias for coplanar rendering; decals use negative values.
    pub z_bias: i32,
    pub visible: bool,
}

impl Surface {
    pub fn new(shape: SurfaceShape, texture: TextureId) -> Self {
        Self {
            shape,
            center_offset: Vec3::ZERO,
            texture,
            tiling: UvTiling::AllToOne,
            face_uvs: [FaceUv::UNIT; 6],
            opacity: 1.0,
            darkening: 0.0,
            z_bias: 0,
            visible: true,
        }
    }
}

/// Marks a decal surface and records its host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decal {
    pub host: hecs::Entity,
    /// Placement order on the owning object.
    pub index: u32,
    /// In-plane rotation in degrees.
    pub rotation_degrees: f32,
}

/// Root entity of a compound assembly. Its `Children` are the members.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundRoot;

/// Marks a surface attached to a compound root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompoundChild(pub hecs::Entity);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_extent() {
        let poly = SurfaceShape::Polygon {
            points: vec![Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0), Vec2::new(1.0, 2.0)],
        };
        assert_eq!(poly.extent(), Vec3::new(3.0, 0.0, 2.0));
        assert!(!poly.is_pickable());
    }

    #[test]
    fn test_empty_line_extent() {
        let line = SurfaceShape::Line { points: Vec::new() };
        assert_eq!(line.extent(), Vec3::ZERO);
    }
}
