//! Ray queries against surface primitives.
//!
//! Each test works in the shape's local frame: the ray is moved into that
//! frame with the inverse of the (rigid) shape-to-world matrix, intersected
//! against the canonical primitive, and the hit is moved back to world space.
//! Rigid transforms preserve length, so local and world distances agree.

use glam::{Mat4, Vec3};

use crate::ecs::components::surface::SurfaceShape;

const PARALLEL_EPSILON: f32 = 1e-8;

/// A half-line used for shot queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction, or zero for a degenerate ray that hits nothing.
    pub direction: Vec3,
    pub max_distance: f32,
}

impl Ray {
    /// Create an unbounded ray. The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            max_distance: f32::INFINITY,
        }
    }

    /// Create a ray between two points, bounded by their distance.
    pub fn between(from: Vec3, to: Vec3) -> Self {
        Self::new(from, to - from).with_max_distance(from.distance(to))
    }

    /// Limit the distance at which hits are reported.
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec3::ZERO
    }
}

/// One ray-surface intersection in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    /// Unit face normal, oriented against the ray.
    pub normal: Vec3,
}

/// Intersect a ray with a shape placed by `shape_to_world`.
///
/// Returns the first intersection in front of the ray origin within the
/// ray's max distance. Non-pickable shapes never intersect.
pub fn cast_shape(ray: &Ray, shape: &SurfaceShape, shape_to_world: Mat4) -> Option<RayHit> {
    if ray.is_degenerate() || !shape.is_pickable() {
        return None;
    }

    let inv = shape_to_world.inverse();
    let o = inv.transform_point3(ray.origin);
    let d = inv.transform_vector3(ray.direction);

    let (t, local_normal) = match shape {
        SurfaceShape::Box { size } => ray_box(o, d, *size * 0.5)?,
        SurfaceShape::Sphere { diameter } => ray_sphere(o, d, diameter * 0.5)?,
        SurfaceShape::Cylinder { diameter, height } => {
            ray_cylinder(o, d, diameter * 0.5, height * 0.5)?
        }
        SurfaceShape::Plane { width, height } => ray_quad(o, d, width * 0.5, height * 0.5)?,
        _ => return None,
    };

    if t > ray.max_distance {
        return None;
    }

    Some(RayHit {
        distance: t,
        point: ray.at(t),
        normal: shape_to_world
            .transform_vector3(local_normal)
            .normalize_or_zero(),
    })
}

/// Slab test against an axis-aligned box centred on the origin.
fn ray_box(o: Vec3, d: Vec3, half: Vec3) -> Option<(f32, Vec3)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_normal = Vec3::ZERO;
    let mut exit_normal = Vec3::ZERO;

    for axis in 0..3 {
        let (oi, di, hi) = (o[axis], d[axis], half[axis]);
        let mut unit = Vec3::ZERO;
        unit[axis] = 1.0;

        if di.abs() < PARALLEL_EPSILON {
            if oi < -hi || oi > hi {
                return None;
            }
            continue;
        }

        let t1 = (-hi - oi) / di;
        let t2 = (hi - oi) / di;
        let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
        // The entered face faces against the ray; the exit face faces along it.
        let sign = di.signum();
        if near > t_enter {
            t_enter = near;
            enter_normal = -unit * sign;
        }
        if far < t_exit {
            t_exit = far;
            exit_normal = unit * sign;
        }
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }
    if t_enter >= 0.0 {
        Some((t_enter, enter_normal))
    } else {
        // Origin inside: report the far wall, facing back at the origin.
        Some((t_exit, -exit_normal))
    }
}

fn ray_sphere(o: Vec3, d: Vec3, radius: f32) -> Option<(f32, Vec3)> {
    let b = o.dot(d);
    let c = o.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let near = -b - root;
    if near >= 0.0 {
        return Some((near, (o + d * near) / radius));
    }
    let far = -b + root;
    if far >= 0.0 {
        Some((far, -(o + d * far) / radius))
    } else {
        None
    }
}

/// Capped cylinder along Y, centred on the origin.
fn ray_cylinder(o: Vec3, d: Vec3, radius: f32, half_height: f32) -> Option<(f32, Vec3)> {
    let mut best: Option<(f32, Vec3)> = None;
    let mut consider = |t: f32, normal: Vec3| {
        if t >= 0.0 && best.map_or(true, |(bt, _)| t < bt) {
            best = Some((t, normal));
        }
    };

    // Side wall.
    let a = d.x * d.x + d.z * d.z;
    if a > PARALLEL_EPSILON {
        let b = o.x * d.x + o.z * d.z;
        let c = o.x * o.x + o.z * o.z - radius * radius;
        let disc = b * b - a * c;
        if disc >= 0.0 {
            let root = disc.sqrt();
            for t in [(-b - root) / a, (-b + root) / a] {
                let p = o + d * t;
                if p.y.abs() <= half_height {
                    consider(t, Vec3::new(p.x, 0.0, p.z) / radius);
                }
            }
        }
    }

    // Caps.
    if d.y.abs() > PARALLEL_EPSILON {
        for cap in [half_height, -half_height] {
            let t = (cap - o.y) / d.y;
            let p = o + d * t;
            if p.x * p.x + p.z * p.z <= radius * radius {
                consider(t, Vec3::Y * cap.signum());
            }
        }
    }

    // Outward normals face away from the ray only when the origin is inside.
    best.map(|(t, n)| if n.dot(d) > 0.0 { (t, -n) } else { (t, n) })
}

/// Double-sided quad in the local XY plane.
fn ray_quad(o: Vec3, d: Vec3, half_w: f32, half_h: f32) -> Option<(f32, Vec3)> {
    if d.z.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = -o.z / d.z;
    if t < 0.0 {
        return None;
    }
    let p = o + d * t;
    if p.x.abs() > half_w || p.y.abs() > half_h {
        return None;
    }
    let normal = if d.z < 0.0 { Vec3::Z } else { Vec3::NEG_Z };
    Some((t, normal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn unit_box() -> SurfaceShape {
        SurfaceShape::Box { size: Vec3::ONE }
    }

    #[test]
    fn test_ray_box_front_face() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let hit = cast_shape(&ray, &unit_box(), Mat4::IDENTITY).unwrap();
        assert!((hit.distance - 4.5).abs() < 1e-5);
        assert!((hit.point - Vec3::new(0.0, 0.0, -0.5)).length() < 1e-5);
        assert!((hit.normal - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_ray_box_miss() {
        let ray = Ray::new(Vec3::new(2.0, 0.0, -5.0), Vec3::Z);
        assert!(cast_shape(&ray, &unit_box(), Mat4::IDENTITY).is_none());
    }

    #[test]
    fn test_ray_box_behind_origin() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert!(cast_shape(&ray, &unit_box(), Mat4::IDENTITY).is_none());
    }

    #[test]
    fn test_ray_box_from_inside() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = cast_shape(&ray, &unit_box(), Mat4::IDENTITY).unwrap();
        assert!((hit.distance - 0.5).abs() < 1e-5);
        assert!((hit.normal - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_ray_rotated_translated_box() {
        let world = Mat4::from_rotation_translation(
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::new(10.0, 0.0, 0.0),
        );
        let shape = SurfaceShape::Box {
            size: Vec3::new(4.0, 1.0, 1.0),
        };
        // Rotated a quarter turn, the long side now runs along Z.
        let ray = Ray::new(Vec3::new(10.0, 0.0, -10.0), Vec3::Z);
        let hit = cast_shape(&ray, &shape, world).unwrap();
        assert!((hit.distance - 8.0).abs() < 1e-4, "distance {}", hit.distance);
        assert!((hit.normal - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_max_distance() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z).with_max_distance(3.0);
        assert!(cast_shape(&ray, &unit_box(), Mat4::IDENTITY).is_none());
        let ray = Ray::between(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO);
        assert!(cast_shape(&ray, &unit_box(), Mat4::IDENTITY).is_some());
    }

    #[test]
    fn test_ray_sphere() {
        let shape = SurfaceShape::Sphere { diameter: 2.0 };
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        let hit = cast_shape(&ray, &shape, Mat4::IDENTITY).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_ray_cylinder_side_and_cap() {
        let shape = SurfaceShape::Cylinder {
            diameter: 2.0,
            height: 4.0,
        };
        let side = Ray::new(Vec3::new(-5.0, 1.0, 0.0), Vec3::X);
        let hit = cast_shape(&side, &shape, Mat4::IDENTITY).unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::NEG_X).length() < 1e-5);

        let top = Ray::new(Vec3::new(0.5, 10.0, 0.0), Vec3::NEG_Y);
        let hit = cast_shape(&top, &shape, Mat4::IDENTITY).unwrap();
        assert!((hit.distance - 8.0).abs() < 1e-5);
        assert!((hit.normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_ray_cylinder_from_inside() {
        let shape = SurfaceShape::Cylinder {
            diameter: 2.0,
            height: 4.0,
        };
        let sideways = Ray::new(Vec3::ZERO, Vec3::X);
        let hit = cast_shape(&sideways, &shape, Mat4::IDENTITY).unwrap();
        assert!((hit.distance - 1.0).abs() < 1e-5, "distance {}", hit.distance);
        assert!((hit.normal - Vec3::NEG_X).length() < 1e-5);

        let up = Ray::new(Vec3::new(0.2, 0.5, 0.0), Vec3::Y);
        let hit = cast_shape(&up, &shape, Mat4::IDENTITY).unwrap();
        assert!((hit.distance - 1.5).abs() < 1e-5, "distance {}", hit.distance);
        assert!((hit.normal - Vec3::NEG_Y).length() < 1e-5);
    }

    #[test]
    fn test_ray_plane_is_double_sided() {
        let shape = SurfaceShape::Plane {
            width: 2.0,
            height: 2.0,
        };
        let front = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        let back = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::Z);
        let hf = cast_shape(&front, &shape, Mat4::IDENTITY).unwrap();
        let hb = cast_shape(&back, &shape, Mat4::IDENTITY).unwrap();
        assert_eq!(hf.normal, Vec3::Z);
        assert_eq!(hb.normal, Vec3::NEG_Z);
    }

    #[test]
    fn test_decal_not_pickable() {
        let shape = SurfaceShape::Decal {
            width: 1.0,
            height: 1.0,
        };
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        assert!(cast_shape(&ray, &shape, Mat4::IDENTITY).is_none());
    }

    #[test]
    fn test_degenerate_ray() {
        let ray = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert!(ray.is_degenerate());
        assert!(cast_shape(&ray, &unit_box(), Mat4::IDENTITY).is_none());
    }
}
