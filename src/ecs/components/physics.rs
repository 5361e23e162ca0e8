//! Physics impostor components attached to surfaces.

use glam::{Mat3, Vec3};

use crate::physics::profile::{BodyClass, ImpostorParams, PhysicsProfile};

/// Rigid body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyType {
    /// Affected by gravity and impulses.
    Dynamic,
    /// Immovable.
    Static,
}

/// Rigid body component.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub body_type: RigidBodyType,
    pub mass: f32,
    /// Diagonal of the inertia tensor in body space.
    pub inertia: Vec3,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub force_accumulator: Vec3,
    /// Linear damping factor (default: 0.01).
    pub linear_damping: f32,
    /// Angular damping factor (default: 0.01).
    pub angular_damping: f32,
    pub restitution: f32,
    pub friction: f32,
    /// Gravity scale (default: 1.0).
    pub gravity_scale: f32,
}

impl RigidBody {
    /// Create a new dynamic rigid body.
    pub fn new_dynamic(mass: f32, inertia: Vec3) -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            mass,
            inertia,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            force_accumulator: Vec3::ZERO,
            linear_damping: 0.01,
            angular_damping: 0.01,
            restitution: 0.3,
            friction: 0.5,
            gravity_scale: 1.0,
        }
    }

    /// Create a new static rigid body.
    pub fn new_static() -> Self {
        Self {
            body_type: RigidBodyType::Static,
            mass: 0.0,
            inertia: Vec3::ZERO,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            force_accumulator: Vec3::ZERO,
            linear_damping: 0.0,
            angular_damping: 0.0,
            restitution: 0.3,
            friction: 0.5,
            gravity_scale: 0.0,
        }
    }

    /// Build the impostor body for a profile and collider shape.
    ///
    /// Returns `None` for inert profiles. A movable profile that yields no
    /// mass (zero volume or zero density) falls back to a static body.
    pub fn from_profile(profile: &PhysicsProfile, shape: &ColliderShape) -> Option<Self> {
        let ImpostorParams {
            mass,
            friction,
            restitution,
        } = profile.derive_impostor_params(shape.volume())?;

        let mut body = match profile.body_class {
            BodyClass::Movable if mass > 0.0 => Self::new_dynamic(mass, shape.inertia(mass)),
            BodyClass::Movable => {
                tracing::warn!(?profile, "movable profile produced no mass, attaching static body");
                Self::new_static()
            }
            _ => Self::new_static(),
        };
        body.friction = friction;
        body.restitution = restitution;
        Some(body)
    }

    /// Inverse mass, zero for static or massless bodies.
    pub fn inverse_mass(&self) -> f32 {
        if self.body_type == RigidBodyType::Dynamic && self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    /// Inverse inertia tensor in world space for the given orientation.
    pub fn inverse_inertia_world(&self, rotation: glam::Quat) -> Mat3 {
        if self.inverse_mass() == 0.0 {
            return Mat3::ZERO;
        }
        let inv = Vec3::new(
            if self.inertia.x > 0.0 { 1.0 / self.inertia.x } else { 0.0 },
            if self.inertia.y > 0.0 { 1.0 / self.inertia.y } else { 0.0 },
            if self.inertia.z > 0.0 { 1.0 / self.inertia.z } else { 0.0 },
        );
        let r = Mat3::from_quat(rotation);
        r * Mat3::from_diagonal(inv) * r.transpose()
    }

    /// Apply an impulse at offset `r` from the centre of mass.
    ///
    /// Returns `false` (and leaves the body untouched) for static bodies.
    pub fn apply_impulse(&mut self, impulse: Vec3, r: Vec3, rotation: glam::Quat) -> bool {
        let inv_mass = self.inverse_mass();
        if inv_mass == 0.0 {
            return false;
        }
        self.linear_velocity += impulse * inv_mass;
        self.angular_velocity += self.inverse_inertia_world(rotation) * r.cross(impulse);
        true
    }

    /// Convert this body into a dynamic one with the given mass.
    pub fn make_dynamic(&mut self, mass: f32, inertia: Vec3) {
        self.body_type = RigidBodyType::Dynamic;
        self.mass = mass;
        self.inertia = inertia;
        self.linear_damping = 0.01;
        self.angular_damping = 0.01;
        self.gravity_scale = 1.0;
    }
}

/// Collider shape, centred on the surface's geometric centre.
#[derive(Debug, Clone, PartialEq)]
pub enum ColliderShape {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Cylinder along the local Y axis.
    Cylinder { radius: f32, half_height: f32 },
}

impl ColliderShape {
    /// Enclosed volume.
    pub fn volume(&self) -> f32 {
        match self {
            ColliderShape::Box { half_extents } => {
                let size = *half_extents * 2.0;
                size.x * size.y * size.z
            }
            ColliderShape::Sphere { radius } => 4.0 / 3.0 * std::f32::consts::PI * radius.powi(3),
            ColliderShape::Cylinder {
                radius,
                half_height,
            } => std::f32::consts::PI * radius * radius * half_height * 2.0,
        }
    }

    /// Diagonal inertia tensor of a solid shape with the given mass.
    pub fn inertia(&self, mass: f32) -> Vec3 {
        match self {
            ColliderShape::Box { half_extents } => {
                let s = *half_extents * 2.0;
                let k = mass / 12.0;
                Vec3::new(
                    k * (s.y * s.y + s.z * s.z),
                    k * (s.x * s.x + s.z * s.z),
                    k * (s.x * s.x + s.y * s.y),
                )
            }
            ColliderShape::Sphere { radius } => Vec3::splat(0.4 * mass * radius * radius),
            ColliderShape::Cylinder {
                radius,
                half_height,
            } => {
                let h = half_height * 2.0;
                let side = mass * (3.0 * radius * radius + h * h) / 12.0;
                Vec3::new(side, 0.5 * mass * radius * radius, side)
            }
        }
    }
}

/// Collision shape component. Present exactly when the surface has an impostor.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub shape: ColliderShape,
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_box_volume_and_inertia() {
        let shape = ColliderShape::Box {
            half_extents: Vec3::new(1.0, 0.5, 0.25),
        };
        assert!((shape.volume() - 1.0).abs() < 1e-6);
        let inertia = shape.inertia(12.0);
        // I_x = m/12 * (h^2 + d^2) = 1 * (1 + 0.25)
        assert!((inertia.x - 1.25).abs() < 1e-5);
    }

    #[test]
    fn test_cylinder_and_sphere_volume() {
        let cyl = ColliderShape::Cylinder {
            radius: 1.0,
            half_height: 1.0,
        };
        assert!((cyl.volume() - 2.0 * std::f32::consts::PI).abs() < 1e-5);
        let sphere = ColliderShape::Sphere { radius: 1.0 };
        assert!((sphere.volume() - 4.0 / 3.0 * std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn test_from_profile_static() {
        let shape = ColliderShape::Box {
            half_extents: Vec3::ONE,
        };
        let body = RigidBody::from_profile(&PhysicsProfile::STATIC, &shape).unwrap();
        assert_eq!(body.body_type, RigidBodyType::Static);
        assert_eq!(body.mass, 0.0);
        assert_eq!(body.friction, PhysicsProfile::STATIC.friction);
    }

    #[test]
    fn test_from_profile_movable_mass() {
        let shape = ColliderShape::Box {
            half_extents: Vec3::new(1.0, 1.5, 0.25),
        };
        let body = RigidBody::from_profile(&PhysicsProfile::HEAVY_WOOD, &shape).unwrap();
        assert_eq!(body.body_type, RigidBodyType::Dynamic);
        let expected = 2.0 * 3.0 * 0.5 * PhysicsProfile::HEAVY_WOOD.density;
        assert!((body.mass - expected).abs() < 1e-5);
    }

    #[test]
    fn test_from_profile_inert() {
        let shape = ColliderShape::Sphere { radius: 1.0 };
        assert!(RigidBody::from_profile(&PhysicsProfile::INERT, &shape).is_none());
    }

    #[test]
    fn test_impulse_on_static_is_rejected() {
        let mut body = RigidBody::new_static();
        assert!(!body.apply_impulse(Vec3::X * 10.0, Vec3::Y, Quat::IDENTITY));
        assert_eq!(body.linear_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_impulse_changes_velocity() {
        let shape = ColliderShape::Sphere { radius: 0.5 };
        let mut body = RigidBody::new_dynamic(2.0, shape.inertia(2.0));
        assert!(body.apply_impulse(Vec3::new(4.0, 0.0, 0.0), Vec3::ZERO, Quat::IDENTITY));
        assert!((body.linear_velocity - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-6);
        assert_eq!(body.angular_velocity, Vec3::ZERO);

        // Off-centre impulse adds spin.
        body.apply_impulse(Vec3::X, Vec3::Y * 0.5, Quat::IDENTITY);
        assert!(body.angular_velocity.length() > 0.0);
    }
}
