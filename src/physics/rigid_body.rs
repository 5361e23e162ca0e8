//! Rigid body integration for free-flying fragments and debris.
//!
//! Only root bodies are integrated: surfaces still attached to a compound
//! follow their root through the transform hierarchy.

use glam::{Quat, Vec3};

use crate::ecs::components::physics::{RigidBody, RigidBodyType};
use crate::ecs::components::transform::{Parent, Transform};

/// Apply gravity force to all dynamic root bodies.
pub fn apply_gravity(world: &mut hecs::World, gravity: Vec3) {
    for (_, rb) in world.query_mut::<hecs::Without<&mut RigidBody, &Parent>>() {
        if rb.body_type == RigidBodyType::Dynamic && rb.mass > 0.0 {
            rb.force_accumulator += gravity * rb.mass * rb.gravity_scale;
        }
    }
}

/// Integrate velocities using semi-implicit Euler: v += (F/m) * dt.
pub fn integrate_velocities(world: &mut hecs::World, dt: f32) {
    for (_, rb) in world.query_mut::<hecs::Without<&mut RigidBody, &Parent>>() {
        let inv_mass = rb.inverse_mass();
        if inv_mass == 0.0 {
            continue;
        }

        rb.linear_velocity += rb.force_accumulator * inv_mass * dt;

        rb.linear_velocity *= (1.0 - rb.linear_damping).max(0.0);
        rb.angular_velocity *= (1.0 - rb.angular_damping).max(0.0);
    }
}

/// Integrate positions: p += v * dt, q = exp(omega * dt) * q.
pub fn integrate_positions(world: &mut hecs::World, dt: f32) {
    for (_, (rb, transform)) in
        world.query_mut::<hecs::Without<(&RigidBody, &mut Transform), &Parent>>()
    {
        if rb.body_type != RigidBodyType::Dynamic {
            continue;
        }

        transform.position += rb.linear_velocity * dt;

        let omega = rb.angular_velocity;
        if omega.length_squared() > 1e-10 {
            transform.rotation =
                (Quat::from_scaled_axis(omega * dt) * transform.rotation).normalize();
        }
    }
}

/// Clear force accumulators on all rigid bodies.
pub fn clear_forces(world: &mut hecs::World) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        rb.force_accumulator = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::physics::ColliderShape;

    fn step(world: &mut hecs::World, dt: f32) {
        apply_gravity(world, Vec3::new(0.0, -9.81, 0.0));
        integrate_velocities(world, dt);
        integrate_positions(world, dt);
        clear_forces(world);
    }

    #[test]
    fn test_free_fall() {
        let mut world = hecs::World::new();
        let shape = ColliderShape::Sphere { radius: 0.5 };
        let entity = world.spawn((
            Transform::from_position(Vec3::new(0.0, 10.0, 0.0)),
            RigidBody::new_dynamic(1.0, shape.inertia(1.0)),
        ));

        for _ in 0..60 {
            step(&mut world, 1.0 / 60.0);
        }

        let transform = world.get::<&Transform>(entity).unwrap();
        assert!(
            transform.position.y < 10.0 && transform.position.y > 0.0,
            "Body should have fallen a few metres: y = {}",
            transform.position.y
        );
        assert!(transform.position.x.abs() < 1e-5);
        assert!(transform.position.z.abs() < 1e-5);
    }

    #[test]
    fn test_static_body_unaffected() {
        let mut world = hecs::World::new();
        let entity = world.spawn((Transform::identity(), RigidBody::new_static()));

        for _ in 0..60 {
            step(&mut world, 1.0 / 60.0);
        }

        let transform = world.get::<&Transform>(entity).unwrap();
        assert_eq!(transform.position, Vec3::ZERO);
    }

    #[test]
    fn test_attached_child_not_integrated() {
        let mut world = hecs::World::new();
        let root = world.spawn((Transform::identity(),));
        let child = world.spawn((
            Transform::from_position(Vec3::Y),
            RigidBody::new_dynamic(1.0, Vec3::ONE),
            Parent(root),
        ));

        for _ in 0..30 {
            step(&mut world, 1.0 / 60.0);
        }

        let transform = world.get::<&Transform>(child).unwrap();
        assert_eq!(transform.position, Vec3::Y);
    }

    #[test]
    fn test_spin_rotates() {
        let mut world = hecs::World::new();
        let mut rb = RigidBody::new_dynamic(1.0, Vec3::ONE);
        rb.angular_velocity = Vec3::new(0.0, 3.0, 0.0);
        rb.gravity_scale = 0.0;
        let entity = world.spawn((Transform::identity(), rb));

        step(&mut world, 0.1);

        let transform = world.get::<&Transform>(entity).unwrap();
        assert!(transform.rotation.angle_between(Quat::IDENTITY) > 0.1);
    }
}
