//! Transform hierarchy propagation.

use glam::Mat4;

use crate::ecs::components::transform::{Children, GlobalTransform, Parent, Transform};

/// Refresh every `GlobalTransform` from the Parent/Children hierarchy.
///
/// Roots (no `Parent`) take their local matrix; children compose onto their
/// parent's world matrix, depth first.
pub fn transform_system(world: &mut hecs::World) {
    let mut stack: Vec<(hecs::Entity, Mat4)> = world
        .query_mut::<hecs::Without<(&Transform, &mut GlobalTransform), &Parent>>()
        .into_iter()
        .map(|(entity, (transform, global))| {
            global.0 = transform.to_matrix();
            (entity, global.0)
        })
        .collect();

    while let Some((parent, parent_global)) = stack.pop() {
        let children = match world.get::<&Children>(parent) {
            Ok(c) => c.0.clone(),
            Err(_) => continue,
        };

        for child in children {
            let child_global = match world.get::<&Transform>(child) {
                Ok(transform) => parent_global * transform.to_matrix(),
                Err(_) => parent_global,
            };
            if let Ok(mut global) = world.get::<&mut GlobalTransform>(child) {
                global.0 = child_global;
            }
            stack.push((child, child_global));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};

    #[test]
    fn test_root_global_matches_local() {
        let mut world = hecs::World::new();
        let e = world.spawn((
            Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
            GlobalTransform::default(),
        ));
        transform_system(&mut world);
        let global = world.get::<&GlobalTransform>(e).unwrap();
        assert_eq!(global.translation(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_grandchild_composes_rotation() {
        let mut world = hecs::World::new();
        let root = world.spawn((
            Transform::from_position(Vec3::X * 10.0)
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
            GlobalTransform::default(),
        ));
        let child = world.spawn((
            Transform::from_position(Vec3::X),
            GlobalTransform::default(),
            Parent(root),
        ));
        let grandchild = world.spawn((
            Transform::from_position(Vec3::X),
            GlobalTransform::default(),
            Parent(child),
        ));
        world.insert_one(root, Children(vec![child])).unwrap();
        world.insert_one(child, Children(vec![grandchild])).unwrap();

        transform_system(&mut world);

        // +X in the root frame is -Z in world space.
        let p = world.get::<&GlobalTransform>(grandchild).unwrap().translation();
        assert!((p - Vec3::new(10.0, 0.0, -2.0)).length() < 1e-5, "p = {p}");
    }
}
