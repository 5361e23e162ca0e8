//! The stage: entity storage, model registry, hierarchy and lifecycle.

use std::collections::{BTreeMap, HashSet};

use glam::{Mat4, Vec3};

use crate::ecs::components::physics::{Collider, RigidBody, RigidBodyType};
use crate::ecs::components::surface::{CompoundChild, CompoundRoot, Surface};
use crate::ecs::components::transform::{Children, GlobalTransform, Parent, Transform};
use crate::ecs::systems::transform_system;
use crate::error::{BreachError, Result};
use crate::material::MaterialLibrary;
use crate::physics::profile::PhysicsProfile;
use crate::physics::{PhysicsConfig, PhysicsWorld};

use super::model::{CompositeModel, ModelId};
use super::SceneRenderer;

/// Guard against malformed parent chains.
const MAX_HIERARCHY_DEPTH: usize = 32;

/// Scene container owning every surface entity and the models that group them.
///
/// Passed explicitly to every component that builds or mutates geometry.
pub struct Stage {
    world: hecs::World,
    physics: PhysicsWorld,
    materials: MaterialLibrary,
    models: BTreeMap<ModelId, CompositeModel>,
    next_model: u32,
}

impl Stage {
    pub fn new(materials: MaterialLibrary, physics: PhysicsConfig) -> Self {
        Self {
            world: hecs::World::new(),
            physics: PhysicsWorld::new(physics),
            materials,
            models: BTreeMap::new(),
            next_model: 0,
        }
    }

    pub fn world(&self) -> &hecs::World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut hecs::World {
        &mut self.world
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    /// Register an empty model.
    pub fn create_model(&mut self, name: impl Into<String>) -> ModelId {
        let id = ModelId(self.next_model);
        self.next_model += 1;
        let model = CompositeModel::new(name);
        tracing::trace!(?id, name = model.name(), "model created");
        self.models.insert(id, model);
        id
    }

    pub fn model(&self, id: ModelId) -> Option<&CompositeModel> {
        self.models.get(&id)
    }

    /// Registered models in creation order.
    pub fn models(&self) -> impl Iterator<Item = (ModelId, &CompositeModel)> {
        self.models.iter().map(|(id, model)| (*id, model))
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub(crate) fn register_surface(&mut self, id: ModelId, entity: hecs::Entity) -> Result<()> {
        let model = self
            .models
            .get_mut(&id)
            .ok_or(BreachError::UnknownModel(id))?;
        model.push(entity);
        Ok(())
    }

    /// World matrix of an entity's pivot, composed through its parents.
    ///
    /// Reads local transforms directly, so it is valid between propagations.
    pub fn local_to_world(&self, entity: hecs::Entity) -> Option<Mat4> {
        let mut matrix = self.world.get::<&Transform>(entity).ok()?.to_matrix();
        let mut current = entity;
        for _ in 0..MAX_HIERARCHY_DEPTH {
            let parent = match self.world.get::<&Parent>(current) {
                Ok(parent) => parent.0,
                Err(_) => return Some(matrix),
            };
            matrix = self.world.get::<&Transform>(parent).ok()?.to_matrix() * matrix;
            current = parent;
        }
        tracing::warn!(?entity, "transform hierarchy deeper than {MAX_HIERARCHY_DEPTH}");
        Some(matrix)
    }

    /// World matrix of a surface's geometric centre.
    pub fn surface_to_world(&self, entity: hecs::Entity) -> Option<Mat4> {
        let offset = self.world.get::<&Surface>(entity).ok()?.center_offset;
        Some(self.local_to_world(entity)? * Mat4::from_translation(offset))
    }

    /// Refresh every `GlobalTransform` from the Parent/Children hierarchy.
    pub fn propagate_transforms(&mut self) {
        transform_system(&mut self.world);
    }

    /// Advance loose bodies by `delta_time` seconds and refresh transforms.
    pub fn step(&mut self, delta_time: f64) -> u32 {
        let substeps = self.physics.step(&mut self.world, delta_time);
        self.propagate_transforms();
        substeps
    }

    pub(crate) fn attach_child(&mut self, parent: hecs::Entity, child: hecs::Entity) {
        if let Err(err) = self.world.insert_one(child, Parent(parent)) {
            tracing::warn!(?child, %err, "cannot parent missing entity");
            return;
        }
        if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
            children.0.push(child);
            return;
        }
        if let Err(err) = self.world.insert_one(parent, Children(vec![child])) {
            tracing::warn!(?parent, %err, "cannot attach child to missing parent");
        }
    }

    fn detach_child(&mut self, parent: hecs::Entity, child: hecs::Entity) {
        if let Ok(mut children) = self.world.get::<&mut Children>(parent) {
            children.0.retain(|&c| c != child);
        }
        if let Err(err) = self.world.remove_one::<Parent>(child) {
            tracing::warn!(?child, %err, "cannot unparent child");
        }
    }

    /// Every entity below `entity` in the hierarchy, excluding itself.
    fn descendants(&self, entity: hecs::Entity) -> Vec<hecs::Entity> {
        let mut out = Vec::new();
        let mut stack = vec![entity];
        while let Some(current) = stack.pop() {
            if let Ok(children) = self.world.get::<&Children>(current) {
                out.extend(children.0.iter().copied());
                stack.extend(children.0.iter().copied());
            }
        }
        out
    }

    /// Show or hide a model together with its decals.
    pub fn set_model_visible(&mut self, id: ModelId, visible: bool) -> Result<()> {
        let model = self.models.get(&id).ok_or(BreachError::UnknownModel(id))?;
        let mut targets = Vec::new();
        for &surface in model.surfaces() {
            targets.push(surface);
            targets.extend(self.descendants(surface));
        }
        for entity in targets {
            if let Ok(mut surface) = self.world.get::<&mut Surface>(entity) {
                surface.visible = visible;
            }
        }
        Ok(())
    }

    /// Despawn a model, its compound root, and every decal hanging off it.
    ///
    /// Returns the number of entities removed.
    pub fn dispose_model(&mut self, id: ModelId) -> Result<usize> {
        let model = self
            .models
            .remove(&id)
            .ok_or(BreachError::UnknownModel(id))?;

        let mut doomed: HashSet<hecs::Entity> = HashSet::new();
        for &surface in model.surfaces() {
            doomed.insert(surface);
            doomed.extend(self.descendants(surface));
        }
        if let Some(root) = model.compound_root() {
            doomed.insert(root);
            doomed.extend(self.descendants(root));
        }

        let removed = doomed
            .into_iter()
            .filter(|&entity| self.world.despawn(entity).is_ok())
            .count();
        tracing::debug!(?id, name = model.name(), removed, "model disposed");
        Ok(removed)
    }

    /// Group every surface of a model under a compound root.
    ///
    /// Member bodies merge into one body on the root: static if all members
    /// were static, dynamic with the summed mass otherwise. Members keep
    /// their colliders so they can be shot off later.
    pub fn make_compound(&mut self, id: ModelId) -> Result<hecs::Entity> {
        let model = self.models.get(&id).ok_or(BreachError::UnknownModel(id))?;
        if let Some(root) = model.compound_root() {
            return Ok(root);
        }

        let members: Vec<(hecs::Entity, Mat4)> = model
            .surfaces()
            .iter()
            .filter(|&&e| !self.world.satisfies::<&Parent>(e).unwrap_or(true))
            .filter_map(|&e| self.local_to_world(e).map(|m| (e, m)))
            .collect();

        let centroid = if members.is_empty() {
            Vec3::ZERO
        } else {
            members.iter().map(|(_, m)| m.w_axis.truncate()).sum::<Vec3>() / members.len() as f32
        };

        let mut total_mass = 0.0;
        let mut any_dynamic = false;
        let mut friction = None;
        let mut restitution = None;
        for (entity, _) in &members {
            if let Ok(body) = self.world.remove_one::<RigidBody>(*entity) {
                total_mass += body.mass;
                any_dynamic |= body.body_type == RigidBodyType::Dynamic;
                friction.get_or_insert(body.friction);
                restitution.get_or_insert(body.restitution);
            }
        }
        let mut root_body = if any_dynamic && total_mass > 0.0 {
            // Unit-sphere style approximation of the assembly's inertia.
            RigidBody::new_dynamic(total_mass, Vec3::splat(total_mass))
        } else {
            RigidBody::new_static()
        };
        if let Some(friction) = friction {
            root_body.friction = friction;
        }
        if let Some(restitution) = restitution {
            root_body.restitution = restitution;
        }

        let root_matrix = Mat4::from_translation(centroid);
        let root = self.world.spawn((
            Transform::from_position(centroid),
            GlobalTransform(root_matrix),
            CompoundRoot,
            root_body,
            Children(Vec::with_capacity(members.len())),
        ));

        let inv_root = root_matrix.inverse();
        for (entity, world) in &members {
            if let Ok(mut transform) = self.world.get::<&mut Transform>(*entity) {
                *transform = Transform::from_matrix(inv_root * *world);
            }
            self.attach_child(root, *entity);
            if let Err(err) = self.world.insert_one(*entity, CompoundChild(root)) {
                tracing::warn!(?entity, %err, "cannot mark compound member");
            }
        }

        if let Some(model) = self.models.get_mut(&id) {
            model.set_compound_root(Some(root));
        }
        tracing::debug!(?id, members = members.len(), total_mass, "compound assembled");
        Ok(root)
    }

    /// Shoot a member off its compound, turning it into an independent body.
    ///
    /// The member keeps its world placement. It receives a body from
    /// `profile` if it has a collider. Returns `false` if `entity` is not a
    /// compound member.
    pub fn detach_from_compound(&mut self, entity: hecs::Entity, profile: &PhysicsProfile) -> bool {
        let root = match self.world.get::<&CompoundChild>(entity) {
            Ok(member) => member.0,
            Err(_) => return false,
        };
        let Some(world) = self.local_to_world(entity) else {
            return false;
        };

        self.detach_child(root, entity);
        if let Err(err) = self.world.remove_one::<CompoundChild>(entity) {
            tracing::warn!(?entity, %err, "cannot unmark compound member");
        }
        if let Ok(mut transform) = self.world.get::<&mut Transform>(entity) {
            *transform = Transform::from_matrix(world);
        }
        if let Ok(mut global) = self.world.get::<&mut GlobalTransform>(entity) {
            global.0 = world;
        }

        let body = self
            .world
            .get::<&Collider>(entity)
            .ok()
            .and_then(|collider| RigidBody::from_profile(profile, &collider.shape));
        if let Some(body) = body {
            if let Ok(mut root_body) = self.world.get::<&mut RigidBody>(root) {
                if root_body.body_type == RigidBodyType::Dynamic {
                    root_body.mass = (root_body.mass - body.mass).max(0.0);
                }
            }
            if let Err(err) = self.world.insert_one(entity, body) {
                tracing::warn!(?entity, %err, "cannot give detached member a body");
            }
        }
        tracing::debug!(?entity, ?root, "member detached from compound");
        true
    }

    /// Tear a model's compound down: detach every member and remove the root.
    ///
    /// Returns the detached members.
    pub fn dissolve_compound(&mut self, id: ModelId, profile: &PhysicsProfile) -> Vec<hecs::Entity> {
        let Some(root) = self.models.get(&id).and_then(|m| m.compound_root()) else {
            return Vec::new();
        };
        let members = self
            .world
            .get::<&Children>(root)
            .map(|c| c.0.clone())
            .unwrap_or_default();

        let detached: Vec<hecs::Entity> = members
            .into_iter()
            .filter(|&member| self.detach_from_compound(member, profile))
            .collect();

        if let Err(err) = self.world.despawn(root) {
            tracing::warn!(?root, %err, "compound root already gone");
        }
        if let Some(model) = self.models.get_mut(&id) {
            model.set_compound_root(None);
        }
        tracing::debug!(?id, detached = detached.len(), "compound dissolved");
        detached
    }

    /// Convert every static body of a model into a dynamic one so it falls.
    ///
    /// Masses come from `profile`'s density and each collider's volume.
    /// Returns the number of converted bodies.
    pub fn release_static_bodies(&mut self, id: ModelId, profile: &PhysicsProfile) -> Result<usize> {
        let model = self.models.get(&id).ok_or(BreachError::UnknownModel(id))?;
        let mut released = 0;
        for &entity in model.surfaces() {
            let Ok((body, collider)) = self
                .world
                .query_one_mut::<(&mut RigidBody, &Collider)>(entity)
            else {
                continue;
            };
            if body.body_type != RigidBodyType::Static {
                continue;
            }
            let mass = profile
                .derive_impostor_params(collider.shape.volume())
                .map_or(0.0, |params| params.mass);
            if mass > 0.0 {
                body.make_dynamic(mass, collider.shape.inertia(mass));
                released += 1;
            }
        }
        Ok(released)
    }

    /// Draw every visible surface of every model.
    pub fn render(&mut self, renderer: &mut dyn SceneRenderer) -> usize {
        self.propagate_transforms();
        let mut drawn = 0;
        for &id in self.models.keys() {
            drawn += self.draw_model(id, renderer).unwrap_or(0);
        }
        drawn
    }

    /// Draw one model's visible surfaces and decals.
    pub fn render_model(&mut self, id: ModelId, renderer: &mut dyn SceneRenderer) -> Result<usize> {
        self.propagate_transforms();
        self.draw_model(id, renderer)
    }

    fn draw_model(&self, id: ModelId, renderer: &mut dyn SceneRenderer) -> Result<usize> {
        let model = self.models.get(&id).ok_or(BreachError::UnknownModel(id))?;
        let mut drawn = 0;
        for &surface in model.surfaces() {
            let mut stack = vec![surface];
            while let Some(entity) = stack.pop() {
                if let (Ok(s), Ok(global)) = (
                    self.world.get::<&Surface>(entity),
                    self.world.get::<&GlobalTransform>(entity),
                ) {
                    if s.visible {
                        let matrix = global.0 * Mat4::from_translation(s.center_offset);
                        renderer.draw_surface(entity, &s, matrix);
                        drawn += 1;
                    }
                }
                if let Ok(children) = self.world.get::<&Children>(entity) {
                    stack.extend(children.0.iter().copied());
                }
            }
        }
        Ok(drawn)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new(MaterialLibrary::default(), PhysicsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::physics::ColliderShape;
    use crate::ecs::components::surface::SurfaceShape;

    fn spawn_box(stage: &mut Stage, id: ModelId, position: Vec3, body: Option<RigidBody>) -> hecs::Entity {
        let surface = Surface::new(SurfaceShape::Box { size: Vec3::ONE }, "crate".into());
        let transform = Transform::from_position(position);
        let entity = stage.world_mut().spawn((
            transform,
            GlobalTransform(transform.to_matrix()),
            surface,
            Collider {
                shape: ColliderShape::Box {
                    half_extents: Vec3::splat(0.5),
                },
            },
        ));
        if let Some(body) = body {
            stage.world_mut().insert_one(entity, body).unwrap();
        }
        stage.register_surface(id, entity).unwrap();
        entity
    }

    #[derive(Default)]
    struct CountingRenderer {
        drawn: Vec<hecs::Entity>,
    }

    impl SceneRenderer for CountingRenderer {
        fn draw_surface(&mut self, entity: hecs::Entity, _surface: &Surface, _world: Mat4) {
            self.drawn.push(entity);
        }
    }

    #[test]
    fn test_models_in_creation_order() {
        let mut stage = Stage::default();
        let a = stage.create_model("a");
        let b = stage.create_model("b");
        let names: Vec<&str> = stage.models().map(|(_, m)| m.name()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(a < b);
    }

    #[test]
    fn test_register_unknown_model() {
        let mut stage = Stage::default();
        let id = stage.create_model("gone");
        stage.dispose_model(id).unwrap();
        let entity = stage.world_mut().spawn((Transform::identity(),));
        assert!(matches!(
            stage.register_surface(id, entity),
            Err(BreachError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_child_world_transform() {
        let mut stage = Stage::default();
        let parent = stage
            .world_mut()
            .spawn((Transform::from_position(Vec3::X), GlobalTransform::default()));
        let child = stage
            .world_mut()
            .spawn((Transform::from_position(Vec3::Y * 2.0), GlobalTransform::default()));
        stage.attach_child(parent, child);

        let expected = Vec3::new(1.0, 2.0, 0.0);
        let direct = stage.local_to_world(child).unwrap().transform_point3(Vec3::ZERO);
        assert!((direct - expected).length() < 1e-5);

        stage.propagate_transforms();
        let global = stage.world().get::<&GlobalTransform>(child).unwrap().translation();
        assert!((global - expected).length() < 1e-5);
    }

    #[test]
    fn test_dispose_removes_descendants() {
        let mut stage = Stage::default();
        let id = stage.create_model("crate");
        let host = spawn_box(&mut stage, id, Vec3::ZERO, None);
        let decal = stage.world_mut().spawn((Transform::identity(), GlobalTransform::default()));
        stage.attach_child(host, decal);

        assert_eq!(stage.dispose_model(id).unwrap(), 2);
        assert!(!stage.world().contains(host));
        assert!(!stage.world().contains(decal));
        assert!(stage.model(id).is_none());
        assert!(stage.dispose_model(id).is_err());
    }

    #[test]
    fn test_visibility_and_render() {
        let mut stage = Stage::default();
        let id = stage.create_model("pair");
        spawn_box(&mut stage, id, Vec3::ZERO, None);
        spawn_box(&mut stage, id, Vec3::X * 2.0, None);

        let mut renderer = CountingRenderer::default();
        assert_eq!(stage.render(&mut renderer), 2);

        stage.set_model_visible(id, false).unwrap();
        let mut renderer = CountingRenderer::default();
        assert_eq!(stage.render_model(id, &mut renderer).unwrap(), 0);
        assert!(renderer.drawn.is_empty());
    }

    #[test]
    fn test_compound_preserves_world_placement() {
        let mut stage = Stage::default();
        let id = stage.create_model("stack");
        let a = spawn_box(&mut stage, id, Vec3::new(0.0, 0.0, 0.0), Some(RigidBody::new_static()));
        let b = spawn_box(&mut stage, id, Vec3::new(0.0, 1.0, 0.0), Some(RigidBody::new_static()));

        let root = stage.make_compound(id).unwrap();
        assert_eq!(stage.model(id).unwrap().compound_root(), Some(root));
        assert!(stage.world().get::<&RigidBody>(a).is_err(), "member body merged into root");

        let b_world = stage.local_to_world(b).unwrap().transform_point3(Vec3::ZERO);
        assert!((b_world - Vec3::Y).length() < 1e-5);
        // Idempotent.
        assert_eq!(stage.make_compound(id).unwrap(), root);
    }

    #[test]
    fn test_detach_and_dissolve() {
        let mut stage = Stage::default();
        let id = stage.create_model("stack");
        let a = spawn_box(&mut stage, id, Vec3::ZERO, Some(RigidBody::new_static()));
        let b = spawn_box(&mut stage, id, Vec3::Y, Some(RigidBody::new_static()));
        let c = spawn_box(&mut stage, id, Vec3::Y * 2.0, Some(RigidBody::new_static()));
        let root = stage.make_compound(id).unwrap();

        assert!(stage.detach_from_compound(c, &PhysicsProfile::LIGHT_WOOD));
        assert!(!stage.detach_from_compound(c, &PhysicsProfile::LIGHT_WOOD));
        let body = stage.world().get::<&RigidBody>(c).unwrap();
        assert_eq!(body.body_type, RigidBodyType::Dynamic);
        assert!((body.mass - PhysicsProfile::LIGHT_WOOD.density).abs() < 1e-5);
        drop(body);
        let c_world = stage.local_to_world(c).unwrap().transform_point3(Vec3::ZERO);
        assert!((c_world - Vec3::Y * 2.0).length() < 1e-5);

        let detached = stage.dissolve_compound(id, &PhysicsProfile::LIGHT_WOOD);
        assert_eq!(detached.len(), 2);
        assert!(detached.contains(&a) && detached.contains(&b));
        assert!(!stage.world().contains(root));
        assert!(stage.model(id).unwrap().compound_root().is_none());
    }

    #[test]
    fn test_release_static_bodies() {
        let mut stage = Stage::default();
        let id = stage.create_model("shelf");
        let e = spawn_box(&mut stage, id, Vec3::Y * 5.0, Some(RigidBody::new_static()));

        assert_eq!(stage.release_static_bodies(id, &PhysicsProfile::HEAVY_WOOD).unwrap(), 1);
        for _ in 0..30 {
            stage.step(1.0 / 60.0);
        }
        let y = stage.world().get::<&Transform>(e).unwrap().position.y;
        assert!(y < 5.0, "released body should fall: y = {y}");
    }
}
