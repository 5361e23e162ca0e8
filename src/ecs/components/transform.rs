//! Transform components for surfaces.

use glam::{Mat4, Quat, Vec3};

/// Local-space placement of a surface pivot.
///
/// Relative to the parent when the entity has a [`Parent`], world space otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Transform {
    /// Create an identity transform.
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    /// Create a transform from a position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Set the rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Convert to a 4x4 matrix (translation * rotation).
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Decompose a rigid matrix. Scale is discarded.
    pub fn from_matrix(mat: Mat4) -> Self {
        let (_, rotation, position) = mat.to_scale_rotation_translation();
        Self { position, rotation }
    }

    /// Rotate this transform about a world-space pivot.
    ///
    /// Both the position and the orientation are rotated, so a group of
    /// transforms rotated about the same pivot keeps its relative layout.
    pub fn rotated_about(&self, pivot: Vec3, rotation: Quat) -> Self {
        Self {
            position: pivot + rotation * (self.position - pivot),
            rotation: (rotation * self.rotation).normalize(),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// World-space transform matrix. Refreshed by `Stage::propagate_transforms`.
#[derive(Debug, Clone, Copy)]
pub struct GlobalTransform(pub Mat4);

impl GlobalTransform {
    /// World-space position of the entity's pivot.
    pub fn translation(&self) -> Vec3 {
        self.0.w_axis.truncate()
    }
}

impl Default for GlobalTransform {
    fn default() -> Self {
        Self(Mat4::IDENTITY)
    }
}

/// Reference to a parent entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub hecs::Entity);

/// List of child entities.
#[derive(Debug, Clone, Default)]
pub struct Children(pub Vec<hecs::Entity>);
