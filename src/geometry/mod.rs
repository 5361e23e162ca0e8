//! Primitive construction: anchors, UV tiling, and the surface builder.

pub mod primitives;
pub mod uv;

pub use primitives::{spawn_decal, PrimitiveBuilder, SurfaceDesc};
pub use uv::{box_face_uvs, BoxFace, FaceUv};

use glam::Vec3;

/// Rule mapping a supplied position to the placement pivot of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "descriptors", derive(serde::Deserialize))]
#[cfg_attr(feature = "descriptors", serde(rename_all = "snake_case"))]
pub enum Anchor {
    /// Position is the minimum corner.
    LowestXyz,
    /// Position is the geometric centre.
    #[default]
    CenterXyz,
    /// Centred horizontally, bottom face at the given Y.
    CenterXzLowestY,
}

impl Anchor {
    /// Offset from the pivot to the shape centre for a shape of `extent`.
    ///
    /// Rotation is applied about the pivot, so a box anchored at its lowest
    /// corner swings around that corner.
    pub fn center_offset(self, extent: Vec3) -> Vec3 {
        match self {
            Anchor::LowestXyz => extent * 0.5,
            Anchor::CenterXyz => Vec3::ZERO,
            Anchor::CenterXzLowestY => Vec3::new(0.0, extent.y * 0.5, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_offsets() {
        let extent = Vec3::new(4.0, 2.0, 1.0);
        assert_eq!(Anchor::LowestXyz.center_offset(extent), Vec3::new(2.0, 1.0, 0.5));
        assert_eq!(Anchor::CenterXyz.center_offset(extent), Vec3::ZERO);
        assert_eq!(
            Anchor::CenterXzLowestY.center_offset(extent),
            Vec3::new(0.0, 1.0, 0.0)
        );
    }
}
