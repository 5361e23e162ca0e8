//! Box face UV mapping.

use glam::Vec3;

use crate::material::UvTiling;

/// Box face order used by [`box_face_uvs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl BoxFace {
    pub const ALL: [BoxFace; 6] = [
        BoxFace::PosX,
        BoxFace::NegX,
        BoxFace::PosY,
        BoxFace::NegY,
        BoxFace::PosZ,
        BoxFace::NegZ,
    ];

    /// The two box dimensions spanning this face, as (u, v).
    pub fn in_plane(self, size: Vec3) -> (f32, f32) {
        match self {
            BoxFace::PosX | BoxFace::NegX => (size.z, size.y),
            BoxFace::PosY | BoxFace::NegY => (size.x, size.z),
            BoxFace::PosZ | BoxFace::NegZ => (size.x, size.y),
        }
    }
}

/// UV rectangle of one face: `(u0, v0)` to `(u1, v1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceUv {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl FaceUv {
    pub const UNIT: FaceUv = FaceUv {
        u0: 0.0,
        v0: 0.0,
        u1: 1.0,
        v1: 1.0,
    };

    /// Number of texture repeats along u and v.
    pub fn repeats(&self) -> (f32, f32) {
        (self.u1 - self.u0, self.v1 - self.v0)
    }
}

/// Compute the six face mappings of a box of the given size.
pub fn box_face_uvs(size: Vec3, tiling: UvTiling) -> [FaceUv; 6] {
    match tiling {
        UvTiling::AllToOne => [FaceUv::UNIT; 6],
        UvTiling::TiledBySize => BoxFace::ALL.map(|face| {
            let (u, v) = face.in_plane(size);
            FaceUv {
                u0: 0.0,
                v0: 0.0,
                u1: u,
                v1: v,
            }
        }),
    }
}
