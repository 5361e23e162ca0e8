//! Procedural room layout from declarative room descriptors.
//!
//! A [`RoomSpec`] describes a rectangular footprint and, per wall side, the
//! offsets of its doors and windows. [`RoomLayoutGenerator`] subtracts the
//! openings from each wall run ([`spans`]) and emits wall segments, door
//! frames, window assemblies, a floor and a ceiling into the stage.

pub mod room;
pub mod spans;

pub use room::{RoomLayout, RoomLayoutGenerator, SideLayout, WindowParts};
pub use spans::{Opening, OpeningKind, Span};

use std::fmt;

use glam::{Quat, Vec3};

use crate::material::TextureId;

/// One of the four walls of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "descriptors", derive(serde::Deserialize))]
#[cfg_attr(feature = "descriptors", serde(rename_all = "snake_case"))]
pub enum WallSide {
    /// Runs +X along z = 0.
    Front,
    /// Runs +Z along the far x edge.
    Right,
    /// Runs +X along the far z edge.
    Back,
    /// Runs +Z along x = 0.
    Left,
}

impl WallSide {
    pub const ALL: [WallSide; 4] = [WallSide::Front, WallSide::Right, WallSide::Back, WallSide::Left];

    pub fn name(self) -> &'static str {
        match self {
            WallSide::Front => "front",
            WallSide::Right => "right",
            WallSide::Back => "back",
            WallSide::Left => "left",
        }
    }

    /// Whether the wall runs along the X axis.
    pub fn runs_along_x(self) -> bool {
        matches!(self, WallSide::Front | WallSide::Back)
    }
}

impl fmt::Display for WallSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Openings and texture of one wall side.
///
/// Offsets are measured from the side's local origin along its run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "descriptors", derive(serde::Deserialize))]
#[cfg_attr(feature = "descriptors", serde(default))]
pub struct SideSpec {
    pub doors: Vec<f32>,
    pub windows: Vec<f32>,
    pub texture: TextureId,
}

impl SideSpec {
    pub fn new(texture: impl Into<TextureId>) -> Self {
        Self {
            doors: Vec::new(),
            windows: Vec::new(),
            texture: texture.into(),
        }
    }

    pub fn with_door(mut self, offset: f32) -> Self {
        self.doors.push(offset);
        self
    }

    pub fn with_window(mut self, offset: f32) -> Self {
        self.windows.push(offset);
        self
    }
}

impl Default for SideSpec {
    fn default() -> Self {
        Self::new("wall")
    }
}

/// Declarative description of one rectangular room.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "descriptors", derive(serde::Deserialize))]
#[cfg_attr(feature = "descriptors", serde(default))]
pub struct RoomSpec {
    /// Minimum corner of the footprint at floor level.
    pub origin: Vec3,
    /// Length (x), wall height (y) and depth (z).
    pub size: Vec3,
    pub front: SideSpec,
    pub right: SideSpec,
    pub back: SideSpec,
    pub left: SideSpec,
    pub floor_texture: TextureId,
    pub ceiling_texture: TextureId,
    pub glass_texture: TextureId,
    /// Yaw in radians about the vertical axis through the footprint centre.
    pub rotation: f32,
}

impl RoomSpec {
    pub fn new(origin: Vec3, size: Vec3) -> Self {
        Self {
            origin,
            size,
            front: SideSpec::default(),
            right: SideSpec::default(),
            back: SideSpec::default(),
            left: SideSpec::default(),
            floor_texture: TextureId::from("floor"),
            ceiling_texture: TextureId::from("ceiling"),
            glass_texture: TextureId::from("glass"),
            rotation: 0.0,
        }
    }

    pub fn with_side(mut self, side: WallSide, spec: SideSpec) -> Self {
        *self.side_mut(side) = spec;
        self
    }

    pub fn with_rotation(mut self, yaw: f32) -> Self {
        self.rotation = yaw;
        self
    }

    pub fn side(&self, side: WallSide) -> &SideSpec {
        match side {
            WallSide::Front => &self.front,
            WallSide::Right => &self.right,
            WallSide::Back => &self.back,
            WallSide::Left => &self.left,
        }
    }

    pub fn side_mut(&mut self, side: WallSide) -> &mut SideSpec {
        match side {
            WallSide::Front => &mut self.front,
            WallSide::Right => &mut self.right,
            WallSide::Back => &mut self.back,
            WallSide::Left => &mut self.left,
        }
    }

    /// Point on the floor the room rotates about.
    pub fn pivot(&self) -> Vec3 {
        self.origin + Vec3::new(self.size.x * 0.5, 0.0, self.size.z * 0.5)
    }

    pub fn yaw(&self) -> Quat {
        Quat::from_rotation_y(self.rotation)
    }
}

impl Default for RoomSpec {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::new(20.0, 8.0, 20.0))
    }
}

#[cfg(feature = "descriptors")]
impl RoomSpec {
    /// Parse a room descriptor from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
