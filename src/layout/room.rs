//! Room assembly: walls, door frames, window assemblies, floor and ceiling.

use glam::Vec3;

use super::spans::{collect_openings, free_spans, Opening, OpeningKind, Span};
use super::{RoomSpec, WallSide};
use crate::config::LayoutConfig;
use crate::ecs::components::transform::Transform;
use crate::error::{BreachError, Result};
use crate::geometry::{Anchor, PrimitiveBuilder, SurfaceDesc};
use crate::material::TextureId;
use crate::physics::profile::PhysicsProfile;
use crate::scene::{ModelId, Stage};

/// The three boxes filling a window opening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowParts {
    pub top_frame: hecs::Entity,
    pub glass: hecs::Entity,
    pub bottom_frame: hecs::Entity,
}

/// What was built for one wall side.
#[derive(Debug, Clone)]
pub struct SideLayout {
    pub side: WallSide,
    pub model: ModelId,
    /// Extent of the wall run in side-local offsets.
    pub run: Span,
    pub openings: Vec<Opening>,
    pub free_spans: Vec<Span>,
    /// One solid wall box per free span, in span order.
    pub walls: Vec<hecs::Entity>,
    pub door_frames: Vec<hecs::Entity>,
    pub windows: Vec<WindowParts>,
}

/// Models produced for one room.
#[derive(Debug, Clone)]
pub struct RoomLayout {
    pub sides: Vec<SideLayout>,
    pub floor: ModelId,
    pub ceiling: ModelId,
}

impl RoomLayout {
    pub fn side(&self, side: WallSide) -> Option<&SideLayout> {
        self.sides.iter().find(|layout| layout.side == side)
    }

    /// Every model of the room: the four walls, then floor and ceiling.
    pub fn models(&self) -> Vec<ModelId> {
        self.sides
            .iter()
            .map(|side| side.model)
            .chain([self.floor, self.ceiling])
            .collect()
    }
}

/// Openings and spans of a side, computed before anything is spawned.
struct SidePlan {
    side: WallSide,
    run: Span,
    openings: Vec<Opening>,
    free_spans: Vec<Span>,
}

/// Builds rooms from [`RoomSpec`] descriptors.
#[derive(Debug, Clone, Default)]
pub struct RoomLayoutGenerator {
    config: LayoutConfig,
}

impl RoomLayoutGenerator {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Build every wall, the floor and the ceiling of `room` into `stage`.
    ///
    /// All inputs are validated before the first surface is spawned, so a
    /// rejected room leaves the stage untouched.
    pub fn build_room(&self, stage: &mut Stage, room: &RoomSpec) -> Result<RoomLayout> {
        self.validate_dimensions(room)?;
        let plans = WallSide::ALL
            .iter()
            .map(|&side| self.plan_side(room, side))
            .collect::<Result<Vec<_>>>()?;
        self.validate_heights(room, &plans)?;

        let mut sides = Vec::with_capacity(plans.len());
        for plan in plans {
            sides.push(self.build_side(stage, room, plan)?);
        }

        let footprint = Vec3::new(room.size.x, self.config.floor_thickness, room.size.z);
        let floor = self.build_slab(
            stage,
            room,
            "floor",
            Vec3::new(0.0, -self.config.floor_thickness, 0.0),
            footprint,
            &room.floor_texture,
        )?;
        let ceiling = self.build_slab(
            stage,
            room,
            "ceiling",
            Vec3::new(0.0, room.size.y, 0.0),
            footprint,
            &room.ceiling_texture,
        )?;

        tracing::info!(
            origin = ?room.origin,
            size = ?room.size,
            rotation = room.rotation,
            "room built"
        );
        Ok(RoomLayout {
            sides,
            floor,
            ceiling,
        })
    }

    fn validate_dimensions(&self, room: &RoomSpec) -> Result<()> {
        let config = &self.config;
        let t = config.wall_thickness;
        let positive = room.size.cmpgt(Vec3::ZERO).all() && room.size.is_finite();
        if !positive || room.size.z <= 2.0 * t || !is_positive(t) || !is_positive(config.floor_thickness) {
            return Err(BreachError::InvalidDimensions {
                shape: "room",
                dims: room.size,
            });
        }

        if !is_positive(config.door_width) || !is_positive(config.door_frame_height) {
            return Err(BreachError::InvalidDimensions {
                shape: "door",
                dims: Vec3::new(config.door_width, config.door_frame_height, t),
            });
        }
        let window = [
            config.window_width,
            config.window_height,
            config.window_top_frame_height,
        ];
        if !window.into_iter().all(is_positive) {
            return Err(BreachError::InvalidDimensions {
                shape: "window",
                dims: Vec3::from(window),
            });
        }
        Ok(())
    }

    /// Wall height checks, against the openings that survived clipping.
    fn validate_heights(&self, room: &RoomSpec, plans: &[SidePlan]) -> Result<()> {
        let wall_height = room.size.y;
        let openings = || plans.iter().flat_map(|plan| plan.openings.iter());

        let has_doors = openings().any(|o| o.kind == OpeningKind::Door);
        if has_doors && wall_height <= self.config.door_frame_height {
            return Err(BreachError::WallTooShort {
                wall_height,
                required: self.config.door_frame_height,
            });
        }
        let has_windows = openings().any(|o| o.kind == OpeningKind::Window);
        let window_stack = self.config.window_height + self.config.window_top_frame_height;
        if has_windows && wall_height <= window_stack {
            return Err(BreachError::WallTooShort {
                wall_height,
                required: window_stack,
            });
        }
        Ok(())
    }

    fn run_of(&self, room: &RoomSpec, side: WallSide) -> Span {
        if side.runs_along_x() {
            Span::new(0.0, room.size.x)
        } else {
            let t = self.config.wall_thickness;
            Span::new(t, room.size.z - t)
        }
    }

    fn plan_side(&self, room: &RoomSpec, side: WallSide) -> Result<SidePlan> {
        let run = self.run_of(room, side);
        let spec = room.side(side);
        let openings = collect_openings(side, run, &spec.doors, &spec.windows, &self.config);
        let busy: Vec<Span> = openings.iter().map(|o| o.span).collect();
        let free_spans = free_spans(side, run, &busy)?;
        Ok(SidePlan {
            side,
            run,
            openings,
            free_spans,
        })
    }

    /// Minimum corner and size of a box on `side` covering `span` along the
    /// run and `[bottom, bottom + height]` vertically, before room rotation.
    fn side_box(&self, room: &RoomSpec, side: WallSide, span: Span, bottom: f32, height: f32) -> (Vec3, Vec3) {
        let t = self.config.wall_thickness;
        let len = span.length();
        let (corner, size) = match side {
            WallSide::Front => (Vec3::new(span.start, bottom, 0.0), Vec3::new(len, height, t)),
            WallSide::Back => (
                Vec3::new(span.start, bottom, room.size.z - t),
                Vec3::new(len, height, t),
            ),
            WallSide::Left => (Vec3::new(0.0, bottom, span.start), Vec3::new(t, height, len)),
            WallSide::Right => (
                Vec3::new(room.size.x - t, bottom, span.start),
                Vec3::new(t, height, len),
            ),
        };
        (room.origin + corner, size)
    }

    fn place(&self, room: &RoomSpec, corner: Vec3, texture: &TextureId) -> SurfaceDesc {
        let placed = Transform::from_position(corner).rotated_about(room.pivot(), room.yaw());
        SurfaceDesc::new(placed.position, texture.clone())
            .with_anchor(Anchor::LowestXyz)
            .with_rotation(placed.rotation)
    }

    fn build_side(&self, stage: &mut Stage, room: &RoomSpec, plan: SidePlan) -> Result<SideLayout> {
        let side = plan.side;
        let texture = &room.side(side).texture;
        let wall_height = room.size.y;
        let model = stage.create_model(format!("{side} wall"));
        let mut builder = PrimitiveBuilder::new(stage, model);

        let mut walls = Vec::with_capacity(plan.free_spans.len());
        for &span in &plan.free_spans {
            let (corner, size) = self.side_box(room, side, span, 0.0, wall_height);
            walls.push(builder.create_box(size, &self.place(room, corner, texture))?);
        }

        let mut door_frames = Vec::new();
        let mut windows = Vec::new();
        for opening in &plan.openings {
            match opening.kind {
                OpeningKind::Door => {
                    let frame_height = self.config.door_frame_height;
                    let (corner, size) =
                        self.side_box(room, side, opening.span, wall_height - frame_height, frame_height);
                    door_frames.push(builder.create_box(size, &self.place(room, corner, texture))?);
                }
                OpeningKind::Window => {
                    windows.push(self.build_window(&mut builder, room, side, opening.span)?);
                }
            }
        }

        tracing::debug!(
            %side,
            walls = walls.len(),
            doors = door_frames.len(),
            windows = windows.len(),
            "wall side laid out"
        );
        Ok(SideLayout {
            side,
            model,
            run: plan.run,
            openings: plan.openings,
            free_spans: plan.free_spans,
            walls,
            door_frames,
            windows,
        })
    }

    fn build_window(
        &self,
        builder: &mut PrimitiveBuilder<'_>,
        room: &RoomSpec,
        side: WallSide,
        span: Span,
    ) -> Result<WindowParts> {
        let texture = &room.side(side).texture;
        let wall_height = room.size.y;
        let top_height = self.config.window_top_frame_height;
        let glass_height = self.config.window_height;
        let bottom_height = wall_height - glass_height - top_height;

        let (corner, size) = self.side_box(room, side, span, wall_height - top_height, top_height);
        let top_frame = builder.create_box(size, &self.place(room, corner, texture))?;

        let (corner, size) = self.side_box(room, side, span, bottom_height, glass_height);
        let glass_desc = self
            .place(room, corner, &room.glass_texture)
            .with_profile(PhysicsProfile::GLASS)
            .with_opacity(self.config.glass_opacity);
        let glass = builder.create_box(size, &glass_desc)?;

        let (corner, size) = self.side_box(room, side, span, 0.0, bottom_height);
        let bottom_frame = builder.create_box(size, &self.place(room, corner, texture))?;

        Ok(WindowParts {
            top_frame,
            glass,
            bottom_frame,
        })
    }

    fn build_slab(
        &self,
        stage: &mut Stage,
        room: &RoomSpec,
        name: &str,
        local_corner: Vec3,
        size: Vec3,
        texture: &TextureId,
    ) -> Result<ModelId> {
        let model = stage.create_model(name);
        let desc = self
            .place(room, room.origin + local_corner, texture)
            .with_profile(PhysicsProfile::STATIC);
        PrimitiveBuilder::new(stage, model).create_box(size, &desc)?;
        Ok(model)
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
