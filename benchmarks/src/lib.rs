//! Shared setup for the breachfire benchmarks.

use breachfire::{
    DestructibleObject, Energy, PhysicsProfile, PrimitiveBuilder, RoomLayout,
    RoomLayoutGenerator, RoomSpec, SideSpec, Span, Stage, SurfaceDesc, WallSide,
};
use glam::Vec3;

/// A square room whose four sides each carry `doors` doors and as many windows.
///
/// Openings alternate along the run with a gap between each, and the run
/// grows with the opening count.
pub fn busy_room(doors: usize) -> RoomSpec {
    let pitch = 12.0;
    let length = pitch * (doors.max(1) * 2) as f32;
    let mut room = RoomSpec::new(Vec3::ZERO, Vec3::new(length, 8.0, length));
    for side in WallSide::ALL {
        let mut spec = SideSpec::new("brick");
        for i in 0..doors {
            spec = spec
                .with_door(1.0 + pitch * (2 * i) as f32)
                .with_window(1.0 + pitch * (2 * i + 1) as f32);
        }
        room = room.with_side(side, spec);
    }
    room
}

/// Busy intervals for a run of `n` evenly spaced openings.
pub fn busy_spans(n: usize) -> (Span, Vec<Span>) {
    let run = Span::new(0.0, 10.0 * n.max(1) as f32);
    // Reverse order so the sort does real work.
    let busy = (0..n)
        .rev()
        .map(|i| Span::new(10.0 * i as f32 + 2.0, 10.0 * i as f32 + 7.0))
        .collect();
    (run, busy)
}

/// A room plus a grid of `n` crates, each wrapped as a destructible target.
pub fn crate_field(n: usize) -> anyhow::Result<(Stage, RoomLayout, Vec<DestructibleObject>)> {
    let mut stage = Stage::default();
    let layout = RoomLayoutGenerator::default().build_room(&mut stage, &RoomSpec::default())?;
    let mut targets = Vec::with_capacity(n);
    let side = (n as f32).sqrt().ceil().max(1.0) as usize;
    for i in 0..n {
        let model = stage.create_model(format!("crate {i}"));
        let position = Vec3::new(
            2.0 + 16.0 * (i % side) as f32 / side as f32,
            0.5,
            2.0 + 16.0 * (i / side) as f32 / side as f32,
        );
        PrimitiveBuilder::new(&mut stage, model).create_box(
            Vec3::splat(0.8),
            &SurfaceDesc::new(position, "crate").with_profile(PhysicsProfile::LIGHT_WOOD),
        )?;
        targets.push(DestructibleObject::new(model, Energy::Finite(10)));
    }
    Ok((stage, layout, targets))
}
