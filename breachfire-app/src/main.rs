use std::collections::BTreeMap;

use anyhow::Context;
use breachfire::{
    Anchor, DecalPlacer, DestructibleObject, Energy, HurtOutcome, MaterialLibrary,
    PhysicsConfig, PhysicsProfile, PrimitiveBuilder, Ray, RoomLayoutGenerator, RoomSpec,
    SceneRenderer, ShotResolver, Stage, Surface, SurfaceDesc, UvTiling,
};
use glam::{Mat4, Vec3};
use rand::Rng;

const DEFAULT_ROOM: &str = include_str!("../assets/room.json");
const VOLLEY: usize = 12;
const DAMAGE_PER_SHOT: u32 = 2;

/// Counts draw calls per texture instead of talking to a GPU.
#[derive(Default)]
struct DrawLog {
    per_texture: BTreeMap<String, usize>,
}

impl SceneRenderer for DrawLog {
    fn draw_surface(&mut self, _entity: hecs::Entity, surface: &Surface, _world: Mat4) {
        *self
            .per_texture
            .entry(surface.texture.to_string())
            .or_default() += 1;
    }
}

fn load_room() -> anyhow::Result<RoomSpec> {
    match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read room descriptor {path}"))?;
            RoomSpec::from_json(&json).with_context(|| format!("invalid room descriptor {path}"))
        }
        None => RoomSpec::from_json(DEFAULT_ROOM).context("invalid built-in room descriptor"),
    }
}

fn materials() -> MaterialLibrary {
    MaterialLibrary::default()
        .with_tiling("brick", UvTiling::TiledBySize)
        .with_tiling("planks", UvTiling::TiledBySize)
        .with_bullet_hole("brick", "decals/brick_hole")
        .with_bullet_hole("plaster", "decals/plaster_hole")
        .with_bullet_hole("crate", "decals/wood_hole")
        .with_bullet_hole("glass", "decals/glass_crack")
}

/// Three stacked crates in front of the back wall.
fn spawn_crate_stack(stage: &mut Stage, base: Vec3) -> anyhow::Result<DestructibleObject> {
    let model = stage.create_model("crate stack");
    let mut builder = PrimitiveBuilder::new(stage, model);
    for level in 0..3 {
        let desc = SurfaceDesc::new(base + Vec3::Y * level as f32, "crate")
            .with_anchor(Anchor::CenterXzLowestY)
            .with_profile(PhysicsProfile::LIGHT_WOOD);
        builder.create_box(Vec3::ONE, &desc)?;
    }
    let object = DestructibleObject::new(model, Energy::Finite(6));
    object.enable_fragmentation(stage)?;
    Ok(object)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let room = load_room()?;
    let mut stage = Stage::new(materials(), PhysicsConfig::default());
    let layout = RoomLayoutGenerator::default().build_room(&mut stage, &room)?;
    for side in &layout.sides {
        log::info!(
            "{} wall: {} segments, {} doors, {} windows",
            side.side,
            side.walls.len(),
            side.door_frames.len(),
            side.windows.len()
        );
    }

    let crate_base = room.origin + Vec3::new(room.size.x * 0.5, 0.0, room.size.z * 0.25);
    let mut targets = vec![spawn_crate_stack(&mut stage, crate_base)?];
    targets.extend(
        layout
            .models()
            .into_iter()
            .map(|model| DestructibleObject::new(model, Energy::Unbreakable)),
    );

    let lookup = stage.materials().clone();
    let resolver = ShotResolver::new();
    let mut placer = DecalPlacer::seeded(0x5eed);
    let mut rng = rand::thread_rng();
    let muzzle = room.origin + Vec3::new(room.size.x * 0.5, 1.6, room.size.z * 0.8);

    for shot in 0..VOLLEY {
        let aim = crate_base
            + Vec3::new(
                rng.gen_range(-0.4..0.4),
                rng.gen_range(0.2..2.8),
                rng.gen_range(-0.1..0.1),
            );
        let ray = Ray::new(muzzle, aim - muzzle);
        let hits = resolver.resolve_all(&stage, &ray, &targets);
        let Some(hit) = ShotResolver::nearest(&hits).copied() else {
            log::info!("shot {shot}: miss");
            continue;
        };
        let Some(target) = targets.iter_mut().find(|t| t.model() == hit.model) else {
            continue;
        };

        target.place_bullet_hole(&mut stage, &hit, &lookup, &mut placer);
        match target.hurt_by(&mut stage, DAMAGE_PER_SHOT, &hit) {
            HurtOutcome::Damaged { energy, shot_off } => log::info!(
                "shot {shot}: hit at {:.2} m, energy {energy}, shot off {:?}",
                hit.distance,
                shot_off
            ),
            HurtOutcome::Destroyed { .. } => log::info!("shot {shot}: target destroyed"),
            HurtOutcome::Ignored(reason) => {
                log::info!("shot {shot}: hit {:?} at {:.2} m ({reason:?})", hit.model, hit.distance)
            }
        }
    }

    for _ in 0..120 {
        stage.step(1.0 / 60.0);
    }

    let mut draws = DrawLog::default();
    let drawn = stage.render(&mut draws);
    log::info!("{drawn} surfaces drawn");
    for (texture, count) in &draws.per_texture {
        log::info!("  {texture}: {count}");
    }
    Ok(())
}
