//! Enemy entities: riflemen and armor advancing on the defense line.

use engine_core::{Entity, Health, Quat, Transform, Velocity, Vec3, World};
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::SimConfig;
use crate::hooks::UiSink;
use crate::terrain::TerrainQuery;

/// What kind of enemy this is. Kind-specific state lives on the variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyKind {
    /// Foot soldier with a gait phase offset so squads don't march in step.
    Infantry { gait_phase: f32 },
    /// Armored vehicle; hovers on its suspension instead of walking.
    Vehicle,
}

impl EnemyKind {
    pub fn is_vehicle(&self) -> bool {
        matches!(self, EnemyKind::Vehicle)
    }

    /// Kill explosion size.
    pub fn blast_scale(&self) -> f32 {
        match self {
            EnemyKind::Infantry { .. } => 1.0,
            EnemyKind::Vehicle => 3.0,
        }
    }
}

/// Enemy component. Health and motion live in their own components.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyKind,
    /// Transient hit feedback; cleared by a scheduled revert.
    pub flash: bool,
}

/// Squad shape: rifle escorts around the vehicle, XZ offsets.
const SQUAD_ESCORT_OFFSETS: [(f32, f32); 4] = [(-3.0, -3.0), (3.0, -3.0), (-3.0, -6.0), (3.0, -6.0)];

/// Gait bob: rest height above ground, sine amplitude, frequency, and the
/// blend rate of the running-average filter.
const GAIT_REST_HEIGHT: f32 = 0.1;
const GAIT_AMPLITUDE: f32 = 0.01;
const GAIT_FREQUENCY: f32 = 10.0;
const GAIT_BLEND: f32 = 6.0;

/// Vehicle hover: chassis height above ground, bob amplitude and frequency.
const HOVER_HEIGHT: f32 = 2.0;
const HOVER_AMPLITUDE: f32 = 0.1;
const HOVER_FREQUENCY: f32 = 5.0;

/// Spawn a single rifleman, ground-snapped, facing the defense line.
/// `position_hint` places squad escorts; lone spawns pick a random spot on
/// the far band.
pub fn spawn_enemy(
    world: &mut World,
    terrain: &dyn TerrainQuery,
    rng: &mut StdRng,
    cfg: &SimConfig,
    position_hint: Option<(f32, f32)>,
) -> Entity {
    let (x, z) = position_hint.unwrap_or_else(|| {
        (
            (rng.gen::<f32>() - 0.5) * 2.0 * cfg.spawn_half_width,
            cfg.infantry_spawn_z,
        )
    });
    let y = terrain.height(x, z) + GAIT_REST_HEIGHT;
    let speed = cfg.infantry_speed_min
        + rng.gen::<f32>() * (cfg.infantry_speed_max - cfg.infantry_speed_min);
    world.spawn((
        Transform {
            position: Vec3::new(x, y, z),
            rotation: face_defense_line(),
            scale: Vec3::ONE,
        },
        Velocity::new(Vec3::new(0.0, 0.0, speed)),
        Health::new(cfg.infantry_health),
        Enemy {
            kind: EnemyKind::Infantry {
                gait_phase: rng.gen::<f32>() * 100.0,
            },
            flash: false,
        },
    ))
}

/// Spawn a squad: one vehicle plus four rifle escorts in formation.
pub fn spawn_squad(
    world: &mut World,
    terrain: &dyn TerrainQuery,
    rng: &mut StdRng,
    cfg: &SimConfig,
) -> Entity {
    let x = (rng.gen::<f32>() - 0.5) * 2.0 * cfg.spawn_half_width;
    let z = cfg.squad_spawn_z;
    let vehicle = world.spawn((
        Transform {
            position: Vec3::new(x, terrain.height(x, z) + HOVER_HEIGHT, z),
            rotation: face_defense_line(),
            scale: Vec3::ONE,
        },
        Velocity::new(Vec3::new(0.0, 0.0, cfg.vehicle_speed)),
        Health::new(cfg.vehicle_health),
        Enemy {
            kind: EnemyKind::Vehicle,
            flash: false,
        },
    ));
    for (dx, dz) in SQUAD_ESCORT_OFFSETS {
        spawn_enemy(world, terrain, rng, cfg, Some((x + dx, z + dz)));
    }
    vehicle
}

/// Advance every enemy toward the line, bob them, and remove breachers.
///
/// Runs after damage resolution in the tick, so a kill on the same tick an
/// enemy stands past the line counts as a kill, not a breach.
pub fn update_enemies(
    world: &mut World,
    terrain: &dyn TerrainQuery,
    ui: &mut dyn UiSink,
    t: f32,
    dt: f32,
    cfg: &SimConfig,
) {
    let mut breached: Vec<Entity> = Vec::new();
    for (entity, (transform, velocity, enemy)) in
        world.query_mut::<(&mut Transform, &Velocity, &Enemy)>()
    {
        transform.position.z += velocity.linear.z * dt;
        let ground = terrain.height(transform.position.x, transform.position.z);
        match enemy.kind {
            EnemyKind::Infantry { gait_phase } => {
                // Running-average filter toward a ground-relative sine: the
                // step settles in over a few ticks instead of snapping.
                let target =
                    ground + GAIT_REST_HEIGHT + (t * GAIT_FREQUENCY + gait_phase).sin() * GAIT_AMPLITUDE;
                let blend = (GAIT_BLEND * dt).min(1.0);
                transform.position.y += (target - transform.position.y) * blend;
            }
            EnemyKind::Vehicle => {
                transform.position.y =
                    ground + HOVER_HEIGHT + (t * HOVER_FREQUENCY).sin() * HOVER_AMPLITUDE;
            }
        }
        if transform.position.z > cfg.boundary_z {
            breached.push(entity);
        }
    }
    for entity in breached {
        world.despawn(entity).ok();
        ui.breach();
    }
}

/// Number of enemies still on the field.
pub fn live_count(world: &World) -> usize {
    world.query::<&Enemy>().iter().count()
}

/// The only removal path besides a breach. Kills go through here.
pub fn remove_enemy(world: &mut World, entity: Entity) {
    world.despawn(entity).ok();
}

fn face_defense_line() -> Quat {
    // Enemies advance in +Z; entity forward is -Z.
    Quat::from_rotation_y(std::f32::consts::PI)
}
