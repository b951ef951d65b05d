//! Cluster ordnance: the falling canister and its scattered sub-munitions.

use engine_core::{Entity, Transform, Vec3};
use rand::Rng;

use crate::config::SimConfig;
use crate::enemy::Enemy;
use crate::schedule::Deferred;
use crate::weapons::{self, CombatCtx};

/// What a projectile is, with per-kind state grouped on the variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Munition {
    /// The canister: falls until the split altitude.
    ClusterMain,
    /// A scattered bomblet. `delay` is how long after ground contact its
    /// blast goes off.
    ClusterSub { delay: f32 },
}

/// A ballistic projectile in flight.
#[derive(Debug, Clone, Copy)]
pub struct Projectile {
    pub munition: Munition,
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Sub-munition scatter: horizontal amplitude and the upward/downward mix.
const SCATTER_XZ: f32 = 180.0;
const SCATTER_LIFT: f32 = 60.0;
const SCATTER_DROP: f32 = 60.0;
/// Split puff and delayed blast sizes.
const SPLIT_PUFF_SCALE: f32 = 0.5;
const SUB_BLAST_SCALE: f32 = 1.2;

/// Integrate every projectile one tick and handle terminal events.
///
/// The canister splits into exactly `sub_count` bomblets below the split
/// altitude. A bomblet reaching the ground leaves the simulation at once;
/// its blast is queued behind its random delay and resolved later against
/// wherever the enemies are *then*.
pub fn update_projectiles(
    ctx: &mut CombatCtx,
    cfg: &SimConfig,
    projectiles: &mut Vec<Projectile>,
    dt: f32,
) {
    let mut spawned: Vec<Projectile> = Vec::new();
    let mut i = 0;
    while i < projectiles.len() {
        let p = &mut projectiles[i];
        let terminal = match p.munition {
            Munition::ClusterMain => {
                p.velocity.y -= cfg.main_gravity * dt;
                p.position += p.velocity * dt;
                p.position.y < cfg.split_altitude
            }
            Munition::ClusterSub { .. } => {
                p.velocity.y -= cfg.sub_gravity * dt;
                p.position += p.velocity * dt;
                p.position.y <= 0.0
            }
        };
        if !terminal {
            i += 1;
            continue;
        }
        let p = projectiles.remove(i);
        match p.munition {
            Munition::ClusterMain => {
                for _ in 0..cfg.sub_count {
                    spawned.push(Projectile {
                        munition: Munition::ClusterSub {
                            delay: ctx.rng.gen::<f32>() * cfg.sub_delay_max,
                        },
                        position: p.position,
                        velocity: Vec3::new(
                            (ctx.rng.gen::<f32>() - 0.5) * SCATTER_XZ,
                            ctx.rng.gen::<f32>() * SCATTER_LIFT - SCATTER_DROP,
                            (ctx.rng.gen::<f32>() - 0.5) * SCATTER_XZ,
                        ),
                    });
                }
                ctx.effects.create_explosion(
                    ctx.scheduler,
                    ctx.audio,
                    ctx.rng,
                    ctx.now,
                    cfg.flash_duration,
                    p.position,
                    SPLIT_PUFF_SCALE,
                    true,
                );
            }
            Munition::ClusterSub { delay } => {
                ctx.scheduler.schedule(
                    ctx.now + delay,
                    Deferred::SubDetonation {
                        position: p.position,
                    },
                );
            }
        }
    }
    projectiles.append(&mut spawned);
}

/// A bomblet's delayed blast: pop, smoke, and area damage against enemy
/// positions as they are now.
pub fn detonate_sub(ctx: &mut CombatCtx, cfg: &SimConfig, position: Vec3) {
    ctx.effects.create_explosion(
        ctx.scheduler,
        ctx.audio,
        ctx.rng,
        ctx.now,
        cfg.flash_duration,
        position,
        SUB_BLAST_SCALE,
        false,
    );
    ctx.audio.cluster_pop();

    let victims: Vec<Entity> = ctx
        .world
        .query::<(&Transform, &Enemy)>()
        .iter()
        .filter(|(_, (t, _))| t.position.distance(position) < cfg.sub_radius)
        .map(|(entity, _)| entity)
        .collect();
    for entity in victims {
        weapons::apply_damage(ctx, cfg, entity, cfg.sub_damage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectsState;
    use crate::hooks::testing::{RecordingAudio, RecordingUi};
    use crate::schedule::Scheduler;
    use crate::weapons::Progress;
    use engine_core::{Health, Velocity, World};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct Rig {
        world: World,
        effects: EffectsState,
        scheduler: Scheduler,
        progress: Progress,
        audio: RecordingAudio,
        ui: RecordingUi,
        rng: StdRng,
        cfg: SimConfig,
        now: f32,
    }

    impl Rig {
        fn new() -> Self {
            let cfg = SimConfig::default();
            Self {
                world: World::new(),
                effects: EffectsState::new(),
                scheduler: Scheduler::new(),
                progress: Progress::new(&cfg.level_thresholds),
                audio: RecordingAudio::default(),
                ui: RecordingUi::default(),
                rng: StdRng::seed_from_u64(11),
                cfg,
                now: 0.0,
            }
        }

        fn ctx(&mut self) -> CombatCtx<'_> {
            CombatCtx {
                world: &mut self.world,
                effects: &mut self.effects,
                scheduler: &mut self.scheduler,
                progress: &mut self.progress,
                audio: &mut self.audio,
                ui: &mut self.ui,
                rng: &mut self.rng,
                now: self.now,
            }
        }

        fn plant_enemy(&mut self, position: Vec3, health: f32) -> Entity {
            self.world.spawn((
                Transform::from_position(position),
                Velocity::new(Vec3::ZERO),
                Health::new(health),
                Enemy {
                    kind: crate::enemy::EnemyKind::Infantry { gait_phase: 0.0 },
                    flash: false,
                },
            ))
        }
    }

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn canister_splits_into_exactly_fifteen_bomblets() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        // Just above the split altitude, already falling.
        let mut projectiles = vec![Projectile {
            munition: Munition::ClusterMain,
            position: Vec3::new(0.0, cfg.split_altitude + 0.5, -100.0),
            velocity: Vec3::new(0.0, -60.0, 0.0),
        }];
        let mut ctx = rig.ctx();
        update_projectiles(&mut ctx, &cfg, &mut projectiles, DT);
        drop(ctx);
        assert_eq!(projectiles.len(), cfg.sub_count);
        for p in &projectiles {
            let Munition::ClusterSub { delay } = p.munition else {
                panic!("canister survived the split");
            };
            assert!((0.0..cfg.sub_delay_max).contains(&delay));
            // Scatter within documented bounds.
            assert!(p.velocity.x.abs() <= SCATTER_XZ * 0.5);
            assert!(p.velocity.z.abs() <= SCATTER_XZ * 0.5);
            assert!(p.velocity.y <= 0.0 && p.velocity.y >= -SCATTER_DROP);
        }
        // Split puff: smoke only, no boom yet.
        assert_eq!(rig.effects.particles.len(), 5);
        assert!(rig.audio.0.borrow().explosions.is_empty());
    }

    #[test]
    fn grounded_bomblet_leaves_at_once_but_blasts_later() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        let mut projectiles = vec![Projectile {
            munition: Munition::ClusterSub { delay: 0.3 },
            position: Vec3::new(0.0, 0.5, -100.0),
            velocity: Vec3::new(0.0, -120.0, 0.0),
        }];
        rig.now = 2.0;
        let mut ctx = rig.ctx();
        update_projectiles(&mut ctx, &cfg, &mut projectiles, DT);
        drop(ctx);
        // Gone from the simulation immediately, detonation queued.
        assert!(projectiles.is_empty());
        assert_eq!(rig.scheduler.len(), 1);
        let early = rig.scheduler.drain_due(2.2);
        assert!(early.is_empty(), "blast must wait for its delay");
        let due = rig.scheduler.drain_due(2.3);
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn delayed_blast_damages_positions_at_detonation_time() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        let blast = Vec3::new(0.0, 0.0, -100.0);
        // In radius at contact time, out of it by detonation time.
        let walker = rig.plant_enemy(Vec3::new(10.0, 0.0, -100.0), 40.0);
        // Out of radius at contact, in radius at detonation.
        let arriver = rig.plant_enemy(Vec3::new(30.0, 0.0, -100.0), 40.0);

        // ...time passes; they trade places before the blast.
        rig.world.get::<&mut Transform>(walker).unwrap().position.x = 30.0;
        rig.world.get::<&mut Transform>(arriver).unwrap().position.x = 10.0;

        let mut ctx = rig.ctx();
        detonate_sub(&mut ctx, &cfg, blast);
        drop(ctx);

        assert_eq!(
            rig.world.get::<&Health>(walker).unwrap().current,
            40.0,
            "walked out before the delay elapsed"
        );
        assert_eq!(
            rig.world.get::<&Health>(arriver).unwrap().current,
            40.0 - cfg.sub_damage
        );
        assert_eq!(rig.audio.0.borrow().pops, 1);
    }

    #[test]
    fn one_blast_damages_each_enemy_once() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        let blast = Vec3::new(0.0, 0.0, -100.0);
        let e = rig.plant_enemy(Vec3::new(5.0, 0.0, -100.0), 40.0);
        let mut ctx = rig.ctx();
        detonate_sub(&mut ctx, &cfg, blast);
        drop(ctx);
        assert_eq!(
            rig.world.get::<&Health>(e).unwrap().current,
            40.0 - cfg.sub_damage
        );
    }

    #[test]
    fn canister_arcs_under_gravity() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        let mut projectiles = vec![Projectile {
            munition: Munition::ClusterMain,
            position: Vec3::new(0.0, 45.0, 25.0),
            velocity: Vec3::new(0.0, cfg.cluster_launch_lift, -cfg.cluster_launch_speed),
        }];
        let v0 = projectiles[0].velocity.y;
        let mut ctx = rig.ctx();
        update_projectiles(&mut ctx, &cfg, &mut projectiles, DT);
        drop(ctx);
        assert!(projectiles[0].velocity.y < v0);
        assert!(projectiles[0].position.z < 25.0);
    }
}
