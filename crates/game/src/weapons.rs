//! Weapon resolution: the tower gun and cluster ordnance release.

use engine_core::{Entity, Health, Transform, Vec3, World};
use rand::rngs::StdRng;

use crate::camera::{Ray, WatchCamera};
use crate::config::SimConfig;
use crate::effects::EffectsState;
use crate::enemy::{self, Enemy};
use crate::hooks::{AudioCues, UiSink};
use crate::projectile::{Munition, Projectile};
use crate::schedule::{Deferred, Scheduler};
use crate::terrain::TerrainQuery;

/// Mutable simulation state every combat resolution touches, passed
/// explicitly instead of living in globals.
pub struct CombatCtx<'a> {
    pub world: &'a mut World,
    pub effects: &'a mut EffectsState,
    pub scheduler: &'a mut Scheduler,
    pub progress: &'a mut Progress,
    pub audio: &'a mut dyn AudioCues,
    pub ui: &'a mut dyn UiSink,
    pub rng: &'a mut StdRng,
    /// Simulation clock at this tick.
    pub now: f32,
}

/// Fire timing state for the tower weapons.
#[derive(Debug, Clone, Copy)]
pub struct WeaponState {
    last_shot: f32,
    last_cluster: f32,
}

impl WeaponState {
    pub fn new() -> Self {
        Self {
            last_shot: f32::NEG_INFINITY,
            last_cluster: f32::NEG_INFINITY,
        }
    }

    /// Rate gate for the gun. Returns false, with no side effects, while
    /// the cooldown is running; otherwise stamps the shot time.
    pub fn trigger(&mut self, now: f32, cooldown: f32) -> bool {
        if now - self.last_shot < cooldown {
            return false;
        }
        self.last_shot = now;
        true
    }

    /// Rate gate for cluster release.
    pub fn cluster_ready(&self, now: f32, cooldown: f32) -> bool {
        now - self.last_cluster >= cooldown
    }

    pub fn mark_cluster(&mut self, now: f32) {
        self.last_cluster = now;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for WeaponState {
    fn default() -> Self {
        Self::new()
    }
}

/// Score, level, and what the level has unlocked.
#[derive(Debug, Clone)]
pub struct Progress {
    pub score: u32,
    pub level: u32,
    thresholds: Vec<u32>,
}

impl Progress {
    pub fn new(thresholds: &[u32]) -> Self {
        Self {
            score: 0,
            level: 1,
            thresholds: thresholds.to_vec(),
        }
    }

    /// Count a kill and run the level check. Each threshold fires its
    /// level-up exactly once: the score only ever crosses it once.
    pub fn record_kill(&mut self, ui: &mut dyn UiSink) {
        self.score += 1;
        ui.score_changed(self.score);
        let next = self
            .thresholds
            .get((self.level - 1) as usize)
            .copied()
            .unwrap_or(u32::MAX);
        if self.score >= next {
            self.level += 1;
            ui.level_up(self.level);
            if self.level == 2 {
                ui.narrate("Cluster bomb authorization granted.");
            }
        }
    }

    pub fn cluster_unlocked(&self, unlock_level: u32) -> bool {
        self.level >= unlock_level
    }

    pub fn reset(&mut self) {
        self.score = 0;
        self.level = 1;
    }
}

/// Where a shot ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShotOutcome {
    /// Hit an enemy; impact at its torso center.
    Enemy(Entity),
    /// Terrain impact short of any enemy.
    Ground(Vec3),
    /// Nothing within range; tracer to max range.
    MaxRange(Vec3),
}

/// Best enemy candidate under the aim ray: inside the hit cylinder, in
/// front of the camera, and, as the tie-break, nearest to the *camera*, not
/// nearest to the ray.
pub fn scan_best_target(
    world: &World,
    ray: &Ray,
    forward: Vec3,
    cfg: &SimConfig,
) -> Option<(Entity, f32, Vec3)> {
    let mut best: Option<(Entity, f32, Vec3)> = None;
    for (entity, (transform, _enemy)) in world.query::<(&Transform, &Enemy)>().iter() {
        let center = transform.position + Vec3::Y * cfg.torso_offset;
        let to_enemy = center - ray.origin;
        if to_enemy.dot(forward) < 0.0 {
            continue;
        }
        let along = to_enemy.dot(ray.dir);
        let dist_ray_sq = (to_enemy - ray.dir * along).length_squared();
        if dist_ray_sq >= cfg.hit_radius * cfg.hit_radius {
            continue;
        }
        let dist_cam = to_enemy.length();
        if best.as_ref().map_or(true, |(_, d, _)| dist_cam < *d) {
            best = Some((entity, dist_cam, center));
        }
    }
    best
}

/// Resolve one shot from the tower gun.
///
/// A tracer and the report are emitted whatever happens. Ground wins over an
/// enemy candidate only when it is strictly closer to the camera.
pub fn fire_gun(
    ctx: &mut CombatCtx,
    cfg: &SimConfig,
    terrain: &dyn TerrainQuery,
    camera: &WatchCamera,
) -> ShotOutcome {
    let ray = camera.aim_ray(ctx.rng, cfg.spread);
    let forward = camera.forward();
    let best = scan_best_target(ctx.world, &ray, forward, cfg);
    let ground = terrain.raycast_ground(ray.origin, ray.dir, cfg.max_range);

    let (outcome, impact) = match (ground, best) {
        (Some(hit), Some((_, dist_cam, _))) if hit.distance < dist_cam => {
            (ShotOutcome::Ground(hit.point), hit.point)
        }
        (_, Some((entity, _, center))) => (ShotOutcome::Enemy(entity), center),
        (Some(hit), None) => (ShotOutcome::Ground(hit.point), hit.point),
        (None, None) => {
            let point = ray.origin + ray.dir * cfg.max_range;
            (ShotOutcome::MaxRange(point), point)
        }
    };

    let muzzle = camera.watchtower - Vec3::Y * cfg.muzzle_drop;
    ctx.effects.spawn_tracer(muzzle, impact);
    ctx.audio.weapon_fire();

    match outcome {
        ShotOutcome::Enemy(entity) => {
            ctx.effects.create_explosion(
                ctx.scheduler,
                ctx.audio,
                ctx.rng,
                ctx.now,
                cfg.flash_duration,
                impact,
                0.8,
                true,
            );
            apply_damage(ctx, cfg, entity, cfg.gun_damage);
        }
        ShotOutcome::Ground(point) => {
            ctx.effects.create_explosion(
                ctx.scheduler,
                ctx.audio,
                ctx.rng,
                ctx.now,
                cfg.flash_duration,
                point,
                0.5,
                true,
            );
        }
        ShotOutcome::MaxRange(_) => {}
    }
    outcome
}

/// Hurt an enemy; handle the kill if it drops.
///
/// Deferred blasts can reference enemies that died in the meantime, so a
/// missing entity is a quiet no-op, never a fault.
pub fn apply_damage(ctx: &mut CombatCtx, cfg: &SimConfig, entity: Entity, amount: f32) {
    let dead = {
        let Ok(mut health) = ctx.world.get::<&mut Health>(entity) else {
            return;
        };
        health.take_damage(amount);
        health.is_dead()
    };

    if let Ok(mut e) = ctx.world.get::<&mut Enemy>(entity) {
        e.flash = true;
    }
    ctx.scheduler.schedule(
        ctx.now + cfg.hit_flash_duration,
        Deferred::HitFlashRevert { entity },
    );

    if dead {
        let (position, scale) = {
            let transform = ctx.world.get::<&Transform>(entity).map(|t| t.position);
            let scale = ctx
                .world
                .get::<&Enemy>(entity)
                .map(|e| e.kind.blast_scale())
                .unwrap_or(1.0);
            (transform.unwrap_or(Vec3::ZERO), scale)
        };
        enemy::remove_enemy(ctx.world, entity);
        ctx.effects.create_explosion(
            ctx.scheduler,
            ctx.audio,
            ctx.rng,
            ctx.now,
            cfg.flash_duration,
            position,
            scale,
            false,
        );
        ctx.progress.record_kill(ctx.ui);
    }
}

/// Release a cluster canister toward the aim direction. Quietly refused
/// until the level has unlocked it.
pub fn fire_cluster_bomb(
    ctx: &mut CombatCtx,
    cfg: &SimConfig,
    projectiles: &mut Vec<Projectile>,
    camera: &WatchCamera,
) -> bool {
    if !ctx.progress.cluster_unlocked(cfg.cluster_unlock_level) {
        return false;
    }
    projectiles.push(Projectile {
        munition: Munition::ClusterMain,
        position: camera.watchtower,
        velocity: camera.forward() * cfg.cluster_launch_speed + Vec3::Y * cfg.cluster_launch_lift,
    });
    ctx.ui.narrate("Cluster package away.");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::testing::{RecordingAudio, RecordingUi};
    use crate::terrain::FlatTerrain;
    use engine_core::{Quat, Velocity};
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
        camera: WatchCamera,
    }

    impl Rig {
        fn new() -> Self {
            let cfg = SimConfig::default();
            let camera = WatchCamera::new(&cfg);
            Self {
                world: World::new(),
                effects: EffectsState::new(),
                scheduler: Scheduler::new(),
                progress: Progress::new(&cfg.level_thresholds),
                audio: RecordingAudio::default(),
                ui: RecordingUi::default(),
                rng: StdRng::seed_from_u64(5),
                cfg,
                camera,
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
                now: 0.0,
            }
        }

        /// Plant an enemy at a raw world position (no ground snap).
        fn plant_enemy(&mut self, position: Vec3, health: f32) -> Entity {
            self.world.spawn((
                Transform {
                    position,
                    rotation: Quat::IDENTITY,
                    scale: Vec3::ONE,
                },
                Velocity::new(Vec3::ZERO),
                Health::new(health),
                Enemy {
                    kind: crate::enemy::EnemyKind::Infantry { gait_phase: 0.0 },
                    flash: false,
                },
            ))
        }
    }

    /// Aim ray straight down -Z from the origin, for hand-built scenes.
    fn level_ray() -> Ray {
        Ray {
            origin: Vec3::ZERO,
            dir: -Vec3::Z,
        }
    }

    #[test]
    fn trigger_enforces_the_cooldown_without_side_effects() {
        let mut weapon = WeaponState::new();
        assert!(weapon.trigger(0.0, 0.05));
        assert!(!weapon.trigger(0.03, 0.05));
        // The refused pull must not have stamped the clock.
        assert!(weapon.trigger(0.05, 0.05));
    }

    #[test]
    fn tie_break_prefers_nearest_to_camera_not_nearest_to_ray() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        // A: almost on the ray but far away. B: near the cylinder edge but
        // much closer to the camera. Centers sit at torso height, so plant
        // feet one torso-offset low to land them on the y=0 ray.
        let _a = rig.plant_enemy(Vec3::new(0.5, -cfg.torso_offset, -50.0), 4.0);
        let b = rig.plant_enemy(Vec3::new(3.9, -cfg.torso_offset, -20.0), 4.0);
        let hit = scan_best_target(&rig.world, &level_ray(), -Vec3::Z, &cfg).unwrap();
        assert_eq!(hit.0, b);
    }

    #[test]
    fn enemies_behind_the_camera_are_ignored() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        rig.plant_enemy(Vec3::new(0.0, -cfg.torso_offset, 30.0), 4.0);
        assert!(scan_best_target(&rig.world, &level_ray(), -Vec3::Z, &cfg).is_none());
    }

    #[test]
    fn ground_wins_when_strictly_closer_than_the_enemy() {
        let mut rig = Rig::new();
        // The camera glances down from the tower; the level shot meets flat
        // ground around 226 units out. Plant an enemy dead on the aim ray
        // but beyond that crossing: a valid cylinder candidate the slope
        // still eats.
        let terrain = FlatTerrain { level: 0.0 };
        let cfg = rig.cfg.clone();
        let camera = rig.camera.clone();
        let center = camera.position + camera.forward() * 300.0;
        let far = rig.plant_enemy(center - Vec3::Y * cfg.torso_offset, 4.0);
        assert!(
            scan_best_target(
                &rig.world,
                &Ray {
                    origin: camera.position,
                    dir: camera.forward()
                },
                camera.forward(),
                &cfg
            )
            .is_some()
        );
        let mut ctx = rig.ctx();
        let outcome = fire_gun(&mut ctx, &cfg, &terrain, &camera);
        drop(ctx);
        match outcome {
            ShotOutcome::Ground(point) => assert!(point.y.abs() < 0.1),
            other => panic!("expected ground impact, got {:?}", other),
        }
        // No damage was applied to the enemy behind the crossing.
        let h = rig.world.get::<&Health>(far).unwrap();
        assert_eq!(h.current, 4.0);
        assert_eq!(rig.progress.score, 0);
        // Tracer and report still happened.
        assert_eq!(rig.effects.tracers.len(), 1);
        assert_eq!(rig.audio.0.borrow().shots, 1);
    }

    #[test]
    fn shot_with_no_target_resolves_at_max_range() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        let terrain = FlatTerrain { level: -1000.0 };
        // Pitch the aim upward so the ray never meets the ground in range.
        let camera = {
            let mut c = WatchCamera::new(&cfg);
            c.steer(engine_core::Vec2::new(0.0, -1000.0), &cfg);
            for _ in 0..600 {
                c.update_orientation(1.0 / 60.0, 0.0, 1.0, &cfg);
            }
            c
        };
        assert!(camera.pitch() > 0.0);
        let mut ctx = rig.ctx();
        let outcome = fire_gun(&mut ctx, &cfg, &terrain, &camera);
        drop(ctx);
        match outcome {
            ShotOutcome::MaxRange(point) => {
                assert!((point - camera.position).length() <= cfg.max_range + 1.0);
            }
            other => panic!("expected max-range shot, got {:?}", other),
        }
        assert_eq!(rig.effects.tracers.len(), 1);
        // Max-range shots leave no impact smoke.
        assert!(rig.effects.particles.is_empty());
    }

    #[test]
    fn kill_scores_removes_and_blasts_by_kind() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        let e = rig.plant_enemy(Vec3::new(0.0, 0.0, -30.0), 4.0);
        {
            let mut ctx = rig.ctx();
            apply_damage(&mut ctx, &cfg, e, cfg.gun_damage);
        }
        assert!(rig.world.get::<&Enemy>(e).is_err());
        assert_eq!(rig.progress.score, 1);
        let ui = rig.ui.0.borrow();
        assert_eq!(ui.scores, vec![1]);
        assert_eq!(ui.breaches, 0);
        // Infantry blast: 15 particles at scale 1.0, one boom.
        assert_eq!(rig.effects.particles.len(), 15);
        assert_eq!(rig.audio.0.borrow().explosions.len(), 1);
    }

    #[test]
    fn vehicle_kill_blast_is_three_times_larger() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        let e = rig.world.spawn((
            Transform::from_position(Vec3::new(0.0, 2.0, -30.0)),
            Velocity::new(Vec3::ZERO),
            Health::new(1.0),
            Enemy {
                kind: crate::enemy::EnemyKind::Vehicle,
                flash: false,
            },
        ));
        let mut ctx = rig.ctx();
        apply_damage(&mut ctx, &cfg, e, 10.0);
        drop(ctx);
        assert_eq!(rig.effects.particles.len(), 45);
    }

    #[test]
    fn damage_to_a_removed_enemy_is_a_no_op() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        let e = rig.plant_enemy(Vec3::new(0.0, 0.0, -30.0), 4.0);
        rig.world.despawn(e).unwrap();
        let mut ctx = rig.ctx();
        apply_damage(&mut ctx, &cfg, e, 10.0);
        drop(ctx);
        assert_eq!(rig.progress.score, 0);
        assert!(rig.effects.particles.is_empty());
    }

    #[test]
    fn surviving_hit_flashes_and_schedules_the_revert() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        let e = rig.plant_enemy(Vec3::new(0.0, 0.0, -30.0), 40.0);
        {
            let mut ctx = rig.ctx();
            apply_damage(&mut ctx, &cfg, e, 10.0);
        }
        assert!(rig.world.get::<&Enemy>(e).unwrap().flash);
        assert_eq!(rig.world.get::<&Health>(e).unwrap().current, 30.0);
        assert_eq!(rig.scheduler.len(), 1);
    }

    #[test]
    fn level_up_fires_exactly_once_at_the_threshold() {
        let mut progress = Progress::new(&[3, 5]);
        let mut ui = RecordingUi::default();
        for _ in 0..4 {
            progress.record_kill(&mut ui);
        }
        let log = ui.0.borrow();
        assert_eq!(progress.level, 2);
        assert_eq!(log.levels, vec![2]);
        // The cluster authorization narration came with it.
        assert_eq!(log.narrations.len(), 1);
    }

    #[test]
    fn cluster_release_requires_the_unlock() {
        let mut rig = Rig::new();
        let cfg = rig.cfg.clone();
        let camera = rig.camera.clone();
        let mut projectiles = Vec::new();
        {
            let mut ctx = rig.ctx();
            assert!(!fire_cluster_bomb(&mut ctx, &cfg, &mut projectiles, &camera));
        }
        assert!(projectiles.is_empty());

        rig.progress.level = 2;
        {
            let mut ctx = rig.ctx();
            assert!(fire_cluster_bomb(&mut ctx, &cfg, &mut projectiles, &camera));
        }
        assert_eq!(projectiles.len(), 1);
        assert!(matches!(projectiles[0].munition, Munition::ClusterMain));
        // Launched up and forward from the tower.
        assert_eq!(projectiles[0].position, cfg.watchtower_pos());
        assert!(projectiles[0].velocity.y > 0.0);
    }
}
