//! Game state: single owner of the world, subsystems, and collaborator
//! handles. Everything the tick mutates hangs off this struct and is passed
//! down by explicit reference.

use engine_core::{Transform, Vec3, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::{Ray, WatchCamera};
use crate::config::SimConfig;
use crate::drone::DroneControl;
use crate::effects::EffectsState;
use crate::enemy::Enemy;
use crate::hooks::{AudioCues, UiSink};
use crate::projectile::Projectile;
use crate::schedule::Scheduler;
use crate::spawner::WaveSpawner;
use crate::tension::HeartRate;
use crate::terrain::TerrainQuery;
use crate::weapons::{self, CombatCtx, Progress, WeaponState};

/// One blip for the minimap/tactical map.
#[derive(Debug, Clone, Copy)]
pub struct RadarContact {
    pub position: Vec3,
    pub vehicle: bool,
}

/// Authoritative simulation state.
pub struct GameState {
    pub config: SimConfig,
    pub world: World,
    pub spawner: WaveSpawner,
    pub weapon: WeaponState,
    pub progress: Progress,
    pub projectiles: Vec<Projectile>,
    pub effects: EffectsState,
    pub drone: DroneControl,
    pub camera: WatchCamera,
    pub tension: HeartRate,
    pub scheduler: Scheduler,
    pub rng: StdRng,
    /// Simulation clock in seconds; frozen while paused.
    pub clock: f32,
    /// The defense is running.
    pub active: bool,
    /// Tactical map overlay is up; simulation holds.
    pub map_open: bool,

    pub terrain: Box<dyn TerrainQuery>,
    pub audio: Box<dyn AudioCues>,
    pub ui: Box<dyn UiSink>,
}

/// Split borrows of everything one tick touches. Handed out by
/// [`GameState::split`] so each system gets exactly the references it needs
/// without aliasing.
pub struct SimParts<'a> {
    pub ctx: CombatCtx<'a>,
    pub camera: &'a mut WatchCamera,
    pub tension: &'a mut HeartRate,
    pub weapon: &'a mut WeaponState,
    pub spawner: &'a mut WaveSpawner,
    pub projectiles: &'a mut Vec<Projectile>,
    pub drone: &'a mut DroneControl,
    pub terrain: &'a dyn TerrainQuery,
    pub cfg: &'a SimConfig,
}

impl GameState {
    pub fn new(
        config: SimConfig,
        terrain: Box<dyn TerrainQuery>,
        audio: Box<dyn AudioCues>,
        ui: Box<dyn UiSink>,
    ) -> Self {
        Self::with_rng(config, terrain, audio, ui, StdRng::from_entropy())
    }

    /// Deterministic construction for tests and replays.
    pub fn with_rng(
        config: SimConfig,
        terrain: Box<dyn TerrainQuery>,
        audio: Box<dyn AudioCues>,
        ui: Box<dyn UiSink>,
        rng: StdRng,
    ) -> Self {
        let camera = WatchCamera::new(&config);
        let progress = Progress::new(&config.level_thresholds);
        let tension = HeartRate::new(
            config.resting_heart_rate,
            config.max_heart_rate,
            config.heart_decay,
        );
        Self {
            config,
            world: World::new(),
            spawner: WaveSpawner::new(),
            weapon: WeaponState::new(),
            progress,
            projectiles: Vec::new(),
            effects: EffectsState::new(),
            drone: DroneControl::new(),
            camera,
            tension,
            scheduler: Scheduler::new(),
            rng,
            clock: 0.0,
            active: false,
            map_open: false,
            terrain,
            audio,
            ui,
        }
    }

    /// Borrow out the tick's working set.
    pub fn split(&mut self) -> SimParts<'_> {
        let GameState {
            config,
            world,
            spawner,
            weapon,
            progress,
            projectiles,
            effects,
            drone,
            camera,
            tension,
            scheduler,
            rng,
            clock,
            terrain,
            audio,
            ui,
            ..
        } = self;
        SimParts {
            ctx: CombatCtx {
                world,
                effects,
                scheduler,
                progress,
                audio: audio.as_mut(),
                ui: ui.as_mut(),
                rng,
                now: *clock,
            },
            camera,
            tension,
            weapon,
            spawner,
            projectiles,
            drone,
            terrain: &**terrain,
            cfg: config,
        }
    }

    /// Open the gates: the defense is live.
    pub fn start(&mut self) {
        self.active = true;
        self.ui.narrate("Perimeter defense initiated.");
    }

    /// Tear the scene down to a fresh, inactive state. The drone's external
    /// cues are cleared with it.
    pub fn reset(&mut self) {
        self.drone.abort(self.audio.as_mut(), self.ui.as_mut());
        self.world.clear();
        self.projectiles.clear();
        self.effects.clear();
        self.scheduler.clear();
        self.spawner.reset();
        self.weapon.reset();
        self.progress.reset();
        self.tension.reset();
        self.camera.reset(&self.config);
        self.clock = 0.0;
        self.active = false;
        self.map_open = false;
    }

    pub fn toggle_map(&mut self) {
        self.map_open = !self.map_open;
    }

    /// Tactical-map click: send the drone. Closes the map when the launch
    /// is accepted; a refused launch (one already flying) leaves it open.
    pub fn designate_drone_strike(&mut self, target: Vec3) -> bool {
        let launched = self.drone.launch(
            target,
            self.config.watchtower_pos(),
            self.audio.as_mut(),
            self.ui.as_mut(),
            &self.config,
        );
        if launched && self.map_open {
            self.map_open = false;
        }
        launched
    }

    /// Enemy blips for map drawing.
    pub fn radar_contacts(&self) -> Vec<RadarContact> {
        self.world
            .query::<(&Transform, &Enemy)>()
            .iter()
            .map(|(_, (transform, enemy))| RadarContact {
                position: transform.position,
                vehicle: enemy.kind.is_vehicle(),
            })
            .collect()
    }

    /// What the reticle rests on: the enemy the next shot would hit, if the
    /// ground would not eat it first. Drives the HUD target box.
    pub fn aim_target(&self) -> Option<engine_core::Entity> {
        let forward = self.camera.forward();
        let ray = Ray {
            origin: self.camera.position,
            dir: forward,
        };
        let best = weapons::scan_best_target(&self.world, &ray, forward, &self.config)?;
        if let Some(ground) = self
            .terrain
            .raycast_ground(ray.origin, ray.dir, self.config.max_range)
        {
            if ground.distance < best.1 {
                return None;
            }
        }
        Some(best.0)
    }
}
