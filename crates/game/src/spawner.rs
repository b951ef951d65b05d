//! Wave spawning cadence for the assault on the line.

use engine_core::World;
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::SimConfig;
use crate::enemy::{live_count, spawn_enemy, spawn_squad};
use crate::terrain::TerrainQuery;

/// Spawns a wave on a fixed interval: mostly lone riflemen, sometimes a
/// full squad. Waves are skipped while the field is at capacity.
#[derive(Debug)]
pub struct WaveSpawner {
    timer: f32,
}

impl WaveSpawner {
    pub fn new() -> Self {
        Self { timer: 0.0 }
    }

    pub fn update(
        &mut self,
        world: &mut World,
        terrain: &dyn TerrainQuery,
        rng: &mut StdRng,
        cfg: &SimConfig,
        dt: f32,
    ) {
        self.timer += dt;
        if self.timer < cfg.spawn_interval {
            return;
        }
        self.timer = 0.0;

        if live_count(world) >= cfg.max_enemies {
            return;
        }
        if rng.gen::<f32>() < cfg.squad_weight {
            spawn_squad(world, terrain, rng, cfg);
        } else {
            spawn_enemy(world, terrain, rng, cfg, None);
        }
    }

    pub fn reset(&mut self) {
        self.timer = 0.0;
    }
}

impl Default for WaveSpawner {
    fn default() -> Self {
        Self::new()
    }
}
