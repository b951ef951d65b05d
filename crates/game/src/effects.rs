//! Cosmetic combat feedback: smoke particles, tracers, and light flashes.
//!
//! Purely visual, but batch counts and scales are part of the observable
//! contract with the render layer, so they are fixed here rather than left
//! to the renderer.

use engine_core::Vec3;
use rand::rngs::StdRng;
use rand::Rng;

use crate::hooks::AudioCues;
use crate::schedule::{Deferred, Scheduler};

/// One smoke/spark sprite. Life runs 1 → 0; opacity follows it.
#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Remaining life in [0, 1], strictly decreasing.
    pub life: f32,
    /// Life lost per second.
    pub decay: f32,
    /// Size gained per second.
    pub growth: f32,
    pub size: f32,
}

impl Particle {
    /// Render opacity for the current life.
    pub fn opacity(&self) -> f32 {
        self.life * 0.5
    }
}

/// Bullet path flash from the muzzle to the impact point. Advanced once per
/// tick; progress 1 means gone.
#[derive(Debug, Clone, Copy)]
pub struct Tracer {
    pub start: Vec3,
    pub target: Vec3,
    pub position: Vec3,
    pub progress: f32,
}

/// Short-lived explosion light. Removed by a scheduled expiry.
#[derive(Debug, Clone, Copy)]
pub struct Flash {
    pub id: u32,
    pub position: Vec3,
    pub intensity: f32,
    pub radius: f32,
}

const PARTICLE_DECAY: f32 = 3.0;
const PARTICLE_GROWTH: f32 = 18.0;
/// Smoke drift velocity amplitudes (x/z centered, y upward).
const DRIFT_XZ: f32 = 30.0;
const DRIFT_UP: f32 = 48.0;
/// Horizontal jitter of the spawn point, per unit of explosion scale.
const SPAWN_JITTER: f32 = 3.0;
/// Particle batch sizes: fixed for smoke puffs, scale-proportional for
/// full explosions.
const SMOKE_ONLY_COUNT: usize = 5;
const PARTICLES_PER_SCALE: f32 = 15.0;
const FLASH_INTENSITY: f32 = 3.0;
const FLASH_RADIUS: f32 = 50.0;
/// Tracer progress per second (the full path in ~3 ticks).
const TRACER_SPEED: f32 = 18.0;

/// All live visual effects.
#[derive(Debug, Default)]
pub struct EffectsState {
    pub particles: Vec<Particle>,
    pub tracers: Vec<Tracer>,
    pub flashes: Vec<Flash>,
    next_flash_id: u32,
}

impl EffectsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit an explosion at `position`: one light flash (expiry scheduled)
    /// plus a smoke batch. Smoke-only variants are the small impact puffs;
    /// full explosions also play the pitched boom, deeper for bigger blasts.
    pub fn create_explosion(
        &mut self,
        scheduler: &mut Scheduler,
        audio: &mut dyn AudioCues,
        rng: &mut StdRng,
        now: f32,
        flash_duration: f32,
        position: Vec3,
        scale: f32,
        smoke_only: bool,
    ) {
        if !smoke_only {
            audio.explosion(1.0 / scale.max(1.0));
        }

        let id = self.next_flash_id;
        self.next_flash_id = self.next_flash_id.wrapping_add(1);
        self.flashes.push(Flash {
            id,
            position,
            intensity: FLASH_INTENSITY,
            radius: FLASH_RADIUS * scale,
        });
        scheduler.schedule(now + flash_duration, Deferred::FlashExpire { id });

        let count = if smoke_only {
            SMOKE_ONLY_COUNT
        } else {
            (PARTICLES_PER_SCALE * scale) as usize
        };
        for _ in 0..count {
            let jitter = Vec3::new(
                (rng.gen::<f32>() - 0.5) * SPAWN_JITTER * scale,
                0.0,
                (rng.gen::<f32>() - 0.5) * SPAWN_JITTER * scale,
            );
            self.particles.push(Particle {
                position: position + jitter,
                velocity: Vec3::new(
                    (rng.gen::<f32>() - 0.5) * DRIFT_XZ,
                    rng.gen::<f32>() * DRIFT_UP,
                    (rng.gen::<f32>() - 0.5) * DRIFT_XZ,
                ),
                life: 1.0,
                decay: PARTICLE_DECAY,
                growth: PARTICLE_GROWTH,
                size: (rng.gen::<f32>() * 5.0 + 2.0) * scale,
            });
        }
    }

    /// Start a tracer from the muzzle toward the resolved impact point.
    pub fn spawn_tracer(&mut self, start: Vec3, target: Vec3) {
        self.tracers.push(Tracer {
            start,
            target,
            position: start,
            progress: 0.0,
        });
    }

    /// Scheduled flash expiry. The flash may already be gone after a reset;
    /// that is fine.
    pub fn expire_flash(&mut self, id: u32) {
        self.flashes.retain(|f| f.id != id);
    }

    /// Advance particles and tracers one tick.
    pub fn update(&mut self, dt: f32) {
        for p in &mut self.particles {
            p.position += p.velocity * dt;
            p.life -= p.decay * dt;
            p.size += p.growth * dt;
        }
        self.particles.retain(|p| p.life > 0.0);

        for t in &mut self.tracers {
            t.progress += TRACER_SPEED * dt;
            t.position = t.start.lerp(t.target, t.progress.min(1.0));
        }
        self.tracers.retain(|t| t.progress < 1.0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.tracers.clear();
        self.flashes.clear();
    }
}
