//! Watchpost: fixed-position tower defense combat simulation.
//!
//! Headless demo driver: runs the simulation at a fixed 60 Hz tick with a
//! scripted gunner on the trigger, logging the situation as the defense
//! unfolds. The render/HUD layers attach to `GameState` the same way this
//! driver does.

mod camera;
mod config;
mod drone;
mod effects;
mod enemy;
mod hooks;
mod projectile;
mod schedule;
mod spawner;
mod state;
mod tension;
mod terrain;
mod update;
mod weapons;

use anyhow::Result;
use engine_core::{Time, Vec3};
use input::{InputState, Trigger};
use std::path::Path;

use crate::config::SimConfig;
use crate::hooks::{AudioCues, NullAudio, UiSink};
use crate::state::GameState;
use crate::terrain::RollingTerrain;

/// Wall-clock length of the demo engagement.
const DEMO_SECONDS: f32 = 45.0;
/// When the scripted gunner calls in the drone.
const DRONE_CALL_AT: f32 = 20.0;

/// Cue adapter over the kira-backed player.
struct KiraCues(audio::AudioSystem);

impl AudioCues for KiraCues {
    fn weapon_fire(&mut self) {
        self.0.weapon_fire();
    }
    fn explosion(&mut self, pitch: f32) {
        self.0.explosion(pitch);
    }
    fn cluster_pop(&mut self) {
        self.0.cluster_pop();
    }
    fn drone_motor(&mut self, active: bool) {
        self.0.drone_motor(active);
    }
}

/// HUD stand-in: narrations and progression land in the log.
struct LogUi;

impl UiSink for LogUi {
    fn score_changed(&mut self, score: u32) {
        log::debug!("score: {}", score);
    }
    fn level_up(&mut self, level: u32) {
        log::info!("LEVEL UP -> {}", level);
    }
    fn breach(&mut self) {
        log::warn!("perimeter breach!");
    }
    fn narrate(&mut self, text: &str) {
        log::info!("[COMMS] {}", text);
    }
    fn drone_ui_visible(&mut self, visible: bool) {
        log::debug!("drone feed {}", if visible { "up" } else { "down" });
    }
}

fn build_audio() -> Box<dyn AudioCues> {
    match audio::AudioSystem::new() {
        Ok(mut system) => {
            // Optional sound pack next to the binary; missing files just
            // mean silent cues.
            for name in [
                audio::WEAPON_FIRE,
                audio::EXPLOSION,
                audio::CLUSTER_POP,
                audio::DRONE_MOTOR,
            ] {
                let path = format!("assets/sounds/{}.ogg", name);
                if system.load_sound(name, Path::new(&path)).is_err() {
                    log::debug!("no sound at {}", path);
                }
            }
            Box::new(KiraCues(system))
        }
        Err(e) => {
            log::warn!("audio unavailable ({}); running silent", e);
            Box::new(NullAudio)
        }
    }
}

/// Scripted gunner: tracks the nearest contact, holds the trigger, and
/// feeds pointer motion the way a player would.
fn drive_input(input: &mut InputState, state: &GameState) {
    let contacts = state.radar_contacts();
    let Some(nearest) = contacts.iter().max_by(|a, b| {
        a.position
            .z
            .partial_cmp(&b.position.z)
            .unwrap_or(std::cmp::Ordering::Equal)
    }) else {
        input.process_trigger(Trigger::Primary, false);
        return;
    };

    // Angles to put the torso center on the reticle.
    let aim = nearest.position + Vec3::Y * state.config.torso_offset;
    let to_target = aim - state.camera.position;
    let desired_yaw = (-to_target.x).atan2(-to_target.z);
    let horiz = (to_target.x * to_target.x + to_target.z * to_target.z).sqrt();
    let desired_pitch = to_target.y.atan2(horiz);

    // Feed the error through as pointer motion, like a hand on the mouse.
    let zoom = state.camera.fov() / state.config.fov_max;
    let gain = 0.4 / (state.config.sensitivity * zoom);
    let yaw_err = desired_yaw - state.camera.yaw();
    let pitch_err = desired_pitch - state.camera.pitch();
    input.process_pointer_motion(-yaw_err * gain, -pitch_err * gain);

    input.process_trigger(Trigger::Primary, true);
    // Keep the cluster trigger down; the unlock and the cooldown decide
    // when anything actually drops.
    input.process_trigger(Trigger::Secondary, true);
}

/// Periodic situation dump: what the HUD would show, flattened into the log.
fn report(state: &GameState) {
    let cfg = &state.config;
    log::info!(
        "t={:5.1}s score={} level={} contacts={} pulse={:.0} zoom={:.1}x lock={} drone={}",
        state.clock,
        state.progress.score,
        state.progress.level,
        enemy::live_count(&state.world),
        state.tension.bpm(),
        state.camera.zoom_factor(cfg),
        if state.aim_target().is_some() { "Y" } else { "-" },
        match state.drone.mission() {
            Some(m) => format!(
                "{:?} at ({:.0},{:.0},{:.0}) hdg ({:.1},{:.1},{:.1})",
                m.phase,
                m.position.x,
                m.position.y,
                m.position.z,
                m.heading.x,
                m.heading.y,
                m.heading.z
            ),
            None => "-".to_string(),
        },
    );
    // Render-state summary for eyeballing the sim without a window.
    if let Some(p) = state.effects.particles.first() {
        log::debug!(
            "fx: {} puffs (lead at ({:.0},{:.0},{:.0}) size {:.1} opacity {:.2}), {} tracers, {} flashes",
            state.effects.particles.len(),
            p.position.x,
            p.position.y,
            p.position.z,
            p.size,
            p.opacity(),
            state.effects.tracers.len(),
            state.effects.flashes.len(),
        );
    }
    if let Some(f) = state.effects.flashes.first() {
        log::debug!(
            "flash {} at ({:.0},{:.0},{:.0}) intensity {:.1} radius {:.0}",
            f.id,
            f.position.x,
            f.position.y,
            f.position.z,
            f.intensity,
            f.radius,
        );
    }
    if let Some(t) = state.effects.tracers.first() {
        log::debug!(
            "tracer head ({:.0},{:.0},{:.0}) reticle scale {:.2}",
            t.position.x,
            t.position.y,
            t.position.z,
            state.camera.reticle_scale(cfg),
        );
    }
    let flashed = state
        .world
        .query::<&enemy::Enemy>()
        .iter()
        .filter(|(_, e)| e.flash)
        .count();
    if flashed > 0 {
        log::debug!("{} contacts lit by hit flash", flashed);
    }
    if !state.scheduler.is_empty() {
        log::debug!("{} timed effects pending", state.scheduler.len());
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SimConfig::load();
    let mut state = GameState::new(
        config,
        Box::new(RollingTerrain::default()),
        build_audio(),
        Box::new(LogUi),
    );
    let mut input = InputState::new();
    let mut time = Time::new();

    state.start();
    log::info!("holding the line for {}s", DEMO_SECONDS);

    let mut drone_called = false;
    let mut next_report = 5.0;

    while state.clock < DEMO_SECONDS {
        time.update();
        while time.should_fixed_update() {
            drive_input(&mut input, &state);
            input.begin_frame();
            update::frame(&mut state, &input, time.fixed_timestep_seconds());

            // Combat stress: contacts closing on the wire push the pulse up.
            if state
                .radar_contacts()
                .iter()
                .any(|c| c.position.z > -60.0)
            {
                state.tension.spike(10.0 * time.fixed_timestep_seconds());
            }

            if !drone_called && state.clock >= DRONE_CALL_AT {
                drone_called = true;
                // Strike the thickest part of the advance.
                let target = state.radar_contacts().first().map(|c| c.position);
                if let Some(target) = target {
                    state.designate_drone_strike(target);
                }
            }

            if state.clock >= next_report {
                next_report += 5.0;
                report(&state);
            }
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    log::info!(
        "engagement over: score={} level={} pulse={:.0}",
        state.progress.score,
        state.progress.level,
        state.tension.bpm(),
    );
    state.reset();
    Ok(())
}
