//! Kamikaze drone strike: launch, cruise to the mark, dive, detonate.

use engine_core::{Entity, Transform, Vec3};

use crate::config::SimConfig;
use crate::enemy::Enemy;
use crate::hooks::{AudioCues, UiSink};
use crate::weapons::{self, CombatCtx};

/// Flight phase of an active strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DronePhase {
    /// Climbing off the tower, drifting toward the mark.
    Launch,
    /// Level flight toward the mark's horizontal position.
    Cruise,
    /// Terminal dive onto the mark.
    Dive,
}

/// One strike in flight.
#[derive(Debug, Clone, Copy)]
pub struct DroneMission {
    pub phase: DronePhase,
    pub target: Vec3,
    pub position: Vec3,
    /// Unit travel direction; what the renderer points the airframe along.
    pub heading: Vec3,
}

/// Detonation blast size.
const BLAST_SCALE: f32 = 5.0;

/// Owns the single drone slot. A second launch while one is up is refused.
#[derive(Debug, Default)]
pub struct DroneControl {
    mission: Option<DroneMission>,
}

impl DroneControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mission(&self) -> Option<&DroneMission> {
        self.mission.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.mission.is_some()
    }

    /// Send the drone at a map-designated point. No-op while one is flying:
    /// the active mission keeps its target.
    pub fn launch(
        &mut self,
        target: Vec3,
        watchtower: Vec3,
        audio: &mut dyn AudioCues,
        ui: &mut dyn UiSink,
        cfg: &SimConfig,
    ) -> bool {
        if self.mission.is_some() {
            return false;
        }
        let position = watchtower + Vec3::Y * cfg.drone_launch_height;
        let level = Vec3::new(target.x - position.x, 0.0, target.z - position.z);
        let heading = level.try_normalize().unwrap_or(-Vec3::Z);
        self.mission = Some(DroneMission {
            phase: DronePhase::Launch,
            target,
            position,
            heading,
        });
        audio.drone_motor(true);
        ui.drone_ui_visible(true);
        ui.narrate("Coordinates received. Kamikaze inbound.");
        true
    }

    /// Fly one tick; detonate when the dive bottoms out.
    pub fn update(&mut self, ctx: &mut CombatCtx, cfg: &SimConfig, dt: f32) {
        let Some(m) = self.mission.as_mut() else {
            return;
        };
        match m.phase {
            DronePhase::Launch => {
                m.position.y += cfg.drone_climb * dt;
                m.position += m.heading * cfg.drone_drift * dt;
                if m.position.y > cfg.cruise_altitude {
                    m.phase = DronePhase::Cruise;
                }
            }
            DronePhase::Cruise => {
                let level =
                    Vec3::new(m.target.x - m.position.x, 0.0, m.target.z - m.position.z);
                m.heading = level.try_normalize().unwrap_or(m.heading);
                m.position += m.heading * cfg.drone_cruise_speed * dt;
                if level.length() < cfg.dive_distance {
                    m.phase = DronePhase::Dive;
                }
            }
            DronePhase::Dive => {
                m.heading = (m.target - m.position).try_normalize().unwrap_or(-Vec3::Y);
                m.position += m.heading * cfg.drone_dive_speed * dt;
                if m.position.y < cfg.detonate_altitude {
                    let impact = m.position;
                    self.mission = None;
                    detonate(ctx, cfg, impact);
                }
            }
        }
    }

    /// Scene teardown: clear the mission and its external cues without a
    /// blast.
    pub fn abort(&mut self, audio: &mut dyn AudioCues, ui: &mut dyn UiSink) {
        if self.mission.take().is_some() {
            audio.drone_motor(false);
            ui.drone_ui_visible(false);
        }
    }
}

fn detonate(ctx: &mut CombatCtx, cfg: &SimConfig, impact: Vec3) {
    ctx.effects.create_explosion(
        ctx.scheduler,
        ctx.audio,
        ctx.rng,
        ctx.now,
        cfg.flash_duration,
        impact,
        BLAST_SCALE,
        false,
    );
    let victims: Vec<Entity> = ctx
        .world
        .query::<(&Transform, &Enemy)>()
        .iter()
        .filter(|(_, (t, _))| t.position.distance(impact) < cfg.drone_radius)
        .map(|(entity, _)| entity)
        .collect();
    for entity in victims {
        weapons::apply_damage(ctx, cfg, entity, cfg.drone_damage);
    }
    ctx.audio.drone_motor(false);
    ctx.ui.drone_ui_visible(false);
    ctx.ui.narrate("Impact confirmed.");
}
