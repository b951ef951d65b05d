//! The watchtower viewpoint: smoothed aim, zoom, recoil, breathing sway.

use engine_core::{Quat, Vec2, Vec3};
use glam::EulerRot;
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::SimConfig;

/// An aim ray from the camera.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

/// First-person camera fixed to the watchtower.
///
/// Orientation chases pointer-driven targets with exponential smoothing;
/// FOV eases toward a scroll-driven target. Yaw/pitch are clamped to the
/// tower's field of fire.
#[derive(Debug, Clone)]
pub struct WatchCamera {
    /// Tower position; aim rays and ordnance launch from here.
    pub watchtower: Vec3,
    /// Eye position this tick (tower plus breathing bob).
    pub position: Vec3,
    yaw: f32,
    pitch: f32,
    target_yaw: f32,
    target_pitch: f32,
    fov: f32,
    target_fov: f32,
}

/// Initial downward glance toward the approach.
const START_PITCH: f32 = -0.2;
/// Breathing bob: rate (rad/s) and base amplitude (world units).
const BREATH_RATE: f32 = 2.0;
const BREATH_AMPLITUDE: f32 = 0.1;

impl WatchCamera {
    pub fn new(cfg: &SimConfig) -> Self {
        let watchtower = cfg.watchtower_pos();
        Self {
            watchtower,
            position: watchtower,
            yaw: 0.0,
            pitch: START_PITCH,
            target_yaw: 0.0,
            target_pitch: START_PITCH,
            fov: cfg.fov_max,
            target_fov: cfg.fov_max,
        }
    }

    /// Feed this tick's pointer delta into the orientation targets.
    /// Sensitivity shrinks with zoom so magnified aim stays controllable.
    pub fn steer(&mut self, pointer_delta: Vec2, cfg: &SimConfig) {
        let zoom_sens = self.fov / cfg.fov_max;
        self.target_yaw -= pointer_delta.x * cfg.sensitivity * zoom_sens;
        self.target_pitch -= pointer_delta.y * cfg.sensitivity * zoom_sens;
        self.clamp_targets(cfg);
    }

    /// Feed this tick's scroll steps into the FOV target.
    pub fn zoom_input(&mut self, scroll: f32, cfg: &SimConfig) {
        self.target_fov = (self.target_fov - scroll * cfg.fov_scroll_step)
            .clamp(cfg.fov_min, cfg.fov_max);
    }

    /// Chase the orientation targets and bob with the defender's breathing.
    /// Must run before any aim-ray resolution in the same tick.
    pub fn update_orientation(&mut self, dt: f32, t: f32, sway: f32, cfg: &SimConfig) {
        let blend = (cfg.cam_smooth * dt).min(1.0);
        self.yaw += (self.target_yaw - self.yaw) * blend;
        self.pitch += (self.target_pitch - self.pitch) * blend;
        let bob = (t * BREATH_RATE).sin() * BREATH_AMPLITUDE * sway;
        self.position = self.watchtower + Vec3::Y * bob;
    }

    /// Ease the FOV toward its target.
    pub fn update_fov(&mut self, dt: f32, cfg: &SimConfig) {
        let blend = (cfg.fov_ease * dt).min(1.0);
        self.fov += (self.target_fov - self.fov) * blend;
        self.fov = self.fov.clamp(cfg.fov_min, cfg.fov_max);
    }

    /// Kick the aim up and sideways after a shot, scaled by tension sway.
    pub fn apply_recoil(&mut self, rng: &mut StdRng, sway: f32, cfg: &SimConfig) {
        self.target_pitch += cfg.recoil_pitch * sway;
        self.target_yaw += (rng.gen::<f32>() - 0.5) * cfg.recoil_yaw * sway;
        self.clamp_targets(cfg);
    }

    fn clamp_targets(&mut self, cfg: &SimConfig) {
        self.target_pitch = self.target_pitch.clamp(cfg.pitch_min, cfg.pitch_max);
        self.target_yaw = self.target_yaw.clamp(cfg.yaw_min, cfg.yaw_max);
    }

    /// Current look direction.
    pub fn forward(&self) -> Vec3 {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0) * -Vec3::Z
    }

    /// Aim ray from the eye, with optional per-axis spread jitter.
    pub fn aim_ray(&self, rng: &mut StdRng, spread: f32) -> Ray {
        let mut dir = self.forward();
        if spread > 0.0 {
            dir.x += (rng.gen::<f32>() - 0.5) * spread;
            dir.y += (rng.gen::<f32>() - 0.5) * spread;
            dir = dir.normalize();
        }
        Ray {
            origin: self.position,
            dir,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Magnification readout for the HUD (1.0 at base FOV).
    pub fn zoom_factor(&self, cfg: &SimConfig) -> f32 {
        cfg.fov_max / self.fov
    }

    /// Reticle scale: shrinks as the view magnifies.
    pub fn reticle_scale(&self, cfg: &SimConfig) -> f32 {
        self.fov / cfg.fov_max
    }

    pub fn reset(&mut self, cfg: &SimConfig) {
        *self = Self::new(cfg);
    }
}
