//! Simulation tuning table. Loaded from watchpost.ron at startup.
//!
//! One canonical set of rates for the whole sim. Movement and integration
//! constants are in world units per second, tuned at the 60 Hz reference
//! tick. Times are seconds.

use engine_core::Vec3;
use serde::{Deserialize, Serialize};

/// Every tunable the simulation reads. Missing fields in the file fall back
/// to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // ── Main gun ────────────────────────────────────────────────────────
    /// Minimum time between shots (0.05 = 20 rounds/sec automatic fire).
    pub fire_cooldown: f32,
    /// Damage per hit.
    pub gun_damage: f32,
    /// Hit cylinder radius around the aim ray.
    pub hit_radius: f32,
    /// Maximum shot range; tracer-only resolution distance.
    pub max_range: f32,
    /// Aim point height above an enemy's feet.
    pub torso_offset: f32,
    /// Per-axis aim jitter amplitude (radians). Zero = laser-straight.
    pub spread: f32,
    /// Tracer muzzle offset below the parapet.
    pub muzzle_drop: f32,

    // ── Cluster bomb ────────────────────────────────────────────────────
    /// Minimum time between cluster releases.
    pub cluster_cooldown: f32,
    /// Level required to release cluster ordnance.
    pub cluster_unlock_level: u32,
    /// Forward launch speed.
    pub cluster_launch_speed: f32,
    /// Upward launch boost.
    pub cluster_launch_lift: f32,
    /// Sub-munitions per canister.
    pub sub_count: usize,
    /// Canister split altitude.
    pub split_altitude: f32,
    /// Canister gravity.
    pub main_gravity: f32,
    /// Sub-munition gravity.
    pub sub_gravity: f32,
    /// Upper bound of the random detonation delay after ground contact.
    pub sub_delay_max: f32,
    /// Sub-munition blast radius.
    pub sub_radius: f32,
    /// Sub-munition damage.
    pub sub_damage: f32,

    // ── Enemies ─────────────────────────────────────────────────────────
    /// Defense line: an enemy past this Z has broken through.
    pub boundary_z: f32,
    /// Seconds between spawn waves.
    pub spawn_interval: f32,
    /// Chance a wave is a full squad rather than a single rifleman.
    pub squad_weight: f32,
    /// Live enemy cap; waves are skipped above it.
    pub max_enemies: usize,
    pub infantry_health: f32,
    pub vehicle_health: f32,
    pub infantry_speed_min: f32,
    pub infantry_speed_max: f32,
    pub vehicle_speed: f32,
    /// Half-width of the spawn band along X.
    pub spawn_half_width: f32,
    pub infantry_spawn_z: f32,
    pub squad_spawn_z: f32,

    // ── Progression ─────────────────────────────────────────────────────
    /// Kill counts that trigger each level-up, in order.
    pub level_thresholds: Vec<u32>,

    // ── Drone ───────────────────────────────────────────────────────────
    pub drone_launch_height: f32,
    pub drone_climb: f32,
    pub drone_drift: f32,
    pub drone_cruise_speed: f32,
    pub drone_dive_speed: f32,
    /// Altitude at which launch hands over to cruise.
    pub cruise_altitude: f32,
    /// Horizontal distance at which cruise tips into the dive.
    pub dive_distance: f32,
    /// Altitude below which the drone detonates.
    pub detonate_altitude: f32,
    pub drone_radius: f32,
    pub drone_damage: f32,

    // ── Tension ─────────────────────────────────────────────────────────
    pub resting_heart_rate: f32,
    pub max_heart_rate: f32,
    /// Exponential decay rate toward resting, per second.
    pub heart_decay: f32,

    // ── Camera ──────────────────────────────────────────────────────────
    /// Watchtower position; the fixed player viewpoint.
    pub watchtower: [f32; 3],
    pub sensitivity: f32,
    /// Orientation smoothing rate toward the pointer target.
    pub cam_smooth: f32,
    pub pitch_min: f32,
    pub pitch_max: f32,
    pub yaw_min: f32,
    pub yaw_max: f32,
    pub recoil_pitch: f32,
    /// Amplitude of the random horizontal recoil component.
    pub recoil_yaw: f32,
    pub fov_min: f32,
    pub fov_max: f32,
    /// FOV change per scroll step.
    pub fov_scroll_step: f32,
    /// FOV easing rate toward the target.
    pub fov_ease: f32,

    // ── Timed effects ───────────────────────────────────────────────────
    /// How long a hit enemy stays flashed.
    pub hit_flash_duration: f32,
    /// How long an explosion's light flash lives.
    pub flash_duration: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fire_cooldown: 0.05,
            gun_damage: 10.0,
            hit_radius: 4.0,
            max_range: 600.0,
            torso_offset: 1.5,
            spread: 0.0,
            muzzle_drop: 2.0,

            cluster_cooldown: 1.0,
            cluster_unlock_level: 2,
            cluster_launch_speed: 240.0,
            cluster_launch_lift: 60.0,
            sub_count: 15,
            split_altitude: 20.0,
            main_gravity: 180.0,
            sub_gravity: 360.0,
            sub_delay_max: 0.5,
            sub_radius: 15.0,
            sub_damage: 5.0,

            boundary_z: 20.0,
            spawn_interval: 2.0,
            squad_weight: 0.4,
            max_enemies: 40,
            infantry_health: 4.0,
            vehicle_health: 40.0,
            infantry_speed_min: 3.6,
            infantry_speed_max: 5.4,
            vehicle_speed: 2.4,
            spawn_half_width: 400.0,
            infantry_spawn_z: -450.0,
            squad_spawn_z: -500.0,

            level_thresholds: vec![10, 30, 60],

            drone_launch_height: 5.0,
            drone_climb: 20.0,
            drone_drift: 15.0,
            drone_cruise_speed: 50.0,
            drone_dive_speed: 80.0,
            cruise_altitude: 120.0,
            dive_distance: 30.0,
            detonate_altitude: 2.0,
            drone_radius: 40.0,
            drone_damage: 50.0,

            resting_heart_rate: 67.0,
            max_heart_rate: 200.0,
            heart_decay: 0.8,

            watchtower: [0.0, 45.0, 25.0],
            sensitivity: 0.002,
            cam_smooth: 12.0,
            pitch_min: -0.6,
            pitch_max: 0.4,
            yaw_min: -1.5,
            yaw_max: 1.5,
            recoil_pitch: 0.003,
            recoil_yaw: 0.002,
            fov_min: 10.0,
            fov_max: 60.0,
            fov_scroll_step: 5.0,
            fov_ease: 6.0,

            hit_flash_duration: 0.05,
            flash_duration: 0.08,
        }
    }
}

impl SimConfig {
    /// Load from `watchpost.ron` in the working directory. Missing or
    /// invalid file falls back to defaults with a warning.
    pub fn load() -> Self {
        let path = std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join("watchpost.ron");
        if let Ok(data) = std::fs::read_to_string(&path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Watchtower position as a vector.
    pub fn watchtower_pos(&self) -> Vec3 {
        Vec3::from_array(self.watchtower)
    }
}
