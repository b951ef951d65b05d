//! Terrain queries: ground height sampling and ground raycasts.
//!
//! The simulation never owns terrain geometry; it samples a height field
//! through this trait. The ground raycast is derived from height sampling so
//! any implementation gets it for free.

use engine_core::Vec3;

/// Result of a ground raycast.
#[derive(Debug, Clone, Copy)]
pub struct GroundHit {
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
}

/// Coarse march step for the ground raycast, in world units.
const MARCH_STEP: f32 = 2.0;

pub trait TerrainQuery {
    /// Ground height at (x, z).
    fn height(&self, x: f32, z: f32) -> f32;

    /// Cast a ray against the height field and return the first crossing.
    ///
    /// Marches in fixed steps, then bisects the bracketing interval. Fine
    /// enough for hit resolution against gently rolling ground; a ray that
    /// starts below the surface hits immediately.
    fn raycast_ground(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<GroundHit> {
        if origin.y <= self.height(origin.x, origin.z) {
            return Some(GroundHit {
                distance: 0.0,
                point: origin,
            });
        }

        let mut prev_t = 0.0;
        let mut t = MARCH_STEP;
        while prev_t < max_distance {
            let t_clamped = t.min(max_distance);
            let p = origin + dir * t_clamped;
            if p.y <= self.height(p.x, p.z) {
                // Bisect between the last point above ground and this one.
                let (mut lo, mut hi) = (prev_t, t_clamped);
                for _ in 0..16 {
                    let mid = 0.5 * (lo + hi);
                    let q = origin + dir * mid;
                    if q.y > self.height(q.x, q.z) {
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                let distance = 0.5 * (lo + hi);
                return Some(GroundHit {
                    distance,
                    point: origin + dir * distance,
                });
            }
            prev_t = t_clamped;
            t += MARCH_STEP;
        }
        None
    }
}

/// Gently rolling ground: crossed sine waves around y = 0.
#[derive(Debug, Clone, Copy)]
pub struct RollingTerrain {
    pub amplitude: f32,
    pub frequency: f32,
}

impl Default for RollingTerrain {
    fn default() -> Self {
        Self {
            amplitude: 5.0,
            frequency: 0.02,
        }
    }
}

impl TerrainQuery for RollingTerrain {
    fn height(&self, x: f32, z: f32) -> f32 {
        (x * self.frequency).sin() * (z * self.frequency).cos() * self.amplitude
    }
}

/// Perfectly flat ground at a fixed level. Used by tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTerrain {
    pub level: f32,
}

impl TerrainQuery for FlatTerrain {
    fn height(&self, _x: f32, _z: f32) -> f32 {
        self.level
    }
}
