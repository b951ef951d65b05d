//! Audio cue playback using Kira.
//!
//! The simulation fires cues and never hears back: a cue for a sound that
//! failed to load or play is logged and dropped. Sounds are registered by
//! name at startup; nothing here blocks the tick.

use anyhow::Result;
use kira::{
    manager::{backend::DefaultBackend, AudioManager, AudioManagerSettings},
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    tween::Tween,
};
use rand::Rng;
use std::collections::HashMap;
use std::path::Path;

/// Sound names the cue methods look up. Register these with `load_sound`.
pub const WEAPON_FIRE: &str = "weapon_fire";
pub const EXPLOSION: &str = "explosion";
pub const CLUSTER_POP: &str = "cluster_pop";
pub const DRONE_MOTOR: &str = "drone_motor";

/// Cue player managing loaded sounds and the drone motor loop.
pub struct AudioSystem {
    manager: AudioManager,
    sounds: HashMap<String, StaticSoundData>,
    motor_handle: Option<StaticSoundHandle>,
}

impl AudioSystem {
    /// Create a new audio system on the default backend.
    pub fn new() -> Result<Self> {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())?;
        Ok(Self {
            manager,
            sounds: HashMap::new(),
            motor_handle: None,
        })
    }

    /// Load a sound from a file.
    pub fn load_sound(&mut self, name: &str, path: &Path) -> Result<()> {
        let sound_data = StaticSoundData::from_file(path)?;
        self.sounds.insert(name.to_string(), sound_data);
        Ok(())
    }

    /// Load a sound from bytes baked into the binary.
    pub fn load_sound_from_bytes(&mut self, name: &str, data: &'static [u8]) -> Result<()> {
        let cursor = std::io::Cursor::new(data);
        let sound_data = StaticSoundData::from_cursor(cursor)?;
        self.sounds.insert(name.to_string(), sound_data);
        Ok(())
    }

    /// Single machine-gun report. Playback rate is nudged so rapid fire
    /// doesn't sound like one looping sample.
    pub fn weapon_fire(&mut self) {
        let rate = 0.95 + rand::thread_rng().gen::<f64>() * 0.1;
        self.play_cue(WEAPON_FIRE, rate);
    }

    /// Explosion at the given pitch (1.0 = as recorded; lower = bigger boom).
    pub fn explosion(&mut self, pitch: f32) {
        self.play_cue(EXPLOSION, pitch.max(0.1) as f64);
    }

    /// Sub-munition pop.
    pub fn cluster_pop(&mut self) {
        self.play_cue(CLUSTER_POP, 1.0);
    }

    /// Start or stop the drone motor loop.
    pub fn drone_motor(&mut self, active: bool) {
        if active {
            if self.motor_handle.is_some() {
                return;
            }
            let Some(sound) = self.sounds.get(DRONE_MOTOR) else {
                log::debug!("drone motor cue skipped: sound not loaded");
                return;
            };
            let settings = StaticSoundSettings::new().loop_region(0.0..);
            match self.manager.play(sound.clone().with_settings(settings)) {
                Ok(handle) => self.motor_handle = Some(handle),
                Err(e) => log::warn!("drone motor loop failed: {}", e),
            }
        } else if let Some(mut handle) = self.motor_handle.take() {
            handle.stop(Tween::default());
        }
    }

    fn play_cue(&mut self, name: &str, playback_rate: f64) {
        let Some(sound) = self.sounds.get(name) else {
            log::debug!("cue '{}' skipped: sound not loaded", name);
            return;
        };
        let settings = StaticSoundSettings::new().playback_rate(playback_rate);
        if let Err(e) = self.manager.play(sound.clone().with_settings(settings)) {
            log::warn!("cue '{}' failed: {}", name, e);
        }
    }
}
