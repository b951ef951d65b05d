//! Input state for the watchtower position.
//!
//! The windowing layer feeds raw events in through the `process_*` methods;
//! the simulation reads a frame-coherent view out of the query methods.
//! Everything accumulates between frames and is snapshotted (and the
//! accumulator reset) by `begin_frame`, once per tick.

use glam::Vec2;

/// Trigger buttons the simulation cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Main gun (left mouse).
    Primary,
    /// Cluster bomb release (right mouse).
    Secondary,
}

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Pointer delta accumulated since the last `begin_frame`.
    accumulated_delta: Vec2,
    /// Pointer delta for this frame.
    frame_delta: Vec2,

    primary_held: bool,
    secondary_held: bool,
    /// Primary went down since the last `begin_frame`.
    pending_primary_press: bool,
    /// Primary went down this frame (click-to-fire responds before the
    /// auto-fire gate does).
    primary_pressed: bool,

    /// Map toggle key went down since the last `begin_frame`.
    pending_map_toggle: bool,
    /// Map toggle for this frame.
    map_toggled: bool,

    /// Scroll accumulated since the last `begin_frame`.
    accumulated_scroll: f32,
    /// Scroll for this frame.
    frame_scroll: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot accumulated state into the frame view and reset the
    /// accumulators. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.frame_delta = self.accumulated_delta;
        self.accumulated_delta = Vec2::ZERO;
        self.frame_scroll = self.accumulated_scroll;
        self.accumulated_scroll = 0.0;
        self.primary_pressed = self.pending_primary_press;
        self.pending_primary_press = false;
        self.map_toggled = self.pending_map_toggle;
        self.pending_map_toggle = false;
    }

    /// Process relative pointer motion.
    pub fn process_pointer_motion(&mut self, dx: f32, dy: f32) {
        self.accumulated_delta.x += dx;
        self.accumulated_delta.y += dy;
    }

    /// Process a trigger press or release.
    pub fn process_trigger(&mut self, trigger: Trigger, pressed: bool) {
        match trigger {
            Trigger::Primary => {
                if pressed && !self.primary_held {
                    self.pending_primary_press = true;
                }
                self.primary_held = pressed;
            }
            Trigger::Secondary => self.secondary_held = pressed,
        }
    }

    /// Process a scroll wheel step (positive = away from the user).
    pub fn process_scroll(&mut self, amount: f32) {
        self.accumulated_scroll += amount;
    }

    /// Process the tactical-map toggle key going down.
    pub fn process_map_toggle(&mut self) {
        self.pending_map_toggle = true;
    }

    /// Release every held trigger. Call on window focus loss so a trigger
    /// never stays stuck down while the player is away.
    pub fn release_all(&mut self) {
        self.primary_held = false;
        self.secondary_held = false;
    }

    // Query methods

    /// Pointer delta for this frame (already consumed from the accumulator).
    pub fn pointer_delta(&self) -> Vec2 {
        self.frame_delta
    }

    /// Is the main gun trigger held?
    pub fn is_primary_held(&self) -> bool {
        self.primary_held
    }

    /// Did the main gun trigger go down this frame?
    pub fn primary_pressed(&self) -> bool {
        self.primary_pressed
    }

    /// Is the cluster trigger held?
    pub fn is_secondary_held(&self) -> bool {
        self.secondary_held
    }

    /// Was the tactical map toggled this frame?
    pub fn map_toggled(&self) -> bool {
        self.map_toggled
    }

    /// Scroll steps for this frame.
    pub fn scroll(&self) -> f32 {
        self.frame_scroll
    }
}
