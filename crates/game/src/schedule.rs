//! Deferred simulation events.
//!
//! Timed one-shots (delayed detonations, flash expiries) are queue entries
//! keyed on the simulation clock, polled once per tick, not detached
//! timers. Pausing the sim pauses them; handlers must tolerate targets that
//! no longer exist.

use engine_core::{Entity, Vec3};

/// A one-shot effect scheduled for a later tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deferred {
    /// A grounded sub-munition's delayed blast. Damage is resolved against
    /// enemy positions at detonation time, not at ground contact.
    SubDetonation { position: Vec3 },
    /// Clear an enemy's hit flash.
    HitFlashRevert { entity: Entity },
    /// Remove an explosion's light flash.
    FlashExpire { id: u32 },
}

#[derive(Debug)]
struct Entry {
    due: f32,
    seq: u64,
    event: Deferred,
}

/// Pending deferred events, ordered by (due time, insertion order).
#[derive(Debug, Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for `due` on the simulation clock.
    pub fn schedule(&mut self, due: f32, event: Deferred) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { due, seq, event });
    }

    /// Remove and return every event due at or before `now`, in
    /// (due, insertion) order.
    pub fn drain_due(&mut self, now: f32) -> Vec<Deferred> {
        let mut due: Vec<Entry> = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due <= now {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| {
            a.due
                .partial_cmp(&b.due)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        due.into_iter().map(|e| e.event).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
