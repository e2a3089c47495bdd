//! Decides whether a keyboard event was caused by the user's hands.
//!
//! Some keyboard drivers surround a shifted dual-state numpad key (numlock on)
//! with shift-up/shift-down events of their own. These arrive without the
//! injected flag, so they are told apart by timing: a left/neutral shift-down
//! right after a numpad key-up, or one that a later event reveals to have been
//! a driver artifact, is not physical.

use crate::modifiers::PhysicalSnapshot;
use crate::types::{Sc, Vk};
use crate::vk_map::{
    is_dual_state_numpad_key, pad_slot, PAD_TOTAL_COUNT, SC_EXTENDED, VK_LSHIFT, VK_SHIFT,
};

#[derive(Debug, Clone, Copy, Default)]
struct PriorEvent {
    vk: Vk,
    sc: Sc,
    up: bool,
    physical: bool,
    time: u32,
}

#[derive(Debug, Clone)]
pub struct Classifier {
    window_ms: u32,
    pad_state: [bool; PAD_TOTAL_COUNT],
    next_shift_down_not_physical: bool,
    prior: PriorEvent,
    before_prior: PhysicalSnapshot,
}

/// Outcome of re-examining the previous event in light of the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookBack {
    Keep,
    /// The previous shift event was a driver artifact: restore this snapshot.
    Rollback(PhysicalSnapshot),
}

fn is_left_or_neutral_shift(vk: Vk) -> bool {
    vk == VK_LSHIFT || vk == VK_SHIFT
}

impl Classifier {
    pub fn new(window_ms: u32) -> Self {
        Self {
            window_ms,
            pad_state: [false; PAD_TOTAL_COUNT],
            next_shift_down_not_physical: false,
            prior: PriorEvent::default(),
            before_prior: PhysicalSnapshot::default(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.window_ms);
    }

    /// True while a qualified numpad key (numlock was on at press time) is held.
    pub fn pad_key_is_down(&self) -> bool {
        self.pad_state.iter().any(|&down| down)
    }

    /// Tracks dual-state numpad keys. Only called while numlock is on.
    pub fn track_pad_key(&mut self, vk: Vk, sc: Sc, up: bool) {
        if sc & SC_EXTENDED != 0 {
            return;
        }
        if let Some(slot) = pad_slot(vk) {
            self.pad_state[slot] = !up;
        }
    }

    pub fn next_shift_down_is_latched(&self) -> bool {
        self.next_shift_down_not_physical
    }

    fn within_window(&self, now: u32) -> bool {
        now.wrapping_sub(self.prior.time) < self.window_ms
    }

    /// Classifies one event. Consumes the look-ahead latch when it applies.
    pub fn is_physical(&mut self, vk: Vk, up: bool, injected: bool, now: u32) -> bool {
        if injected {
            return false;
        }
        if is_left_or_neutral_shift(vk) && !up {
            if self.next_shift_down_not_physical && !self.pad_key_is_down() {
                self.next_shift_down_not_physical = false;
                return false;
            }
            if self.prior.up
                && is_dual_state_numpad_key(self.prior.vk, self.prior.sc)
                && self.within_window(now)
            {
                return false;
            }
        }
        true
    }

    /// Re-examines a physical left/neutral shift event that happened just
    /// before the current one. Also latches the next shift-down as
    /// non-physical when the pattern calls for it.
    pub fn look_back(&mut self, vk: Vk, sc: Sc, up: bool, now: u32) -> LookBack {
        if !(self.prior.physical && is_left_or_neutral_shift(self.prior.vk) && self.within_window(now)) {
            return LookBack::Keep;
        }
        let current_is_dual_state = is_dual_state_numpad_key(vk, sc);
        // A shift-down while a pad key is held, or a shift-up between two
        // pad events, is the driver's doing.
        let fix_it = (!self.prior.up && self.pad_key_is_down())
            || (self.prior.up && up && current_is_dual_state);
        if fix_it {
            self.next_shift_down_not_physical = true;
        }
        if fix_it || (self.prior.up && current_is_dual_state) {
            LookBack::Rollback(self.before_prior)
        } else {
            LookBack::Keep
        }
    }

    /// Saves physical state as it was before the current event took effect.
    pub fn save_snapshot(&mut self, snapshot: PhysicalSnapshot) {
        self.before_prior = snapshot;
    }

    pub fn remember(&mut self, vk: Vk, sc: Sc, up: bool, physical: bool, now: u32) {
        self.prior = PriorEvent {
            vk,
            sc,
            up,
            physical,
            time: now,
        };
    }
}
