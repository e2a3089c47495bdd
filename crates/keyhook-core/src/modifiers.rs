use crate::types::{Sc, Vk};
use crate::vk_map::*;
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Left/right modifier bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModLR(pub u8);

impl ModLR {
    pub const NONE: ModLR = ModLR(0);
    pub const LCONTROL: ModLR = ModLR(0x01);
    pub const RCONTROL: ModLR = ModLR(0x02);
    pub const LALT: ModLR = ModLR(0x04);
    pub const RALT: ModLR = ModLR(0x08);
    pub const LSHIFT: ModLR = ModLR(0x10);
    pub const RSHIFT: ModLR = ModLR(0x20);
    pub const LWIN: ModLR = ModLR(0x40);
    pub const RWIN: ModLR = ModLR(0x80);

    pub const CONTROL: ModLR = ModLR(0x03);
    pub const ALT: ModLR = ModLR(0x0C);
    pub const SHIFT: ModLR = ModLR(0x30);
    pub const WIN: ModLR = ModLR(0xC0);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: ModLR) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: ModLR) -> bool {
        self.0 & other.0 != 0
    }

    pub fn insert(&mut self, other: ModLR) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ModLR) {
        self.0 &= !other.0;
    }

    pub const fn without(self, other: ModLR) -> ModLR {
        ModLR(self.0 & !other.0)
    }
}

impl BitOr for ModLR {
    type Output = ModLR;
    fn bitor(self, rhs: ModLR) -> ModLR {
        ModLR(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModLR {
    fn bitor_assign(&mut self, rhs: ModLR) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ModLR {
    type Output = ModLR;
    fn bitand(self, rhs: ModLR) -> ModLR {
        ModLR(self.0 & rhs.0)
    }
}

impl Not for ModLR {
    type Output = ModLR;
    fn not(self) -> ModLR {
        ModLR(!self.0)
    }
}

/// One side-specific modifier key.
#[derive(Debug, Clone, Copy)]
struct SideKey {
    vk: Vk,
    bit: ModLR,
    /// Side-independent alias. Win keys have none.
    neutral: Option<Vk>,
    counterpart: Vk,
}

const SIDE_KEYS: [SideKey; 8] = [
    SideKey { vk: VK_LSHIFT, bit: ModLR::LSHIFT, neutral: Some(VK_SHIFT), counterpart: VK_RSHIFT },
    SideKey { vk: VK_RSHIFT, bit: ModLR::RSHIFT, neutral: Some(VK_SHIFT), counterpart: VK_LSHIFT },
    SideKey { vk: VK_LCONTROL, bit: ModLR::LCONTROL, neutral: Some(VK_CONTROL), counterpart: VK_RCONTROL },
    SideKey { vk: VK_RCONTROL, bit: ModLR::RCONTROL, neutral: Some(VK_CONTROL), counterpart: VK_LCONTROL },
    SideKey { vk: VK_LMENU, bit: ModLR::LALT, neutral: Some(VK_MENU), counterpart: VK_RMENU },
    SideKey { vk: VK_RMENU, bit: ModLR::RALT, neutral: Some(VK_MENU), counterpart: VK_LMENU },
    SideKey { vk: VK_LWIN, bit: ModLR::LWIN, neutral: None, counterpart: VK_RWIN },
    SideKey { vk: VK_RWIN, bit: ModLR::RWIN, neutral: None, counterpart: VK_LWIN },
];

/// (neutral code, right-side scan code, left key, right key)
const NEUTRAL_KEYS: [(Vk, Sc, Vk, Vk); 3] = [
    (VK_SHIFT, SC_RSHIFT, VK_LSHIFT, VK_RSHIFT),
    (VK_CONTROL, SC_RCONTROL, VK_LCONTROL, VK_RCONTROL),
    (VK_MENU, SC_RALT, VK_LMENU, VK_RMENU),
];

fn side_key(vk: Vk) -> Option<&'static SideKey> {
    SIDE_KEYS.iter().find(|k| k.vk == vk)
}

/// Maps a modifier event to its side-specific key. A neutral code counts as
/// the right-hand key only when its scan code is the right-hand one; anything
/// else is taken to be the left-hand key.
pub fn resolve_side(vk: Vk, sc: Sc) -> Option<Vk> {
    if side_key(vk).is_some() {
        return Some(vk);
    }
    NEUTRAL_KEYS
        .iter()
        .find(|(neutral, ..)| *neutral == vk)
        .map(|&(_, right_sc, left, right)| if sc == right_sc { right } else { left })
}

/// Modifier bits a key stands for when configured. Neutral codes cover both sides.
pub fn modifier_bits(vk: Vk) -> ModLR {
    match vk {
        VK_SHIFT => ModLR::SHIFT,
        VK_CONTROL => ModLR::CONTROL,
        VK_MENU => ModLR::ALT,
        _ => side_key(vk).map(|k| k.bit).unwrap_or(ModLR::NONE),
    }
}

/// Modifier bits for a scan-code record.
pub fn modifier_bits_for_sc(sc: Sc) -> ModLR {
    match sc {
        SC_LSHIFT => ModLR::LSHIFT,
        SC_RSHIFT => ModLR::RSHIFT,
        SC_LCONTROL => ModLR::LCONTROL,
        SC_RCONTROL => ModLR::RCONTROL,
        SC_LALT => ModLR::LALT,
        SC_RALT => ModLR::RALT,
        0x15B => ModLR::LWIN,
        0x15C => ModLR::RWIN,
        _ => ModLR::NONE,
    }
}

/// Physical modifier state saved before an event is applied, restored when
/// that event turns out to have been driver-generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicalSnapshot {
    physical: ModLR,
    shift: bool,
    lshift: bool,
}

#[derive(Debug, Clone)]
pub struct ModifierState {
    logical: ModLR,
    physical: ModLR,
    physical_keys: [bool; 256],
}

impl Default for ModifierState {
    fn default() -> Self {
        Self {
            logical: ModLR::NONE,
            physical: ModLR::NONE,
            physical_keys: [false; 256],
        }
    }
}

impl ModifierState {
    pub fn logical(&self) -> ModLR {
        self.logical
    }

    pub fn physical(&self) -> ModLR {
        self.physical
    }

    pub fn is_physically_down(&self, vk: Vk) -> bool {
        self.physical_keys[vk as usize]
    }

    /// Applies a modifier key event. Logical state follows every event that
    /// is not suppressed; physical state follows physical events only.
    pub fn apply(&mut self, vk: Vk, sc: Sc, up: bool, suppressed: bool, physical: bool) {
        let Some(key) = resolve_side(vk, sc).and_then(side_key) else {
            return;
        };
        if !suppressed {
            set_bit(&mut self.logical, key.bit, !up);
        }
        if physical {
            set_bit(&mut self.physical, key.bit, !up);
            self.physical_keys[key.vk as usize] = !up;
            if let Some(neutral) = key.neutral {
                self.physical_keys[neutral as usize] =
                    self.physical_keys[key.vk as usize] || self.physical_keys[key.counterpart as usize];
            }
        }
    }

    /// Logical effect of a synthetic event requested by the hook itself.
    pub fn apply_logical(&mut self, vk: Vk, sc: Sc, up: bool) {
        self.apply(vk, sc, up, false, false);
    }

    /// Physical state of a key that is not a modifier.
    pub fn set_physical_key(&mut self, vk: Vk, down: bool) {
        self.physical_keys[vk as usize] = down;
    }

    pub fn snapshot(&self) -> PhysicalSnapshot {
        PhysicalSnapshot {
            physical: self.physical,
            shift: self.physical_keys[VK_SHIFT as usize],
            lshift: self.physical_keys[VK_LSHIFT as usize],
        }
    }

    pub fn restore(&mut self, snapshot: PhysicalSnapshot) {
        self.physical = snapshot.physical;
        self.physical_keys[VK_SHIFT as usize] = snapshot.shift;
        self.physical_keys[VK_LSHIFT as usize] = snapshot.lshift;
    }

    /// Win+L locks the workstation and the releases never reach the hook.
    pub fn reset_after_workstation_lock(&mut self, vk: Vk) {
        self.logical = ModLR::NONE;
        self.physical = ModLR::NONE;
        self.physical_keys[vk as usize] = false;
        self.physical_keys[VK_LWIN as usize] = false;
        self.physical_keys[VK_RWIN as usize] = false;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn set_bit(mask: &mut ModLR, bit: ModLR, down: bool) {
    if down {
        mask.insert(bit);
    } else {
        mask.remove(bit);
    }
}
