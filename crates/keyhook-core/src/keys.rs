use crate::modifiers::{modifier_bits, modifier_bits_for_sc, ModLR};
use crate::types::{JustUsed, Sc, ToggleSlot, ToggleState, Vk};
use crate::vk_map::SC_MAX;
use serde::{Deserialize, Serialize};

const VK_COUNT: usize = 256;
const SC_COUNT: usize = SC_MAX as usize + 1;

/// A configured hotkey identifier with its "do not suppress" flag packed in
/// the high bit. The top of the id range is reserved for task-switch actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HotkeyId(u16);

const NO_SUPPRESS: u16 = 0x8000;
const ID_MASK: u16 = 0x7FFF;

impl HotkeyId {
    pub const INVALID: HotkeyId = HotkeyId(0x7FFF);
    pub const ALT_TAB: HotkeyId = HotkeyId(0x7FFE);
    pub const ALT_TAB_SHIFT: HotkeyId = HotkeyId(0x7FFD);
    pub const ALT_TAB_MENU: HotkeyId = HotkeyId(0x7FFC);
    pub const ALT_TAB_AND_MENU: HotkeyId = HotkeyId(0x7FFB);
    pub const ALT_TAB_MENU_DISMISS: HotkeyId = HotkeyId(0x7FFA);
    /// Largest id available to ordinary hotkeys.
    pub const MAX: u16 = 0x7FF9;

    /// Returns `None` for ids that collide with the reserved range.
    pub fn new(id: u16) -> Option<Self> {
        (id <= Self::MAX).then_some(HotkeyId(id))
    }

    pub const fn with_no_suppress(self) -> Self {
        HotkeyId(self.0 | NO_SUPPRESS)
    }

    pub const fn no_suppress(self) -> bool {
        self.0 & NO_SUPPRESS != 0
    }

    /// The identifier with flags masked off.
    pub const fn id(self) -> HotkeyId {
        HotkeyId(self.0 & ID_MASK)
    }

    pub const fn value(self) -> u16 {
        self.0 & ID_MASK
    }

    pub fn is_invalid(self) -> bool {
        self.id() == Self::INVALID
    }

    pub fn action(self) -> HotkeyAction {
        match self.id() {
            Self::ALT_TAB => HotkeyAction::AltTab,
            Self::ALT_TAB_SHIFT => HotkeyAction::AltTabShift,
            Self::ALT_TAB_MENU => HotkeyAction::AltTabMenu,
            Self::ALT_TAB_AND_MENU => HotkeyAction::AltTabAndMenu,
            Self::ALT_TAB_MENU_DISMISS => HotkeyAction::AltTabMenuDismiss,
            id => HotkeyAction::Fire(id.value()),
        }
    }
}

impl Default for HotkeyId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Decoded meaning of a resolved hotkey id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Fire(u16),
    AltTab,
    AltTabShift,
    AltTabMenu,
    AltTabAndMenu,
    AltTabMenuDismiss,
}

/// Identity of a key record: by virtual key or by (extended) scan code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRef {
    Vk(Vk),
    Sc(Sc),
}

/// Per-key configuration and runtime state.
#[derive(Debug, Clone, Default)]
pub struct KeyRecord {
    pub used_as_prefix: bool,
    pub used_as_suffix: bool,
    /// Only meaningful on scan-code records.
    pub sc_takes_precedence: bool,
    pub as_modifiers: ModLR,
    pub toggle: Option<ToggleSlot>,
    /// Mouse buttons only: keep the native click unless modifiers or a prefix are involved.
    pub preserve_native_click: bool,
    /// "While this other key is held, this key fires `id`", checked in order.
    pub prefix_vk: Vec<(Vk, HotkeyId)>,
    pub prefix_sc: Vec<(Sc, HotkeyId)>,

    pub is_down: bool,
    pub down_performed_action: bool,
    pub just_used: JustUsed,
    pub caused_alt_down: bool,
    pub caused_shift_down: bool,
}

impl KeyRecord {
    pub fn is_modifier(&self) -> bool {
        !self.as_modifiers.is_empty()
    }

    /// Lock key whose toggle state is left alone.
    pub fn is_toggle_neutral(&self) -> bool {
        self.toggle
            .as_ref()
            .is_some_and(|t| t.get() == ToggleState::Neutral)
    }

    /// Lock key held always-on or always-off.
    pub fn is_toggle_forced(&self) -> bool {
        self.toggle
            .as_ref()
            .is_some_and(|t| t.get() != ToggleState::Neutral)
    }

    fn reset_runtime(&mut self) {
        self.is_down = false;
        self.down_performed_action = false;
        self.just_used = JustUsed::None;
        self.caused_alt_down = false;
        self.caused_shift_down = false;
    }
}

/// Every key record plus the two global (modifiers, key) → hotkey tables.
#[derive(Debug, Clone)]
pub struct KeyTable {
    vk: Vec<KeyRecord>,
    sc: Vec<KeyRecord>,
    vk_combos: Vec<HotkeyId>,
    sc_combos: Vec<HotkeyId>,
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyTable {
    /// An empty table with modifier keys already marked as modifiers.
    pub fn new() -> Self {
        let mut vk = vec![KeyRecord::default(); VK_COUNT];
        for (code, record) in vk.iter_mut().enumerate() {
            record.as_modifiers = modifier_bits(code as Vk);
        }
        let mut sc = vec![KeyRecord::default(); SC_COUNT];
        for (code, record) in sc.iter_mut().enumerate() {
            record.as_modifiers = modifier_bits_for_sc(code as Sc);
        }
        Self {
            vk,
            sc,
            vk_combos: vec![HotkeyId::INVALID; 256 * VK_COUNT],
            sc_combos: vec![HotkeyId::INVALID; 256 * SC_COUNT],
        }
    }

    /// The record that speaks for an event: the scan-code record when it
    /// claims precedence, else the virtual-key record.
    pub fn authoritative(&self, vk: Vk, sc: Sc) -> KeyRef {
        match self.sc.get(sc as usize) {
            Some(record) if record.sc_takes_precedence => KeyRef::Sc(sc),
            _ => KeyRef::Vk(vk),
        }
    }

    pub fn get(&self, key: KeyRef) -> &KeyRecord {
        match key {
            KeyRef::Vk(vk) => &self.vk[vk as usize],
            KeyRef::Sc(sc) => &self.sc[(sc & SC_MAX) as usize],
        }
    }

    pub fn get_mut(&mut self, key: KeyRef) -> &mut KeyRecord {
        match key {
            KeyRef::Vk(vk) => &mut self.vk[vk as usize],
            KeyRef::Sc(sc) => &mut self.sc[(sc & SC_MAX) as usize],
        }
    }

    pub fn vk(&self, vk: Vk) -> &KeyRecord {
        &self.vk[vk as usize]
    }

    fn combo_index(mods: ModLR, key: KeyRef) -> (bool, usize) {
        match key {
            KeyRef::Vk(vk) => (false, mods.bits() as usize * VK_COUNT + vk as usize),
            KeyRef::Sc(sc) => (true, mods.bits() as usize * SC_COUNT + (sc & SC_MAX) as usize),
        }
    }

    pub fn combo(&self, mods: ModLR, key: KeyRef) -> HotkeyId {
        match Self::combo_index(mods, key) {
            (false, i) => self.vk_combos[i],
            (true, i) => self.sc_combos[i],
        }
    }

    pub fn set_combo(&mut self, mods: ModLR, key: KeyRef, id: HotkeyId) {
        match Self::combo_index(mods, key) {
            (false, i) => self.vk_combos[i] = id,
            (true, i) => self.sc_combos[i] = id,
        }
    }

    pub fn toggle_slot(&self, vk: Vk) -> Option<ToggleSlot> {
        self.vk[vk as usize].toggle.clone()
    }

    /// Clears down-state and prefix bookkeeping, keeping configuration.
    pub fn reset_runtime(&mut self) {
        self.vk
            .iter_mut()
            .chain(self.sc.iter_mut())
            .for_each(KeyRecord::reset_runtime);
    }
}
