use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Virtual key code (0..=255).
pub type Vk = u8;
/// Scan code with bit 9 (`0x100`) marking an extended key.
pub type Sc = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyEdge {
    Down,
    Up,
}

/// A raw low-level keyboard event as delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub vk: Vk,
    /// Raw 8-bit scan code. Zero means the sender did not provide one.
    pub scan_code: u16,
    pub extended: bool,
    pub edge: KeyEdge,
    /// Platform flag: generated by software rather than hardware.
    pub injected: bool,
    /// Carries this hook's own injection marker.
    pub self_generated: bool,
    /// Event timestamp in milliseconds (platform tick count, wraps).
    pub time: u32,
}

impl KeyboardEvent {
    pub fn down(vk: Vk, scan_code: u16, time: u32) -> Self {
        Self {
            vk,
            scan_code,
            extended: false,
            edge: KeyEdge::Down,
            injected: false,
            self_generated: false,
            time,
        }
    }

    pub fn up(vk: Vk, scan_code: u16, time: u32) -> Self {
        Self {
            edge: KeyEdge::Up,
            ..Self::down(vk, scan_code, time)
        }
    }

    pub fn extended(mut self) -> Self {
        self.extended = true;
        self
    }

    pub fn injected(mut self) -> Self {
        self.injected = true;
        self
    }

    pub fn is_up(&self) -> bool {
        self.edge == KeyEdge::Up
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    X1,
    X2,
}

impl MouseButton {
    pub fn vk(self) -> Vk {
        match self {
            MouseButton::Left => crate::vk_map::VK_LBUTTON,
            MouseButton::Right => crate::vk_map::VK_RBUTTON,
            MouseButton::Middle => crate::vk_map::VK_MBUTTON,
            MouseButton::X1 => crate::vk_map::VK_XBUTTON1,
            MouseButton::X2 => crate::vk_map::VK_XBUTTON2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Move,
    /// Wheel rotation; negative deltas turn toward the user.
    Wheel(i16),
    Button(MouseButton, KeyEdge),
}

/// A raw low-level mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    pub action: MouseAction,
    pub injected: bool,
    pub self_generated: bool,
    pub time: u32,
}

impl MouseEvent {
    pub fn button(button: MouseButton, edge: KeyEdge, time: u32) -> Self {
        Self {
            action: MouseAction::Button(button, edge),
            injected: false,
            self_generated: false,
            time,
        }
    }
}

/// What the hook tells the platform to do with the event it was handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Forward the event to the rest of the system.
    Allow,
    /// Swallow the event.
    Suppress,
    /// Replace the key-up with Shift-down, key-up, Shift-up so the Win/Alt
    /// release does not open the Start menu or a menu bar.
    AllowWithModifierDisguise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectKind {
    Down,
    Up,
    DownAndUp,
}

/// One synthetic input request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntheticEvent {
    pub kind: InjectKind,
    pub vk: Vk,
    /// Zero lets the injector derive the scan code from `vk`.
    pub sc: Sc,
}

impl SyntheticEvent {
    pub const fn new(kind: InjectKind, vk: Vk, sc: Sc) -> Self {
        Self { kind, vk, sc }
    }

    /// The sequence that stands in for a disguised Win/Alt release.
    pub fn disguised_release(vk: Vk, sc: Sc) -> [SyntheticEvent; 3] {
        [
            SyntheticEvent::new(InjectKind::Down, crate::vk_map::VK_SHIFT, 0),
            SyntheticEvent::new(InjectKind::Up, vk, sc),
            SyntheticEvent::new(InjectKind::Up, crate::vk_map::VK_SHIFT, 0),
        ]
    }
}

/// Single-character classification kept in the event history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EventTag {
    #[default]
    Normal,
    /// Self-generated, passed through without evaluation.
    Ignored,
    Suppressed,
    /// Fired a hotkey.
    Hotkey,
}

impl EventTag {
    pub fn as_char(self) -> char {
        match self {
            EventTag::Normal => ' ',
            EventTag::Ignored => 'i',
            EventTag::Suppressed => 's',
            EventTag::Hotkey => 'h',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustUsed {
    #[default]
    None,
    /// Another key was pressed while this prefix was held.
    AsPrefix,
    /// A hotkey fired while this prefix was held.
    AsPrefixForHotkey,
}

/// Forced state of a lock key (CapsLock, NumLock, ScrollLock).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
    #[default]
    Neutral,
    AlwaysOn,
    AlwaysOff,
}

impl ToggleState {
    fn to_raw(self) -> u8 {
        match self {
            ToggleState::Neutral => 0,
            ToggleState::AlwaysOn => 1,
            ToggleState::AlwaysOff => 2,
        }
    }

    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => ToggleState::AlwaysOn,
            2 => ToggleState::AlwaysOff,
            _ => ToggleState::Neutral,
        }
    }
}

/// Shared, externally writable toggle setting for one lock key.
#[derive(Debug, Clone, Default)]
pub struct ToggleSlot(Arc<AtomicU8>);

impl ToggleSlot {
    pub fn new(state: ToggleState) -> Self {
        Self(Arc::new(AtomicU8::new(state.to_raw())))
    }

    pub fn get(&self) -> ToggleState {
        ToggleState::from_raw(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, state: ToggleState) {
        self.0.store(state.to_raw(), Ordering::Relaxed);
    }
}
