use crate::types::{Sc, Vk};

// Mouse buttons.
pub const VK_LBUTTON: Vk = 0x01;
pub const VK_RBUTTON: Vk = 0x02;
pub const VK_MBUTTON: Vk = 0x04;
pub const VK_XBUTTON1: Vk = 0x05;
pub const VK_XBUTTON2: Vk = 0x06;

pub const VK_TAB: Vk = 0x09;
pub const VK_CLEAR: Vk = 0x0C;

// Neutral modifiers. Injectors may send these instead of a side-specific code.
pub const VK_SHIFT: Vk = 0x10;
pub const VK_CONTROL: Vk = 0x11;
pub const VK_MENU: Vk = 0x12;

pub const VK_CAPITAL: Vk = 0x14;

pub const VK_PRIOR: Vk = 0x21;
pub const VK_NEXT: Vk = 0x22;
pub const VK_END: Vk = 0x23;
pub const VK_HOME: Vk = 0x24;
pub const VK_LEFT: Vk = 0x25;
pub const VK_UP: Vk = 0x26;
pub const VK_RIGHT: Vk = 0x27;
pub const VK_DOWN: Vk = 0x28;
pub const VK_INSERT: Vk = 0x2D;
pub const VK_DELETE: Vk = 0x2E;

pub const VK_L: Vk = 0x4C;

pub const VK_LWIN: Vk = 0x5B;
pub const VK_RWIN: Vk = 0x5C;

pub const VK_NUMPAD0: Vk = 0x60;
pub const VK_NUMPAD9: Vk = 0x69;
pub const VK_DECIMAL: Vk = 0x6E;

pub const VK_NUMLOCK: Vk = 0x90;
pub const VK_SCROLL: Vk = 0x91;

/// Pseudo keys used to report wheel rotation as key-down events.
pub const VK_WHEEL_DOWN: Vk = 0x9E;
pub const VK_WHEEL_UP: Vk = 0x9F;

pub const VK_LSHIFT: Vk = 0xA0;
pub const VK_RSHIFT: Vk = 0xA1;
pub const VK_LCONTROL: Vk = 0xA2;
pub const VK_RCONTROL: Vk = 0xA3;
pub const VK_LMENU: Vk = 0xA4;
pub const VK_RMENU: Vk = 0xA5;

/// Bit 9 of a scan code marks an extended key.
pub const SC_EXTENDED: Sc = 0x100;
pub const SC_MAX: Sc = 0x1FF;

pub const SC_LCONTROL: Sc = 0x01D;
pub const SC_RCONTROL: Sc = 0x11D;
pub const SC_LSHIFT: Sc = 0x02A;
pub const SC_RSHIFT: Sc = 0x136;
pub const SC_LALT: Sc = 0x038;
pub const SC_RALT: Sc = 0x138;

/// Number of dual-state numpad keys tracked by the shift workaround.
pub const PAD_TOTAL_COUNT: usize = 11;

/// Maps a key to its dual-state numpad slot, matching both the numlock-on
/// virtual key (`VK_NUMPAD1`) and the navigation code the driver reports
/// while shift is held (`VK_END`).
pub fn pad_slot(vk: Vk) -> Option<usize> {
    match vk {
        VK_DELETE | VK_DECIMAL => Some(0),
        VK_INSERT | 0x60 => Some(1),
        VK_END | 0x61 => Some(2),
        VK_DOWN | 0x62 => Some(3),
        VK_NEXT | 0x63 => Some(4),
        VK_LEFT | 0x64 => Some(5),
        VK_CLEAR | 0x65 => Some(6),
        VK_RIGHT | 0x66 => Some(7),
        VK_HOME | 0x67 => Some(8),
        VK_UP | 0x68 => Some(9),
        VK_PRIOR | 0x69 => Some(10),
        _ => None,
    }
}

/// True for the navigation codes a numpad key reports while shift temporarily
/// cancels numlock. Extended scan codes belong to the dedicated navigation
/// cluster and never qualify.
pub fn is_dual_state_numpad_key(vk: Vk, sc: Sc) -> bool {
    if sc & SC_EXTENDED != 0 {
        return false;
    }
    matches!(
        vk,
        VK_DELETE
            | VK_INSERT
            | VK_END
            | VK_DOWN
            | VK_NEXT
            | VK_LEFT
            | VK_CLEAR
            | VK_RIGHT
            | VK_HOME
            | VK_UP
            | VK_PRIOR
    )
}

/// Numpad digit or decimal as reported while numlock is on.
pub fn is_numpad_digit(vk: Vk) -> bool {
    (VK_NUMPAD0..=VK_NUMPAD9).contains(&vk) || vk == VK_DECIMAL
}

pub fn is_shift(vk: Vk) -> bool {
    matches!(vk, VK_SHIFT | VK_LSHIFT | VK_RSHIFT)
}

pub fn is_control(vk: Vk) -> bool {
    matches!(vk, VK_CONTROL | VK_LCONTROL | VK_RCONTROL)
}

pub fn is_alt(vk: Vk) -> bool {
    matches!(vk, VK_MENU | VK_LMENU | VK_RMENU)
}

pub fn is_win(vk: Vk) -> bool {
    matches!(vk, VK_LWIN | VK_RWIN)
}

/// Short display name used by diagnostics.
pub fn vk_name(vk: Vk) -> Option<&'static str> {
    match vk {
        VK_LBUTTON => Some("LButton"),
        VK_RBUTTON => Some("RButton"),
        VK_MBUTTON => Some("MButton"),
        VK_XBUTTON1 => Some("XButton1"),
        VK_XBUTTON2 => Some("XButton2"),
        VK_TAB => Some("Tab"),
        VK_CLEAR => Some("Clear"),
        VK_SHIFT => Some("Shift"),
        VK_CONTROL => Some("Ctrl"),
        VK_MENU => Some("Alt"),
        VK_CAPITAL => Some("CapsLock"),
        VK_PRIOR => Some("PgUp"),
        VK_NEXT => Some("PgDn"),
        VK_END => Some("End"),
        VK_HOME => Some("Home"),
        VK_LEFT => Some("Left"),
        VK_UP => Some("Up"),
        VK_RIGHT => Some("Right"),
        VK_DOWN => Some("Down"),
        VK_INSERT => Some("Insert"),
        VK_DELETE => Some("Delete"),
        VK_LWIN => Some("LWin"),
        VK_RWIN => Some("RWin"),
        VK_DECIMAL => Some("NumpadDot"),
        VK_NUMLOCK => Some("NumLock"),
        VK_SCROLL => Some("ScrollLock"),
        VK_WHEEL_DOWN => Some("WheelDown"),
        VK_WHEEL_UP => Some("WheelUp"),
        VK_LSHIFT => Some("LShift"),
        VK_RSHIFT => Some("RShift"),
        VK_LCONTROL => Some("LControl"),
        VK_RCONTROL => Some("RControl"),
        VK_LMENU => Some("LAlt"),
        VK_RMENU => Some("RAlt"),
        _ => None,
    }
}
