//! Drives the native task-switch menu with synthetic Alt/Tab/Shift events.

use crate::engine::{HookContext, KeyInput};
use crate::host::Host;
use crate::keys::{HotkeyAction, HotkeyId, KeyRef};
use crate::modifiers::ModLR;
use crate::source::InputSource;
use crate::types::{Disposition, EventTag, InjectKind, Vk};
use crate::vk_map::*;
use tracing::debug;

fn shift_side(logical: ModLR) -> Option<Vk> {
    if logical.contains(ModLR::LSHIFT) {
        Some(VK_LSHIFT)
    } else if logical.contains(ModLR::RSHIFT) {
        Some(VK_RSHIFT)
    } else {
        None
    }
}

fn control_side(logical: ModLR) -> Option<Vk> {
    if logical.contains(ModLR::LCONTROL) {
        Some(VK_LCONTROL)
    } else if logical.contains(ModLR::RCONTROL) {
        Some(VK_RCONTROL)
    } else {
        None
    }
}

impl HookContext {
    /// Menu and cycle actions reached through the global table (or a
    /// non-cycling prefix override). `None` means the action was carried out
    /// and the event is finished as a fired hotkey.
    pub(crate) fn task_switch<S: InputSource, H: Host>(
        &mut self,
        action: HotkeyAction,
        this: KeyRef,
        input: &mut KeyInput,
        host: &mut H,
    ) -> Option<Disposition> {
        match action {
            HotkeyAction::Fire(_) => return None,
            HotkeyAction::AltTabMenuDismiss if !self.menu_visible => {
                return Some(S::allow(self, input, host, false));
            }
            HotkeyAction::AltTabMenu | HotkeyAction::AltTabMenuDismiss => {
                if self.menu_visible {
                    self.dismiss_menu(this, input, host);
                } else {
                    self.open_menu(input, host);
                }
                return None;
            }
            HotkeyAction::AltTabAndMenu if !self.menu_visible => {
                self.open_menu(input, host);
                return None;
            }
            HotkeyAction::AltTabAndMenu | HotkeyAction::AltTab | HotkeyAction::AltTabShift => {}
        }

        if !self.menu_visible {
            return Some(S::allow(self, input, host, false));
        }
        self.cycle_menu(action == HotkeyAction::AltTabShift, input, host);
        None
    }

    fn dismiss_menu<H: Host>(&mut self, this: KeyRef, input: &KeyInput, host: &mut H) {
        let logical = self.mods.logical();
        let alt = if logical.contains(ModLR::LALT) {
            VK_LMENU
        } else if logical.contains(ModLR::RALT) {
            VK_RMENU
        } else {
            VK_MENU
        };
        self.emit(host, InjectKind::Up, alt, 0);
        // A modifier trigger is released once more so the foreground window
        // does not keep it as stuck.
        if self.keys.get(this).is_modifier() && !is_win(input.vk) {
            self.emit(host, InjectKind::Up, input.vk, 0);
        }
        self.menu_visible = false;
        debug!("Task-switch menu dismissed");
    }

    fn open_menu<H: Host>(&mut self, input: &KeyInput, host: &mut H) {
        let (vk, up) = (input.vk, input.up);
        let logical = self.mods.logical();

        // The current event is not in logical state yet.
        let shift = shift_side(logical).or((!up && is_shift(vk)).then_some(vk));
        let control = control_side(logical).or((!up && is_control(vk)).then_some(vk));
        let mut alt_down = logical.intersects(ModLR::ALT);
        if is_alt(vk) {
            alt_down = !up;
        }

        if let Some(shift) = shift {
            self.emit(host, InjectKind::Up, shift, 0);
        }
        // Control is never put back: it would close the menu again.
        if let Some(control) = control {
            self.emit(host, InjectKind::Up, control, 0);
        }
        if !alt_down {
            self.emit(host, InjectKind::Down, VK_MENU, 0);
            if let Some(prefix) = self.prefix {
                self.keys.get_mut(prefix).caused_alt_down = true;
            }
        }
        self.emit(host, InjectKind::DownAndUp, VK_TAB, 0);
        if let Some(shift) = shift {
            if !is_shift(vk) {
                self.emit(host, InjectKind::Down, shift, 0);
            }
        }
        self.menu_visible = true;
        debug!("Task-switch menu opened");
    }

    fn cycle_menu<H: Host>(&mut self, backward: bool, input: &KeyInput, host: &mut H) {
        let (vk, up) = (input.vk, input.up);
        if !up && (is_control(vk) || is_shift(vk)) {
            self.emit(host, InjectKind::Up, vk, 0);
        }
        if !self.mods.logical().intersects(ModLR::ALT) || (up && is_alt(vk)) {
            self.emit(host, InjectKind::Down, VK_MENU, 0);
        }
        let shift_put_down = backward && !self.mods.logical().intersects(ModLR::SHIFT);
        if shift_put_down {
            self.emit(host, InjectKind::Down, VK_SHIFT, 0);
        }
        self.emit(host, InjectKind::DownAndUp, VK_TAB, 0);
        if shift_put_down {
            self.emit(host, InjectKind::Up, VK_SHIFT, 0);
        }
        debug!(backward, "Task-switch menu cycled");
    }

    /// Cycling through a custom prefix. The prefix is recorded as the owner
    /// of the synthetic Alt (and Shift) so its release lets go of them.
    pub(crate) fn alt_tab_from_prefix<S: InputSource, H: Host>(
        &mut self,
        this: KeyRef,
        prefix: KeyRef,
        id: HotkeyId,
        input: &mut KeyInput,
        host: &mut H,
    ) -> Disposition {
        let (vk, sc) = (input.vk, input.sc);
        let backward = id.action() == HotkeyAction::AltTabShift;
        self.keys.get_mut(this).down_performed_action = true;

        if !self.mods.logical().intersects(ModLR::ALT) {
            self.emit(host, InjectKind::Down, VK_MENU, 0);
        }
        if S::RESYNTHESIZES && is_control(vk) {
            self.emit(host, InjectKind::Up, vk, sc);
        }
        self.keys.get_mut(prefix).caused_alt_down = true;

        if backward {
            if !self.mods.logical().intersects(ModLR::SHIFT) {
                self.emit(host, InjectKind::Down, VK_SHIFT, 0);
            }
            self.keys.get_mut(prefix).caused_shift_down = true;
        } else {
            // The menu reads shift state its own way; a held shift must go
            // up even when the suffix itself is the shift key.
            if S::RESYNTHESIZES && is_shift(vk) {
                self.emit(host, InjectKind::Up, vk, sc);
            }
            let logical = self.mods.logical();
            if logical.intersects(ModLR::SHIFT) {
                let side = if logical.contains(ModLR::RSHIFT) { VK_RSHIFT } else { VK_LSHIFT };
                self.emit(host, InjectKind::Up, side, 0);
            }
        }

        let logical = self.mods.logical();
        if logical.intersects(ModLR::CONTROL) {
            let side = if logical.contains(ModLR::RCONTROL) { VK_RCONTROL } else { VK_LCONTROL };
            self.emit(host, InjectKind::Up, side, 0);
        }
        self.emit(host, InjectKind::DownAndUp, VK_TAB, 0);

        // Held shift turns a numpad digit into its navigation key, which
        // would stop matching this binding on the next press.
        if backward && self.keys.get(prefix).caused_shift_down && is_numpad_digit(vk) {
            self.emit(host, InjectKind::Up, VK_SHIFT, 0);
            self.keys.get_mut(prefix).caused_shift_down = false;
        }

        debug!(backward, "Task-switch cycled from prefix");
        input.tag = EventTag::Hotkey;
        S::suppress(self, input, host)
    }
}
