use crate::classifier::{Classifier, LookBack};
use crate::config::Profile;
use crate::history::EventHistory;
use crate::host::Host;
use crate::keys::{HotkeyAction, HotkeyId, KeyRef, KeyTable};
use crate::modifiers::{ModLR, ModifierState};
use crate::resolve;
use crate::source::{InputSource, Keyboard, Mouse};
use crate::types::{
    Disposition, EventTag, InjectKind, JustUsed, KeyEdge, KeyboardEvent, MouseAction, MouseEvent,
    Sc, SyntheticEvent, ToggleSlot, Vk,
};
use crate::vk_map::*;
use tracing::{debug, info, trace};

/// One event as the state machine sees it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KeyInput {
    pub vk: Vk,
    /// Normalised: 8-bit code plus `SC_EXTENDED`. Always 0 for the mouse.
    pub sc: Sc,
    pub up: bool,
    pub injected: bool,
    pub self_generated: bool,
    pub time: u32,
    pub tag: EventTag,
    slot: Option<usize>,
}

impl KeyInput {
    pub fn mark_suppressed(&mut self) {
        if self.tag == EventTag::Normal {
            self.tag = EventTag::Suppressed;
        }
    }
}

/// Win/Alt keys whose next release must be disguised because a hotkey fired
/// while only they were held.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct DisguiseNext {
    lwin: bool,
    rwin: bool,
    lalt: bool,
    ralt: bool,
}

/// All state of the hook. Constructed when the hooks are installed and
/// handed every event, one at a time.
pub struct HookContext {
    pub(crate) profile: Profile,
    pub(crate) keys: KeyTable,
    pub(crate) mods: ModifierState,
    pub(crate) classifier: Classifier,
    pub(crate) prefix: Option<KeyRef>,
    pub(crate) menu_visible: bool,
    pub(crate) disguise_next: DisguiseNext,
    pub(crate) history: EventHistory,
    pub(crate) last_physical_input: Option<u32>,
}

impl HookContext {
    pub fn new(profile: Profile, keys: KeyTable) -> Self {
        info!(
            history = profile.history_capacity,
            shift_window_ms = profile.shift_window_ms,
            "Hook context created"
        );
        Self {
            classifier: Classifier::new(profile.shift_window_ms),
            history: EventHistory::new(profile.history_capacity, profile.title_max_chars),
            profile,
            keys,
            mods: ModifierState::default(),
            prefix: None,
            menu_visible: false,
            disguise_next: DisguiseNext::default(),
            last_physical_input: None,
        }
    }

    /// Forgets everything learned from events, keeping configuration.
    pub fn reset_runtime_state(&mut self) {
        self.keys.reset_runtime();
        self.mods.clear();
        self.classifier.reset();
        self.prefix = None;
        self.menu_visible = false;
        self.disguise_next = DisguiseNext::default();
        self.history.clear();
        self.last_physical_input = None;
        info!("Hook context reset");
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn keys(&self) -> &KeyTable {
        &self.keys
    }

    pub fn logical_modifiers(&self) -> ModLR {
        self.mods.logical()
    }

    pub fn physical_modifiers(&self) -> ModLR {
        self.mods.physical()
    }

    pub fn is_physically_down(&self, vk: Vk) -> bool {
        self.mods.is_physically_down(vk)
    }

    pub fn is_key_down(&self, key: KeyRef) -> bool {
        self.keys.get(key).is_down
    }

    pub fn active_prefix(&self) -> Option<KeyRef> {
        self.prefix
    }

    pub fn menu_visible(&self) -> bool {
        self.menu_visible
    }

    pub fn history(&self) -> &EventHistory {
        &self.history
    }

    pub fn last_physical_input(&self) -> Option<u32> {
        self.last_physical_input
    }

    pub fn toggle_slot(&self, vk: Vk) -> Option<ToggleSlot> {
        self.keys.toggle_slot(vk)
    }

    pub fn on_keyboard<H: Host>(&mut self, event: &KeyboardEvent, host: &mut H) -> Disposition {
        let mut sc = event.scan_code;
        if event.vk != 0 && sc == 0 {
            sc = host.scan_code_for(event.vk);
        }
        sc &= 0xFF;
        if event.extended {
            sc |= SC_EXTENDED;
        }
        let mut input = self.begin(event.vk, sc, event.is_up(), event.injected, event.self_generated, event.time, host);
        let (vk, up) = (input.vk, input.up);

        if sc & SC_EXTENDED == 0 && host.is_toggled(VK_NUMLOCK) {
            self.classifier.track_pad_key(vk, sc, up);
        }

        // The native task switcher is up whenever Tab goes down under Alt without Ctrl.
        if vk == VK_TAB && !up && !self.menu_visible {
            let logical = self.mods.logical();
            if logical.intersects(ModLR::ALT) && !logical.intersects(ModLR::CONTROL) {
                self.menu_visible = true;
                debug!("Task-switch menu shown");
            }
        }

        let disposition = if input.self_generated {
            self.allow_key(&mut input, host, false)
        } else if self.take_deferred_disguise(&input) {
            self.allow_key(&mut input, host, true)
        } else {
            self.process::<Keyboard, H>(&mut input, host)
        };
        trace!(vk, key = vk_name(vk).unwrap_or("?"), sc, up, tag = %input.tag.as_char(), ?disposition, "keyboard");
        self.finish(&input, host);
        disposition
    }

    pub fn on_mouse<H: Host>(&mut self, event: &MouseEvent, host: &mut H) -> Disposition {
        if !event.injected {
            self.last_physical_input = Some(event.time);
        }
        let (vk, up) = match event.action {
            MouseAction::Move => return Disposition::Allow,
            // Wheel turns are reported as key-downs with no matching up.
            MouseAction::Wheel(delta) if delta < 0 => (VK_WHEEL_DOWN, false),
            MouseAction::Wheel(_) => (VK_WHEEL_UP, false),
            MouseAction::Button(button, edge) => (button.vk(), edge == KeyEdge::Up),
        };
        let mut input = self.begin(vk, 0, up, event.injected, event.self_generated, event.time, host);
        if !event.injected {
            self.mods.set_physical_key(vk, !up);
        }

        let disposition = if input.self_generated {
            Disposition::Allow
        } else {
            self.process::<Mouse, H>(&mut input, host)
        };
        trace!(key = vk_name(vk).unwrap_or("?"), up, tag = %input.tag.as_char(), ?disposition, "mouse");
        self.finish(&input, host);
        disposition
    }

    #[allow(clippy::too_many_arguments)]
    fn begin<H: Host>(
        &mut self,
        vk: Vk,
        sc: Sc,
        up: bool,
        injected: bool,
        self_generated: bool,
        time: u32,
        host: &mut H,
    ) -> KeyInput {
        let tag = if self_generated { EventTag::Ignored } else { EventTag::Normal };
        let slot = if self.history.is_enabled() {
            let title = host.foreground_title();
            self.history.record(vk, sc, up, tag, time, &title)
        } else {
            None
        };
        KeyInput {
            vk,
            sc,
            up,
            injected: injected || self_generated,
            self_generated,
            time,
            tag,
            slot,
        }
    }

    fn finish<H: Host>(&mut self, input: &KeyInput, host: &mut H) {
        if let Some(slot) = input.slot {
            self.history.set_tag(slot, input.tag);
            if let Some(entry) = self.history.get(slot) {
                host.on_history(entry);
            }
        }
    }

    /// Requests a synthetic event and applies its logical effect right away,
    /// so checks later in the same event see the modifiers as the system will.
    pub(crate) fn emit<H: Host>(&mut self, host: &mut H, kind: InjectKind, vk: Vk, sc: Sc) {
        host.inject(SyntheticEvent::new(kind, vk, sc));
        match kind {
            InjectKind::Down => self.mods.apply_logical(vk, sc, false),
            InjectKind::Up => self.mods.apply_logical(vk, sc, true),
            InjectKind::DownAndUp => {}
        }
    }

    /// Up, down, up: undoes the toggle a lock key's release would cause.
    fn retoggle<H: Host>(&mut self, host: &mut H, input: &KeyInput) {
        self.emit(host, InjectKind::Up, input.vk, input.sc);
        self.emit(host, InjectKind::Down, input.vk, input.sc);
        self.emit(host, InjectKind::Up, input.vk, input.sc);
    }

    /// Keyboard bookkeeping shared by every disposition: retroactive shift
    /// reclassification, then physical/logical state for this event.
    fn update_key_state(&mut self, input: &KeyInput, suppressed: bool) {
        let KeyInput { vk, sc, up, time, .. } = *input;
        if let LookBack::Rollback(snapshot) = self.classifier.look_back(vk, sc, up, time) {
            self.mods.restore(snapshot);
            debug!("Shift event reclassified as driver-generated");
        }
        self.classifier.save_snapshot(self.mods.snapshot());

        let physical = self.classifier.is_physical(vk, up, input.injected, time);
        if physical {
            self.last_physical_input = Some(time);
        }
        if self.keys.vk(vk).is_modifier() {
            self.mods.apply(vk, sc, up, suppressed, physical);
        } else if physical {
            self.mods.set_physical_key(vk, !up);
        }
        self.classifier.remember(vk, sc, up, physical, time);
    }

    pub(crate) fn allow_key<H: Host>(&mut self, input: &mut KeyInput, host: &mut H, disguise: bool) -> Disposition {
        if !input.self_generated && self.keys.vk(input.vk).is_toggle_forced() {
            return self.suppress_key(input, host);
        }
        self.update_key_state(input, false);

        if input.vk == VK_L && !input.up {
            let logical = self.mods.logical();
            if logical == ModLR::LWIN || logical == ModLR::RWIN || logical == ModLR::WIN {
                // Win+L locks the workstation; the releases are never seen.
                self.mods.reset_after_workstation_lock(input.vk);
                info!("Workstation lock: modifier state reset");
            }
        }

        if !self.keys.vk(input.vk).is_modifier() {
            return Disposition::Allow;
        }

        if self.menu_visible
            && is_alt(input.vk)
            && input.up
            && !matches!(input.tag, EventTag::Hotkey | EventTag::Suppressed)
        {
            self.menu_visible = false;
            debug!("Task-switch menu dismissed by Alt release");
        }

        if disguise && input.up && (is_win(input.vk) || is_alt(input.vk)) {
            if input.tag != EventTag::Hotkey {
                input.tag = EventTag::Suppressed;
            }
            return Disposition::AllowWithModifierDisguise;
        }
        Disposition::Allow
    }

    pub(crate) fn suppress_key<H: Host>(&mut self, input: &mut KeyInput, host: &mut H) -> Disposition {
        input.mark_suppressed();
        if input.vk == VK_NUMLOCK && !input.up && !input.self_generated {
            // The NumLock indicator toggles even when its events are swallowed.
            for kind in [InjectKind::Up, InjectKind::Down, InjectKind::Up, InjectKind::Down] {
                self.emit(host, kind, VK_NUMLOCK, 0);
            }
        }
        self.update_key_state(input, true);
        Disposition::Suppress
    }

    fn take_deferred_disguise(&mut self, input: &KeyInput) -> bool {
        if !input.up {
            return false;
        }
        let flag = match input.vk {
            VK_LWIN => &mut self.disguise_next.lwin,
            VK_RWIN => &mut self.disguise_next.rwin,
            VK_LMENU | VK_MENU => &mut self.disguise_next.lalt,
            VK_RMENU => &mut self.disguise_next.ralt,
            _ => return false,
        };
        std::mem::take(flag)
    }

    /// A hotkey fired while only Win (or only Alt) keys were held: their next
    /// release would otherwise open the Start menu or a menu bar.
    fn arm_deferred_disguise(&mut self) {
        let logical = self.mods.logical();
        if logical.without(ModLR::WIN).is_empty() {
            if logical.contains(ModLR::LWIN) && !self.keys.vk(VK_LWIN).used_as_prefix {
                self.disguise_next.lwin = true;
            }
            if logical.contains(ModLR::RWIN) && !self.keys.vk(VK_RWIN).used_as_prefix {
                self.disguise_next.rwin = true;
            }
        } else if logical.without(ModLR::ALT).is_empty() {
            if logical.contains(ModLR::LALT) && !self.keys.vk(VK_LMENU).used_as_prefix {
                self.disguise_next.lalt = true;
            }
            if logical.contains(ModLR::RALT) && !self.keys.vk(VK_RMENU).used_as_prefix {
                self.disguise_next.ralt = true;
            }
        }
    }

    fn may_suppress<S: InputSource>(&self, key: KeyRef) -> bool {
        S::may_suppress(self.keys.get(key), self.mods.logical(), self.prefix.is_some())
    }

    /// The prefix/suffix state machine.
    fn process<S: InputSource, H: Host>(&mut self, input: &mut KeyInput, host: &mut H) -> Disposition {
        let this = S::record_for(&self.keys, input);

        // Auto-repeat of the held prefix.
        if self.prefix == Some(this) && !input.up {
            return if S::allows_held_prefix(self.keys.get(this)) {
                S::allow(self, input, host, false)
            } else {
                S::suppress(self, input, host)
            };
        }

        if let Some(prefix) = self.prefix {
            if !input.up && S::marks_prefix_used(self.keys.get(this), self.keys.get(prefix)) {
                self.keys.get_mut(prefix).just_used = JustUsed::AsPrefix;
            }
        }

        let record = self.keys.get(this);
        if !record.used_as_prefix && !record.used_as_suffix {
            return S::allow(self, input, host, false);
        }
        let (used_as_prefix, used_as_suffix) = (record.used_as_prefix, record.used_as_suffix);

        // Read before reset: the up event needs to know what its down did.
        let record = self.keys.get_mut(this);
        let mut down_performed_action = false;
        let mut was_down_before_up = false;
        if input.up {
            was_down_before_up = record.is_down;
            down_performed_action = record.down_performed_action;
            record.down_performed_action = false;
        }
        record.is_down = !input.up;

        if used_as_prefix && !input.up && (self.prefix.is_none() || !used_as_suffix) {
            self.prefix = Some(this);
            let record = self.keys.get_mut(this);
            record.just_used = JustUsed::None;
            trace!(?this, "prefix down");
            return if S::passes_natively(record) {
                S::allow(self, input, host, false)
            } else {
                S::suppress(self, input, host)
            };
        }

        if used_as_suffix && self.prefix != Some(this) && input.up {
            return if down_performed_action && self.may_suppress::<S>(this) {
                S::suppress(self, input, host)
            } else {
                S::allow(self, input, host, false)
            };
        }

        if used_as_prefix && input.up {
            if let Some(disposition) = self.release_prefix::<S, H>(this, input, host, used_as_suffix, was_down_before_up) {
                return disposition;
            }
        }

        self.fire_suffix::<S, H>(this, input, host)
    }

    /// Release of a prefix key. `None` means continue as a suffix release.
    fn release_prefix<S: InputSource, H: Host>(
        &mut self,
        this: KeyRef,
        input: &mut KeyInput,
        host: &mut H,
        used_as_suffix: bool,
        was_down_before_up: bool,
    ) -> Option<Disposition> {
        if self.prefix == Some(this) {
            self.prefix = None;
        }
        let record = self.keys.get_mut(this);
        let caused_alt = std::mem::take(&mut record.caused_alt_down);
        let caused_shift = std::mem::take(&mut record.caused_shift_down);
        let just_used = record.just_used;
        let neutral_lock = record.is_toggle_neutral();
        let is_modifier = record.is_modifier();
        let passes_natively = S::passes_natively(record);

        if caused_alt {
            self.emit(host, InjectKind::Up, VK_MENU, 0);
        }
        if caused_shift {
            self.emit(host, InjectKind::Up, VK_SHIFT, 0);
        }

        if S::RESYNTHESIZES && neutral_lock {
            match just_used {
                JustUsed::AsPrefixForHotkey => {
                    self.retoggle(host, input);
                    return Some(S::suppress(self, input, host));
                }
                JustUsed::AsPrefix => return Some(S::allow(self, input, host, false)),
                JustUsed::None => {}
            }
        } else if just_used != JustUsed::None {
            if S::RESYNTHESIZES && is_modifier {
                let fired = just_used == JustUsed::AsPrefixForHotkey;
                return Some(S::allow(self, input, host, fired));
            }
            return Some(S::suppress(self, input, host));
        }

        if !used_as_suffix {
            return Some(if passes_natively {
                S::allow(self, input, host, false)
            } else {
                S::suppress(self, input, host)
            });
        }
        if !was_down_before_up {
            return Some(S::allow(self, input, host, false));
        }
        None
    }

    /// Suffix down, or prefix-and-suffix release: resolve and dispatch.
    fn fire_suffix<S: InputSource, H: Host>(&mut self, this: KeyRef, input: &mut KeyInput, host: &mut H) -> Disposition {
        let mut id = HotkeyId::INVALID;

        if self.prefix.is_some() && !input.up {
            if let Some(found) = resolve::prefix_override(&self.keys, this) {
                self.prefix = Some(found.prefix);
                self.keys.get_mut(found.prefix).just_used = JustUsed::AsPrefixForHotkey;
                id = found.id;
                if matches!(id.action(), HotkeyAction::AltTab | HotkeyAction::AltTabShift) {
                    return self.alt_tab_from_prefix::<S, H>(this, found.prefix, id, input, host);
                }
            }
        }

        if id.is_invalid() {
            let own = self.keys.get(this).as_modifiers;
            id = resolve::global(&self.keys, self.mods.logical(), own, this, self.menu_visible);
            if id.is_invalid() {
                if input.up && !S::passes_natively(self.keys.get(this)) {
                    return S::suppress(self, input, host);
                }
                return S::allow(self, input, host, false);
            }
        }

        self.arm_deferred_disguise();
        let no_suppress = id.no_suppress();

        match id.action() {
            HotkeyAction::Fire(value) => {
                let extra = !self.may_suppress::<S>(this);
                debug!(id = value, "hotkey fired");
                host.notify_hotkey(value, extra);
            }
            action => {
                if let Some(disposition) = self.task_switch::<S, H>(action, this, input, host) {
                    return disposition;
                }
            }
        }
        input.tag = EventTag::Hotkey;

        if S::RESYNTHESIZES && input.up {
            let record = self.keys.get(this);
            if record.used_as_prefix && record.is_toggle_neutral() {
                self.retoggle(host, input);
                return S::suppress(self, input, host);
            }
            if record.is_modifier() {
                return S::allow(self, input, host, true);
            }
        }

        if input.up {
            if S::RESYNTHESIZES && no_suppress {
                self.emit(host, InjectKind::Down, input.vk, input.sc);
                return S::allow(self, input, host, false);
            }
        } else {
            self.keys.get_mut(this).down_performed_action = true;
            if let Some(prefix) = self.prefix {
                self.keys.get_mut(prefix).just_used = JustUsed::AsPrefixForHotkey;
            }
            if S::RESYNTHESIZES && no_suppress {
                self.emit(host, InjectKind::DownAndUp, input.vk, input.sc);
            }
        }

        if self.may_suppress::<S>(this) {
            S::suppress(self, input, host)
        } else {
            S::allow(self, input, host, false)
        }
    }
}

lazy_static::lazy_static! {
    /// Context shared with the platform hook procedures.
    pub static ref HOOK_CONTEXT: parking_lot::Mutex<Option<HookContext>> = parking_lot::Mutex::new(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Action, Binding, BindingSet, KeySpec, Trigger};
    use crate::host::QueuedHost;
    use crate::types::{MouseButton, ToggleState};

    const VK_A: Vk = 0x41;
    const VK_B: Vk = 0x42;

    fn custom(prefix: Vk, suffix: Vk, action: Action) -> Binding {
        Binding {
            action,
            trigger: Trigger::Custom {
                prefix: KeySpec::Vk(prefix),
                suffix: KeySpec::Vk(suffix),
            },
            no_suppress: false,
        }
    }

    fn combo(modifiers: ModLR, key: Vk, action: Action) -> Binding {
        Binding {
            action,
            trigger: Trigger::Combo {
                modifiers,
                key: KeySpec::Vk(key),
            },
            no_suppress: false,
        }
    }

    fn context(bindings: Vec<Binding>) -> HookContext {
        let set = BindingSet {
            bindings,
            ..Default::default()
        };
        HookContext::new(Profile::default(), set.compile().unwrap())
    }

    fn key(ctx: &mut HookContext, host: &mut QueuedHost, vk: Vk, up: bool, time: u32) -> Disposition {
        let ev = if up { KeyboardEvent::up(vk, 0x10, time) } else { KeyboardEvent::down(vk, 0x10, time) };
        ctx.on_keyboard(&ev, host)
    }

    #[test]
    fn test_prefix_release_without_use_fires_its_own_action() {
        // "a & b" plus a plain "a": a alone fires on release.
        let mut ctx = context(vec![
            custom(VK_A, VK_B, Action::Hotkey(1)),
            combo(ModLR::NONE, VK_A, Action::Hotkey(2)),
        ]);
        let mut host = QueuedHost::new();

        assert_eq!(key(&mut ctx, &mut host, VK_A, false, 0), Disposition::Suppress);
        assert_eq!(key(&mut ctx, &mut host, VK_A, true, 10), Disposition::Suppress);
        assert_eq!(host.fired, vec![(2, false)]);
        assert_eq!(ctx.active_prefix(), None);
    }

    #[test]
    fn test_prefix_used_for_hotkey_does_not_fire_its_own_action() {
        let mut ctx = context(vec![
            custom(VK_A, VK_B, Action::Hotkey(1)),
            combo(ModLR::NONE, VK_A, Action::Hotkey(2)),
        ]);
        let mut host = QueuedHost::new();

        key(&mut ctx, &mut host, VK_A, false, 0);
        key(&mut ctx, &mut host, VK_B, false, 5);
        key(&mut ctx, &mut host, VK_B, true, 10);
        assert_eq!(key(&mut ctx, &mut host, VK_A, true, 15), Disposition::Suppress);
        assert_eq!(host.fired, vec![(1, false)]);
    }

    #[test]
    fn test_unrelated_key_marks_prefix_as_used() {
        let mut ctx = context(vec![custom(VK_A, VK_B, Action::Hotkey(1))]);
        let mut host = QueuedHost::new();

        key(&mut ctx, &mut host, VK_A, false, 0);
        assert_eq!(key(&mut ctx, &mut host, 0x43, false, 5), Disposition::Allow);
        assert_eq!(ctx.keys().vk(VK_A).just_used, JustUsed::AsPrefix);
        assert_eq!(key(&mut ctx, &mut host, VK_A, true, 10), Disposition::Suppress);
        assert!(host.fired.is_empty());
    }

    #[test]
    fn test_modifier_prefix_release_is_disguised_after_hotkey() {
        let mut ctx = context(vec![custom(VK_LWIN, VK_B, Action::Hotkey(9))]);
        let mut host = QueuedHost::new();

        assert_eq!(key(&mut ctx, &mut host, VK_LWIN, false, 0), Disposition::Allow);
        assert_eq!(key(&mut ctx, &mut host, VK_B, false, 5), Disposition::Suppress);
        assert_eq!(key(&mut ctx, &mut host, VK_B, true, 8), Disposition::Suppress);
        assert_eq!(
            key(&mut ctx, &mut host, VK_LWIN, true, 12),
            Disposition::AllowWithModifierDisguise
        );
        assert!(ctx.logical_modifiers().is_empty());
    }

    #[test]
    fn test_win_combo_arms_deferred_disguise() {
        let mut ctx = context(vec![combo(ModLR::LWIN, VK_B, Action::Hotkey(4))]);
        let mut host = QueuedHost::new();

        assert_eq!(key(&mut ctx, &mut host, VK_LWIN, false, 0), Disposition::Allow);
        assert_eq!(key(&mut ctx, &mut host, VK_B, false, 5), Disposition::Suppress);
        assert_eq!(host.fired, vec![(4, false)]);
        assert_eq!(key(&mut ctx, &mut host, VK_B, true, 8), Disposition::Suppress);
        assert_eq!(
            key(&mut ctx, &mut host, VK_LWIN, true, 12),
            Disposition::AllowWithModifierDisguise
        );
        // Only once.
        key(&mut ctx, &mut host, VK_LWIN, false, 20);
        assert_eq!(key(&mut ctx, &mut host, VK_LWIN, true, 25), Disposition::Allow);
    }

    #[test]
    fn test_no_suppress_down_resynthesizes_press() {
        let mut binding = combo(ModLR::NONE, VK_B, Action::Hotkey(3));
        binding.no_suppress = true;
        let mut ctx = context(vec![binding]);
        let mut host = QueuedHost::new();

        assert_eq!(key(&mut ctx, &mut host, VK_B, false, 0), Disposition::Suppress);
        assert_eq!(
            host.injected,
            vec![SyntheticEvent::new(InjectKind::DownAndUp, VK_B, 0x10)]
        );
        assert_eq!(host.fired, vec![(3, false)]);
    }

    #[test]
    fn test_forced_lock_key_is_suppressed() {
        let set = BindingSet {
            caps_lock: ToggleState::AlwaysOff,
            ..Default::default()
        };
        let mut ctx = HookContext::new(Profile::default(), set.compile().unwrap());
        let mut host = QueuedHost::new();

        assert_eq!(key(&mut ctx, &mut host, VK_CAPITAL, false, 0), Disposition::Suppress);
        ctx.toggle_slot(VK_CAPITAL).unwrap().set(ToggleState::Neutral);
        assert_eq!(key(&mut ctx, &mut host, VK_CAPITAL, true, 5), Disposition::Allow);
    }

    #[test]
    fn test_suppressed_numlock_down_restores_indicator() {
        let set = BindingSet {
            num_lock: ToggleState::AlwaysOn,
            ..Default::default()
        };
        let mut ctx = HookContext::new(Profile::default(), set.compile().unwrap());
        let mut host = QueuedHost::new();

        assert_eq!(key(&mut ctx, &mut host, VK_NUMLOCK, false, 0), Disposition::Suppress);
        assert_eq!(
            host.injected_edges(),
            vec![(VK_NUMLOCK, true), (VK_NUMLOCK, false), (VK_NUMLOCK, true), (VK_NUMLOCK, false)]
        );
    }

    #[test]
    fn test_win_l_resets_modifier_state() {
        let mut ctx = context(vec![]);
        let mut host = QueuedHost::new();

        key(&mut ctx, &mut host, VK_LWIN, false, 0);
        assert_eq!(ctx.logical_modifiers(), ModLR::LWIN);
        key(&mut ctx, &mut host, VK_L, false, 5);
        assert!(ctx.logical_modifiers().is_empty());
        assert!(ctx.physical_modifiers().is_empty());
        assert!(!ctx.is_physically_down(VK_LWIN));
    }

    #[test]
    fn test_self_generated_events_bypass_state_machine() {
        let mut ctx = context(vec![combo(ModLR::NONE, VK_B, Action::Hotkey(3))]);
        let mut host = QueuedHost::new();
        let mut ev = KeyboardEvent::down(VK_B, 0x30, 0).injected();
        ev.self_generated = true;

        assert_eq!(ctx.on_keyboard(&ev, &mut host), Disposition::Allow);
        assert!(host.fired.is_empty());
        assert_eq!(host.history[0].tag, EventTag::Ignored);
    }

    #[test]
    fn test_zero_scan_code_is_mapped_through_host() {
        let mut ctx = context(vec![]);
        let mut host = QueuedHost::new();
        host.scan_codes.insert(VK_A, 0x1E);

        ctx.on_keyboard(&KeyboardEvent::down(VK_A, 0, 0), &mut host);
        assert_eq!(host.history[0].sc, 0x1E);
    }

    #[test]
    fn test_preserved_click_passes_without_modifiers() {
        let set = BindingSet {
            bindings: vec![combo(ModLR::NONE, VK_MBUTTON, Action::Hotkey(11))],
            preserve_native_click: vec![VK_MBUTTON],
            ..Default::default()
        };
        let mut ctx = HookContext::new(Profile::default(), set.compile().unwrap());
        let mut host = QueuedHost::new();

        let down = MouseEvent::button(MouseButton::Middle, KeyEdge::Down, 0);
        let up = MouseEvent::button(MouseButton::Middle, KeyEdge::Up, 5);
        assert_eq!(ctx.on_mouse(&down, &mut host), Disposition::Allow);
        assert_eq!(ctx.on_mouse(&up, &mut host), Disposition::Allow);
        assert_eq!(host.fired, vec![(11, true)]);
    }

    #[test]
    fn test_wheel_is_reported_as_key_down() {
        let mut ctx = context(vec![combo(ModLR::LCONTROL, VK_WHEEL_DOWN, Action::Hotkey(12))]);
        let mut host = QueuedHost::new();

        key(&mut ctx, &mut host, VK_LCONTROL, false, 0);
        let wheel = MouseEvent {
            action: MouseAction::Wheel(-120),
            injected: false,
            self_generated: false,
            time: 5,
        };
        assert_eq!(ctx.on_mouse(&wheel, &mut host), Disposition::Suppress);
        assert_eq!(host.fired, vec![(12, false)]);
        assert_eq!(ctx.last_physical_input(), Some(5));
    }

    #[test]
    fn test_mouse_move_only_stamps_physical_time() {
        let mut ctx = context(vec![]);
        let mut host = QueuedHost::new();
        let moved = MouseEvent {
            action: MouseAction::Move,
            injected: false,
            self_generated: false,
            time: 77,
        };
        assert_eq!(ctx.on_mouse(&moved, &mut host), Disposition::Allow);
        assert_eq!(ctx.last_physical_input(), Some(77));
        assert!(ctx.history().is_empty());
    }

    #[test]
    fn test_reset_clears_runtime_state() {
        let mut ctx = context(vec![custom(VK_A, VK_B, Action::Hotkey(1))]);
        let mut host = QueuedHost::new();
        key(&mut ctx, &mut host, VK_A, false, 0);
        key(&mut ctx, &mut host, VK_LSHIFT, false, 5);

        ctx.reset_runtime_state();
        assert_eq!(ctx.active_prefix(), None);
        assert!(!ctx.is_key_down(KeyRef::Vk(VK_A)));
        assert!(ctx.logical_modifiers().is_empty());
        assert!(ctx.history().is_empty());
        assert!(ctx.keys().vk(VK_A).used_as_prefix);
    }
}
