//! Hotkey lookup: per-key prefix overrides first, then the global
//! (modifiers, key) tables.

use crate::keys::{HotkeyId, KeyRef, KeyTable};
use crate::modifiers::ModLR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixMatch {
    /// The held key that completed the combination.
    pub prefix: KeyRef,
    pub id: HotkeyId,
}

/// First override on `suffix` whose prefix key is currently down, checking
/// virtual-key prefixes before scan-code prefixes.
pub fn prefix_override(keys: &KeyTable, suffix: KeyRef) -> Option<PrefixMatch> {
    let record = keys.get(suffix);
    record
        .prefix_vk
        .iter()
        .map(|&(vk, id)| (KeyRef::Vk(vk), id))
        .chain(record.prefix_sc.iter().map(|&(sc, id)| (KeyRef::Sc(sc), id)))
        .find(|&(prefix, _)| keys.get(prefix).is_down)
        .map(|(prefix, id)| PrefixMatch { prefix, id })
}

/// Looks up `key` under the logical modifiers minus the key's own bits.
/// While the task-switch menu is up, a miss is retried without Alt so that
/// letting go of Alt does not break navigation.
pub fn global(keys: &KeyTable, logical: ModLR, own: ModLR, key: KeyRef, menu_visible: bool) -> HotkeyId {
    let mods = logical.without(own);
    let id = keys.combo(mods, key);
    if id.is_invalid() && menu_visible {
        return keys.combo(mods.without(ModLR::ALT), key);
    }
    id
}
