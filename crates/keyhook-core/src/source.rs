//! What differs between the keyboard and mouse hooks. The state machine in
//! `engine` is written once against [`InputSource`].

use crate::engine::{HookContext, KeyInput};
use crate::host::Host;
use crate::keys::{KeyRecord, KeyRef, KeyTable};
use crate::modifiers::ModLR;
use crate::types::Disposition;

pub(crate) trait InputSource {
    /// Whether this source can put native events back (lock-key retoggle,
    /// no-suppress presses, Win/Alt disguise).
    const RESYNTHESIZES: bool;

    fn record_for(keys: &KeyTable, input: &KeyInput) -> KeyRef;

    /// Disposition of an auto-repeat of the active prefix.
    fn allows_held_prefix(record: &KeyRecord) -> bool;

    /// Whether a press of `this` counts as using the active `prefix`.
    fn marks_prefix_used(this: &KeyRecord, prefix: &KeyRecord) -> bool;

    /// Prefix keys whose own press must still reach the system.
    fn passes_natively(record: &KeyRecord) -> bool;

    fn may_suppress(record: &KeyRecord, logical: ModLR, prefix_active: bool) -> bool;

    fn allow<H: Host>(ctx: &mut HookContext, input: &mut KeyInput, host: &mut H, disguise: bool) -> Disposition;

    fn suppress<H: Host>(ctx: &mut HookContext, input: &mut KeyInput, host: &mut H) -> Disposition;
}

pub(crate) struct Keyboard;

impl InputSource for Keyboard {
    const RESYNTHESIZES: bool = true;

    fn record_for(keys: &KeyTable, input: &KeyInput) -> KeyRef {
        keys.authoritative(input.vk, input.sc)
    }

    fn allows_held_prefix(record: &KeyRecord) -> bool {
        record.is_modifier()
    }

    fn marks_prefix_used(this: &KeyRecord, _prefix: &KeyRecord) -> bool {
        !this.is_modifier()
    }

    fn passes_natively(record: &KeyRecord) -> bool {
        record.is_modifier() || record.is_toggle_neutral()
    }

    fn may_suppress(_record: &KeyRecord, _logical: ModLR, _prefix_active: bool) -> bool {
        true
    }

    fn allow<H: Host>(ctx: &mut HookContext, input: &mut KeyInput, host: &mut H, disguise: bool) -> Disposition {
        ctx.allow_key(input, host, disguise)
    }

    fn suppress<H: Host>(ctx: &mut HookContext, input: &mut KeyInput, host: &mut H) -> Disposition {
        ctx.suppress_key(input, host)
    }
}

pub(crate) struct Mouse;

impl InputSource for Mouse {
    const RESYNTHESIZES: bool = false;

    fn record_for(_keys: &KeyTable, input: &KeyInput) -> KeyRef {
        KeyRef::Vk(input.vk)
    }

    fn allows_held_prefix(_record: &KeyRecord) -> bool {
        false
    }

    // Only a modifier prefix counts as used by a click.
    fn marks_prefix_used(_this: &KeyRecord, prefix: &KeyRecord) -> bool {
        prefix.is_modifier()
    }

    fn passes_natively(_record: &KeyRecord) -> bool {
        false
    }

    fn may_suppress(record: &KeyRecord, logical: ModLR, prefix_active: bool) -> bool {
        !record.preserve_native_click || !logical.is_empty() || prefix_active
    }

    fn allow<H: Host>(_ctx: &mut HookContext, _input: &mut KeyInput, _host: &mut H, _disguise: bool) -> Disposition {
        Disposition::Allow
    }

    fn suppress<H: Host>(_ctx: &mut HookContext, input: &mut KeyInput, _host: &mut H) -> Disposition {
        input.mark_suppressed();
        Disposition::Suppress
    }
}
