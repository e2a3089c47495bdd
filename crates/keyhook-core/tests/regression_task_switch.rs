mod common;

use common::{combo, custom, Rig};
use keyhook_core::vk_map::{VK_LMENU, VK_MENU, VK_SHIFT, VK_TAB};
use keyhook_core::{Action, Disposition, ModLR};

const VK_A: u8 = 0x41;
const VK_J: u8 = 0x4A;
const VK_K: u8 = 0x4B;
const VK_M: u8 = 0x4D;
const VK_NUMPAD1: u8 = 0x61;

#[test]
fn prefix_cycles_menu_and_release_closes_it() {
    let mut rig = Rig::bindings(vec![
        custom(VK_A, VK_J, Action::AltTab),
        custom(VK_A, VK_K, Action::AltTabShift),
    ]);

    assert_eq!(rig.down(VK_A), Disposition::Suppress);
    assert_eq!(rig.down(VK_J), Disposition::Suppress);
    assert_eq!(
        rig.host.injected_edges(),
        vec![(VK_MENU, false), (VK_TAB, false), (VK_TAB, true)]
    );
    assert!(rig.ctx.keys().vk(VK_A).caused_alt_down);
    rig.replay();
    assert!(rig.ctx.menu_visible());

    assert_eq!(rig.up(VK_J), Disposition::Suppress);
    assert_eq!(rig.down(VK_J), Disposition::Suppress);
    // Alt is still down: only Tab this time.
    assert_eq!(rig.host.injected_edges(), vec![(VK_TAB, false), (VK_TAB, true)]);
    rig.replay();
    rig.up(VK_J);

    assert_eq!(rig.up(VK_A), Disposition::Suppress);
    assert_eq!(rig.host.injected_edges(), vec![(VK_MENU, true)]);
    assert!(rig.ctx.logical_modifiers().is_empty());
    rig.replay();
    assert!(!rig.ctx.menu_visible());
    assert!(rig.host.fired.is_empty());
}

#[test]
fn backward_cycle_holds_shift_for_the_prefix() {
    let mut rig = Rig::bindings(vec![custom(VK_A, VK_K, Action::AltTabShift)]);

    rig.down(VK_A);
    assert_eq!(rig.down(VK_K), Disposition::Suppress);
    let edges = rig.host.injected_edges();
    assert_eq!(edges[0], (VK_MENU, false));
    assert!(edges.contains(&(0x10, false)));
    assert!(rig.ctx.keys().vk(VK_A).caused_shift_down);
    rig.replay();

    rig.up(VK_K);
    rig.up(VK_A);
    assert_eq!(rig.host.injected_edges(), vec![(VK_MENU, true), (0x10, true)]);
}

#[test]
fn menu_hotkey_opens_then_dismisses() {
    let mut rig = Rig::bindings(vec![combo(ModLR::NONE, VK_M, Action::AltTabMenu)]);

    assert_eq!(rig.down(VK_M), Disposition::Suppress);
    assert_eq!(
        rig.host.injected_edges(),
        vec![(VK_MENU, false), (VK_TAB, false), (VK_TAB, true)]
    );
    assert!(rig.ctx.menu_visible());
    rig.replay();
    assert_eq!(rig.up(VK_M), Disposition::Suppress);

    // Alt is logically down now; the lookup still finds the binding.
    assert_eq!(rig.down(VK_M), Disposition::Suppress);
    assert_eq!(rig.host.injected_edges(), vec![(VK_LMENU, true)]);
    assert!(!rig.ctx.menu_visible());
    assert!(rig.ctx.logical_modifiers().is_empty());
}

#[test]
fn dismiss_without_menu_passes_key_through() {
    let mut rig = Rig::bindings(vec![combo(ModLR::NONE, VK_M, Action::AltTabMenuDismiss)]);

    assert_eq!(rig.down(VK_M), Disposition::Allow);
    assert!(rig.host.injected.is_empty());
    assert!(!rig.ctx.menu_visible());
}

#[test]
fn native_alt_tab_is_tracked() {
    let mut rig = Rig::bindings(vec![]);

    rig.down(VK_LMENU);
    rig.down(VK_TAB);
    assert!(rig.ctx.menu_visible());
    rig.up(VK_TAB);
    rig.up(VK_LMENU);
    assert!(!rig.ctx.menu_visible());
}

#[test]
fn show_or_cycle_opens_then_cycles_and_prefix_release_lets_go_of_alt() {
    let mut rig = Rig::bindings(vec![
        custom(VK_A, VK_J, Action::AltTabAndMenu),
        custom(VK_A, VK_K, Action::AltTab),
    ]);

    rig.down(VK_A);
    assert_eq!(rig.down(VK_J), Disposition::Suppress);
    assert!(rig.ctx.menu_visible());
    assert_eq!(
        rig.host.take_injected().len(),
        2,
        "one Alt-down and one Tab down-and-up"
    );
    rig.up(VK_J);

    assert_eq!(rig.down(VK_K), Disposition::Suppress);
    assert_eq!(rig.host.injected_edges(), vec![(VK_TAB, false), (VK_TAB, true)]);
    assert!(rig.ctx.logical_modifiers().intersects(ModLR::ALT));
    rig.host.take_injected();
    rig.up(VK_K);

    assert_eq!(rig.up(VK_A), Disposition::Suppress);
    assert_eq!(rig.host.injected_edges(), vec![(VK_MENU, true)]);
    // Nothing has reported the Alt release back yet.
    assert!(rig.ctx.menu_visible());
    assert_eq!(rig.ctx.active_prefix(), None);
}

#[test]
fn backward_cycle_on_numpad_key_releases_shift_each_press() {
    let mut rig = Rig::bindings(vec![custom(VK_A, VK_NUMPAD1, Action::AltTabShift)]);

    rig.down(VK_A);
    assert_eq!(rig.down(VK_NUMPAD1), Disposition::Suppress);
    assert_eq!(
        rig.host.injected_edges(),
        vec![(VK_MENU, false), (VK_SHIFT, false), (VK_TAB, false), (VK_TAB, true), (VK_SHIFT, true)]
    );
    assert!(!rig.ctx.keys().vk(VK_A).caused_shift_down);
    assert!(rig.ctx.keys().vk(VK_A).caused_alt_down);
    rig.replay();
    rig.up(VK_NUMPAD1);

    // Next press: Alt is still held, Shift goes down and up again.
    assert_eq!(rig.down(VK_NUMPAD1), Disposition::Suppress);
    assert_eq!(
        rig.host.injected_edges(),
        vec![(VK_SHIFT, false), (VK_TAB, false), (VK_TAB, true), (VK_SHIFT, true)]
    );
    assert!(!rig.ctx.keys().vk(VK_A).caused_shift_down);
}
