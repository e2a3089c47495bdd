use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keyhook_core::{
    Action, Binding, BindingSet, HookContext, KeySpec, KeyboardEvent, ModLR, Profile, QueuedHost,
    Trigger,
};

fn binding(trigger: Trigger, id: u16) -> Binding {
    Binding {
        action: Action::Hotkey(id),
        trigger,
        no_suppress: false,
    }
}

fn make_context(history_capacity: usize) -> HookContext {
    let set = BindingSet {
        bindings: vec![
            binding(
                Trigger::Custom {
                    prefix: KeySpec::Vk(0x14), // CapsLock
                    suffix: KeySpec::Vk(0x4A), // J
                },
                1,
            ),
            binding(
                Trigger::Combo {
                    modifiers: ModLR::LCONTROL | ModLR::LALT,
                    key: KeySpec::Vk(0x4B), // K
                },
                2,
            ),
        ],
        ..Default::default()
    };
    let profile = Profile {
        history_capacity,
        ..Default::default()
    };
    HookContext::new(profile, set.compile().expect("failed to compile benchmark bindings"))
}

fn drain(host: &mut QueuedHost) {
    host.injected.clear();
    host.fired.clear();
    host.history.clear();
}

fn bench_undefined_passthrough(c: &mut Criterion) {
    let mut ctx = make_context(0);
    let mut host = QueuedHost::new();
    c.bench_function("hook/undefined_key_passthrough", |b| {
        b.iter(|| {
            black_box(ctx.on_keyboard(&KeyboardEvent::down(0x5A, 0x2C, 0), &mut host)); // Z down
            black_box(ctx.on_keyboard(&KeyboardEvent::up(0x5A, 0x2C, 5), &mut host)); // Z up
        });
    });
}

fn bench_prefix_suffix(c: &mut Criterion) {
    let mut ctx = make_context(0);
    let mut host = QueuedHost::new();
    c.bench_function("hook/caps_lock_prefix_suffix", |b| {
        b.iter(|| {
            black_box(ctx.on_keyboard(&KeyboardEvent::down(0x14, 0x3A, 0), &mut host)); // CapsLock down
            black_box(ctx.on_keyboard(&KeyboardEvent::down(0x4A, 0x24, 5), &mut host)); // J down
            black_box(ctx.on_keyboard(&KeyboardEvent::up(0x4A, 0x24, 10), &mut host)); // J up
            black_box(ctx.on_keyboard(&KeyboardEvent::up(0x14, 0x3A, 15), &mut host)); // CapsLock up
            drain(&mut host);
        });
    });
}

fn bench_modifier_combo_with_history(c: &mut Criterion) {
    let mut ctx = make_context(40);
    let mut host = QueuedHost::new();
    c.bench_function("hook/ctrl_alt_combo_with_history", |b| {
        b.iter(|| {
            black_box(ctx.on_keyboard(&KeyboardEvent::down(0xA2, 0x1D, 0), &mut host)); // LCtrl down
            black_box(ctx.on_keyboard(&KeyboardEvent::down(0xA4, 0x38, 5), &mut host)); // LAlt down
            black_box(ctx.on_keyboard(&KeyboardEvent::down(0x4B, 0x25, 10), &mut host)); // K down
            black_box(ctx.on_keyboard(&KeyboardEvent::up(0x4B, 0x25, 15), &mut host)); // K up
            black_box(ctx.on_keyboard(&KeyboardEvent::up(0xA4, 0x38, 20), &mut host)); // LAlt up
            black_box(ctx.on_keyboard(&KeyboardEvent::up(0xA2, 0x1D, 25), &mut host)); // LCtrl up
            drain(&mut host);
        });
    });
}

criterion_group!(
    benches,
    bench_undefined_passthrough,
    bench_prefix_suffix,
    bench_modifier_combo_with_history
);
criterion_main!(benches);
