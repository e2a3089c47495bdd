#![allow(dead_code)]

use keyhook_core::{
    Action, Binding, BindingSet, Disposition, HookContext, InjectKind, KeySpec, KeyboardEvent,
    ModLR, Profile, QueuedHost, Trigger, Vk,
};

pub fn custom(prefix: Vk, suffix: Vk, action: Action) -> Binding {
    Binding {
        action,
        trigger: Trigger::Custom {
            prefix: KeySpec::Vk(prefix),
            suffix: KeySpec::Vk(suffix),
        },
        no_suppress: false,
    }
}

pub fn combo(modifiers: ModLR, key: Vk, action: Action) -> Binding {
    Binding {
        action,
        trigger: Trigger::Combo {
            modifiers,
            key: KeySpec::Vk(key),
        },
        no_suppress: false,
    }
}

/// A context plus a recording host, with a clock that advances 10ms per
/// event unless told otherwise.
pub struct Rig {
    pub ctx: HookContext,
    pub host: QueuedHost,
    pub now: u32,
}

impl Rig {
    pub fn new(set: BindingSet) -> Self {
        Self::with_host(set, QueuedHost::new())
    }

    pub fn with_host(set: BindingSet, host: QueuedHost) -> Self {
        let keys = set.compile().expect("bindings compile");
        Self {
            ctx: HookContext::new(Profile::default(), keys),
            host,
            now: 0,
        }
    }

    pub fn bindings(bindings: Vec<Binding>) -> Self {
        Self::new(BindingSet {
            bindings,
            ..Default::default()
        })
    }

    pub fn send(&mut self, event: KeyboardEvent) -> Disposition {
        self.ctx.on_keyboard(&event, &mut self.host)
    }

    pub fn down(&mut self, vk: Vk) -> Disposition {
        self.now += 10;
        self.send(KeyboardEvent::down(vk, 0x10, self.now))
    }

    pub fn up(&mut self, vk: Vk) -> Disposition {
        self.now += 10;
        self.send(KeyboardEvent::up(vk, 0x10, self.now))
    }

    pub fn down_at(&mut self, vk: Vk, sc: u16, at: u32) -> Disposition {
        self.now = at;
        self.send(KeyboardEvent::down(vk, sc, at))
    }

    pub fn up_at(&mut self, vk: Vk, sc: u16, at: u32) -> Disposition {
        self.now = at;
        self.send(KeyboardEvent::up(vk, sc, at))
    }

    /// Feeds everything the hook injected back through it, the way the
    /// system would deliver it, and returns those dispositions.
    pub fn replay(&mut self) -> Vec<Disposition> {
        let pending = self.host.take_injected();
        let mut out = Vec::new();
        for event in pending {
            let edges: &[bool] = match event.kind {
                InjectKind::Down => &[false],
                InjectKind::Up => &[true],
                InjectKind::DownAndUp => &[false, true],
            };
            for &up in edges {
                let mut ev = if up {
                    KeyboardEvent::up(event.vk, event.sc & 0xFF, self.now)
                } else {
                    KeyboardEvent::down(event.vk, event.sc & 0xFF, self.now)
                }
                .injected();
                ev.self_generated = true;
                if event.sc & 0x100 != 0 {
                    ev = ev.extended();
                }
                out.push(self.send(ev));
            }
        }
        out
    }
}
