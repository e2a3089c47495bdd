use crate::history::HistoryEntry;
use crate::types::{InjectKind, Sc, SyntheticEvent, Vk};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Everything the hook needs from the outside world while processing an event.
pub trait Host {
    /// Requests a synthetic key or button event.
    fn inject(&mut self, event: SyntheticEvent);

    /// Whether a lock key (CapsLock, NumLock, ScrollLock) is toggled on.
    fn is_toggled(&self, vk: Vk) -> bool;

    /// Fire-and-forget notification that a hotkey was identified.
    fn notify_hotkey(&mut self, id: u16, extra: bool);

    fn foreground_title(&self) -> String;

    /// Scan code for a virtual key, used when an event arrives without one.
    fn scan_code_for(&self, _vk: Vk) -> Sc {
        0
    }

    /// Called once per finished history entry.
    fn on_history(&mut self, _entry: &HistoryEntry) {}
}

/// Sent to whoever dispatches actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookNotification {
    Hotkey { id: u16, extra: bool },
    History(HistoryEntry),
}

/// Bounded outbound queue. Pushing never blocks: when nobody drains the
/// receiver and the queue is full, the notification is dropped.
#[derive(Debug)]
pub struct NotificationQueue {
    tx: Sender<HookNotification>,
    rx: Receiver<HookNotification>,
}

impl NotificationQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { tx, rx }
    }

    pub fn receiver(&self) -> Receiver<HookNotification> {
        self.rx.clone()
    }

    /// Returns false when the notification was dropped.
    pub fn push(&self, notification: HookNotification) -> bool {
        match self.tx.try_send(notification) {
            Ok(()) => true,
            Err(TrySendError::Full(dropped)) => {
                warn!(?dropped, "notification queue full, dropping");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// A host that records every request. Used by tests and benchmarks.
#[derive(Debug, Default)]
pub struct QueuedHost {
    pub injected: Vec<SyntheticEvent>,
    pub fired: Vec<(u16, bool)>,
    pub history: Vec<HistoryEntry>,
    pub toggled: HashSet<Vk>,
    pub scan_codes: HashMap<Vk, Sc>,
    pub title: String,
}

impl QueuedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_toggled(mut self, vk: Vk) -> Self {
        self.toggled.insert(vk);
        self
    }

    pub fn take_injected(&mut self) -> Vec<SyntheticEvent> {
        std::mem::take(&mut self.injected)
    }

    pub fn take_fired(&mut self) -> Vec<(u16, bool)> {
        std::mem::take(&mut self.fired)
    }

    /// Injected events flattened into (vk, up) pairs.
    pub fn injected_edges(&self) -> Vec<(Vk, bool)> {
        self.injected
            .iter()
            .flat_map(|e| match e.kind {
                InjectKind::Down => vec![(e.vk, false)],
                InjectKind::Up => vec![(e.vk, true)],
                InjectKind::DownAndUp => vec![(e.vk, false), (e.vk, true)],
            })
            .collect()
    }
}

impl Host for QueuedHost {
    fn inject(&mut self, event: SyntheticEvent) {
        self.injected.push(event);
    }

    fn is_toggled(&self, vk: Vk) -> bool {
        self.toggled.contains(&vk)
    }

    fn notify_hotkey(&mut self, id: u16, extra: bool) {
        self.fired.push((id, extra));
    }

    fn foreground_title(&self) -> String {
        self.title.clone()
    }

    fn scan_code_for(&self, vk: Vk) -> Sc {
        self.scan_codes.get(&vk).copied().unwrap_or(0)
    }

    fn on_history(&mut self, entry: &HistoryEntry) {
        self.history.push(entry.clone());
    }
}
