use crate::types::{EventTag, Sc, Vk};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub vk: Vk,
    pub sc: Sc,
    pub up: bool,
    pub tag: EventTag,
    /// Milliseconds since the previous entry.
    pub elapsed_ms: u32,
    pub window_title: String,
}

/// Fixed-capacity ring of recent events, for diagnostics.
#[derive(Debug, Clone)]
pub struct EventHistory {
    entries: Vec<HistoryEntry>,
    next: usize,
    len: usize,
    title_max_chars: usize,
    last_time: Option<u32>,
}

impl EventHistory {
    pub fn new(capacity: usize, title_max_chars: usize) -> Self {
        Self {
            entries: vec![HistoryEntry::default(); capacity],
            next: 0,
            len: 0,
            title_max_chars,
            last_time: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends an entry over the oldest slot and returns the slot index.
    pub fn record(&mut self, vk: Vk, sc: Sc, up: bool, tag: EventTag, time: u32, title: &str) -> Option<usize> {
        if !self.is_enabled() {
            return None;
        }
        let elapsed_ms = self.last_time.map_or(0, |prev| time.wrapping_sub(prev));
        self.last_time = Some(time);

        let slot = self.next;
        let entry = &mut self.entries[slot];
        entry.vk = vk;
        entry.sc = sc;
        entry.up = up;
        entry.tag = tag;
        entry.elapsed_ms = elapsed_ms;
        entry.window_title.clear();
        entry.window_title.extend(title.chars().take(self.title_max_chars));

        self.next = (self.next + 1) % self.entries.len();
        self.len = (self.len + 1).min(self.entries.len());
        Some(slot)
    }

    pub fn get(&self, slot: usize) -> Option<&HistoryEntry> {
        self.entries.get(slot)
    }

    pub fn tag(&self, slot: usize) -> Option<EventTag> {
        self.entries.get(slot).map(|e| e.tag)
    }

    pub fn set_tag(&mut self, slot: usize, tag: EventTag) {
        if let Some(entry) = self.entries.get_mut(slot) {
            entry.tag = tag;
        }
    }

    /// Recorded entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        let cap = self.entries.len();
        let start = if self.len < cap { 0 } else { self.next };
        (0..self.len).map(move |i| &self.entries[(start + i) % cap])
    }

    pub fn clear(&mut self) {
        let capacity = self.entries.len();
        *self = Self::new(capacity, self.title_max_chars);
    }
}
