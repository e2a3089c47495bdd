use crate::keys::{HotkeyId, KeyRef, KeyTable};
use crate::modifiers::ModLR;
use crate::types::{Sc, ToggleSlot, ToggleState, Vk};
use crate::vk_map::{SC_MAX, VK_CAPITAL, VK_NUMLOCK, VK_SCROLL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Runtime tunables of the hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// How long after a numpad key a shift event may still be a driver artifact.
    #[serde(default = "default_shift_window_ms")]
    pub shift_window_ms: u32,
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,
    #[serde(default)]
    pub mouse_hook: bool,
}

fn default_history_capacity() -> usize {
    40
}

fn default_shift_window_ms() -> u32 {
    22
}

fn default_title_max_chars() -> usize {
    100
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            shift_window_ms: default_shift_window_ms(),
            title_max_chars: default_title_max_chars(),
            mouse_hook: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySpec {
    Vk(Vk),
    Sc(Sc),
}

impl KeySpec {
    fn key_ref(self) -> KeyRef {
        match self {
            KeySpec::Vk(vk) => KeyRef::Vk(vk),
            KeySpec::Sc(sc) => KeyRef::Sc(sc),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Standard modifiers plus a key.
    Combo {
        #[serde(default)]
        modifiers: ModLR,
        key: KeySpec,
    },
    /// "prefix & suffix": any key held as a prefix for another.
    Custom { prefix: KeySpec, suffix: KeySpec },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Hotkey(u16),
    AltTab,
    AltTabShift,
    AltTabMenu,
    AltTabAndMenu,
    AltTabMenuDismiss,
}

impl Action {
    fn hotkey_id(self) -> Result<HotkeyId, ConfigError> {
        Ok(match self {
            Action::Hotkey(id) => HotkeyId::new(id).ok_or(ConfigError::HotkeyIdOutOfRange(id))?,
            Action::AltTab => HotkeyId::ALT_TAB,
            Action::AltTabShift => HotkeyId::ALT_TAB_SHIFT,
            Action::AltTabMenu => HotkeyId::ALT_TAB_MENU,
            Action::AltTabAndMenu => HotkeyId::ALT_TAB_AND_MENU,
            Action::AltTabMenuDismiss => HotkeyId::ALT_TAB_MENU_DISMISS,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub action: Action,
    pub trigger: Trigger,
    /// Let the key's native press through alongside the action.
    #[serde(default)]
    pub no_suppress: bool,
}

/// Everything needed to populate the key table before the hook starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingSet {
    pub bindings: Vec<Binding>,
    pub caps_lock: ToggleState,
    pub num_lock: ToggleState,
    pub scroll_lock: ToggleState,
    /// Mouse buttons (by virtual key) whose click should survive a hotkey
    /// unless modifiers or a prefix are held.
    pub preserve_native_click: Vec<Vk>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("binding {index}: key identity 0 cannot be bound")]
    ZeroKey { index: usize },
    #[error("binding {index}: scan code {sc:#x} is out of range")]
    ScanCodeOutOfRange { index: usize, sc: Sc },
    #[error("hotkey id {0} collides with the reserved range")]
    HotkeyIdOutOfRange(u16),
    #[error("binding {index} conflicts with an earlier binding for the same trigger")]
    Conflict { index: usize },
    #[error("binding {index}: a key cannot be its own prefix")]
    SelfPrefix { index: usize },
}

fn check_key(index: usize, key: KeySpec) -> Result<KeyRef, ConfigError> {
    match key {
        KeySpec::Vk(0) | KeySpec::Sc(0) => Err(ConfigError::ZeroKey { index }),
        KeySpec::Sc(sc) if sc > SC_MAX => Err(ConfigError::ScanCodeOutOfRange { index, sc }),
        spec => Ok(spec.key_ref()),
    }
}

impl BindingSet {
    /// Populates a fresh key table.
    pub fn compile(&self) -> Result<KeyTable, ConfigError> {
        let mut table = KeyTable::new();

        for (vk, state) in [
            (VK_CAPITAL, self.caps_lock),
            (VK_NUMLOCK, self.num_lock),
            (VK_SCROLL, self.scroll_lock),
        ] {
            table.get_mut(KeyRef::Vk(vk)).toggle = Some(ToggleSlot::new(state));
        }
        for &vk in &self.preserve_native_click {
            table.get_mut(KeyRef::Vk(vk)).preserve_native_click = true;
        }

        for (index, binding) in self.bindings.iter().enumerate() {
            let mut id = binding.action.hotkey_id()?;
            if binding.no_suppress {
                id = id.with_no_suppress();
            }
            match binding.trigger {
                Trigger::Combo { modifiers, key } => {
                    let key = check_key(index, key)?;
                    if !table.combo(modifiers, key).is_invalid() {
                        return Err(ConfigError::Conflict { index });
                    }
                    table.set_combo(modifiers, key, id);
                    mark(&mut table, key, |r| r.used_as_suffix = true);
                }
                Trigger::Custom { prefix, suffix } => {
                    let prefix = check_key(index, prefix)?;
                    let suffix = check_key(index, suffix)?;
                    if prefix == suffix {
                        return Err(ConfigError::SelfPrefix { index });
                    }
                    mark(&mut table, prefix, |r| r.used_as_prefix = true);
                    mark(&mut table, suffix, |r| r.used_as_suffix = true);
                    let record = table.get_mut(suffix);
                    let duplicate = match prefix {
                        KeyRef::Vk(vk) => {
                            let dup = record.prefix_vk.iter().any(|(p, _)| *p == vk);
                            record.prefix_vk.push((vk, id));
                            dup
                        }
                        KeyRef::Sc(sc) => {
                            let dup = record.prefix_sc.iter().any(|(p, _)| *p == sc);
                            record.prefix_sc.push((sc, id));
                            dup
                        }
                    };
                    if duplicate {
                        return Err(ConfigError::Conflict { index });
                    }
                }
            }
        }
        info!("Compiled {} bindings", self.bindings.len());
        Ok(table)
    }
}

/// Flags a record; scan-code records also claim precedence over the
/// virtual key the same physical key reports.
fn mark(table: &mut KeyTable, key: KeyRef, f: impl FnOnce(&mut crate::keys::KeyRecord)) {
    let record = table.get_mut(key);
    if let KeyRef::Sc(_) = key {
        record.sc_takes_precedence = true;
    }
    f(record);
}

pub fn load_profile(path: &Path) -> anyhow::Result<Profile> {
    let content = std::fs::read_to_string(path)?;
    let profile: Profile = serde_json::from_str(&content)?;
    info!("Loaded profile from {:?}", path);
    Ok(profile)
}

pub fn load_bindings(path: &Path) -> anyhow::Result<BindingSet> {
    let content = std::fs::read_to_string(path)?;
    let set: BindingSet = serde_json::from_str(&content)?;
    if set.bindings.is_empty() {
        warn!("No bindings in {:?}", path);
    }
    Ok(set)
}
