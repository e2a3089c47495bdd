pub mod classifier;
pub mod config;
pub mod engine;
pub mod history;
pub mod host;
#[cfg(windows)]
pub mod keyboard_hook;
pub mod keys;
pub mod modifiers;
pub mod resolve;
mod source;
mod task_switch;
pub mod types;
pub mod vk_map;

pub use config::{Action, Binding, BindingSet, ConfigError, KeySpec, Profile, Trigger};
pub use engine::HookContext;
pub use history::{EventHistory, HistoryEntry};
pub use host::{HookNotification, Host, NotificationQueue, QueuedHost};
pub use keys::{HotkeyAction, HotkeyId, KeyRef, KeyTable};
pub use modifiers::ModLR;
pub use types::{
    Disposition, EventTag, InjectKind, KeyEdge, KeyboardEvent, MouseAction, MouseButton,
    MouseEvent, Sc, SyntheticEvent, ToggleState, Vk,
};
