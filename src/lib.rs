pub mod attribute;
pub mod config;
pub mod display;
pub mod mode;
pub mod notifier;
pub mod settings;
pub mod toggle;
pub mod watch;

#[cfg(test)]
pub mod testing;

pub use attribute::{AttributeStore, SysfsStore};
pub use config::{
    load_config, load_config_from, Config, NotificationSpec, NotifierConfig, ToggleSpec,
};
pub use display::{describe_mode, describe_outcome, display_name, entry_line};
pub use mode::{ModeTokens, ModeValue, ToggleState};
pub use notifier::{CommandNotifier, LogNotifier, Notification, Notifier};
pub use settings::{ChangeOutcome, DeviceSettings, SettingEntry, SettingsError};
pub use toggle::{ModeToggle, ToggleError};
