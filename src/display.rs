use crate::mode::{ModeValue, ToggleState};
use crate::settings::{ChangeOutcome, SettingEntry};
use crate::toggle::ModeToggle;

/// Gets the display name for an entry with a state indicator
pub fn display_name(entry: &SettingEntry) -> String {
    if !entry.available {
        return format!("{} (unsupported)", entry.title);
    }
    match entry.checked {
        ToggleState::Enabled => format!("{} ●", entry.title),
        ToggleState::Disabled => format!("{} ○", entry.title),
    }
}

/// One line for `list` output: key, then the display name
pub fn entry_line(entry: &SettingEntry) -> String {
    format!("{:<20} {}", entry.key, display_name(entry))
}

/// Describes what the driver reports, including unrecognized raw values
pub fn describe_mode(toggle: &ModeToggle, mode: &ModeValue) -> String {
    match mode {
        ModeValue::Enabled => format!("{} is on ({})", toggle.name(), toggle.tokens().enabled()),
        ModeValue::Disabled => format!("{} is off ({})", toggle.name(), toggle.tokens().disabled()),
        ModeValue::Unrecognized(raw) if raw.is_empty() => {
            format!("{} is off (no readable value)", toggle.name())
        }
        ModeValue::Unrecognized(raw) => {
            format!("{} is off (unrecognized value {:?})", toggle.name(), raw)
        }
    }
}

pub fn describe_outcome(key: &str, outcome: &ChangeOutcome) -> String {
    if outcome.accepted() {
        format!("{} is now {}", key, outcome.observed)
    } else {
        format!(
            "{} is {} (driver did not accept {})",
            key, outcome.observed, outcome.requested
        )
    }
}
