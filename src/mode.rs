use crate::attribute::trim_value;
use std::fmt;

/// Observed state of a hardware toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleState {
    Enabled,
    Disabled,
}

impl ToggleState {
    pub fn is_enabled(self) -> bool {
        matches!(self, ToggleState::Enabled)
    }
}

impl From<bool> for ToggleState {
    fn from(enabled: bool) -> Self {
        if enabled {
            ToggleState::Enabled
        } else {
            ToggleState::Disabled
        }
    }
}

impl From<ToggleState> for bool {
    fn from(state: ToggleState) -> Self {
        state.is_enabled()
    }
}

impl fmt::Display for ToggleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToggleState::Enabled => f.write_str("on"),
            ToggleState::Disabled => f.write_str("off"),
        }
    }
}

/// Classification of the value read from an attribute file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeValue {
    Enabled,
    Disabled,
    /// Anything outside the known token pair, kept for diagnostics
    Unrecognized(String),
}

impl ModeValue {
    /// Unrecognized content never counts as enabled
    pub fn state(&self) -> ToggleState {
        match self {
            ModeValue::Enabled => ToggleState::Enabled,
            ModeValue::Disabled | ModeValue::Unrecognized(_) => ToggleState::Disabled,
        }
    }
}

/// The two tokens a driver accepts for one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeTokens {
    enabled: String,
    disabled: String,
}

impl ModeTokens {
    pub fn new(enabled: impl Into<String>, disabled: impl Into<String>) -> Self {
        Self {
            enabled: enabled.into(),
            disabled: disabled.into(),
        }
    }

    pub fn enabled(&self) -> &str {
        &self.enabled
    }

    pub fn disabled(&self) -> &str {
        &self.disabled
    }

    /// Exact match of the raw file contents (trailing newline removed)
    pub fn classify(&self, raw: &str) -> ModeValue {
        let value = trim_value(raw);
        if value == self.enabled {
            ModeValue::Enabled
        } else if value == self.disabled {
            ModeValue::Disabled
        } else {
            ModeValue::Unrecognized(value.to_string())
        }
    }

    /// Line written to the attribute file to request `desired`
    pub fn line_for(&self, desired: bool) -> String {
        let token = if desired { &self.enabled } else { &self.disabled };
        format!("{}\n", token)
    }
}
