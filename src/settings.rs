use crate::attribute::AttributeStore;
use crate::config::Config;
use crate::mode::ToggleState;
use crate::notifier::Notifier;
use crate::toggle::{ModeToggle, ToggleError};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("unknown toggle '{0}'")]
    UnknownToggle(String),
    #[error(transparent)]
    Toggle(#[from] ToggleError),
}

/// What the settings screen shows for one toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingEntry {
    pub key: String,
    pub title: String,
    /// False when the attribute is missing; the entry is shown disabled
    pub available: bool,
    pub checked: ToggleState,
}

/// Result of a user-requested change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeOutcome {
    pub requested: ToggleState,
    pub observed: ToggleState,
}

impl ChangeOutcome {
    /// True when the driver ended up in the requested mode
    pub fn accepted(&self) -> bool {
        self.requested == self.observed
    }
}

struct Slot {
    title: String,
    toggle: ModeToggle,
    lock: Arc<Mutex<()>>,
}

/// The settings surface hosting every configured toggle.
///
/// Writers are serialized per attribute path, so toggles that share a path
/// also share a lock.
pub struct DeviceSettings {
    name: String,
    slots: Vec<Slot>,
}

impl DeviceSettings {
    pub fn new(
        config: &Config,
        store: Arc<dyn AttributeStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let mut locks: HashMap<PathBuf, Arc<Mutex<()>>> = HashMap::new();

        let slots = config
            .device
            .toggles
            .iter()
            .map(|spec| {
                let lock = locks.entry(spec.path.clone()).or_default().clone();
                Slot {
                    title: spec.title.clone(),
                    toggle: ModeToggle::from_spec(spec, store.clone(), notifier.clone()),
                    lock,
                }
            })
            .collect::<Vec<_>>();

        info!(
            "Device settings for '{}' with {} toggle(s)",
            config.device.name,
            slots.len()
        );

        Self {
            name: config.device.name.clone(),
            slots,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.toggle.name())
    }

    fn slot(&self, key: &str) -> Result<&Slot, SettingsError> {
        self.slots
            .iter()
            .find(|slot| slot.toggle.name() == key)
            .ok_or_else(|| SettingsError::UnknownToggle(key.to_string()))
    }

    pub fn toggle(&self, key: &str) -> Result<&ModeToggle, SettingsError> {
        self.slot(key).map(|slot| &slot.toggle)
    }

    fn entry_for(slot: &Slot) -> SettingEntry {
        let available = slot.toggle.is_supported();
        let checked = if available {
            slot.toggle.current_state()
        } else {
            ToggleState::Disabled
        };
        SettingEntry {
            key: slot.toggle.name().to_string(),
            title: slot.title.clone(),
            available,
            checked,
        }
    }

    pub fn entry(&self, key: &str) -> Result<SettingEntry, SettingsError> {
        self.slot(key).map(Self::entry_for)
    }

    /// All entries in configuration order, unsupported ones included
    pub fn entries(&self) -> Vec<SettingEntry> {
        self.slots.iter().map(Self::entry_for).collect()
    }

    /// Applies a change and reports what the driver actually did
    pub fn change(&self, key: &str, desired: bool) -> Result<ChangeOutcome, SettingsError> {
        let slot = self.slot(key)?;

        // A poisoned lock only means another writer panicked; the file is still authoritative
        let _guard = slot.lock.lock().unwrap_or_else(|e| e.into_inner());

        if !slot.toggle.is_supported() {
            debug!("Changing unsupported toggle '{}'", key);
        }

        let observed = slot.toggle.set_state(desired)?;
        let outcome = ChangeOutcome {
            requested: ToggleState::from(desired),
            observed,
        };

        if outcome.accepted() {
            info!("Toggle '{}' is now {}", key, observed);
        } else {
            warn!("Toggle '{}' stayed {} (requested {})", key, observed, outcome.requested);
        }
        Ok(outcome)
    }

    /// Observed state of every supported toggle
    pub fn snapshot(&self) -> BTreeMap<String, ToggleState> {
        self.slots
            .iter()
            .filter(|slot| slot.toggle.is_supported())
            .map(|slot| (slot.toggle.name().to_string(), slot.toggle.current_state()))
            .collect()
    }
}
