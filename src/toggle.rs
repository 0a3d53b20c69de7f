use crate::attribute::AttributeStore;
use crate::config::ToggleSpec;
use crate::mode::{ModeTokens, ModeValue, ToggleState};
use crate::notifier::{Notification, Notifier};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("failed to write mode to {}: {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A single driver attribute exposed as a boolean switch.
///
/// Holds no state of its own: every query re-reads the attribute, so the
/// driver stays the source of truth. Callers sharing a toggle between threads
/// must serialize [`ModeToggle::set_state`] per attribute path.
pub struct ModeToggle {
    name: String,
    path: PathBuf,
    tokens: ModeTokens,
    notification: Option<Notification>,
    store: Arc<dyn AttributeStore>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for ModeToggle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeToggle")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("tokens", &self.tokens)
            .field("notification", &self.notification)
            .finish_non_exhaustive()
    }
}

impl ModeToggle {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        tokens: ModeTokens,
        store: Arc<dyn AttributeStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            tokens,
            notification: None,
            store,
            notifier,
        }
    }

    /// Shows `notification` while the toggle is observed enabled
    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }

    pub fn from_spec(
        spec: &ToggleSpec,
        store: Arc<dyn AttributeStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let toggle = Self::new(
            spec.key.clone(),
            spec.path.clone(),
            ModeTokens::new(spec.enabled_token.clone(), spec.disabled_token.clone()),
            store,
            notifier,
        );
        match &spec.notification {
            Some(n) => toggle.with_notification(n.into()),
            None => toggle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tokens(&self) -> &ModeTokens {
        &self.tokens
    }

    /// Returns whether the attribute file exists
    pub fn is_supported(&self) -> bool {
        self.store.exists(&self.path)
    }

    /// Reads and classifies the attribute; read errors count as unrecognized
    pub fn read_mode(&self) -> ModeValue {
        match self.store.read(&self.path) {
            Ok(raw) => {
                let mode = self.tokens.classify(&raw);
                if let ModeValue::Unrecognized(value) = &mode {
                    debug!("Unrecognized mode {:?} for '{}'", value, self.name);
                }
                mode
            }
            Err(e) => {
                debug!(
                    "Failed to read mode for '{}' from {}: {}",
                    self.name,
                    self.path.display(),
                    e
                );
                ModeValue::Unrecognized(String::new())
            }
        }
    }

    /// Current state as reported by the driver; never fails
    pub fn current_state(&self) -> ToggleState {
        let state = self.read_mode().state();
        debug!("Current state for '{}': {:?}", self.name, state);
        state
    }

    /// Requests `desired` and returns the state observed afterwards.
    ///
    /// `Ok` only means the write went through. The driver may still refuse
    /// the mode, so compare the returned state with `desired`.
    ///
    /// # Errors
    ///
    /// Returns [`ToggleError::WriteFailed`] if the attribute cannot be written.
    /// No notification changes are made in that case.
    pub fn set_state(&self, desired: bool) -> Result<ToggleState, ToggleError> {
        let line = self.tokens.line_for(desired);
        info!(
            "Setting '{}' to {} ({:?} -> {})",
            self.name,
            ToggleState::from(desired),
            line.trim_end(),
            self.path.display()
        );

        if let Err(source) = self.store.write(&self.path, &line) {
            error!("Failed to write mode for '{}': {}", self.name, source);
            return Err(ToggleError::WriteFailed {
                path: self.path.clone(),
                source,
            });
        }

        let observed = self.current_state();
        if observed != ToggleState::from(desired) {
            warn!(
                "Driver rejected mode change for '{}': requested {}, observed {}",
                self.name,
                ToggleState::from(desired),
                observed
            );
        }

        self.notify(observed);
        Ok(observed)
    }

    fn notify(&self, observed: ToggleState) {
        let Some(notification) = &self.notification else {
            return;
        };

        if let Err(e) = self.notifier.withdraw(notification.id) {
            warn!("Failed to withdraw notification for '{}': {:#}", self.name, e);
        }

        if observed.is_enabled() {
            if let Err(e) = self.notifier.post(notification) {
                warn!("Failed to post notification for '{}': {:#}", self.name, e);
            }
        }
    }
}
