use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// Embed parts.yaml at compile time as the default device description
const EMBEDDED_CONFIG: &str = include_str!("../parts.yaml");

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub device: Device,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Device {
    pub name: String,
    #[serde(default)]
    pub notifier: NotifierConfig,
    pub toggles: Vec<ToggleSpec>,
}

/// One hardware attribute exposed as a boolean switch
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToggleSpec {
    pub key: String,
    pub title: String,
    pub path: PathBuf,
    pub enabled_token: String,
    pub disabled_token: String,
    #[serde(default)]
    pub notification: Option<NotificationSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationSpec {
    pub id: u32,
    pub title: String,
    pub body: String,
    #[serde(default = "default_tap_target")]
    pub tap_target: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierConfig {
    /// Notifications only go to the log
    #[default]
    Log,
    /// External program invoked for post and withdraw
    Command {
        post_command: String,
        #[serde(default)]
        post_args: Vec<String>,
        withdraw_command: String,
        #[serde(default)]
        withdraw_args: Vec<String>,
    },
}

fn default_tap_target() -> String {
    "device_settings".to_string()
}

pub fn load_config() -> Result<Config> {
    tracing::info!("Using embedded configuration");
    parse_config(EMBEDDED_CONFIG)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    tracing::info!("Loading configuration from {}", path.display());
    let yaml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&yaml).with_context(|| format!("Invalid configuration in {}", path.display()))
}

pub fn parse_config(yaml: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let mut keys = HashSet::new();
        let mut ids = HashSet::new();

        for toggle in &self.device.toggles {
            if toggle.key.trim().is_empty() {
                bail!("Toggle with empty key (title '{}')", toggle.title);
            }
            if !keys.insert(toggle.key.as_str()) {
                bail!("Duplicate toggle key '{}'", toggle.key);
            }
            for token in [&toggle.enabled_token, &toggle.disabled_token] {
                if token.is_empty() || token.chars().any(char::is_whitespace) {
                    bail!("Toggle '{}' has an invalid mode token {:?}", toggle.key, token);
                }
            }
            if toggle.enabled_token == toggle.disabled_token {
                bail!(
                    "Toggle '{}' uses the same token '{}' for both modes",
                    toggle.key,
                    toggle.enabled_token
                );
            }
            if let Some(notification) = &toggle.notification {
                if !ids.insert(notification.id) {
                    bail!(
                        "Notification id {} of toggle '{}' is already in use",
                        notification.id,
                        toggle.key
                    );
                }
            }
        }

        Ok(())
    }
}
