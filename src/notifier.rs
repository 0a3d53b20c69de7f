use crate::config::{NotificationSpec, NotifierConfig};
use anyhow::{bail, Context, Result};
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{debug, info};

/// A status notification shown while a toggle is enabled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u32,
    pub title: String,
    pub body: String,
    /// Where tapping the notification should lead (the settings surface)
    pub tap_target: String,
}

impl From<&NotificationSpec> for Notification {
    fn from(spec: &NotificationSpec) -> Self {
        Self {
            id: spec.id,
            title: spec.title.clone(),
            body: spec.body.clone(),
            tap_target: spec.tap_target.clone(),
        }
    }
}

/// Posts and withdraws notifications on behalf of toggles
pub trait Notifier: Send + Sync {
    fn post(&self, notification: &Notification) -> Result<()>;

    /// Withdrawing an id that is not shown is a no-op
    fn withdraw(&self, id: u32) -> Result<()>;
}

/// Writes notifications to the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn post(&self, notification: &Notification) -> Result<()> {
        info!(
            "NOTIFY [{}]: {} - {} (tap: {})",
            notification.id, notification.title, notification.body, notification.tap_target
        );
        Ok(())
    }

    fn withdraw(&self, id: u32) -> Result<()> {
        debug!("NOTIFY [{}]: withdrawn", id);
        Ok(())
    }
}

/// Runs external programs to post and withdraw notifications.
///
/// Arguments may contain `{id}`, `{title}`, `{body}` and `{target}`
/// placeholders. On Android the post side is typically
/// `cmd notification post`.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    post_command: String,
    post_args: Vec<String>,
    withdraw_command: String,
    withdraw_args: Vec<String>,
}

impl CommandNotifier {
    pub fn new(
        post_command: impl Into<String>,
        post_args: Vec<String>,
        withdraw_command: impl Into<String>,
        withdraw_args: Vec<String>,
    ) -> Self {
        Self {
            post_command: post_command.into(),
            post_args,
            withdraw_command: withdraw_command.into(),
            withdraw_args,
        }
    }

    fn run(command: &str, args: &[String]) -> Result<()> {
        debug!("Executing notifier command: {} {:?}", command, args);

        let output = Command::new(command)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("Failed to execute {}", command))?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} exited with code {}: {}", command, code, stderr.trim());
        }
        Ok(())
    }
}

impl Notifier for CommandNotifier {
    fn post(&self, notification: &Notification) -> Result<()> {
        let args = substitute(&self.post_args, notification.id, Some(notification));
        Self::run(&self.post_command, &args)
    }

    fn withdraw(&self, id: u32) -> Result<()> {
        let args = substitute(&self.withdraw_args, id, None);
        Self::run(&self.withdraw_command, &args)
    }
}

fn substitute(args: &[String], id: u32, notification: Option<&Notification>) -> Vec<String> {
    let id = id.to_string();
    args.iter()
        .map(|arg| expand(arg, &id, notification))
        .collect()
}

/// Expands placeholders in one pass; substituted text is never expanded again
fn expand(arg: &str, id: &str, notification: Option<&Notification>) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let Some(end) = tail.find('}') else {
            rest = tail;
            break;
        };
        let value = match (&tail[1..end], notification) {
            ("id", _) => Some(id),
            ("title", Some(n)) => Some(n.title.as_str()),
            ("body", Some(n)) => Some(n.body.as_str()),
            ("target", Some(n)) => Some(n.tap_target.as_str()),
            _ => None,
        };

        match value {
            Some(value) => {
                out.push_str(value);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Builds the notifier described by the configuration
pub fn from_config(config: &NotifierConfig) -> Arc<dyn Notifier> {
    match config {
        NotifierConfig::Log => Arc::new(LogNotifier),
        NotifierConfig::Command {
            post_command,
            post_args,
            withdraw_command,
            withdraw_args,
        } => Arc::new(CommandNotifier::new(
            post_command.clone(),
            post_args.clone(),
            withdraw_command.clone(),
            withdraw_args.clone(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn otg_notification() -> Notification {
        Notification {
            id: 1,
            title: "USB OTG enabled".to_string(),
            body: "Touch to configure".to_string(),
            tap_target: "device_settings".to_string(),
        }
    }

    #[test]
    fn test_substitute_placeholders() {
        let args = vec![
            "-t".to_string(),
            "{title}".to_string(),
            "parts_{id}".to_string(),
            "{body} ({target})".to_string(),
        ];
        let out = substitute(&args, 1, Some(&otg_notification()));
        assert_eq!(
            out,
            vec!["-t", "USB OTG enabled", "parts_1", "Touch to configure (device_settings)"]
        );
    }

    #[test]
    fn test_substitute_withdraw_only_replaces_id() {
        let args = vec!["cancel".to_string(), "{id}".to_string(), "{title}".to_string()];
        assert_eq!(substitute(&args, 9, None), vec!["cancel", "9", "{title}"]);
    }

    #[test]
    fn test_substituted_text_is_not_expanded_again() {
        let notification = Notification {
            id: 2,
            title: "Mode {body} at {target}".to_string(),
            body: "{id}".to_string(),
            tap_target: "settings".to_string(),
        };
        let args = vec![
            "{title}|{body}".to_string(),
            "{{id}}".to_string(),
            "id={id} {open".to_string(),
        ];

        assert_eq!(
            substitute(&args, 2, Some(&notification)),
            vec!["Mode {body} at {target}|{id}", "{2}", "id=2 {open"]
        );
    }

    #[test]
    fn test_log_notifier_never_fails() {
        assert!(LogNotifier.post(&otg_notification()).is_ok());
        assert!(LogNotifier.withdraw(1).is_ok());
    }

    #[test]
    fn test_command_notifier_success() {
        let notifier = CommandNotifier::new(
            "echo",
            vec!["{title}".to_string()],
            "true",
            vec![],
        );
        assert!(notifier.post(&otg_notification()).is_ok());
        assert!(notifier.withdraw(1).is_ok());
    }

    #[test]
    fn test_command_notifier_failure() {
        let notifier = CommandNotifier::new("false", vec![], "nonexistent_command_xyz123", vec![]);
        assert!(notifier.post(&otg_notification()).is_err());

        let err = notifier.withdraw(1).unwrap_err();
        assert!(err.to_string().contains("Failed to execute"));
    }

    #[test]
    fn test_from_config() {
        let notifier = from_config(&NotifierConfig::Log);
        assert!(notifier.withdraw(1).is_ok());
    }
}
