use crate::mode::ToggleState;
use crate::settings::DeviceSettings;
use anyhow::Result;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub type Snapshot = BTreeMap<String, ToggleState>;

/// A toggle whose observed state differs between two snapshots.
/// `None` means the attribute was not present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub key: String,
    pub before: Option<ToggleState>,
    pub after: Option<ToggleState>,
}

pub fn diff(prev: &Snapshot, cur: &Snapshot) -> Vec<StateChange> {
    let mut changes = Vec::new();

    for (key, after) in cur {
        let before = prev.get(key).copied();
        if before != Some(*after) {
            changes.push(StateChange {
                key: key.clone(),
                before,
                after: Some(*after),
            });
        }
    }

    for (key, before) in prev {
        if !cur.contains_key(key) {
            changes.push(StateChange {
                key: key.clone(),
                before: Some(*before),
                after: None,
            });
        }
    }

    changes.sort_by(|a, b| a.key.cmp(&b.key));
    changes
}

async fn take_snapshot(settings: &Arc<DeviceSettings>) -> Result<Snapshot> {
    let settings = Arc::clone(settings);
    Ok(tokio::task::spawn_blocking(move || settings.snapshot()).await?)
}

fn log_change(change: &StateChange) {
    match (change.before, change.after) {
        (_, None) => warn!("WATCH: '{}' disappeared", change.key),
        (None, Some(state)) => info!("WATCH: '{}' appeared ({})", change.key, state),
        (Some(before), Some(after)) => {
            info!("WATCH: '{}' changed {} -> {}", change.key, before, after)
        }
    }
}

/// Polls every toggle until Ctrl-C and logs changes made outside this process
pub async fn run(settings: Arc<DeviceSettings>, period: Duration) -> Result<()> {
    run_until(settings, period, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("WATCH: cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Polls every toggle until `shutdown` completes
pub async fn run_until<F>(
    settings: Arc<DeviceSettings>,
    period: Duration,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut prev = take_snapshot(&settings).await?;
    for (key, state) in &prev {
        info!("WATCH: '{}' is {}", key, state);
    }

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("WATCH: stopping");
                return Ok(());
            }
            _ = ticker.tick() => {
                let cur = take_snapshot(&settings).await?;
                let changes = diff(&prev, &cur);
                if changes.is_empty() {
                    debug!("WATCH: no changes");
                }
                for change in &changes {
                    log_change(change);
                }
                prev = cur;
            }
        }
    }
}
