use anyhow::Result;
use aries_parts::{
    config, describe_mode, describe_outcome, entry_line, notifier, watch, Config,
    DeviceSettings, SysfsStore,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "aries-parts")]
#[command(about = "Hardware mode switches for Aries devices", long_about = None)]
#[command(version)]
struct Cli {
    /// Device description to use instead of the built-in one
    #[arg(long, global = true, env = "ARIES_PARTS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every toggle with its current state
    List,
    /// Show what the driver reports for one toggle
    Get { key: String },
    /// Switch a toggle on or off
    Set { key: String, state: Switch },
    /// Log state changes until interrupted
    Watch {
        /// Poll period in milliseconds
        #[arg(long, default_value_t = 2000)]
        interval_ms: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

fn load(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = load(cli.config.as_ref())?;
    let notifier = notifier::from_config(&config.device.notifier);
    let settings = Arc::new(DeviceSettings::new(&config, Arc::new(SysfsStore), notifier));

    match cli.command {
        Commands::List => {
            for entry in settings.entries() {
                println!("{}", entry_line(&entry));
            }
        }
        Commands::Get { key } => {
            let toggle = settings.toggle(&key)?;
            if !toggle.is_supported() {
                warn!("{} is not present on this device", toggle.path().display());
            }
            println!("{}", describe_mode(toggle, &toggle.read_mode()));
        }
        Commands::Set { key, state } => {
            let desired = matches!(state, Switch::On);
            match settings.change(&key, desired) {
                Ok(outcome) => {
                    println!("{}", describe_outcome(&key, &outcome));
                    if !outcome.accepted() {
                        return Ok(ExitCode::from(2));
                    }
                }
                Err(e) => {
                    error!("{}", e);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Watch { interval_ms } => {
            info!("Watching {} toggle(s) on {}", settings.len(), settings.name());
            watch::run(settings, Duration::from_millis(interval_ms.max(1))).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
