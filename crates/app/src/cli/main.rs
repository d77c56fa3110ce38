//! Volsync CLI Application

mod osd;
mod render;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use volsync_core::domain::{
    Action, AudioAdapter, BackendKind, ConfigManager, Controller, DeviceId, NullDisplay,
    VolsyncConfig, VolumeDisplay,
};
use volsync_core::domain::source::ActionSource;
use volsync_infra::audio::create_adapter;
use volsync_infra::input::LineSource;

use crate::osd::TerminalOsd;
use crate::render::{render_catalog, render_state, StatePrinter};

type AppController = Controller<Box<dyn AudioAdapter>, Box<dyn VolumeDisplay>>;

#[derive(Parser)]
#[command(name = "volsync")]
#[command(about = "One virtual master volume for aggregate audio devices", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (defaults to ~/.config/volsync/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the simulated hardware from the configuration
    #[arg(long)]
    simulate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List output devices
    List {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the master volume (0.0 - 1.0)
    Set {
        #[arg(allow_negative_numbers = true)]
        volume: f32,
        #[arg(short, long)]
        device: u32,
    },
    /// Set one sub-device of an aggregate device
    Sub {
        child: u32,
        #[arg(allow_negative_numbers = true)]
        volume: f32,
        #[arg(short, long)]
        device: u32,
    },
    /// Raise the master volume by one step
    Up {
        #[arg(short, long)]
        device: u32,
    },
    /// Lower the master volume by one step
    Down {
        #[arg(short, long)]
        device: u32,
    },
    /// Toggle the master mute
    Mute {
        #[arg(short, long)]
        device: u32,
    },
    /// Read commands from stdin (up, down, mute, set <v>, sub <id> <v>, select <id>, quit)
    Interactive {
        #[arg(short, long)]
        device: Option<u32>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn load_config(cli: &Cli) -> anyhow::Result<VolsyncConfig> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::for_file(path.clone()),
        None => ConfigManager::new(ConfigManager::default_config_dir()?),
    };

    let mut config = manager.load().await;
    if cli.simulate {
        config.hardware.backend = BackendKind::Simulated;
    }
    Ok(config)
}

fn build_controller(config: &VolsyncConfig) -> anyhow::Result<AppController> {
    let adapter = create_adapter(&config.hardware, &config.simulated)
        .context("Failed to initialize audio hardware")?;

    let display: Box<dyn VolumeDisplay> = if config.display.enabled {
        Box::new(TerminalOsd::new(Duration::from_millis(config.display.duration_ms)))
    } else {
        Box::new(NullDisplay)
    };

    Ok(Controller::new(adapter, display))
}

/// Discover devices and select `device`, failing if it is not an output
fn select(controller: &mut AppController, device: u32) -> anyhow::Result<()> {
    let id = DeviceId::new(device);
    controller.dispatch(Action::SelectDevice(id));

    if controller.state().selected_device.as_ref().map(|d| d.id()) != Some(id) {
        bail!("Output device {} not found (see `volsync list`)", id);
    }
    Ok(())
}

fn run_once(controller: &mut AppController, device: u32, action: Action) -> anyhow::Result<()> {
    select(controller, device)?;
    controller.dispatch(action);
    print!("{}", render_state(controller.state()));
    Ok(())
}

async fn run_interactive(mut controller: AppController, device: Option<u32>) -> anyhow::Result<()> {
    if let Some(device) = device {
        select(&mut controller, device)?;
    }
    print!("{}", render_state(controller.state()));
    controller.add_observer(Box::new(StatePrinter));

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut source = LineSource::stdin();
    if let Err(e) = source.start(tx) {
        tracing::error!(error = %e, "Input source failed to start");
        controller.dispatch(e.to_action());
    }

    tokio::task::spawn_blocking(move || controller.run(rx))
        .await
        .context("Controller thread panicked")?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tracing::info!("Volsync starting...");

    let config = load_config(&cli).await?;
    let mut controller = build_controller(&config)?;

    controller.dispatch(Action::RefreshDevices);
    if let Some(error) = &controller.state().error_message {
        tracing::warn!("{}", error);
    }

    match cli.command {
        Commands::List { json } => {
            let devices = &controller.state().available_devices;
            if json {
                println!("{}", serde_json::to_string_pretty(devices)?);
            } else {
                print!("{}", render_catalog(devices, None));
            }
        }
        Commands::Set { volume, device } => {
            run_once(&mut controller, device, Action::SetVolume(volume))?
        }
        Commands::Sub {
            child,
            volume,
            device,
        } => run_once(
            &mut controller,
            device,
            Action::SetSubDeviceVolume(DeviceId::new(child), volume),
        )?,
        Commands::Up { device } => run_once(&mut controller, device, Action::IncreaseVolume)?,
        Commands::Down { device } => run_once(&mut controller, device, Action::DecreaseVolume)?,
        Commands::Mute { device } => run_once(&mut controller, device, Action::ToggleMute)?,
        Commands::Interactive { device } => run_interactive(controller, device).await?,
    }

    Ok(())
}
