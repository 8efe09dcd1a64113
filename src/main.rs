use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use grid_snake::game::SimulationConfig;
use grid_snake::modes::HumanMode;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Grid snake with smooth movement and wrap-around boards")]
struct Cli {
    /// Board size preset, overridden by --config and the flags below
    #[arg(long, default_value = "default")]
    preset: Preset,

    /// JSON file with a full or partial simulation config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    /// Start in wrap-around mode
    #[arg(long)]
    wrap: bool,

    /// Seed for food placement and the death sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Write tracing output to this file (filtered by RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum Preset {
    /// 10x10 board
    Small,
    /// 20x12 board
    Default,
    /// 30x30 board
    Large,
}

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => match self.preset {
                Preset::Small => SimulationConfig::small(),
                Preset::Default => SimulationConfig::default(),
                Preset::Large => SimulationConfig::large(),
            },
        };

        if let Some(width) = self.width {
            config.grid.width = width;
        }
        if let Some(height) = self.height {
            config.grid.height = height;
        }
        if self.wrap {
            config.wrap_around = true;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate().context("Invalid simulation config")?;
        Ok(config)
    }
}

/// The terminal belongs to the game, so logs only go to a file when asked
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let config = cli.simulation_config()?;
    info!(
        width = config.grid.width,
        height = config.grid.height,
        wrap_around = config.wrap_around,
        seed = ?config.seed,
        "starting grid snake"
    );

    let mut human_mode = HumanMode::new(config)?;
    human_mode.run().await?;

    Ok(())
}
