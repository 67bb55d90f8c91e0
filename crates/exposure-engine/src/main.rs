//! Headless host for the Exposure turn loop.
//!
//! Loads the configuration, sets up logging, builds a plot-grid board and
//! the turn orchestrator, and lets the auto-player run one full game. The
//! final [`GameReport`] is printed to stdout as JSON.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (first argument, else `exposure-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the board and the orchestrator
//! 4. Run the game loop
//! 5. Log and print the report
//!
//! [`GameReport`]: exposure_core::runner::GameReport

mod autoplay;
mod error;
mod observer;

use std::io::Write as _;
use std::path::{Path, PathBuf};

use exposure_core::config::{GameConfig, LogFormat, LoggingConfig};
use exposure_core::orchestrator::TurnOrchestrator;
use exposure_core::runner::{self, RunLimits};
use exposure_world::PlotGrid;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::autoplay::{AutoPlaySettings, AutoPlayer};
use crate::error::EngineError;
use crate::observer::{ProgressCallback, TracingObserver};

/// Config file used when no path is given.
const DEFAULT_CONFIG_PATH: &str = "exposure-config.yaml";

/// Frames between progress log lines.
const PROGRESS_EVERY_FRAMES: u64 = 600;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if the configuration is unusable or the game loop
/// fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, found) = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        path = %config_path.display(),
        found,
        seed = config.game.seed,
        max_turns = config.game.max_turns,
        minigames_enabled = config.game.minigames_enabled,
        "Configuration loaded"
    );

    // 3. Build board and orchestrator.
    let board = config.board;
    let grid = PlotGrid::new(board.origin, board.cell_size, board.columns, board.rows);
    let limits = RunLimits::from_config(&config.game);
    let seed = config.game.seed;
    let mut orchestrator = TurnOrchestrator::new(config, grid).map_err(EngineError::from)?;
    orchestrator.add_observer(Box::new(TracingObserver));
    info!(
        columns = board.columns,
        rows = board.rows,
        warnings = orchestrator.warnings().len(),
        "Orchestrator ready"
    );
    orchestrator.begin();

    // 4. Run the game.
    let mut player = AutoPlayer::new(AutoPlaySettings::default(), seed);
    let mut callback = ProgressCallback::new(PROGRESS_EVERY_FRAMES);
    let result = runner::run_game(&mut orchestrator, &mut player, &mut callback, limits)
        .await
        .map_err(EngineError::from)?;

    // 5. Report.
    runner::log_game_end(&result);
    let report = serde_json::to_string_pretty(&result.report).map_err(EngineError::from)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{report}")?;

    info!(
        end_reason = ?result.end_reason,
        total_frames = result.total_frames,
        "exposure-engine shutdown complete"
    );
    Ok(())
}

/// Load the configuration, falling back to defaults when the file is
/// missing. Returns whether the file was found.
fn load_config(path: &Path) -> Result<(GameConfig, bool), EngineError> {
    if path.exists() {
        Ok((GameConfig::from_file(path)?, true))
    } else {
        let mut config = GameConfig::default();
        config.game.apply_env_overrides();
        Ok((config, false))
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured
/// level.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
