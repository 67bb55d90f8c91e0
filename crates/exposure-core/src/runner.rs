//! Headless game loop.
//!
//! [`run_game`] drives a [`TurnOrchestrator`] frame by frame: poll the
//! input source, apply its commands, tick, repeat. It stops when the game
//! is over or after `max_frames`.
//!
//! The simulated frame time (`frame_seconds`) is independent of the pacing
//! between frames (`frame_interval_ms`), so a game can be replayed at full
//! speed with the same result as a real-time run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use exposure_types::{GameOutcome, ResourceLevels, UnitKind};
use exposure_world::PlacementSurface;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TurnConfig;
use crate::input::InputSource;
use crate::orchestrator::{
    CommandOutcome, GameSnapshot, OrchestratorError, TickSummary, TurnOrchestrator,
};
use crate::roster::MinigameResult;

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick or command failed.
    #[error("orchestrator error: {source}")]
    Orchestrator {
        /// The underlying orchestrator error.
        #[from]
        source: OrchestratorError,
    },
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEndReason {
    /// The last turn was judged.
    GameOver,
    /// The frame budget ran out first.
    MaxFramesReached,
}

/// Frame budget and pacing for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunLimits {
    /// Stop after this many frames.
    pub max_frames: u64,
    /// Simulated seconds per frame.
    pub frame_seconds: f32,
    /// Real milliseconds to sleep between frames (0 = no pacing).
    pub frame_interval_ms: u64,
}

impl RunLimits {
    /// Limits taken from the game section of the config.
    pub const fn from_config(game: &TurnConfig) -> Self {
        Self {
            max_frames: game.max_frames,
            frame_seconds: game.frame_seconds,
            frame_interval_ms: game.frame_interval_ms,
        }
    }

    /// Same limits without real-time pacing.
    #[must_use]
    pub const fn unpaced(mut self) -> Self {
        self.frame_interval_ms = 0;
        self
    }
}

/// Callback invoked after every frame.
pub trait FrameCallback: Send {
    /// Called after a tick completed.
    fn on_frame(&mut self, summary: &TickSummary, snapshot: &GameSnapshot);
}

/// A no-op frame callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl FrameCallback for NoOpCallback {
    fn on_frame(&mut self, _summary: &TickSummary, _snapshot: &GameSnapshot) {}
}

/// End-of-run summary, serializable for hosts and logs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameReport {
    /// Wall clock time the run started.
    pub started_at: DateTime<Utc>,
    /// Wall clock time the run ended.
    pub ended_at: DateTime<Utc>,
    /// Why the run stopped.
    pub end_reason: RunEndReason,
    /// Frames ticked.
    pub frames: u64,
    /// Turns fully played.
    pub turns_played: u32,
    /// Outcome, if the game ended.
    pub outcome: Option<GameOutcome>,
    /// Final resource levels.
    pub levels: ResourceLevels,
    /// Units left on the board, by kind.
    pub units: BTreeMap<UnitKind, usize>,
    /// Every minigame entry in order.
    pub minigames: Vec<MinigameResult>,
}

impl GameReport {
    fn collect<S: PlacementSurface>(
        orchestrator: &TurnOrchestrator<S>,
        started_at: DateTime<Utc>,
        end_reason: RunEndReason,
    ) -> Self {
        let mut units = BTreeMap::new();
        for unit in orchestrator.placement().placed() {
            let count: &mut usize = units.entry(unit.kind).or_default();
            *count = count.saturating_add(1);
        }
        let state = orchestrator.turn_state();
        Self {
            started_at,
            ended_at: Utc::now(),
            end_reason,
            frames: orchestrator.frame(),
            turns_played: state
                .current_turn
                .saturating_sub(1)
                .min(state.max_turns),
            outcome: orchestrator.outcome(),
            levels: orchestrator.levels(),
            units,
            minigames: orchestrator.results().to_vec(),
        }
    }
}

/// Result of a run.
#[derive(Debug)]
pub struct GameRunResult {
    /// Why the run stopped.
    pub end_reason: RunEndReason,
    /// The last tick summary, if any frame ran.
    pub final_summary: Option<TickSummary>,
    /// Frames executed by this run.
    pub total_frames: u64,
    /// Serializable summary.
    pub report: GameReport,
}

/// Run the game until it is over or the frame budget runs out.
///
/// Commands rejected by the orchestrator are logged and skipped; only
/// errors end the run early.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick or command fails.
pub async fn run_game<S: PlacementSurface>(
    orchestrator: &mut TurnOrchestrator<S>,
    input: &mut dyn InputSource<S>,
    callback: &mut dyn FrameCallback,
    limits: RunLimits,
) -> Result<GameRunResult, RunnerError> {
    let started_at = Utc::now();
    let mut last_summary: Option<TickSummary> = None;
    let mut total_frames: u64 = 0;

    info!(
        max_frames = limits.max_frames,
        frame_seconds = limits.frame_seconds,
        frame_interval_ms = limits.frame_interval_ms,
        "Game loop starting"
    );

    loop {
        // --- Check game over (before frame) ---
        if orchestrator.outcome().is_some() {
            return Ok(finish(
                orchestrator,
                started_at,
                RunEndReason::GameOver,
                last_summary,
                total_frames,
            ));
        }

        // --- Check frame budget ---
        if total_frames >= limits.max_frames {
            warn!(max_frames = limits.max_frames, "Frame budget exhausted");
            return Ok(finish(
                orchestrator,
                started_at,
                RunEndReason::MaxFramesReached,
                last_summary,
                total_frames,
            ));
        }

        // --- Input ---
        let snapshot = orchestrator.snapshot();
        let commands = input.poll(total_frames, &snapshot, orchestrator.surface_mut());
        for command in commands {
            if let CommandOutcome::Rejected(reason) = orchestrator.apply(command)? {
                debug!(?command, %reason, frame = total_frames, "Command rejected");
            }
        }

        // --- Tick ---
        let summary = orchestrator.tick(limits.frame_seconds)?;
        total_frames = total_frames.saturating_add(1);
        callback.on_frame(&summary, &orchestrator.snapshot());
        last_summary = Some(summary);

        // --- Pace ---
        if limits.frame_interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(limits.frame_interval_ms))
                .await;
        }
    }
}

fn finish<S: PlacementSurface>(
    orchestrator: &TurnOrchestrator<S>,
    started_at: DateTime<Utc>,
    end_reason: RunEndReason,
    final_summary: Option<TickSummary>,
    total_frames: u64,
) -> GameRunResult {
    GameRunResult {
        end_reason,
        final_summary,
        total_frames,
        report: GameReport::collect(orchestrator, started_at, end_reason),
    }
}

/// Log the end of a run.
pub fn log_game_end(result: &GameRunResult) {
    let report = &result.report;
    info!(
        reason = ?result.end_reason,
        total_frames = result.total_frames,
        turns_played = report.turns_played,
        outcome = ?report.outcome,
        "Game ended"
    );
    info!(
        energy = report.levels.target_energy,
        max_energy = report.levels.max_energy,
        pollution = report.levels.target_pollution,
        max_pollution = report.levels.max_pollution,
        minigames_played = report.minigames.len(),
        "Final resources"
    );
    if result.final_summary.is_none() {
        warn!("Game ended with no frames executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use exposure_world::PlotGrid;

    use super::*;
    use crate::config::GameConfig;
    use crate::input::IdleInput;

    fn orchestrator() -> TurnOrchestrator<PlotGrid> {
        let config = GameConfig::default();
        let board = config.board;
        let grid = PlotGrid::new(board.origin, board.cell_size, board.columns, board.rows);
        TurnOrchestrator::new(config, grid).unwrap()
    }

    #[tokio::test]
    async fn idle_player_runs_out_of_frames() {
        let mut orch = orchestrator();
        orch.begin();
        let limits = RunLimits {
            max_frames: 30,
            frame_seconds: 1.0 / 60.0,
            frame_interval_ms: 0,
        };
        let result = run_game(&mut orch, &mut IdleInput, &mut NoOpCallback, limits)
            .await
            .unwrap();
        assert_eq!(result.end_reason, RunEndReason::MaxFramesReached);
        assert_eq!(result.total_frames, 30);
        assert_eq!(result.report.turns_played, 0);
        assert!(result.report.outcome.is_none());
    }

    #[tokio::test]
    async fn finished_game_stops_before_first_frame() {
        let mut orch = orchestrator();
        orch.end_game(false);
        let limits = RunLimits::from_config(&orch.config().game).unpaced();
        let result = run_game(&mut orch, &mut IdleInput, &mut NoOpCallback, limits)
            .await
            .unwrap();
        assert_eq!(result.end_reason, RunEndReason::GameOver);
        assert_eq!(result.total_frames, 0);
        assert_eq!(result.report.outcome, Some(GameOutcome::Lost));
    }

    #[test]
    fn report_serializes_units_by_kind() {
        let orch = orchestrator();
        let report = GameReport::collect(&orch, Utc::now(), RunEndReason::GameOver);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["end_reason"], "game_over");
        assert!(json["units"].as_object().unwrap().is_empty());
    }
}
