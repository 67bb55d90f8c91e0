//! Observers that turn game events into log lines.

use exposure_core::orchestrator::{GameSnapshot, TickSummary};
use exposure_core::runner::FrameCallback;
use exposure_core::signals::{GameEvent, GameObserver};
use tracing::{debug, info};

/// Logs every [`GameEvent`]: state changes at info, presentation cues at
/// debug.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl GameObserver for TracingObserver {
    fn on_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::TurnAdvanced { turn } => info!(turn, "Turn advanced"),
            GameEvent::DifficultyRamped {
                turn,
                max_energy,
                max_pollution,
            } => info!(turn, max_energy, max_pollution, "Difficulty ramped"),
            GameEvent::UnitPlaced { unit_id, kind } => {
                info!(%unit_id, ?kind, "Unit placed");
            }
            GameEvent::UnitRemoved { unit_id, kind } => {
                info!(%unit_id, ?kind, "Unit removed");
            }
            GameEvent::MinigameEntered { kind, trigger } => {
                info!(%kind, ?trigger, "Minigame entered");
            }
            GameEvent::MinigameExited { result } => info!(
                kind = %result.kind,
                score = result.score,
                finished = result.finished,
                "Minigame result"
            ),
            GameEvent::ResetRequested => info!("Reset requested"),
            GameEvent::GameOver { outcome } => info!(?outcome, "Game over"),
            GameEvent::PhaseChanged { .. }
            | GameEvent::UiEnabled { .. }
            | GameEvent::UiDisabled { .. }
            | GameEvent::FadeFired { .. }
            | GameEvent::CameraTarget { .. }
            | GameEvent::SimulationStarted { .. }
            | GameEvent::MinigameStarted { .. } => {
                debug!(event = ?event, "Presentation cue");
            }
        }
    }
}

/// Logs a progress line every `every` frames.
#[derive(Debug, Clone, Copy)]
pub struct ProgressCallback {
    every: u64,
}

impl ProgressCallback {
    /// Log every `every` frames (0 disables).
    pub const fn new(every: u64) -> Self {
        Self { every }
    }
}

impl FrameCallback for ProgressCallback {
    fn on_frame(&mut self, summary: &TickSummary, snapshot: &GameSnapshot) {
        if self.every == 0 || summary.frame.checked_rem(self.every) != Some(0) {
            return;
        }
        debug!(
            frame = summary.frame,
            turn = summary.turn,
            phase = %summary.phase,
            energy = snapshot.levels.current_energy,
            pollution = snapshot.levels.current_pollution,
            camera_moving = snapshot.camera_moving,
            "Progress"
        );
    }
}
