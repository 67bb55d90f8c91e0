//! A scripted player for headless runs.
//!
//! [`AutoPlayer`] plays the whole loop through the same commands a human
//! would issue: it picks a unit, points at a free plot, releases, waits for
//! the bars to settle, sometimes clicks the optional-minigame message, and
//! plays each minigame for a while before leaving.

use exposure_core::input::{InputCommand, InputSource};
use exposure_core::orchestrator::GameSnapshot;
use exposure_types::{EntityTag, MinigameKind, Phase, ResourceLevels, UnitKind, Vec3};
use exposure_world::PlotGrid;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Pacing and habits of the auto-player, in frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoPlaySettings {
    /// Frames to wait before acting in a new phase.
    pub reaction_frames: u64,
    /// Frames to watch a simulation before advancing.
    pub simulation_frames: u64,
    /// Frames to play a minigame before leaving it.
    pub minigame_frames: u64,
    /// Chance to click the optional-minigame message when it shows.
    pub opt_in_chance: f64,
}

impl Default for AutoPlaySettings {
    fn default() -> Self {
        Self {
            reaction_frames: 10,
            simulation_frames: 120,
            minigame_frames: 900,
            opt_in_chance: 0.5,
        }
    }
}

/// Plays the game on a [`PlotGrid`].
#[derive(Debug)]
pub struct AutoPlayer {
    settings: AutoPlaySettings,
    rng: StdRng,
    phase: Option<Phase>,
    phase_frames: u64,
    drill_held: bool,
    decided_opt_in_turn: Option<u32>,
}

impl AutoPlayer {
    /// Create a player whose choices are reproducible for `seed`.
    pub fn new(settings: AutoPlaySettings, seed: u64) -> Self {
        Self {
            settings,
            rng: StdRng::seed_from_u64(seed),
            phase: None,
            phase_frames: 0,
            drill_held: false,
            decided_opt_in_turn: None,
        }
    }

    /// Pick the next unit from the current resource standing.
    ///
    /// Energy first while pollution has headroom, windmills once it does
    /// not.
    #[allow(clippy::cast_precision_loss)]
    fn choose_unit(&mut self, levels: &ResourceLevels) -> UnitKind {
        let energy_gap = levels.max_energy as f32 - levels.target_energy;
        let pollution_room = levels.max_pollution as f32 - levels.target_pollution;
        if energy_gap >= 3.0 && pollution_room >= 6.0 && self.rng.random_bool(0.25) {
            UnitKind::OilRig
        } else if pollution_room >= 2.0 {
            UnitKind::NuclearReactor
        } else {
            UnitKind::Windmill
        }
    }

    fn place(&mut self, snapshot: &GameSnapshot, surface: &mut PlotGrid) -> Vec<InputCommand> {
        let Some((column, row)) = surface.first_free_cell() else {
            debug!("Board is full, nothing to place");
            return Vec::new();
        };
        surface.point_at_cell(column, row);
        match snapshot.held {
            None => vec![InputCommand::SpawnUnit(self.choose_unit(&snapshot.levels))],
            Some(_) => vec![InputCommand::PrimaryRelease],
        }
    }

    fn simulate(&mut self, snapshot: &GameSnapshot, surface: &mut PlotGrid) -> Vec<InputCommand> {
        let turn = snapshot.turn.current_turn;
        if snapshot.message_visible && self.decided_opt_in_turn != Some(turn) {
            self.decided_opt_in_turn = Some(turn);
            if self.rng.random_bool(self.settings.opt_in_chance) {
                let at = message_position(surface);
                surface.show_tag(EntityTag::MinigameMessage, at, 100.0);
                surface.set_cursor(Some(at));
                debug!(turn, "Clicking the minigame message");
                return vec![InputCommand::PrimaryClick];
            }
        }
        if !snapshot.message_visible {
            surface.hide_tag(EntityTag::MinigameMessage);
        }
        if self.phase_frames >= self.settings.simulation_frames {
            vec![InputCommand::Advance]
        } else {
            Vec::new()
        }
    }

    fn play(&mut self, kind: MinigameKind, frame: u64) -> Vec<InputCommand> {
        if self.phase_frames >= self.settings.minigame_frames {
            self.drill_held = false;
            return vec![InputCommand::Advance];
        }
        match kind {
            MinigameKind::Mine => {
                #[allow(clippy::cast_precision_loss)]
                let sway = (frame as f32 * 0.05).sin();
                vec![InputCommand::Axis(sway)]
            }
            // Drill in bursts short enough to stay below the overheat line.
            MinigameKind::Drill => {
                let hold = self.phase_frames.checked_rem(240).is_some_and(|f| f < 150);
                if hold == self.drill_held {
                    Vec::new()
                } else {
                    self.drill_held = hold;
                    vec![if hold {
                        InputCommand::PrimaryClick
                    } else {
                        InputCommand::PrimaryRelease
                    }]
                }
            }
            MinigameKind::Solar => match self.phase_frames.checked_rem(20) {
                Some(0) => {
                    let step = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
                    vec![InputCommand::Axis(step)]
                }
                Some(1) => vec![InputCommand::Axis(0.0)],
                Some(10) if self.rng.random_bool(0.3) => vec![
                    InputCommand::PrimaryClick,
                    InputCommand::PrimaryRelease,
                ],
                _ => Vec::new(),
            },
        }
    }
}

impl InputSource<PlotGrid> for AutoPlayer {
    fn poll(
        &mut self,
        frame: u64,
        snapshot: &GameSnapshot,
        surface: &mut PlotGrid,
    ) -> Vec<InputCommand> {
        let phase = snapshot.turn.phase;
        if self.phase == Some(phase) {
            self.phase_frames = self.phase_frames.saturating_add(1);
        } else {
            self.phase = Some(phase);
            self.phase_frames = 0;
            self.drill_held = false;
        }
        if self.phase_frames < self.settings.reaction_frames {
            return Vec::new();
        }

        match phase {
            Phase::AwaitingInput | Phase::Placing => self.place(snapshot, surface),
            Phase::Simulating => self.simulate(snapshot, surface),
            Phase::InMinigame => snapshot
                .active_minigame
                .map(|kind| self.play(kind, frame))
                .unwrap_or_default(),
            Phase::EnteringMinigame | Phase::ExitingMinigame | Phase::GameOver => Vec::new(),
        }
    }
}

/// Where the message entity sits: one cell below the board origin.
fn message_position(surface: &PlotGrid) -> Vec3 {
    surface.cell_centre(0, 0) - Vec3::new(0.0, 1_000.0, 0.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use exposure_core::config::GameConfig;
    use exposure_core::orchestrator::TurnOrchestrator;
    use exposure_core::runner::{NoOpCallback, RunEndReason, RunLimits, run_game};

    use super::*;

    fn orchestrator(config: GameConfig) -> TurnOrchestrator<PlotGrid> {
        let board = config.board;
        let grid = PlotGrid::new(board.origin, board.cell_size, board.columns, board.rows);
        let mut orch = TurnOrchestrator::new(config, grid).unwrap();
        orch.begin();
        orch
    }

    #[tokio::test]
    async fn auto_player_finishes_a_game() {
        let config = GameConfig::default();
        let limits = RunLimits::from_config(&config.game).unpaced();
        let mut orch = orchestrator(config);
        let mut player = AutoPlayer::new(AutoPlaySettings::default(), 7);

        let result = run_game(&mut orch, &mut player, &mut NoOpCallback, limits)
            .await
            .unwrap();

        assert_eq!(result.end_reason, RunEndReason::GameOver);
        assert_eq!(result.report.turns_played, 9);
        assert!(result.report.outcome.is_some());
        assert!(!result.report.minigames.is_empty());
        assert_eq!(result.report.units.values().sum::<usize>(), 9);
    }

    #[tokio::test]
    async fn auto_player_without_minigames() {
        let mut config = GameConfig::default();
        config.game.minigames_enabled = false;
        let limits = RunLimits::from_config(&config.game).unpaced();
        let mut orch = orchestrator(config);
        let mut player = AutoPlayer::new(AutoPlaySettings::default(), 1);

        let result = run_game(&mut orch, &mut player, &mut NoOpCallback, limits)
            .await
            .unwrap();

        assert_eq!(result.end_reason, RunEndReason::GameOver);
        assert!(result.report.minigames.is_empty());
    }

    #[test]
    fn prefers_windmills_when_pollution_is_tight() {
        let mut player = AutoPlayer::new(AutoPlaySettings::default(), 3);
        let levels = ResourceLevels::at_rest(2.0, 5.0, 6, 6);
        assert_eq!(player.choose_unit(&levels), UnitKind::Windmill);
    }
}
