//! The turn orchestrator: one game, one phase at a time.
//!
//! A turn runs through these phases:
//!
//! ```text
//! AwaitingInput -> Placing -> Simulating -+-> EnteringMinigame -> InMinigame
//!       ^                                 |                          |
//!       |                                 |                          v
//!       +--------- advance_turn <---------+------------------ ExitingMinigame
//! ```
//!
//! [`TurnOrchestrator::tick`] advances the components in a fixed order:
//!
//! 1. resource animation
//! 2. fade timers (fired fades are published)
//! 3. camera; while it is still travelling the tick ends here
//! 4. pending minigame transition (once the camera arrived and the
//!    fade-out fired)
//! 5. the running minigame session
//! 6. placement housekeeping and the simulation timer
//!
//! Steps 4 to 6 are exclusive, so a tick applies at most one phase
//! transition. Commands (`on_primary_click`, `on_advance_press`, ...) may
//! transition immediately.

use exposure_minigames::MinigameInput;
use exposure_types::{
    EntityTag, FadeDirection, GameOutcome, InputTarget, MinigameKind, Phase, Pose,
    ResourceLevels, TurnState, UiPanel, UnitId, UnitKind,
};
use exposure_world::{
    CameraMotionController, CursorHit, FadeTransitionController, PlacementSurface, ResourceModel,
    Traversal, UnitPlacementController, WorldError,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ConfigWarning, GameConfig};
use crate::input::InputCommand;
use crate::judge::{OutcomeJudge, ThresholdJudge};
use crate::roster::{ActiveSession, MinigameResult, MinigameRoster};
use crate::selection::{EntryTrigger, MinigameSelection};
use crate::signals::{GameEvent, GameObserver};

// ---------------------------------------------------------------------------
// Errors and command outcomes
// ---------------------------------------------------------------------------

/// Errors returned by the orchestrator.
///
/// The phase is left unchanged whenever one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// The configuration could not be used.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A component refused an operation.
    #[error("world component error: {source}")]
    World {
        /// The underlying component error.
        #[from]
        source: WorldError,
    },

    /// A simulation was requested without a unit placed this turn.
    #[error("no unit has been placed this turn")]
    NoControlledUnit,

    /// A unit type index outside `1..=3`.
    #[error("unknown unit type index {index}")]
    UnknownUnitIndex {
        /// The offending index.
        index: u8,
    },
}

/// Why a command was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    /// The game has ended.
    #[error("the game is over")]
    GameOver,
    /// The command does not apply in the current phase.
    #[error("not available while {phase}")]
    WrongPhase {
        /// The phase at the time of the command.
        phase: Phase,
    },
    /// Clicks are ignored for a moment after a turn starts.
    #[error("click delay active")]
    ClickDelay,
    /// Nothing is held.
    #[error("no unit is held")]
    NothingHeld,
    /// The surface refused the spot under the cursor.
    #[error("placement blocked")]
    PlacementBlocked,
    /// The click hit nothing interactive.
    #[error("nothing to interact with")]
    NothingUnderCursor,
    /// A minigame transition is already under way.
    #[error("minigame transition pending")]
    TransitionPending,
    /// Minigames are switched off.
    #[error("minigames are disabled")]
    MinigamesDisabled,
}

/// Result of a player command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The command was applied.
    Accepted,
    /// The command was ignored.
    Rejected(RejectReason),
}

impl CommandOutcome {
    /// Whether the command was applied.
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

// ---------------------------------------------------------------------------
// Summaries and snapshots
// ---------------------------------------------------------------------------

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickSummary {
    /// Frame counter after this tick.
    pub frame: u64,
    /// Current turn.
    pub turn: u32,
    /// Phase after the tick.
    pub phase: Phase,
    /// Whether the tick ended early because the camera was travelling.
    pub camera_moving: bool,
    /// Fades fired this tick.
    pub fades_fired: usize,
    /// Whether the tick changed the phase.
    pub transitioned: bool,
}

/// Read-only view of the game for hosts and input sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameSnapshot {
    /// Turn counter and phase.
    pub turn: TurnState,
    /// Resource levels.
    pub levels: ResourceLevels,
    /// Active minigame, if any.
    pub active_minigame: Option<MinigameKind>,
    /// Kind of the held unit, if any.
    pub held: Option<UnitKind>,
    /// Whether the optional minigame message is showing.
    pub message_visible: bool,
    /// Unit marked for removal, if any.
    pub removable: Option<UnitId>,
    /// Units on the board.
    pub placed_units: usize,
    /// Camera pose.
    pub camera: Pose,
    /// Whether the camera is travelling.
    pub camera_moving: bool,
    /// Final outcome once the game is over.
    pub outcome: Option<GameOutcome>,
}

/// A minigame transition waiting for the camera and the fade-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Enter {
        kind: MinigameKind,
        trigger: EntryTrigger,
        fade_requested: bool,
    },
    Exit {
        fade_requested: bool,
    },
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Owner of the turn loop and every component it drives.
pub struct TurnOrchestrator<S: PlacementSurface> {
    config: GameConfig,
    warnings: Vec<ConfigWarning>,
    turn: TurnState,
    outcome: Option<GameOutcome>,
    resources: ResourceModel,
    fades: FadeTransitionController,
    camera: CameraMotionController,
    placement: UnitPlacementController,
    surface: S,
    selection: MinigameSelection,
    roster: MinigameRoster,
    judge: Box<dyn OutcomeJudge>,
    observers: Vec<Box<dyn GameObserver>>,
    session: Option<ActiveSession>,
    pending: Option<Pending>,
    placed_this_turn: Option<UnitKind>,
    opted_in: bool,
    message_visible: bool,
    removable: Option<UnitId>,
    click_delay: f32,
    idle: f32,
    reset_requested: bool,
    simulation_elapsed: f32,
    results: Vec<MinigameResult>,
    frame: u64,
}

impl<S: PlacementSurface> TurnOrchestrator<S> {
    /// Validate `config` and set up a game on turn 1, awaiting input.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Config`] if the configuration is not
    /// playable.
    pub fn new(mut config: GameConfig, surface: S) -> Result<Self, OrchestratorError> {
        let warnings = config.validate()?;
        let resources_cfg = config.resources;
        let levels = ResourceLevels::at_rest(
            resources_cfg.starting_energy,
            resources_cfg.starting_pollution,
            resources_cfg.max_energy,
            resources_cfg.max_pollution,
        );
        let fixed_first = config.game.first_rotation.and_then(MinigameKind::from_id);

        Ok(Self {
            turn: TurnState {
                current_turn: 1,
                max_turns: config.game.max_turns,
                phase: Phase::AwaitingInput,
            },
            outcome: None,
            resources: ResourceModel::new(levels, resources_cfg.lerp_rate, resources_cfg.ramp),
            fades: FadeTransitionController::new(),
            camera: CameraMotionController::new(config.camera.home, config.camera.motion),
            placement: UnitPlacementController::new(config.board.spawn_point),
            surface,
            selection: MinigameSelection::new(config.game.seed, fixed_first),
            roster: MinigameRoster::new(&config.minigames, config.game.seed),
            judge: Box::new(ThresholdJudge),
            observers: Vec::new(),
            session: None,
            pending: None,
            placed_this_turn: None,
            opted_in: false,
            message_visible: false,
            removable: None,
            click_delay: 0.0,
            idle: 0.0,
            reset_requested: false,
            simulation_elapsed: 0.0,
            results: Vec::new(),
            frame: 0,
            warnings,
            config,
        })
    }

    /// Replace the outcome judge.
    #[must_use]
    pub fn with_judge(mut self, judge: Box<dyn OutcomeJudge>) -> Self {
        self.judge = judge;
        self
    }

    /// Register an observer.
    pub fn add_observer(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    /// Session factories, for replacing reference minigames.
    pub const fn roster_mut(&mut self) -> &mut MinigameRoster {
        &mut self.roster
    }

    /// Publish the opening UI. Call once after registering observers.
    pub fn begin(&mut self) {
        info!(
            max_turns = self.turn.max_turns,
            seed = self.config.game.seed,
            minigames_enabled = self.config.game.minigames_enabled,
            "Game starting"
        );
        self.emit(GameEvent::ui_enabled(UiPanel::Turn, 0.0));
        self.emit(GameEvent::ui_enabled(UiPanel::Resources, 0.0));
        self.emit(GameEvent::ui_enabled(UiPanel::Placement, 0.0));
    }

    // -- Accessors ----------------------------------------------------------

    /// Turn counter and phase.
    pub const fn turn_state(&self) -> TurnState {
        self.turn
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.turn.phase
    }

    /// Final outcome, once the game is over.
    pub const fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// Resource levels.
    pub const fn levels(&self) -> ResourceLevels {
        self.resources.levels()
    }

    /// The validated configuration.
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Warnings produced while validating the configuration.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    /// Camera controller.
    pub const fn camera(&self) -> &CameraMotionController {
        &self.camera
    }

    /// Fade timers.
    pub const fn fades(&self) -> &FadeTransitionController {
        &self.fades
    }

    /// Placement controller and placed-unit registry.
    pub const fn placement(&self) -> &UnitPlacementController {
        &self.placement
    }

    /// Minigame selection state.
    pub const fn selection(&self) -> &MinigameSelection {
        &self.selection
    }

    /// The placement surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the placement surface (cursor updates).
    pub const fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Results of every minigame entry so far.
    pub fn results(&self) -> &[MinigameResult] {
        &self.results
    }

    /// Frames ticked so far.
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Who currently receives player input.
    pub fn input_target(&self) -> InputTarget {
        match self.turn.phase {
            Phase::Placing | Phase::AwaitingInput => InputTarget::Placement,
            Phase::Simulating => InputTarget::Simulation,
            Phase::InMinigame => self
                .selection
                .active()
                .map_or(InputTarget::Nobody, InputTarget::Minigame),
            Phase::EnteringMinigame | Phase::ExitingMinigame | Phase::GameOver => {
                InputTarget::Nobody
            }
        }
    }

    /// Read-only view of the game.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            turn: self.turn,
            levels: self.resources.levels(),
            active_minigame: self.selection.active(),
            held: self.placement.held().map(|held| held.kind),
            message_visible: self.message_visible,
            removable: self.removable,
            placed_units: self.placement.placed_count(),
            camera: self.camera.pose(),
            camera_moving: self.camera.is_moving(),
            outcome: self.outcome,
        }
    }

    // -- Frame loop ---------------------------------------------------------

    /// Advance the game by `delta_seconds`.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError`] when a component rejects an operation
    /// the orchestrator relies on; the phase is left unchanged.
    pub fn tick(&mut self, delta_seconds: f32) -> Result<TickSummary, OrchestratorError> {
        let delta = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };
        self.frame = self.frame.saturating_add(1);
        let phase_before = self.turn.phase;

        // (a) resources
        self.resources.update(delta);

        // (b) fades
        let fired = self.fades.update(delta);
        let fades_fired = fired.len();
        for fade in fired {
            self.emit(GameEvent::FadeFired {
                direction: fade.direction,
                duration: fade.duration,
            });
        }

        if self.turn.phase == Phase::GameOver {
            return Ok(self.summary(phase_before, false, fades_fired));
        }
        self.advance_timers(delta);

        // (c) camera suspension
        if self.camera.is_moving() {
            let step = self.camera.update(delta);
            if let Some(pose) = step.retargeted {
                self.emit(GameEvent::CameraTarget { pose });
            }
            return Ok(self.summary(phase_before, true, fades_fired));
        }

        match self.turn.phase {
            // (d) pending transitions
            Phase::EnteringMinigame | Phase::ExitingMinigame => self.progress_pending()?,
            // (e) running session
            Phase::InMinigame => {
                let finished = self.session.as_mut().is_some_and(|active| {
                    active.session.update(delta);
                    active.session.is_finished()
                });
                if finished {
                    debug!("Minigame reported finished");
                    let _ = self.exit_minigame()?;
                }
            }
            // (f) placement housekeeping
            Phase::Placing => {
                if self.placement.held().is_some() {
                    self.placement.follow_cursor(&self.surface);
                } else {
                    self.set_phase(Phase::AwaitingInput);
                }
            }
            Phase::Simulating => {
                self.simulation_elapsed += delta;
                let limit = self.config.game.simulation_seconds;
                if limit > 0.0 && self.simulation_elapsed >= limit {
                    debug!(limit, "Simulation time elapsed");
                    let _ = self.stop_simulation()?;
                }
            }
            Phase::AwaitingInput | Phase::GameOver => {}
        }

        Ok(self.summary(phase_before, false, fades_fired))
    }

    /// Apply a command from an input source.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying command.
    pub fn apply(&mut self, command: InputCommand) -> Result<CommandOutcome, OrchestratorError> {
        match command {
            InputCommand::SpawnUnit(kind) => Ok(self.spawn_unit(kind)),
            InputCommand::CancelPlacement => Ok(self.cancel_placement()),
            InputCommand::PrimaryClick => self.on_primary_click(),
            InputCommand::PrimaryRelease => self.on_primary_release(),
            InputCommand::Advance => self.on_advance_press(),
            InputCommand::Axis(value) => Ok(self.on_axis(value)),
        }
    }

    // -- Player commands ----------------------------------------------------

    /// Attach a new unit of `kind` to the cursor.
    pub fn spawn_unit(&mut self, kind: UnitKind) -> CommandOutcome {
        if let Some(reason) = self.closed_reason() {
            return CommandOutcome::Rejected(reason);
        }
        if !self.turn.phase.accepts_placement() {
            return self.wrong_phase();
        }
        self.note_input();
        self.clear_removable();
        self.placement.spawn(kind);
        self.placement.follow_cursor(&self.surface);
        self.set_phase(Phase::Placing);
        CommandOutcome::Accepted
    }

    /// Attach a new unit by its type index (1 = reactor, 2 = windmill,
    /// 3 = oil rig).
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::UnknownUnitIndex`] for other indices.
    pub fn spawn_unit_index(&mut self, index: u8) -> Result<CommandOutcome, OrchestratorError> {
        let kind =
            UnitKind::from_type_index(index).ok_or(OrchestratorError::UnknownUnitIndex { index })?;
        Ok(self.spawn_unit(kind))
    }

    /// Drop the held unit.
    pub fn cancel_placement(&mut self) -> CommandOutcome {
        if self.turn.phase != Phase::Placing {
            return self.wrong_phase();
        }
        if self.placement.cancel().is_none() {
            return CommandOutcome::Rejected(RejectReason::NothingHeld);
        }
        self.note_input();
        self.set_phase(Phase::AwaitingInput);
        CommandOutcome::Accepted
    }

    /// Primary button pressed.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::World`] if removing a unit fails.
    pub fn on_primary_click(&mut self) -> Result<CommandOutcome, OrchestratorError> {
        if let Some(reason) = self.closed_reason() {
            return Ok(CommandOutcome::Rejected(reason));
        }
        if self.click_delay > 0.0 {
            return Ok(CommandOutcome::Rejected(RejectReason::ClickDelay));
        }
        self.note_input();

        match self.turn.phase {
            Phase::InMinigame => Ok(self.forward_to_session(MinigameInput::PrimaryDown)),
            Phase::Simulating => {
                if self.message_visible
                    && self.surface.hit_under_cursor()
                        == CursorHit::Tagged(EntityTag::MinigameMessage)
                {
                    self.opted_in = true;
                    self.hide_message();
                    info!(turn = self.turn.current_turn, "Player opted into a minigame");
                    Ok(CommandOutcome::Accepted)
                } else {
                    Ok(CommandOutcome::Rejected(RejectReason::NothingUnderCursor))
                }
            }
            Phase::Placing | Phase::AwaitingInput => self.placement_click(),
            Phase::EnteringMinigame | Phase::ExitingMinigame | Phase::GameOver => {
                Ok(self.wrong_phase())
            }
        }
    }

    /// Primary button released. Commits a held unit.
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError`] from placement or
    /// [`start_simulation`](Self::start_simulation).
    pub fn on_primary_release(&mut self) -> Result<CommandOutcome, OrchestratorError> {
        if let Some(reason) = self.closed_reason() {
            return Ok(CommandOutcome::Rejected(reason));
        }
        match self.turn.phase {
            Phase::InMinigame => Ok(self.forward_to_session(MinigameInput::PrimaryUp)),
            Phase::Placing => {
                let Some(kind) = self.placement.held().map(|held| held.kind) else {
                    return Ok(CommandOutcome::Rejected(RejectReason::NothingHeld));
                };
                self.placement.follow_cursor(&self.surface);
                let Some(unit_id) = self.placement.try_commit_at_cursor(&mut self.surface)? else {
                    return Ok(CommandOutcome::Rejected(RejectReason::PlacementBlocked));
                };
                self.placed_this_turn = Some(kind);
                self.emit(GameEvent::UnitPlaced { unit_id, kind });
                self.start_simulation()
            }
            _ => Ok(self.wrong_phase()),
        }
    }

    /// The advance key: stops a simulation or leaves a minigame.
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError`] from the triggered transition.
    pub fn on_advance_press(&mut self) -> Result<CommandOutcome, OrchestratorError> {
        if let Some(reason) = self.closed_reason() {
            return Ok(CommandOutcome::Rejected(reason));
        }
        match self.turn.phase {
            Phase::Simulating => self.stop_simulation(),
            Phase::InMinigame => self.exit_minigame(),
            _ => Ok(self.wrong_phase()),
        }
    }

    /// Axis input; only a running minigame listens.
    pub fn on_axis(&mut self, value: f32) -> CommandOutcome {
        if self.turn.phase == Phase::InMinigame {
            self.forward_to_session(MinigameInput::Axis(value))
        } else {
            self.wrong_phase()
        }
    }

    // -- Transitions --------------------------------------------------------

    /// Start animating the resources toward the contribution of the unit
    /// placed this turn.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::NoControlledUnit`] if no unit was
    /// placed this turn.
    pub fn start_simulation(&mut self) -> Result<CommandOutcome, OrchestratorError> {
        if self.turn.phase != Phase::Placing {
            return Ok(self.wrong_phase());
        }
        let kind = self.placed_this_turn.ok_or(OrchestratorError::NoControlledUnit)?;
        let delta = self.config.units.delta(kind);
        self.resources.apply_delta(delta);
        self.simulation_elapsed = 0.0;

        self.emit(GameEvent::ui_disabled(UiPanel::Placement));
        self.emit(GameEvent::ui_enabled(UiPanel::Simulation, 0.0));
        if self.config.game.minigames_enabled && self.selection.has_played(kind.minigame()) {
            self.message_visible = true;
            self.emit(GameEvent::ui_enabled(UiPanel::MinigameMessage, 0.0));
        }
        self.emit(GameEvent::SimulationStarted { kind, delta });
        info!(
            turn = self.turn.current_turn,
            ?kind,
            energy = delta.energy,
            pollution = delta.pollution,
            "Simulation started"
        );
        self.set_phase(Phase::Simulating);
        Ok(CommandOutcome::Accepted)
    }

    /// End the simulation: enter a minigame if one is due, otherwise start
    /// the next turn.
    ///
    /// # Errors
    ///
    /// Propagates [`OrchestratorError`] from the camera.
    pub fn stop_simulation(&mut self) -> Result<CommandOutcome, OrchestratorError> {
        if self.turn.phase != Phase::Simulating {
            return Ok(self.wrong_phase());
        }
        self.emit(GameEvent::ui_disabled(UiPanel::Simulation));
        self.hide_message();

        let trigger = if self.config.game.minigames_enabled {
            let turn = self.turn.current_turn;
            self.selection.trigger_for(
                self.placed_this_turn,
                self.config.game.solar_turns.contains(&turn),
                self.config.game.scheduled().contains(&turn),
                self.opted_in,
            )
        } else {
            None
        };
        self.opted_in = false;

        match trigger {
            Some(trigger) => self.enter_minigame(trigger),
            None => {
                self.advance_turn();
                Ok(CommandOutcome::Accepted)
            }
        }
    }

    /// Select a minigame for `trigger` and send the camera there.
    ///
    /// Ignored while another minigame transition is pending. The mine is
    /// reached over the configured waypoint route; without one the camera
    /// goes straight to the fallback pose.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::World`] if the camera rejects the
    /// route.
    pub fn enter_minigame(&mut self, trigger: EntryTrigger) -> Result<CommandOutcome, OrchestratorError> {
        if self.turn.phase.is_minigame() {
            debug!(?trigger, phase = %self.turn.phase, "Minigame entry ignored, transition pending");
            return Ok(CommandOutcome::Rejected(RejectReason::TransitionPending));
        }
        if self.turn.phase != Phase::Simulating {
            return Ok(self.wrong_phase());
        }
        if !self.config.game.minigames_enabled {
            return Ok(CommandOutcome::Rejected(RejectReason::MinigamesDisabled));
        }

        let kind = self.selection.enter(trigger);
        let mine_path = &self.config.camera.mine_path;
        let first_target = if kind == MinigameKind::Mine && !mine_path.is_empty() {
            self.camera.move_along(mine_path.clone(), Traversal::Forward)?
        } else {
            let pose = self.minigame_pose(kind);
            self.camera.move_to(pose);
            pose
        };
        self.emit(GameEvent::CameraTarget { pose: first_target });
        self.emit(GameEvent::ui_disabled(UiPanel::Turn));
        self.emit(GameEvent::ui_disabled(UiPanel::Resources));
        self.emit(GameEvent::MinigameEntered { kind, trigger });
        info!(turn = self.turn.current_turn, %kind, ?trigger, "Entering minigame");

        self.pending = Some(Pending::Enter {
            kind,
            trigger,
            fade_requested: false,
        });
        self.set_phase(Phase::EnteringMinigame);
        Ok(CommandOutcome::Accepted)
    }

    /// Leave the running minigame and send the camera home.
    ///
    /// Only valid while a minigame is running; a second call before the
    /// exit commits is ignored. The turn advances once the exit commits.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::World`] if the camera rejects the
    /// return route.
    pub fn exit_minigame(&mut self) -> Result<CommandOutcome, OrchestratorError> {
        if self.turn.phase != Phase::InMinigame {
            debug!(phase = %self.turn.phase, "Minigame exit ignored");
            return Ok(if self.turn.phase.is_minigame() {
                CommandOutcome::Rejected(RejectReason::TransitionPending)
            } else {
                self.wrong_phase()
            });
        }
        let kind = self.selection.active();

        // Camera first: if it refuses the route nothing else changes.
        let home = self.config.camera.home;
        let mine_path = &self.config.camera.mine_path;
        let first_target = if kind == Some(MinigameKind::Mine) && !mine_path.is_empty() {
            let target = self
                .camera
                .move_along(mine_path.clone(), Traversal::Reverse)?;
            self.camera.then(home);
            target
        } else {
            self.camera.move_to(home);
            home
        };
        self.emit(GameEvent::CameraTarget { pose: first_target });

        if let Some(active) = self.session.take() {
            let result = active.result();
            info!(
                session_id = %result.session_id,
                kind = %result.kind,
                score = result.score,
                finished = result.finished,
                "Minigame exited"
            );
            self.results.push(result);
            self.emit(GameEvent::MinigameExited { result });
        }
        if let Some(kind) = kind {
            self.emit(GameEvent::ui_disabled(kind.panel()));
        }
        self.emit(GameEvent::ui_enabled(UiPanel::Turn, 0.0));
        self.emit(GameEvent::ui_enabled(UiPanel::Resources, 0.0));

        self.pending = Some(Pending::Exit {
            fade_requested: false,
        });
        self.set_phase(Phase::ExitingMinigame);
        Ok(CommandOutcome::Accepted)
    }

    /// Start the next turn, or end the game after the last one.
    pub fn advance_turn(&mut self) {
        if self.turn.phase == Phase::GameOver {
            return;
        }
        self.turn.current_turn = self.turn.current_turn.saturating_add(1);
        let turn = self.turn.current_turn;
        self.placed_this_turn = None;
        self.opted_in = false;
        self.reset_requested = false;
        self.idle = 0.0;
        self.click_delay = sanitize(self.config.game.click_delay_seconds);
        self.emit(GameEvent::TurnAdvanced { turn });

        if self.resources.on_new_turn(turn) {
            let levels = self.resources.levels();
            self.emit(GameEvent::DifficultyRamped {
                turn,
                max_energy: levels.max_energy,
                max_pollution: levels.max_pollution,
            });
        }

        if turn > self.turn.max_turns {
            let outcome = self.judge.judge(&self.resources.levels());
            info!(turn, ?outcome, "Last turn played");
            self.end_game(outcome == GameOutcome::Won);
            return;
        }

        info!(turn, max_turns = self.turn.max_turns, "Turn started");
        self.emit(GameEvent::ui_enabled(UiPanel::Placement, 0.0));
        self.set_phase(Phase::Placing);
    }

    /// End the game. Later calls are ignored.
    pub fn end_game(&mut self, won: bool) {
        if self.turn.phase == Phase::GameOver {
            return;
        }
        let outcome = GameOutcome::from_won(won);
        if let Some(active) = self.session.take() {
            let result = active.result();
            self.results.push(result);
            self.emit(GameEvent::MinigameExited { result });
        }
        self.pending = None;
        self.selection.clear_active();
        let _ = self.placement.cancel();
        self.outcome = Some(outcome);
        self.emit(GameEvent::ui_disabled(UiPanel::Placement));
        self.emit(GameEvent::ui_enabled(UiPanel::GameOver, 0.0));
        self.emit(GameEvent::GameOver { outcome });
        info!(
            ?outcome,
            turn = self.turn.current_turn,
            energy = self.resources.levels().target_energy,
            pollution = self.resources.levels().target_pollution,
            "Game over"
        );
        self.set_phase(Phase::GameOver);
    }

    // -- Internals ----------------------------------------------------------

    /// Step (d): wait for the fade-out after arrival, then commit.
    fn progress_pending(&mut self) -> Result<(), OrchestratorError> {
        let Some(pending) = self.pending else {
            warn!(phase = %self.turn.phase, "Transition phase without pending transition");
            return Ok(());
        };
        let fades = self.config.fades;
        match pending {
            Pending::Enter {
                fade_requested: false,
                kind,
                trigger,
            } => {
                self.fades
                    .request_fade_out(fades.fade_out_delay, fades.fade_out_duration);
                self.pending = Some(Pending::Enter {
                    kind,
                    trigger,
                    fade_requested: true,
                });
            }
            Pending::Exit {
                fade_requested: false,
            } => {
                self.fades
                    .request_fade_out(fades.fade_out_delay, fades.fade_out_duration);
                self.pending = Some(Pending::Exit {
                    fade_requested: true,
                });
            }
            _ if self.fades.is_armed(FadeDirection::Out) => {}
            Pending::Enter { kind, trigger, .. } => self.commit_enter(kind, trigger),
            Pending::Exit { .. } => self.commit_exit(),
        }
        Ok(())
    }

    fn commit_enter(&mut self, kind: MinigameKind, trigger: EntryTrigger) {
        self.pending = None;
        let mut active = self
            .roster
            .create(kind, trigger, self.turn.current_turn);
        active.session.start();
        let session_id = active.id;
        self.session = Some(active);

        let fades = self.config.fades;
        self.fades
            .request_fade_in(fades.fade_in_delay, fades.fade_in_duration);
        self.emit(GameEvent::ui_enabled(
            kind.panel(),
            self.config.ui.minigame_panel_delay,
        ));
        self.emit(GameEvent::MinigameStarted { session_id, kind });
        info!(%session_id, %kind, "Minigame started");
        self.set_phase(Phase::InMinigame);
    }

    fn commit_exit(&mut self) {
        self.pending = None;
        self.selection.clear_active();
        let fades = self.config.fades;
        self.fades
            .request_fade_in(fades.fade_in_delay, fades.fade_in_duration);
        self.advance_turn();
    }

    /// Click while placing or awaiting input: removal flow or grabbing.
    fn placement_click(&mut self) -> Result<CommandOutcome, OrchestratorError> {
        let hit = self.surface.hit_under_cursor();
        match (hit, self.removable) {
            (CursorHit::Tagged(EntityTag::RemoveConfirm), Some(unit_id)) => {
                let unit = self.placement.remove(unit_id, &mut self.surface)?;
                self.resources
                    .apply_delta(self.config.units.delta(unit.kind).negated());
                self.removable = None;
                self.emit(GameEvent::ui_disabled(UiPanel::RemovePrompt));
                self.emit(GameEvent::UnitRemoved {
                    unit_id,
                    kind: unit.kind,
                });
                Ok(CommandOutcome::Accepted)
            }
            (CursorHit::Unit(unit_id), _) if self.placement.held().is_none() => {
                self.clear_removable();
                self.removable = Some(unit_id);
                self.emit(GameEvent::ui_enabled(UiPanel::RemovePrompt, 0.0));
                debug!(%unit_id, "Unit marked removable");
                Ok(CommandOutcome::Accepted)
            }
            _ => {
                self.clear_removable();
                if self.placement.held().is_some() {
                    self.placement.follow_cursor(&self.surface);
                    Ok(CommandOutcome::Accepted)
                } else {
                    Ok(CommandOutcome::Rejected(RejectReason::NothingUnderCursor))
                }
            }
        }
    }

    fn forward_to_session(&mut self, input: MinigameInput) -> CommandOutcome {
        match self.session.as_mut() {
            Some(active) => {
                active.session.handle_input(input);
                CommandOutcome::Accepted
            }
            None => self.wrong_phase(),
        }
    }

    fn advance_timers(&mut self, delta: f32) {
        if self.click_delay > 0.0 {
            self.click_delay = (self.click_delay - delta).max(0.0);
        }
        let afk = self.config.game.afk_timeout_seconds;
        if afk > 0.0 && self.turn.phase.accepts_placement() && !self.reset_requested {
            self.idle += delta;
            if self.idle >= afk {
                self.reset_requested = true;
                warn!(idle = self.idle, "Player idle, requesting reset");
                self.emit(GameEvent::ResetRequested);
            }
        }
    }

    const fn note_input(&mut self) {
        self.idle = 0.0;
    }

    fn clear_removable(&mut self) {
        if self.removable.take().is_some() {
            self.emit(GameEvent::ui_disabled(UiPanel::RemovePrompt));
        }
    }

    fn hide_message(&mut self) {
        if self.message_visible {
            self.message_visible = false;
            self.emit(GameEvent::ui_disabled(UiPanel::MinigameMessage));
        }
    }

    fn minigame_pose(&self, kind: MinigameKind) -> Pose {
        let pose = match kind {
            MinigameKind::Drill => self.config.camera.drill_pose,
            MinigameKind::Solar => self.config.camera.solar_pose,
            MinigameKind::Mine => self.config.camera.mine_path.last().copied(),
        };
        pose.unwrap_or(self.config.camera.home)
    }

    const fn closed_reason(&self) -> Option<RejectReason> {
        if matches!(self.turn.phase, Phase::GameOver) {
            Some(RejectReason::GameOver)
        } else {
            None
        }
    }

    const fn wrong_phase(&self) -> CommandOutcome {
        CommandOutcome::Rejected(RejectReason::WrongPhase {
            phase: self.turn.phase,
        })
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.turn.phase;
        if from == to {
            return;
        }
        self.turn.phase = to;
        debug!(%from, %to, turn = self.turn.current_turn, "Phase changed");
        self.emit(GameEvent::PhaseChanged { from, to });
    }

    fn emit(&mut self, event: GameEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }

    fn summary(&self, phase_before: Phase, camera_moving: bool, fades_fired: usize) -> TickSummary {
        TickSummary {
            frame: self.frame,
            turn: self.turn.current_turn,
            phase: self.turn.phase,
            camera_moving,
            fades_fired,
            transitioned: phase_before != self.turn.phase,
        }
    }
}

impl<S: PlacementSurface + core::fmt::Debug> core::fmt::Debug for TurnOrchestrator<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TurnOrchestrator")
            .field("turn", &self.turn)
            .field("outcome", &self.outcome)
            .field("levels", &self.resources.levels())
            .field("active_minigame", &self.selection.active())
            .field("surface", &self.surface)
            .finish_non_exhaustive()
    }
}

const fn sanitize(value: f32) -> f32 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}
