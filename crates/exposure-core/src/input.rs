//! Player input as commands, and sources that produce them.
//!
//! A host turns pointer and keyboard events into [`InputCommand`]s. The
//! headless runner asks an [`InputSource`] for the commands of each frame
//! instead. An input source may also move the cursor on the placement
//! surface, the way a real pointer would.

use std::collections::VecDeque;

use exposure_types::{UnitKind, Vec3};
use exposure_world::PlotGrid;

use crate::orchestrator::GameSnapshot;

/// One player action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputCommand {
    /// Pick a unit from the placement panel.
    SpawnUnit(UnitKind),
    /// Drop the held unit without placing it.
    CancelPlacement,
    /// Primary button pressed.
    PrimaryClick,
    /// Primary button released.
    PrimaryRelease,
    /// The advance key (stop simulation / leave minigame).
    Advance,
    /// Horizontal axis moved.
    Axis(f32),
}

/// A source of player input for the headless runner.
pub trait InputSource<S> {
    /// Commands for `frame`, given the state before that frame's tick.
    fn poll(&mut self, frame: u64, snapshot: &GameSnapshot, surface: &mut S) -> Vec<InputCommand>;
}

/// An input source that never does anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleInput;

impl<S> InputSource<S> for IdleInput {
    fn poll(&mut self, _frame: u64, _snapshot: &GameSnapshot, _surface: &mut S) -> Vec<InputCommand> {
        Vec::new()
    }
}

/// One scripted step: optionally move the cursor, then issue a command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedStep {
    /// Frame on or after which the step runs.
    pub frame: u64,
    /// Cursor position to set first, if any.
    pub cursor: Option<Vec3>,
    /// The command.
    pub command: InputCommand,
}

/// Replays a fixed list of steps against a [`PlotGrid`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    steps: VecDeque<ScriptedStep>,
}

impl ScriptedInput {
    /// Create a script; steps are sorted by frame.
    pub fn new(mut steps: Vec<ScriptedStep>) -> Self {
        steps.sort_by_key(|step| step.frame);
        Self {
            steps: steps.into(),
        }
    }

    /// Steps not yet replayed.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl InputSource<PlotGrid> for ScriptedInput {
    fn poll(
        &mut self,
        frame: u64,
        _snapshot: &GameSnapshot,
        surface: &mut PlotGrid,
    ) -> Vec<InputCommand> {
        let mut commands = Vec::new();
        while self.steps.front().is_some_and(|step| step.frame <= frame) {
            if let Some(step) = self.steps.pop_front() {
                if let Some(cursor) = step.cursor {
                    surface.set_cursor(Some(cursor));
                }
                commands.push(step.command);
            }
        }
        commands
    }
}
