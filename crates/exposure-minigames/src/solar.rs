//! Solar mirror puzzle: place mirrors so the sun beam reaches the collector.
//!
//! The beam enters the grid from the west edge on `source_row` travelling
//! east. A `/` mirror turns east into north, a `\` mirror turns east into
//! south (and so on for the other headings). The axis moves a focus cursor
//! over the cells; a primary press cycles the focused cell through
//! empty, `/`, and `\`. The beam is traced after every change.
//!
//! Rows grow northward: `north` means `row + 1`.

use exposure_types::MinigameKind;
use tracing::{debug, info};

use crate::config::SolarConfig;
use crate::session::{MinigameInput, MinigameSession, clamp_axis, sanitize_delta};

/// Axis deflection needed before the focus moves.
const AXIS_DEADZONE: f32 = 0.5;

/// Contents of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    /// Nothing; the beam passes straight through.
    #[default]
    Empty,
    /// `/` mirror.
    Slash,
    /// `\` mirror.
    Backslash,
}

impl Cell {
    const fn next(self) -> Self {
        match self {
            Self::Empty => Self::Slash,
            Self::Slash => Self::Backslash,
            Self::Backslash => Self::Empty,
        }
    }
}

/// Beam travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    /// Column increasing.
    East,
    /// Column decreasing.
    West,
    /// Row increasing.
    North,
    /// Row decreasing.
    South,
}

impl Heading {
    const fn reflect(self, cell: Cell) -> Self {
        match (cell, self) {
            (Cell::Empty, heading) => heading,
            (Cell::Slash, Self::East) | (Cell::Backslash, Self::West) => Self::North,
            (Cell::Slash, Self::North) | (Cell::Backslash, Self::South) => Self::East,
            (Cell::Slash, Self::West) | (Cell::Backslash, Self::East) => Self::South,
            (Cell::Slash, Self::South) | (Cell::Backslash, Self::North) => Self::West,
        }
    }
}

/// A mirror puzzle session.
#[derive(Debug)]
pub struct SolarSession {
    config: SolarConfig,
    cells: Vec<Cell>,
    focus: usize,
    axis_latched: bool,
    started: bool,
    elapsed: f32,
    beam: Vec<(u8, u8)>,
    solved: bool,
    solved_at: Option<f32>,
}

impl SolarSession {
    /// Create a session with an empty grid.
    pub fn new(config: SolarConfig) -> Self {
        let columns = config.columns.max(1);
        let rows = config.rows.max(1);
        let config = SolarConfig {
            columns,
            rows,
            source_row: config.source_row.min(rows.saturating_sub(1)),
            goal_column: config.goal_column.min(columns.saturating_sub(1)),
            goal_row: config.goal_row.min(rows.saturating_sub(1)),
            ..config
        };
        let len = usize::from(columns).saturating_mul(usize::from(rows));
        let mut session = Self {
            config,
            cells: vec![Cell::Empty; len],
            focus: 0,
            axis_latched: false,
            started: false,
            elapsed: 0.0,
            beam: Vec::new(),
            solved: false,
            solved_at: None,
        };
        session.trace_beam();
        session
    }

    /// Cell at `(column, row)`, if inside the grid.
    pub fn cell(&self, column: u8, row: u8) -> Option<Cell> {
        self.index_of(column, row)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Focused cell as `(column, row)`.
    pub fn focus(&self) -> (u8, u8) {
        self.position_of(self.focus)
    }

    /// Cells the beam passes through, in order.
    pub fn beam(&self) -> &[(u8, u8)] {
        &self.beam
    }

    /// Whether the beam reaches the collector.
    pub const fn is_solved(&self) -> bool {
        self.solved
    }

    /// Mirrors currently on the grid.
    pub fn mirrors_placed(&self) -> usize {
        self.cells.iter().filter(|cell| **cell != Cell::Empty).count()
    }

    /// Move the focus to `(column, row)`; ignored outside the grid.
    pub fn focus_on(&mut self, column: u8, row: u8) {
        if let Some(index) = self.index_of(column, row) {
            self.focus = index;
        }
    }

    fn index_of(&self, column: u8, row: u8) -> Option<usize> {
        if column >= self.config.columns || row >= self.config.rows {
            return None;
        }
        usize::from(row)
            .checked_mul(usize::from(self.config.columns))?
            .checked_add(usize::from(column))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn position_of(&self, index: usize) -> (u8, u8) {
        let columns = usize::from(self.config.columns);
        let column = index.checked_rem(columns).unwrap_or(0);
        let row = index.checked_div(columns).unwrap_or(0);
        (column as u8, row as u8)
    }

    fn is_goal(&self, column: u8, row: u8) -> bool {
        column == self.config.goal_column && row == self.config.goal_row
    }

    fn move_focus(&mut self, forward: bool) {
        let len = self.cells.len();
        if len == 0 {
            return;
        }
        self.focus = if forward {
            self.focus.saturating_add(1).checked_rem(len).unwrap_or(0)
        } else {
            self.focus.checked_sub(1).unwrap_or(len.saturating_sub(1))
        };
    }

    fn cycle_focused(&mut self) {
        let (column, row) = self.focus();
        if self.is_goal(column, row) {
            return;
        }
        let at_budget = self.mirrors_placed() >= usize::from(self.config.mirror_budget);
        let Some(cell) = self.cells.get_mut(self.focus) else {
            return;
        };
        let mut next = cell.next();
        if *cell == Cell::Empty && at_budget {
            debug!("Mirror budget exhausted");
            next = Cell::Empty;
        }
        *cell = next;
        self.trace_beam();
        if self.solved && self.solved_at.is_none() {
            self.solved_at = Some(self.elapsed);
            info!(elapsed = self.elapsed, "Solar beam reached the collector");
        }
    }

    /// Walk the beam from the west edge until it leaves the grid, hits the
    /// collector, or revisits a cell with the same heading.
    fn trace_beam(&mut self) {
        self.beam.clear();
        self.solved = false;

        let mut column: i16 = -1;
        let mut row = i16::from(self.config.source_row);
        let mut heading = Heading::East;
        let max_steps = self.cells.len().saturating_mul(4).saturating_add(1);
        let mut visited: Vec<(i16, i16, Heading)> = Vec::new();

        for _ in 0..max_steps {
            match heading {
                Heading::East => column = column.saturating_add(1),
                Heading::West => column = column.saturating_sub(1),
                Heading::North => row = row.saturating_add(1),
                Heading::South => row = row.saturating_sub(1),
            }
            let (Ok(c), Ok(r)) = (u8::try_from(column), u8::try_from(row)) else {
                return;
            };
            let Some(cell) = self.cell(c, r) else {
                return;
            };
            if visited.contains(&(column, row, heading)) {
                return;
            }
            visited.push((column, row, heading));
            self.beam.push((c, r));
            if self.is_goal(c, r) {
                self.solved = true;
                return;
            }
            heading = heading.reflect(cell);
        }
    }

    fn time_limit(&self) -> f32 {
        f32::from(u16::try_from(self.config.time_limit_seconds).unwrap_or(u16::MAX))
    }
}

impl MinigameSession for SolarSession {
    fn kind(&self) -> MinigameKind {
        MinigameKind::Solar
    }

    fn start(&mut self) {
        self.started = true;
        info!(
            columns = self.config.columns,
            rows = self.config.rows,
            mirror_budget = self.config.mirror_budget,
            "Solar minigame started"
        );
    }

    fn update(&mut self, delta_seconds: f32) {
        if !self.started || self.is_finished() {
            return;
        }
        self.elapsed += sanitize_delta(delta_seconds);
    }

    fn handle_input(&mut self, input: MinigameInput) {
        if !self.started || self.is_finished() {
            return;
        }
        match input {
            MinigameInput::PrimaryDown => self.cycle_focused(),
            MinigameInput::PrimaryUp => {}
            MinigameInput::Axis(value) => {
                let value = clamp_axis(value);
                if value.abs() < AXIS_DEADZONE {
                    self.axis_latched = false;
                } else if !self.axis_latched {
                    self.axis_latched = true;
                    self.move_focus(value > 0.0);
                }
            }
        }
    }

    fn is_finished(&self) -> bool {
        self.solved || self.elapsed >= self.time_limit()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn score(&self) -> i32 {
        let Some(at) = self.solved_at.filter(|_| self.solved) else {
            return 0;
        };
        let left = (self.time_limit() - at).max(0.0).floor();
        let seconds_left = if left.is_finite() { left as i32 } else { 0 };
        self.config
            .solve_points
            .saturating_add(seconds_left.saturating_mul(self.config.time_bonus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SolarConfig {
        SolarConfig {
            columns: 4,
            rows: 4,
            source_row: 0,
            goal_column: 2,
            goal_row: 3,
            mirror_budget: 2,
            time_limit_seconds: 30,
            solve_points: 100,
            time_bonus: 2,
        }
    }

    #[test]
    fn beam_crosses_empty_grid() {
        let session = SolarSession::new(config());
        assert_eq!(session.beam(), &[(0, 0), (1, 0), (2, 0), (3, 0)]);
        assert!(!session.is_solved());
    }

    #[test]
    fn slash_mirror_turns_beam_north_into_goal() {
        let mut session = SolarSession::new(config());
        session.start();
        session.update(10.0);
        session.focus_on(2, 0);
        session.handle_input(MinigameInput::PrimaryDown);

        assert_eq!(session.cell(2, 0), Some(Cell::Slash));
        assert_eq!(session.beam(), &[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (2, 3)]);
        assert!(session.is_solved());
        assert!(session.is_finished());
        assert_eq!(session.score(), 100 + 20 * 2);
    }

    #[test]
    fn second_press_turns_mirror_the_other_way() {
        let mut session = SolarSession::new(config());
        session.start();
        session.focus_on(1, 0);
        session.handle_input(MinigameInput::PrimaryDown);
        session.handle_input(MinigameInput::PrimaryDown);
        assert_eq!(session.cell(1, 0), Some(Cell::Backslash));
        // Heading south from row 0 leaves the grid immediately.
        assert_eq!(session.beam(), &[(0, 0), (1, 0)]);
    }

    #[test]
    fn mirror_budget_is_enforced() {
        let mut session = SolarSession::new(config());
        session.start();
        for column in 0..3 {
            session.focus_on(column, 2);
            session.handle_input(MinigameInput::PrimaryDown);
        }
        assert_eq!(session.mirrors_placed(), 2);
        assert_eq!(session.cell(2, 2), Some(Cell::Empty));
    }

    #[test]
    fn axis_moves_focus_once_per_deflection() {
        let mut session = SolarSession::new(config());
        session.start();
        session.handle_input(MinigameInput::Axis(1.0));
        session.handle_input(MinigameInput::Axis(1.0));
        assert_eq!(session.focus(), (1, 0));
        session.handle_input(MinigameInput::Axis(0.0));
        session.handle_input(MinigameInput::Axis(-1.0));
        assert_eq!(session.focus(), (0, 0));
        session.handle_input(MinigameInput::Axis(0.0));
        session.handle_input(MinigameInput::Axis(-1.0));
        assert_eq!(session.focus(), (3, 3));
    }

    #[test]
    fn time_limit_ends_unsolved_with_zero_score() {
        let mut session = SolarSession::new(config());
        session.start();
        session.update(29.0);
        assert!(!session.is_finished());
        session.update(1.0);
        assert!(session.is_finished());
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn input_before_start_is_ignored() {
        let mut session = SolarSession::new(config());
        session.handle_input(MinigameInput::PrimaryDown);
        assert_eq!(session.mirrors_placed(), 0);
    }
}
