//! Cart catcher: steer a mine wagon under falling uranium, dodge debris.
//!
//! Pieces drop from `spawn_height` at a random horizontal position within
//! the wagon's movement range, one at a time after a random pause. A piece
//! reaching `death_threshold` is resolved: caught uranium scores points,
//! caught debris costs a life, anything missed just disappears.
//!
//! The session ends when the lives run out or every piece has been
//! dropped and resolved.

use exposure_types::MinigameKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::CartConfig;
use crate::session::{MinigameInput, MinigameSession, clamp_axis, sanitize_delta};

/// What a falling piece is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    /// Worth points when caught.
    Uranium,
    /// Costs a life when caught.
    Debris,
}

/// One piece in the air.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallingPiece {
    /// Uranium or debris.
    pub kind: PieceKind,
    /// Horizontal position.
    pub x: f32,
    /// Height.
    pub y: f32,
}

/// A cart catcher session.
#[derive(Debug)]
pub struct CartSession {
    config: CartConfig,
    rng: StdRng,
    started: bool,
    wagon_x: f32,
    axis: f32,
    uranium_left: u32,
    debris_left: u32,
    next_spawn_delay: f32,
    falling: Vec<FallingPiece>,
    points: i32,
    lives: u8,
}

impl CartSession {
    /// Create a session whose drops are drawn from `seed`.
    pub fn new(config: CartConfig, seed: u64) -> Self {
        let (low, high) = ordered(config.movement_min, config.movement_max);
        Self {
            config: CartConfig {
                movement_min: low,
                movement_max: high,
                ..config
            },
            rng: StdRng::seed_from_u64(seed),
            started: false,
            wagon_x: (low + high) / 2.0,
            axis: 0.0,
            uranium_left: config.uranium_to_spawn,
            debris_left: config.debris_to_spawn,
            next_spawn_delay: 0.0,
            falling: Vec::new(),
            points: 0,
            lives: config.initial_lives,
        }
    }

    /// Current wagon position.
    pub const fn wagon_x(&self) -> f32 {
        self.wagon_x
    }

    /// Lives left.
    pub const fn lives(&self) -> u8 {
        self.lives
    }

    /// Pieces currently in the air.
    pub fn falling(&self) -> &[FallingPiece] {
        &self.falling
    }

    /// Pieces not yet dropped.
    pub const fn left_to_spawn(&self) -> u32 {
        self.uranium_left.saturating_add(self.debris_left)
    }

    fn move_wagon(&mut self, delta: f32) {
        let x = self.axis.mul_add(self.config.wagon_speed * delta, self.wagon_x);
        self.wagon_x = x.clamp(self.config.movement_min, self.config.movement_max);
    }

    fn spawn_if_due(&mut self, delta: f32) {
        self.next_spawn_delay -= delta;
        if self.next_spawn_delay > 0.0 || self.left_to_spawn() == 0 {
            return;
        }

        // Weight the draw by what is left so the mix stays even.
        let total = self.left_to_spawn();
        let kind = if self.rng.random_range(0..total) < self.uranium_left {
            self.uranium_left = self.uranium_left.saturating_sub(1);
            PieceKind::Uranium
        } else {
            self.debris_left = self.debris_left.saturating_sub(1);
            PieceKind::Debris
        };
        let x = if self.config.movement_max > self.config.movement_min {
            self.rng
                .random_range(self.config.movement_min..=self.config.movement_max)
        } else {
            self.config.movement_min
        };
        self.falling.push(FallingPiece {
            kind,
            x,
            y: self.config.spawn_height,
        });

        let (low, high) = ordered(
            self.config.spawn_interval_min,
            self.config.spawn_interval_max,
        );
        self.next_spawn_delay = if high > low {
            self.rng.random_range(low..=high)
        } else {
            low
        };
        debug!(?kind, x, "Piece dropped");
    }

    fn resolve_landed(&mut self, delta: f32) {
        let fall = self.config.falling_speed * delta;
        for piece in &mut self.falling {
            piece.y -= fall;
        }

        let threshold = self.config.death_threshold;
        let (landed, airborne): (Vec<FallingPiece>, Vec<FallingPiece>) = self
            .falling
            .drain(..)
            .partition(|piece| piece.y <= threshold);
        self.falling = airborne;

        for piece in landed {
            let caught = (piece.x - self.wagon_x).abs() <= self.config.catch_half_width;
            match (piece.kind, caught) {
                (PieceKind::Uranium, true) => {
                    self.points = self.points.saturating_add(self.config.points_per_uranium);
                }
                (PieceKind::Debris, true) => {
                    self.lives = self.lives.saturating_sub(1);
                    debug!(lives = self.lives, "Debris caught");
                }
                (_, false) => {}
            }
        }
    }
}

impl MinigameSession for CartSession {
    fn kind(&self) -> MinigameKind {
        MinigameKind::Mine
    }

    fn start(&mut self) {
        self.started = true;
        self.next_spawn_delay = self.config.spawn_interval_min.max(0.0);
        info!(
            uranium = self.uranium_left,
            debris = self.debris_left,
            lives = self.lives,
            "Cart minigame started"
        );
    }

    fn update(&mut self, delta_seconds: f32) {
        if !self.started || self.is_finished() {
            return;
        }
        let delta = sanitize_delta(delta_seconds);
        self.move_wagon(delta);
        self.spawn_if_due(delta);
        self.resolve_landed(delta);
        if self.is_finished() {
            info!(points = self.points, lives = self.lives, "Cart minigame finished");
        }
    }

    fn handle_input(&mut self, input: MinigameInput) {
        if let MinigameInput::Axis(value) = input {
            self.axis = clamp_axis(value);
        }
    }

    fn is_finished(&self) -> bool {
        self.lives == 0 || (self.left_to_spawn() == 0 && self.falling.is_empty())
    }

    fn score(&self) -> i32 {
        self.points
    }
}

fn ordered(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn config() -> CartConfig {
        CartConfig {
            uranium_to_spawn: 3,
            debris_to_spawn: 0,
            spawn_interval_min: 0.1,
            spawn_interval_max: 0.1,
            movement_min: 0.0,
            movement_max: 0.0,
            falling_speed: 100.0,
            spawn_height: 100.0,
            death_threshold: 0.0,
            catch_half_width: 10.0,
            points_per_uranium: 5,
            ..CartConfig::default()
        }
    }

    #[test]
    fn nothing_happens_before_start() {
        let mut session = CartSession::new(config(), 1);
        session.update(10.0);
        assert_eq!(session.left_to_spawn(), 3);
        assert!(session.falling().is_empty());
    }

    #[test]
    fn catching_uranium_scores_and_finishes() {
        let mut session = CartSession::new(config(), 7);
        session.start();
        for _ in 0..200 {
            session.update(0.05);
            if session.is_finished() {
                break;
            }
        }
        assert!(session.is_finished());
        assert_eq!(session.score(), 15);
        assert_eq!(session.lives(), 3);
    }

    #[test]
    fn caught_debris_costs_lives_until_game_over() {
        let mut session = CartSession::new(
            CartConfig {
                uranium_to_spawn: 0,
                debris_to_spawn: 10,
                initial_lives: 2,
                spawn_interval_min: 0.5,
                spawn_interval_max: 0.5,
                ..config()
            },
            3,
        );
        session.start();
        for _ in 0..500 {
            session.update(0.05);
        }
        assert!(session.is_finished());
        assert_eq!(session.lives(), 0);
        // Pieces remain because the game ended early.
        assert!(session.left_to_spawn() > 0);
    }

    #[test]
    fn wagon_follows_axis_within_bounds() {
        let mut session = CartSession::new(
            CartConfig {
                movement_min: -100.0,
                movement_max: 100.0,
                wagon_speed: 50.0,
                ..config()
            },
            0,
        );
        session.start();
        assert_eq!(session.wagon_x(), 0.0);
        session.handle_input(MinigameInput::Axis(1.0));
        session.update(1.0);
        assert_eq!(session.wagon_x(), 50.0);
        session.handle_input(MinigameInput::Axis(-5.0));
        session.update(10.0);
        assert_eq!(session.wagon_x(), -100.0);
    }

    #[test]
    fn same_seed_same_drops() {
        let cfg = CartConfig {
            movement_min: -500.0,
            movement_max: 500.0,
            debris_to_spawn: 4,
            spawn_interval_max: 0.4,
            ..config()
        };
        let mut a = CartSession::new(cfg, 99);
        let mut b = CartSession::new(cfg, 99);
        a.start();
        b.start();
        for _ in 0..20 {
            a.update(0.05);
            b.update(0.05);
            assert_eq!(a.falling(), b.falling());
        }
    }

    #[test]
    fn reports_mine_kind() {
        let session = CartSession::new(CartConfig::default(), 0);
        assert_eq!(session.kind(), MinigameKind::Mine);
    }
}
