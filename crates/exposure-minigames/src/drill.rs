//! Drill: hold the primary button to drill, release before it overheats.
//!
//! Drilling adds depth and heat; idling sheds heat. Reaching the overheat
//! threshold locks the drill for `lockout_seconds` and requires a fresh
//! press afterwards. The session ends at the time limit or once the target
//! depth is reached.

use exposure_types::MinigameKind;
use tracing::{debug, info};

use crate::config::DrillConfig;
use crate::session::{MinigameInput, MinigameSession, sanitize_delta};

/// A drill session.
#[derive(Debug)]
pub struct DrillSession {
    config: DrillConfig,
    started: bool,
    holding: bool,
    depth: f32,
    heat: f32,
    lockout: f32,
    elapsed: f32,
    overheats: u32,
}

impl DrillSession {
    /// Create a session.
    pub const fn new(config: DrillConfig) -> Self {
        Self {
            config,
            started: false,
            holding: false,
            depth: 0.0,
            heat: 0.0,
            lockout: 0.0,
            elapsed: 0.0,
            overheats: 0,
        }
    }

    /// Depth drilled so far.
    pub const fn depth(&self) -> f32 {
        self.depth
    }

    /// Current drill heat.
    pub const fn heat(&self) -> f32 {
        self.heat
    }

    /// Whether the drill is locked after overheating.
    pub fn is_locked(&self) -> bool {
        self.lockout > 0.0
    }

    /// How many times the drill overheated.
    pub const fn overheats(&self) -> u32 {
        self.overheats
    }

    fn cool(&mut self, delta: f32) {
        self.heat = (self.heat - self.config.cool_rate * delta).max(0.0);
    }
}

impl MinigameSession for DrillSession {
    fn kind(&self) -> MinigameKind {
        MinigameKind::Drill
    }

    fn start(&mut self) {
        self.started = true;
        info!(
            time_limit = self.config.time_limit,
            target_depth = self.config.target_depth,
            "Drill minigame started"
        );
    }

    fn update(&mut self, delta_seconds: f32) {
        if !self.started || self.is_finished() {
            return;
        }
        let delta = sanitize_delta(delta_seconds);
        self.elapsed += delta;

        if self.is_locked() {
            self.lockout = (self.lockout - delta).max(0.0);
            self.cool(delta);
        } else if self.holding {
            self.depth += self.config.drill_speed * delta;
            self.heat += self.config.heat_rate * delta;
            if self.heat >= self.config.overheat_threshold {
                self.holding = false;
                self.lockout = self.config.lockout_seconds.max(0.0);
                self.overheats = self.overheats.saturating_add(1);
                debug!(depth = self.depth, overheats = self.overheats, "Drill overheated");
            }
        } else {
            self.cool(delta);
        }

        if self.is_finished() {
            info!(depth = self.depth, score = self.score(), "Drill minigame finished");
        }
    }

    fn handle_input(&mut self, input: MinigameInput) {
        match input {
            MinigameInput::PrimaryDown if !self.is_locked() => self.holding = true,
            MinigameInput::PrimaryUp => self.holding = false,
            MinigameInput::PrimaryDown | MinigameInput::Axis(_) => {}
        }
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.config.time_limit || self.depth >= self.config.target_depth
    }

    #[allow(clippy::cast_possible_truncation)]
    fn score(&self) -> i32 {
        let raw = (self.depth * self.config.points_per_depth).floor();
        if raw.is_finite() {
            raw.clamp(0.0, 1_000_000.0) as i32
        } else {
            0
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn config() -> DrillConfig {
        DrillConfig {
            time_limit: 10.0,
            drill_speed: 1.0,
            target_depth: 100.0,
            heat_rate: 50.0,
            cool_rate: 25.0,
            overheat_threshold: 100.0,
            lockout_seconds: 1.0,
            points_per_depth: 10.0,
        }
    }

    #[test]
    fn holding_drills_and_releasing_cools() {
        let mut drill = DrillSession::new(config());
        drill.start();
        drill.handle_input(MinigameInput::PrimaryDown);
        drill.update(1.0);
        assert_eq!(drill.depth(), 1.0);
        assert_eq!(drill.heat(), 50.0);

        drill.handle_input(MinigameInput::PrimaryUp);
        drill.update(1.0);
        assert_eq!(drill.depth(), 1.0);
        assert_eq!(drill.heat(), 25.0);
        assert_eq!(drill.score(), 10);
    }

    #[test]
    fn overheating_locks_and_needs_fresh_press() {
        let mut drill = DrillSession::new(config());
        drill.start();
        drill.handle_input(MinigameInput::PrimaryDown);
        drill.update(1.0);
        drill.update(1.0);
        assert!(drill.is_locked());
        assert_eq!(drill.overheats(), 1);

        // Presses during lockout are ignored.
        drill.handle_input(MinigameInput::PrimaryDown);
        drill.update(1.0);
        assert!(!drill.is_locked());
        assert_eq!(drill.depth(), 2.0);

        // Holding from before the lockout does not resume drilling.
        drill.update(1.0);
        assert_eq!(drill.depth(), 2.0);
    }

    #[test]
    fn time_limit_finishes() {
        let mut drill = DrillSession::new(config());
        drill.start();
        for _ in 0..9 {
            drill.update(1.0);
            assert!(!drill.is_finished());
        }
        drill.update(1.0);
        assert!(drill.is_finished());
        assert_eq!(drill.score(), 0);
    }

    #[test]
    fn target_depth_finishes_early() {
        let mut drill = DrillSession::new(DrillConfig {
            target_depth: 1.5,
            ..config()
        });
        drill.start();
        drill.handle_input(MinigameInput::PrimaryDown);
        drill.update(1.0);
        assert!(!drill.is_finished());
        drill.update(1.0);
        assert!(drill.is_finished());
        let depth = drill.depth();
        drill.update(1.0);
        assert_eq!(drill.depth(), depth);
    }

    #[test]
    fn ignores_updates_before_start() {
        let mut drill = DrillSession::new(config());
        drill.handle_input(MinigameInput::PrimaryDown);
        drill.update(5.0);
        assert_eq!(drill.depth(), 0.0);
        assert_eq!(drill.kind(), MinigameKind::Drill);
    }
}
