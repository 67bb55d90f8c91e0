//! The capability every minigame offers to the orchestrator.
//!
//! A session is created when the orchestrator commits a minigame entry and
//! dropped when the exit begins. Between those points it receives the
//! frame delta and forwarded player input, and reports when it is done.

use core::fmt;

use exposure_types::MinigameKind;

/// Player input forwarded to a running session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MinigameInput {
    /// Primary button pressed.
    PrimaryDown,
    /// Primary button released.
    PrimaryUp,
    /// Horizontal axis value in `[-1.0, 1.0]`.
    Axis(f32),
}

/// A running minigame.
pub trait MinigameSession: Send + fmt::Debug {
    /// Which minigame this is.
    fn kind(&self) -> MinigameKind;

    /// Begin play. Called once, after the camera has arrived.
    fn start(&mut self);

    /// Advance by `delta_seconds`. Does nothing before `start` or after
    /// the session finished.
    fn update(&mut self, delta_seconds: f32);

    /// React to player input.
    fn handle_input(&mut self, input: MinigameInput);

    /// Whether the session has reached its end condition.
    fn is_finished(&self) -> bool;

    /// Score so far.
    fn score(&self) -> i32;
}

/// Clamp an axis value into `[-1.0, 1.0]`, mapping NaN to zero.
pub(crate) fn clamp_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Replace a non-finite or negative frame delta with zero.
pub(crate) fn sanitize_delta(delta_seconds: f32) -> f32 {
    if delta_seconds.is_finite() {
        delta_seconds.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn axis_is_clamped() {
        assert_eq!(clamp_axis(3.0), 1.0);
        assert_eq!(clamp_axis(-7.5), -1.0);
        assert_eq!(clamp_axis(f32::NAN), 0.0);
        assert_eq!(clamp_axis(0.25), 0.25);
    }

    #[test]
    fn delta_is_sanitized() {
        assert_eq!(sanitize_delta(-1.0), 0.0);
        assert_eq!(sanitize_delta(f32::INFINITY), 0.0);
        assert_eq!(sanitize_delta(0.5), 0.5);
    }
}
