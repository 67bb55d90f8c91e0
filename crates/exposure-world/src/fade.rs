//! Two independent, delayed, one-shot screen fade timers.
//!
//! A request arms a timer with a delay. When the delay runs out the timer
//! fires exactly once, producing a [`FadeFired`] that tells the presentation
//! layer to play the fade over `duration` seconds, and disarms itself.
//!
//! Fade-in and fade-out share nothing: either may be armed while the other
//! is counting down. Re-arming a timer restarts it; requests are never
//! queued.

use exposure_types::{FadeDirection, FadeFired};
use tracing::{debug, warn};

/// One delayed one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FadeTimer {
    armed: bool,
    remaining: f32,
    duration: f32,
}

impl FadeTimer {
    /// Whether the timer is counting down.
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Seconds left before the timer fires (zero when disarmed).
    pub const fn remaining(&self) -> f32 {
        if self.armed { self.remaining } else { 0.0 }
    }

    fn arm(&mut self, delay: f32, duration: f32) {
        self.armed = true;
        self.remaining = delay;
        self.duration = duration;
    }

    /// Count down; returns the fade duration if the timer fired this step.
    fn advance(&mut self, delta_seconds: f32) -> Option<f32> {
        if !self.armed {
            return None;
        }
        self.remaining -= delta_seconds;
        if self.remaining <= 0.0 {
            self.armed = false;
            self.remaining = 0.0;
            Some(self.duration)
        } else {
            None
        }
    }
}

/// Fade-in and fade-out timers.
#[derive(Debug, Clone, Default)]
pub struct FadeTransitionController {
    fade_in: FadeTimer,
    fade_out: FadeTimer,
}

impl FadeTransitionController {
    /// Create a controller with both timers disarmed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or restart) the fade-in timer.
    pub fn request_fade_in(&mut self, delay: f32, duration: f32) {
        self.request(FadeDirection::In, delay, duration);
    }

    /// Arm (or restart) the fade-out timer.
    pub fn request_fade_out(&mut self, delay: f32, duration: f32) {
        self.request(FadeDirection::Out, delay, duration);
    }

    /// Arm (or restart) the timer for `direction`.
    ///
    /// Negative or non-finite values are clamped to zero.
    pub fn request(&mut self, direction: FadeDirection, delay: f32, duration: f32) {
        let delay = non_negative(delay, "delay", direction);
        let duration = non_negative(duration, "duration", direction);
        let timer = self.timer_mut(direction);
        if timer.is_armed() {
            debug!(?direction, "Fade re-armed before firing");
        }
        timer.arm(delay, duration);
    }

    /// Advance both timers and return the fades that fired this step.
    ///
    /// When both expire on the same step, fade-in is reported first.
    pub fn update(&mut self, delta_seconds: f32) -> Vec<FadeFired> {
        let delta = if delta_seconds.is_finite() {
            delta_seconds.max(0.0)
        } else {
            0.0
        };

        let mut fired = Vec::new();
        if let Some(duration) = self.fade_in.advance(delta) {
            fired.push(FadeFired {
                direction: FadeDirection::In,
                duration,
            });
        }
        if let Some(duration) = self.fade_out.advance(delta) {
            fired.push(FadeFired {
                direction: FadeDirection::Out,
                duration,
            });
        }
        fired
    }

    /// Whether the timer for `direction` is counting down.
    pub const fn is_armed(&self, direction: FadeDirection) -> bool {
        match direction {
            FadeDirection::In => self.fade_in.is_armed(),
            FadeDirection::Out => self.fade_out.is_armed(),
        }
    }

    /// Read-only view of a timer.
    pub const fn timer(&self, direction: FadeDirection) -> &FadeTimer {
        match direction {
            FadeDirection::In => &self.fade_in,
            FadeDirection::Out => &self.fade_out,
        }
    }

    fn timer_mut(&mut self, direction: FadeDirection) -> &mut FadeTimer {
        match direction {
            FadeDirection::In => &mut self.fade_in,
            FadeDirection::Out => &mut self.fade_out,
        }
    }
}

fn non_negative(value: f32, field: &'static str, direction: FadeDirection) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        warn!(?direction, field, value, "Invalid fade timing clamped to zero");
        0.0
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn fade_in_fires_before_fade_out_each_once() {
        let mut fades = FadeTransitionController::new();
        fades.request_fade_in(0.75, 1.0);
        // One tick later, while fade-in is still counting down.
        let _ = fades.update(0.1);
        fades.request_fade_out(3.5, 1.0);

        let mut order = Vec::new();
        for step in 0..60 {
            for fired in fades.update(0.1) {
                order.push((fired.direction, step));
            }
        }

        assert_eq!(order.len(), 2);
        assert_eq!(order.first().map(|o| o.0), Some(FadeDirection::In));
        assert_eq!(order.get(1).map(|o| o.0), Some(FadeDirection::Out));
        assert!(!fades.is_armed(FadeDirection::In));
        assert!(!fades.is_armed(FadeDirection::Out));
    }

    #[test]
    fn fired_notification_carries_duration() {
        let mut fades = FadeTransitionController::new();
        fades.request_fade_out(0.0, 2.5);
        let fired = fades.update(0.016);
        assert_eq!(
            fired,
            vec![FadeFired {
                direction: FadeDirection::Out,
                duration: 2.5
            }]
        );
    }

    #[test]
    fn rearming_restarts_without_queueing() {
        let mut fades = FadeTransitionController::new();
        fades.request_fade_in(1.0, 1.0);
        let _ = fades.update(0.8);
        fades.request_fade_in(1.0, 0.5);
        assert!(fades.update(0.5).is_empty());
        let fired = fades.update(0.6);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired.first().map(|f| f.duration), Some(0.5));
        // Nothing left over from the first request.
        assert!(fades.update(5.0).is_empty());
    }

    #[test]
    fn same_step_expiry_reports_in_first() {
        let mut fades = FadeTransitionController::new();
        fades.request_fade_out(0.5, 1.0);
        fades.request_fade_in(0.5, 1.0);
        let fired = fades.update(1.0);
        let directions: Vec<FadeDirection> = fired.iter().map(|f| f.direction).collect();
        assert_eq!(directions, vec![FadeDirection::In, FadeDirection::Out]);
    }

    #[test]
    fn invalid_timings_clamp_to_zero() {
        let mut fades = FadeTransitionController::new();
        fades.request_fade_in(-3.0, f32::NAN);
        let fired = fades.update(0.0);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired.first().map(|f| f.duration), Some(0.0));
    }

    #[test]
    fn remaining_counts_down() {
        let mut fades = FadeTransitionController::new();
        fades.request_fade_out(1.0, 1.0);
        let _ = fades.update(0.25);
        let remaining = fades.timer(FadeDirection::Out).remaining();
        assert!((remaining - 0.75).abs() < 1e-6);
    }
}
