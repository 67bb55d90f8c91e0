//! Energy and pollution levels animated toward their targets.
//!
//! Placing a unit does not change the displayed levels instantly. Instead
//! [`ResourceModel::add_resources`] moves the targets and every frame
//! [`ResourceModel::update`] steps the current values toward them at a fixed
//! rate, which drives the animated resource bars.
//!
//! Every `interval`-th turn the difficulty ramp raises both maximums.
//! Nothing here clamps current values to those maximums; exceeding them is
//! a condition the caller judges.

use exposure_types::{ResourceDelta, ResourceLevels};
use serde::Deserialize;
use tracing::debug;

/// Periodic increase of the resource maximums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DifficultyRamp {
    /// Apply the ramp on every turn divisible by this value (0 disables).
    #[serde(default = "default_ramp_interval")]
    pub interval: u32,
    /// Added to `max_energy` on a ramp turn.
    #[serde(default = "default_ramp_energy")]
    pub energy_step: i32,
    /// Added to `max_pollution` on a ramp turn.
    #[serde(default = "default_ramp_pollution")]
    pub pollution_step: i32,
}

impl Default for DifficultyRamp {
    fn default() -> Self {
        Self {
            interval: default_ramp_interval(),
            energy_step: default_ramp_energy(),
            pollution_step: default_ramp_pollution(),
        }
    }
}

const fn default_ramp_interval() -> u32 {
    3
}

const fn default_ramp_energy() -> i32 {
    2
}

const fn default_ramp_pollution() -> i32 {
    1
}

/// Current and target resource levels plus the lerp state.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceModel {
    levels: ResourceLevels,
    rate: f32,
    ramp: DifficultyRamp,
    lerping: bool,
}

impl ResourceModel {
    /// Create a model at rest.
    ///
    /// A non-finite or negative `rate` falls back to `1.0` unit per second.
    pub fn new(levels: ResourceLevels, rate: f32, ramp: DifficultyRamp) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
        Self {
            levels,
            rate,
            ramp,
            lerping: false,
        }
    }

    /// Snapshot of the current levels.
    pub const fn levels(&self) -> ResourceLevels {
        self.levels
    }

    /// Whether the values are still moving toward their targets.
    pub const fn is_lerping(&self) -> bool {
        self.lerping
    }

    /// Move the targets by the given deltas and start animating.
    ///
    /// Deltas accumulate onto the targets, so a call made while a previous
    /// contribution is still animating keeps that contribution.
    pub fn add_resources(&mut self, energy_delta: f32, pollution_delta: f32) {
        self.levels.target_energy += sanitize(energy_delta);
        self.levels.target_pollution += sanitize(pollution_delta);
        self.lerping = true;
        debug!(
            target_energy = self.levels.target_energy,
            target_pollution = self.levels.target_pollution,
            "Resource targets set"
        );
    }

    /// Convenience wrapper over [`add_resources`](Self::add_resources).
    pub fn apply_delta(&mut self, delta: ResourceDelta) {
        self.add_resources(delta.energy, delta.pollution);
    }

    /// Advance the animation by `delta_seconds`.
    ///
    /// Each value moves toward its target by at most `rate * delta_seconds`
    /// and lands exactly on the target when within one step. The lerp flag
    /// clears on the call that brings both values onto their targets.
    pub fn update(&mut self, delta_seconds: f32) {
        if !self.lerping {
            return;
        }
        let step = self.rate * sanitize(delta_seconds).max(0.0);

        self.levels.current_energy =
            approach(self.levels.current_energy, self.levels.target_energy, step);
        self.levels.current_pollution =
            approach(self.levels.current_pollution, self.levels.target_pollution, step);

        if reached(self.levels.current_energy, self.levels.target_energy)
            && reached(self.levels.current_pollution, self.levels.target_pollution)
        {
            self.lerping = false;
            debug!(
                energy = self.levels.current_energy,
                pollution = self.levels.current_pollution,
                "Resources settled"
            );
        }
    }

    /// Apply the difficulty ramp for `turn`.
    ///
    /// Returns `true` if the maximums were raised.
    pub fn on_new_turn(&mut self, turn: u32) -> bool {
        if self.ramp.interval == 0 || turn == 0 {
            return false;
        }
        if turn.checked_rem(self.ramp.interval).unwrap_or(1) != 0 {
            return false;
        }

        let old_energy = self.levels.max_energy;
        let old_pollution = self.levels.max_pollution;
        self.levels.max_energy = old_energy.saturating_add(self.ramp.energy_step);
        self.levels.max_pollution = old_pollution.saturating_add(self.ramp.pollution_step);
        debug!(
            turn,
            old_energy,
            new_energy = self.levels.max_energy,
            old_pollution,
            new_pollution = self.levels.max_pollution,
            "Difficulty ramp applied"
        );
        true
    }
}

/// Constant-rate approach: move `current` toward `target` by at most `step`.
fn approach(current: f32, target: f32, step: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= step {
        target
    } else {
        current + step.copysign(diff)
    }
}

/// Exact arrival check; `approach` snaps onto the target so no tolerance is
/// needed.
fn reached(current: f32, target: f32) -> bool {
    (target - current).abs() <= 0.0
}

/// Replace NaN and infinities with zero.
fn sanitize(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn model(energy: f32, pollution: f32) -> ResourceModel {
        ResourceModel::new(
            ResourceLevels::at_rest(energy, pollution, 6, 6),
            1.0,
            DifficultyRamp::default(),
        )
    }

    #[test]
    fn reaches_target_exactly_after_five_updates() {
        let mut m = model(0.0, 1.0);
        m.add_resources(5.0, 0.0);

        for call in 1..=4 {
            m.update(1.0);
            assert!(m.is_lerping(), "lerp must still be active after call {call}");
        }
        m.update(1.0);
        assert_eq!(m.levels().current_energy, 5.0);
        assert!(!m.is_lerping());
    }

    #[test]
    fn moves_at_constant_rate() {
        let mut m = model(0.0, 0.0);
        m.add_resources(4.0, 2.0);
        m.update(0.5);
        assert_eq!(m.levels().current_energy, 0.5);
        assert_eq!(m.levels().current_pollution, 0.5);
        m.update(1.5);
        assert_eq!(m.levels().current_energy, 2.0);
        // Pollution reached its target; energy keeps going.
        assert_eq!(m.levels().current_pollution, 2.0);
        assert!(m.is_lerping());
    }

    #[test]
    fn second_delta_mid_animation_keeps_the_first() {
        let mut m = model(0.0, 1.0);
        m.add_resources(3.0, 3.0);
        m.update(1.0 / 60.0);
        m.add_resources(2.0, 1.0);

        assert_eq!(m.levels().target_energy, 5.0);
        assert_eq!(m.levels().target_pollution, 5.0);
        for _ in 0..5 {
            m.update(1.0);
        }
        assert_eq!(m.levels().current_energy, 5.0);
        assert_eq!(m.levels().current_pollution, 5.0);
        assert!(!m.is_lerping());
    }

    #[test]
    fn removal_mid_animation_subtracts_from_target() {
        let mut m = model(0.0, 1.0);
        m.add_resources(2.0, 1.0);
        m.update(0.5);
        m.add_resources(-2.0, -1.0);

        assert_eq!(m.levels().target_energy, 0.0);
        assert_eq!(m.levels().target_pollution, 1.0);
        m.update(1.0);
        assert_eq!(m.levels().current_energy, 0.0);
        assert_eq!(m.levels().current_pollution, 1.0);
        assert!(!m.is_lerping());
    }

    #[test]
    fn negative_delta_moves_down() {
        let mut m = model(3.0, 3.0);
        m.add_resources(-3.0, -1.0);
        for _ in 0..3 {
            m.update(1.0);
        }
        assert_eq!(m.levels().current_energy, 0.0);
        assert_eq!(m.levels().current_pollution, 2.0);
        assert!(!m.is_lerping());
    }

    #[test]
    fn values_are_not_clamped_to_max() {
        let mut m = model(5.0, 5.0);
        m.add_resources(3.0, 3.0);
        for _ in 0..5 {
            m.update(1.0);
        }
        assert_eq!(m.levels().current_energy, 8.0);
        assert!(m.levels().current_energy > m.levels().max_energy as f32);
    }

    #[test]
    fn nan_delta_time_is_ignored() {
        let mut m = model(0.0, 0.0);
        m.add_resources(1.0, 0.0);
        m.update(f32::NAN);
        assert_eq!(m.levels().current_energy, 0.0);
        m.update(-1.0);
        assert_eq!(m.levels().current_energy, 0.0);
        assert!(m.is_lerping());
    }

    #[test]
    fn ramp_on_every_third_turn() {
        let mut m = model(0.0, 1.0);
        for turn in 2..=9 {
            let ramped = m.on_new_turn(turn);
            assert_eq!(ramped, turn % 3 == 0, "turn {turn}");
        }
        assert_eq!(m.levels().max_energy, 6 + 6);
        assert_eq!(m.levels().max_pollution, 6 + 3);
    }

    #[test]
    fn ramp_disabled_with_zero_interval() {
        let mut m = ResourceModel::new(
            ResourceLevels::at_rest(0.0, 0.0, 6, 6),
            1.0,
            DifficultyRamp {
                interval: 0,
                ..DifficultyRamp::default()
            },
        );
        assert!(!m.on_new_turn(3));
        assert_eq!(m.levels().max_energy, 6);
    }

    #[test]
    fn invalid_rate_falls_back() {
        let mut m = ResourceModel::new(
            ResourceLevels::at_rest(0.0, 0.0, 6, 6),
            f32::NAN,
            DifficultyRamp::default(),
        );
        m.add_resources(1.0, 0.0);
        m.update(1.0);
        assert_eq!(m.levels().current_energy, 1.0);
    }
}
