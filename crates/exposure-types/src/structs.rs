//! Plain data structs shared between the orchestrator, its components, and
//! the host.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::enums::{FadeDirection, Phase};

/// A camera position plus Euler rotation (pitch, yaw, roll in degrees).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// World-space position.
    pub position: Vec3,
    /// Euler rotation in degrees.
    pub rotation: Vec3,
}

impl Pose {
    /// Build a pose from raw component arrays.
    pub const fn new(position: [f32; 3], rotation: [f32; 3]) -> Self {
        Self {
            position: Vec3::from_array(position),
            rotation: Vec3::from_array(rotation),
        }
    }

    /// Straight-line distance between the two positions.
    pub fn distance(&self, other: &Self) -> f32 {
        self.position.distance(other.position)
    }
}

/// Energy and pollution levels with their animation targets.
///
/// `current_*` approaches `target_*` over successive updates. Values are not
/// clamped to `max_*`; the caller decides what exceeding a maximum means.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResourceLevels {
    /// Displayed energy level.
    pub current_energy: f32,
    /// Displayed pollution level.
    pub current_pollution: f32,
    /// Energy level being animated toward.
    pub target_energy: f32,
    /// Pollution level being animated toward.
    pub target_pollution: f32,
    /// Energy capacity (grows with the difficulty ramp).
    pub max_energy: i32,
    /// Pollution tolerance (grows with the difficulty ramp).
    pub max_pollution: i32,
}

impl ResourceLevels {
    /// Levels at rest: targets equal the current values.
    pub const fn at_rest(energy: f32, pollution: f32, max_energy: i32, max_pollution: i32) -> Self {
        Self {
            current_energy: energy,
            current_pollution: pollution,
            target_energy: energy,
            target_pollution: pollution,
            max_energy,
            max_pollution,
        }
    }
}

/// A change to energy and pollution contributed by one unit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourceDelta {
    /// Energy added.
    pub energy: f32,
    /// Pollution added.
    pub pollution: f32,
}

impl ResourceDelta {
    /// Build a delta.
    pub const fn new(energy: f32, pollution: f32) -> Self {
        Self { energy, pollution }
    }

    /// The delta that undoes this one.
    pub fn negated(self) -> Self {
        Self {
            energy: -self.energy,
            pollution: -self.pollution,
        }
    }
}

/// Turn counter and current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// 1-based turn number.
    pub current_turn: u32,
    /// Last playable turn; advancing past it ends the game.
    pub max_turns: u32,
    /// Active phase.
    pub phase: Phase,
}

/// Notification that a fade timer expired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeFired {
    /// Which fade fired.
    pub direction: FadeDirection,
    /// How long the presentation layer should take to play the fade.
    pub duration: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_distance_ignores_rotation() {
        let a = Pose::new([0.0, 0.0, 0.0], [0.0, 90.0, 0.0]);
        let b = Pose::new([3.0, 4.0, 0.0], [0.0, 0.0, 0.0]);
        assert!((a.distance(&b) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn negated_delta() {
        let delta = ResourceDelta::new(3.0, 1.0).negated();
        assert!((delta.energy + 3.0).abs() < f32::EPSILON);
        assert!((delta.pollution + 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn pose_serializes_as_arrays() {
        let pose = Pose::new([1.0, 2.0, 3.0], [0.0, 0.0, 170.0]);
        let json = serde_json::to_value(pose).ok();
        let expected = serde_json::json!({
            "position": [1.0, 2.0, 3.0],
            "rotation": [0.0, 0.0, 170.0],
        });
        assert_eq!(json, Some(expected));
    }
}
