//! Tuning for the reference minigames.
//!
//! Mirrors the `minigames` section of `exposure-config.yaml`. Every field
//! has a serde default so a partial section (or none at all) is valid.

use serde::Deserialize;

/// Tuning for all three minigames.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MinigameTuning {
    /// Cart catcher (mine).
    #[serde(default)]
    pub cart: CartConfig,
    /// Drill (oil rig).
    #[serde(default)]
    pub drill: DrillConfig,
    /// Mirror puzzle (solar).
    #[serde(default)]
    pub solar: SolarConfig,
}

// ---------------------------------------------------------------------------
// Cart
// ---------------------------------------------------------------------------

/// Cart catcher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CartConfig {
    /// Uranium pieces dropped per session.
    #[serde(default = "default_uranium_to_spawn")]
    pub uranium_to_spawn: u32,
    /// Debris pieces dropped per session.
    #[serde(default = "default_debris_to_spawn")]
    pub debris_to_spawn: u32,
    /// Shortest pause between two drops, in seconds.
    #[serde(default = "default_spawn_interval_min")]
    pub spawn_interval_min: f32,
    /// Longest pause between two drops, in seconds.
    #[serde(default = "default_spawn_interval_max")]
    pub spawn_interval_max: f32,
    /// Wagon speed at full axis deflection, units per second.
    #[serde(default = "default_wagon_speed")]
    pub wagon_speed: f32,
    /// Leftmost wagon position.
    #[serde(default = "default_movement_min")]
    pub movement_min: f32,
    /// Rightmost wagon position.
    #[serde(default = "default_movement_max")]
    pub movement_max: f32,
    /// Lives at session start.
    #[serde(default = "default_initial_lives")]
    pub initial_lives: u8,
    /// Fall speed of dropped pieces, units per second.
    #[serde(default = "default_falling_speed")]
    pub falling_speed: f32,
    /// Height at which a piece drops into the spawn area.
    #[serde(default = "default_spawn_height")]
    pub spawn_height: f32,
    /// Height at which a piece is either caught or lost.
    #[serde(default = "default_death_threshold")]
    pub death_threshold: f32,
    /// Horizontal half-width of the wagon's catching area.
    #[serde(default = "default_catch_half_width")]
    pub catch_half_width: f32,
    /// Points for each uranium piece caught.
    #[serde(default = "default_points_per_uranium")]
    pub points_per_uranium: i32,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            uranium_to_spawn: default_uranium_to_spawn(),
            debris_to_spawn: default_debris_to_spawn(),
            spawn_interval_min: default_spawn_interval_min(),
            spawn_interval_max: default_spawn_interval_max(),
            wagon_speed: default_wagon_speed(),
            movement_min: default_movement_min(),
            movement_max: default_movement_max(),
            initial_lives: default_initial_lives(),
            falling_speed: default_falling_speed(),
            spawn_height: default_spawn_height(),
            death_threshold: default_death_threshold(),
            catch_half_width: default_catch_half_width(),
            points_per_uranium: default_points_per_uranium(),
        }
    }
}

const fn default_uranium_to_spawn() -> u32 {
    12
}

const fn default_debris_to_spawn() -> u32 {
    6
}

const fn default_spawn_interval_min() -> f32 {
    0.5
}

const fn default_spawn_interval_max() -> f32 {
    1.5
}

const fn default_wagon_speed() -> f32 {
    800.0
}

const fn default_movement_min() -> f32 {
    -600.0
}

const fn default_movement_max() -> f32 {
    600.0
}

const fn default_initial_lives() -> u8 {
    3
}

const fn default_falling_speed() -> f32 {
    400.0
}

const fn default_spawn_height() -> f32 {
    1000.0
}

const fn default_death_threshold() -> f32 {
    0.0
}

const fn default_catch_half_width() -> f32 {
    90.0
}

const fn default_points_per_uranium() -> i32 {
    10
}

// ---------------------------------------------------------------------------
// Drill
// ---------------------------------------------------------------------------

/// Drill tuning.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DrillConfig {
    /// Session length in seconds.
    #[serde(default = "default_drill_time_limit")]
    pub time_limit: f32,
    /// Depth gained per second of drilling.
    #[serde(default = "default_drill_speed")]
    pub drill_speed: f32,
    /// Depth at which the well is finished early.
    #[serde(default = "default_target_depth")]
    pub target_depth: f32,
    /// Heat gained per second of drilling.
    #[serde(default = "default_heat_rate")]
    pub heat_rate: f32,
    /// Heat lost per second while not drilling.
    #[serde(default = "default_cool_rate")]
    pub cool_rate: f32,
    /// Heat at which the drill overheats.
    #[serde(default = "default_overheat_threshold")]
    pub overheat_threshold: f32,
    /// Seconds the drill stays locked after overheating.
    #[serde(default = "default_lockout_seconds")]
    pub lockout_seconds: f32,
    /// Points per unit of depth.
    #[serde(default = "default_points_per_depth")]
    pub points_per_depth: f32,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            time_limit: default_drill_time_limit(),
            drill_speed: default_drill_speed(),
            target_depth: default_target_depth(),
            heat_rate: default_heat_rate(),
            cool_rate: default_cool_rate(),
            overheat_threshold: default_overheat_threshold(),
            lockout_seconds: default_lockout_seconds(),
            points_per_depth: default_points_per_depth(),
        }
    }
}

const fn default_drill_time_limit() -> f32 {
    20.0
}

const fn default_drill_speed() -> f32 {
    1.0
}

const fn default_target_depth() -> f32 {
    15.0
}

const fn default_heat_rate() -> f32 {
    25.0
}

const fn default_cool_rate() -> f32 {
    20.0
}

const fn default_overheat_threshold() -> f32 {
    100.0
}

const fn default_lockout_seconds() -> f32 {
    2.0
}

const fn default_points_per_depth() -> f32 {
    10.0
}

// ---------------------------------------------------------------------------
// Solar
// ---------------------------------------------------------------------------

/// Mirror puzzle tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SolarConfig {
    /// Grid width in cells.
    #[serde(default = "default_solar_columns")]
    pub columns: u8,
    /// Grid height in cells.
    #[serde(default = "default_solar_rows")]
    pub rows: u8,
    /// Row through which the sun beam enters from the west edge.
    #[serde(default = "default_source_row")]
    pub source_row: u8,
    /// Column of the collector cell.
    #[serde(default = "default_goal_column")]
    pub goal_column: u8,
    /// Row of the collector cell.
    #[serde(default = "default_goal_row")]
    pub goal_row: u8,
    /// Mirrors the player may place.
    #[serde(default = "default_mirror_budget")]
    pub mirror_budget: u8,
    /// Session length in whole seconds.
    #[serde(default = "default_solar_time_limit")]
    pub time_limit_seconds: u32,
    /// Points for reaching the collector.
    #[serde(default = "default_solve_points")]
    pub solve_points: i32,
    /// Extra points per whole second left on the clock.
    #[serde(default = "default_time_bonus")]
    pub time_bonus: i32,
}

impl Default for SolarConfig {
    fn default() -> Self {
        Self {
            columns: default_solar_columns(),
            rows: default_solar_rows(),
            source_row: default_source_row(),
            goal_column: default_goal_column(),
            goal_row: default_goal_row(),
            mirror_budget: default_mirror_budget(),
            time_limit_seconds: default_solar_time_limit(),
            solve_points: default_solve_points(),
            time_bonus: default_time_bonus(),
        }
    }
}

const fn default_solar_columns() -> u8 {
    5
}

const fn default_solar_rows() -> u8 {
    5
}

const fn default_source_row() -> u8 {
    1
}

const fn default_goal_column() -> u8 {
    3
}

const fn default_goal_row() -> u8 {
    4
}

const fn default_mirror_budget() -> u8 {
    3
}

const fn default_solar_time_limit() -> u32 {
    45
}

const fn default_solve_points() -> i32 {
    100
}

const fn default_time_bonus() -> i32 {
    2
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let tuning: MinigameTuning = serde_json::from_str("{}").unwrap();
        assert_eq!(tuning, MinigameTuning::default());
        assert_eq!(tuning.cart.initial_lives, 3);
        assert_eq!(tuning.solar.columns, 5);
    }

    #[test]
    fn partial_section_overrides_only_given_fields() {
        let tuning: MinigameTuning =
            serde_json::from_str(r#"{"drill": {"time_limit": 5.0}}"#).unwrap();
        assert_eq!(tuning.drill.time_limit, 5.0);
        assert_eq!(tuning.drill.lockout_seconds, 2.0);
    }
}
