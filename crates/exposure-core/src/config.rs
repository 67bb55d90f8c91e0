//! Configuration loading and typed config structures for the Exposure turn
//! loop.
//!
//! The canonical configuration lives in `exposure-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, a loader, and [`GameConfig::validate`], which separates
//! fatal mistakes from ones that fall back to a default.

use std::collections::BTreeSet;
use std::path::Path;

use exposure_minigames::MinigameTuning;
use exposure_types::{MinigameKind, Pose, ResourceDelta, UnitKind, Vec3};
use exposure_world::{CameraSettings, DifficultyRamp};
use serde::Deserialize;
use tracing::warn;

/// Environment variable that overrides `game.seed`.
pub const SEED_ENV_VAR: &str = "EXPOSURE_SEED";

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value makes the game unplayable.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// A recoverable configuration problem. The named default has already been
/// applied when this is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `game.scheduled_turns` was unset; no turn is scheduled.
    ScheduledTurnsUnset,
    /// A minigame camera pose was unset; the home pose is used.
    MissingMinigamePose {
        /// The minigame without a pose.
        kind: MinigameKind,
    },
    /// A scheduled turn lies past `max_turns` and can never trigger.
    TurnOutOfRange {
        /// The unreachable turn.
        turn: u32,
    },
    /// `EXPOSURE_SEED` was set but not a valid `u64`.
    InvalidSeedOverride {
        /// The raw value.
        value: String,
    },
}

impl core::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ScheduledTurnsUnset => {
                write!(f, "game.scheduled_turns unset, no turn is scheduled")
            }
            Self::MissingMinigamePose { kind } => {
                write!(f, "no camera pose for the {kind} minigame, using home")
            }
            Self::TurnOutOfRange { turn } => {
                write!(f, "scheduled turn {turn} is past max_turns and never triggers")
            }
            Self::InvalidSeedOverride { value } => {
                write!(f, "{SEED_ENV_VAR}={value} is not a valid seed, ignored")
            }
        }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `exposure-config.yaml`. All fields have
/// defaults matching the shipped game.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GameConfig {
    /// Turn loop settings.
    #[serde(default)]
    pub game: TurnConfig,

    /// Starting resources and the difficulty ramp.
    #[serde(default)]
    pub resources: ResourceConfig,

    /// Energy and pollution contributed by each unit kind.
    #[serde(default)]
    pub units: UnitConfig,

    /// Camera tuning and poses.
    #[serde(default)]
    pub camera: CameraConfig,

    /// Fade timings for minigame transitions.
    #[serde(default)]
    pub fades: FadeConfig,

    /// UI panel timings.
    #[serde(default)]
    pub ui: UiConfig,

    /// Plot grid used by the headless host.
    #[serde(default)]
    pub board: BoardConfig,

    /// Minigame tuning.
    #[serde(default)]
    pub minigames: MinigameTuning,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `EXPOSURE_SEED` overrides `game.seed` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.game.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.game.apply_env_overrides();
        Ok(config)
    }

    /// Check the configuration and apply defaults for recoverable gaps.
    ///
    /// Every returned warning has also been logged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for values that make the game
    /// unplayable: zero `max_turns`, a non-positive camera speed, an empty
    /// mine path, or an unknown first-rotation minigame.
    pub fn validate(&mut self) -> Result<Vec<ConfigWarning>, ConfigError> {
        if self.game.max_turns == 0 {
            return Err(ConfigError::Invalid {
                field: "game.max_turns",
                reason: String::from("must be at least 1"),
            });
        }
        let speed = self.camera.motion.speed;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "camera.motion.speed",
                reason: format!("must be positive, got {speed}"),
            });
        }
        if self.camera.mine_path.is_empty() {
            return Err(ConfigError::Invalid {
                field: "camera.mine_path",
                reason: String::from("needs at least one waypoint"),
            });
        }
        if let Some(id) = self.game.first_rotation
            && !MinigameKind::from_id(id).is_some_and(MinigameKind::is_rotation)
        {
            return Err(ConfigError::Invalid {
                field: "game.first_rotation",
                reason: format!("{id} is not a rotation minigame id (1 = mine, 3 = drill)"),
            });
        }

        let mut warnings = Vec::new();
        if let Some(value) = self.game.rejected_seed_override.take() {
            warnings.push(ConfigWarning::InvalidSeedOverride { value });
        }
        if self.game.scheduled_turns.is_none() {
            self.game.scheduled_turns = Some(BTreeSet::new());
            warnings.push(ConfigWarning::ScheduledTurnsUnset);
        }
        let max_turns = self.game.max_turns;
        for turn in self.game.scheduled().iter().chain(self.game.solar_turns.iter()) {
            if *turn > max_turns {
                warnings.push(ConfigWarning::TurnOutOfRange { turn: *turn });
            }
        }
        let home = self.camera.home;
        for (kind, pose) in [
            (MinigameKind::Drill, &mut self.camera.drill_pose),
            (MinigameKind::Solar, &mut self.camera.solar_pose),
        ] {
            if pose.is_none() {
                *pose = Some(home);
                warnings.push(ConfigWarning::MissingMinigamePose { kind });
            }
        }

        for warning in &warnings {
            warn!(%warning, "Config default applied");
        }
        Ok(warnings)
    }
}

/// Turn loop configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TurnConfig {
    /// Random seed for minigame selection and minigame spawns.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Last playable turn.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Turns after which a minigame is always played.
    #[serde(default = "default_scheduled_turns")]
    pub scheduled_turns: Option<BTreeSet<u32>>,

    /// Scheduled turns that play the solar minigame instead of the
    /// mine/drill rotation.
    #[serde(default)]
    pub solar_turns: BTreeSet<u32>,

    /// Master switch for minigames.
    #[serde(default = "default_true")]
    pub minigames_enabled: bool,

    /// Fixed first rotation minigame by id instead of a random draw.
    #[serde(default)]
    pub first_rotation: Option<u8>,

    /// Seconds after a turn starts during which clicks are ignored.
    #[serde(default = "default_click_delay")]
    pub click_delay_seconds: f32,

    /// Seconds without input while placing before a reset is requested
    /// (0 disables).
    #[serde(default)]
    pub afk_timeout_seconds: f32,

    /// Seconds after which a simulation stops by itself (0 disables).
    #[serde(default)]
    pub simulation_seconds: f32,

    /// Real-time milliseconds per frame for the headless runner.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// Simulated seconds per frame for the headless runner.
    #[serde(default = "default_frame_seconds")]
    pub frame_seconds: f32,

    /// Frames after which the headless runner gives up.
    #[serde(default = "default_max_frames")]
    pub max_frames: u64,

    /// Raw `EXPOSURE_SEED` value that failed to parse, reported by
    /// [`GameConfig::validate`].
    #[serde(skip)]
    rejected_seed_override: Option<String>,
}

impl TurnConfig {
    /// Scheduled turns, treating an unset list as empty.
    pub fn scheduled(&self) -> &BTreeSet<u32> {
        static EMPTY: BTreeSet<u32> = BTreeSet::new();
        self.scheduled_turns.as_ref().unwrap_or(&EMPTY)
    }

    /// Apply `EXPOSURE_SEED` if set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(SEED_ENV_VAR) {
            match value.trim().parse::<u64>() {
                Ok(seed) => self.seed = seed,
                Err(_) => self.rejected_seed_override = Some(value),
            }
        }
    }
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_turns: default_max_turns(),
            scheduled_turns: default_scheduled_turns(),
            solar_turns: BTreeSet::new(),
            minigames_enabled: true,
            first_rotation: None,
            click_delay_seconds: default_click_delay(),
            afk_timeout_seconds: 0.0,
            simulation_seconds: 0.0,
            frame_interval_ms: default_frame_interval_ms(),
            frame_seconds: default_frame_seconds(),
            max_frames: default_max_frames(),
            rejected_seed_override: None,
        }
    }
}

/// Starting resources and the difficulty ramp.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ResourceConfig {
    /// Energy at game start.
    #[serde(default)]
    pub starting_energy: f32,

    /// Pollution at game start.
    #[serde(default = "default_starting_pollution")]
    pub starting_pollution: f32,

    /// Energy capacity at game start.
    #[serde(default = "default_max_resource")]
    pub max_energy: i32,

    /// Pollution tolerance at game start.
    #[serde(default = "default_max_resource")]
    pub max_pollution: i32,

    /// Bar animation speed in units per second.
    #[serde(default = "default_lerp_rate")]
    pub lerp_rate: f32,

    /// Periodic increase of both maximums.
    #[serde(default)]
    pub ramp: DifficultyRamp,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            starting_energy: 0.0,
            starting_pollution: default_starting_pollution(),
            max_energy: default_max_resource(),
            max_pollution: default_max_resource(),
            lerp_rate: default_lerp_rate(),
            ramp: DifficultyRamp::default(),
        }
    }
}

/// Resource contribution per unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct UnitConfig {
    /// Nuclear reactor.
    #[serde(default = "default_nuclear_delta")]
    pub nuclear_reactor: ResourceDelta,
    /// Windmill.
    #[serde(default = "default_windmill_delta")]
    pub windmill: ResourceDelta,
    /// Oil rig.
    #[serde(default = "default_oil_rig_delta")]
    pub oil_rig: ResourceDelta,
}

impl UnitConfig {
    /// Delta for `kind`.
    pub const fn delta(&self, kind: UnitKind) -> ResourceDelta {
        match kind {
            UnitKind::NuclearReactor => self.nuclear_reactor,
            UnitKind::Windmill => self.windmill,
            UnitKind::OilRig => self.oil_rig,
        }
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            nuclear_reactor: default_nuclear_delta(),
            windmill: default_windmill_delta(),
            oil_rig: default_oil_rig_delta(),
        }
    }
}

/// Camera tuning and poses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CameraConfig {
    /// Speed and thresholds.
    #[serde(default)]
    pub motion: CameraSettings,

    /// Overview pose the camera returns to between minigames.
    #[serde(default = "default_home_pose")]
    pub home: Pose,

    /// Route into the mine, ending at the mine pose.
    #[serde(default = "default_mine_path")]
    pub mine_path: Vec<Pose>,

    /// Pose for the drill minigame.
    #[serde(default = "default_drill_pose")]
    pub drill_pose: Option<Pose>,

    /// Pose for the solar minigame.
    #[serde(default = "default_solar_pose")]
    pub solar_pose: Option<Pose>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            motion: CameraSettings::default(),
            home: default_home_pose(),
            mine_path: default_mine_path(),
            drill_pose: default_drill_pose(),
            solar_pose: default_solar_pose(),
        }
    }
}

/// Fade timings used around minigame transitions.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FadeConfig {
    /// Delay before the fade-out that hides a camera arrival.
    #[serde(default)]
    pub fade_out_delay: f32,
    /// Length of the fade-out.
    #[serde(default = "default_fade_duration")]
    pub fade_out_duration: f32,
    /// Delay before the fade-in that reveals the new scene.
    #[serde(default = "default_fade_in_delay")]
    pub fade_in_delay: f32,
    /// Length of the fade-in.
    #[serde(default = "default_fade_duration")]
    pub fade_in_duration: f32,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            fade_out_delay: 0.0,
            fade_out_duration: default_fade_duration(),
            fade_in_delay: default_fade_in_delay(),
            fade_in_duration: default_fade_duration(),
        }
    }
}

/// UI panel timings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct UiConfig {
    /// Delay before a minigame's panel appears.
    #[serde(default = "default_minigame_panel_delay")]
    pub minigame_panel_delay: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            minigame_panel_delay: default_minigame_panel_delay(),
        }
    }
}

/// Plot grid used by the headless host.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoardConfig {
    /// World position of cell `(0, 0)`.
    #[serde(default)]
    pub origin: Vec3,
    /// Edge length of one plot.
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    /// Plots per row.
    #[serde(default = "default_board_columns")]
    pub columns: u32,
    /// Rows of plots.
    #[serde(default = "default_board_rows")]
    pub rows: u32,
    /// Where a freshly spawned unit appears before it follows the cursor.
    #[serde(default)]
    pub spawn_point: Vec3,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            cell_size: default_cell_size(),
            columns: default_board_columns(),
            rows: default_board_rows(),
            spawn_point: Vec3::ZERO,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn,
    /// error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_max_turns() -> u32 {
    9
}

fn default_scheduled_turns() -> Option<BTreeSet<u32>> {
    Some(BTreeSet::from([1, 4, 7]))
}

const fn default_true() -> bool {
    true
}

const fn default_click_delay() -> f32 {
    0.5
}

const fn default_frame_interval_ms() -> u64 {
    16
}

const fn default_frame_seconds() -> f32 {
    1.0 / 60.0
}

const fn default_max_frames() -> u64 {
    200_000
}

const fn default_starting_pollution() -> f32 {
    1.0
}

const fn default_max_resource() -> i32 {
    6
}

const fn default_lerp_rate() -> f32 {
    1.0
}

const fn default_nuclear_delta() -> ResourceDelta {
    ResourceDelta::new(2.0, 1.0)
}

const fn default_windmill_delta() -> ResourceDelta {
    ResourceDelta::new(1.0, 0.0)
}

const fn default_oil_rig_delta() -> ResourceDelta {
    ResourceDelta::new(3.0, 3.0)
}

const fn default_home_pose() -> Pose {
    Pose::new([0.0, 0.0, 2200.0], [-60.0, 0.0, 0.0])
}

fn default_mine_path() -> Vec<Pose> {
    vec![
        Pose::new([-1800.0, 6191.0, 615.0], [0.0, -10.0, 173.0]),
        Pose::new([-5700.0, 7014.0, -948.0], [0.0, 0.0, 170.0]),
    ]
}

const fn default_drill_pose() -> Option<Pose> {
    Some(Pose::new([3600.0, -2800.0, 900.0], [-20.0, 0.0, 135.0]))
}

const fn default_solar_pose() -> Option<Pose> {
    Some(Pose::new([4245.0, 4925.0, 1400.0], [-90.0, 0.0, 0.0]))
}

const fn default_fade_duration() -> f32 {
    1.0
}

const fn default_fade_in_delay() -> f32 {
    0.5
}

const fn default_minigame_panel_delay() -> f32 {
    2.0
}

const fn default_cell_size() -> f32 {
    400.0
}

const fn default_board_columns() -> u32 {
    4
}

const fn default_board_rows() -> u32 {
    3
}

fn default_log_level() -> String {
    String::from("info")
}
