//! Shared type definitions for the Exposure turn loop.
//!
//! This crate is the single source of truth for the types that cross crate
//! boundaries: phases, unit and minigame kinds, UI panel ids, camera poses,
//! resource levels, and typed handles.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for unit and session handles
//! - [`enums`] -- Phases, unit/minigame kinds, panels, input targets
//! - [`structs`] -- Poses, resource levels, turn state, fade notifications

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    EntityTag, FadeDirection, GameOutcome, InputTarget, MinigameKind, Phase, UiPanel, UnitKind,
};
pub use ids::{SessionId, UnitId};
pub use structs::{FadeFired, Pose, ResourceDelta, ResourceLevels, TurnState};

pub use glam::Vec3;
