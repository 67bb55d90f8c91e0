//! Leaf components driven by the Exposure turn orchestrator.
//!
//! Each component owns its state outright and is advanced by the
//! orchestrator's per-frame tick. None of them knows about phases or about
//! each other.
//!
//! # Modules
//!
//! - [`resource`] -- Energy/pollution levels animated toward targets
//! - [`fade`] -- Independent delayed one-shot fade-in / fade-out timers
//! - [`camera`] -- Constant-speed camera motion over waypoint routes
//! - [`placement`] -- Held unit, placed-unit registry, placement surface
//! - [`error`] -- Contract violations reported to the caller

pub mod camera;
pub mod error;
pub mod fade;
pub mod placement;
pub mod resource;

pub use camera::{CameraMotionController, CameraSettings, CameraStep, Traversal};
pub use error::WorldError;
pub use fade::{FadeTimer, FadeTransitionController};
pub use placement::{
    CursorHit, HeldUnit, PlacedUnit, PlacementSurface, PlotGrid, UnitPlacementController,
};
pub use resource::{DifficultyRamp, ResourceModel};
