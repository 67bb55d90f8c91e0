//! Error types for the `exposure-world` crate.
//!
//! These are contract violations by the caller. Components never panic on
//! them; they refuse the operation and leave their state untouched.

use exposure_types::UnitId;

/// Errors raised by the camera and placement components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// `move_along` was called with no waypoints.
    #[error("camera route must contain at least one waypoint")]
    EmptyRoute,

    /// A waypoint index fell outside the active route.
    #[error("waypoint index {index} out of range for route of length {len}")]
    WaypointOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the active route.
        len: usize,
    },

    /// A commit was requested while no unit was held.
    #[error("no unit is held for placement")]
    NothingHeld,

    /// The referenced unit is not in the placed-unit registry.
    #[error("unit not found: {0}")]
    UnitNotFound(UnitId),
}
