//! Minigame sessions for the Exposure turn loop.
//!
//! The orchestrator only sees the [`MinigameSession`] trait. This crate
//! provides that trait plus one reference implementation per minigame.
//!
//! # Modules
//!
//! - [`session`] -- The session capability and forwarded input
//! - [`cart`] -- Cart catcher played at the mine
//! - [`drill`] -- Hold-to-drill with overheating, played at the oil rig
//! - [`solar`] -- Mirror puzzle played at the solar field
//! - [`config`] -- Tuning for all three ([`MinigameTuning`])

pub mod cart;
pub mod config;
pub mod drill;
pub mod session;
pub mod solar;

pub use cart::{CartSession, FallingPiece, PieceKind};
pub use config::{CartConfig, DrillConfig, MinigameTuning, SolarConfig};
pub use drill::DrillSession;
pub use session::{MinigameInput, MinigameSession};
pub use solar::{Cell, Heading, SolarSession};
