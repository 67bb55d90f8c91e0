//! Turn orchestration, minigame selection, and configuration for Exposure.
//!
//! This crate owns the turn loop: place a unit, watch the resources move,
//! maybe play a minigame, advance. It drives the leaf components from
//! `exposure-world` and the sessions from `exposure-minigames`.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `exposure-config.yaml` into
//!   strongly-typed structs.
//! - [`orchestrator`] -- [`TurnOrchestrator`], the phase machine and the
//!   per-frame tick.
//! - [`selection`] -- Which minigame an entry leads to.
//! - [`roster`] -- Session factories and per-entry results.
//! - [`signals`] -- [`GameEvent`]s and the observers that receive them.
//! - [`judge`] -- [`OutcomeJudge`] trait and [`ThresholdJudge`].
//! - [`input`] -- Player commands and input sources.
//! - [`runner`] -- The headless async game loop.
//!
//! [`TurnOrchestrator`]: orchestrator::TurnOrchestrator
//! [`GameEvent`]: signals::GameEvent
//! [`OutcomeJudge`]: judge::OutcomeJudge
//! [`ThresholdJudge`]: judge::ThresholdJudge

pub mod config;
pub mod input;
pub mod judge;
pub mod orchestrator;
pub mod roster;
pub mod runner;
pub mod selection;
pub mod signals;
