//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Wraps every failure `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: exposure_core::config::ConfigError,
    },

    /// The orchestrator could not be set up.
    #[error("orchestrator error: {source}")]
    Orchestrator {
        /// The underlying orchestrator error.
        #[from]
        source: exposure_core::orchestrator::OrchestratorError,
    },

    /// The game loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: exposure_core::runner::RunnerError,
    },

    /// The final report could not be written.
    #[error("report error: {source}")]
    Report {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}
