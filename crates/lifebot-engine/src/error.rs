//! Error types for the engine binary.

/// Top-level error for the engine binary.
///
/// Each variant wraps a subsystem error so `main` can propagate it with
/// `?`. Nothing the session controller reports ends up here: session
/// errors are logged and answered in chat.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: lifebot_core::config::ConfigError,
    },

    /// The gateway failed to start.
    #[error("gateway error: {source}")]
    Gateway {
        /// The underlying startup error.
        #[from]
        source: lifebot_gateway::StartupError,
    },
}
