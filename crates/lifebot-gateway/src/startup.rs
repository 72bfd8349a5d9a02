//! Gateway startup helper for embedding in the engine binary.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lifebot_gateway::startup::spawn_gateway;
//! use lifebot_gateway::state::AppState;
//! use std::sync::Arc;
//!
//! let (state, inbound) = AppState::new();
//! let handle = spawn_gateway(&config.gateway, Arc::new(state)).await?;
//! // Drain `inbound`; abort `handle` on shutdown.
//! ```

use std::sync::Arc;

use lifebot_core::config::GatewayConfig;
use tokio::task::JoinHandle;

use crate::server::{self, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the gateway.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Bind the gateway and serve it on a background Tokio task.
///
/// The server runs until the runtime shuts down or the returned handle is
/// aborted.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the listener cannot bind. The bind
/// happens before the task is spawned, so the failure is reported here.
pub async fn spawn_gateway(
    config: &GatewayConfig,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let listener = server::bind(config).await?;

    let handle = tokio::spawn(async move {
        if let Err(e) = server::serve(listener, state).await {
            tracing::error!(error = %e, "Gateway server exited with error");
        }
    });

    tracing::info!(port = config.port, "Gateway spawned on background task");

    Ok(handle)
}
