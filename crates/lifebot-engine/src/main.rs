//! Bot binary for lifebot.
//!
//! Wires the chat gateway to the session controller and runs the inbound
//! event loop until a user sends `#exit`, the process receives Ctrl-C, or
//! the gateway stops delivering events.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `lifebot-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Start the gateway (HTTP + `WebSocket`)
//! 4. Create the session controller
//! 5. Run the inbound event loop
//! 6. End any running session and log the outcome

mod error;
mod inbound;

use std::path::Path;
use std::sync::Arc;

use lifebot_core::config::LifebotConfig;
use lifebot_core::controller::SessionController;
use lifebot_gateway::{AppState, GatewaySink};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

const CONFIG_PATH: &str = "lifebot-config.yaml";

/// Application entry point for the bot.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the gateway
/// cannot bind.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(&config.logging.level))
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("lifebot-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }
    info!(
        step_interval_ms = config.session.step_interval().as_millis(),
        max_cells = config.session.max_cells,
        port = config.gateway.port,
        "Configuration loaded"
    );

    // 3. Start the gateway.
    let (state, mut inbound_rx) = AppState::new();
    let state = Arc::new(state);
    let gateway = lifebot_gateway::spawn_gateway(&config.gateway, Arc::clone(&state))
        .await
        .map_err(EngineError::from)?;
    info!(bot = %state.bot, "Gateway started");

    // 4. Create the session controller.
    let sink = Arc::new(GatewaySink::new(Arc::clone(&state)));
    let mut controller =
        SessionController::new(sink, config.session.clone(), Box::new(StdRng::from_os_rng()));

    // 5. Run the inbound event loop.
    let outcome = inbound::run(&mut controller, &mut inbound_rx, shutdown_signal()).await;

    // 6. Shut down.
    let had_session = controller.end_session().await;
    gateway.abort();
    info!(?outcome, had_session, "lifebot-engine stopped");

    Ok(())
}

/// Load configuration from [`CONFIG_PATH`], falling back to defaults.
///
/// Returns the configuration and whether it was read from the file.
fn load_config() -> Result<(LifebotConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((LifebotConfig::from_file(config_path)?, true))
    } else {
        let mut config = LifebotConfig::default();
        config.apply_env_overrides();
        Ok((config, false))
    }
}

/// Resolve on Ctrl-C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received, shutting down");
}
