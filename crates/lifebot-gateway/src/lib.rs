//! Chat gateway for lifebot.
//!
//! This crate stands in for a chat platform. It provides an Axum HTTP
//! server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`): each connection is one chat channel
//!   that can post messages and add or remove reactions, and receives the
//!   bot's messages, edits, reactions and replies as JSON frames
//! - **REST endpoints** for posting a message without a socket and for
//!   reading the latest session render
//! - **Minimal HTML page** (`GET /`) with the command help
//!
//! # Architecture
//!
//! [`GatewaySink`] implements the core's render seam by publishing
//! [`ServerFrame`](lifebot_types::ServerFrame)s on a broadcast channel and
//! keeping a [`SessionSnapshot`] for REST reads. Everything users send is
//! turned into an [`InboundEvent`] and queued on a bounded `mpsc` channel
//! that the engine drains.
//!
//! [`GatewaySink`]: sink::GatewaySink
//! [`SessionSnapshot`]: state::SessionSnapshot
//! [`InboundEvent`]: state::InboundEvent

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod sink;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::ServerError;
pub use sink::GatewaySink;
pub use startup::{spawn_gateway, StartupError};
pub use state::{AppState, InboundEvent, SessionSnapshot};
