//! Shared type definitions for the lifebot workspace.
//!
//! Types here cross crate boundaries: the core uses the identifiers and
//! control vocabulary, the gateway additionally speaks the JSON frames.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for channels, actors and targets
//! - [`enums`] -- Cursor directions and the eight control affordances
//! - [`frames`] -- `WebSocket` frames between gateway and clients

pub mod enums;
pub mod frames;
pub mod ids;

// Re-export all public types at crate root for convenience.
pub use enums::{Affordance, Direction};
pub use frames::{ClientFrame, ServerFrame};
pub use ids::{ActorId, ChannelId, TargetId};
