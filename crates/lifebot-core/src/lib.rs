//! Grid engine, session controller and stepping loop for lifebot.
//!
//! This crate holds everything that decides what a session looks like. It
//! knows nothing about transports: output leaves through the
//! [`RenderSink`](sink::RenderSink) trait, input arrives as chat lines or
//! [`AffordanceSignal`](event::AffordanceSignal)s.
//!
//! # Modules
//!
//! - [`grid`] -- Toroidal cell grid and the B3/S23 generation step
//! - [`render`] -- Glyph rendering and the static reply texts
//! - [`session`] -- Cursor and the one active session
//! - [`command`] -- `#`-prefixed chat command parsing
//! - [`event`] -- Control events and affordance-signal filtering
//! - [`sink`] -- [`RenderSink`](sink::RenderSink) trait and an in-memory
//!   recording sink
//! - [`stepper`] -- The timed stepping loop task
//! - [`controller`] -- [`SessionController`](controller::SessionController),
//!   the event handler tying the rest together
//! - [`config`] -- Configuration loading from `lifebot-config.yaml`

pub mod command;
pub mod config;
pub mod controller;
pub mod event;
pub mod grid;
pub mod render;
pub mod session;
pub mod sink;
pub mod stepper;

pub use controller::{Flow, SessionController, SessionError};
pub use event::{AffordanceSignal, SessionEvent};
pub use sink::{RecordingSink, RenderSink, RenderTransportError};
