//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection on server.port
//!     → listener.rs (accept loop)
//!     → status banner written, connection closed
//! ```
//!
//! # Design Decisions
//! - The accept loop selects on the shutdown broadcast
//! - Each connection is answered on its own task

pub mod listener;

pub use listener::{ListenerError, StatusListener};
