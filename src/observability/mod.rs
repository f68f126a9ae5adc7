//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (EnvFilter + fmt layer, text or JSON)
//!     → rotation.rs (active log file, rotated by size, pruned by age/count)
//! ```
//!
//! # Design Decisions
//! - One global subscriber, installed after configuration is valid
//! - Log file settings come from the validated `LogSettings`

pub mod logging;
pub mod rotation;

pub use logging::{init_console_logging, init_logging, LoggingError};
pub use rotation::{RotatingFile, RotationPolicy};
