//! # Flategy Development Tools
//!
//! Command-line tools for development:
//! - Layout dumps for a seed and player count
//! - Headless simulation runs with JSON or RON output
//! - Balance file validation
//! - Saving and verifying replays
//!
//! Everything that touches files or output formats lives here; the core
//! crate stays free of IO.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod render;
pub mod replay;
pub mod simulate;
pub mod validate;

pub use error::{Result, ToolError};
