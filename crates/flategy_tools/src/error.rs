//! Error types for the development tools.

use std::path::PathBuf;

use flategy_core::error::GameError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised by the tools, wrapping core errors where they surface.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file could not be read or written.
    #[error("IO error on '{path}': {source}")]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The simulation core rejected the input.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A report could not be written in the requested format.
    #[error("Failed to serialize output as {format}: {message}")]
    Output {
        /// Output format name.
        format: &'static str,
        /// Serializer message.
        message: String,
    },
}
