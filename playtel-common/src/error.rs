//! Common error types for playtel

use thiserror::Error;

/// Common result type for playtel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across playtel crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Playback state unusable for the requested computation
    #[error("Invalid playback state: {0}")]
    InvalidState(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
