//! Agent error types

use thiserror::Error;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, Error>;

/// Agent error types
#[derive(Error, Debug)]
pub enum Error {
    /// Shared playtel error (configuration, invalid state)
    #[error(transparent)]
    Common(#[from] playtel_common::Error),

    /// HTTP transport error (wraps reqwest::Error)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The signal channel to the session task is closed
    #[error("Signal channel closed: {0}")]
    Channel(String),
}
