//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum ReachAvoidError {
    /// An enumerated configuration value was not recognized.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Sampling was requested from a buffer holding no transitions.
    #[error("Replay buffer is empty")]
    EmptyBuffer,

    /// The best checkpoint was requested from a tracker holding no entries.
    #[error("Checkpoint tracker is empty")]
    EmptyTracker,
}
