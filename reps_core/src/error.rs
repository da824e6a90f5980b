//! Error types for the reps_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for reps_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Exercise name that matches none of the five exercises
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    /// A user action that the current screen does not offer
    #[error("Cannot {action} from the {from} screen")]
    InvalidTransition {
        from: crate::Screen,
        action: &'static str,
    },
}
