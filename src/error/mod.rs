//! Error types for tail-pubsub.

use thiserror::Error;

/// Result type for tail-pubsub operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tail-pubsub.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential construction failure.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// HTTP transport error.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Error response from the Pub/Sub API.
    #[error("Pub/Sub API error {status} ({code}): {message}")]
    Api {
        /// HTTP status code.
        code: u16,
        /// Error status string (e.g. ALREADY_EXISTS).
        status: String,
        /// Error message.
        message: String,
    },

    /// Subscription could neither be created nor fetched.
    #[error("Subscription setup failed for {name}: {reason}")]
    SubscriptionSetup {
        /// Fully-qualified subscription name.
        name: String,
        /// Why the final fetch attempt failed.
        reason: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is the API's ALREADY_EXISTS conflict.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::Api { status, .. } if status == "ALREADY_EXISTS")
    }
}
