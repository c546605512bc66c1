//! Error types for tokengate.

use thiserror::Error;

/// Common error type for tokengate infrastructure (configuration, storage, I/O).
///
/// Authentication outcomes are not reported through this type; see
/// [`crate::auth::AuthError`] and [`crate::auth::TokenError`].
#[derive(Error, Debug)]
pub enum TokengateError {
    /// Database error.
    ///
    /// Wraps errors from the identity store backend. Errors from sqlx are
    /// converted automatically.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for configuration or input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for TokengateError {
    fn from(e: sqlx::Error) -> Self {
        TokengateError::Database(e.to_string())
    }
}

/// Result type alias for tokengate operations.
pub type Result<T> = std::result::Result<T, TokengateError>;
