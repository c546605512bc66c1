//! Authentication and authorization outcomes.

use std::time::Duration;

use thiserror::Error;

use super::token::TokenError;

/// Why a request was not authenticated, authorized or admitted.
///
/// The variants are internal distinctions for logging. The web boundary
/// collapses every token and identity failure into one generic 401.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No token was presented.
    #[error("token missing")]
    TokenMissing,

    /// The presented token failed validation.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The token is valid but names no known identity.
    #[error("identity not found")]
    IdentityNotFound,

    /// Login failed; unknown email and wrong password are not distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but the operation needs administrator rights.
    #[error("insufficient privilege")]
    InsufficientPrivilege,

    /// An identity with the same email already exists.
    #[error("duplicate identity")]
    DuplicateIdentity,

    /// Too many login attempts from this client in the current window.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Time left in the current window.
        retry_after: Duration,
    },

    /// Storage or hashing failure unrelated to the caller's input.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Short, non-sensitive name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::TokenMissing => "token_missing",
            AuthError::Token(TokenError::Malformed) => "token_malformed",
            AuthError::Token(TokenError::BadSignature) => "bad_signature",
            AuthError::Token(TokenError::Expired) => "token_expired",
            AuthError::Token(TokenError::MissingSubject) => "missing_subject",
            AuthError::Token(TokenError::WrongKind) => "wrong_token_kind",
            AuthError::Token(TokenError::InvalidLifetime) => "invalid_lifetime",
            AuthError::Token(TokenError::Encoding(_)) => "token_encoding",
            AuthError::IdentityNotFound => "identity_not_found",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InsufficientPrivilege => "insufficient_privilege",
            AuthError::DuplicateIdentity => "duplicate_identity",
            AuthError::RateLimited { .. } => "rate_limited",
            AuthError::Internal(_) => "internal",
        }
    }
}

impl From<crate::TokengateError> for AuthError {
    fn from(err: crate::TokengateError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
