//! Authentication module for tokengate.
//!
//! This module provides password hashing, signed tokens, cookie transport,
//! request authentication, identity registration, and login/refresh
//! sessions.

pub mod cookie;
mod error;
mod gate;
mod password;
mod registration;
mod session;
pub mod token;

pub use cookie::{CookieTransport, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
pub use error::AuthError;
pub use gate::AuthGate;
pub use password::{
    hash_password, validate_password, verify_password, CredentialHasher, PasswordError,
    MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH,
};
pub use registration::{register, RegistrationError, RegistrationRequest};
pub use session::{SessionService, TokenPair};
pub use token::{Claims, TokenCodec, TokenError, TokenKind};
