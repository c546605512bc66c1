//! tokengate - stateless session tokens for HTTP services
//!
//! Password login, signed access/refresh tokens carried in cookies, per-client
//! login rate limiting, and admin-gated identity creation.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod rate_limit;
pub mod web;

pub use auth::{
    hash_password, register, validate_password, verify_password, AuthError,
    AuthGate, Claims, CookieTransport, CredentialHasher, PasswordError, RegistrationError,
    RegistrationRequest, SessionService, TokenCodec, TokenError, TokenKind, TokenPair,
};
pub use bootstrap::{ensure_admin, AdminBootstrap};
pub use config::Config;
pub use db::{
    Identity, IdentityStore, MemoryIdentityStore, NewIdentity, PublicIdentity,
    SqliteIdentityStore, StoreError,
};
pub use error::{Result, TokengateError};
pub use rate_limit::{LoginRateLimiter, RateLimitConfig, RateLimitResult};
pub use web::{AppState, WebServer};
