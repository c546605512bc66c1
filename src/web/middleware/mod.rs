//! Middleware and extractors for the web layer.

pub mod auth;
pub mod cors;
pub mod rate_limit;

pub use auth::{AdminIdentity, CurrentIdentity};
pub use cors::create_cors_layer;
pub use rate_limit::ClientKey;
