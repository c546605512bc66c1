//! HTTP surface for tokengate.
//!
//! Session endpoints (`/token`, `/refresh_token`, `/logout`), admin-gated
//! identity creation under `/users/`, and a health check.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
