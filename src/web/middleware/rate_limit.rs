//! Client identification for login rate limiting.

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::web::handlers::AppState;

/// Rate limiting key for the requesting client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientKey(pub String);

/// Extract client IP from request parts.
///
/// Proxy headers are only consulted when `trust_proxy_headers` is set;
/// otherwise a client could pick its own key.
fn get_client_ip(parts: &Parts, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(ip) = forwarded_ip(&parts.headers) {
            return ip;
        }
    }

    // Fall back to connection info
    if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    // Default to unknown
    "unknown".to_string()
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    // Take the first IP in the chain
    if let Some(ip) = headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return Some(ip.to_string());
    }

    headers
        .get("X-Real-IP")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for ClientKey {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientKey(get_client_ip(parts, state.trust_proxy_headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_forwarded_ignored_without_trust() {
        let parts = parts(Request::builder().header("X-Forwarded-For", "203.0.113.7"));
        assert_eq!(get_client_ip(&parts, false), "unknown");
    }

    #[test]
    fn test_forwarded_first_hop() {
        let parts = parts(
            Request::builder().header("X-Forwarded-For", "203.0.113.7, 10.0.0.1, 10.0.0.2"),
        );
        assert_eq!(get_client_ip(&parts, true), "203.0.113.7");
    }

    #[test]
    fn test_real_ip() {
        let parts = parts(Request::builder().header("X-Real-IP", "198.51.100.4"));
        assert_eq!(get_client_ip(&parts, true), "198.51.100.4");
    }

    #[test]
    fn test_connect_info() {
        let mut parts = parts(Request::builder().header("X-Forwarded-For", "203.0.113.7"));
        let addr: SocketAddr = "192.0.2.1:4000".parse().unwrap();
        parts.extensions.insert(ConnectInfo(addr));

        assert_eq!(get_client_ip(&parts, false), "192.0.2.1");
        assert_eq!(get_client_ip(&parts, true), "203.0.113.7");
    }
}
