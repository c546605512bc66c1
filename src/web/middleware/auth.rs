//! Authentication extractors.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::auth::ACCESS_TOKEN_COOKIE;
use crate::db::Identity;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Access token from the `access_token` cookie, or else an
/// `Authorization: Bearer` header.
pub fn access_token(state: &AppState, headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(token) = state.cookies.extract(&jar, ACCESS_TOKEN_COOKIE) {
        return Some(token.to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Extractor for authenticated identities.
///
/// Rejects with a generic 401 when the token is missing or invalid, or when
/// it names no known identity.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = access_token(state, &parts.headers);
        let identity = state.gate.authenticate(token.as_deref()).await?;
        Ok(CurrentIdentity(identity))
    }
}

/// Extractor for authenticated administrators.
///
/// Same as [`CurrentIdentity`], plus a 403 for non-administrators.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = access_token(state, &parts.headers);
        let identity = state.gate.authenticate_admin(token.as_deref()).await?;
        Ok(AdminIdentity(identity))
    }
}
