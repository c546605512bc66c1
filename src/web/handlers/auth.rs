//! Session handlers: login, refresh and logout.

use axum::{extract::State, Json};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use crate::auth::{
    AuthGate, CookieTransport, CredentialHasher, SessionService, TokenCodec, TokenKind,
    ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
use crate::config::Config;
use crate::db::IdentityStore;
use crate::rate_limit::{LoginRateLimiter, RateLimitConfig};
use crate::web::dto::{ApiForm, LoginForm, MessageResponse};
use crate::web::error::ApiError;
use crate::web::middleware::ClientKey;
use crate::TokengateError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Identity storage.
    pub store: Arc<dyn IdentityStore>,
    /// Login and refresh operations.
    pub sessions: SessionService,
    /// Access token authentication.
    pub gate: AuthGate,
    /// Token cookie handling.
    pub cookies: CookieTransport,
    /// Password hasher for new identities.
    pub hasher: CredentialHasher,
    /// Whether `X-Forwarded-For`/`X-Real-IP` identify the client.
    pub trust_proxy_headers: bool,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        store: Arc<dyn IdentityStore>,
        codec: TokenCodec,
        hasher: CredentialHasher,
        limiter: Arc<LoginRateLimiter>,
        cookies: CookieTransport,
    ) -> crate::Result<Self> {
        let codec = Arc::new(codec);
        let sessions = SessionService::new(store.clone(), codec.clone(), hasher.clone(), limiter)
            .map_err(|e| TokengateError::Config(format!("password hasher: {e}")))?;

        Ok(Self {
            gate: AuthGate::new(codec, store.clone()),
            store,
            sessions,
            cookies,
            hasher,
            trust_proxy_headers: false,
        })
    }

    /// Build the state from configuration.
    pub fn from_config(config: &Config, store: Arc<dyn IdentityStore>) -> crate::Result<Self> {
        let codec = TokenCodec::from_config(&config.auth)?;
        let hasher = CredentialHasher::new(&config.password)
            .map_err(|e| TokengateError::Config(e.to_string()))?;
        let limiter = Arc::new(LoginRateLimiter::new(RateLimitConfig::from(
            &config.rate_limit,
        )));

        Ok(Self::new(
            store,
            codec,
            hasher,
            limiter,
            CookieTransport::new(config.auth.secure_cookie),
        )?
        .with_trust_proxy_headers(config.server.trust_proxy_headers))
    }

    /// Honour proxy headers when identifying clients.
    pub fn with_trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }

    /// The login rate limiter.
    pub fn limiter(&self) -> &Arc<LoginRateLimiter> {
        self.sessions.limiter()
    }
}

/// POST /token - Log in with email and password.
///
/// Sets both token cookies on success.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientKey(client): ClientKey,
    jar: CookieJar,
    ApiForm(form): ApiForm<LoginForm>,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let pair = state
        .sessions
        .login(&client, &form.username, &form.password)
        .await?;

    let codec = state.sessions.codec();
    let jar = state.cookies.attach(
        jar,
        ACCESS_TOKEN_COOKIE,
        pair.access,
        codec.ttl(TokenKind::Access),
    );
    let jar = state.cookies.attach(
        jar,
        REFRESH_TOKEN_COOKIE,
        pair.refresh,
        codec.ttl(TokenKind::Refresh),
    );

    Ok((jar, Json(MessageResponse::new("Login successful"))))
}

/// POST /refresh_token - Exchange the refresh cookie for a new access cookie.
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    let refresh = state.cookies.extract(&jar, REFRESH_TOKEN_COOKIE);
    let access = state.sessions.refresh(refresh)?;

    let ttl = state.sessions.codec().ttl(TokenKind::Access);
    let jar = state.cookies.attach(jar, ACCESS_TOKEN_COOKIE, access, ttl);

    Ok((jar, Json(MessageResponse::new("Token refreshed successfully"))))
}

/// POST /logout - Clear both token cookies.
///
/// Always succeeds; tokens already issued stay valid until they expire.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = state.cookies.clear(jar, ACCESS_TOKEN_COOKIE);
    let jar = state.cookies.clear(jar, REFRESH_TOKEN_COOKIE);
    tracing::debug!("Session cookies cleared");

    (jar, Json(MessageResponse::new("Logout successful")))
}
