//! Login and refresh state transitions.
//!
//! Sessions are stateless: a successful login hands out an access token and a
//! refresh token, a refresh exchanges the latter for a new access token, and
//! nothing is remembered on the server in between. Logout is purely a cookie
//! operation and lives in the web layer.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::AuthError;
use super::password::{CredentialHasher, PasswordError};
use super::token::{TokenCodec, TokenKind};
use crate::db::IdentityStore;
use crate::rate_limit::{LoginRateLimiter, RateLimitResult};

/// Verified against when the email is unknown, so that both failure paths
/// cost one Argon2 verification.
const DUMMY_PASSWORD: &str = "tokengate-dummy-password";

/// Tokens handed out by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access: String,
    /// Long-lived refresh token.
    pub refresh: String,
}

/// Login and refresh operations.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn IdentityStore>,
    codec: Arc<TokenCodec>,
    hasher: CredentialHasher,
    limiter: Arc<LoginRateLimiter>,
    dummy_hash: Arc<str>,
}

impl SessionService {
    /// Create a session service.
    ///
    /// Computes one hash up front for the unknown-email path.
    pub fn new(
        store: Arc<dyn IdentityStore>,
        codec: Arc<TokenCodec>,
        hasher: CredentialHasher,
        limiter: Arc<LoginRateLimiter>,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;
        Ok(Self {
            store,
            codec,
            hasher,
            limiter,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// The token codec in use.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// The login rate limiter in use.
    pub fn limiter(&self) -> &Arc<LoginRateLimiter> {
        &self.limiter
    }

    /// Log in with email and password.
    ///
    /// The attempt is counted against `client_key` before any lookup. Unknown
    /// email and wrong password both yield [`AuthError::InvalidCredentials`].
    pub async fn login(
        &self,
        client_key: &str,
        email: &str,
        password: &str,
    ) -> Result<TokenPair, AuthError> {
        if let RateLimitResult::Denied { retry_after } = self.limiter.admit(client_key) {
            warn!(client = %client_key, "Login rate limit exceeded");
            return Err(AuthError::RateLimited { retry_after });
        }

        let identity = self.store.find_by_email(email).await?;
        let stored_hash = match &identity {
            Some(identity) => identity.password_hash.clone(),
            None => self.dummy_hash.to_string(),
        };

        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| AuthError::Internal(format!("password verification task failed: {e}")))?;

        let identity = match identity {
            Some(identity) if verified => identity,
            Some(_) => {
                debug!(reason = "wrong_password", "Login failed");
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                debug!(reason = "unknown_email", "Login failed");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let access = self.codec.issue(&identity.email, TokenKind::Access)?;
        let refresh = self.codec.issue(&identity.email, TokenKind::Refresh)?;

        info!(identity_id = identity.id, "Login succeeded");
        Ok(TokenPair { access, refresh })
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token is neither rotated nor checked against the store.
    pub fn refresh(&self, token: Option<&str>) -> Result<String, AuthError> {
        let token = token.ok_or(AuthError::TokenMissing)?;
        let claims = self.codec.validate(token, Some(TokenKind::Refresh))?;
        let access = self.codec.issue(&claims.sub, TokenKind::Access)?;
        debug!("Access token refreshed");
        Ok(access)
    }
}
