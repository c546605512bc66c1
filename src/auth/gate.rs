//! Request authentication and role checks.

use std::sync::Arc;

use tracing::debug;

use super::error::AuthError;
use super::token::{TokenCodec, TokenKind};
use crate::db::{Identity, IdentityStore};

/// Resolves a presented access token into an identity.
#[derive(Clone)]
pub struct AuthGate {
    codec: Arc<TokenCodec>,
    store: Arc<dyn IdentityStore>,
}

impl AuthGate {
    /// Create a gate over a codec and identity store.
    pub fn new(codec: Arc<TokenCodec>, store: Arc<dyn IdentityStore>) -> Self {
        Self { codec, store }
    }

    /// Authenticate a request by its access token.
    ///
    /// Missing token, any codec failure, and an unknown subject are all
    /// errors; none of them touch server state.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        let token = token.ok_or(AuthError::TokenMissing)?;
        let claims = self.codec.validate(token, Some(TokenKind::Access))?;

        let identity = self
            .store
            .find_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        debug!(identity_id = identity.id, "Request authenticated");
        Ok(identity)
    }

    /// Authenticate and require administrator rights.
    ///
    /// Authentication failures take precedence over the role check.
    pub async fn authenticate_admin(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        let identity = self.authenticate(token).await?;
        if !identity.is_admin {
            debug!(identity_id = identity.id, "Administrator rights required");
            return Err(AuthError::InsufficientPrivilege);
        }
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use jsonwebtoken::Algorithm;

    use super::*;
    use crate::auth::token::TokenError;
    use crate::db::{MemoryIdentityStore, NewIdentity};

    async fn gate() -> (AuthGate, Arc<TokenCodec>) {
        let codec = Arc::new(TokenCodec::new(
            b"gate-test-secret",
            Algorithm::HS256,
            Duration::from_secs(60),
            Duration::from_secs(600),
        ));
        let store = Arc::new(MemoryIdentityStore::new());
        store
            .create(&NewIdentity::new("user@example.com", "hash", "User"))
            .await
            .unwrap();
        store
            .create(&NewIdentity::new("admin@example.com", "hash", "Admin").with_admin(true))
            .await
            .unwrap();
        (AuthGate::new(codec.clone(), store), codec)
    }

    #[tokio::test]
    async fn test_missing_token() {
        let (gate, _) = gate().await;
        assert_eq!(gate.authenticate(None).await, Err(AuthError::TokenMissing));
    }

    #[tokio::test]
    async fn test_valid_access_token() {
        let (gate, codec) = gate().await;
        let token = codec.issue("user@example.com", TokenKind::Access).unwrap();

        let identity = gate.authenticate(Some(&token)).await.unwrap();
        assert_eq!(identity.email, "user@example.com");
        assert!(!identity.is_admin);
    }

    #[tokio::test]
    async fn test_refresh_token_rejected() {
        let (gate, codec) = gate().await;
        let token = codec.issue("user@example.com", TokenKind::Refresh).unwrap();

        assert_eq!(
            gate.authenticate(Some(&token)).await,
            Err(AuthError::Token(TokenError::WrongKind))
        );
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let (gate, codec) = gate().await;
        let issued = Utc::now() - chrono::Duration::seconds(120);
        let token = codec
            .issue_at(
                "user@example.com",
                TokenKind::Access,
                Duration::from_secs(60),
                issued,
            )
            .unwrap();

        assert_eq!(
            gate.authenticate(Some(&token)).await,
            Err(AuthError::Token(TokenError::Expired))
        );
    }

    #[tokio::test]
    async fn test_unknown_subject() {
        let (gate, codec) = gate().await;
        let token = codec.issue("ghost@example.com", TokenKind::Access).unwrap();

        assert_eq!(
            gate.authenticate(Some(&token)).await,
            Err(AuthError::IdentityNotFound)
        );
    }

    #[tokio::test]
    async fn test_admin_check() {
        let (gate, codec) = gate().await;
        let user = codec.issue("user@example.com", TokenKind::Access).unwrap();
        let admin = codec.issue("admin@example.com", TokenKind::Access).unwrap();

        assert_eq!(
            gate.authenticate_admin(Some(&user)).await,
            Err(AuthError::InsufficientPrivilege)
        );
        assert!(gate.authenticate_admin(Some(&admin)).await.unwrap().is_admin);
    }
}
