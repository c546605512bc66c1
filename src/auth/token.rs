//! Signed, time-bounded tokens carrying identity claims.
//!
//! Tokens are JWTs signed with a symmetric HMAC secret. Expiry, subject and
//! kind are checked by this module rather than by `jsonwebtoken`, so that the
//! whole validation runs against a single clock reading and every failure maps
//! onto one [`TokenError`] variant.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Authorizes resource requests.
    Access,
    /// Only mints new access tokens.
    Refresh,
}

/// Token failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a well-formed token, or its claims could not be decoded.
    #[error("malformed token")]
    Malformed,

    /// Signature does not match the payload, or the algorithm is not the configured one.
    #[error("bad token signature")]
    BadSignature,

    /// The token's expiry has passed.
    #[error("token expired")]
    Expired,

    /// The subject claim is absent or empty.
    #[error("token has no subject")]
    MissingSubject,

    /// The token is of a different kind than required.
    #[error("wrong token kind")]
    WrongKind,

    /// Issuance was asked for a lifetime that does not end in the future.
    #[error("token lifetime must be positive")]
    InvalidLifetime,

    /// Signing failed.
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Validated token claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity email).
    pub sub: String,
    /// Expiration timestamp (seconds since the epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since the epoch).
    pub iat: i64,
    /// Token kind.
    pub kind: TokenKind,
}

/// Claims as they appear on the wire before our own checks run.
#[derive(Debug, Deserialize)]
struct RawClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    kind: Option<TokenKind>,
}

/// Issues and validates signed tokens.
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from an HMAC secret, algorithm and per-kind lifetimes.
    pub fn new(
        secret: &[u8],
        algorithm: Algorithm,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        // Expiry and subject are checked in `validate_at` against one clock read.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Create a codec from the auth section of the configuration.
    pub fn from_config(config: &AuthConfig) -> crate::Result<Self> {
        let algorithm = Algorithm::from_str(&config.algorithm).map_err(|_| {
            crate::TokengateError::Config(format!("unknown algorithm {}", config.algorithm))
        })?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(crate::TokengateError::Config(format!(
                "{} is not a symmetric algorithm",
                config.algorithm
            )));
        }
        Ok(Self::new(
            config.secret_key.as_bytes(),
            algorithm,
            config.access_ttl(),
            config.refresh_ttl(),
        ))
    }

    /// Configured lifetime for tokens of `kind`.
    pub fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Issue a token of `kind` for `subject` with the configured lifetime.
    pub fn issue(&self, subject: &str, kind: TokenKind) -> Result<String, TokenError> {
        self.issue_with_ttl(subject, kind, self.ttl(kind))
    }

    /// Issue a token with an explicit lifetime.
    pub fn issue_with_ttl(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_at(subject, kind, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::MissingSubject);
        }
        let ttl_secs = i64::try_from(ttl.as_secs()).map_err(|_| TokenError::InvalidLifetime)?;
        if ttl_secs <= 0 {
            return Err(TokenError::InvalidLifetime);
        }

        let iat = now.timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            exp: iat.saturating_add(ttl_secs),
            iat,
            kind,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Validate a token against the current time.
    ///
    /// With `expected` set, a token of any other kind is rejected.
    pub fn validate(
        &self,
        token: &str,
        expected: Option<TokenKind>,
    ) -> Result<Claims, TokenError> {
        self.validate_at(token, expected, Utc::now())
    }

    /// Validate a token as if the current time were `now`.
    ///
    /// Checks run in order: signature, expiry, subject, kind. A token whose
    /// expiry equals `now` is already expired.
    pub fn validate_at(
        &self,
        token: &str,
        expected: Option<TokenKind>,
        now: DateTime<Utc>,
    ) -> Result<Claims, TokenError> {
        let raw = decode::<RawClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::BadSignature
                }
                _ => TokenError::Malformed,
            })?
            .claims;

        let exp = raw.exp.ok_or(TokenError::Malformed)?;
        if exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        let sub = raw
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::MissingSubject)?;

        let kind = raw.kind.ok_or(TokenError::Malformed)?;
        if let Some(expected) = expected {
            if kind != expected {
                return Err(TokenError::WrongKind);
            }
        }

        Ok(Claims {
            sub,
            exp,
            iat: raw.iat.unwrap_or(exp),
            kind,
        })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    const SECRET: &[u8] = b"test-secret-key-for-testing";

    fn codec() -> TokenCodec {
        TokenCodec::new(
            SECRET,
            Algorithm::HS256,
            Duration::from_secs(900),
            Duration::from_secs(86400),
        )
    }

    /// Sign arbitrary claims with the test secret.
    fn sign(claims: &serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_validate_access() {
        let codec = codec();
        let token = codec.issue("user@example.com", TokenKind::Access).unwrap();

        let claims = codec.validate(&token, Some(TokenKind::Access)).unwrap();
        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_issue_and_validate_refresh() {
        let codec = codec();
        let token = codec.issue("user@example.com", TokenKind::Refresh).unwrap();

        let claims = codec.validate(&token, None).unwrap();
        assert_eq!(claims.kind, TokenKind::Refresh);
        assert_eq!(claims.exp - claims.iat, 86400);
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        let issued = Utc::now() - ChronoDuration::hours(2);
        let token = codec
            .issue_at("user@example.com", TokenKind::Access, Duration::from_secs(3600), issued)
            .unwrap();

        assert_eq!(
            codec.validate(&token, Some(TokenKind::Access)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_expiry_boundary_is_rejected() {
        let codec = codec();
        let now = Utc::now();
        let token = codec
            .issue_at("user@example.com", TokenKind::Access, Duration::from_secs(60), now)
            .unwrap();

        let at_expiry = now + ChronoDuration::seconds(60);
        assert_eq!(
            codec.validate_at(&token, None, at_expiry),
            Err(TokenError::Expired)
        );
        let just_before = now + ChronoDuration::seconds(59);
        assert!(codec.validate_at(&token, None, just_before).is_ok());
    }

    #[test]
    fn test_flipped_signature_byte() {
        let codec = codec();
        let token = codec.issue("user@example.com", TokenKind::Access).unwrap();

        let sig_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[sig_start] = if bytes[sig_start] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(
            codec.validate(&tampered, Some(TokenKind::Access)),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_tampered_claims_fail_signature() {
        let codec = codec();
        let token = codec.issue("user@example.com", TokenKind::Access).unwrap();
        let forged_payload = sign(&serde_json::json!({
            "sub": "admin@example.com",
            "exp": Utc::now().timestamp() + 3600,
            "iat": Utc::now().timestamp(),
            "kind": "access",
        }));

        // Splice the forged payload onto the original signature.
        let mut original = token.split('.');
        let mut forged = forged_payload.split('.');
        let spliced = format!(
            "{}.{}.{}",
            original.next().unwrap(),
            forged.nth(1).unwrap(),
            original.nth(1).unwrap()
        );

        assert_eq!(codec.validate(&spliced, None), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let codec = codec();
        let token = codec
            .issue_at(
                "user@example.com",
                TokenKind::Access,
                Duration::from_secs(60),
                Utc::now() - ChronoDuration::hours(1),
            )
            .unwrap();
        let other = TokenCodec::new(
            b"another-secret",
            Algorithm::HS256,
            Duration::from_secs(900),
            Duration::from_secs(86400),
        );

        assert_eq!(other.validate(&token, None), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_algorithm_mismatch_is_bad_signature() {
        let token = codec().issue("user@example.com", TokenKind::Access).unwrap();
        let hs512 = TokenCodec::new(
            SECRET,
            Algorithm::HS512,
            Duration::from_secs(900),
            Duration::from_secs(86400),
        );
        assert_eq!(hs512.validate(&token, None), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_wrong_kind() {
        let codec = codec();
        let access = codec.issue("user@example.com", TokenKind::Access).unwrap();
        let refresh = codec.issue("user@example.com", TokenKind::Refresh).unwrap();

        assert_eq!(
            codec.validate(&access, Some(TokenKind::Refresh)),
            Err(TokenError::WrongKind)
        );
        assert_eq!(
            codec.validate(&refresh, Some(TokenKind::Access)),
            Err(TokenError::WrongKind)
        );
    }

    #[test]
    fn test_missing_subject() {
        let codec = codec();
        let token = sign(&serde_json::json!({
            "exp": Utc::now().timestamp() + 3600,
            "kind": "access",
        }));
        assert_eq!(codec.validate(&token, None), Err(TokenError::MissingSubject));

        let token = sign(&serde_json::json!({
            "sub": "",
            "exp": Utc::now().timestamp() + 3600,
            "kind": "access",
        }));
        assert_eq!(codec.validate(&token, None), Err(TokenError::MissingSubject));
    }

    #[test]
    fn test_missing_expiry_is_malformed() {
        let token = sign(&serde_json::json!({ "sub": "user@example.com", "kind": "access" }));
        assert_eq!(codec().validate(&token, None), Err(TokenError::Malformed));
    }

    #[test]
    fn test_missing_kind_is_malformed() {
        let token = sign(&serde_json::json!({
            "sub": "user@example.com",
            "exp": Utc::now().timestamp() + 3600,
        }));
        assert_eq!(codec().validate(&token, None), Err(TokenError::Malformed));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = codec();
        assert_eq!(codec.validate("not-a-token", None), Err(TokenError::Malformed));
        assert_eq!(codec.validate("", None), Err(TokenError::Malformed));
        assert_eq!(codec.validate("a.b.c", None), Err(TokenError::Malformed));
    }

    #[test]
    fn test_issue_rejects_empty_subject() {
        assert_eq!(
            codec().issue("", TokenKind::Access),
            Err(TokenError::MissingSubject)
        );
    }

    #[test]
    fn test_issue_rejects_zero_ttl() {
        assert_eq!(
            codec().issue_with_ttl("user@example.com", TokenKind::Access, Duration::ZERO),
            Err(TokenError::InvalidLifetime)
        );
    }

    #[test]
    fn test_from_config() {
        let config = AuthConfig {
            secret_key: "secret".to_string(),
            algorithm: "HS384".to_string(),
            ..AuthConfig::default()
        };
        let codec = TokenCodec::from_config(&config).unwrap();
        assert_eq!(codec.ttl(TokenKind::Access), Duration::from_secs(1800));
        assert_eq!(codec.ttl(TokenKind::Refresh), Duration::from_secs(86400));

        let token = codec.issue("user@example.com", TokenKind::Access).unwrap();
        assert!(codec.validate(&token, Some(TokenKind::Access)).is_ok());
    }

    #[test]
    fn test_from_config_rejects_asymmetric() {
        let config = AuthConfig {
            secret_key: "secret".to_string(),
            algorithm: "RS256".to_string(),
            ..AuthConfig::default()
        };
        assert!(TokenCodec::from_config(&config).is_err());
    }
}
