//! Test helpers for web API tests.
//!
//! Builds an in-memory application with one administrator and one regular
//! identity, served through `axum_test::TestServer`.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum_test::{TestResponse, TestServer};
use jsonwebtoken::Algorithm;

use tokengate::auth::{CookieTransport, CredentialHasher, TokenCodec};
use tokengate::config::PasswordConfig;
use tokengate::db::{IdentityStore, MemoryIdentityStore, NewIdentity};
use tokengate::rate_limit::{LoginRateLimiter, RateLimitConfig};
use tokengate::web::{create_router, AppState};

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-testing-only";

pub const ACCESS_TTL: Duration = Duration::from_secs(30 * 60);
pub const REFRESH_TTL: Duration = Duration::from_secs(1440 * 60);

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const USER_EMAIL: &str = "user@example.com";
pub const USER_PASSWORD: &str = "user-password";

/// Argon2 parameters cheap enough for tests.
pub fn fast_hasher() -> CredentialHasher {
    CredentialHasher::new(&PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("valid test hashing parameters")
}

/// Codec sharing the test server's secret.
pub fn test_codec() -> TokenCodec {
    TokenCodec::new(TEST_SECRET, Algorithm::HS256, ACCESS_TTL, REFRESH_TTL)
}

/// A running test application.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryIdentityStore>,
    pub codec: TokenCodec,
}

/// Create a test application with a generous login rate limit.
pub async fn create_test_app() -> TestApp {
    create_test_app_with_limit(RateLimitConfig::new(100, 60)).await
}

/// Create a test application with the given login rate limit.
///
/// Proxy headers are trusted so tests can choose their client key with
/// `X-Forwarded-For`.
pub async fn create_test_app_with_limit(limit: RateLimitConfig) -> TestApp {
    let hasher = fast_hasher();
    let store = Arc::new(MemoryIdentityStore::new());

    store
        .create(
            &NewIdentity::new(ADMIN_EMAIL, hasher.hash(ADMIN_PASSWORD).unwrap(), "Admin")
                .with_admin(true),
        )
        .await
        .unwrap();
    store
        .create(&NewIdentity::new(
            USER_EMAIL,
            hasher.hash(USER_PASSWORD).unwrap(),
            "User",
        ))
        .await
        .unwrap();

    let app_state = AppState::new(
        store.clone(),
        test_codec(),
        hasher,
        Arc::new(LoginRateLimiter::new(limit)),
        CookieTransport::new(true),
    )
    .expect("Failed to create app state")
    .with_trust_proxy_headers(true);

    let router = create_router(Arc::new(app_state), &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        store,
        codec: test_codec(),
    }
}

/// POST /token with form credentials.
pub async fn login(server: &TestServer, email: &str, password: &str) -> TestResponse {
    server
        .post("/token")
        .form(&[("username", email), ("password", password)])
        .await
}

/// Log in and return the access token cookie value.
pub async fn login_access_token(server: &TestServer, email: &str, password: &str) -> String {
    let response = login(server, email, password).await;
    response.assert_status_ok();
    response.cookie("access_token").value().to_string()
}
