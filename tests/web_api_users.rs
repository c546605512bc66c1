//! Web API Identity Tests
//!
//! Integration tests for admin-gated identity creation.

mod common;

use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use serde_json::{json, Value};

use common::{
    create_test_app, login, login_access_token, ADMIN_EMAIL, ADMIN_PASSWORD, USER_EMAIL,
    USER_PASSWORD,
};
use tokengate::db::IdentityStore;

fn new_user_body() -> Value {
    json!({
        "email": "new@example.com",
        "password": "new-password",
        "name": "New User",
        "is_admin": false
    })
}

// ============================================================================
// Authorization Tests
// ============================================================================

#[tokio::test]
async fn test_create_user_requires_authentication() {
    let app = create_test_app().await;

    let response = app.server.post("/users/").json(&new_user_body()).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.count().await, 2);
}

#[tokio::test]
async fn test_create_user_requires_admin() {
    let app = create_test_app().await;
    let access = login_access_token(&app.server, USER_EMAIL, USER_PASSWORD).await;

    let response = app
        .server
        .post("/users/")
        .add_cookie(Cookie::new("access_token", access))
        .json(&new_user_body())
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "FORBIDDEN");
    assert_eq!(body["error"]["message"], "Insufficient permissions");
    assert!(response
        .headers()
        .get(axum::http::header::WWW_AUTHENTICATE)
        .is_none());
    assert_eq!(app.store.count().await, 2);
}

// ============================================================================
// Creation Tests
// ============================================================================

#[tokio::test]
async fn test_admin_creates_user() {
    let app = create_test_app().await;
    let access = login_access_token(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .server
        .post("/users/")
        .add_cookie(Cookie::new("access_token", access))
        .json(&new_user_body())
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert!(body["id"].is_i64());
    assert_eq!(body["email"], "new@example.com");
    assert_eq!(body["name"], "New User");
    assert_eq!(body["is_admin"], false);
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());

    // The stored credential is a hash, and the new identity can log in
    let stored = app
        .store
        .find_by_email("new@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.password_hash.starts_with("$argon2id$"));

    login(&app.server, "new@example.com", "new-password")
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_admin_creates_admin() {
    let app = create_test_app().await;
    let access = login_access_token(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .server
        .post("/users/")
        .add_cookie(Cookie::new("access_token", access))
        .json(&json!({
            "email": "second-admin@example.com",
            "password": "admin-password-2",
            "name": "Second Admin",
            "is_admin": true
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["is_admin"], true);
}

#[tokio::test]
async fn test_is_admin_defaults_to_false() {
    let app = create_test_app().await;
    let access = login_access_token(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .server
        .post("/users/")
        .add_cookie(Cookie::new("access_token", access))
        .json(&json!({
            "email": "plain@example.com",
            "password": "plain-password",
            "name": "Plain"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    assert_eq!(body["is_admin"], false);
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let app = create_test_app().await;
    let access = login_access_token(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let before = app
        .store
        .find_by_email(USER_EMAIL)
        .await
        .unwrap()
        .unwrap();

    let response = app
        .server
        .post("/users/")
        .add_cookie(Cookie::new("access_token", access))
        .json(&json!({
            "email": USER_EMAIL,
            "password": "replacement-password",
            "name": "Impostor",
            "is_admin": true
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["error"]["message"], "Email already registered");

    // Stored state is unchanged
    assert_eq!(app.store.count().await, 2);
    let after = app
        .store
        .find_by_email(USER_EMAIL)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before, after);
    login(&app.server, USER_EMAIL, USER_PASSWORD)
        .await
        .assert_status_ok();
}

// ============================================================================
// Validation Tests
// ============================================================================

#[tokio::test]
async fn test_invalid_email_rejected() {
    let app = create_test_app().await;
    let access = login_access_token(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .server
        .post("/users/")
        .add_cookie(Cookie::new("access_token", access))
        .json(&json!({
            "email": "not-an-email",
            "password": "new-password",
            "name": "New User"
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["email"].is_array());
    assert_eq!(app.store.count().await, 2);
}

#[tokio::test]
async fn test_short_password_rejected() {
    let app = create_test_app().await;
    let access = login_access_token(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .server
        .post("/users/")
        .add_cookie(Cookie::new("access_token", access))
        .json(&json!({
            "email": "new@example.com",
            "password": "short",
            "name": "New User"
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = response.json();
    assert!(body["error"]["details"]["password"].is_array());
    assert_eq!(app.store.count().await, 2);
}

#[tokio::test]
async fn test_missing_field_rejected() {
    let app = create_test_app().await;
    let access = login_access_token(&app.server, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = app
        .server
        .post("/users/")
        .add_cookie(Cookie::new("access_token", access))
        .json(&json!({ "email": "new@example.com" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.store.count().await, 2);
}
