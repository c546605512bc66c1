//! Request DTOs for Web API.

use serde::Deserialize;
use validator::Validate;

use super::validation::{no_control_chars, not_empty_trimmed};

/// Login form (`application/x-www-form-urlencoded`).
///
/// The field is called `username` for OAuth2 password-flow clients, but it
/// carries the email address.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Email address.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Identity creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Email address.
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    /// Plaintext password; length is checked by the password policy.
    pub password: String,
    /// Display name.
    #[validate(
        length(max = 100, message = "Must be at most 100 characters"),
        custom(function = "not_empty_trimmed"),
        custom(function = "no_control_chars")
    )]
    pub name: String,
    /// Administrator flag.
    #[serde(default)]
    pub is_admin: bool,
}
