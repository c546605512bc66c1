//! Identity registration.

use thiserror::Error;
use tracing::info;

use crate::auth::{validate_password, CredentialHasher, PasswordError};
use crate::db::{Identity, IdentityStore, NewIdentity, StoreError};

/// Registration-specific errors.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Password rejected or hashing failed.
    #[error("password error: {0}")]
    Password(#[from] PasswordError),

    /// Email already registered.
    #[error("email already registered")]
    EmailExists,

    /// Database error.
    #[error("database error: {0}")]
    Database(String),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => RegistrationError::EmailExists,
            StoreError::Backend(msg) => RegistrationError::Database(msg),
        }
    }
}

/// Registration request data.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    /// Email address, the login key.
    pub email: String,
    /// Plaintext password (8-128 characters).
    pub password: String,
    /// Display name.
    pub name: String,
    /// Administrator flag.
    pub is_admin: bool,
}

impl RegistrationRequest {
    /// Create a new non-admin registration request.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
            is_admin: false,
        }
    }

    /// Set the administrator flag.
    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }
}

/// Register a new identity.
///
/// Checks the password policy, hashes the password on the blocking pool and
/// creates the identity. A duplicate email leaves the store untouched.
pub async fn register(
    store: &dyn IdentityStore,
    hasher: &CredentialHasher,
    request: RegistrationRequest,
) -> Result<Identity, RegistrationError> {
    validate_password(&request.password)?;

    let hasher = hasher.clone();
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| PasswordError::HashError(e.to_string()))??;

    let new_identity =
        NewIdentity::new(request.email, password_hash, request.name).with_admin(request.is_admin);
    let identity = store.create(&new_identity).await?;

    info!(
        identity_id = identity.id,
        is_admin = identity.is_admin,
        "Identity registered"
    );
    Ok(identity)
}
