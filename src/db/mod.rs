//! Identity persistence.
//!
//! The authentication core only needs two operations from storage: look an
//! identity up by email, and create one. [`IdentityStore`] is that seam;
//! [`SqliteIdentityStore`] backs it with SQLite and [`MemoryIdentityStore`]
//! keeps everything in process.

mod identity;
mod memory;
mod repository;

pub use identity::{Identity, NewIdentity, PublicIdentity};
pub use memory::MemoryIdentityStore;
pub use repository::SqliteIdentityStore;

use async_trait::async_trait;
use thiserror::Error;

/// Identity store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An identity with this email already exists.
    #[error("identity with this email already exists")]
    Duplicate,

    /// Backend failure.
    #[error("database error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Duplicate,
            _ => StoreError::Backend(e.to_string()),
        }
    }
}

impl From<StoreError> for crate::auth::AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => crate::auth::AuthError::DuplicateIdentity,
            StoreError::Backend(msg) => crate::auth::AuthError::Internal(msg),
        }
    }
}

/// Read/create access to identities.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find an identity by exact (case-sensitive) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    /// Create a new identity.
    ///
    /// Fails with [`StoreError::Duplicate`] if the email is taken; the store is
    /// left unchanged in that case.
    async fn create(&self, new_identity: &NewIdentity) -> Result<Identity, StoreError>;
}
