//! SQLite identity store.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use super::{Identity, IdentityStore, NewIdentity, StoreError};
use crate::{Result, TokengateError};

const CREATE_IDENTITIES: &str = r#"
CREATE TABLE IF NOT EXISTS identities (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,           -- Argon2id PHC string
    name          TEXT NOT NULL,
    is_admin      INTEGER NOT NULL DEFAULT 0
)
"#;

/// Identity store backed by a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteIdentityStore {
    pool: SqlitePool,
}

impl SqliteIdentityStore {
    /// Connect to `url`, creating the database file and table if needed.
    pub async fn connect(url: &str) -> Result<Self> {
        info!(url = %url, "Opening identity database");
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| TokengateError::Config(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// Open a private in-memory database.
    pub async fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory identity database");
        // Every pooled connection to :memory: is a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_IDENTITIES).execute(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl IdentityStore for SqliteIdentityStore {
    async fn find_by_email(&self, email: &str) -> std::result::Result<Option<Identity>, StoreError> {
        let identity = sqlx::query_as::<_, Identity>(
            "SELECT id, email, password_hash, name, is_admin FROM identities WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn create(&self, new_identity: &NewIdentity) -> std::result::Result<Identity, StoreError> {
        let result = sqlx::query(
            "INSERT INTO identities (email, password_hash, name, is_admin) VALUES (?, ?, ?, ?)",
        )
        .bind(&new_identity.email)
        .bind(&new_identity.password_hash)
        .bind(&new_identity.name)
        .bind(new_identity.is_admin)
        .execute(&self.pool)
        .await?;

        Ok(Identity {
            id: result.last_insert_rowid(),
            email: new_identity.email.clone(),
            password_hash: new_identity.password_hash.clone(),
            name: new_identity.name.clone(),
            is_admin: new_identity.is_admin,
        })
    }
}
