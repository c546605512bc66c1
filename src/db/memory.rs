//! In-process identity store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Identity, IdentityStore, NewIdentity, StoreError};

/// Identity store kept in memory, for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    identities: RwLock<Vec<Identity>>,
}

impl MemoryIdentityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored identities.
    pub async fn count(&self) -> usize {
        self.identities.read().await.len()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let identities = self.identities.read().await;
        Ok(identities.iter().find(|i| i.email == email).cloned())
    }

    async fn create(&self, new_identity: &NewIdentity) -> Result<Identity, StoreError> {
        let mut identities = self.identities.write().await;
        if identities.iter().any(|i| i.email == new_identity.email) {
            return Err(StoreError::Duplicate);
        }

        let identity = Identity {
            id: identities.len() as i64 + 1,
            email: new_identity.email.clone(),
            password_hash: new_identity.password_hash.clone(),
            name: new_identity.name.clone(),
            is_admin: new_identity.is_admin,
        };
        identities.push(identity.clone());
        Ok(identity)
    }
}
