//! Startup provisioning of the administrator identity.

use tracing::info;

use crate::auth::{register, CredentialHasher, RegistrationError, RegistrationRequest};
use crate::config::AdminConfig;
use crate::db::{Identity, IdentityStore};

/// What [`ensure_admin`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminBootstrap {
    /// No admin email/password configured.
    NotConfigured,
    /// An identity with the admin email already exists; left as is.
    AlreadyExists,
    /// The admin identity was created.
    Created(Identity),
}

/// Create the configured administrator unless its email is already taken.
///
/// An existing identity with that email is never modified, even if it is not
/// an administrator.
pub async fn ensure_admin(
    store: &dyn IdentityStore,
    hasher: &CredentialHasher,
    config: &AdminConfig,
) -> Result<AdminBootstrap, RegistrationError> {
    let (Some(email), Some(password)) = (config.email.as_deref(), config.password.as_deref())
    else {
        return Ok(AdminBootstrap::NotConfigured);
    };

    if store.find_by_email(email).await?.is_some() {
        info!("Admin user already exists");
        return Ok(AdminBootstrap::AlreadyExists);
    }

    let request = RegistrationRequest::new(email, password, config.name.clone()).with_admin(true);
    match register(store, hasher, request).await {
        Ok(identity) => {
            info!(identity_id = identity.id, "Admin user created");
            Ok(AdminBootstrap::Created(identity))
        }
        // Lost a race with another instance creating the same admin
        Err(RegistrationError::EmailExists) => Ok(AdminBootstrap::AlreadyExists),
        Err(e) => Err(e),
    }
}
