//! Identity model.

use serde::Serialize;

/// A registered identity.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Identity {
    /// Unique identity ID.
    pub id: i64,
    /// Email address; the unique, case-sensitive login key.
    pub email: String,
    /// Password hash (Argon2id PHC string).
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Whether the identity has administrator rights.
    pub is_admin: bool,
}

impl Identity {
    /// Public projection without the password hash.
    pub fn public(&self) -> PublicIdentity {
        PublicIdentity {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            is_admin: self.is_admin,
        }
    }
}

/// Identity fields safe to return to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicIdentity {
    /// Identity ID.
    pub id: i64,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Administrator flag.
    pub is_admin: bool,
}

/// Data for creating a new identity.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    /// Email address.
    pub email: String,
    /// Password hash (must already be hashed).
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Administrator flag (defaults to false).
    pub is_admin: bool,
}

impl NewIdentity {
    /// Create a non-admin identity.
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_projection_omits_hash() {
        let identity = Identity {
            id: 7,
            email: "a@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            name: "A".to_string(),
            is_admin: true,
        };

        let json = serde_json::to_value(identity.public()).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["email"], "a@example.com");
        assert_eq!(json["is_admin"], true);
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_new_identity_builder() {
        let new = NewIdentity::new("a@example.com", "hash", "A");
        assert!(!new.is_admin);
        assert!(new.with_admin(true).is_admin);
    }
}
