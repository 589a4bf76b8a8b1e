/// User model
///
/// A user is an email address plus an Argon2id password hash. Emails are
/// stored trimmed and lowercased so lookups are case-insensitive and the
/// unique index sees one canonical form.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL,
///     password_hash TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT users_email_key UNIQUE (email)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::ValidateEmail;

/// User account
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Normalized email address
    pub email: String,

    /// Argon2id password hash (PHC string). Never the plaintext.
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a user
///
/// Callers are expected to pass a normalized email and an already computed
/// hash; see [`crate::credentials::CredentialService`].
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Normalized email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

/// Changes applied to a stored user
///
/// Only `Some` fields are written.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    /// New normalized email
    pub email: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,
}

impl UserChanges {
    /// True when nothing would be written
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password_hash.is_none()
    }
}

/// Canonical form of an email: trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Checks that a (normalized) email is shaped like an address
///
/// On top of the RFC checks in `validator`, the domain must be a dotted host
/// name ending in a 2-3 letter label, and no part may contain `..`.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.contains("..") || !email.validate_email() {
        return false;
    }

    match email.rsplit_once('@') {
        Some((_, domain)) => has_dotted_domain(domain),
        None => false,
    }
}

fn has_dotted_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return false;
    }

    let tld = labels[labels.len() - 1];
    (2..=3).contains(&tld.len()) && tld.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
        assert_eq!(normalize_email("user@example.com"), "user@example.com");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("plainaddress"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@"));

        // Needs a dotted domain with a short alphabetic TLD
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@localhost"));
        assert!(!is_valid_email("a@x.c"));
        assert!(!is_valid_email("a@x.info"));
        assert!(!is_valid_email("a@[127.0.0.1]"));
        assert!(!is_valid_email("a..b@x.com"));
        assert!(!is_valid_email("a@x..com"));
        assert!(is_valid_email("a@mail.example.co.uk"));
    }

    #[test]
    fn test_user_serialization_hides_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "a@x.com");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_user_changes_default_is_empty() {
        let changes = UserChanges::default();
        assert!(changes.is_empty());

        let changes = UserChanges {
            email: Some("b@x.com".to_string()),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
