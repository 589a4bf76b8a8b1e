/// Credential service
///
/// Owns the rules for user identities: email normalization and shape,
/// password length, hashing and verification. It sits on top of a
/// [`UserStore`] and is the only place that turns a plaintext password into
/// a stored hash.
///
/// Argon2 is deliberately slow, so hashing and verification run on the
/// blocking thread pool instead of an async worker. A login for an unknown
/// email still verifies against a decoy hash, so both failures take the same
/// time.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskdesk_shared::auth::password::HashCost;
/// use taskdesk_shared::credentials::CredentialService;
/// use taskdesk_shared::store::memory::InMemoryUserStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = CredentialService::new(Arc::new(InMemoryUserStore::new()), HashCost::minimal());
///
/// let user = credentials.register(" A@X.com ", "secret1").await?;
/// assert_eq!(user.email, "a@x.com");
///
/// let same = credentials.authenticate("a@x.com", "secret1").await?;
/// assert_eq!(same.id, user.id);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::auth::password::{self, HashCost, PasswordError};
use crate::models::user::{is_valid_email, normalize_email, NewUser, User, UserChanges};
use crate::store::{StoreError, UserStore};

/// Error type for credential operations
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Input failed validation (email shape, password length)
    #[error("{0}")]
    Validation(String),

    /// Another account already uses this email
    #[error("User with this email already exists")]
    DuplicateEmail,

    /// Unknown email or wrong password. Deliberately does not say which.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The user to update does not exist
    #[error("User not found")]
    UserNotFound,

    /// Hashing or verification failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Storage failure
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CredentialError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => CredentialError::DuplicateEmail,
            other => CredentialError::Store(other),
        }
    }
}

/// Requested changes to an existing account
///
/// `password` is plaintext; it is only re-hashed when it actually differs
/// from the current one.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New email
    pub email: Option<String>,

    /// New plaintext password
    pub password: Option<String>,
}

/// Registration, login and account updates
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserStore>,
    cost: HashCost,
    /// Hash checked when the email is unknown; built on first use with `cost`
    decoy_hash: Arc<OnceCell<String>>,
}

impl CredentialService {
    /// Creates the service over a user store, hashing new passwords with `cost`
    pub fn new(users: Arc<dyn UserStore>, cost: HashCost) -> Self {
        Self {
            users,
            cost,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Underlying user store
    pub fn users(&self) -> &Arc<dyn UserStore> {
        &self.users
    }

    /// Creates an account
    ///
    /// # Errors
    ///
    /// - `Validation` for a malformed email or a password under 6 characters
    /// - `DuplicateEmail` if the normalized email is already registered
    pub async fn register(&self, email: &str, password: &str) -> Result<User, CredentialError> {
        let email = validated_email(email)?;
        password::validate_password(password).map_err(CredentialError::Validation)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(CredentialError::DuplicateEmail);
        }

        let password_hash = self.hash(password).await?;

        // The unique index still decides if two registrations race
        let user = self.users.insert(NewUser { email, password_hash }).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Looks a user up by email, case-insensitively
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, CredentialError> {
        Ok(self.users.find_by_email(&normalize_email(email)).await?)
    }

    /// Checks a plaintext password against the user's stored hash
    pub async fn verify_password(&self, user: &User, password: &str) -> Result<bool, CredentialError> {
        verify_blocking(password, &user.password_hash).await
    }

    /// Resolves an email/password pair to a user
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` when the email is unknown or the password is wrong
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, CredentialError> {
        let Some(user) = self.find_by_email(email).await? else {
            let decoy = self
                .decoy_hash
                .get_or_try_init(|| self.hash("taskdesk-decoy-password"))
                .await?;
            verify_blocking(password, decoy).await?;

            tracing::debug!("Login attempt for unknown email");
            return Err(CredentialError::InvalidCredentials);
        };

        if !self.verify_password(&user, password).await? {
            tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
            return Err(CredentialError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Updates email and/or password
    ///
    /// The password is hashed only when it changed: an absent password leaves
    /// the hash untouched, and a password that verifies against the current
    /// hash is treated as unchanged. A stored hash is never fed back through
    /// the hasher.
    pub async fn update(&self, user_id: Uuid, update: UserUpdate) -> Result<User, CredentialError> {
        let current = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(CredentialError::UserNotFound)?;

        let mut changes = UserChanges::default();

        if let Some(email) = update.email {
            let email = validated_email(&email)?;
            if email != current.email {
                changes.email = Some(email);
            }
        }

        if let Some(new_password) = update.password {
            password::validate_password(&new_password).map_err(CredentialError::Validation)?;

            if !self.verify_password(&current, &new_password).await? {
                changes.password_hash = Some(self.hash(&new_password).await?);
            }
        }

        if changes.is_empty() {
            return Ok(current);
        }

        let updated = self
            .users
            .update(user_id, changes)
            .await?
            .ok_or(CredentialError::UserNotFound)?;

        tracing::info!(user_id = %updated.id, "User updated");
        Ok(updated)
    }

    async fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let password = password.to_string();
        let cost = self.cost;

        let hash = tokio::task::spawn_blocking(move || password::hash_password(&password, cost))
            .await
            .map_err(|e| PasswordError::HashError(format!("Hashing task failed: {}", e)))??;

        Ok(hash)
    }
}

async fn verify_blocking(password: &str, hash: &str) -> Result<bool, CredentialError> {
    let password = password.to_string();
    let hash = hash.to_string();

    let matches = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::VerifyError(format!("Verification task failed: {}", e)))??;

    Ok(matches)
}

fn validated_email(email: &str) -> Result<String, CredentialError> {
    let email = normalize_email(email);

    if !is_valid_email(&email) {
        return Err(CredentialError::Validation(
            "Please use a valid email address".to_string(),
        ));
    }

    Ok(email)
}
