/// Storage ports
///
/// The services in this crate only talk to storage through these two traits.
/// Adapters:
///
/// - [`postgres`]: sqlx/PostgreSQL, used by the API server
/// - [`memory`]: in-process, used by tests and local experiments
///
/// Every task method takes the owner and filters by it inside the store, so
/// a task can never be read or written through a path that skips the
/// ownership check.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    task::{NewTask, Task, TaskChanges},
    user::{NewUser, User, UserChanges},
};

pub mod memory;
pub mod postgres;

/// Error type for storage adapters
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint on the user email was violated
    #[error("Email already exists")]
    DuplicateEmail,

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classifies a sqlx error, recognizing the users email unique constraint
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation()
                && db_err.constraint().is_some_and(|c| c.contains("email"))
            {
                return StoreError::DuplicateEmail;
            }
        }

        StoreError::Database(err)
    }
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Fails with `DuplicateEmail` if the email is taken.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Fetches a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Fetches a user by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Applies changes to a user, returning the updated record if it exists
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError>;

    /// Checks that the backing store is reachable
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Owner-scoped task persistence
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task
    async fn insert(&self, task: NewTask) -> Result<Task, StoreError>;

    /// Lists the owner's tasks in insertion order
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Task>, StoreError>;

    /// Fetches a task only if it belongs to `owner_id`
    async fn find_owned(&self, id: Uuid, owner_id: Uuid) -> Result<Option<Task>, StoreError>;

    /// Updates a task only if it belongs to `owner_id`
    async fn update_owned(
        &self,
        id: Uuid,
        owner_id: Uuid,
        changes: TaskChanges,
    ) -> Result<Option<Task>, StoreError>;

    /// Deletes a task only if it belongs to `owner_id`. Returns whether a row was removed.
    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_stay_database() {
        let err = StoreError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_duplicate_email_display() {
        assert_eq!(StoreError::DuplicateEmail.to_string(), "Email already exists");
    }
}
