/// Owner-scoped task operations
///
/// Every operation takes the requester's user ID, which callers obtain from
/// the authenticated [`AuthContext`](crate::auth::middleware::AuthContext),
/// never from request input. A task that exists but belongs to someone else
/// is reported exactly like a task that does not exist.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskdesk_shared::models::task::TaskPatch;
/// use taskdesk_shared::store::memory::InMemoryTaskStore;
/// use taskdesk_shared::task_access::TaskAccess;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tasks = TaskAccess::new(Arc::new(InMemoryTaskStore::new()));
/// let me = Uuid::new_v4();
///
/// let task = tasks.create(me, "Buy milk", None).await?;
/// assert!(!task.completed);
///
/// let patch = TaskPatch { completed: Some(true), ..Default::default() };
/// let task = tasks.update(me, task.id, patch).await?;
/// assert!(task.completed);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use uuid::Uuid;

use crate::models::task::{NewTask, Task, TaskChanges, TaskPatch};
use crate::store::{StoreError, TaskStore};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Invalid input, e.g. a blank title
    #[error("{0}")]
    Validation(String),

    /// No task with this ID belongs to the requester
    #[error("Task not found or does not belong to this user")]
    NotFound,

    /// Storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Task access controller
#[derive(Clone)]
pub struct TaskAccess {
    tasks: Arc<dyn TaskStore>,
}

impl TaskAccess {
    /// Creates the controller over a task store
    pub fn new(tasks: Arc<dyn TaskStore>) -> Self {
        Self { tasks }
    }

    /// Lists the requester's tasks in insertion order
    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Task>, TaskError> {
        Ok(self.tasks.list_by_owner(owner_id).await?)
    }

    /// Creates a task owned by the requester
    ///
    /// Title and description are trimmed. A blank description is stored as
    /// absent. New tasks always start incomplete.
    ///
    /// # Errors
    ///
    /// `Validation` if the title is empty or whitespace only
    pub async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        description: Option<&str>,
    ) -> Result<Task, TaskError> {
        let title = validated_title(title)?;
        let description = description.and_then(clean_description);

        let task = self
            .tasks
            .insert(NewTask {
                owner_id,
                title,
                description,
            })
            .await?;

        tracing::debug!(task_id = %task.id, owner_id = %owner_id, "Task created");
        Ok(task)
    }

    /// Fetches one of the requester's tasks
    pub async fn get(&self, owner_id: Uuid, task_id: Uuid) -> Result<Task, TaskError> {
        self.tasks
            .find_owned(task_id, owner_id)
            .await?
            .ok_or(TaskError::NotFound)
    }

    /// Applies a partial update to one of the requester's tasks
    ///
    /// Only fields present in the patch change. `completed: false` is a real
    /// change, not an absent field. An empty patch returns the task as it is
    /// without writing.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the task is missing or owned by someone else
    /// - `Validation` if a title is supplied but blank
    pub async fn update(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, TaskError> {
        let changes = validated_changes(patch)?;

        if changes.is_empty() {
            return self.get(owner_id, task_id).await;
        }

        let task = self
            .tasks
            .update_owned(task_id, owner_id, changes)
            .await?
            .ok_or(TaskError::NotFound)?;

        tracing::debug!(task_id = %task.id, completed = task.completed, "Task updated");
        Ok(task)
    }

    /// Permanently deletes one of the requester's tasks
    pub async fn delete(&self, owner_id: Uuid, task_id: Uuid) -> Result<(), TaskError> {
        if !self.tasks.delete_owned(task_id, owner_id).await? {
            return Err(TaskError::NotFound);
        }

        tracing::debug!(task_id = %task_id, "Task deleted");
        Ok(())
    }
}

fn validated_title(title: &str) -> Result<String, TaskError> {
    let title = title.trim();

    if title.is_empty() {
        return Err(TaskError::Validation("Task title is required".to_string()));
    }

    Ok(title.to_string())
}

fn clean_description(description: &str) -> Option<String> {
    let description = description.trim();
    (!description.is_empty()).then(|| description.to_string())
}

fn validated_changes(patch: TaskPatch) -> Result<TaskChanges, TaskError> {
    Ok(TaskChanges {
        title: patch.title.as_deref().map(validated_title).transpose()?,
        description: patch
            .description
            .map(|d| d.as_deref().and_then(clean_description)),
        completed: patch.completed,
    })
}
