/// Task model
///
/// A task belongs to exactly one user, fixed at creation from the
/// authenticated requester. Every store operation on tasks is filtered by
/// owner; see [`crate::store::TaskStore`].
///
/// # State Machine
///
/// ```text
/// incomplete ⇄ completed
/// ```
///
/// Tasks always start incomplete. The only transition is an update that sets
/// `completed`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     seq BIGSERIAL NOT NULL,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title TEXT NOT NULL,
///     description TEXT,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Completion state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not done yet (initial state)
    Incomplete,

    /// Marked as done
    Completed,
}

impl TaskStatus {
    /// Converts status to string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Incomplete => "incomplete",
            TaskStatus::Completed => "completed",
        }
    }
}

impl From<bool> for TaskStatus {
    fn from(completed: bool) -> Self {
        if completed {
            TaskStatus::Completed
        } else {
            TaskStatus::Incomplete
        }
    }
}

/// Task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user ID
    #[serde(rename = "owner")]
    pub owner_id: Uuid,

    /// Title, never blank
    pub title: String,

    /// Optional free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether the task is done
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Current status
    pub fn status(&self) -> TaskStatus {
        TaskStatus::from(self.completed)
    }
}

/// Input for inserting a task
///
/// Built by [`crate::task_access::TaskAccess`] from the authenticated
/// identity and validated fields. There is no way to pass an owner from a
/// request body.
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Owning user ID
    pub owner_id: Uuid,

    /// Trimmed, non-blank title
    pub title: String,

    /// Trimmed description, `None` when absent or blank
    pub description: Option<String>,
}

/// Client-supplied partial update
///
/// Distinguishes a missing field from one explicitly set:
/// - `title`: absent keeps the title, a string replaces it
/// - `description`: absent keeps it, `null` clears it, a string replaces it
/// - `completed`: absent keeps it, `true`/`false` sets it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TaskPatch {
    /// New title
    #[serde(default)]
    pub title: Option<String>,

    /// New description (`Some(None)` clears)
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,

    /// New completion flag
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// True when the patch carries no field at all
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// Validated changes written by the store
///
/// Same tri-state semantics as [`TaskPatch`], after trimming and validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    /// New title
    pub title: Option<String>,

    /// New description (`Some(None)` clears)
    pub description: Option<Option<String>>,

    /// New completion flag
    pub completed: Option<bool>,
}

impl TaskChanges {
    /// True when nothing would be written
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Applies the changes to an in-memory task, bumping `updated_at`
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();
    }
}

/// Marks a field as present whenever the key appears, even with `null`
fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Buy milk".to_string(),
            description: None,
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_task_status() {
        assert_eq!(TaskStatus::from(false), TaskStatus::Incomplete);
        assert_eq!(TaskStatus::from(true), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.as_str(), "completed");
        assert_eq!(sample_task().status(), TaskStatus::Incomplete);
    }

    #[test]
    fn test_task_serializes_owner() {
        let task = sample_task();
        let value = serde_json::to_value(&task).unwrap();

        assert_eq!(value["owner"], task.owner_id.to_string());
        assert_eq!(value["title"], "Buy milk");
        assert_eq!(value["completed"], false);
        assert!(value.get("owner_id").is_none());
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_patch_distinguishes_absent_from_false() {
        let patch: TaskPatch = serde_json::from_value(json!({})).unwrap();
        assert!(patch.is_empty());

        let patch: TaskPatch = serde_json::from_value(json!({ "completed": false })).unwrap();
        assert_eq!(patch.completed, Some(false));
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_patch_description_tri_state() {
        let patch: TaskPatch = serde_json::from_value(json!({ "title": "x" })).unwrap();
        assert_eq!(patch.description, None);

        let patch: TaskPatch = serde_json::from_value(json!({ "description": null })).unwrap();
        assert_eq!(patch.description, Some(None));

        let patch: TaskPatch = serde_json::from_value(json!({ "description": "" })).unwrap();
        assert_eq!(patch.description, Some(Some(String::new())));
    }

    #[test]
    fn test_patch_ignores_owner_field() {
        let patch: TaskPatch =
            serde_json::from_value(json!({ "owner": Uuid::new_v4(), "completed": true })).unwrap();
        assert_eq!(patch.completed, Some(true));
    }

    #[test]
    fn test_changes_apply_only_present_fields() {
        let mut task = sample_task();
        task.description = Some("at the corner shop".to_string());

        let changes = TaskChanges {
            completed: Some(true),
            ..Default::default()
        };
        changes.apply_to(&mut task);

        assert!(task.completed);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description.as_deref(), Some("at the corner shop"));

        let changes = TaskChanges {
            description: Some(None),
            ..Default::default()
        };
        changes.apply_to(&mut task);
        assert!(task.description.is_none());
    }
}
