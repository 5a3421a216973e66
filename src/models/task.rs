use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Default number of tasks per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Upper bound on the page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Lifecycle state of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started yet.
    #[default]
    Pending,
    /// Currently being worked on.
    InProgress,
    /// Finished.
    Completed,
    /// Kept for reference, no longer active.
    Archived,
}

/// Kind of change recorded in a task's history.
/// Corresponds to the `task_action` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    Created,
    Updated,
    Assigned,
    Deleted,
}

/// Input structure for creating or updating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// At most 2000 characters if provided.
    #[validate(length(max = 2000))]
    pub description: Option<String>,

    /// Defaults to `pending` when omitted.
    #[serde(default)]
    pub status: TaskStatus,
}

/// A task as stored and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assignee_id: Option<Uuid>,
    #[serde(skip_serializing, default)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    /// `None` until the first change after creation.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new, unassigned `Task` from `TaskInput` with a fresh id.
    pub fn new(input: TaskInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: input.status,
            assignee_id: None,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Applies an update payload and stamps `updated_at`.
    pub fn apply(&mut self, input: TaskInput) {
        self.title = input.title;
        self.description = input.description;
        self.status = input.status;
        self.updated_at = Some(Utc::now());
    }

    /// Case-insensitive match against title or description.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

/// One entry in a task's audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskHistory {
    pub id: Uuid,
    pub task_id: Uuid,
    pub action: TaskAction,
    pub actor_user_id: Option<Uuid>,
    pub comment: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl TaskHistory {
    pub fn record(task_id: Uuid, action: TaskAction, actor_user_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            action,
            actor_user_id,
            comment: None,
            occurred_at: Utc::now(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Query parameters for listing tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<Uuid>,
    /// Matched case-insensitively against title and description.
    pub search: Option<String>,
}

impl TaskQuery {
    /// 1-based page number, at least 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.page_size())
    }

    /// The search term, ignoring blank input.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

/// Query parameters for `PUT /api/tasks/{id}/assign`.
#[derive(Debug, Deserialize)]
pub struct AssignQuery {
    pub assignee_id: Uuid,
}

/// A single page of results.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}
