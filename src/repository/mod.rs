//! Persistence boundaries.
//!
//! Each aggregate is stored behind an async trait so handlers and the auth
//! service stay agnostic of the backing store. [`postgres`] holds the `sqlx`
//! implementations used in production; [`memory`] holds the in-memory ones
//! used when no `DATABASE_URL` is configured and throughout the tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Notification, Page, Task, TaskHistory, TaskQuery, User};

pub use memory::{InMemoryNotificationRepository, InMemoryTaskRepository, InMemoryUserRepository};
pub use postgres::{PgNotificationRepository, PgTaskRepository, PgUserRepository};

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage for registered accounts. Emails are unique and compared exactly.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    /// Fails with [`RepositoryError::Conflict`] when the email is taken.
    async fn insert(&self, user: &User) -> Result<(), RepositoryError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError>;

    /// Overwrites the mutable fields of an existing account.
    /// Returns `false` when no account has `user.id`.
    async fn update(&self, user: &User) -> Result<bool, RepositoryError>;
}

/// Storage for tasks and their audit trail.
///
/// Soft-deleted tasks are invisible to every read. Each write stores the task
/// and its history entry together.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn list(&self, query: &TaskQuery) -> Result<Page<Task>, RepositoryError>;

    async fn find(&self, id: Uuid) -> Result<Option<Task>, RepositoryError>;

    async fn create(&self, task: &Task, entry: &TaskHistory) -> Result<(), RepositoryError>;

    /// Persists a changed task. Returns `false` when the task is absent or was
    /// already deleted, in which case the history entry is not written either.
    async fn save(&self, task: &Task, entry: &TaskHistory) -> Result<bool, RepositoryError>;

    /// Oldest entry first.
    async fn history(&self, task_id: Uuid) -> Result<Vec<TaskHistory>, RepositoryError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> Result<(), RepositoryError>;

    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, RepositoryError>;
}
