use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NotificationRepository, RepositoryError, TaskRepository, UserRepository};
use crate::models::{Notification, Page, Task, TaskHistory, TaskQuery, User};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(
                "User with this email already exists".into(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError> {
        Ok(self.users.read().await.values().any(|u| u.email == email))
    }

    async fn update(&self, user: &User) -> Result<bool, RepositoryError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email && u.id != user.id) {
            return Err(RepositoryError::Conflict(
                "User with this email already exists".into(),
            ));
        }
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Default)]
struct TaskTables {
    tasks: HashMap<Uuid, Task>,
    history: Vec<TaskHistory>,
}

#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tables: RwLock<TaskTables>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list(&self, query: &TaskQuery) -> Result<Page<Task>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&Task> = tables
            .tasks
            .values()
            .filter(|t| !t.is_deleted)
            .filter(|t| query.status.map_or(true, |s| t.status == s))
            .filter(|t| query.assignee_id.map_or(true, |a| t.assignee_id == Some(a)))
            .filter(|t| query.search_term().map_or(true, |term| t.matches_search(term)))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.page_size() as usize)
            .cloned()
            .collect();

        Ok(Page {
            items,
            total,
            page: query.page(),
            page_size: query.page_size(),
        })
    }

    async fn find(&self, id: Uuid) -> Result<Option<Task>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.tasks.get(&id).filter(|t| !t.is_deleted).cloned())
    }

    async fn create(&self, task: &Task, entry: &TaskHistory) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.tasks.contains_key(&task.id) {
            return Err(RepositoryError::Conflict("Task already exists".into()));
        }
        tables.tasks.insert(task.id, task.clone());
        tables.history.push(entry.clone());
        Ok(())
    }

    async fn save(&self, task: &Task, entry: &TaskHistory) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        match tables.tasks.get_mut(&task.id) {
            Some(stored) if !stored.is_deleted => *stored = task.clone(),
            _ => return Ok(false),
        }
        tables.history.push(entry.clone());
        Ok(true)
    }

    async fn history(&self, task_id: Uuid) -> Result<Vec<TaskHistory>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .history
            .iter()
            .filter(|e| e.task_id == task_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), RepositoryError> {
        self.notifications.write().await.push(notification.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, RepositoryError> {
        let notifications = self.notifications.read().await;
        let mut items: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }
}
