use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{NotificationRepository, RepositoryError, TaskRepository, UserRepository};
use crate::models::{Notification, Page, Task, TaskHistory, TaskQuery, User};

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, role, password_hash, is_active, created_at, updated_at";
const TASK_COLUMNS: &str =
    "id, title, description, status, assignee_id, is_deleted, created_at, updated_at";

/// Applies the pending migrations in `./migrations`.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

fn map_unique_violation(error: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() {
            return RepositoryError::Conflict(message.to_string());
        }
    }
    RepositoryError::Database(error)
}

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO users (id, email, first_name, last_name, role, password_hash, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.role)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "User with this email already exists"))?;
        Ok(())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn update(&self, user: &User) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE users
             SET email = $2, first_name = $3, last_name = $4, role = $5, password_hash = $6,
                 is_active = $7, updated_at = $8
             WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.role)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "User with this email already exists"))?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Appends the `WHERE` clause shared by the count and page queries.
fn push_task_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &TaskQuery) {
    builder.push(" WHERE is_deleted = FALSE");
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(assignee_id) = query.assignee_id {
        builder.push(" AND assignee_id = ").push_bind(assignee_id);
    }
    if let Some(search) = query.search_term() {
        let pattern = like_pattern(search);
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(r" ESCAPE '\' OR description ILIKE ")
            .push_bind(pattern)
            .push(r" ESCAPE '\')");
    }
}

/// Builds a `LIKE` pattern matching `term` literally anywhere in the text.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

async fn insert_history<'e, E>(executor: E, entry: &TaskHistory) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        "INSERT INTO task_history (id, task_id, action, actor_user_id, comment, occurred_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(entry.id)
    .bind(entry.task_id)
    .bind(entry.action)
    .bind(entry.actor_user_id)
    .bind(&entry.comment)
    .bind(entry.occurred_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn list(&self, query: &TaskQuery) -> Result<Page<Task>, RepositoryError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks");
        push_task_filters(&mut count, query);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM tasks", TASK_COLUMNS));
        push_task_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::from(query.page_size()))
            .push(" OFFSET ")
            .push_bind(query.offset() as i64);
        let items = select.build_query_as::<Task>().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total: total.max(0) as u64,
            page: query.page(),
            page_size: query.page_size(),
        })
    }

    async fn find(&self, id: Uuid) -> Result<Option<Task>, RepositoryError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND is_deleted = FALSE",
            TASK_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn create(&self, task: &Task, entry: &TaskHistory) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO tasks (id, title, description, status, assignee_id, is_deleted, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.assignee_id)
        .bind(task.is_deleted)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&mut *tx)
        .await?;
        insert_history(&mut *tx, entry).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn save(&self, task: &Task, entry: &TaskHistory) -> Result<bool, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE tasks
             SET title = $2, description = $3, status = $4, assignee_id = $5, is_deleted = $6, updated_at = $7
             WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.assignee_id)
        .bind(task.is_deleted)
        .bind(task.updated_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        insert_history(&mut *tx, entry).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn history(&self, task_id: Uuid) -> Result<Vec<TaskHistory>, RepositoryError> {
        let entries = sqlx::query_as::<_, TaskHistory>(
            "SELECT id, task_id, action, actor_user_id, comment, occurred_at
             FROM task_history WHERE task_id = $1 ORDER BY occurred_at ASC",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

#[derive(Debug, Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, title, message, is_read, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, RepositoryError> {
        let items = sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, title, message, is_read, created_at
             FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
