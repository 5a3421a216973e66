use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A message addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification stamped with the current time.
    pub fn new(input: NotificationInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            title: input.title,
            message: input.message,
            is_read: false,
            created_at: Utc::now(),
        }
    }
}

/// Payload for `POST /api/notifications`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotificationInput {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub message: Option<String>,
}
