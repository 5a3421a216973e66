use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Role label given to every self-registered account.
pub const DEFAULT_ROLE: &str = "User";

/// A registered account as stored by a `UserRepository`.
///
/// `password_hash` is never serialized; use [`UserProfile`] for responses.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a fresh, active account with a new id and the default role.
    pub fn new(email: String, first_name: String, last_name: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            first_name,
            last_name,
            role: DEFAULT_ROLE.to_string(),
            password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public view of a [`User`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Payload for `PUT /api/auth/me`.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 2, max = 100))]
    pub first_name: String,
    #[validate(length(min = 2, max = 100))]
    pub last_name: String,
}
