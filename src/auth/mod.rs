pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use service::{AuthError, AuthService};
pub use token::{Claims, TokenError, TokenService};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    /// Must be at least 6 characters and at most 72 bytes long.
    #[validate(length(min = 6), custom = "password_fits_hasher")]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 2, max = 100))]
    pub first_name: String,
    #[validate(length(min = 2, max = 100))]
    pub last_name: String,
    /// Must be at least 6 characters and at most 72 bytes long.
    #[validate(length(min = 6), custom = "password_fits_hasher")]
    pub password: String,
}

/// bcrypt ignores everything past its input limit, so longer passwords are refused.
fn password_fits_hasher(password: &str) -> Result<(), ValidationError> {
    if password.len() > password::MAX_PASSWORD_BYTES {
        let mut error = ValidationError::new("length");
        error.add_param("max".into(), &password::MAX_PASSWORD_BYTES);
        return Err(error);
    }
    Ok(())
}

/// Response structure after successful authentication (login or registration).
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The unique identifier of the authenticated user.
    pub user_id: Uuid,
    pub email: String,
    /// Bearer token for subsequent requests.
    pub token: String,
}
