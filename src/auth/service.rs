use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use thiserror::Error;
use uuid::Uuid;

use super::password::PasswordHasher;
use super::token::{TokenError, TokenService};
use super::{AuthResponse, LoginRequest, RegisterRequest};
use crate::models::{ProfileUpdate, User, UserProfile};
use crate::repository::{RepositoryError, UserRepository};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    DuplicateIdentity,

    /// Unknown email and wrong password both end up here.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AuthError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Conflict(_) => AuthError::DuplicateIdentity,
            other => AuthError::Repository(other),
        }
    }
}

/// Registration, login and profile operations over a [`UserRepository`].
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    /// Verified against when the email is unknown, so a failed lookup costs
    /// the same bcrypt work as a wrong password.
    dummy_digest: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            hasher,
            tokens,
            dummy_digest: hasher.hash("dummy-password-for-timing"),
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates an account and returns a token for it.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AuthError> {
        if self.users.exists_by_email(&request.email).await? {
            return Err(AuthError::DuplicateIdentity);
        }

        let user = User::new(
            request.email.clone(),
            request.first_name.clone(),
            request.last_name.clone(),
            self.hasher.hash(&request.password),
        );
        // A concurrent registration can still win the race; the store's
        // uniqueness check turns that into `DuplicateIdentity` as well.
        self.users.insert(&user).await?;

        let token = self.tokens.issue(&user)?;
        info!("registered user {}", user.id);
        Ok(AuthResponse {
            user_id: user.id,
            email: user.email,
            token,
        })
    }

    /// Checks credentials and returns a fresh token.
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        let user = match self.users.find_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                self.hasher.verify(&self.dummy_digest, &request.password);
                warn!("login failed: invalid credentials");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(&user.password_hash, &request.password) {
            warn!("login failed: invalid credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        Ok(AuthResponse {
            user_id: user.id,
            email: user.email,
            token,
        })
    }

    pub async fn current_user(&self, id: Uuid) -> Result<UserProfile, AuthError> {
        self.users
            .find_by_id(id)
            .await?
            .map(UserProfile::from)
            .ok_or(AuthError::NotFound)
    }

    pub async fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, AuthError> {
        let mut user = self.users.find_by_id(id).await?.ok_or(AuthError::NotFound)?;
        user.first_name = update.first_name.clone();
        user.last_name = update.last_name.clone();
        user.updated_at = Utc::now();

        if !self.users.update(&user).await? {
            return Err(AuthError::NotFound);
        }
        Ok(UserProfile::from(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtSettings;
    use crate::repository::InMemoryUserRepository;
    use pretty_assertions::assert_eq;

    fn service() -> AuthService {
        let settings = JwtSettings {
            secret: "k".repeat(32),
            issuer: JwtSettings::DEFAULT_ISSUER.to_string(),
            audience: JwtSettings::DEFAULT_AUDIENCE.to_string(),
            expiration_hours: 24,
        };
        AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            PasswordHasher::new(4),
            Arc::new(TokenService::new(&settings)),
        )
    }

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            password: password.to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[actix_rt::test]
    async fn test_register_and_login_scenario() {
        let service = service();

        let registered = service
            .register(&register_request("alice@example.com", "Password123!"))
            .await
            .unwrap();
        assert_eq!(registered.email, "alice@example.com");
        assert_eq!(
            service.tokens().validate(&registered.token).unwrap(),
            registered.user_id
        );

        let duplicate = service
            .register(&register_request("alice@example.com", "Other456!"))
            .await;
        assert!(matches!(duplicate, Err(AuthError::DuplicateIdentity)));

        let logged_in = service
            .login(&login_request("alice@example.com", "Password123!"))
            .await
            .unwrap();
        assert_eq!(logged_in.user_id, registered.user_id);
        assert_eq!(
            service.tokens().validate(&logged_in.token).unwrap(),
            registered.user_id
        );

        let wrong_password = service
            .login(&login_request("alice@example.com", "WrongPassword!"))
            .await;
        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
    }

    #[actix_rt::test]
    async fn test_unknown_email_and_wrong_password_are_indistinguishable() {
        let service = service();
        service
            .register(&register_request("bob@example.com", "Password123!"))
            .await
            .unwrap();

        let unknown = service
            .login(&login_request("nobody@example.com", "Password123!"))
            .await
            .unwrap_err();
        let wrong = service
            .login(&login_request("bob@example.com", "Password999!"))
            .await
            .unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[actix_rt::test]
    async fn test_email_is_case_sensitive() {
        let service = service();
        service
            .register(&register_request("carol@example.com", "Password123!"))
            .await
            .unwrap();

        let login = service
            .login(&login_request("Carol@example.com", "Password123!"))
            .await;
        assert!(matches!(login, Err(AuthError::InvalidCredentials)));
    }

    #[actix_rt::test]
    async fn test_profile_lookup_and_update() {
        let service = service();
        let registered = service
            .register(&register_request("dave@example.com", "Password123!"))
            .await
            .unwrap();

        let profile = service.current_user(registered.user_id).await.unwrap();
        assert_eq!(profile.first_name, "Alice");
        assert_eq!(profile.role, "User");
        assert!(profile.is_active);

        let updated = service
            .update_profile(
                registered.user_id,
                &ProfileUpdate {
                    first_name: "David".to_string(),
                    last_name: "Jones".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.first_name, "David");
        assert!(updated.updated_at >= profile.updated_at);

        assert!(matches!(
            service.current_user(Uuid::new_v4()).await,
            Err(AuthError::NotFound)
        ));
    }
}
