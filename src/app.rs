//! Application wiring shared by the binary and the integration tests.

use std::sync::Arc;

use actix_web::{error, web, HttpRequest};
use sqlx::PgPool;

use crate::auth::{AuthMiddleware, AuthService, PasswordHasher, TokenService};
use crate::config::JwtSettings;
use crate::error::AppError;
use crate::notify::{NotificationHub, NotificationSender};
use crate::repository::{
    InMemoryNotificationRepository, InMemoryTaskRepository, InMemoryUserRepository,
    NotificationRepository, PgNotificationRepository, PgTaskRepository, PgUserRepository,
    TaskRepository, UserRepository,
};
use crate::routes;

/// Everything a worker needs to serve requests. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub tokens: Arc<TokenService>,
    pub tasks: Arc<dyn TaskRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub sender: Arc<dyn NotificationSender>,
}

impl AppState {
    pub fn new(
        jwt: &JwtSettings,
        hasher: PasswordHasher,
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        notifications: Arc<dyn NotificationRepository>,
        sender: Arc<dyn NotificationSender>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(jwt));
        Self {
            auth: AuthService::new(users, hasher, tokens.clone()),
            tokens,
            tasks,
            notifications,
            sender,
        }
    }

    pub fn in_memory(jwt: &JwtSettings, hasher: PasswordHasher, hub: NotificationHub) -> Self {
        Self::new(
            jwt,
            hasher,
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(InMemoryNotificationRepository::new()),
            Arc::new(hub),
        )
    }

    pub fn postgres(
        jwt: &JwtSettings,
        hasher: PasswordHasher,
        pool: PgPool,
        hub: NotificationHub,
    ) -> Self {
        Self::new(
            jwt,
            hasher,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgTaskRepository::new(pool.clone())),
            Arc::new(PgNotificationRepository::new(pool)),
            Arc::new(hub),
        )
    }

    /// Registers shared state and mounts every route under `/api`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::from(self.tokens.clone()))
            .app_data(web::Data::from(self.tasks.clone()))
            .app_data(web::Data::from(self.notifications.clone()))
            .app_data(web::Data::from(self.sender.clone()))
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::QueryConfig::default().error_handler(query_error))
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            );
    }
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query string: {}", err)).into()
}
