use actix_web::middleware::{from_fn, Logger};
use actix_web::{App, HttpServer};
use log::{error, info, warn};
use sqlx::postgres::PgPoolOptions;

use taskboard::auth::PasswordHasher;
use taskboard::config::Config;
use taskboard::correlation::correlation_id;
use taskboard::notify::NotificationHub;
use taskboard::repository::postgres;
use taskboard::AppState;

const ACCESS_LOG_FORMAT: &str = r#"%a "%r" %s %b %T cid=%{x-correlation-id}o"#;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e));
        }
    };

    let hasher = PasswordHasher::new(config.bcrypt_cost);
    let hub = NotificationHub::default();

    let state = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
                .map_err(|e| {
                    error!("failed to connect to database: {}", e);
                    std::io::Error::new(std::io::ErrorKind::Other, e)
                })?;
            postgres::migrate(&pool).await.map_err(|e| {
                error!("failed to run migrations: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e)
            })?;
            info!("using PostgreSQL storage");
            AppState::postgres(&config.jwt, hasher, pool, hub)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory storage; data is lost on restart");
            AppState::in_memory(&config.jwt, hasher, hub)
        }
    };

    info!("Starting taskboard server at {}", config.server_url());
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(from_fn(correlation_id))
            .wrap(Logger::new(ACCESS_LOG_FORMAT))
            .configure(move |cfg| state.configure(cfg))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
