use std::env;
use thiserror::Error;

/// Minimum accepted length, in bytes, of the HS256 signing secret.
pub const MIN_SECRET_LEN: usize = 32;

/// Settings for issuing and validating identity tokens.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_hours: i64,
}

impl JwtSettings {
    pub const DEFAULT_ISSUER: &'static str = "TaskManagement.AuthService";
    pub const DEFAULT_AUDIENCE: &'static str = "TaskManagement.Client";
    pub const DEFAULT_EXPIRATION_HOURS: i64 = 24;
    /// Longest accepted token lifetime, one year.
    pub const MAX_EXPIRATION_HOURS: i64 = 24 * 365;
}

/// Process configuration, read once at startup and handed to constructors.
#[derive(Debug, Clone)]
pub struct Config {
    /// `None` selects the in-memory stores.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub jwt: JwtSettings,
    pub bcrypt_cost: u32,
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },

    #[error("JWT_SECRET must be at least {} bytes", MIN_SECRET_LEN)]
    SecretTooShort,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort);
        }

        let bcrypt_cost: u32 = parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
            });
        }

        let expiration_hours: i64 =
            parse_var("JWT_EXPIRATION_HOURS", JwtSettings::DEFAULT_EXPIRATION_HOURS)?;
        if !(1..=JwtSettings::MAX_EXPIRATION_HOURS).contains(&expiration_hours) {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRATION_HOURS",
                value: expiration_hours.to_string(),
            });
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            server_port: parse_var("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt: JwtSettings {
                secret,
                issuer: env::var("JWT_ISSUER")
                    .unwrap_or_else(|_| JwtSettings::DEFAULT_ISSUER.to_string()),
                audience: env::var("JWT_AUDIENCE")
                    .unwrap_or_else(|_| JwtSettings::DEFAULT_AUDIENCE.to_string()),
                expiration_hours,
            },
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}
