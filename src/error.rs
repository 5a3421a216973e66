//!
//! # Custom Error Handling
//!
//! This module defines the error type `AppError` returned by every HTTP handler.
//! Domain layers report their own typed failures (`AuthError`, `TokenError`,
//! `RepositoryError`); the `From` implementations below fold them into
//! `AppError` so handlers can use the `?` operator.
//!
//! `AppError` implements `actix_web::error::ResponseError`, turning each variant
//! into a status code and a JSON body of the form `{"error": "<message>"}`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::service::AuthError;
use crate::auth::token::TokenError;
use crate::repository::RepositoryError;

/// Represents all possible errors that can surface from a request handler.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is required but missing (HTTP 401).
    Unauthorized(String),
    /// Malformed or otherwise rejected request (HTTP 400).
    BadRequest(String),
    /// Requested resource was not found (HTTP 404).
    NotFound(String),
    /// Unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Error originating from the persistence layer (HTTP 500).
    /// The message is logged but never sent to the client.
    DatabaseError(String),
    /// Input failed validation (HTTP 422 Unprocessable Entity).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::DatabaseError(msg) => {
                error!("database error: {}", msg);
                "Database error"
            }
            AppError::InternalServerError(msg) => {
                error!("internal error: {}", msg);
                "Internal server error"
            }
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg) => msg.as_str(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// `sqlx::Error::RowNotFound` becomes `NotFound`; everything else is a database error.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(error: RepositoryError) -> AppError {
        match error {
            RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
            RepositoryError::Database(err) => AppError::from(err),
        }
    }
}

/// Every token failure is an authentication failure, except a signing failure
/// at issue time, which is the server's fault.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            err @ (TokenError::Encoding(_) | TokenError::LifetimeOutOfRange(_)) => {
                AppError::InternalServerError(format!("Failed to generate token: {}", err))
            }
            other => AppError::Unauthorized(format!("Invalid token: {}", other)),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::DuplicateIdentity => AppError::BadRequest("Email already registered".into()),
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::NotFound => AppError::NotFound("User not found".into()),
            AuthError::Token(err) => AppError::from(err),
            AuthError::Repository(err) => AppError::from(err),
        }
    }
}
