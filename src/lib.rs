#![doc = "The `taskboard` library crate."]
#![doc = ""]
#![doc = "Identity (registration, login, bearer tokens), tasks with an audit trail,"]
#![doc = "and per-user notifications with live push. The binary (`main.rs`) only"]
#![doc = "reads configuration, picks a store and starts the server."]

pub mod app;
pub mod auth;
pub mod config;
pub mod correlation;
pub mod error;
pub mod models;
pub mod notify;
pub mod repository;
pub mod routes;

pub use crate::app::AppState;
pub use crate::error::AppError;
