//! Axum HTTP API server for the JobHub platform.
//!
//! This crate provides:
//! - Registration/login with argon2 hashes and HS256 bearer tokens
//! - Job, application, and screening endpoints with role/ownership guards
//! - The admin surface (dashboard plus user/job/application management)
//! - Static serving of uploaded resumes

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
