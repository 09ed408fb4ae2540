//! Axum HTTP submission API.
//!
//! This crate provides:
//! - Job creation and submission endpoints
//! - Media upload tied to a caller-supplied job id
//! - Error translation to JSON `{"error": ...}` bodies

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
