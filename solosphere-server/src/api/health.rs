//! Health Check API Handlers
//!
//! Liveness endpoints for monitoring.

use axum::{http::StatusCode, response::IntoResponse};

/// GET /
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "SoloSphere server is running")
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
