//! Health check endpoint handler

use axum::Json;

use crate::api::models::HealthResponse;

/// Handler for GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
