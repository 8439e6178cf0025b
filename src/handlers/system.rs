// handlers/system.rs - service description, health and fallback

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use super::playground;
use crate::app::AppState;
use crate::error::ApiError;

/// GET / - GraphiQL when the playground is enabled, otherwise a JSON description
pub async fn root(State(state): State<AppState>) -> Response {
    if state.playground {
        return playground().await.into_response();
    }

    Json(json!({
        "success": true,
        "data": {
            "name": "Project Management API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "graphql": "/query (GET, POST)",
                "health": "/health",
            }
        }
    }))
    .into_response()
}

/// GET /health - 200 while the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            let err = ApiError::from(e);
            tracing::warn!("Health check failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": err.message(),
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
