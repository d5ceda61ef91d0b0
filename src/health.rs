use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    status: &'static str,
    database: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthCheckResponse>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthCheckResponse {
                status: "ok",
                database: "connected",
            }),
        ),
        Err(e) => {
            tracing::warn!("Health check could not reach MongoDB: {:#}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthCheckResponse {
                    status: "degraded",
                    database: "unavailable",
                }),
            )
        }
    }
}
