//! # Health Handlers
//!
//! Liveness and readiness probes. Readiness always answers 200 and reports
//! database trouble in the body.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db;
use crate::server::AppState;

pub const SERVICE_NAME: &str = "ai-agent-platform";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LivenessResponse {
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "ai-agent-platform")]
    pub service: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadinessResponse {
    #[schema(example = "ready")]
    pub status: String,
    #[schema(example = "connected")]
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Process is up", body = LivenessResponse)
    ),
    tag = "health"
)]
pub async fn live() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Database connectivity status", body = ReadinessResponse)
    ),
    tag = "health"
)]
pub async fn ready(State(state): State<AppState>) -> Json<ReadinessResponse> {
    match db::health_check(&state.db).await {
        Ok(()) => Json(ReadinessResponse {
            status: "ready".to_string(),
            database: "connected".to_string(),
            error: None,
        }),
        Err(err) => {
            tracing::warn!(error = %err, "Readiness probe failed");
            Json(ReadinessResponse {
                status: "not ready".to_string(),
                database: "disconnected".to_string(),
                error: Some(err.to_string()),
            })
        }
    }
}
