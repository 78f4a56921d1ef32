//! # AI Handlers
//!
//! Runs the configured agent strategy against a business object of the
//! caller's tenant, or answers a free-text chat message. Results are returned
//! to the caller and not persisted.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::{ApiError, not_found};
use crate::orchestrator::{AnalysisReport, OptimizationReport};
use crate::repositories::BusinessObjectRepository;
use crate::repositories::business_object::NOT_FOUND_MESSAGE;
use crate::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub object_id: Uuid,
    pub analysis: AnalysisReport,
    #[schema(example = "completed")]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OptimizeResponse {
    pub object_id: Uuid,
    pub optimization: OptimizationReport,
    #[schema(example = "completed")]
    pub status: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ChatRequest {
    /// Missing message is treated as empty and gets the general answer
    #[serde(default)]
    #[schema(example = "Can you analyze my invoice workflow?")]
    pub message: String,
    /// Free-form context forwarded to the answering agent
    #[serde(default)]
    #[schema(value_type = Object)]
    pub context: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub response: String,
    #[schema(value_type = String, example = "2024-08-16T16:57:44Z")]
    pub timestamp: DateTime<Utc>,
}

#[utoipa::path(
    post,
    path = "/ai/analyze/{object_id}",
    security(("bearer_auth" = [])),
    params(("object_id" = Uuid, Path, description = "Business object id")),
    responses(
        (status = 200, description = "Agent analysis of the object", body = AnalyzeResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Business object not found", body = ApiError)
    ),
    tag = "ai"
)]
pub async fn analyze_object(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Path(object_id) = path?;

    let object = BusinessObjectRepository::new(&state.db)
        .get(object_id, &user.tenant_id)
        .await?
        .ok_or_else(|| not_found(NOT_FOUND_MESSAGE))?;

    let analysis = state.orchestrator.analyze(&object).await;

    Ok(Json(AnalyzeResponse {
        object_id: object.id,
        analysis,
        status: "completed".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/ai/optimize/{object_id}",
    security(("bearer_auth" = [])),
    params(("object_id" = Uuid, Path, description = "Business object id")),
    responses(
        (status = 200, description = "Optimization plan for the object", body = OptimizeResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Business object not found", body = ApiError)
    ),
    tag = "ai"
)]
pub async fn optimize_object(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OptimizeResponse>, ApiError> {
    let Path(object_id) = path?;

    let object = BusinessObjectRepository::new(&state.db)
        .get(object_id, &user.tenant_id)
        .await?
        .ok_or_else(|| not_found(NOT_FOUND_MESSAGE))?;

    let optimization = state.orchestrator.optimize(&object).await;

    Ok(Json(OptimizeResponse {
        object_id: object.id,
        optimization,
        status: "completed".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/ai/chat",
    security(("bearer_auth" = [])),
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Agent reply", body = ChatResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 422, description = "Invalid request body", body = ApiError)
    ),
    tag = "ai"
)]
pub async fn chat(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = body?;

    let reply = state
        .orchestrator
        .chat(&request.message, &request.context, &user.id)
        .await;

    Ok(Json(ChatResponse {
        response: reply.response,
        timestamp: Utc::now(),
    }))
}
