//! # Analysis Handlers
//!
//! Analyses hang off a business object; the owning object is resolved in the
//! caller's tenant before any analysis row is read or written.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{CurrentUser, TenantId};
use crate::error::{ApiError, not_found};
use crate::handlers::types::deserialize_some;
use crate::models::AnalysisResponse;
use crate::models::business_object::Model as BusinessObject;
use crate::repositories::{
    AnalysisPatch, AnalysisRepository, BusinessObjectRepository, NewAnalysis, analysis,
    business_object,
};
use crate::server::AppState;

/// New analysis. `insights`, `recommendations` and `metrics` may be omitted or
/// `null`; they are stored as `[]`, `[]` and `{}`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateAnalysisRequest {
    #[schema(example = "performance")]
    pub analysis_type: String,
    pub summary: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub insights: Option<Vec<Value>>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub recommendations: Option<Vec<Value>>,
    #[schema(example = 0.87)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub metrics: Option<Value>,
}

impl From<CreateAnalysisRequest> for NewAnalysis {
    fn from(request: CreateAnalysisRequest) -> Self {
        Self {
            analysis_type: request.analysis_type,
            summary: request.summary,
            insights: request.insights.unwrap_or_default(),
            recommendations: request.recommendations.unwrap_or_default(),
            confidence_score: request.confidence_score,
            metrics: request
                .metrics
                .unwrap_or_else(|| Value::Object(Default::default())),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateAnalysisRequest {
    pub analysis_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub summary: Option<Option<String>>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub insights: Option<Vec<Value>>,
    #[schema(value_type = Option<Vec<Object>>)]
    pub recommendations: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<f64>)]
    pub confidence_score: Option<Option<f64>>,
    #[schema(value_type = Option<Object>)]
    pub metrics: Option<Value>,
}

impl From<UpdateAnalysisRequest> for AnalysisPatch {
    fn from(request: UpdateAnalysisRequest) -> Self {
        Self {
            analysis_type: request.analysis_type,
            summary: request.summary,
            insights: request.insights,
            recommendations: request.recommendations,
            confidence_score: request.confidence_score,
            metrics: request.metrics,
        }
    }
}

async fn owning_object(
    state: &AppState,
    object_id: Uuid,
    tenant_id: &TenantId,
) -> Result<BusinessObject, ApiError> {
    BusinessObjectRepository::new(&state.db)
        .get(object_id, tenant_id)
        .await?
        .ok_or_else(|| not_found(business_object::NOT_FOUND_MESSAGE))
}

/// Lists analyses of a business object, newest first
#[utoipa::path(
    get,
    path = "/analysis/{object_id}",
    security(("bearer_auth" = [])),
    params(("object_id" = Uuid, Path, description = "Business object id")),
    responses(
        (status = 200, description = "Analyses of the object", body = [AnalysisResponse]),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Business object not found", body = ApiError)
    ),
    tag = "analysis"
)]
pub async fn list_analyses(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<AnalysisResponse>>, ApiError> {
    let Path(object_id) = path?;
    let object = owning_object(&state, object_id, &user.tenant_id).await?;

    let analyses = AnalysisRepository::new(&state.db)
        .list_by_object(object.id, &user.tenant_id)
        .await?;

    Ok(Json(analyses.into_iter().map(AnalysisResponse::from).collect()))
}

/// Records an analysis against a business object
#[utoipa::path(
    post,
    path = "/analysis/{object_id}",
    security(("bearer_auth" = [])),
    params(("object_id" = Uuid, Path, description = "Business object id")),
    request_body = CreateAnalysisRequest,
    responses(
        (status = 200, description = "Created analysis", body = AnalysisResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Business object not found", body = ApiError),
        (status = 422, description = "Invalid request body", body = ApiError)
    ),
    tag = "analysis"
)]
pub async fn create_analysis(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<CreateAnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let Path(object_id) = path?;
    let Json(request) = body?;
    let object = owning_object(&state, object_id, &user.tenant_id).await?;

    let created = AnalysisRepository::new(&state.db)
        .create(request.into(), object.id, &user.tenant_id, &user.id)
        .await?;

    Ok(Json(created.into()))
}

/// Applies a partial update to an analysis
#[utoipa::path(
    put,
    path = "/analysis/{object_id}/{analysis_id}",
    security(("bearer_auth" = [])),
    params(
        ("object_id" = Uuid, Path, description = "Business object id"),
        ("analysis_id" = Uuid, Path, description = "Analysis id")
    ),
    request_body = UpdateAnalysisRequest,
    responses(
        (status = 200, description = "Updated analysis", body = AnalysisResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Business object or analysis not found", body = ApiError),
        (status = 422, description = "Invalid request body", body = ApiError)
    ),
    tag = "analysis"
)]
pub async fn update_analysis(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    body: Result<Json<UpdateAnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let Path((object_id, analysis_id)) = path?;
    let Json(request) = body?;
    let object = owning_object(&state, object_id, &user.tenant_id).await?;

    let repo = AnalysisRepository::new(&state.db);
    let existing = repo
        .get(analysis_id, &user.tenant_id)
        .await?
        .filter(|analysis| analysis.business_object_id == object.id)
        .ok_or_else(|| not_found(analysis::NOT_FOUND_MESSAGE))?;

    let updated = repo.update(existing, request.into()).await?;
    Ok(Json(updated.into()))
}
