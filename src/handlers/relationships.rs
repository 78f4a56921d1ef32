//! # Relationship Handlers

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::{ApiError, not_found};
use crate::models::{RelationshipResponse, RelationshipType};
use crate::repositories::business_object::NOT_FOUND_MESSAGE;
use crate::repositories::{
    BusinessObjectRepository, EndpointPolicy, NewRelationship, RelationshipRepository,
};
use crate::server::AppState;

/// Edge from the object in the path to `target_id`
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateRelationshipRequest {
    pub target_id: Uuid,
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    pub description: Option<String>,
}

#[utoipa::path(
    get,
    path = "/objects/{object_id}/relationships",
    security(("bearer_auth" = [])),
    params(("object_id" = Uuid, Path, description = "Business object id")),
    responses(
        (status = 200, description = "Edges where the object is source or target", body = [RelationshipResponse]),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Business object not found", body = ApiError)
    ),
    tag = "relationships"
)]
pub async fn list_relationships(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<RelationshipResponse>>, ApiError> {
    let Path(object_id) = path?;

    let object = BusinessObjectRepository::new(&state.db)
        .get(object_id, &user.tenant_id)
        .await?
        .ok_or_else(|| not_found(NOT_FOUND_MESSAGE))?;

    let edges = RelationshipRepository::new(&state.db)
        .list_for_object(object.id, &user.tenant_id)
        .await?;

    Ok(Json(edges.into_iter().map(RelationshipResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/objects/{object_id}/relationships",
    security(("bearer_auth" = [])),
    params(("object_id" = Uuid, Path, description = "Source business object id")),
    request_body = CreateRelationshipRequest,
    responses(
        (status = 200, description = "Created relationship", body = RelationshipResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Business object not found", body = ApiError),
        (status = 422, description = "Invalid request body", body = ApiError)
    ),
    tag = "relationships"
)]
pub async fn create_relationship(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<CreateRelationshipRequest>, JsonRejection>,
) -> Result<Json<RelationshipResponse>, ApiError> {
    let Path(object_id) = path?;
    let Json(request) = body?;

    let source = BusinessObjectRepository::new(&state.db)
        .get(object_id, &user.tenant_id)
        .await?
        .ok_or_else(|| not_found(NOT_FOUND_MESSAGE))?;

    let policy = EndpointPolicy::from_flag(state.config.enforce_relationship_tenancy);
    let created = RelationshipRepository::new(&state.db)
        .create(
            NewRelationship {
                source_id: source.id,
                target_id: request.target_id,
                relationship_type: request.relationship_type,
                description: request.description,
            },
            &user.tenant_id,
            &user.id,
            policy,
        )
        .await?;

    Ok(Json(created.into()))
}
