//! # Business Object Handlers
//!
//! CRUD over business objects for the authenticated tenant. Every lookup goes
//! through the tenant-scoped repository, so objects of other tenants are
//! indistinguishable from missing ones.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::{ApiError, not_found, validation_error};
use crate::handlers::types::{MessageResponse, deserialize_some};
use crate::models::{BusinessObjectResponse, ComplexityLevel, ObjectStatus, ObjectType};
use crate::pagination::{DEFAULT_LIMIT, MAX_LIMIT, Page, PageRequest};
use crate::repositories::business_object::NOT_FOUND_MESSAGE;
use crate::repositories::{
    BusinessObjectPatch, BusinessObjectRepository, NewBusinessObject, ObjectListQuery,
};
use crate::server::AppState;

/// Query parameters for listing business objects
#[derive(Debug, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListObjectsQuery {
    /// Rows to skip (default 0)
    #[serde(default)]
    #[param(minimum = 0)]
    pub skip: i64,
    /// Page size, 1 to 100 (default 100)
    #[serde(default = "default_limit")]
    #[param(minimum = 1, maximum = 100)]
    pub limit: i64,
    /// Case-insensitive substring of name or description
    pub search: Option<String>,
    pub type_filter: Option<ObjectType>,
    pub status_filter: Option<ObjectStatus>,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT as i64
}

impl ListObjectsQuery {
    fn into_list_query(self) -> Result<ObjectListQuery, ApiError> {
        if self.skip < 0 {
            return Err(validation_error("skip must be greater than or equal to 0"));
        }
        if !(1..=MAX_LIMIT as i64).contains(&self.limit) {
            return Err(validation_error("limit must be between 1 and 100"));
        }

        Ok(ObjectListQuery {
            search: self.search,
            object_type: self.type_filter,
            status: self.status_filter,
            page: PageRequest::clamped(self.skip, self.limit),
        })
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateBusinessObjectRequest {
    #[schema(example = "Invoice Workflow")]
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub description: Option<String>,
    pub status: Option<ObjectStatus>,
    pub complexity: Option<ComplexityLevel>,
    pub owner: Option<String>,
    pub tags: Option<String>,
}

impl From<CreateBusinessObjectRequest> for NewBusinessObject {
    fn from(request: CreateBusinessObjectRequest) -> Self {
        Self {
            name: request.name,
            object_type: request.object_type,
            description: request.description,
            status: request.status,
            complexity: request.complexity,
            owner: request.owner,
            tags: request.tags,
        }
    }
}

/// Partial update; omitted fields are left unchanged, `null` clears nullable fields
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateBusinessObjectRequest {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub object_type: Option<ObjectType>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub status: Option<ObjectStatus>,
    pub complexity: Option<ComplexityLevel>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub owner: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub tags: Option<Option<String>>,
}

impl From<UpdateBusinessObjectRequest> for BusinessObjectPatch {
    fn from(request: UpdateBusinessObjectRequest) -> Self {
        Self {
            name: request.name,
            object_type: request.object_type,
            description: request.description,
            status: request.status,
            complexity: request.complexity,
            owner: request.owner,
            tags: request.tags,
        }
    }
}

/// Lists active business objects of the caller's tenant, newest first
#[utoipa::path(
    get,
    path = "/objects/",
    security(("bearer_auth" = [])),
    params(ListObjectsQuery),
    responses(
        (status = 200, description = "One page of business objects", body = Page<BusinessObjectResponse>),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 422, description = "Invalid query parameters", body = ApiError)
    ),
    tag = "objects"
)]
pub async fn list_objects(
    State(state): State<AppState>,
    user: CurrentUser,
    query: Result<Query<ListObjectsQuery>, QueryRejection>,
) -> Result<Json<Page<BusinessObjectResponse>>, ApiError> {
    let Query(query) = query?;
    let list_query = query.into_list_query()?;

    let (items, total) = BusinessObjectRepository::new(&state.db)
        .list(&user.tenant_id, &list_query)
        .await?;

    let page = Page::new(items, total, list_query.page).map(BusinessObjectResponse::from);
    Ok(Json(page))
}

/// Creates a business object owned by the caller's tenant
#[utoipa::path(
    post,
    path = "/objects/",
    security(("bearer_auth" = [])),
    request_body = CreateBusinessObjectRequest,
    responses(
        (status = 200, description = "Created business object", body = BusinessObjectResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 422, description = "Invalid request body", body = ApiError)
    ),
    tag = "objects"
)]
pub async fn create_object(
    State(state): State<AppState>,
    user: CurrentUser,
    body: Result<Json<CreateBusinessObjectRequest>, JsonRejection>,
) -> Result<Json<BusinessObjectResponse>, ApiError> {
    let Json(request) = body?;

    let created = BusinessObjectRepository::new(&state.db)
        .create(request.into(), &user.tenant_id, &user.id)
        .await?;

    Ok(Json(created.into()))
}

#[utoipa::path(
    get,
    path = "/objects/{object_id}",
    security(("bearer_auth" = [])),
    params(("object_id" = Uuid, Path, description = "Business object id")),
    responses(
        (status = 200, description = "Business object", body = BusinessObjectResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Business object not found", body = ApiError)
    ),
    tag = "objects"
)]
pub async fn get_object(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<BusinessObjectResponse>, ApiError> {
    let Path(object_id) = path?;

    let object = BusinessObjectRepository::new(&state.db)
        .get(object_id, &user.tenant_id)
        .await?
        .ok_or_else(|| not_found(NOT_FOUND_MESSAGE))?;

    Ok(Json(object.into()))
}

/// Applies a partial update to a business object
#[utoipa::path(
    put,
    path = "/objects/{object_id}",
    security(("bearer_auth" = [])),
    params(("object_id" = Uuid, Path, description = "Business object id")),
    request_body = UpdateBusinessObjectRequest,
    responses(
        (status = 200, description = "Updated business object", body = BusinessObjectResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Business object not found", body = ApiError),
        (status = 422, description = "Invalid request body", body = ApiError)
    ),
    tag = "objects"
)]
pub async fn update_object(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<UpdateBusinessObjectRequest>, JsonRejection>,
) -> Result<Json<BusinessObjectResponse>, ApiError> {
    let Path(object_id) = path?;
    let Json(request) = body?;

    let repo = BusinessObjectRepository::new(&state.db);
    let existing = repo
        .get(object_id, &user.tenant_id)
        .await?
        .ok_or_else(|| not_found(NOT_FOUND_MESSAGE))?;

    let updated = repo.update(existing, request.into()).await?;
    Ok(Json(updated.into()))
}

/// Soft-deletes a business object
#[utoipa::path(
    delete,
    path = "/objects/{object_id}",
    security(("bearer_auth" = [])),
    params(("object_id" = Uuid, Path, description = "Business object id")),
    responses(
        (status = 200, description = "Business object deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Business object not found", body = ApiError)
    ),
    tag = "objects"
)]
pub async fn delete_object(
    State(state): State<AppState>,
    user: CurrentUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(object_id) = path?;

    let repo = BusinessObjectRepository::new(&state.db);
    let existing = repo
        .get(object_id, &user.tenant_id)
        .await?
        .ok_or_else(|| not_found(NOT_FOUND_MESSAGE))?;

    repo.soft_delete(existing.id).await?;
    Ok(Json(MessageResponse::new("Business object deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(skip: i64, limit: i64) -> ListObjectsQuery {
        ListObjectsQuery {
            skip,
            limit,
            search: None,
            type_filter: None,
            status_filter: None,
        }
    }

    #[test]
    fn rejects_out_of_range_paging() {
        assert!(query(-1, 10).into_list_query().is_err());
        assert!(query(0, 0).into_list_query().is_err());
        assert!(query(0, 101).into_list_query().is_err());

        let list_query = query(50, 25).into_list_query().unwrap();
        assert_eq!(list_query.page.skip(), 50);
        assert_eq!(list_query.page.limit(), 25);
    }

    #[test]
    fn update_request_keeps_explicit_nulls() {
        let request: UpdateBusinessObjectRequest =
            serde_json::from_str(r#"{"owner": null, "status": "active"}"#).unwrap();
        let patch = BusinessObjectPatch::from(request);

        assert_eq!(patch.owner, Some(None));
        assert_eq!(patch.status, Some(ObjectStatus::Active));
        assert!(patch.description.is_none());
        assert!(patch.name.is_none());
    }

    #[test]
    fn unknown_type_is_rejected_at_deserialization() {
        let result = serde_json::from_str::<CreateBusinessObjectRequest>(
            r#"{"name": "x", "type": "spreadsheet"}"#,
        );
        assert!(result.is_err());
    }
}
