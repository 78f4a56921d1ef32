//! # Business Object Model
//!
//! The primary tracked entity. Every row belongs to exactly one tenant and is
//! soft-deleted by clearing `is_active`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "business_objects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub object_type: ObjectType,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub status: ObjectStatus,

    pub complexity: ComplexityLevel,

    pub owner: Option<String>,

    /// Opaque comma-separated labels; never parsed server-side
    #[sea_orm(column_type = "Text", nullable)]
    pub tags: Option<String>,

    pub tenant_id: String,

    pub created_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    pub is_active: bool,
}

/// Kind of business object being tracked
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ObjectType {
    #[sea_orm(string_value = "workflow")]
    #[serde(rename = "workflow")]
    Workflow,

    #[sea_orm(string_value = "data_object")]
    #[serde(rename = "data_object")]
    DataObject,

    #[sea_orm(string_value = "process")]
    #[serde(rename = "process")]
    Process,

    #[sea_orm(string_value = "integration")]
    #[serde(rename = "integration")]
    Integration,

    #[sea_orm(string_value = "report")]
    #[serde(rename = "report")]
    Report,
}

/// Lifecycle status of a business object
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ObjectStatus {
    #[sea_orm(string_value = "active")]
    #[serde(rename = "active")]
    Active,

    #[sea_orm(string_value = "inactive")]
    #[serde(rename = "inactive")]
    Inactive,

    #[sea_orm(string_value = "pending")]
    #[serde(rename = "pending")]
    #[default]
    Pending,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ComplexityLevel {
    #[sea_orm(string_value = "low")]
    #[serde(rename = "low")]
    #[default]
    Low,

    #[sea_orm(string_value = "medium")]
    #[serde(rename = "medium")]
    Medium,

    #[sea_orm(string_value = "high")]
    #[serde(rename = "high")]
    High,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::analysis::Entity")]
    Analysis,
}

impl Related<super::analysis::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Analysis.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Public representation of a business object for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BusinessObjectResponse {
    pub id: Uuid,
    #[schema(example = "Invoice Workflow")]
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub description: Option<String>,
    pub status: ObjectStatus,
    pub complexity: ComplexityLevel,
    pub owner: Option<String>,
    #[schema(example = "finance,monthly")]
    pub tags: Option<String>,
    #[schema(example = "t1")]
    pub tenant_id: String,
    pub created_by: Option<String>,
    #[schema(value_type = String, example = "2024-08-16T16:57:44Z")]
    pub created_at: DateTimeWithTimeZone,
    #[schema(value_type = String, example = "2024-08-16T16:57:44Z")]
    pub updated_at: DateTimeWithTimeZone,
    pub is_active: bool,
}

impl From<Model> for BusinessObjectResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            object_type: model.object_type,
            description: model.description,
            status: model.status,
            complexity: model.complexity,
            owner: model.owner,
            tags: model.tags,
            tenant_id: model.tenant_id,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
            is_active: model.is_active,
        }
    }
}
