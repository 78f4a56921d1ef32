//! # Relationship Model
//!
//! Typed directed edge between two business objects.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "relationships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub source_id: Uuid,

    pub target_id: Uuid,

    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,

    pub description: Option<String>,

    pub tenant_id: String,

    pub created_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,
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
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum RelationshipType {
    #[sea_orm(string_value = "depends_on")]
    #[serde(rename = "depends_on")]
    DependsOn,

    #[sea_orm(string_value = "triggers")]
    #[serde(rename = "triggers")]
    Triggers,

    #[sea_orm(string_value = "contains")]
    #[serde(rename = "contains")]
    Contains,

    #[sea_orm(string_value = "uses")]
    #[serde(rename = "uses")]
    Uses,

    #[sea_orm(string_value = "produces")]
    #[serde(rename = "produces")]
    Produces,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::business_object::Entity",
        from = "Column::SourceId",
        to = "super::business_object::Column::Id",
        on_delete = "Cascade"
    )]
    Source,

    #[sea_orm(
        belongs_to = "super::business_object::Entity",
        from = "Column::TargetId",
        to = "super::business_object::Column::Id",
        on_delete = "Cascade"
    )]
    Target,
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RelationshipResponse {
    pub id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    pub description: Option<String>,
    pub tenant_id: String,
    pub created_by: Option<String>,
    #[schema(value_type = String, example = "2024-08-16T16:57:44Z")]
    pub created_at: DateTimeWithTimeZone,
}

impl From<Model> for RelationshipResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            source_id: model.source_id,
            target_id: model.target_id,
            relationship_type: model.relationship_type,
            description: model.description,
            tenant_id: model.tenant_id,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}
