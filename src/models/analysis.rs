//! # Analysis Model
//!
//! Findings recorded against a single business object. Insights and
//! recommendations are ordered JSON arrays; metrics is a free-form JSON map.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "analyses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub business_object_id: Uuid,

    pub analysis_type: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub insights: Option<Json>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub recommendations: Option<Json>,

    /// Conventionally within 0.0..=1.0; not enforced
    #[sea_orm(column_type = "Double", nullable)]
    pub confidence_score: Option<f64>,

    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub metrics: Option<Json>,

    pub tenant_id: String,

    pub created_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::business_object::Entity",
        from = "Column::BusinessObjectId",
        to = "super::business_object::Column::Id",
        on_delete = "Cascade"
    )]
    BusinessObject,
}

impl Related<super::business_object::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BusinessObject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Public representation of an analysis for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    pub id: Uuid,
    pub business_object_id: Uuid,
    #[schema(example = "performance")]
    pub analysis_type: String,
    pub summary: Option<String>,
    #[schema(value_type = Vec<Object>)]
    pub insights: Vec<serde_json::Value>,
    #[schema(value_type = Vec<Object>)]
    pub recommendations: Vec<serde_json::Value>,
    #[schema(example = 0.87)]
    pub confidence_score: Option<f64>,
    #[schema(value_type = Object)]
    pub metrics: serde_json::Value,
    pub tenant_id: String,
    pub created_by: Option<String>,
    #[schema(value_type = String, example = "2024-08-16T16:57:44Z")]
    pub created_at: DateTimeWithTimeZone,
}

impl From<Model> for AnalysisResponse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            business_object_id: model.business_object_id,
            analysis_type: model.analysis_type,
            summary: model.summary,
            insights: json_array(model.insights),
            recommendations: json_array(model.recommendations),
            confidence_score: model.confidence_score,
            metrics: model
                .metrics
                .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
            tenant_id: model.tenant_id,
            created_by: model.created_by,
            created_at: model.created_at,
        }
    }
}

fn json_array(value: Option<Json>) -> Vec<serde_json::Value> {
    match value {
        Some(serde_json::Value::Array(items)) => items,
        Some(serde_json::Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    }
}
