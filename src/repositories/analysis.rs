//! # Analysis Repository
//!
//! Append-mostly storage for analyses. The owning business object is checked
//! by the caller before anything is written here.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set, TryIntoModel,
};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::TenantId;
use crate::error::RepositoryError;
use crate::models::analysis::{ActiveModel, Column, Entity as Analysis, Model};

pub const NOT_FOUND_MESSAGE: &str = "Analysis not found";

const MAX_ANALYSIS_TYPE_LEN: usize = 100;

#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub analysis_type: String,
    pub summary: Option<String>,
    pub insights: Vec<Value>,
    pub recommendations: Vec<Value>,
    pub confidence_score: Option<f64>,
    pub metrics: Value,
}

/// Partial update with the same semantics as the business object patch.
#[derive(Debug, Clone, Default)]
pub struct AnalysisPatch {
    pub analysis_type: Option<String>,
    pub summary: Option<Option<String>>,
    pub insights: Option<Vec<Value>>,
    pub recommendations: Option<Vec<Value>>,
    pub confidence_score: Option<Option<f64>>,
    pub metrics: Option<Value>,
}

pub struct AnalysisRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AnalysisRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// All analyses of one object within the tenant, newest first.
    pub async fn list_by_object(
        &self,
        object_id: Uuid,
        tenant_id: &TenantId,
    ) -> Result<Vec<Model>, RepositoryError> {
        Analysis::find()
            .filter(Column::BusinessObjectId.eq(object_id))
            .filter(Column::TenantId.eq(tenant_id.as_str()))
            .order_by_desc(Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn get(&self, id: Uuid, tenant_id: &TenantId) -> Result<Option<Model>, RepositoryError> {
        Analysis::find_by_id(id)
            .filter(Column::TenantId.eq(tenant_id.as_str()))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    pub async fn create(
        &self,
        fields: NewAnalysis,
        object_id: Uuid,
        tenant_id: &TenantId,
        created_by: &str,
    ) -> Result<Model, RepositoryError> {
        validate_analysis_type(&fields.analysis_type)?;

        let analysis = ActiveModel {
            id: Set(Uuid::new_v4()),
            business_object_id: Set(object_id),
            analysis_type: Set(fields.analysis_type),
            summary: Set(fields.summary),
            insights: Set(Some(Value::Array(fields.insights))),
            recommendations: Set(Some(Value::Array(fields.recommendations))),
            confidence_score: Set(fields.confidence_score),
            metrics: Set(Some(fields.metrics)),
            tenant_id: Set(tenant_id.as_str().to_string()),
            created_by: Set(Some(created_by.to_string())),
            created_at: Set(Utc::now().into()),
        };

        let model = analysis
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(
            analysis_id = %model.id,
            object_id = %object_id,
            tenant_id = %tenant_id,
            "Recorded analysis"
        );
        Ok(model)
    }

    pub async fn update(&self, existing: Model, patch: AnalysisPatch) -> Result<Model, RepositoryError> {
        let mut active = existing.into_active_model();

        if let Some(analysis_type) = patch.analysis_type {
            validate_analysis_type(&analysis_type)?;
            active.analysis_type = Set(analysis_type);
        }
        if let Some(summary) = patch.summary {
            active.summary = Set(summary);
        }
        if let Some(insights) = patch.insights {
            active.insights = Set(Some(Value::Array(insights)));
        }
        if let Some(recommendations) = patch.recommendations {
            active.recommendations = Set(Some(Value::Array(recommendations)));
        }
        if let Some(confidence_score) = patch.confidence_score {
            active.confidence_score = Set(confidence_score);
        }
        if let Some(metrics) = patch.metrics {
            active.metrics = Set(Some(metrics));
        }

        if !active.is_changed() {
            return active
                .try_into_model()
                .map_err(RepositoryError::database_error);
        }

        active.update(self.db).await.map_err(|err| match err {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => {
                RepositoryError::NotFound(NOT_FOUND_MESSAGE.to_string())
            }
            other => RepositoryError::database_error(other),
        })
    }
}

fn validate_analysis_type(analysis_type: &str) -> Result<(), RepositoryError> {
    if analysis_type.trim().is_empty() {
        return Err(RepositoryError::Validation(
            "analysis_type must not be empty".to_string(),
        ));
    }
    if analysis_type.chars().count() > MAX_ANALYSIS_TYPE_LEN {
        return Err(RepositoryError::Validation(format!(
            "analysis_type cannot exceed {} characters",
            MAX_ANALYSIS_TYPE_LEN
        )));
    }
    Ok(())
}
