//! # Relationship Repository
//!
//! Typed edges between business objects. Edges are created and listed, never
//! updated or removed. Whether both endpoints must be active objects of the
//! caller's tenant is decided per call through [`EndpointPolicy`].

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use crate::auth::TenantId;
use crate::error::RepositoryError;
use crate::models::business_object::{self, Entity as BusinessObject};
use crate::models::relationship::{
    ActiveModel, Column, Entity as Relationship, Model, RelationshipType,
};
use crate::repositories::business_object::NOT_FOUND_MESSAGE as OBJECT_NOT_FOUND_MESSAGE;

const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Debug, Clone)]
pub struct NewRelationship {
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub relationship_type: RelationshipType,
    pub description: Option<String>,
}

/// How strictly edge endpoints are checked on create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointPolicy {
    /// Persist as given; only foreign keys constrain the endpoints
    #[default]
    Unchecked,
    /// Both endpoints must be active objects of the edge's tenant
    SameTenant,
}

impl EndpointPolicy {
    pub fn from_flag(enforce: bool) -> Self {
        if enforce {
            Self::SameTenant
        } else {
            Self::Unchecked
        }
    }
}

pub struct RelationshipRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> RelationshipRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        fields: NewRelationship,
        tenant_id: &TenantId,
        created_by: &str,
        policy: EndpointPolicy,
    ) -> Result<Model, RepositoryError> {
        if let Some(description) = fields.description.as_deref()
            && description.chars().count() > MAX_DESCRIPTION_LEN
        {
            return Err(RepositoryError::Validation(format!(
                "description cannot exceed {} characters",
                MAX_DESCRIPTION_LEN
            )));
        }

        if policy == EndpointPolicy::SameTenant {
            self.ensure_endpoints_in_tenant(&fields, tenant_id).await?;
        }

        let relationship = ActiveModel {
            id: Set(Uuid::new_v4()),
            source_id: Set(fields.source_id),
            target_id: Set(fields.target_id),
            relationship_type: Set(fields.relationship_type),
            description: Set(fields.description),
            tenant_id: Set(tenant_id.as_str().to_string()),
            created_by: Set(Some(created_by.to_string())),
            created_at: Set(Utc::now().into()),
        };

        let model = relationship.insert(self.db).await.map_err(|err| {
            match err.sql_err() {
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    RepositoryError::NotFound(OBJECT_NOT_FOUND_MESSAGE.to_string())
                }
                _ => RepositoryError::database_error(err),
            }
        })?;

        tracing::info!(
            relationship_id = %model.id,
            source_id = %model.source_id,
            target_id = %model.target_id,
            tenant_id = %tenant_id,
            "Created relationship"
        );
        Ok(model)
    }

    /// Edges of the tenant where the object is either source or target, newest first.
    pub async fn list_for_object(
        &self,
        object_id: Uuid,
        tenant_id: &TenantId,
    ) -> Result<Vec<Model>, RepositoryError> {
        Relationship::find()
            .filter(Column::TenantId.eq(tenant_id.as_str()))
            .filter(
                Condition::any()
                    .add(Column::SourceId.eq(object_id))
                    .add(Column::TargetId.eq(object_id)),
            )
            .order_by_desc(Column::CreatedAt)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    async fn ensure_endpoints_in_tenant(
        &self,
        fields: &NewRelationship,
        tenant_id: &TenantId,
    ) -> Result<(), RepositoryError> {
        let mut endpoint_ids = vec![fields.source_id, fields.target_id];
        endpoint_ids.dedup();

        let found = BusinessObject::find()
            .filter(business_object::Column::Id.is_in(endpoint_ids.clone()))
            .filter(business_object::Column::TenantId.eq(tenant_id.as_str()))
            .filter(business_object::Column::IsActive.eq(true))
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if found != endpoint_ids.len() as u64 {
            return Err(RepositoryError::NotFound(
                OBJECT_NOT_FOUND_MESSAGE.to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::business_object::ObjectType;
    use crate::repositories::business_object::{BusinessObjectRepository, NewBusinessObject};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn object(db: &DatabaseConnection, tenant: &str, name: &str) -> Uuid {
        BusinessObjectRepository::new(db)
            .create(
                NewBusinessObject {
                    name: name.to_string(),
                    object_type: ObjectType::Integration,
                    description: None,
                    status: None,
                    complexity: None,
                    owner: None,
                    tags: None,
                },
                &TenantId::from(tenant),
                "u",
            )
            .await
            .unwrap()
            .id
    }

    fn edge(source_id: Uuid, target_id: Uuid) -> NewRelationship {
        NewRelationship {
            source_id,
            target_id,
            relationship_type: RelationshipType::DependsOn,
            description: None,
        }
    }

    #[tokio::test]
    async fn lists_edges_from_either_endpoint() {
        let db = setup_db().await;
        let repo = RelationshipRepository::new(&db);
        let tenant = TenantId::from("t1");
        let a = object(&db, "t1", "A").await;
        let b = object(&db, "t1", "B").await;
        let c = object(&db, "t1", "C").await;

        repo.create(edge(a, b), &tenant, "u", EndpointPolicy::Unchecked)
            .await
            .unwrap();
        repo.create(edge(c, a), &tenant, "u", EndpointPolicy::Unchecked)
            .await
            .unwrap();
        repo.create(edge(b, c), &tenant, "u", EndpointPolicy::Unchecked)
            .await
            .unwrap();

        assert_eq!(repo.list_for_object(a, &tenant).await.unwrap().len(), 2);
        assert!(repo
            .list_for_object(a, &TenantId::from("t2"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn self_edges_are_allowed() {
        let db = setup_db().await;
        let repo = RelationshipRepository::new(&db);
        let a = object(&db, "t1", "A").await;

        let created = repo
            .create(edge(a, a), &TenantId::from("t1"), "u", EndpointPolicy::SameTenant)
            .await
            .unwrap();
        assert_eq!(created.source_id, created.target_id);
    }

    #[tokio::test]
    async fn same_tenant_policy_rejects_foreign_endpoints() {
        let db = setup_db().await;
        let repo = RelationshipRepository::new(&db);
        let ours = object(&db, "t1", "Ours").await;
        let theirs = object(&db, "t2", "Theirs").await;

        let err = repo
            .create(
                edge(ours, theirs),
                &TenantId::from("t1"),
                "u",
                EndpointPolicy::SameTenant,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));

        // Unchecked keeps the permissive behaviour
        assert!(repo
            .create(
                edge(ours, theirs),
                &TenantId::from("t1"),
                "u",
                EndpointPolicy::Unchecked,
            )
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn dangling_target_is_reported_as_missing_object() {
        let db = setup_db().await;
        let repo = RelationshipRepository::new(&db);
        let a = object(&db, "t1", "A").await;

        let err = repo
            .create(
                edge(a, Uuid::new_v4()),
                &TenantId::from("t1"),
                "u",
                EndpointPolicy::Unchecked,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[test]
    fn policy_from_flag() {
        assert_eq!(EndpointPolicy::from_flag(true), EndpointPolicy::SameTenant);
        assert_eq!(EndpointPolicy::from_flag(false), EndpointPolicy::Unchecked);
    }
}
