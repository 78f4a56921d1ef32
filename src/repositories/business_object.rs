//! # Business Object Repository
//!
//! Tenant-scoped persistence for business objects. Reads only ever see active
//! rows of the given tenant. Soft deletion re-fetches by id alone; callers are
//! expected to have resolved the row through [`BusinessObjectRepository::get`]
//! first.

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbBackend,
    DbErr, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::auth::TenantId;
use crate::error::RepositoryError;
use crate::models::business_object::{
    ActiveModel, Column, ComplexityLevel, Entity as BusinessObject, Model, ObjectStatus,
    ObjectType,
};
use crate::pagination::PageRequest;

pub const NOT_FOUND_MESSAGE: &str = "Business object not found";

const MAX_NAME_LEN: usize = 255;
const MAX_OWNER_LEN: usize = 255;

/// Fields supplied when creating a business object
#[derive(Debug, Clone)]
pub struct NewBusinessObject {
    pub name: String,
    pub object_type: ObjectType,
    pub description: Option<String>,
    pub status: Option<ObjectStatus>,
    pub complexity: Option<ComplexityLevel>,
    pub owner: Option<String>,
    pub tags: Option<String>,
}

/// Partial update. `None` leaves a field untouched; for nullable fields
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct BusinessObjectPatch {
    pub name: Option<String>,
    pub object_type: Option<ObjectType>,
    pub description: Option<Option<String>>,
    pub status: Option<ObjectStatus>,
    pub complexity: Option<ComplexityLevel>,
    pub owner: Option<Option<String>>,
    pub tags: Option<Option<String>>,
}

/// Filters for [`BusinessObjectRepository::list`]
#[derive(Debug, Clone, Default)]
pub struct ObjectListQuery {
    /// Case-insensitive substring matched against name or description
    pub search: Option<String>,
    pub object_type: Option<ObjectType>,
    pub status: Option<ObjectStatus>,
    pub page: PageRequest,
}

pub struct BusinessObjectRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> BusinessObjectRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the object only if it belongs to `tenant_id` and is active.
    pub async fn get(&self, id: Uuid, tenant_id: &TenantId) -> Result<Option<Model>, RepositoryError> {
        BusinessObject::find_by_id(id)
            .filter(Column::TenantId.eq(tenant_id.as_str()))
            .filter(Column::IsActive.eq(true))
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Returns one page of matching objects, newest first, with the total match count.
    pub async fn list(
        &self,
        tenant_id: &TenantId,
        query: &ObjectListQuery,
    ) -> Result<(Vec<Model>, u64), RepositoryError> {
        let mut condition = Condition::all()
            .add(Column::TenantId.eq(tenant_id.as_str()))
            .add(Column::IsActive.eq(true));

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", fold_case(self.db.get_database_backend(), search));
            condition = condition.add(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((BusinessObject, Column::Name))))
                            .like(pattern.as_str()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            BusinessObject,
                            Column::Description,
                        ))))
                        .like(pattern.as_str()),
                    ),
            );
        }

        if let Some(object_type) = query.object_type {
            condition = condition.add(Column::ObjectType.eq(object_type));
        }

        if let Some(status) = query.status {
            condition = condition.add(Column::Status.eq(status));
        }

        let select = BusinessObject::find().filter(condition);

        let total = select
            .clone()
            .count(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        let items = select
            .order_by_desc(Column::CreatedAt)
            .offset(query.page.skip())
            .limit(query.page.limit())
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        Ok((items, total))
    }

    pub async fn create(
        &self,
        fields: NewBusinessObject,
        tenant_id: &TenantId,
        created_by: &str,
    ) -> Result<Model, RepositoryError> {
        validate_name(&fields.name)?;
        validate_owner(fields.owner.as_deref())?;

        let now = Utc::now();
        let object = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(fields.name),
            object_type: Set(fields.object_type),
            description: Set(fields.description),
            status: Set(fields.status.unwrap_or_default()),
            complexity: Set(fields.complexity.unwrap_or_default()),
            owner: Set(fields.owner),
            tags: Set(fields.tags),
            tenant_id: Set(tenant_id.as_str().to_string()),
            created_by: Set(Some(created_by.to_string())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            is_active: Set(true),
        };

        let model = object
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        tracing::info!(object_id = %model.id, tenant_id = %tenant_id, "Created business object");
        Ok(model)
    }

    /// Applies only the fields present in `patch` and refreshes `updated_at`.
    pub async fn update(
        &self,
        existing: Model,
        patch: BusinessObjectPatch,
    ) -> Result<Model, RepositoryError> {
        let mut active = existing.into_active_model();

        if let Some(name) = patch.name {
            validate_name(&name)?;
            active.name = Set(name);
        }
        if let Some(object_type) = patch.object_type {
            active.object_type = Set(object_type);
        }
        if let Some(description) = patch.description {
            active.description = Set(description);
        }
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        if let Some(complexity) = patch.complexity {
            active.complexity = Set(complexity);
        }
        if let Some(owner) = patch.owner {
            validate_owner(owner.as_deref())?;
            active.owner = Set(owner);
        }
        if let Some(tags) = patch.tags {
            active.tags = Set(tags);
        }
        active.updated_at = Set(Utc::now().into());

        active.update(self.db).await.map_err(|err| match err {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => {
                RepositoryError::NotFound(NOT_FOUND_MESSAGE.to_string())
            }
            other => RepositoryError::database_error(other),
        })
    }

    /// Marks the object inactive. Repeating the call on an already inactive row succeeds.
    pub async fn soft_delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = BusinessObject::update_many()
            .col_expr(Column::IsActive, Expr::value(false))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now().fixed_offset()))
            .filter(Column::Id.eq(id))
            .exec(self.db)
            .await
            .map_err(RepositoryError::database_error)?;

        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound(NOT_FOUND_MESSAGE.to_string()));
        }

        tracing::info!(object_id = %id, "Soft-deleted business object");
        Ok(())
    }
}

/// Lowercases a search term the same way the backend's `LOWER()` folds the
/// column. SQLite only folds ASCII letters.
fn fold_case(backend: DbBackend, term: &str) -> String {
    match backend {
        DbBackend::Sqlite => term.to_ascii_lowercase(),
        _ => term.to_lowercase(),
    }
}

fn validate_name(name: &str) -> Result<(), RepositoryError> {
    if name.trim().is_empty() {
        return Err(RepositoryError::Validation(
            "name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(RepositoryError::Validation(format!(
            "name cannot exceed {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(())
}

fn validate_owner(owner: Option<&str>) -> Result<(), RepositoryError> {
    match owner {
        Some(owner) if owner.chars().count() > MAX_OWNER_LEN => Err(RepositoryError::Validation(
            format!("owner cannot exceed {} characters", MAX_OWNER_LEN),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    fn new_object(name: &str, description: Option<&str>) -> NewBusinessObject {
        NewBusinessObject {
            name: name.to_string(),
            object_type: ObjectType::Workflow,
            description: description.map(str::to_string),
            status: None,
            complexity: None,
            owner: None,
            tags: None,
        }
    }

    #[tokio::test]
    async fn create_stamps_tenant_and_defaults() {
        let db = setup_db().await;
        let repo = BusinessObjectRepository::new(&db);
        let tenant = TenantId::from("t1");

        let created = repo
            .create(new_object("Invoice Workflow", None), &tenant, "user-1")
            .await
            .unwrap();

        assert_eq!(created.tenant_id, "t1");
        assert_eq!(created.created_by.as_deref(), Some("user-1"));
        assert_eq!(created.status, ObjectStatus::Pending);
        assert_eq!(created.complexity, ComplexityLevel::Low);
        assert!(created.is_active);
        assert_eq!(created.created_at, created.updated_at);
    }

    #[tokio::test]
    async fn get_is_tenant_scoped() {
        let db = setup_db().await;
        let repo = BusinessObjectRepository::new(&db);
        let created = repo
            .create(new_object("Scoped", None), &TenantId::from("t1"), "u")
            .await
            .unwrap();

        assert!(repo.get(created.id, &TenantId::from("t1")).await.unwrap().is_some());
        assert!(repo.get(created.id, &TenantId::from("t2")).await.unwrap().is_none());
        assert!(repo.get(Uuid::new_v4(), &TenantId::from("t1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_matches_name_or_description_case_insensitively() {
        let db = setup_db().await;
        let repo = BusinessObjectRepository::new(&db);
        let tenant = TenantId::from("t1");

        repo.create(new_object("Invoice Workflow", None), &tenant, "u")
            .await
            .unwrap();
        repo.create(new_object("X", Some("INVOICE processor")), &tenant, "u")
            .await
            .unwrap();
        repo.create(new_object("Payroll", Some("monthly run")), &tenant, "u")
            .await
            .unwrap();

        let query = ObjectListQuery {
            search: Some("invoice".to_string()),
            ..Default::default()
        };
        let (items, total) = repo.list(&tenant, &query).await.unwrap();

        assert_eq!(total, 2);
        let mut names: Vec<_> = items.into_iter().map(|o| o.name).collect();
        names.sort();
        assert_eq!(names, vec!["Invoice Workflow".to_string(), "X".to_string()]);
    }

    #[tokio::test]
    async fn search_matches_non_ascii_terms_on_sqlite() {
        let db = setup_db().await;
        let repo = BusinessObjectRepository::new(&db);
        let tenant = TenantId::from("t1");

        repo.create(new_object("École Pipeline", None), &tenant, "u")
            .await
            .unwrap();

        for term in ["École", "école pipe", "PIPELINE"] {
            let query = ObjectListQuery {
                search: Some(term.to_string()),
                ..Default::default()
            };
            let (_, total) = repo.list(&tenant, &query).await.unwrap();
            assert_eq!(total, 1, "{term}");
        }
    }

    #[tokio::test]
    async fn names_and_search_terms_are_taken_verbatim() {
        let db = setup_db().await;
        let repo = BusinessObjectRepository::new(&db);
        let tenant = TenantId::from("t1");

        let padded = repo
            .create(new_object("  Padded  ", None), &tenant, "u")
            .await
            .unwrap();
        assert_eq!(padded.name, "  Padded  ");
        repo.create(new_object("Compact", None), &tenant, "u")
            .await
            .unwrap();

        let query = ObjectListQuery {
            search: Some("  ".to_string()),
            ..Default::default()
        };
        let (items, total) = repo.list(&tenant, &query).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(items[0].id, padded.id);

        let query = ObjectListQuery {
            search: Some(String::new()),
            ..Default::default()
        };
        let (_, total) = repo.list(&tenant, &query).await.unwrap();
        assert_eq!(total, 2);
    }

    #[test]
    fn case_folding_follows_backend() {
        assert_eq!(fold_case(DbBackend::Sqlite, "École"), "École");
        assert_eq!(fold_case(DbBackend::Postgres, "École"), "école");
        assert_eq!(fold_case(DbBackend::Sqlite, "INVOICE"), "invoice");
    }

    #[tokio::test]
    async fn list_filters_and_pages() {
        let db = setup_db().await;
        let repo = BusinessObjectRepository::new(&db);
        let tenant = TenantId::from("t1");

        for i in 0..7 {
            let mut fields = new_object(&format!("Report {i}"), None);
            fields.object_type = ObjectType::Report;
            fields.status = Some(if i % 2 == 0 {
                ObjectStatus::Active
            } else {
                ObjectStatus::Inactive
            });
            repo.create(fields, &tenant, "u").await.unwrap();
        }
        repo.create(new_object("Lone workflow", None), &tenant, "u")
            .await
            .unwrap();

        let query = ObjectListQuery {
            object_type: Some(ObjectType::Report),
            page: PageRequest::clamped(0, 3),
            ..Default::default()
        };
        let (items, total) = repo.list(&tenant, &query).await.unwrap();
        assert_eq!(total, 7);
        assert_eq!(items.len(), 3);

        let query = ObjectListQuery {
            object_type: Some(ObjectType::Report),
            status: Some(ObjectStatus::Active),
            page: PageRequest::clamped(3, 3),
            ..Default::default()
        };
        let (items, total) = repo.list(&tenant, &query).await.unwrap();
        assert_eq!(total, 4);
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn partial_update_only_touches_patched_fields() {
        let db = setup_db().await;
        let repo = BusinessObjectRepository::new(&db);
        let mut fields = new_object("Original", Some("keep me"));
        fields.complexity = Some(ComplexityLevel::High);
        fields.tags = Some("a,b".to_string());
        let created = repo
            .create(fields, &TenantId::from("t1"), "u")
            .await
            .unwrap();

        let updated = repo
            .update(
                created.clone(),
                BusinessObjectPatch {
                    owner: Some(Some("x".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.owner.as_deref(), Some("x"));
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.complexity, ComplexityLevel::High);
        assert_eq!(updated.tags, created.tags);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn patch_can_clear_nullable_fields() {
        let db = setup_db().await;
        let repo = BusinessObjectRepository::new(&db);
        let created = repo
            .create(new_object("Clearable", Some("desc")), &TenantId::from("t1"), "u")
            .await
            .unwrap();

        let updated = repo
            .update(
                created,
                BusinessObjectPatch {
                    description: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.description.is_none());
    }

    #[tokio::test]
    async fn soft_delete_is_idempotent_and_hides_row() {
        let db = setup_db().await;
        let repo = BusinessObjectRepository::new(&db);
        let tenant = TenantId::from("t1");
        let created = repo
            .create(new_object("Doomed", None), &tenant, "u")
            .await
            .unwrap();

        repo.soft_delete(created.id).await.unwrap();
        repo.soft_delete(created.id).await.unwrap();

        assert!(repo.get(created.id, &tenant).await.unwrap().is_none());
        let stored = BusinessObject::find_by_id(created.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn mutations_on_missing_rows_fail_with_not_found() {
        let db = setup_db().await;
        let repo = BusinessObjectRepository::new(&db);

        let err = repo.soft_delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));

        let created = repo
            .create(new_object("Ghost", None), &TenantId::from("t1"), "u")
            .await
            .unwrap();
        let mut phantom = created.clone();
        phantom.id = Uuid::new_v4();
        let err = repo
            .update(
                phantom,
                BusinessObjectPatch {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let db = setup_db().await;
        let repo = BusinessObjectRepository::new(&db);
        let err = repo
            .create(new_object("   ", None), &TenantId::from("t1"), "u")
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(_)));
    }
}
