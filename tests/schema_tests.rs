//! Schema-level tests: migrations, reserved tables and foreign keys.

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use object_catalog::models::{System, system};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set, Statement};
use serde_json::json;
use uuid::Uuid;

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::setup_test_db;

#[tokio::test]
async fn systems_table_round_trips_a_row() {
    let db = setup_test_db().await.unwrap();
    let now = Utc::now().fixed_offset();
    let id = Uuid::new_v4();

    system::ActiveModel {
        id: Set(id),
        name: Set("SAP ERP".to_string()),
        description: Set(None),
        version: Set(Some("S/4HANA 2023".to_string())),
        endpoint_url: Set(Some("https://erp.example/api".to_string())),
        configuration: Set(Some(json!({"region": "eu-west"}))),
        tenant_id: Set("t1".to_string()),
        created_by: Set(Some("u1".to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        is_active: Set(true),
    }
    .insert(&db)
    .await
    .unwrap();

    let stored = System::find_by_id(id).one(&db).await.unwrap().unwrap();
    assert_eq!(stored.name, "SAP ERP");
    assert_eq!(stored.configuration, Some(json!({"region": "eu-west"})));
    assert!(stored.is_active);
}

#[tokio::test]
async fn relationships_require_existing_objects() {
    let db = setup_test_db().await.unwrap();

    let result = db
        .execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO relationships (id, source_id, target_id, \"type\", tenant_id) \
             VALUES (?, ?, ?, 'uses', 't1')",
            [
                Uuid::new_v4().into(),
                Uuid::new_v4().into(),
                Uuid::new_v4().into(),
            ],
        ))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn migrations_can_be_rolled_back_and_reapplied() {
    let db = setup_test_db().await.unwrap();

    Migrator::down(&db, None).await.unwrap();
    assert!(Migrator::get_applied_migrations(&db).await.unwrap().is_empty());

    Migrator::up(&db, None).await.unwrap();
    assert_eq!(Migrator::get_applied_migrations(&db).await.unwrap().len(), 4);
}
