//! Database migrations for the object catalog.
//!
//! Migrations are applied in declaration order by [`Migrator`].

pub use sea_orm_migration::prelude::*;

mod m2024_08_16_000001_create_systems;
mod m2024_08_16_000002_create_business_objects;
mod m2024_08_16_000003_create_analyses;
mod m2024_08_16_000004_create_relationships;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_08_16_000001_create_systems::Migration),
            Box::new(m2024_08_16_000002_create_business_objects::Migration),
            Box::new(m2024_08_16_000003_create_analyses::Migration),
            Box::new(m2024_08_16_000004_create_relationships::Migration),
        ]
    }
}
