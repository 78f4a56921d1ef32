//! # Data Models
//!
//! SeaORM entities for the object catalog plus their API response shapes.

pub mod analysis;
pub mod business_object;
pub mod relationship;
pub mod system;

pub use analysis::{AnalysisResponse, Entity as Analysis};
pub use business_object::{
    BusinessObjectResponse, ComplexityLevel, Entity as BusinessObject, ObjectStatus, ObjectType,
};
pub use relationship::{Entity as Relationship, RelationshipResponse, RelationshipType};
pub use system::Entity as System;
