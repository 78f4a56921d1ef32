//! # Repository Layer
//!
//! Repositories wrap the SeaORM queries for each entity. Every read takes the
//! caller's [`TenantId`](crate::auth::TenantId) so that no query can cross a
//! tenant boundary.

pub mod analysis;
pub mod business_object;
pub mod relationship;

pub use analysis::{AnalysisPatch, AnalysisRepository, NewAnalysis};
pub use business_object::{
    BusinessObjectPatch, BusinessObjectRepository, NewBusinessObject, ObjectListQuery,
};
pub use relationship::{EndpointPolicy, NewRelationship, RelationshipRepository};
