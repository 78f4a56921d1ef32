//! # API Handlers
//!
//! HTTP endpoint handlers for the object catalog API.

pub mod ai;
pub mod analyses;
pub mod health;
pub mod objects;
pub mod relationships;
pub mod types;
