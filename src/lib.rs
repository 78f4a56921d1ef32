//! # Object Catalog Library
//!
//! Core of the object catalog service: tenant-scoped business objects, their
//! analyses and relationships, the agent orchestrator and the HTTP surface.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod pagination;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub mod token_verification;
pub use migration;
