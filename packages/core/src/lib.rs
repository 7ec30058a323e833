//! GovTrace Core - Governance Read-Side Services
//!
//! This crate provides the read-side query services for the GovTrace
//! governance back office: the policy hierarchy forest and the cross-entity
//! traceability graph, assembled in memory from independent relational
//! queries.
//!
//! # Architecture
//!
//! - **Uniform row model**: The gateway maps each entity's type-specific
//!   columns onto one `EntityRow` shape; the builders never see SQL
//! - **Composite node identity**: graph identity is `(kind, id)`, never the
//!   bare id, because ids are only unique within one entity kind
//! - **Soft deletes + tenant scoping**: every gateway query filters
//!   `deleted_at IS NULL` and `organization_id = ?` explicitly
//! - **libsql**: embedded SQLite-compatible database backend
//!
//! # Modules
//!
//! - [`models`] - Value objects (HierarchyNode, TraceabilityGraph, ...)
//! - [`db`] - Database layer, gateway trait and libsql implementation
//! - [`services`] - HierarchyService and TraceabilityService
//! - [`http`] - axum REST surface

pub mod db;
pub mod http;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use db::{DatabaseService, GovernanceStore, LibsqlStore, TenantScope};
pub use models::*;
pub use services::*;
