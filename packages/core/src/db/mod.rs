//! Database Layer
//!
//! This module handles all database interactions using libsql:
//!
//! - Database initialization and connection management
//! - The `GovernanceStore` gateway trait that the read-side services consume
//! - The `LibsqlStore` implementation of that trait
//!
//! The governance tables are append-heavy and soft-deleted: rows are marked
//! with a `deleted_at` timestamp rather than physically removed, and every
//! read-side query excludes marked rows and scopes by organization.

mod database;
mod error;
mod gateway;
mod libsql_store;

pub use database::{DatabaseService, NewSop};
pub use error::DatabaseError;
pub use gateway::{GovernanceStore, TenantScope};
pub use libsql_store::LibsqlStore;
