//! GovernanceStore Trait - Relational Query Gateway
//!
//! This module defines the `GovernanceStore` trait that abstracts the
//! relational queries the hierarchy and traceability builders depend on. The
//! builders contain no SQL knowledge; they issue filtered "all active rows of
//! entity X related to Y" queries through this trait and reassemble the
//! results in memory.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async to support both embedded and
//!    network backends.
//! 2. **Explicit scoping**: Every query takes a [`TenantScope`], and
//!    implementations must filter by it and exclude soft-deleted rows. The
//!    active-only / tenant-scoped contract is a typed parameter rather than
//!    an implicit row-filtering convention, so it is testable independent of
//!    the real store.
//! 3. **Uniform rows**: Implementations map each entity's type-specific
//!    source columns onto [`EntityRow`] so the builders stay column-agnostic.

use crate::db::error::DatabaseError;
use crate::models::{EntityKind, EntityRow, RelationRow};
use async_trait::async_trait;

/// Tenant scope for all gateway queries.
///
/// Rows visible through the gateway are restricted to this organization.
/// Authentication resolves the organization upstream; the gateway only
/// applies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    pub organization_id: String,
}

impl TenantScope {
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
        }
    }
}

/// Abstraction layer for the governance read-side queries.
///
/// Implementations must be `Send + Sync` so services can share them across
/// async tasks. Every method returns only rows that are active (no
/// `deleted_at` marker) and belong to the scope's organization.
#[async_trait]
pub trait GovernanceStore: Send + Sync {
    /// All active policies
    async fn active_policies(&self, scope: &TenantScope) -> Result<Vec<EntityRow>, DatabaseError>;

    /// Active standards whose `policy_id` matches
    async fn standards_by_policy(
        &self,
        scope: &TenantScope,
        policy_id: &str,
    ) -> Result<Vec<EntityRow>, DatabaseError>;

    /// Active SOPs whose `linked_standards` set contains the standard id
    async fn sops_by_standard(
        &self,
        scope: &TenantScope,
        standard_id: &str,
    ) -> Result<Vec<EntityRow>, DatabaseError>;

    /// Active SOPs whose `linked_policies` set contains the policy id
    async fn sops_by_policy(
        &self,
        scope: &TenantScope,
        policy_id: &str,
    ) -> Result<Vec<EntityRow>, DatabaseError>;

    /// Active control objectives whose `policy_id` matches
    async fn objectives_by_policy(
        &self,
        scope: &TenantScope,
        policy_id: &str,
    ) -> Result<Vec<EntityRow>, DatabaseError>;

    /// All active rows of one entity kind
    async fn active_entities(
        &self,
        scope: &TenantScope,
        kind: EntityKind,
    ) -> Result<Vec<EntityRow>, DatabaseError>;

    /// All active relationship rows between the traceability entity kinds
    async fn relations(&self, scope: &TenantScope) -> Result<Vec<RelationRow>, DatabaseError>;
}
