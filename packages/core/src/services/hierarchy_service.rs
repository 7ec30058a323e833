//! Hierarchy Service - Policy Hierarchy Assembly
//!
//! Reconstructs the governance hierarchy forest from independent relational
//! queries: one root node per active Policy, each holding its Standards,
//! each Standard holding the SOPs linked to it, plus two extra sibling
//! levels under the Policy root:
//!
//! - SOPs linked directly to the Policy (not through a Standard), deduplicated
//!   against SOPs already reachable through a Standard
//! - Control Objectives attached to the Policy, with their statement text
//!   truncated for display
//!
//! Each Policy's subtree depends only on its own id, so policies are
//! processed independently. Child order preserves retrieval order; there is
//! no business sort key.

use crate::db::{GovernanceStore, TenantScope};
use crate::models::{truncate_label, EntityKind, EntityRow, HierarchyNode, MAX_LABEL_CHARS};
use crate::services::error::GovernanceServiceError;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Read-only service assembling the Policy -> Standard -> SOP forest
pub struct HierarchyService {
    store: Arc<dyn GovernanceStore>,
    scope: TenantScope,
}

impl HierarchyService {
    pub fn new(store: Arc<dyn GovernanceStore>, scope: TenantScope) -> Self {
        Self { store, scope }
    }

    /// Build the full policy hierarchy forest for the scoped organization.
    ///
    /// Returns one fully-populated root node per active Policy, in retrieval
    /// order. Fails as a whole on the first gateway error; callers retry the
    /// entire build.
    ///
    /// # Guarantees
    ///
    /// - Tree depth under a Policy root is at most Policy -> Standard -> SOP,
    ///   plus direct-SOP and Objective siblings at depth 1
    /// - A SOP id appears at most once within one Policy's subtree, even when
    ///   linked both through a Standard and directly to the Policy
    /// - Soft-deleted rows never appear (excluded by the gateway)
    #[instrument(skip(self), fields(organization = %self.scope.organization_id))]
    pub async fn build_policy_hierarchy(
        &self,
    ) -> Result<Vec<HierarchyNode>, GovernanceServiceError> {
        let policies = self.store.active_policies(&self.scope).await?;
        debug!("Assembling hierarchy for {} policies", policies.len());

        let mut forest = Vec::with_capacity(policies.len());
        for policy in &policies {
            forest.push(self.build_policy_subtree(policy).await?);
        }
        Ok(forest)
    }

    /// Assemble one Policy root with all of its children
    async fn build_policy_subtree(
        &self,
        policy: &EntityRow,
    ) -> Result<HierarchyNode, GovernanceServiceError> {
        let mut root = HierarchyNode::branch(EntityKind::Policy, policy);

        // SOP ids already placed in this subtree, for direct-link dedup
        let mut seen_sop_ids: HashSet<String> = HashSet::new();

        for standard_row in self
            .store
            .standards_by_policy(&self.scope, &policy.id)
            .await?
        {
            let mut standard = HierarchyNode::branch(EntityKind::Standard, &standard_row);
            for sop_row in self
                .store
                .sops_by_standard(&self.scope, &standard_row.id)
                .await?
            {
                seen_sop_ids.insert(sop_row.id.clone());
                standard.push_child(HierarchyNode::leaf(EntityKind::Sop, &sop_row));
            }
            root.push_child(standard);
        }

        // Direct-linked SOPs: the standard-level path wins when a SOP is
        // reachable both ways (dedup by id, not object identity)
        for sop_row in self.store.sops_by_policy(&self.scope, &policy.id).await? {
            if seen_sop_ids.insert(sop_row.id.clone()) {
                root.push_child(HierarchyNode::leaf(EntityKind::Sop, &sop_row));
            }
        }

        // Objectives are a disjoint id space; no dedup against SOPs/Standards
        for objective_row in self
            .store
            .objectives_by_policy(&self.scope, &policy.id)
            .await?
        {
            let mut objective = HierarchyNode::leaf(EntityKind::Objective, &objective_row);
            objective.label = truncate_label(&objective.label, MAX_LABEL_CHARS);
            root.push_child(objective);
        }

        Ok(root)
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "hierarchy_service_test.rs"]
mod hierarchy_service_test;
