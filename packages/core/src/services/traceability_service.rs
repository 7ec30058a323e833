//! Traceability Service - Cross-Entity Graph Assembly
//!
//! Assembles the traceability graph spanning Influencer, Policy, Objective,
//! Control and Baseline entities: all active rows of each kind become nodes,
//! all relationship rows become typed links. Optionally the graph is reduced
//! to the 1-hop ego network of one root node.
//!
//! Node identity is the composite `(kind, id)` pair throughout - two nodes of
//! different kinds may share an id value without colliding.

use crate::db::{GovernanceStore, TenantScope};
use crate::models::{
    EntityKind, HierarchyNode, NodeKey, TraceabilityGraph, TraceabilityLink,
};
use crate::services::error::GovernanceServiceError;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Read-only service assembling the traceability graph
pub struct TraceabilityService {
    store: Arc<dyn GovernanceStore>,
    scope: TenantScope,
}

impl TraceabilityService {
    pub fn new(store: Arc<dyn GovernanceStore>, scope: TenantScope) -> Self {
        Self { store, scope }
    }

    /// Build the traceability graph, optionally reduced to one root's
    /// 1-hop neighborhood.
    ///
    /// Filtering activates only when BOTH `root_id` and `root_kind` are
    /// supplied; a lone value is ignored and the full graph is returned.
    /// That asymmetry mirrors the historical endpoint contract - see
    /// DESIGN.md for the decision record.
    ///
    /// # Guarantees
    ///
    /// Every returned link's source and target resolve to a node present in
    /// the returned node list, before and after filtering.
    #[instrument(skip(self), fields(organization = %self.scope.organization_id))]
    pub async fn traceability_graph(
        &self,
        root_id: Option<&str>,
        root_kind: Option<EntityKind>,
    ) -> Result<TraceabilityGraph, GovernanceServiceError> {
        let graph = self.assemble_graph().await?;

        if let (Some(id), Some(kind)) = (root_id, root_kind) {
            return Ok(filter_graph(graph, &NodeKey::new(kind, id)));
        }
        Ok(graph)
    }

    /// Fetch all five node kinds and all relationship rows, then prune links
    /// whose endpoints did not materialize as nodes (soft-deleted rows never
    /// materialize, so their edges disappear here)
    async fn assemble_graph(&self) -> Result<TraceabilityGraph, GovernanceServiceError> {
        let mut nodes = Vec::new();
        for kind in EntityKind::GRAPH_KINDS {
            for row in self.store.active_entities(&self.scope, kind).await? {
                nodes.push(HierarchyNode::graph_node(kind, &row));
            }
        }

        let links: Vec<TraceabilityLink> = self
            .store
            .relations(&self.scope)
            .await?
            .into_iter()
            .map(TraceabilityLink::from)
            .collect();

        let mut graph = TraceabilityGraph { nodes, links };
        graph.retain_valid_links();
        debug!(
            "Assembled traceability graph: {} nodes, {} links",
            graph.nodes.len(),
            graph.links.len()
        );
        Ok(graph)
    }
}

/// Reduce a graph to the 1-hop ego network around `root`.
///
/// Retains the root node, every node connected to it by one edge (in either
/// direction), and the edges among the retained node set. A root absent from
/// the graph yields an empty graph. This function is idempotent: filtering an
/// already-filtered graph by the same root returns it unchanged.
pub fn filter_graph(graph: TraceabilityGraph, root: &NodeKey) -> TraceabilityGraph {
    let mut retained: HashSet<NodeKey> = HashSet::new();
    retained.insert(root.clone());
    for link in &graph.links {
        if link.source_key() == *root {
            retained.insert(link.target_key());
        }
        if link.target_key() == *root {
            retained.insert(link.source_key());
        }
    }

    let mut filtered = TraceabilityGraph {
        nodes: graph
            .nodes
            .into_iter()
            .filter(|node| retained.contains(&node.key()))
            .collect(),
        links: graph.links,
    };
    // Edges among the retained set only; anything touching a dropped node goes
    filtered.retain_valid_links();
    filtered
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "traceability_service_test.rs"]
mod traceability_service_test;
