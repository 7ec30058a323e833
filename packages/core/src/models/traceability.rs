//! Traceability Graph Model
//!
//! The traceability graph is a flat `{nodes, links}` pair spanning the five
//! graph entity kinds (Influencer, Policy, Objective, Control, Baseline).
//! Links are directed and typed; the type string is read from the
//! relationship row and never computed here.

use crate::models::hierarchy::{HierarchyNode, NodeKey};
use crate::models::row::RelationRow;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A directed, typed edge between two graph nodes.
///
/// `source` and `target` are bare ids for rendering compatibility; the
/// accompanying `source_type`/`target_type` kinds make the full `NodeKey`
/// identity recoverable, which is what all internal comparisons use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceabilityLink {
    pub source: String,
    pub source_type: crate::models::EntityKind,
    pub target: String,
    pub target_type: crate::models::EntityKind,
    #[serde(rename = "type")]
    pub link_type: String,
}

impl TraceabilityLink {
    /// Composite identity of the link's source endpoint
    pub fn source_key(&self) -> NodeKey {
        NodeKey::new(self.source_type, self.source.clone())
    }

    /// Composite identity of the link's target endpoint
    pub fn target_key(&self) -> NodeKey {
        NodeKey::new(self.target_type, self.target.clone())
    }
}

impl From<RelationRow> for TraceabilityLink {
    fn from(row: RelationRow) -> Self {
        Self {
            source: row.source_id,
            source_type: row.source_kind,
            target: row.target_id,
            target_type: row.target_kind,
            link_type: row.link_type,
        }
    }
}

/// The flattened output of the graph builder.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraceabilityGraph {
    pub nodes: Vec<HierarchyNode>,
    pub links: Vec<TraceabilityLink>,
}

impl TraceabilityGraph {
    /// Identity set of all nodes currently in the graph
    pub fn node_keys(&self) -> HashSet<NodeKey> {
        self.nodes.iter().map(HierarchyNode::key).collect()
    }

    /// Drop links whose source or target is not among the graph's nodes.
    ///
    /// Keeps the referential-integrity guarantee: every remaining link's
    /// endpoints resolve to a node in `nodes`. Links pointing at soft-deleted
    /// rows disappear here because those rows were never fetched as nodes.
    pub fn retain_valid_links(&mut self) {
        let keys = self.node_keys();
        self.links
            .retain(|link| keys.contains(&link.source_key()) && keys.contains(&link.target_key()));
    }
}
