//! Hierarchy Node Model
//!
//! Defines `HierarchyNode`, the single node shape used by both the policy
//! hierarchy tree and the traceability graph, plus the `EntityKind`
//! discriminator and the composite `NodeKey` identity.
//!
//! # Node identity
//!
//! Entity ids are only unique within one entity kind. Two nodes of different
//! kinds may legitimately share an `id` value, so anything that compares
//! nodes across kinds (graph filtering, link pruning) must compare
//! `NodeKey` pairs, never bare ids. `HierarchyNode::key()` is the one way to
//! obtain that identity.

use crate::models::row::EntityRow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum number of characters rendered for a truncated label
pub const MAX_LABEL_CHARS: usize = 100;

/// Marker appended to a truncated label
const TRUNCATION_MARKER: char = '…';

/// Closed set of governance entity kinds surfaced by the builders.
///
/// The tree builder uses policy / standard / sop / objective; the graph
/// builder uses influencer / policy / objective / control / baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Policy,
    Standard,
    Sop,
    Objective,
    Influencer,
    Control,
    Baseline,
}

impl EntityKind {
    /// The five kinds spanned by the traceability graph, in assembly order.
    pub const GRAPH_KINDS: [EntityKind; 5] = [
        EntityKind::Influencer,
        EntityKind::Policy,
        EntityKind::Objective,
        EntityKind::Control,
        EntityKind::Baseline,
    ];

    /// Wire/database representation of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Policy => "policy",
            EntityKind::Standard => "standard",
            EntityKind::Sop => "sop",
            EntityKind::Objective => "objective",
            EntityKind::Influencer => "influencer",
            EntityKind::Control => "control",
            EntityKind::Baseline => "baseline",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized entity kind string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown entity kind: {0}")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "policy" => Ok(EntityKind::Policy),
            "standard" => Ok(EntityKind::Standard),
            "sop" => Ok(EntityKind::Sop),
            "objective" => Ok(EntityKind::Objective),
            "influencer" => Ok(EntityKind::Influencer),
            "control" => Ok(EntityKind::Control),
            "baseline" => Ok(EntityKind::Baseline),
            other => Err(UnknownEntityKind(other.to_string())),
        }
    }
}

/// Composite node identity: `(kind, id)`.
///
/// Graph identity is the pair, not the bare id. See the module docs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub kind: EntityKind,
    pub id: String,
}

impl NodeKey {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

/// One entity surfaced in the policy hierarchy tree or the traceability graph.
///
/// `children` is `Some` (possibly empty) for tree nodes that can hold
/// children, and `None` for leaf nodes and graph nodes, in which case the
/// field is omitted from the serialized output entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyNode {
    /// Opaque identifier, unique within `kind` only
    pub id: String,

    /// Entity kind discriminator
    #[serde(rename = "type")]
    pub kind: EntityKind,

    /// Display string derived from the kind-specific source column
    pub label: String,

    /// Business-facing code; not necessarily unique
    pub identifier: String,

    /// Free-form status string copied verbatim from the source row
    pub status: String,

    /// Ordered child nodes (tree builder only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<HierarchyNode>>,
}

impl HierarchyNode {
    /// Create a tree node that can hold children (`children = Some([])`)
    pub fn branch(kind: EntityKind, row: &EntityRow) -> Self {
        Self {
            id: row.id.clone(),
            kind,
            label: row.label.clone(),
            identifier: row.identifier.clone(),
            status: row.status.clone(),
            children: Some(Vec::new()),
        }
    }

    /// Create a leaf node with no children field
    pub fn leaf(kind: EntityKind, row: &EntityRow) -> Self {
        Self {
            id: row.id.clone(),
            kind,
            label: row.label.clone(),
            identifier: row.identifier.clone(),
            status: row.status.clone(),
            children: None,
        }
    }

    /// Create a graph node; identical shape to a leaf, named separately
    /// because graph nodes never grow children
    pub fn graph_node(kind: EntityKind, row: &EntityRow) -> Self {
        Self::leaf(kind, row)
    }

    /// Composite identity of this node
    pub fn key(&self) -> NodeKey {
        NodeKey::new(self.kind, self.id.clone())
    }

    /// Append a child to a branch node.
    ///
    /// Only valid on nodes created with [`HierarchyNode::branch`]; leaves
    /// stay leaves. Calling this on a leaf is a construction bug.
    pub fn push_child(&mut self, child: HierarchyNode) {
        debug_assert!(
            self.children.is_some(),
            "push_child called on a leaf node"
        );
        self.children.get_or_insert_with(Vec::new).push(child);
    }
}

/// Truncate a label to `max_chars` characters, appending `…` when the source
/// text is longer.
///
/// Truncation counts Unicode characters, not bytes, so multi-byte labels are
/// never split mid-character. Labels of `max_chars` characters or fewer are
/// returned verbatim.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    match label.char_indices().nth(max_chars) {
        None => label.to_string(),
        Some((byte_idx, _)) => {
            let mut truncated = String::with_capacity(byte_idx + TRUNCATION_MARKER.len_utf8());
            truncated.push_str(&label[..byte_idx]);
            truncated.push(TRUNCATION_MARKER);
            truncated
        }
    }
}
