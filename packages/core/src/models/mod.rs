//! Data Structures
//!
//! This module contains the value objects shared by the governance read-side
//! services:
//!
//! - `EntityRow` / `RelationRow` - the relational row model consumed from the gateway
//! - `HierarchyNode` - one entity surfaced in a tree or graph
//! - `TraceabilityLink` / `TraceabilityGraph` - typed edges and the flattened graph
//! - `NodeKey` - composite `(kind, id)` node identity
//!
//! All of these are constructed fresh on every query, serialized to the
//! caller, and discarded. Nothing in this module is persisted or cached.

pub mod hierarchy;
pub mod row;
pub mod traceability;

pub use hierarchy::{
    truncate_label, EntityKind, HierarchyNode, NodeKey, UnknownEntityKind, MAX_LABEL_CHARS,
};
pub use row::{EntityRow, RelationRow};
pub use traceability::{TraceabilityGraph, TraceabilityLink};
