//! Relational Row Model
//!
//! These structs are the only shapes the builders ever see coming out of the
//! relational gateway. The gateway implementation is responsible for mapping
//! each entity's type-specific source columns (title / statement / name,
//! version / code) onto this uniform shape; the builders never touch SQL
//! column names.

use crate::models::hierarchy::EntityKind;

/// One active entity row, already mapped to display shape.
///
/// `status` is copied verbatim from the source row (draft / active /
/// not_implemented / ...); no normalization is performed anywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRow {
    /// Opaque identifier, unique within its entity kind only
    pub id: String,
    /// Display text from the kind-specific source column
    pub label: String,
    /// Business-facing code (version string, standard code, SOP code, ...)
    pub identifier: String,
    /// Free-form status string
    pub status: String,
}

impl EntityRow {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        identifier: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            identifier: identifier.into(),
            status: status.into(),
        }
    }
}

/// One relationship row between two traceability entities.
///
/// `link_type` is read from the row as-is ("informs", "implements",
/// "maps_to", ...); it is opaque to the builders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRow {
    pub source_id: String,
    pub source_kind: EntityKind,
    pub target_id: String,
    pub target_kind: EntityKind,
    pub link_type: String,
}
