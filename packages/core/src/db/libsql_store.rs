//! LibsqlStore - GovernanceStore over libsql
//!
//! Implements the [`GovernanceStore`] gateway trait against the governance
//! tables managed by [`DatabaseService`]. This is the only module that knows
//! which source column provides each entity kind's label and identifier;
//! everything above it works on the uniform [`EntityRow`] shape.
//!
//! # Query conventions
//!
//! - Every query filters `organization_id = ?` and `deleted_at IS NULL`.
//! - SOP link sets are stored as JSON arrays; membership queries use
//!   SQLite's `json_each` table-valued function.

use crate::db::database::{table_for, DatabaseService};
use crate::db::error::DatabaseError;
use crate::db::gateway::{GovernanceStore, TenantScope};
use crate::models::{EntityKind, EntityRow, RelationRow};
use async_trait::async_trait;

/// libsql-backed implementation of the governance query gateway
#[derive(Debug, Clone)]
pub struct LibsqlStore {
    db: DatabaseService,
}

impl LibsqlStore {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Source columns mapped onto the uniform row shape, per kind
    fn label_columns(kind: EntityKind) -> (&'static str, &'static str) {
        match kind {
            EntityKind::Policy => ("title", "version"),
            EntityKind::Standard => ("name", "standard_identifier"),
            EntityKind::Sop => ("title", "sop_identifier"),
            EntityKind::Objective => ("statement", "objective_identifier"),
            EntityKind::Influencer => ("name", "reference_number"),
            EntityKind::Control => ("title", "control_identifier"),
            EntityKind::Baseline => ("name", "baseline_identifier"),
        }
    }

    async fn query_entity_rows(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Vec<EntityRow>, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        let mut stmt = conn.prepare(sql).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to prepare query: {}", e))
        })?;
        let mut rows = stmt.query(params).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute query: {}", e))
        })?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            out.push(entity_row(&row)?);
        }
        Ok(out)
    }
}

/// Map a `(id, label, identifier, status)` result row onto [`EntityRow`]
fn entity_row(row: &libsql::Row) -> Result<EntityRow, DatabaseError> {
    Ok(EntityRow {
        id: row.get(0)?,
        label: row.get(1)?,
        identifier: row.get(2)?,
        status: row.get(3)?,
    })
}

#[async_trait]
impl GovernanceStore for LibsqlStore {
    async fn active_policies(&self, scope: &TenantScope) -> Result<Vec<EntityRow>, DatabaseError> {
        self.query_entity_rows(
            "SELECT id, title, version, status FROM policies
             WHERE organization_id = ?1 AND deleted_at IS NULL",
            [scope.organization_id.as_str()],
        )
        .await
    }

    async fn standards_by_policy(
        &self,
        scope: &TenantScope,
        policy_id: &str,
    ) -> Result<Vec<EntityRow>, DatabaseError> {
        self.query_entity_rows(
            "SELECT id, name, standard_identifier, status FROM standards
             WHERE organization_id = ?1 AND deleted_at IS NULL AND policy_id = ?2",
            [scope.organization_id.as_str(), policy_id],
        )
        .await
    }

    async fn sops_by_standard(
        &self,
        scope: &TenantScope,
        standard_id: &str,
    ) -> Result<Vec<EntityRow>, DatabaseError> {
        self.query_entity_rows(
            "SELECT id, title, sop_identifier, status FROM sops
             WHERE organization_id = ?1 AND deleted_at IS NULL
               AND EXISTS (SELECT 1 FROM json_each(sops.linked_standards) WHERE json_each.value = ?2)",
            [scope.organization_id.as_str(), standard_id],
        )
        .await
    }

    async fn sops_by_policy(
        &self,
        scope: &TenantScope,
        policy_id: &str,
    ) -> Result<Vec<EntityRow>, DatabaseError> {
        self.query_entity_rows(
            "SELECT id, title, sop_identifier, status FROM sops
             WHERE organization_id = ?1 AND deleted_at IS NULL
               AND EXISTS (SELECT 1 FROM json_each(sops.linked_policies) WHERE json_each.value = ?2)",
            [scope.organization_id.as_str(), policy_id],
        )
        .await
    }

    async fn objectives_by_policy(
        &self,
        scope: &TenantScope,
        policy_id: &str,
    ) -> Result<Vec<EntityRow>, DatabaseError> {
        self.query_entity_rows(
            "SELECT id, statement, objective_identifier, status FROM control_objectives
             WHERE organization_id = ?1 AND deleted_at IS NULL AND policy_id = ?2",
            [scope.organization_id.as_str(), policy_id],
        )
        .await
    }

    async fn active_entities(
        &self,
        scope: &TenantScope,
        kind: EntityKind,
    ) -> Result<Vec<EntityRow>, DatabaseError> {
        let (label_col, identifier_col) = Self::label_columns(kind);
        let sql = format!(
            "SELECT id, {}, {}, status FROM {}
             WHERE organization_id = ?1 AND deleted_at IS NULL",
            label_col,
            identifier_col,
            table_for(kind)
        );
        self.query_entity_rows(&sql, [scope.organization_id.as_str()])
            .await
    }

    async fn relations(&self, scope: &TenantScope) -> Result<Vec<RelationRow>, DatabaseError> {
        let conn = self.db.connect_with_timeout().await?;
        let mut stmt = conn
            .prepare(
                "SELECT source_id, source_kind, target_id, target_kind, link_type
                 FROM traceability_links
                 WHERE organization_id = ?1 AND deleted_at IS NULL",
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare relations query: {}", e))
            })?;
        let mut rows = stmt
            .query([scope.organization_id.as_str()])
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to execute relations query: {}", e))
            })?;

        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            let source_kind: String = row.get(1)?;
            let target_kind: String = row.get(3)?;
            out.push(RelationRow {
                source_id: row.get(0)?,
                source_kind: source_kind.parse().map_err(|e| {
                    DatabaseError::row_decode(format!("Bad source_kind in link row: {}", e))
                })?,
                target_id: row.get(2)?,
                target_kind: target_kind.parse().map_err(|e| {
                    DatabaseError::row_decode(format!("Bad target_kind in link row: {}", e))
                })?,
                link_type: row.get(4)?,
            });
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "libsql_store_test.rs"]
mod libsql_store_test;
