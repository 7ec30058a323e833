//! Database Connection Management
//!
//! This module provides the core database connection and initialization
//! functionality using libsql for the governance tables.
//!
//! # Architecture
//!
//! - **Path-agnostic**: Accepts any valid PathBuf
//! - **Idempotent schema**: `CREATE TABLE IF NOT EXISTS`, safe to call repeatedly
//! - **WAL mode**: Write-Ahead Logging for better concurrency
//! - **Foreign keys**: Enabled for referential integrity
//! - **Soft deletes**: Every governance table carries a nullable `deleted_at`
//!   timestamp; reads go through [`crate::db::LibsqlStore`], which always
//!   filters it out
//!
//! # Database Connection Patterns
//!
//! **Always use `connect_with_timeout()` in async functions.** The 5-second
//! busy timeout lets concurrent operations wait and retry instead of failing
//! immediately with `SQLITE_BUSY` when the Tokio runtime moves futures
//! between threads.
//!
//! The write helpers on this type exist for seeding and tests; the read-side
//! builders never call them.

use crate::db::error::DatabaseError;
use crate::db::gateway::TenantScope;
use crate::models::EntityKind;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Database service for managing the libsql connection and schema
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

/// Parameters for SOP insertion (avoids too-many-arguments lint)
pub struct NewSop<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub identifier: &'a str,
    pub status: &'a str,
    /// Policy ids this SOP is linked to directly
    pub linked_policies: &'a [&'a str],
    /// Standard ids this SOP is linked to
    pub linked_standards: &'a [&'a str],
}

impl DatabaseService {
    /// Create a new DatabaseService with the specified database path
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Initialize the schema (CREATE TABLE IF NOT EXISTS)
    /// 4. Enable WAL mode and foreign keys
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the parent directory cannot be created, the
    /// connection fails, or schema initialization fails.
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(DatabaseError::DirectoryCreationFailed)?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema().await?;

        Ok(service)
    }

    /// Get a synchronous connection handle
    ///
    /// Use only in single-threaded contexts; async code should call
    /// `connect_with_timeout()` instead.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get an async connection with busy timeout configured
    ///
    /// Sets a 5-second busy timeout so concurrent operations wait and retry
    /// instead of failing immediately when the database is locked.
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;
        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;
        Ok(conn)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so query() must be used instead of
    /// execute().
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize database schema and configuration
    ///
    /// Creates the governance tables and indexes idempotently. Every table
    /// carries `organization_id` and a nullable `deleted_at` column; the
    /// read-side queries always filter on both.
    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;
        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;
        self.execute_pragma(&conn, "PRAGMA foreign_keys = ON")
            .await?;

        let tables: [(&str, &str); 8] = [
            (
                "policies",
                "CREATE TABLE IF NOT EXISTS policies (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    version TEXT NOT NULL DEFAULT '1.0',
                    status TEXT NOT NULL DEFAULT 'draft',
                    organization_id TEXT NOT NULL,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    deleted_at DATETIME
                )",
            ),
            (
                "standards",
                "CREATE TABLE IF NOT EXISTS standards (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    standard_identifier TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'draft',
                    policy_id TEXT NOT NULL,
                    organization_id TEXT NOT NULL,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    deleted_at DATETIME,
                    FOREIGN KEY (policy_id) REFERENCES policies(id)
                )",
            ),
            (
                "sops",
                "CREATE TABLE IF NOT EXISTS sops (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    sop_identifier TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'draft',
                    linked_policies JSON NOT NULL DEFAULT '[]',
                    linked_standards JSON NOT NULL DEFAULT '[]',
                    organization_id TEXT NOT NULL,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    deleted_at DATETIME
                )",
            ),
            (
                "control_objectives",
                "CREATE TABLE IF NOT EXISTS control_objectives (
                    id TEXT PRIMARY KEY,
                    statement TEXT NOT NULL,
                    objective_identifier TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'draft',
                    policy_id TEXT NOT NULL,
                    organization_id TEXT NOT NULL,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    deleted_at DATETIME,
                    FOREIGN KEY (policy_id) REFERENCES policies(id)
                )",
            ),
            (
                "influencers",
                "CREATE TABLE IF NOT EXISTS influencers (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    reference_number TEXT NOT NULL DEFAULT '',
                    status TEXT NOT NULL DEFAULT 'draft',
                    organization_id TEXT NOT NULL,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    deleted_at DATETIME
                )",
            ),
            (
                "unified_controls",
                "CREATE TABLE IF NOT EXISTS unified_controls (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    control_identifier TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'not_implemented',
                    organization_id TEXT NOT NULL,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    deleted_at DATETIME
                )",
            ),
            (
                "baselines",
                "CREATE TABLE IF NOT EXISTS baselines (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    baseline_identifier TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'draft',
                    organization_id TEXT NOT NULL,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    deleted_at DATETIME
                )",
            ),
            (
                "traceability_links",
                "CREATE TABLE IF NOT EXISTS traceability_links (
                    id TEXT PRIMARY KEY,
                    source_id TEXT NOT NULL,
                    source_kind TEXT NOT NULL,
                    target_id TEXT NOT NULL,
                    target_kind TEXT NOT NULL,
                    link_type TEXT NOT NULL,
                    organization_id TEXT NOT NULL,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                    deleted_at DATETIME
                )",
            ),
        ];

        for (table, ddl) in tables {
            conn.execute(ddl, ()).await.map_err(|e| {
                DatabaseError::initialization_failed(format!(
                    "Failed to create {} table: {}",
                    table, e
                ))
            })?;
        }

        self.create_core_indexes(&conn).await?;

        Ok(())
    }

    /// Create core indexes for the governance tables
    async fn create_core_indexes(&self, conn: &libsql::Connection) -> Result<(), DatabaseError> {
        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_policies_org ON policies(organization_id)",
            "CREATE INDEX IF NOT EXISTS idx_standards_policy ON standards(policy_id)",
            "CREATE INDEX IF NOT EXISTS idx_standards_org ON standards(organization_id)",
            "CREATE INDEX IF NOT EXISTS idx_sops_org ON sops(organization_id)",
            "CREATE INDEX IF NOT EXISTS idx_objectives_policy ON control_objectives(policy_id)",
            "CREATE INDEX IF NOT EXISTS idx_objectives_org ON control_objectives(organization_id)",
            "CREATE INDEX IF NOT EXISTS idx_influencers_org ON influencers(organization_id)",
            "CREATE INDEX IF NOT EXISTS idx_controls_org ON unified_controls(organization_id)",
            "CREATE INDEX IF NOT EXISTS idx_baselines_org ON baselines(organization_id)",
            "CREATE INDEX IF NOT EXISTS idx_links_source ON traceability_links(source_kind, source_id)",
            "CREATE INDEX IF NOT EXISTS idx_links_target ON traceability_links(target_kind, target_id)",
            "CREATE INDEX IF NOT EXISTS idx_links_org ON traceability_links(organization_id)",
        ];

        for ddl in indexes {
            conn.execute(ddl, ()).await.map_err(|e| {
                DatabaseError::initialization_failed(format!("Failed to create index: {}", e))
            })?;
        }

        Ok(())
    }

    //
    // WRITE HELPERS (seeding and tests)
    //

    /// Insert a policy row
    pub async fn insert_policy(
        &self,
        scope: &TenantScope,
        id: &str,
        title: &str,
        version: &str,
        status: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        conn.execute(
            "INSERT INTO policies (id, title, version, status, organization_id)
             VALUES (?, ?, ?, ?, ?)",
            (id, title, version, status, scope.organization_id.as_str()),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert policy: {}", e)))?;
        Ok(())
    }

    /// Insert a standard row under a policy
    pub async fn insert_standard(
        &self,
        scope: &TenantScope,
        id: &str,
        name: &str,
        identifier: &str,
        status: &str,
        policy_id: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        conn.execute(
            "INSERT INTO standards (id, name, standard_identifier, status, policy_id, organization_id)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id,
                name,
                identifier,
                status,
                policy_id,
                scope.organization_id.as_str(),
            ),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert standard: {}", e)))?;
        Ok(())
    }

    /// Insert a SOP row with its policy/standard link sets
    pub async fn insert_sop(
        &self,
        scope: &TenantScope,
        sop: NewSop<'_>,
    ) -> Result<(), DatabaseError> {
        let linked_policies = serde_json::to_string(sop.linked_policies)
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to encode links: {}", e)))?;
        let linked_standards = serde_json::to_string(sop.linked_standards)
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to encode links: {}", e)))?;

        let conn = self.connect_with_timeout().await?;
        conn.execute(
            "INSERT INTO sops (id, title, sop_identifier, status, linked_policies, linked_standards, organization_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                sop.id,
                sop.title,
                sop.identifier,
                sop.status,
                linked_policies,
                linked_standards,
                scope.organization_id.as_str(),
            ),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert SOP: {}", e)))?;
        Ok(())
    }

    /// Insert a control objective row under a policy
    pub async fn insert_objective(
        &self,
        scope: &TenantScope,
        id: &str,
        statement: &str,
        identifier: &str,
        status: &str,
        policy_id: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        conn.execute(
            "INSERT INTO control_objectives (id, statement, objective_identifier, status, policy_id, organization_id)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id,
                statement,
                identifier,
                status,
                policy_id,
                scope.organization_id.as_str(),
            ),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert objective: {}", e)))?;
        Ok(())
    }

    /// Insert an influencer row
    pub async fn insert_influencer(
        &self,
        scope: &TenantScope,
        id: &str,
        name: &str,
        reference_number: &str,
        status: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        conn.execute(
            "INSERT INTO influencers (id, name, reference_number, status, organization_id)
             VALUES (?, ?, ?, ?, ?)",
            (id, name, reference_number, status, scope.organization_id.as_str()),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert influencer: {}", e)))?;
        Ok(())
    }

    /// Insert a unified control row
    pub async fn insert_control(
        &self,
        scope: &TenantScope,
        id: &str,
        title: &str,
        identifier: &str,
        status: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        conn.execute(
            "INSERT INTO unified_controls (id, title, control_identifier, status, organization_id)
             VALUES (?, ?, ?, ?, ?)",
            (id, title, identifier, status, scope.organization_id.as_str()),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert control: {}", e)))?;
        Ok(())
    }

    /// Insert a baseline row
    pub async fn insert_baseline(
        &self,
        scope: &TenantScope,
        id: &str,
        name: &str,
        identifier: &str,
        status: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        conn.execute(
            "INSERT INTO baselines (id, name, baseline_identifier, status, organization_id)
             VALUES (?, ?, ?, ?, ?)",
            (id, name, identifier, status, scope.organization_id.as_str()),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert baseline: {}", e)))?;
        Ok(())
    }

    /// Insert a traceability relationship row between two entities
    pub async fn insert_link(
        &self,
        scope: &TenantScope,
        source_kind: EntityKind,
        source_id: &str,
        target_kind: EntityKind,
        target_id: &str,
        link_type: &str,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        conn.execute(
            "INSERT INTO traceability_links (id, source_id, source_kind, target_id, target_kind, link_type, organization_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                Uuid::new_v4().to_string(),
                source_id,
                source_kind.as_str(),
                target_id,
                target_kind.as_str(),
                link_type,
                scope.organization_id.as_str(),
            ),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert link: {}", e)))?;
        Ok(())
    }

    /// Mark a row soft-deleted; it disappears from all read-side queries
    pub async fn soft_delete(
        &self,
        scope: &TenantScope,
        kind: EntityKind,
        id: &str,
    ) -> Result<(), DatabaseError> {
        let table = table_for(kind);
        let conn = self.connect_with_timeout().await?;
        conn.execute(
            &format!(
                "UPDATE {} SET deleted_at = CURRENT_TIMESTAMP WHERE id = ? AND organization_id = ?",
                table
            ),
            (id, scope.organization_id.as_str()),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to soft-delete {} row: {}", table, e))
        })?;
        Ok(())
    }
}

/// Table backing each entity kind
pub(crate) fn table_for(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Policy => "policies",
        EntityKind::Standard => "standards",
        EntityKind::Sop => "sops",
        EntityKind::Objective => "control_objectives",
        EntityKind::Influencer => "influencers",
        EntityKind::Control => "unified_controls",
        EntityKind::Baseline => "baselines",
    }
}
