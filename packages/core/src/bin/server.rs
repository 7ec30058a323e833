//! GovTrace HTTP Server
//!
//! Standalone server exposing the governance read-side endpoints:
//!
//! - GET /governance/hierarchy/policy
//! - GET /governance/traceability/graph?rootId=&rootType=
//! - GET /health
//!
//! # Configuration (environment)
//!
//! - `GOVTRACE_DB_PATH` - database file path (default `./data/govtrace.db`)
//! - `GOVTRACE_PORT` - listen port (default 3400)
//! - `GOVTRACE_ORG_ID` - organization scope for all queries (default `default`)
//! - `RUST_LOG` - tracing env filter (default `govtrace_core=info,server=info`)
//!
//! Session authentication and per-request tenant resolution are handled by
//! the gateway in front of this service; the org scope here is fixed at
//! startup.

use govtrace_core::db::{DatabaseService, LibsqlStore, TenantScope};
use govtrace_core::http::{create_router, AppState};
use govtrace_core::services::{HierarchyService, TraceabilityService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("govtrace_core=info,server=info")),
        )
        .init();

    let db_path = std::env::var("GOVTRACE_DB_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data/govtrace.db"));
    let port: u16 = std::env::var("GOVTRACE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3400);
    let organization_id =
        std::env::var("GOVTRACE_ORG_ID").unwrap_or_else(|_| "default".to_string());

    info!("Opening governance database at {}", db_path.display());
    let db = DatabaseService::new(db_path).await?;
    let store: Arc<dyn govtrace_core::db::GovernanceStore> = Arc::new(LibsqlStore::new(db));

    let scope = TenantScope::new(organization_id);
    let state = AppState {
        hierarchy: Arc::new(HierarchyService::new(store.clone(), scope.clone())),
        traceability: Arc::new(TraceabilityService::new(store, scope)),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("GovTrace server listening on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
