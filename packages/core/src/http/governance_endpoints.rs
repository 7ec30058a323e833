//! Governance read-side endpoints
//!
//! Exposes the hierarchy forest and the traceability graph. Authentication
//! and row-level security run upstream; by the time a request reaches these
//! handlers its tenant scope is already fixed in the service state.

use crate::http::http_error::HttpError;
use crate::http::AppState;
use crate::models::{EntityKind, HierarchyNode, TraceabilityGraph};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::instrument;

/// Routes served by this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/governance/hierarchy/policy", get(get_policy_hierarchy))
        .route("/governance/traceability/graph", get(get_traceability_graph))
        .with_state(state)
}

/// Query parameters for the traceability graph endpoint.
///
/// Both parameters must be supplied together to activate ego-network
/// filtering; a lone value leaves the graph unfiltered.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQuery {
    pub root_id: Option<String>,
    pub root_type: Option<String>,
}

/// GET /governance/hierarchy/policy
#[instrument(skip(state))]
async fn get_policy_hierarchy(
    State(state): State<AppState>,
) -> Result<Json<Vec<HierarchyNode>>, HttpError> {
    let forest = state.hierarchy.build_policy_hierarchy().await?;
    Ok(Json(forest))
}

/// GET /governance/traceability/graph?rootId=&rootType=
#[instrument(skip(state))]
async fn get_traceability_graph(
    State(state): State<AppState>,
    Query(params): Query<GraphQuery>,
) -> Result<Json<TraceabilityGraph>, HttpError> {
    let root_kind = match params.root_type.as_deref() {
        Some(raw) => Some(
            raw.parse::<EntityKind>()
                .map_err(|e| HttpError::new(e.to_string(), "INVALID_INPUT"))?,
        ),
        None => None,
    };

    let graph = state
        .traceability
        .traceability_graph(params.root_id.as_deref(), root_kind)
        .await?;
    Ok(Json(graph))
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "governance_endpoints_test.rs"]
mod governance_endpoints_test;
