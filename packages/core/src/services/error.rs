//! Service Layer Error Types
//!
//! The read-side builders have a deliberately flat error taxonomy: any
//! underlying gateway fetch failure aborts the whole build. Nothing is
//! caught or retried here; everything accumulated for the request is
//! discarded and the error propagates to the HTTP layer.

use crate::db::DatabaseError;
use thiserror::Error;

/// Governance service operation errors
#[derive(Error, Debug)]
pub enum GovernanceServiceError {
    /// An underlying gateway fetch failed; no partial tree or graph is returned
    #[error("Gateway query failed: {0}")]
    GatewayFailure(#[from] DatabaseError),
}
