//! Business Services
//!
//! This module contains the governance read-side services:
//!
//! - `HierarchyService` - Policy -> Standard -> SOP forest assembly
//! - `TraceabilityService` - cross-entity traceability graph assembly
//!
//! Both are read-only, run inside a synchronous request/response cycle, and
//! hold no state beyond a shared gateway handle and the caller's tenant
//! scope. Trees and graphs are built fresh per request and discarded after
//! serialization.

pub mod error;
pub mod hierarchy_service;
pub mod traceability_service;

pub use error::GovernanceServiceError;
pub use hierarchy_service::HierarchyService;
pub use traceability_service::{filter_graph, TraceabilityService};
