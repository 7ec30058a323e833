//! Endpoint tests for the governance read-side routes
//!
//! Drives the full router with tower's oneshot and asserts on the JSON
//! wire shapes, including the camelCase field names the frontend expects.

use crate::db::{DatabaseService, LibsqlStore, NewSop, TenantScope};
use crate::http::{create_router, AppState};
use crate::models::EntityKind;
use crate::services::{HierarchyService, TraceabilityService};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

async fn create_test_app() -> (Router, DatabaseService, TenantScope, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = DatabaseService::new(temp_dir.path().join("test.db"))
        .await
        .unwrap();
    let scope = TenantScope::new("org-1");
    let store: Arc<dyn crate::db::GovernanceStore> = Arc::new(LibsqlStore::new(db.clone()));
    let state = AppState {
        hierarchy: Arc::new(HierarchyService::new(store.clone(), scope.clone())),
        traceability: Arc::new(TraceabilityService::new(store, scope.clone())),
    };
    (create_router(state), db, scope, temp_dir)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let (app, _db, _scope, _temp) = create_test_app().await;

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn hierarchy_endpoint_returns_forest_with_wire_field_names() {
    let (app, db, scope, _temp) = create_test_app().await;

    db.insert_policy(&scope, "p1", "Security Policy", "1.0", "active")
        .await
        .unwrap();
    db.insert_standard(&scope, "s1", "Access Control", "AC", "active", "p1")
        .await
        .unwrap();
    db.insert_sop(
        &scope,
        NewSop {
            id: "sop-1",
            title: "Access review",
            identifier: "SOP-1",
            status: "active",
            linked_policies: &[],
            linked_standards: &["s1"],
        },
    )
    .await
    .unwrap();

    let (status, body) = get_json(&app, "/governance/hierarchy/policy").await;
    assert_eq!(status, StatusCode::OK);

    let forest = body.as_array().unwrap();
    assert_eq!(forest.len(), 1);

    let policy = &forest[0];
    assert_eq!(policy["id"], "p1");
    assert_eq!(policy["type"], "policy");
    assert_eq!(policy["label"], "Security Policy");
    assert_eq!(policy["identifier"], "1.0");
    assert_eq!(policy["status"], "active");

    let standard = &policy["children"][0];
    assert_eq!(standard["type"], "standard");

    let sop = &standard["children"][0];
    assert_eq!(sop["type"], "sop");
    // Leaves omit the children field entirely
    assert!(sop.get("children").is_none());
}

#[tokio::test]
async fn graph_endpoint_returns_nodes_and_links() {
    let (app, db, scope, _temp) = create_test_app().await;

    db.insert_influencer(&scope, "inf-1", "GDPR", "EU 2016/679", "active")
        .await
        .unwrap();
    db.insert_policy(&scope, "pol-1", "Privacy Policy", "1.0", "active")
        .await
        .unwrap();
    db.insert_link(
        &scope,
        EntityKind::Influencer,
        "inf-1",
        EntityKind::Policy,
        "pol-1",
        "informs",
    )
    .await
    .unwrap();

    let (status, body) = get_json(&app, "/governance/traceability/graph").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(body["nodes"].as_array().unwrap().len(), 2);
    let links = body["links"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["source"], "inf-1");
    assert_eq!(links[0]["sourceType"], "influencer");
    assert_eq!(links[0]["target"], "pol-1");
    assert_eq!(links[0]["targetType"], "policy");
    assert_eq!(links[0]["type"], "informs");
}

#[tokio::test]
async fn graph_endpoint_filters_by_root_params() {
    let (app, db, scope, _temp) = create_test_app().await;

    db.insert_control(&scope, "C-77", "Encrypt at rest", "CTL-77", "implemented")
        .await
        .unwrap();
    db.insert_baseline(&scope, "B-2", "Storage baseline", "BL-2", "active")
        .await
        .unwrap();
    db.insert_influencer(&scope, "inf-1", "Unrelated", "REF", "active")
        .await
        .unwrap();
    db.insert_link(
        &scope,
        EntityKind::Control,
        "C-77",
        EntityKind::Baseline,
        "B-2",
        "maps_to",
    )
    .await
    .unwrap();

    let (status, body) =
        get_json(&app, "/governance/traceability/graph?rootId=C-77&rootType=control").await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<&str> = body["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"C-77"));
    assert!(ids.contains(&"B-2"));
    assert!(!ids.contains(&"inf-1"));
}

#[tokio::test]
async fn graph_endpoint_ignores_lone_root_id() {
    let (app, db, scope, _temp) = create_test_app().await;

    db.insert_control(&scope, "C-1", "Control", "CTL-1", "implemented")
        .await
        .unwrap();
    db.insert_baseline(&scope, "B-1", "Baseline", "BL-1", "active")
        .await
        .unwrap();

    let (status, body) = get_json(&app, "/governance/traceability/graph?rootId=C-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn graph_endpoint_rejects_unknown_root_type() {
    let (app, _db, _scope, _temp) = create_test_app().await;

    let (status, body) =
        get_json(&app, "/governance/traceability/graph?rootId=x&rootType=widget").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["message"].as_str().unwrap().contains("widget"));
}
