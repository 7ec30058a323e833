//! Integration tests for policy hierarchy assembly
//!
//! Covers the structural guarantees: SOP dedup within one policy subtree,
//! the fixed depth bound, objective label truncation, empty-children roots,
//! and soft-delete exclusion.

use crate::db::{DatabaseService, LibsqlStore, NewSop, TenantScope};
use crate::models::{EntityKind, HierarchyNode};
use crate::services::HierarchyService;
use std::sync::Arc;
use tempfile::TempDir;

/// Helper to create a hierarchy service over a fresh database
async fn create_test_service() -> (HierarchyService, DatabaseService, TenantScope, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = DatabaseService::new(temp_dir.path().join("test.db"))
        .await
        .unwrap();
    let scope = TenantScope::new("org-1");
    let service = HierarchyService::new(Arc::new(LibsqlStore::new(db.clone())), scope.clone());
    (service, db, scope, temp_dir)
}

fn children(node: &HierarchyNode) -> &[HierarchyNode] {
    node.children.as_deref().unwrap_or(&[])
}

#[tokio::test]
async fn sop_reachable_both_ways_appears_once_under_standard() {
    let (service, db, scope, _temp) = create_test_service().await;

    // Policy P1 has Standard S1; S1 has SOP X; P1 also links SOP X directly
    db.insert_policy(&scope, "p1", "Security Policy", "1.0", "active")
        .await
        .unwrap();
    db.insert_standard(&scope, "s1", "Access Control", "AC", "active", "p1")
        .await
        .unwrap();
    db.insert_sop(
        &scope,
        NewSop {
            id: "x",
            title: "Access review",
            identifier: "SOP-X",
            status: "active",
            linked_policies: &["p1"],
            linked_standards: &["s1"],
        },
    )
    .await
    .unwrap();

    let forest = service.build_policy_hierarchy().await.unwrap();
    assert_eq!(forest.len(), 1);

    let policy = &forest[0];
    let policy_children = children(policy);
    assert_eq!(policy_children.len(), 1, "only S1, no direct SOP duplicate");
    assert_eq!(policy_children[0].id, "s1");

    let standard_children = children(&policy_children[0]);
    assert_eq!(standard_children.len(), 1);
    assert_eq!(standard_children[0].id, "x");
    assert_eq!(standard_children[0].kind, EntityKind::Sop);
}

#[tokio::test]
async fn direct_sop_not_reachable_via_standard_is_appended() {
    let (service, db, scope, _temp) = create_test_service().await;

    db.insert_policy(&scope, "p1", "Security Policy", "1.0", "active")
        .await
        .unwrap();
    db.insert_sop(
        &scope,
        NewSop {
            id: "direct-1",
            title: "Incident response runbook",
            identifier: "SOP-IR",
            status: "active",
            linked_policies: &["p1"],
            linked_standards: &[],
        },
    )
    .await
    .unwrap();

    let forest = service.build_policy_hierarchy().await.unwrap();
    let policy_children = children(&forest[0]);
    assert_eq!(policy_children.len(), 1);
    assert_eq!(policy_children[0].id, "direct-1");
    assert_eq!(policy_children[0].kind, EntityKind::Sop);
    assert!(policy_children[0].children.is_none(), "SOPs are leaves");
}

#[tokio::test]
async fn objective_label_is_truncated_to_100_chars_with_ellipsis() {
    let (service, db, scope, _temp) = create_test_service().await;

    let statement = "a".repeat(130);
    db.insert_policy(&scope, "p2", "Policy", "1.0", "active")
        .await
        .unwrap();
    db.insert_objective(&scope, "o1", &statement, "CO-01", "draft", "p2")
        .await
        .unwrap();

    let forest = service.build_policy_hierarchy().await.unwrap();
    let objective = &children(&forest[0])[0];
    assert_eq!(objective.kind, EntityKind::Objective);
    assert_eq!(objective.label, format!("{}…", "a".repeat(100)));
    // Identifier and status are copied verbatim, only the label is touched
    assert_eq!(objective.identifier, "CO-01");
    assert_eq!(objective.status, "draft");
}

#[tokio::test]
async fn objective_label_at_boundary_is_untouched() {
    let (service, db, scope, _temp) = create_test_service().await;

    let statement = "b".repeat(100);
    db.insert_policy(&scope, "p1", "Policy", "1.0", "active")
        .await
        .unwrap();
    db.insert_objective(&scope, "o1", &statement, "CO-02", "active", "p1")
        .await
        .unwrap();

    let forest = service.build_policy_hierarchy().await.unwrap();
    assert_eq!(children(&forest[0])[0].label, statement);
}

#[tokio::test]
async fn policy_with_no_children_returns_empty_children_array() {
    let (service, db, scope, _temp) = create_test_service().await;

    db.insert_policy(&scope, "lonely", "Standalone Policy", "1.0", "draft")
        .await
        .unwrap();

    let forest = service.build_policy_hierarchy().await.unwrap();
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].children, Some(Vec::new()));
}

#[tokio::test]
async fn soft_deleted_policy_and_its_subtree_are_excluded() {
    let (service, db, scope, _temp) = create_test_service().await;

    db.insert_policy(&scope, "p1", "Doomed Policy", "1.0", "active")
        .await
        .unwrap();
    db.insert_standard(&scope, "s1", "Still active standard", "ST", "active", "p1")
        .await
        .unwrap();
    db.soft_delete(&scope, EntityKind::Policy, "p1")
        .await
        .unwrap();

    // The standard's own deletion marker is absent, but with its policy gone
    // nothing of the subtree is surfaced
    let forest = service.build_policy_hierarchy().await.unwrap();
    assert!(forest.is_empty());
}

#[tokio::test]
async fn soft_deleted_standard_is_excluded_from_living_policy() {
    let (service, db, scope, _temp) = create_test_service().await;

    db.insert_policy(&scope, "p1", "Policy", "1.0", "active")
        .await
        .unwrap();
    db.insert_standard(&scope, "s1", "Kept", "ST-1", "active", "p1")
        .await
        .unwrap();
    db.insert_standard(&scope, "s2", "Dropped", "ST-2", "active", "p1")
        .await
        .unwrap();
    db.soft_delete(&scope, EntityKind::Standard, "s2")
        .await
        .unwrap();

    let forest = service.build_policy_hierarchy().await.unwrap();
    let policy_children = children(&forest[0]);
    assert_eq!(policy_children.len(), 1);
    assert_eq!(policy_children[0].id, "s1");
}

#[tokio::test]
async fn node_kinds_sit_at_their_expected_depths() {
    let (service, db, scope, _temp) = create_test_service().await;

    db.insert_policy(&scope, "p1", "Policy", "1.0", "active")
        .await
        .unwrap();
    db.insert_standard(&scope, "s1", "Standard", "ST", "active", "p1")
        .await
        .unwrap();
    db.insert_sop(
        &scope,
        NewSop {
            id: "sop-std",
            title: "Via standard",
            identifier: "SOP-1",
            status: "active",
            linked_policies: &[],
            linked_standards: &["s1"],
        },
    )
    .await
    .unwrap();
    db.insert_sop(
        &scope,
        NewSop {
            id: "sop-direct",
            title: "Direct",
            identifier: "SOP-2",
            status: "active",
            linked_policies: &["p1"],
            linked_standards: &[],
        },
    )
    .await
    .unwrap();
    db.insert_objective(&scope, "o1", "Objective", "CO-1", "active", "p1")
        .await
        .unwrap();

    let forest = service.build_policy_hierarchy().await.unwrap();
    let policy = &forest[0];
    assert_eq!(policy.kind, EntityKind::Policy);

    for child in children(policy) {
        match child.kind {
            EntityKind::Standard => {
                for grandchild in children(child) {
                    assert_eq!(grandchild.kind, EntityKind::Sop);
                    assert!(grandchild.children.is_none(), "SOPs never have children");
                }
            }
            EntityKind::Sop | EntityKind::Objective => {
                assert!(child.children.is_none());
            }
            other => panic!("unexpected kind {} at depth 1", other),
        }
    }

    // No SOP id duplicated anywhere within the subtree
    let mut sop_ids = Vec::new();
    for child in children(policy) {
        if child.kind == EntityKind::Sop {
            sop_ids.push(child.id.clone());
        }
        for grandchild in children(child) {
            sop_ids.push(grandchild.id.clone());
        }
    }
    let unique: std::collections::HashSet<_> = sop_ids.iter().collect();
    assert_eq!(unique.len(), sop_ids.len());
}

#[tokio::test]
async fn sibling_policies_each_get_their_own_subtree() {
    let (service, db, scope, _temp) = create_test_service().await;

    db.insert_policy(&scope, "p1", "First", "1.0", "active")
        .await
        .unwrap();
    db.insert_policy(&scope, "p2", "Second", "1.0", "active")
        .await
        .unwrap();
    db.insert_standard(&scope, "s1", "Belongs to first", "ST", "active", "p1")
        .await
        .unwrap();

    let forest = service.build_policy_hierarchy().await.unwrap();
    assert_eq!(forest.len(), 2);

    let p1 = forest.iter().find(|p| p.id == "p1").unwrap();
    let p2 = forest.iter().find(|p| p.id == "p2").unwrap();
    assert_eq!(children(p1).len(), 1);
    assert!(children(p2).is_empty());
}
