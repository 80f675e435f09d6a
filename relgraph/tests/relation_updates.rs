//! Integration tests for relation updates
//!
//! Covers set semantics, self-exclusion, conflicts and the single-mutation
//! guarantee of the update engine.

mod common;

use common::{counted_graph, patch, seed_entity, seed_user};
use relgraph::RelgraphError;
use relgraph::storage::EntityKind;
use serde_json::json;

#[tokio::test]
async fn test_add_friends_skips_existing_and_self() {
    let (graph, _) = counted_graph();
    seed_user(&graph, "U1", json!({})).await;
    graph
        .update_relations("U1", &patch(json!({"add_friends": ["A", "B"]})))
        .await
        .unwrap();

    let user = graph
        .update_relations("U1", &patch(json!({"add_friends": ["B", "C", "U1"]})))
        .await
        .unwrap();
    assert_eq!(user.friends, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_self_never_added_to_user_relations() {
    let (graph, _) = counted_graph();
    seed_user(&graph, "U1", json!({})).await;

    let user = graph
        .update_relations(
            "U1",
            &patch(json!({
                "add_friends": ["U1"],
                "add_following": ["U1", "U2"],
                "add_followers": ["U2", "U1", "U2"]
            })),
        )
        .await
        .unwrap();

    assert!(user.friends.is_empty());
    assert_eq!(user.following, vec!["U2"]);
    assert_eq!(user.followers, vec!["U2"]);
}

#[tokio::test]
async fn test_remove_non_member_is_noop() {
    let (graph, _) = counted_graph();
    seed_user(&graph, "U1", json!({})).await;
    graph
        .update_relations("U1", &patch(json!({"add_liked": ["b1", "b2"]})))
        .await
        .unwrap();

    let user = graph
        .update_relations("U1", &patch(json!({"remove_liked": ["b9"]})))
        .await
        .unwrap();
    assert_eq!(user.liked, vec!["b1", "b2"]);

    let user = graph
        .update_relations("U1", &patch(json!({"remove_liked": ["b1", "b9"]})))
        .await
        .unwrap();
    assert_eq!(user.liked, vec!["b2"]);
}

#[tokio::test]
async fn test_repeated_add_is_idempotent() {
    let (graph, _) = counted_graph();
    seed_user(&graph, "U1", json!({})).await;
    let add = patch(json!({"add_bookmarks": ["b1", "b2", "b1"], "add_interests": ["rust"]}));

    let once = graph.update_relations("U1", &add).await.unwrap();
    let twice = graph.update_relations("U1", &add).await.unwrap();
    assert_eq!(once.bookmarks, vec!["b1", "b2"]);
    assert_eq!(once.bookmarks, twice.bookmarks);
    assert_eq!(once.interests, twice.interests);
}

#[tokio::test]
async fn test_conflict_leaves_state_unchanged_without_store_calls() {
    let (graph, store) = counted_graph();
    seed_user(&graph, "U1", json!({})).await;
    graph
        .update_relations("U1", &patch(json!({"add_friends": ["A"]})))
        .await
        .unwrap();
    store.reset();

    let err = graph
        .update_relations(
            "U1",
            &patch(json!({"add_friends": ["B"], "remove_friends": ["A"]})),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RelgraphError::Conflict { ref field, .. } if field == "friends"));
    assert_eq!(store.calls(), 0);

    let user = graph.directory().find_by_user_name("u1").await.unwrap();
    assert_eq!(user.friends, vec!["A"]);
}

#[tokio::test]
async fn test_validation_errors_reach_no_store() {
    let (graph, store) = counted_graph();
    seed_user(&graph, "U1", json!({})).await;
    store.reset();

    let bad_patches = [
        json!({"add_friends": "A"}),
        json!({"remove_blogs": [1, 2]}),
        json!({"add_enemies": ["A"]}),
        json!({"friends": ["A"]}),
        json!({"id": "U2"}),
        json!({"bio": "fine", "add_liked": [null]}),
    ];
    for bad in bad_patches {
        let err = graph
            .update_relations("U1", &patch(bad.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation_error", "{bad}");
    }
    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn test_all_deltas_go_out_in_one_update() {
    let (graph, store) = counted_graph();
    seed_user(&graph, "U1", json!({})).await;
    graph
        .update_relations("U1", &patch(json!({"add_followers": ["U2"]})))
        .await
        .unwrap();
    store.reset();

    let user = graph
        .update_relations(
            "U1",
            &patch(json!({
                "add_following": ["U2", "U3"],
                "remove_followers": ["U2"],
                "add_liked": ["b1"],
                "add_blogs": ["b7"],
                "bio": "graph enthusiast"
            })),
        )
        .await
        .unwrap();

    assert_eq!(store.updates(), 1);
    assert_eq!(store.calls(), 2);
    assert_eq!(user.following, vec!["U2", "U3"]);
    assert!(user.followers.is_empty());
    assert_eq!(user.liked, vec!["b1"]);
    assert_eq!(user.blogs, vec!["b7"]);
    assert_eq!(user.extra["bio"], "graph enthusiast");
}

#[tokio::test]
async fn test_noop_patch_skips_update() {
    let (graph, store) = counted_graph();
    seed_user(&graph, "U1", json!({})).await;
    store.reset();

    let user = graph
        .update_relations("U1", &patch(json!({"add_friends": ["U1"]})))
        .await
        .unwrap();
    assert!(user.friends.is_empty());
    assert_eq!(store.updates(), 0);
}

#[tokio::test]
async fn test_unknown_owner_is_not_found() {
    let (graph, _) = counted_graph();
    let err = graph
        .update_relations("ghost", &patch(json!({"add_friends": ["A"]})))
        .await
        .unwrap_err();
    assert!(matches!(err, RelgraphError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_adds_converge_to_union() {
    let (graph, _) = counted_graph();
    seed_user(&graph, "U1", json!({})).await;

    let mut handles = Vec::new();
    for batch in [vec!["A", "B"], vec!["B", "C"], vec!["D"], vec!["A", "E", "U1"]] {
        let engine = graph.engine().clone();
        let request = patch(json!({ "add_friends": batch }));
        handles.push(tokio::spawn(async move { engine.apply("U1", &request).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let mut friends = graph.directory().find_by_user_name("u1").await.unwrap().friends;
    friends.sort();
    assert_eq!(friends, vec!["A", "B", "C", "D", "E"]);
}

#[tokio::test]
async fn test_scalar_fields_usable_as_sort_keys() {
    let (graph, _) = counted_graph();
    seed_user(&graph, "U1", json!({})).await;
    seed_entity(&graph, EntityKind::Tag, "rust", json!({"name": "rust"})).await;
    seed_entity(&graph, EntityKind::Tag, "go", json!({"name": "go"})).await;

    graph
        .update_relations("U1", &patch(json!({"add_interests": ["rust", "go"]})))
        .await
        .unwrap();
    let interests = graph
        .get_relation("U1", "interests", Some("name_asc"))
        .await
        .unwrap();
    assert_eq!(common::ids(&interests), vec!["go", "rust"]);
}
