// SPDX-License-Identifier: MIT OR Apache-2.0
//! Invariant tests for the repertoire tree
//!
//! These tests verify the load-bearing guarantees:
//! 1. Insertion idempotence and sibling uniqueness
//! 2. Transposition handling - lossy key index, path-preserved structure
//! 3. Snapshot fidelity - data survives round-trips
//! 4. Degradation - bad input always yields a usable tree

use openbook::prelude::*;
use openbook::tree::Repertoire;

// =============================================================================
// Test Helpers
// =============================================================================

fn sample_book() -> Repertoire {
    let mut book = Repertoire::new("K0");
    book.insert_move("K0", "K1", "e4").unwrap();
    book.insert_move("K1", "K2", "c5").unwrap();
    book.insert_move("K1", "K3", "e5").unwrap();
    book
}

fn record(key: &str, mv: &str, parent: Option<(&str, &str)>) -> NodeRecord {
    NodeRecord {
        position_key: key.to_string(),
        move_label: mv.to_string(),
        comment: String::new(),
        labels: std::collections::BTreeSet::new(),
        parent: parent.map(|(k, m)| ParentRef {
            position_key: k.to_string(),
            move_label: m.to_string(),
        }),
    }
}

fn assert_sibling_uniqueness(book: &Repertoire) {
    for id in book.breadth_first() {
        let mut labels: Vec<&str> = book
            .node(id)
            .children()
            .iter()
            .map(|&c| book.node(c).move_label())
            .collect();
        let before = labels.len();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), before, "duplicate sibling move label");
    }
}

// =============================================================================
// Insertion Invariants
// =============================================================================

#[test]
fn test_insert_is_idempotent() {
    let mut book = Repertoire::new("K0");
    let first = book.insert_move("K0", "K1", "e4").unwrap();
    let second = book.insert_move("K0", "K1", "e4").unwrap();
    let third = book.insert_move("K0", "K1", "e4").unwrap();

    assert_eq!(first.node, second.node);
    assert_eq!(second.node, third.node);
    assert_eq!(second.outcome, InsertOutcome::AlreadyPresent);
    assert_eq!(book.node(book.root()).children().len(), 1);
}

#[test]
fn test_unknown_parent_leaves_tree_unchanged() {
    let mut book = sample_book();
    let count = book.node_count();
    let err = book.insert_move("missing", "K4", "Nf3").unwrap_err();
    assert!(matches!(err, BookError::UnknownParent(_)));
    assert_eq!(book.node_count(), count);
}

#[test]
fn test_sibling_uniqueness_survives_conflicts() {
    let mut book = sample_book();
    // Conflicting re-insertions must not create duplicate siblings.
    book.insert_move("K0", "K1-other", "e4").unwrap();
    book.insert_move("K1", "K2-other", "c5").unwrap();
    assert_sibling_uniqueness(&book);
}

#[test]
fn test_conflict_policy_prefer_new() {
    let mut book = Repertoire::with_policy("K0", ConflictPolicy::PreferNew);
    book.insert_move("K0", "K1", "e4").unwrap();
    let rebound = book.insert_move("K0", "K1-corrected", "e4").unwrap();

    assert_eq!(rebound.outcome, InsertOutcome::ConflictRebound);
    assert_eq!(book.node(rebound.node).position_key(), "K1-corrected");
    assert_eq!(book.find_by_key("K1"), None);
    assert_sibling_uniqueness(&book);
}

#[test]
fn test_main_line_is_first_child() {
    let book = sample_book();
    let e4 = book.find_by_path(&["e4"]).unwrap();
    let first = book.node(e4).children()[0];
    assert_eq!(book.node(first).move_label(), "c5");
}

// =============================================================================
// Lookup Invariants
// =============================================================================

#[test]
fn test_path_lookup_exactness() {
    let book = sample_book();
    assert_eq!(book.find_by_path::<&str>(&[]), Some(book.root()));
    assert!(book.find_by_path(&["e4", "c5"]).is_some());
    // One move longer than any line in the book.
    assert_eq!(book.find_by_path(&["e4", "c5", "Nf3"]), None);
    // No partial matching.
    assert_eq!(book.find_by_path(&["e4", "d5"]), None);
}

#[test]
fn test_basic_line_building_scenario() {
    let mut book = Repertoire::new("K0");
    let n1 = book.insert_move("K0", "K1", "e4").unwrap();
    let n2 = book.insert_move("K1", "K2", "c5").unwrap();
    let n3 = book.insert_move("K1", "K3", "e5").unwrap();

    assert_eq!(book.node(n1.node).position_key(), "K1");
    assert_eq!(book.find_by_path(&["e4", "c5"]), Some(n2.node));

    let body = book.serialize().unwrap();
    let rebuilt = Repertoire::deserialize(&body, "K0");
    let open = rebuilt.find_by_path(&["e4", "e5"]).unwrap();
    assert_eq!(rebuilt.node(open).position_key(), "K3");
    let _ = n3;
}

// =============================================================================
// Transposition Invariants
// =============================================================================

#[test]
fn test_transposed_key_is_lossy_but_paths_survive() {
    let mut book = sample_book();
    // Both 1.e4 c5 2.Nf3 and 1.e4 e5 2.Nf3 reach K9.
    let earlier = book.insert_move("K2", "K9", "Nf3").unwrap();
    let later = book.insert_move("K3", "K9", "Nf3").unwrap();

    assert_eq!(later.outcome, InsertOutcome::CreatedTransposed);
    // Key lookup answers only with the later insertion.
    assert_eq!(book.find_by_key("K9"), Some(later.node));
    assert_ne!(book.find_by_key("K9"), Some(earlier.node));
    // The earlier path still resolves to a node carrying K9.
    let via_c5 = book.find_by_path(&["e4", "c5", "Nf3"]).unwrap();
    assert_eq!(via_c5, earlier.node);
    assert_eq!(book.node(via_c5).position_key(), "K9");
}

#[test]
fn test_insert_at_resolved_node_survives_index_reclaim() {
    let mut book = sample_book();
    book.insert_move("K2", "K9", "Nf3").unwrap();
    book.insert_move("K3", "K9", "Nf3").unwrap();
    // K9's index entry now points at the e5 line. An insertion addressed
    // by the node resolved from the c5 path must stay on the c5 line.
    let earlier = book.find_by_path(&["e4", "c5", "Nf3"]).unwrap();
    let ins = book.insert_move_at(earlier, "K10", "d6");
    assert_eq!(book.node(ins.node).parent(), Some(earlier));
    assert_eq!(book.find_by_path(&["e4", "c5", "Nf3", "d6"]), Some(ins.node));
    assert_eq!(book.find_by_path(&["e4", "e5", "Nf3", "d6"]), None);
}

#[test]
fn test_transposition_does_not_collapse_to_dag() {
    let mut book = sample_book();
    book.insert_move("K2", "K9", "Nf3").unwrap();
    book.insert_move("K3", "K9", "Nf3").unwrap();
    // Two distinct tree locations, one key.
    let holders: Vec<_> = book
        .breadth_first()
        .filter(|&id| book.node(id).position_key() == "K9")
        .collect();
    assert_eq!(holders.len(), 2);
}

// =============================================================================
// Snapshot Fidelity
// =============================================================================

#[test]
fn test_round_trip_preserves_annotations_and_order() {
    let mut book = sample_book();
    let sicilian = book.find_by_path(&["e4", "c5"]).unwrap();
    book.set_comment(sicilian, "sharpest reply");
    book.add_label(sicilian, "mainline");
    book.add_label(sicilian, "sicilian");

    let body = book.serialize().unwrap();
    let rebuilt = Repertoire::try_deserialize(&body, "K0").unwrap();

    assert_eq!(rebuilt.root_key(), "K0");
    assert_eq!(rebuilt.node_count(), book.node_count());
    for id in book.breadth_first() {
        let path = book.path_to(id);
        let twin = rebuilt.find_by_path(&path).expect("line lost in round-trip");
        assert_eq!(
            rebuilt.node(twin).position_key(),
            book.node(id).position_key()
        );
        assert_eq!(rebuilt.node(twin).comment(), book.node(id).comment());
        assert_eq!(rebuilt.node(twin).labels(), book.node(id).labels());
    }
    assert_sibling_uniqueness(&rebuilt);
}

#[test]
fn test_snapshot_parent_identity_is_key_and_move_pair() {
    let book = sample_book();
    let snapshot = book.to_snapshot();
    for record in &snapshot.nodes {
        if record.move_label == ROOT_MOVE {
            assert!(record.parent.is_none());
        } else {
            let parent = record.parent.as_ref().expect("non-root without parent");
            assert!(!parent.position_key.is_empty());
            assert!(!parent.move_label.is_empty());
        }
    }
}

#[test]
fn test_deserialize_relinks_idempotently() {
    // A snapshot with the same attachment recorded twice must not create
    // duplicate children.
    let book = sample_book();
    let mut snapshot = book.to_snapshot();
    let duplicate = snapshot
        .nodes
        .iter()
        .find(|r| r.move_label == "c5")
        .unwrap()
        .clone();
    snapshot.nodes.push(duplicate);
    let body = serde_json::to_string(&snapshot).unwrap();

    let rebuilt = Repertoire::try_deserialize(&body, "K0").unwrap();
    let e4 = rebuilt.find_by_path(&["e4"]).unwrap();
    let c5_children = rebuilt
        .node(e4)
        .children()
        .iter()
        .filter(|&&c| rebuilt.node(c).move_label() == "c5")
        .count();
    assert_eq!(c5_children, 1);
}

#[test]
fn test_attach_restamps_each_records_own_move_label() {
    // Two records share one position key under different move labels, as
    // a transposed snapshot can produce. During materialization the later
    // record claims the key, so attaching the earlier record resolves to
    // the later record's node; the attach must stamp the earlier record's
    // own label on it, or the line would come back under the wrong move.
    let mut snapshot = Repertoire::new("K0").to_snapshot();
    snapshot.nodes.push(record("KX", "Nf3", Some(("K0", ROOT_MOVE))));
    snapshot.nodes.push(record("KX", "Bc4", None));
    let body = serde_json::to_string(&snapshot).unwrap();

    let rebuilt = Repertoire::try_deserialize(&body, "K0").unwrap();
    let linked = rebuilt.find_by_path(&["Nf3"]).expect("line lost");
    assert_eq!(rebuilt.node(linked).position_key(), "KX");
    assert_eq!(rebuilt.find_by_path(&["Bc4"]), None);
}

#[test]
fn test_deserialize_rebuilds_index_from_reachability() {
    let book = sample_book();
    let mut snapshot = book.to_snapshot();
    // An orphan record whose parent never materializes.
    snapshot
        .nodes
        .push(record("K-orphan", "Qh5", Some(("K-gone", "g4"))));
    let body = serde_json::to_string(&snapshot).unwrap();

    let rebuilt = Repertoire::try_deserialize(&body, "K0").unwrap();
    // The orphan is not reachable, so the index must not answer for it.
    assert_eq!(rebuilt.find_by_key("K-orphan"), None);
}

// =============================================================================
// Degradation
// =============================================================================

#[test]
fn test_empty_and_malformed_input_yield_usable_trees() {
    for input in ["", "   ", "not json at all", "{\"nodes\": {}}", "[1,2,3]"] {
        let book = Repertoire::deserialize(input, "K0");
        assert!(book.is_empty());
        assert_eq!(book.root_key(), "K0");
        // The fresh tree is immediately usable.
        let mut book = book;
        book.insert_move("K0", "K1", "e4").unwrap();
    }
}

#[test]
fn test_root_mismatch_is_explicit_then_degrades() {
    let body = sample_book().serialize().unwrap();
    match Repertoire::try_deserialize(&body, "DIFFERENT") {
        Err(BookError::RootMismatch { expected, found }) => {
            assert_eq!(expected, "DIFFERENT");
            assert_eq!(found, "K0");
        }
        other => panic!("expected RootMismatch, got {other:?}"),
    }
    assert!(Repertoire::deserialize(&body, "DIFFERENT").is_empty());
}

// =============================================================================
// Persistence Contract
// =============================================================================

#[test]
fn test_store_round_trip_memory() {
    let mut store = MemoryStore::new();
    let book = sample_book();
    book.save_to(&mut store, "book").unwrap();

    let loaded = Repertoire::load_from(&store, "book", "K0");
    assert_eq!(loaded.node_count(), 4);
    assert!(loaded.find_by_path(&["e4", "e5"]).is_some());
}

#[test]
fn test_store_round_trip_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = DirStore::new(dir.path());
    let book = sample_book();
    book.save_to(&mut store, "book").unwrap();
    assert!(dir.path().join("book.json").exists());

    let loaded = Repertoire::load_from(&store, "book", "K0");
    assert_eq!(loaded.node_count(), 4);
}

#[test]
fn test_load_always_returns_usable_tree() {
    // Missing key: first run.
    let store = MemoryStore::new();
    let book = Repertoire::load_from(&store, "book", "K0");
    assert!(book.is_empty());
    assert_eq!(book.root_key(), "K0");

    // Corrupted value: degrade, never propagate.
    let mut store = MemoryStore::new();
    store.set("book", "corrupted {{{").unwrap();
    let book = Repertoire::load_from(&store, "book", "K0");
    assert!(book.is_empty());
}

// =============================================================================
// Round-Trip Property
// =============================================================================

mod round_trip_property {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        // Any conflict-free tree built through insert_move survives a
        // serialize/deserialize cycle with every line intact.
        #[test]
        fn prop_round_trip_preserves_every_line(
            parents in proptest::collection::vec(0usize..1000, 0..40)
        ) {
            let mut book = Repertoire::new("R");
            let mut keys = vec!["R".to_string()];
            for (i, p) in parents.iter().enumerate() {
                let parent_key = keys[p % keys.len()].clone();
                let key = format!("K{i}");
                let ins = book.insert_move(&parent_key, &key, &format!("m{i}")).unwrap();
                prop_assert_eq!(ins.outcome, InsertOutcome::Created);
                keys.push(key);
            }

            let body = book.serialize().unwrap();
            let rebuilt = Repertoire::try_deserialize(&body, "R").unwrap();

            prop_assert_eq!(rebuilt.node_count(), book.node_count());
            for id in book.breadth_first() {
                let path = book.path_to(id);
                let twin = rebuilt.find_by_path(&path);
                prop_assert!(twin.is_some());
                prop_assert_eq!(
                    rebuilt.node(twin.unwrap()).position_key(),
                    book.node(id).position_key()
                );
            }
        }
    }
}
