mod common;

use adiff_core::{Batch, Diagnostic, Diagnostics};
use adiff_types::{ElementKey, ElementKind, Operation};
use common::{loc, make_bare_record, make_node_record, make_way_record};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeMap;

fn dedup(records: Vec<adiff_types::ChangeRecord>) -> (Batch, Vec<Diagnostic>) {
    let mut diagnostics = Diagnostics::new();
    let batch = Batch::deduplicate(records, &mut diagnostics);
    (batch, diagnostics.into_vec())
}

// ── Version selection ────────────────────────────────────────────

#[test]
fn higher_version_replaces_lower() {
    let (batch, diagnostics) = dedup(vec![
        make_node_record(Operation::Modify, 1, 2, Some(loc(0.0, 0.0))),
        make_node_record(Operation::Modify, 1, 3, Some(loc(1.0, 1.0))),
    ]);
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.get(ElementKey::node(1)).unwrap().version(), 3);
    assert!(diagnostics.is_empty());
}

#[test]
fn later_lower_version_is_discarded_with_diagnostic() {
    let (batch, diagnostics) = dedup(vec![
        make_node_record(Operation::Modify, 1, 5, Some(loc(1.0, 1.0))),
        make_node_record(Operation::Modify, 1, 4, Some(loc(0.0, 0.0))),
    ]);
    assert_eq!(batch.get(ElementKey::node(1)).unwrap().version(), 5);
    assert_eq!(
        diagnostics,
        vec![Diagnostic::VersionRegression {
            key: ElementKey::node(1),
            kept: 5,
            discarded: 4,
        }]
    );
}

#[test]
fn equal_versions_keep_the_first_record() {
    let (batch, diagnostics) = dedup(vec![
        make_node_record(Operation::Modify, 1, 2, Some(loc(1.0, 1.0))),
        make_node_record(Operation::Modify, 1, 2, Some(loc(5.0, 5.0))),
    ]);
    assert_eq!(batch.edited_location(1), Some(loc(1.0, 1.0)));
    assert_eq!(
        diagnostics,
        vec![Diagnostic::DuplicateVersion {
            key: ElementKey::node(1),
            version: 2,
        }]
    );
}

#[test]
fn same_id_different_kinds_are_distinct() {
    let (batch, _) = dedup(vec![
        make_bare_record(Operation::Modify, ElementKey::node(7), 1),
        make_bare_record(Operation::Modify, ElementKey::way(7), 1),
        make_bare_record(Operation::Modify, ElementKey::relation(7), 1),
    ]);
    assert_eq!(batch.len(), 3);
}

#[test]
fn records_iterate_in_key_order() {
    let (batch, _) = dedup(vec![
        make_bare_record(Operation::Modify, ElementKey::relation(1), 1),
        make_bare_record(Operation::Modify, ElementKey::node(9), 1),
        make_bare_record(Operation::Modify, ElementKey::way(3), 1),
        make_bare_record(Operation::Modify, ElementKey::node(2), 1),
    ]);
    let keys: Vec<ElementKey> = batch.records().map(|r| r.key()).collect();
    assert_eq!(
        keys,
        vec![
            ElementKey::node(2),
            ElementKey::node(9),
            ElementKey::way(3),
            ElementKey::relation(1),
        ]
    );
}

// ── Batch index ──────────────────────────────────────────────────

#[test]
fn edited_geometry_comes_from_create_and_modify() {
    let (batch, _) = dedup(vec![
        make_node_record(Operation::Create, -1, 1, Some(loc(4.0, 5.0))),
        make_way_record(Operation::Modify, 10, 4, &[1, -1]),
    ]);
    assert_eq!(batch.edited_location(-1), Some(loc(4.0, 5.0)));
    let nodes: Vec<i64> = batch.edited_way_nodes(10).unwrap().iter().map(|n| n.id).collect();
    assert_eq!(nodes, vec![1, -1]);
    assert!(batch.contains(ElementKey::way(10)));
    assert!(!batch.contains(ElementKey::way(-1)));
}

#[test]
fn deletes_supply_no_geometry() {
    let (batch, _) = dedup(vec![
        make_node_record(Operation::Delete, 1, 2, Some(loc(4.0, 5.0))),
        make_way_record(Operation::Delete, 10, 4, &[1, 2]),
    ]);
    assert!(batch.contains(ElementKey::node(1)));
    assert_eq!(batch.edited_location(1), None);
    assert!(batch.edited_way_nodes(10).is_none());
    assert!(batch.deletes(ElementKey::way(10)));
    assert!(!batch.deletes(ElementKey::way(11)));
}

// ── Properties ───────────────────────────────────────────────────

fn record_strategy() -> impl Strategy<Value = (usize, i64, u64)> {
    (0usize..3, 0i64..6, 1u64..8)
}

proptest! {
    #[test]
    fn one_record_per_key_with_max_version(entries in prop::collection::vec(record_strategy(), 0..40)) {
        let kinds = [ElementKind::Node, ElementKind::Way, ElementKind::Relation];
        let records: Vec<_> = entries
            .iter()
            .map(|&(kind, id, version)| {
                make_bare_record(Operation::Modify, ElementKey::new(kinds[kind], id), version)
            })
            .collect();

        let mut expected: BTreeMap<ElementKey, u64> = BTreeMap::new();
        for record in &records {
            let slot = expected.entry(record.key()).or_insert(0);
            *slot = (*slot).max(record.version());
        }

        let (batch, _) = dedup(records);
        let actual: BTreeMap<ElementKey, u64> =
            batch.records().map(|r| (r.key(), r.version())).collect();
        prop_assert_eq!(batch.len(), expected.len());
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn order_of_records_does_not_change_versions(
        entries in prop::collection::vec(record_strategy(), 0..30)
    ) {
        let kinds = [ElementKind::Node, ElementKind::Way, ElementKind::Relation];
        let make = |entries: &[(usize, i64, u64)]| {
            entries
                .iter()
                .map(|&(kind, id, version)| {
                    make_bare_record(Operation::Modify, ElementKey::new(kinds[kind], id), version)
                })
                .collect::<Vec<_>>()
        };
        let mut reversed = entries.clone();
        reversed.reverse();

        let (forward, _) = dedup(make(&entries));
        let (backward, _) = dedup(make(&reversed));
        let forward: Vec<_> = forward.records().map(|r| (r.key(), r.version())).collect();
        let backward: Vec<_> = backward.records().map(|r| (r.key(), r.version())).collect();
        prop_assert_eq!(forward, backward);
    }
}
