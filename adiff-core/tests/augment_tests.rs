mod common;

use adiff_core::{reconstruct, Augmenter, Batch, Diagnostic, Diagnostics, Resolution, Side};
use adiff_store::MemorySnapshot;
use adiff_types::{
    ElementBody, ElementKey, ElementKind, ElementState, Location, Member, MemberGeometry,
    Operation,
};
use common::{
    loc, make_node_record, make_relation_record, make_snapshot, make_stored_way, make_way_record,
};
use pretty_assertions::assert_eq;

fn way_locations(element: &ElementState) -> Vec<Option<Location>> {
    match &element.body {
        ElementBody::Way { nodes } => nodes.iter().map(|n| n.location).collect(),
        _ => panic!("expected a way"),
    }
}

fn member_geometry(element: &ElementState) -> Vec<MemberGeometry> {
    match &element.body {
        ElementBody::Relation { members } => members.iter().map(|m| m.geometry.clone()).collect(),
        _ => panic!("expected a relation"),
    }
}

// ── Ways ─────────────────────────────────────────────────────────

#[test]
fn old_side_reads_store_and_new_side_prefers_batch() {
    let store = make_snapshot();
    let mut diagnostics = Diagnostics::new();
    let batch = Batch::deduplicate(
        vec![
            make_node_record(Operation::Modify, 2, 2, Some(loc(9.0, 9.0))),
            make_way_record(Operation::Modify, 10, 4, &[1, 2, 3]),
        ],
        &mut diagnostics,
    );
    let augmenter = Augmenter::new(&store, &batch);

    let mut old = ElementState::way(10, [1, 2, 3]);
    let mut new = old.clone();
    assert_eq!(augmenter.augment(&mut old, Side::Old).unwrap(), Resolution::Complete);
    assert_eq!(augmenter.augment(&mut new, Side::New).unwrap(), Resolution::Complete);

    assert_eq!(
        way_locations(&old),
        vec![Some(loc(0.0, 0.0)), Some(loc(1.0, 1.0)), Some(loc(2.0, 2.0))]
    );
    assert_eq!(
        way_locations(&new),
        vec![Some(loc(0.0, 0.0)), Some(loc(9.0, 9.0)), Some(loc(2.0, 2.0))]
    );
}

#[test]
fn created_nodes_resolve_on_new_side() {
    let store = make_snapshot();
    let mut diagnostics = Diagnostics::new();
    let batch = Batch::deduplicate(
        vec![
            make_node_record(Operation::Create, -1, 1, Some(loc(-1.0, 4.0))),
            make_way_record(Operation::Create, -2, 1, &[-1, 1]),
        ],
        &mut diagnostics,
    );
    let augmenter = Augmenter::new(&store, &batch);
    let mut way = ElementState::way(-2, [-1, 1]);
    augmenter.augment(&mut way, Side::New).unwrap();
    assert_eq!(way_locations(&way), vec![Some(loc(-1.0, 4.0)), Some(loc(0.0, 0.0))]);
}

#[test]
fn deleted_node_falls_back_to_store_on_new_side() {
    let store = make_snapshot();
    let mut diagnostics = Diagnostics::new();
    let batch = Batch::deduplicate(
        vec![make_node_record(Operation::Delete, 2, 2, Some(loc(9.0, 9.0)))],
        &mut diagnostics,
    );
    let augmenter = Augmenter::new(&store, &batch);
    let mut way = ElementState::way(10, [2]);
    augmenter.augment(&mut way, Side::New).unwrap();
    assert_eq!(way_locations(&way), vec![Some(loc(1.0, 1.0))]);
}

#[test]
fn missing_node_stops_and_keeps_resolved_prefix() {
    let store = make_snapshot();
    let batch = Batch::default();
    let augmenter = Augmenter::new(&store, &batch);
    let mut way = ElementState::way(12, [1, 404, 2]);
    assert_eq!(
        augmenter.augment(&mut way, Side::Old).unwrap(),
        Resolution::Missing(ElementKey::node(404))
    );
    assert_eq!(way_locations(&way), vec![Some(loc(0.0, 0.0)), None, None]);
}

// ── Relations ────────────────────────────────────────────────────

#[test]
fn relation_members_get_points_and_lines() {
    let store = make_snapshot();
    let mut diagnostics = Diagnostics::new();
    let batch = Batch::deduplicate(
        vec![make_way_record(Operation::Modify, 10, 4, &[3, 2])],
        &mut diagnostics,
    );
    let augmenter = Augmenter::new(&store, &batch);
    let members = vec![
        Member::new(ElementKind::Way, 10, "outer"),
        Member::new(ElementKind::Node, 4, "label"),
        Member::new(ElementKind::Relation, 21, "sub"),
    ];

    let mut old = ElementState::relation(20, members.clone());
    let mut new = ElementState::relation(20, members);
    augmenter.augment(&mut old, Side::Old).unwrap();
    augmenter.augment(&mut new, Side::New).unwrap();

    assert_eq!(
        member_geometry(&old),
        vec![
            MemberGeometry::Line(vec![loc(0.0, 0.0), loc(1.0, 1.0), loc(2.0, 2.0)]),
            MemberGeometry::Point(loc(3.0, 3.0)),
            MemberGeometry::Unresolved,
        ]
    );
    assert_eq!(
        member_geometry(&new),
        vec![
            MemberGeometry::Line(vec![loc(2.0, 2.0), loc(1.0, 1.0)]),
            MemberGeometry::Point(loc(3.0, 3.0)),
            MemberGeometry::Unresolved,
        ]
    );
}

#[test]
fn way_member_deleted_in_batch_is_empty_on_new_side() {
    let store = make_snapshot();
    let mut diagnostics = Diagnostics::new();
    let batch = Batch::deduplicate(
        vec![
            make_relation_record(
                Operation::Modify,
                20,
                2,
                &[(ElementKind::Way, 10, "outer"), (ElementKind::Node, 4, "label")],
            ),
            make_way_record(Operation::Delete, 10, 4, &[]),
        ],
        &mut diagnostics,
    );
    let augmenter = Augmenter::new(&store, &batch);
    let members = vec![
        Member::new(ElementKind::Way, 10, "outer"),
        Member::new(ElementKind::Node, 4, "label"),
    ];

    let mut old = ElementState::relation(20, members.clone());
    let mut new = ElementState::relation(20, members);
    assert_eq!(augmenter.augment(&mut old, Side::Old).unwrap(), Resolution::Complete);
    assert_eq!(augmenter.augment(&mut new, Side::New).unwrap(), Resolution::Complete);

    assert_eq!(
        member_geometry(&old),
        vec![
            MemberGeometry::Line(vec![loc(0.0, 0.0), loc(1.0, 1.0), loc(2.0, 2.0)]),
            MemberGeometry::Point(loc(3.0, 3.0)),
        ]
    );
    assert_eq!(
        member_geometry(&new),
        vec![MemberGeometry::Line(Vec::new()), MemberGeometry::Point(loc(3.0, 3.0))]
    );
}

#[test]
fn missing_way_member_is_reported() {
    let store = make_snapshot();
    let batch = Batch::default();
    let augmenter = Augmenter::new(&store, &batch);
    let mut relation = ElementState::relation(30, vec![Member::new(ElementKind::Way, 404, "")]);
    assert_eq!(
        augmenter.augment(&mut relation, Side::Old).unwrap(),
        Resolution::Missing(ElementKey::way(404))
    );
}

#[test]
fn way_member_with_missing_node_is_reported() {
    let store = MemorySnapshot::new().with_way(make_stored_way(10, &[1]));
    let batch = Batch::default();
    let augmenter = Augmenter::new(&store, &batch);
    let mut relation = ElementState::relation(30, vec![Member::new(ElementKind::Way, 10, "")]);
    assert_eq!(
        augmenter.augment(&mut relation, Side::Old).unwrap(),
        Resolution::Missing(ElementKey::node(1))
    );
}

// ── Actions ──────────────────────────────────────────────────────

#[test]
fn incomplete_old_side_skips_new_side() {
    let store = MemorySnapshot::new()
        .with_node(common::make_stored_node(1, 0.0, 0.0))
        .with_way(make_stored_way(10, &[1, 2]));
    let mut diagnostics = Diagnostics::new();
    let batch = Batch::deduplicate(
        vec![make_way_record(Operation::Modify, 10, 4, &[1])],
        &mut diagnostics,
    );
    let mut actions = reconstruct(&batch, &store, &mut diagnostics).unwrap();
    let augmenter = Augmenter::new(&store, &batch);

    let resolution = augmenter.augment_action(&mut actions[0], &mut diagnostics).unwrap();
    assert_eq!(resolution, Resolution::Missing(ElementKey::node(2)));
    assert_eq!(
        diagnostics.into_vec(),
        vec![Diagnostic::IncompleteGeometry {
            key: ElementKey::way(10),
            side: Side::Old,
            missing: ElementKey::node(2),
        }]
    );
    let new = actions[0].new.as_ref().unwrap();
    assert_eq!(way_locations(new), vec![None]);
}

#[test]
fn delete_augments_old_side_only() {
    let store = make_snapshot();
    let mut diagnostics = Diagnostics::new();
    let batch = Batch::deduplicate(
        vec![make_relation_record(Operation::Delete, 21, 3, &[])],
        &mut diagnostics,
    );
    let mut actions = reconstruct(&batch, &store, &mut diagnostics).unwrap();
    let augmenter = Augmenter::new(&store, &batch);
    augmenter.augment_action(&mut actions[0], &mut diagnostics).unwrap();

    let old = actions[0].old.as_ref().unwrap();
    assert_eq!(
        member_geometry(old),
        vec![MemberGeometry::Line(vec![loc(2.0, 2.0), loc(3.0, 3.0)])]
    );
    assert!(diagnostics.is_empty());
}
