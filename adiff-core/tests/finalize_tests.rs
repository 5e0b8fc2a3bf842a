mod common;

use adiff_core::{attach_bounds, finalize, Action, DiffBody, Origin};
use adiff_types::{
    Bounds, ElementBody, ElementKey, ElementKind, ElementState, Location, Member, MemberGeometry,
    NodeRef, Operation,
};
use common::loc;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn make_resolved_way(id: i64, refs: &[(i64, Location)]) -> ElementState {
    let mut way = ElementState::way(id, refs.iter().map(|(node_id, _)| *node_id));
    if let ElementBody::Way { nodes } = &mut way.body {
        for (node, (_, location)) in nodes.iter_mut().zip(refs) {
            node.location = Some(*location);
        }
    }
    way
}

// ── Bounds ───────────────────────────────────────────────────────

#[test]
fn bounds_enclose_every_ref() {
    let way = make_resolved_way(1, &[(1, loc(2.0, 1.0)), (2, loc(-1.0, 3.0))]);
    let mut action = Action::change(Operation::Modify, way.clone(), way);
    attach_bounds(&mut action);

    let bounds = action.old.as_ref().unwrap().bounds.unwrap();
    assert_eq!(bounds.min_lon(), 1.0);
    assert_eq!(bounds.max_lon(), 3.0);
    assert_eq!(bounds.min_lat(), -1.0);
    assert_eq!(bounds.max_lat(), 2.0);
    assert_eq!(action.new.as_ref().unwrap().bounds, None);
}

#[test]
fn node_actions_get_no_bounds() {
    let node = ElementState::node(1, Some(loc(1.0, 1.0)));
    let mut action = Action::change(Operation::Modify, node.clone(), node);
    attach_bounds(&mut action);
    assert_eq!(action.old.unwrap().bounds, None);
    assert_eq!(action.new.unwrap().bounds, None);
}

#[test]
fn create_uses_new_side() {
    let mut action = Action::create(make_resolved_way(-1, &[(-2, loc(5.0, 6.0))]));
    attach_bounds(&mut action);
    assert_eq!(
        action.new.unwrap().bounds,
        Some(Bounds::at(loc(5.0, 6.0)))
    );
}

#[test]
fn delete_uses_old_side() {
    let old = make_resolved_way(1, &[(1, loc(0.0, 0.0)), (2, loc(1.0, 1.0))]);
    let mut new = ElementState::bare(ElementKey::way(1));
    new.visible = Some(false);
    let mut action = Action::change(Operation::Delete, old, new);
    attach_bounds(&mut action);
    assert_eq!(
        action.old.unwrap().bounds,
        Bounds::from_locations([loc(0.0, 0.0), loc(1.0, 1.0)])
    );
    assert_eq!(action.new.unwrap().bounds, None);
}

#[test]
fn unresolved_old_side_falls_back_to_new() {
    let old = ElementState::way(1, [1, 2]);
    let new = make_resolved_way(1, &[(1, loc(4.0, 4.0))]);
    let mut action = Action::change(Operation::Modify, old, new);
    attach_bounds(&mut action);
    assert_eq!(action.old.unwrap().bounds, None);
    assert_eq!(action.new.unwrap().bounds, Some(Bounds::at(loc(4.0, 4.0))));
}

#[test]
fn relation_bounds_cover_points_and_lines() {
    let mut line = Member::new(ElementKind::Way, 5, "outer");
    line.geometry = MemberGeometry::Line(vec![loc(0.0, 0.0), loc(1.0, 2.0)]);
    let mut point = Member::new(ElementKind::Node, 6, "label");
    point.geometry = MemberGeometry::Point(loc(-3.0, 1.0));
    let relation = ElementState::relation(9, vec![line, point]);
    let mut action = Action::create(relation);
    attach_bounds(&mut action);

    let bounds = action.new.unwrap().bounds.unwrap();
    assert_eq!(bounds.min(), loc(-3.0, 0.0));
    assert_eq!(bounds.max(), loc(1.0, 2.0));
}

#[test]
fn no_coordinates_no_bounds() {
    let mut action = Action::create(ElementState::way(1, [1]));
    attach_bounds(&mut action);
    assert_eq!(action.new.unwrap().bounds, None);
}

// ── Shape ────────────────────────────────────────────────────────

#[test]
fn create_has_a_single_element() {
    let element = ElementState::node(-1, Some(loc(0.0, 0.0)));
    let finalized = finalize(vec![Action::create(element.clone())]);
    assert_eq!(finalized.len(), 1);
    assert_eq!(finalized[0].body, DiffBody::Create(element));
    assert!(finalized[0].old_state().is_none());
}

#[test]
fn modify_and_delete_keep_both_sides() {
    let way = ElementState::way(1, [1]);
    let finalized = finalize(vec![Action::change(Operation::Delete, way.clone(), way.clone())]);
    assert_eq!(
        finalized[0].body,
        DiffBody::Change {
            old: way.clone(),
            new: way,
        }
    );
}

#[test]
fn propagated_origin_survives() {
    let way = make_resolved_way(3, &[(1, loc(0.0, 0.0))]);
    let finalized = finalize(vec![Action::propagated(way.clone(), way)]);
    assert_eq!(finalized[0].origin, Origin::Propagated);
    assert_eq!(finalized[0].bounds(), Some(Bounds::at(loc(0.0, 0.0))));
}

#[test]
fn inconsistent_action_is_dropped() {
    let mut action = Action::create(ElementState::node(1, None));
    action.new = None;
    assert!(finalize(vec![action]).is_empty());
}

// ── Ordering ─────────────────────────────────────────────────────

#[test]
fn kinds_sort_before_ids() {
    let finalized = finalize(vec![
        Action::create(ElementState::relation(1, Vec::new())),
        Action::create(ElementState::way(2, Vec::new())),
        Action::create(ElementState::node(30, None)),
        Action::create(ElementState::node(4, None)),
        Action::create(ElementState::node(-5, None)),
    ]);
    let keys: Vec<ElementKey> = finalized.iter().map(|a| a.key).collect();
    assert_eq!(
        keys,
        vec![
            ElementKey::node(-5),
            ElementKey::node(4),
            ElementKey::node(30),
            ElementKey::way(2),
            ElementKey::relation(1),
        ]
    );
}

fn make_action(kind: usize, id: i64) -> Action {
    let element = match kind {
        0 => ElementState::node(id, None),
        1 => ElementState::way(id, [id]),
        _ => ElementState::relation(id, Vec::new()),
    };
    Action::create(element)
}

proptest! {
    #[test]
    fn output_is_sorted_by_kind_then_id(
        entries in prop::collection::vec((0usize..3, -50i64..50), 0..60)
    ) {
        let actions: Vec<Action> = entries.iter().map(|&(kind, id)| make_action(kind, id)).collect();
        let finalized = finalize(actions);
        prop_assert_eq!(finalized.len(), entries.len());
        for pair in finalized.windows(2) {
            let (a, b) = (pair[0].key, pair[1].key);
            prop_assert!((a.kind, a.id) <= (b.kind, b.id));
        }
    }

    #[test]
    fn nodes_precede_ways_precede_relations(
        entries in prop::collection::vec((0usize..3, -50i64..50), 1..60)
    ) {
        let actions: Vec<Action> = entries.iter().map(|&(kind, id)| make_action(kind, id)).collect();
        let kinds: Vec<ElementKind> = finalize(actions).iter().map(|a| a.key.kind).collect();
        let mut sorted = kinds.clone();
        sorted.sort();
        prop_assert_eq!(kinds, sorted);
    }
}

#[test]
fn node_ref_locations_are_untouched_by_finalize() {
    let way = make_resolved_way(1, &[(1, loc(1.0, 1.0))]);
    let finalized = finalize(vec![Action::create(way)]);
    let ElementBody::Way { nodes } = &finalized[0].new_state().body else {
        panic!("expected a way");
    };
    assert_eq!(nodes, &vec![NodeRef { id: 1, location: Some(loc(1.0, 1.0)) }]);
}
