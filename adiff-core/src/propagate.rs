//! Propagation of changes to containers.
//!
//! Moving a node changes the shape of every way and relation that holds
//! it, and reordering a way's nodes changes every relation that holds the
//! way. Containers the batch did not touch get a synthesized `modify` so a
//! reviewer sees the geometric effect. Tag-only edits never propagate.

use crate::{
    load_current, Action, AugmentResult, Augmenter, Diagnostic, Diagnostics, Origin, Resolution,
    Side, SkipReason,
};
use adiff_store::Snapshot;
use adiff_types::{ElementKey, ElementKind, ElementState, Operation};
use std::collections::BTreeSet;
use tracing::debug;

/// Containers affected by a batch, excluding everything explicit in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Affected {
    pub ways: BTreeSet<i64>,
    pub relations: BTreeSet<i64>,
}

/// Finds the containers whose geometry the explicit actions change.
pub fn find_affected<S: Snapshot>(actions: &[Action], augmenter: &Augmenter<'_, S>) -> AugmentResult<Affected> {
    let store = augmenter.store();
    let batch = augmenter.batch();
    let mut affected = Affected::default();

    let explicit_modifies = actions
        .iter()
        .filter(|a| a.origin == Origin::Explicit && a.operation == Operation::Modify);
    for action in explicit_modifies {
        let (Some(old), Some(new)) = (&action.old, &action.new) else {
            continue;
        };
        let id = action.key.id;
        match action.key.kind {
            ElementKind::Node => {
                let moved = matches!(
                    (old.location(), new.location()),
                    (Some(before), Some(after)) if before != after
                );
                if !moved {
                    continue;
                }
                for way_id in store.node_ways(id)? {
                    if batch.contains(ElementKey::way(way_id)) {
                        continue;
                    }
                    affected.ways.insert(way_id);
                    for relation_id in store.way_relations(way_id)? {
                        if !batch.contains(ElementKey::relation(relation_id)) {
                            affected.relations.insert(relation_id);
                        }
                    }
                }
                for relation_id in store.node_relations(id)? {
                    if !batch.contains(ElementKey::relation(relation_id)) {
                        affected.relations.insert(relation_id);
                    }
                }
            }
            ElementKind::Way => {
                if old.node_ids() == new.node_ids() {
                    continue;
                }
                for relation_id in store.way_relations(id)? {
                    if !batch.contains(ElementKey::relation(relation_id)) {
                        affected.relations.insert(relation_id);
                    }
                }
            }
            ElementKind::Relation => {}
        }
    }
    Ok(affected)
}

/// Synthesizes propagated actions for every affected container, ways
/// first, each in ascending id order.
pub fn propagate<S: Snapshot>(
    actions: &[Action],
    augmenter: &Augmenter<'_, S>,
    diagnostics: &mut Diagnostics,
) -> AugmentResult<Vec<Action>> {
    let affected = find_affected(actions, augmenter)?;
    debug!(
        "Propagating to {} ways and {} relations",
        affected.ways.len(),
        affected.relations.len()
    );

    let keys = affected
        .ways
        .iter()
        .map(|&id| ElementKey::way(id))
        .chain(affected.relations.iter().map(|&id| ElementKey::relation(id)));

    let mut propagated = Vec::new();
    for key in keys {
        let Some(current) = load_current(augmenter.store(), key)? else {
            diagnostics.push(Diagnostic::PropagationSkipped {
                key,
                reason: SkipReason::NotInStore,
            });
            continue;
        };
        if let Some(action) = synthesize(current, augmenter, diagnostics)? {
            propagated.push(action);
        }
    }
    Ok(propagated)
}

/// Uses the current version as both sides and augments them separately,
/// so batch edits to members show on the new side only.
fn synthesize<S: Snapshot>(
    current: ElementState,
    augmenter: &Augmenter<'_, S>,
    diagnostics: &mut Diagnostics,
) -> AugmentResult<Option<Action>> {
    let key = current.key();
    let mut old = current.clone();
    let mut new = current;
    for (side, state) in [(Side::Old, &mut old), (Side::New, &mut new)] {
        if let Resolution::Missing(missing) = augmenter.augment(state, side)? {
            diagnostics.push(Diagnostic::PropagationSkipped {
                key,
                reason: SkipReason::Unresolved(missing),
            });
            return Ok(None);
        }
    }
    Ok(Some(Action::propagated(old, new)))
}
