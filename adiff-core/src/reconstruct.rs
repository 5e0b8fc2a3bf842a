//! Old/new state reconstruction.
//!
//! The new side of an action comes from the change record. The old side
//! is rebuilt from the store snapshot, which holds each element as it was
//! before the batch.

use crate::{Action, AugmentResult, Batch, Diagnostic, Diagnostics};
use adiff_store::{Snapshot, StoreResult};
use adiff_types::{ElementKey, ElementKind, ElementState, Operation};
use tracing::debug;

/// Loads an element's current version from the store.
pub fn load_current<S: Snapshot>(store: &S, key: ElementKey) -> StoreResult<Option<ElementState>> {
    Ok(match key.kind {
        ElementKind::Node => store.node(key.id)?.map(ElementState::from),
        ElementKind::Way => store.way(key.id)?.map(ElementState::from),
        ElementKind::Relation => store.relation(key.id)?.map(ElementState::from),
    })
}

/// Builds one action per deduplicated record, in key order.
///
/// A modify of an element the store does not have becomes a create. A
/// delete of such an element keeps a bare old side carrying only the id.
pub fn reconstruct<S: Snapshot>(
    batch: &Batch,
    store: &S,
    diagnostics: &mut Diagnostics,
) -> AugmentResult<Vec<Action>> {
    let mut actions = Vec::with_capacity(batch.len());
    for record in batch.records() {
        let key = record.key();
        let element = record.element.clone();
        let action = match record.operation {
            Operation::Create => Action::create(element),
            Operation::Modify => match load_current(store, key)? {
                Some(old) => Action::change(Operation::Modify, old, element),
                None => {
                    diagnostics.push(Diagnostic::ReclassifiedAsCreate { key });
                    Action::create(element)
                }
            },
            Operation::Delete => {
                let old = match load_current(store, key)? {
                    Some(old) => old,
                    None => {
                        diagnostics.push(Diagnostic::MissingPriorVersion { key });
                        ElementState::bare(key)
                    }
                };
                let mut new = element;
                new.visible = Some(false);
                new.strip_children();
                Action::change(Operation::Delete, old, new)
            }
        };
        actions.push(action);
    }
    debug!("Reconstructed {} actions", actions.len());
    Ok(actions)
}
