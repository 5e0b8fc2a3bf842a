//! Bounds, ordering and output shape.

use crate::{Action, Origin};
use adiff_types::{Bounds, ElementKey, ElementKind, ElementState, Operation};
use tracing::debug;

/// Content of a finalized action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffBody {
    /// A created element, written as the action's only child.
    Create(ElementState),
    /// A modified or deleted element, written as `<old>` and `<new>`.
    Change { old: ElementState, new: ElementState },
}

/// One action of the finished document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffAction {
    pub operation: Operation,
    pub key: ElementKey,
    pub origin: Origin,
    pub body: DiffBody,
}

impl DiffAction {
    #[must_use]
    pub fn old_state(&self) -> Option<&ElementState> {
        match &self.body {
            DiffBody::Create(_) => None,
            DiffBody::Change { old, .. } => Some(old),
        }
    }

    #[must_use]
    pub fn new_state(&self) -> &ElementState {
        match &self.body {
            DiffBody::Create(element) => element,
            DiffBody::Change { new, .. } => new,
        }
    }

    /// Bounds attached to whichever side carries them.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        self.old_state()
            .and_then(|old| old.bounds)
            .or(self.new_state().bounds)
    }
}

/// Attaches the bounding box of an action's point-level coordinates.
///
/// The old side is used when present, visible and resolved; otherwise the
/// new side when visible. Node actions get no bounds.
pub fn attach_bounds(action: &mut Action) {
    if action.key.kind == ElementKind::Node {
        return;
    }
    if let Some(old) = action.old.as_mut().filter(|old| old.is_visible()) {
        if let Some(bounds) = Bounds::from_locations(old.member_locations()) {
            old.bounds = Some(bounds);
            return;
        }
    }
    if let Some(new) = action.new.as_mut().filter(|new| new.is_visible()) {
        new.bounds = Bounds::from_locations(new.member_locations());
    }
}

/// Attaches bounds, sorts by kind then id, and gives creates their single
/// child shape.
pub fn finalize(actions: Vec<Action>) -> Vec<DiffAction> {
    let mut finalized: Vec<DiffAction> = actions
        .into_iter()
        .filter_map(|mut action| {
            attach_bounds(&mut action);
            into_diff_action(action)
        })
        .collect();
    finalized.sort_by_key(|action| action.key);
    finalized
}

fn into_diff_action(action: Action) -> Option<DiffAction> {
    let body = match (action.operation, action.old, action.new) {
        (Operation::Create, _, Some(new)) => DiffBody::Create(new),
        (Operation::Modify | Operation::Delete, Some(old), Some(new)) => DiffBody::Change { old, new },
        _ => {
            debug!("Dropping {} {} without the states it needs", action.operation, action.key);
            return None;
        }
    };
    Some(DiffAction {
        operation: action.operation,
        key: action.key,
        origin: action.origin,
        body,
    })
}
