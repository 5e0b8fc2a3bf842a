//! Intermediate actions passed between pipeline stages.

use adiff_types::{ElementKey, ElementState, Operation};

/// Where an action came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Listed in the change list.
    Explicit,
    /// Synthesized as context for a changed member.
    Propagated,
}

/// One element's change, before finalization.
///
/// Create actions have no old state. Modify and delete actions have both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub operation: Operation,
    pub key: ElementKey,
    pub old: Option<ElementState>,
    pub new: Option<ElementState>,
    pub origin: Origin,
}

impl Action {
    #[must_use]
    pub fn create(element: ElementState) -> Self {
        Self {
            operation: Operation::Create,
            key: element.key(),
            old: None,
            new: Some(element),
            origin: Origin::Explicit,
        }
    }

    #[must_use]
    pub fn change(operation: Operation, old: ElementState, new: ElementState) -> Self {
        Self {
            operation,
            key: new.key(),
            old: Some(old),
            new: Some(new),
            origin: Origin::Explicit,
        }
    }

    /// A context `modify` for an element the batch did not touch.
    #[must_use]
    pub fn propagated(old: ElementState, new: ElementState) -> Self {
        Self {
            origin: Origin::Propagated,
            ..Self::change(Operation::Modify, old, new)
        }
    }
}
