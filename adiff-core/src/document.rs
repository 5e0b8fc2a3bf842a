//! The finished augmented diff.

use crate::{write_document, AugmentConfig, AugmentResult, DiffAction, Diagnostic, Origin};
use adiff_types::ElementKey;

/// Actions in output order, plus everything recorded along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AugmentedDiff {
    pub actions: Vec<DiffAction>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AugmentedDiff {
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Looks up the action for an element. Actions are sorted by key.
    #[must_use]
    pub fn get(&self, key: ElementKey) -> Option<&DiffAction> {
        self.actions
            .binary_search_by_key(&key, |action| action.key)
            .ok()
            .map(|index| &self.actions[index])
    }

    /// Actions synthesized for containers of changed elements.
    pub fn propagated(&self) -> impl Iterator<Item = &DiffAction> {
        self.actions
            .iter()
            .filter(|action| action.origin == Origin::Propagated)
    }

    /// Serializes the document into a buffer.
    pub fn to_xml(&self, config: &AugmentConfig) -> AugmentResult<Vec<u8>> {
        let mut buffer = Vec::new();
        write_document(self, config, &mut buffer)?;
        Ok(buffer)
    }
}
