//! Action deduplication.
//!
//! A change list may touch the same element several times. Only the record
//! with the highest version describes the element's state after the batch,
//! so every other record is dropped here. The surviving records, keyed and
//! ordered by [`ElementKey`], double as the batch index the later stages
//! consult for in-batch geometry.

use crate::{Diagnostic, Diagnostics};
use adiff_types::{ChangeRecord, ElementBody, ElementKey, Location, NodeRef, Operation};
use std::collections::btree_map::{self, BTreeMap};
use tracing::debug;

/// The deduplicated batch: one record per element.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    records: BTreeMap<ElementKey, ChangeRecord>,
}

impl Batch {
    /// Collapses records to one per key.
    ///
    /// A higher version replaces a lower one regardless of order. A lower
    /// version arriving later is discarded with a
    /// [`Diagnostic::VersionRegression`]; an equal version keeps the first
    /// record with a [`Diagnostic::DuplicateVersion`].
    pub fn deduplicate<I>(records: I, diagnostics: &mut Diagnostics) -> Self
    where
        I: IntoIterator<Item = ChangeRecord>,
    {
        let mut batch = Self::default();
        let mut seen = 0usize;
        for record in records {
            seen += 1;
            match batch.records.entry(record.key()) {
                btree_map::Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                btree_map::Entry::Occupied(mut slot) => {
                    let kept = slot.get().version();
                    let incoming = record.version();
                    if incoming > kept {
                        slot.insert(record);
                    } else if incoming < kept {
                        diagnostics.push(Diagnostic::VersionRegression {
                            key: *slot.key(),
                            kept,
                            discarded: incoming,
                        });
                    } else {
                        diagnostics.push(Diagnostic::DuplicateVersion {
                            key: *slot.key(),
                            version: kept,
                        });
                    }
                }
            }
        }
        debug!("Deduplicated {} records to {}", seen, batch.records.len());
        batch
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, key: ElementKey) -> Option<&ChangeRecord> {
        self.records.get(&key)
    }

    /// True if the element is explicit in the batch, under any operation.
    #[must_use]
    pub fn contains(&self, key: ElementKey) -> bool {
        self.records.contains_key(&key)
    }

    /// The records in key order.
    pub fn records(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.values()
    }

    /// Location a create or modify in this batch gives the node.
    #[must_use]
    pub fn edited_location(&self, node_id: i64) -> Option<Location> {
        self.edited(ElementKey::node(node_id))
            .and_then(|record| record.element.location())
    }

    /// Node list a create or modify in this batch gives the way.
    #[must_use]
    pub fn edited_way_nodes(&self, way_id: i64) -> Option<&[NodeRef]> {
        match &self.edited(ElementKey::way(way_id))?.element.body {
            ElementBody::Way { nodes } => Some(nodes),
            _ => None,
        }
    }

    /// True if the batch deletes the element.
    #[must_use]
    pub fn deletes(&self, key: ElementKey) -> bool {
        self.records
            .get(&key)
            .is_some_and(|record| record.operation == Operation::Delete)
    }

    fn edited(&self, key: ElementKey) -> Option<&ChangeRecord> {
        self.records
            .get(&key)
            .filter(|record| record.operation != Operation::Delete)
    }
}

impl IntoIterator for Batch {
    type Item = ChangeRecord;
    type IntoIter = btree_map::IntoValues<ElementKey, ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_values()
    }
}
