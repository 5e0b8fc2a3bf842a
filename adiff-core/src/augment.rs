//! Geometry augmentation.
//!
//! Resolves coordinates below ways and relations. The old side always
//! reads the store. The new side prefers geometry edited in the batch and
//! falls back to the store for elements the batch did not touch. A node
//! deleted in the batch still resolves from the store; a deleted way does
//! not.

use crate::{Action, AugmentResult, Batch, Diagnostic, Diagnostics};
use adiff_store::Snapshot;
use adiff_types::{ElementBody, ElementKey, ElementKind, ElementState, Location, MemberGeometry};
use std::fmt;
use tracing::debug;

/// Which side of an action is being augmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Old => "old",
            Self::New => "new",
        })
    }
}

/// Outcome of augmenting one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Complete,
    /// Stopped at the first element that could not be found.
    Missing(ElementKey),
}

/// Resolves geometry against a store snapshot and the batch index.
pub struct Augmenter<'a, S> {
    store: &'a S,
    batch: &'a Batch,
}

impl<'a, S: Snapshot> Augmenter<'a, S> {
    pub fn new(store: &'a S, batch: &'a Batch) -> Self {
        Self { store, batch }
    }

    pub fn store(&self) -> &'a S {
        self.store
    }

    pub fn batch(&self) -> &'a Batch {
        self.batch
    }

    /// Augments both sides of an action, old first.
    ///
    /// On the first unresolvable reference augmentation stops, resolved
    /// coordinates are kept, and an [`Diagnostic::IncompleteGeometry`] is
    /// recorded.
    pub fn augment_action(&self, action: &mut Action, diagnostics: &mut Diagnostics) -> AugmentResult<Resolution> {
        let key = action.key;
        for (side, state) in [(Side::Old, action.old.as_mut()), (Side::New, action.new.as_mut())] {
            let Some(state) = state else { continue };
            if let Resolution::Missing(missing) = self.augment(state, side)? {
                diagnostics.push(Diagnostic::IncompleteGeometry { key, side, missing });
                return Ok(Resolution::Missing(missing));
            }
        }
        Ok(Resolution::Complete)
    }

    /// Fills in node-ref locations of a way, or member geometry of a
    /// relation. Nodes need nothing; relation members of relations stay
    /// unresolved.
    pub fn augment(&self, element: &mut ElementState, side: Side) -> AugmentResult<Resolution> {
        match &mut element.body {
            ElementBody::Node { .. } => {}
            ElementBody::Way { nodes } => {
                for node in nodes.iter_mut() {
                    match self.resolve_node(node.id, side)? {
                        Some(location) => node.location = Some(location),
                        None => return Ok(Resolution::Missing(ElementKey::node(node.id))),
                    }
                }
            }
            ElementBody::Relation { members } => {
                for member in members.iter_mut() {
                    match member.kind {
                        ElementKind::Node => match self.resolve_node(member.id, side)? {
                            Some(location) => member.geometry = MemberGeometry::Point(location),
                            None => return Ok(Resolution::Missing(ElementKey::node(member.id))),
                        },
                        ElementKind::Way => match self.expand_way(member.id, side)? {
                            Ok(line) => member.geometry = MemberGeometry::Line(line),
                            Err(missing) => return Ok(Resolution::Missing(missing)),
                        },
                        ElementKind::Relation => {}
                    }
                }
            }
        }
        Ok(Resolution::Complete)
    }

    fn resolve_node(&self, id: i64, side: Side) -> AugmentResult<Option<Location>> {
        if side == Side::New {
            if let Some(location) = self.batch.edited_location(id) {
                return Ok(Some(location));
            }
        }
        Ok(self.store.location(id)?)
    }

    /// Expands a way member into the locations of its nodes. The inner
    /// `Err` names the way or node that could not be found.
    ///
    /// On the new side a way deleted in the batch has no nodes left and
    /// expands to an empty line.
    fn expand_way(&self, id: i64, side: Side) -> AugmentResult<Result<Vec<Location>, ElementKey>> {
        let edited = match side {
            Side::New if self.batch.deletes(ElementKey::way(id)) => return Ok(Ok(Vec::new())),
            Side::New => self.batch.edited_way_nodes(id),
            Side::Old => None,
        };
        let node_ids: Vec<i64> = match edited {
            Some(nodes) => nodes.iter().map(|n| n.id).collect(),
            None => match self.store.way(id)? {
                Some(way) => way.nodes,
                None => return Ok(Err(ElementKey::way(id))),
            },
        };

        let mut line = Vec::with_capacity(node_ids.len());
        for node_id in node_ids {
            match self.resolve_node(node_id, side)? {
                Some(location) => line.push(location),
                None => {
                    debug!("way/{} member node/{} not found on {} side", id, node_id, side);
                    return Ok(Err(ElementKey::node(node_id)));
                }
            }
        }
        Ok(Ok(line))
    }
}
