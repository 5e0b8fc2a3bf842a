//! Point-in-time element store for the augmented diff generator.
//!
//! The diff pipeline reads the state of the map as it was immediately before
//! a batch of changes. This crate provides that view:
//!
//! - [`Snapshot`]: the read-only adapter every pipeline stage talks to.
//!   Element lookup by id (each carrying its current version and edit
//!   metadata) and the three reverse-reference indices (node→ways, node→relations,
//!   way→relations).
//! - [`ElementStore`] / [`SqliteSnapshot`]: a SQLite-backed store. A run
//!   opens it read-only and holds one read transaction for its whole
//!   duration, so every lookup sees the same snapshot.
//! - [`MemorySnapshot`]: an in-memory implementation for tests and small
//!   fixtures.
//!
//! Absence is never an error: lookups return `Ok(None)` (or an empty list)
//! and the caller decides whether to skip or fail.

mod error;
mod memory;
mod sqlite;

pub use error::{StoreError, StoreResult};
pub use memory::MemorySnapshot;
pub use sqlite::{ElementStore, ImportStats, SqliteSnapshot};

use adiff_types::{Location, StoredNode, StoredRelation, StoredWay};

/// Read-only view of the element store as of the start of a batch.
pub trait Snapshot {
    /// Looks up a node, with its tags and metadata.
    fn node(&self, id: i64) -> StoreResult<Option<StoredNode>>;

    /// Looks up a way, with its ordered node list and tags.
    fn way(&self, id: i64) -> StoreResult<Option<StoredWay>>;

    /// Looks up a relation, with its ordered member list and tags.
    fn relation(&self, id: i64) -> StoreResult<Option<StoredRelation>>;

    /// Looks up only a node's location.
    fn location(&self, id: i64) -> StoreResult<Option<Location>>;

    /// Ways containing the node, ascending.
    fn node_ways(&self, node_id: i64) -> StoreResult<Vec<i64>>;

    /// Relations with the node as a direct member, ascending.
    fn node_relations(&self, node_id: i64) -> StoreResult<Vec<i64>>;

    /// Relations with the way as a member, ascending.
    fn way_relations(&self, way_id: i64) -> StoreResult<Vec<i64>>;

}

impl<S: Snapshot + ?Sized> Snapshot for &S {
    fn node(&self, id: i64) -> StoreResult<Option<StoredNode>> {
        (**self).node(id)
    }

    fn way(&self, id: i64) -> StoreResult<Option<StoredWay>> {
        (**self).way(id)
    }

    fn relation(&self, id: i64) -> StoreResult<Option<StoredRelation>> {
        (**self).relation(id)
    }

    fn location(&self, id: i64) -> StoreResult<Option<Location>> {
        (**self).location(id)
    }

    fn node_ways(&self, node_id: i64) -> StoreResult<Vec<i64>> {
        (**self).node_ways(node_id)
    }

    fn node_relations(&self, node_id: i64) -> StoreResult<Vec<i64>> {
        (**self).node_relations(node_id)
    }

    fn way_relations(&self, way_id: i64) -> StoreResult<Vec<i64>> {
        (**self).way_relations(way_id)
    }
}
