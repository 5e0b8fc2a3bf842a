//! In-memory snapshot.

use crate::{Snapshot, StoreResult};
use adiff_types::{ElementKind, Location, StoredNode, StoredRelation, StoredWay};
use std::collections::{BTreeMap, BTreeSet};

/// A [`Snapshot`] held entirely in ordered maps.
///
/// Reverse indices are maintained on insert, the same way the SQLite store
/// derives them from its reference tables.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    nodes: BTreeMap<i64, StoredNode>,
    ways: BTreeMap<i64, StoredWay>,
    relations: BTreeMap<i64, StoredRelation>,
    node_ways: BTreeMap<i64, BTreeSet<i64>>,
    node_relations: BTreeMap<i64, BTreeSet<i64>>,
    way_relations: BTreeMap<i64, BTreeSet<i64>>,
}

impl MemorySnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a node.
    pub fn insert_node(&mut self, node: StoredNode) {
        self.nodes.insert(node.id, node);
    }

    /// Inserts or replaces a way, updating the node→way index.
    pub fn insert_way(&mut self, way: StoredWay) {
        if let Some(previous) = self.ways.remove(&way.id) {
            for node_id in &previous.nodes {
                remove_ref(&mut self.node_ways, *node_id, way.id);
            }
        }
        for node_id in &way.nodes {
            self.node_ways.entry(*node_id).or_default().insert(way.id);
        }
        self.ways.insert(way.id, way);
    }

    /// Inserts or replaces a relation, updating the node→relation and
    /// way→relation indices.
    pub fn insert_relation(&mut self, relation: StoredRelation) {
        if let Some(previous) = self.relations.remove(&relation.id) {
            for member in &previous.members {
                if let Some(index) = self.index_for(member.kind) {
                    remove_ref(index, member.id, relation.id);
                }
            }
        }
        for member in &relation.members {
            if let Some(index) = self.index_for(member.kind) {
                index.entry(member.id).or_default().insert(relation.id);
            }
        }
        self.relations.insert(relation.id, relation);
    }

    /// Builder form of [`insert_node`](Self::insert_node).
    pub fn with_node(mut self, node: StoredNode) -> Self {
        self.insert_node(node);
        self
    }

    /// Builder form of [`insert_way`](Self::insert_way).
    pub fn with_way(mut self, way: StoredWay) -> Self {
        self.insert_way(way);
        self
    }

    /// Builder form of [`insert_relation`](Self::insert_relation).
    pub fn with_relation(mut self, relation: StoredRelation) -> Self {
        self.insert_relation(relation);
        self
    }

    fn index_for(&mut self, kind: ElementKind) -> Option<&mut BTreeMap<i64, BTreeSet<i64>>> {
        match kind {
            ElementKind::Node => Some(&mut self.node_relations),
            ElementKind::Way => Some(&mut self.way_relations),
            ElementKind::Relation => None,
        }
    }
}

fn remove_ref(index: &mut BTreeMap<i64, BTreeSet<i64>>, from: i64, to: i64) {
    if let Some(set) = index.get_mut(&from) {
        set.remove(&to);
        if set.is_empty() {
            index.remove(&from);
        }
    }
}

fn lookup(index: &BTreeMap<i64, BTreeSet<i64>>, id: i64) -> Vec<i64> {
    index
        .get(&id)
        .map(|set| set.iter().copied().collect())
        .unwrap_or_default()
}

impl Snapshot for MemorySnapshot {
    fn node(&self, id: i64) -> StoreResult<Option<StoredNode>> {
        Ok(self.nodes.get(&id).cloned())
    }

    fn way(&self, id: i64) -> StoreResult<Option<StoredWay>> {
        Ok(self.ways.get(&id).cloned())
    }

    fn relation(&self, id: i64) -> StoreResult<Option<StoredRelation>> {
        Ok(self.relations.get(&id).cloned())
    }

    fn location(&self, id: i64) -> StoreResult<Option<Location>> {
        Ok(self.nodes.get(&id).map(|n| n.location))
    }

    fn node_ways(&self, node_id: i64) -> StoreResult<Vec<i64>> {
        Ok(lookup(&self.node_ways, node_id))
    }

    fn node_relations(&self, node_id: i64) -> StoreResult<Vec<i64>> {
        Ok(lookup(&self.node_relations, node_id))
    }

    fn way_relations(&self, way_id: i64) -> StoreResult<Vec<i64>> {
        Ok(lookup(&self.way_relations, way_id))
    }
}
