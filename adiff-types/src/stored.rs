//! Elements as held by the snapshot store.
//!
//! These are the current (pre-batch) versions. The reconstructor turns them
//! into [`ElementState`]s for the old side of a diff.

use crate::{EditMetadata, ElementKind, ElementState, Location, Member, Tags};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredNode {
    pub id: i64,
    pub location: Location,
    pub version: u64,
    /// `None` when the store keeps no edit metadata for the node.
    pub metadata: Option<EditMetadata>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredWay {
    pub id: i64,
    pub version: u64,
    pub metadata: Option<EditMetadata>,
    pub nodes: Vec<i64>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMember {
    pub kind: ElementKind,
    pub id: i64,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRelation {
    pub id: i64,
    pub version: u64,
    pub metadata: Option<EditMetadata>,
    pub members: Vec<StoredMember>,
    pub tags: Tags,
}

impl From<StoredNode> for ElementState {
    fn from(node: StoredNode) -> Self {
        Self {
            version: Some(node.version),
            metadata: node.metadata.unwrap_or_default(),
            tags: node.tags,
            ..Self::node(node.id, Some(node.location))
        }
    }
}

impl From<StoredWay> for ElementState {
    fn from(way: StoredWay) -> Self {
        Self {
            version: Some(way.version),
            metadata: way.metadata.unwrap_or_default(),
            tags: way.tags,
            ..Self::way(way.id, way.nodes)
        }
    }
}

impl From<StoredRelation> for ElementState {
    fn from(relation: StoredRelation) -> Self {
        let members = relation
            .members
            .into_iter()
            .map(|m| Member::new(m.kind, m.id, m.role))
            .collect();
        Self {
            version: Some(relation.version),
            metadata: relation.metadata.unwrap_or_default(),
            tags: relation.tags,
            ..Self::relation(relation.id, members)
        }
    }
}
