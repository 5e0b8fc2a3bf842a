//! Element state and change records.
//!
//! An [`ElementState`] is one side (old or new) of a changed element. It
//! starts out as parsed or reconstructed data and is enriched in place by
//! the augmenter (resolved coordinates) and the finalizer (bounds).

use crate::{Bounds, ElementKey, ElementKind, Location, Operation, Tags};
use serde::{Deserialize, Serialize};

/// Who changed an element, when, and in which changeset.
///
/// Every field is optional: change lists may omit any of them and the
/// store does not keep them for every element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditMetadata {
    pub user: Option<String>,
    pub uid: Option<u64>,
    /// ISO-8601 UTC timestamp, e.g. `2024-01-02T03:04:05Z`.
    pub timestamp: Option<String>,
    pub changeset: Option<u64>,
}

impl EditMetadata {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.uid.is_none() && self.timestamp.is_none() && self.changeset.is_none()
    }
}

/// A node reference inside a way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: i64,
    /// Filled in by the augmenter.
    pub location: Option<Location>,
}

impl NodeRef {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self { id, location: None }
    }
}

/// Resolved geometry of a relation member.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberGeometry {
    #[default]
    Unresolved,
    /// Location of a node member.
    Point(Location),
    /// Expanded node locations of a way member.
    Line(Vec<Location>),
}

/// A relation member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub kind: ElementKind,
    pub id: i64,
    pub role: String,
    pub geometry: MemberGeometry,
}

impl Member {
    #[must_use]
    pub fn new(kind: ElementKind, id: i64, role: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            role: role.into(),
            geometry: MemberGeometry::Unresolved,
        }
    }
}

/// Kind-specific content of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementBody {
    Node { location: Option<Location> },
    Way { nodes: Vec<NodeRef> },
    Relation { members: Vec<Member> },
}

impl ElementBody {
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Node { .. } => ElementKind::Node,
            Self::Way { .. } => ElementKind::Way,
            Self::Relation { .. } => ElementKind::Relation,
        }
    }

    /// An empty body of the given kind.
    #[must_use]
    pub const fn empty(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Node => Self::Node { location: None },
            ElementKind::Way => Self::Way { nodes: Vec::new() },
            ElementKind::Relation => Self::Relation {
                members: Vec::new(),
            },
        }
    }
}

/// One side of a changed element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementState {
    pub id: i64,
    pub version: Option<u64>,
    /// `Some(false)` marks the new side of a deletion.
    pub visible: Option<bool>,
    pub metadata: EditMetadata,
    pub body: ElementBody,
    pub tags: Tags,
    /// Attached by the finalizer.
    pub bounds: Option<Bounds>,
}

impl ElementState {
    /// A bare element carrying only its identity.
    #[must_use]
    pub fn bare(key: ElementKey) -> Self {
        Self {
            id: key.id,
            version: None,
            visible: None,
            metadata: EditMetadata::default(),
            body: ElementBody::empty(key.kind),
            tags: Tags::new(),
            bounds: None,
        }
    }

    /// A node at the given location.
    #[must_use]
    pub fn node(id: i64, location: Option<Location>) -> Self {
        Self {
            body: ElementBody::Node { location },
            ..Self::bare(ElementKey::node(id))
        }
    }

    /// A way over the given node ids, coordinates unresolved.
    #[must_use]
    pub fn way(id: i64, node_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            body: ElementBody::Way {
                nodes: node_ids.into_iter().map(NodeRef::new).collect(),
            },
            ..Self::bare(ElementKey::way(id))
        }
    }

    /// A relation with the given members.
    #[must_use]
    pub fn relation(id: i64, members: Vec<Member>) -> Self {
        Self {
            body: ElementBody::Relation { members },
            ..Self::bare(ElementKey::relation(id))
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.body.kind()
    }

    #[must_use]
    pub const fn key(&self) -> ElementKey {
        ElementKey::new(self.kind(), self.id)
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible != Some(false)
    }

    /// The node's own location, `None` for ways and relations.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        match &self.body {
            ElementBody::Node { location } => *location,
            _ => None,
        }
    }

    /// Node ids of a way, in order. Empty for other kinds.
    #[must_use]
    pub fn node_ids(&self) -> Vec<i64> {
        match &self.body {
            ElementBody::Way { nodes } => nodes.iter().map(|n| n.id).collect(),
            _ => Vec::new(),
        }
    }

    /// Drops tags and kind-specific children, keeping identity and metadata.
    pub fn strip_children(&mut self) {
        self.tags.clear();
        self.body = ElementBody::empty(self.kind());
    }

    /// Every resolved point-level coordinate below this element: way node
    /// refs, node members and expanded way members. A node's own location
    /// is not included.
    #[must_use]
    pub fn member_locations(&self) -> Vec<Location> {
        match &self.body {
            ElementBody::Node { .. } => Vec::new(),
            ElementBody::Way { nodes } => nodes.iter().filter_map(|n| n.location).collect(),
            ElementBody::Relation { members } => members
                .iter()
                .flat_map(|m| match &m.geometry {
                    MemberGeometry::Unresolved => Vec::new(),
                    MemberGeometry::Point(loc) => vec![*loc],
                    MemberGeometry::Line(locs) => locs.clone(),
                })
                .collect(),
        }
    }
}

/// One parsed entry of a change list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub operation: Operation,
    pub element: ElementState,
}

impl ChangeRecord {
    #[must_use]
    pub const fn new(operation: Operation, element: ElementState) -> Self {
        Self { operation, element }
    }

    #[must_use]
    pub const fn key(&self) -> ElementKey {
        self.element.key()
    }

    /// The record's version; records without one sort below every version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.element.version.unwrap_or(0)
    }
}
