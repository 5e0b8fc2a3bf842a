//! Shared fixtures for pipeline tests.

#![allow(dead_code)]

use adiff_store::MemorySnapshot;
use adiff_types::{
    ChangeRecord, EditMetadata, ElementKey, ElementKind, ElementState, Location, Member,
    Operation, StoredMember, StoredNode, StoredRelation, StoredWay, Tags,
};

pub fn loc(lat: f64, lon: f64) -> Location {
    Location::from_degrees(lat, lon).unwrap()
}

pub fn make_metadata(changeset: u64) -> EditMetadata {
    EditMetadata {
        user: Some("mapper".into()),
        uid: Some(7),
        timestamp: Some("2024-01-02T03:04:05Z".into()),
        changeset: Some(changeset),
    }
}

pub fn make_stored_node(id: i64, lat: f64, lon: f64) -> StoredNode {
    StoredNode {
        id,
        location: loc(lat, lon),
        version: 1,
        metadata: None,
        tags: Tags::new(),
    }
}

pub fn make_stored_way(id: i64, nodes: &[i64]) -> StoredWay {
    StoredWay {
        id,
        version: 3,
        metadata: Some(make_metadata(500)),
        nodes: nodes.to_vec(),
        tags: [("highway", "path")].into_iter().collect(),
    }
}

pub fn make_stored_relation(id: i64, members: &[(ElementKind, i64, &str)]) -> StoredRelation {
    StoredRelation {
        id,
        version: 2,
        metadata: Some(make_metadata(600)),
        members: members
            .iter()
            .map(|&(kind, id, role)| StoredMember {
                kind,
                id,
                role: role.to_string(),
            })
            .collect(),
        tags: [("type", "multipolygon")].into_iter().collect(),
    }
}

/// Nodes 1..=4 on a diagonal, way 10 over 1-2-3, way 11 over 3-4,
/// relation 20 holding way 10 and node 4, relation 21 holding way 11.
pub fn make_snapshot() -> MemorySnapshot {
    MemorySnapshot::new()
        .with_node(make_stored_node(1, 0.0, 0.0))
        .with_node(make_stored_node(2, 1.0, 1.0))
        .with_node(make_stored_node(3, 2.0, 2.0))
        .with_node(make_stored_node(4, 3.0, 3.0))
        .with_way(make_stored_way(10, &[1, 2, 3]))
        .with_way(make_stored_way(11, &[3, 4]))
        .with_relation(make_stored_relation(
            20,
            &[(ElementKind::Way, 10, "outer"), (ElementKind::Node, 4, "label")],
        ))
        .with_relation(make_stored_relation(21, &[(ElementKind::Way, 11, "outer")]))
}

pub fn make_node_record(operation: Operation, id: i64, version: u64, location: Option<Location>) -> ChangeRecord {
    let mut element = ElementState::node(id, location);
    element.version = Some(version);
    element.metadata = make_metadata(900);
    ChangeRecord::new(operation, element)
}

pub fn make_way_record(operation: Operation, id: i64, version: u64, nodes: &[i64]) -> ChangeRecord {
    let mut element = ElementState::way(id, nodes.iter().copied());
    element.version = Some(version);
    element.metadata = make_metadata(900);
    element.tags.insert("highway", "path");
    ChangeRecord::new(operation, element)
}

pub fn make_relation_record(
    operation: Operation,
    id: i64,
    version: u64,
    members: &[(ElementKind, i64, &str)],
) -> ChangeRecord {
    let members = members
        .iter()
        .map(|&(kind, id, role)| Member::new(kind, id, role))
        .collect();
    let mut element = ElementState::relation(id, members);
    element.version = Some(version);
    element.metadata = make_metadata(900);
    ChangeRecord::new(operation, element)
}

/// A bare record carrying only identity and version.
pub fn make_bare_record(operation: Operation, key: ElementKey, version: u64) -> ChangeRecord {
    let mut element = ElementState::bare(key);
    element.version = Some(version);
    ChangeRecord::new(operation, element)
}
