//! OSM extract parsing, for loading an element store.

use crate::reader::{walk, Layout};
use crate::{OscError, OscResult};
use adiff_types::{
    ElementBody, ElementState, StoredMember, StoredNode, StoredRelation, StoredWay,
};
use tracing::debug;

/// Elements of an OSM extract, in document order per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsmData {
    pub nodes: Vec<StoredNode>,
    pub ways: Vec<StoredWay>,
    pub relations: Vec<StoredRelation>,
}

/// Parses an `<osm>` document.
///
/// Nodes must carry a location. A missing version is read as 1, which is
/// what hand-written fixtures usually mean.
pub fn parse_osm(xml: &str) -> OscResult<OsmData> {
    let mut data = OsmData::default();
    walk(xml, Layout::Extract, |_, element| {
        store_element(&mut data, element)
    })?;
    debug!(
        "Parsed extract: {} nodes, {} ways, {} relations",
        data.nodes.len(),
        data.ways.len(),
        data.relations.len()
    );
    Ok(data)
}

fn store_element(data: &mut OsmData, element: ElementState) -> OscResult<()> {
    let key = element.key();
    let version = element.version.unwrap_or(1);
    let metadata = (!element.metadata.is_empty()).then_some(element.metadata);
    match element.body {
        ElementBody::Node { location } => {
            let location =
                location.ok_or_else(|| OscError::Malformed(format!("{key} has no location")))?;
            data.nodes.push(StoredNode {
                id: element.id,
                location,
                version,
                metadata,
                tags: element.tags,
            });
        }
        ElementBody::Way { nodes } => data.ways.push(StoredWay {
            id: element.id,
            version,
            metadata,
            nodes: nodes.into_iter().map(|n| n.id).collect(),
            tags: element.tags,
        }),
        ElementBody::Relation { members } => data.relations.push(StoredRelation {
            id: element.id,
            version,
            metadata,
            members: members
                .into_iter()
                .map(|m| StoredMember {
                    kind: m.kind,
                    id: m.id,
                    role: m.role,
                })
                .collect(),
            tags: element.tags,
        }),
    }
    Ok(())
}
