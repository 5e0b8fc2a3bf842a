//! Shared event walker for OSM-flavoured XML.
//!
//! Both osmChange and OSM documents are a root element holding `node`,
//! `way` and `relation` elements, either directly (OSM) or grouped into
//! `create`/`modify`/`delete` buckets (osmChange). The walker builds an
//! [`ElementState`] per element and hands it to a callback.

use crate::{OscError, OscResult};
use adiff_types::{
    EditMetadata, ElementBody, ElementKey, ElementKind, ElementState, Location, Member, NodeRef,
    Operation,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

/// Document layout to expect.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Layout {
    /// `<osmChange>` with operation buckets.
    Change,
    /// `<osm>` with elements directly under the root.
    Extract,
}

impl Layout {
    fn root(self) -> &'static [u8] {
        match self {
            Self::Change => b"osmChange",
            Self::Extract => b"osm",
        }
    }
}

/// Walks the document, calling `on_element` for every complete element.
///
/// The operation is `Some` for osmChange documents and `None` for extracts.
pub(crate) fn walk<F>(xml: &str, layout: Layout, mut on_element: F) -> OscResult<()>
where
    F: FnMut(Option<Operation>, ElementState) -> OscResult<()>,
{
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut seen_root = false;
    let mut root_closed = false;
    let mut bucket: Option<Operation> = None;
    let mut current: Option<ElementState> = None;
    // Depth inside an element subtree being skipped.
    let mut skip_depth = 0usize;

    loop {
        let (start, empty) = match reader.read_event()? {
            Event::Start(e) => (e, false),
            Event::Empty(e) => (e, true),
            Event::End(_) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                } else if let Some(element) = current.take() {
                    on_element(bucket, element)?;
                } else if bucket.is_some() {
                    bucket = None;
                } else {
                    root_closed = true;
                }
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        if skip_depth > 0 {
            if !empty {
                skip_depth += 1;
            }
            continue;
        }
        if root_closed {
            return Err(OscError::Malformed("content after the root element".into()));
        }

        let name = start.local_name();
        let name = name.as_ref();

        if !seen_root {
            if name != layout.root() {
                return Err(OscError::Malformed(format!(
                    "expected <{}> root, found <{}>",
                    String::from_utf8_lossy(layout.root()),
                    String::from_utf8_lossy(name)
                )));
            }
            seen_root = true;
            root_closed = empty;
            continue;
        }

        if let Some(element) = current.as_mut() {
            // Children of an element: tag / nd / member.
            read_child(element, name, &start)?;
            if !empty {
                skip_depth = 1;
            }
            continue;
        }

        if matches!(layout, Layout::Change) && bucket.is_none() {
            let operation = match name {
                b"create" => Operation::Create,
                b"modify" => Operation::Modify,
                b"delete" => Operation::Delete,
                other => {
                    return Err(OscError::Malformed(format!(
                        "unknown change bucket <{}>",
                        String::from_utf8_lossy(other)
                    )));
                }
            };
            if !empty {
                bucket = Some(operation);
            }
            continue;
        }

        let Some(kind) = element_kind(name) else {
            debug!("Skipping <{}>", String::from_utf8_lossy(name));
            if !empty {
                skip_depth = 1;
            }
            continue;
        };
        let element = read_element(kind, &start, bucket)?;
        if empty {
            on_element(bucket, element)?;
        } else {
            current = Some(element);
        }
    }

    if !seen_root {
        return Err(OscError::Malformed("document has no root element".into()));
    }
    if current.is_some() || bucket.is_some() || !root_closed {
        return Err(OscError::Malformed("unexpected end of document".into()));
    }
    Ok(())
}

fn element_kind(name: &[u8]) -> Option<ElementKind> {
    match name {
        b"node" => Some(ElementKind::Node),
        b"way" => Some(ElementKind::Way),
        b"relation" => Some(ElementKind::Relation),
        _ => None,
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str, context: &str) -> OscResult<T> {
    value
        .parse()
        .map_err(|_| OscError::Malformed(format!("{context}: invalid {what} {value:?}")))
}

fn read_element(
    kind: ElementKind,
    start: &BytesStart<'_>,
    operation: Option<Operation>,
) -> OscResult<ElementState> {
    let mut id: Option<i64> = None;
    let mut version: Option<u64> = None;
    let mut visible: Option<bool> = None;
    let mut metadata = EditMetadata::default();
    let mut lat: Option<String> = None;
    let mut lon: Option<String> = None;

    let context = kind.as_str();
    for attr in start.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?;
        match attr.key.as_ref() {
            b"id" => id = Some(parse_number(&value, "id", context)?),
            b"version" => version = Some(parse_number(&value, "version", context)?),
            b"visible" => {
                visible = Some(match value.as_ref() {
                    "true" => true,
                    "false" => false,
                    other => {
                        return Err(OscError::Malformed(format!(
                            "{context}: invalid visible {other:?}"
                        )));
                    }
                });
            }
            b"user" => metadata.user = Some(value.to_string()),
            b"uid" => metadata.uid = Some(parse_number(&value, "uid", context)?),
            b"timestamp" => metadata.timestamp = Some(value.to_string()),
            b"changeset" => metadata.changeset = Some(parse_number(&value, "changeset", context)?),
            b"lat" => lat = Some(value.to_string()),
            b"lon" => lon = Some(value.to_string()),
            other => debug!(
                "Skipping attribute {} on <{}>",
                String::from_utf8_lossy(other),
                context
            ),
        }
    }

    let id = id.ok_or_else(|| OscError::Malformed(format!("<{context}> without id")))?;
    let key = ElementKey::new(kind, id);
    if version.is_none() && matches!(operation, Some(Operation::Modify | Operation::Delete)) {
        return Err(OscError::Malformed(format!("{key} without version")));
    }

    let location = match (lat, lon) {
        (Some(lat), Some(lon)) => Some(Location::parse(&lat, &lon)?),
        (None, None) => None,
        _ => {
            return Err(OscError::Malformed(format!("{key} has only one of lat/lon")));
        }
    };
    if location.is_some() && kind != ElementKind::Node {
        debug!("Ignoring lat/lon on {}", key);
    }

    let mut element = ElementState::bare(key);
    element.version = version;
    element.visible = visible;
    element.metadata = metadata;
    if let ElementBody::Node { location: slot } = &mut element.body {
        *slot = location;
    }
    Ok(element)
}

fn read_child(element: &mut ElementState, name: &[u8], start: &BytesStart<'_>) -> OscResult<()> {
    let key = element.key();
    let mut k = None;
    let mut v = None;
    let mut reference: Option<i64> = None;
    let mut member_type: Option<String> = None;
    let mut role = String::new();

    for attr in start.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?;
        match attr.key.as_ref() {
            b"k" => k = Some(value.to_string()),
            b"v" => v = Some(value.to_string()),
            b"ref" => reference = Some(parse_number(&value, "ref", &key.to_string())?),
            b"type" => member_type = Some(value.to_string()),
            b"role" => role = value.to_string(),
            _ => {}
        }
    }

    match (name, &mut element.body) {
        (b"tag", _) => {
            let (Some(k), Some(v)) = (k, v) else {
                return Err(OscError::Malformed(format!("{key}: <tag> needs k and v")));
            };
            element.tags.insert(k, v);
        }
        (b"nd", ElementBody::Way { nodes }) => {
            let id = reference.ok_or_else(|| OscError::Malformed(format!("{key}: <nd> without ref")))?;
            nodes.push(NodeRef::new(id));
        }
        (b"member", ElementBody::Relation { members }) => {
            let id = reference
                .ok_or_else(|| OscError::Malformed(format!("{key}: <member> without ref")))?;
            let kind = member_type
                .ok_or_else(|| OscError::Malformed(format!("{key}: <member> without type")))?
                .parse::<ElementKind>()?;
            members.push(Member::new(kind, id, role));
        }
        (other, _) => debug!("Skipping <{}> inside {}", String::from_utf8_lossy(other), key),
    }
    Ok(())
}
