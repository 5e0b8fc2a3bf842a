//! Merging several augmented diffs into one document.
//!
//! Actions are copied event by event, without going through the typed
//! model, so anything a producer wrote inside an action survives as is.

use crate::{AugmentError, AugmentResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::io::Write;
use tracing::debug;

/// Root attributes of a merged document.
pub const MERGED_ROOT_ATTRIBUTES: [(&str, &str); 5] = [
    ("version", "0.6"),
    ("generator", "osmcha"),
    ("copyright", "OpenStreetMap and contributors"),
    ("attribution", "http://www.openstreetmap.org/copyright"),
    ("license", "http://opendatacommons.org/licenses/odbl/1-0/"),
];

/// Writes one document holding every `<action>` of `inputs`, in order.
///
/// When `metadata` is given, the first child element of its root (an API
/// changeset document's `<changeset>`) is copied in ahead of the actions.
/// Returns the number of actions written.
pub fn merge_documents<W: Write>(
    inputs: &[&str],
    metadata: Option<&str>,
    out: W,
) -> AugmentResult<usize> {
    if inputs.is_empty() && metadata.is_none() {
        return Err(AugmentError::MergeInput("no input files to merge".into()));
    }

    let mut writer = Writer::new(out);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut root = BytesStart::new("osm");
    for attribute in MERGED_ROOT_ATTRIBUTES {
        root.push_attribute(attribute);
    }
    writer.write_event(Event::Start(root))?;

    if let Some(metadata) = metadata {
        let copied = copy_children(metadata, None, &mut writer, |_| true, 1)?;
        if copied == 0 {
            debug!("Changeset metadata has no child element");
        }
    }

    let mut actions = 0;
    for (index, input) in inputs.iter().enumerate() {
        let copied = copy_children(input, Some(b"osm".as_slice()), &mut writer, |name| name == b"action", usize::MAX)?;
        debug!("Input {}: {} actions", index, copied);
        actions += copied;
    }

    writer.write_event(Event::End(BytesEnd::new("osm")))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(actions)
}

/// Copies up to `limit` direct children of the root that `select` accepts,
/// with their whole subtrees.
fn copy_children<W, F>(
    xml: &str,
    expected_root: Option<&[u8]>,
    writer: &mut Writer<W>,
    mut select: F,
    limit: usize,
) -> AugmentResult<usize>
where
    W: Write,
    F: FnMut(&[u8]) -> bool,
{
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut seen_root = false;
    let mut depth = 0usize;
    // Depth of the child currently being copied.
    let mut copy_depth: Option<usize> = None;
    let mut copied = 0usize;

    loop {
        let event = reader.read_event()?;
        match &event {
            Event::Eof => break,
            Event::Decl(_) | Event::DocType(_) | Event::PI(_) if depth == 0 => continue,
            Event::Start(start) | Event::Empty(start) if depth == 0 => {
                check_root(start, expected_root)?;
                seen_root = true;
                if matches!(event, Event::Start(_)) {
                    depth = 1;
                }
                continue;
            }
            Event::Start(start) => {
                depth += 1;
                if copy_depth.is_none()
                    && depth == 2
                    && copied < limit
                    && select(start.local_name().as_ref())
                {
                    copy_depth = Some(depth);
                }
            }
            Event::Empty(start) => {
                if copy_depth.is_none() && depth == 1 && copied < limit && select(start.local_name().as_ref()) {
                    writer.write_event(event.borrow())?;
                    copied += 1;
                    continue;
                }
            }
            Event::End(_) => {
                let closing = depth;
                depth = depth.saturating_sub(1);
                if copy_depth == Some(closing) {
                    writer.write_event(event.borrow())?;
                    copy_depth = None;
                    copied += 1;
                    continue;
                }
            }
            _ => {}
        }
        if copy_depth.is_some() {
            writer.write_event(event.borrow())?;
        }
    }

    if !seen_root {
        return Err(AugmentError::MergeInput("document has no root element".into()));
    }
    if depth != 0 {
        return Err(AugmentError::MergeInput("unexpected end of document".into()));
    }
    Ok(copied)
}

fn check_root(start: &BytesStart<'_>, expected: Option<&[u8]>) -> AugmentResult<()> {
    match expected {
        Some(expected) if start.local_name().as_ref() != expected => Err(AugmentError::MergeInput(format!(
            "expected <{}> root, found <{}>",
            String::from_utf8_lossy(expected),
            String::from_utf8_lossy(start.local_name().as_ref())
        ))),
        _ => Ok(()),
    }
}
