//! Augmented diff XML output.

use crate::{AugmentConfig, AugmentResult, AugmentedDiff, DiffAction, DiffBody};
use adiff_types::{Bounds, ElementBody, ElementState, Location, Member, MemberGeometry, NodeRef};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// Writes the document: declaration, `<osm>` root, note, then one
/// `<action>` per entry in order.
pub fn write_document<W: Write>(
    diff: &AugmentedDiff,
    config: &AugmentConfig,
    out: W,
) -> AugmentResult<()> {
    let mut writer = if config.indent {
        Writer::new_with_indent(out, b' ', 2)
    } else {
        Writer::new(out)
    };

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut root = BytesStart::new("osm");
    root.push_attribute(("version", "0.6"));
    root.push_attribute(("generator", config.generator.as_str()));
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(BytesStart::new("note")))?;
    writer.write_event(Event::Text(BytesText::new(&config.note)))?;
    writer.write_event(Event::End(BytesEnd::new("note")))?;

    for action in &diff.actions {
        write_action(&mut writer, action)?;
    }

    writer.write_event(Event::End(BytesEnd::new("osm")))?;
    writer.get_mut().write_all(b"\n")?;
    Ok(())
}

fn write_action<W: Write>(writer: &mut Writer<W>, action: &DiffAction) -> AugmentResult<()> {
    let mut start = BytesStart::new("action");
    start.push_attribute(("type", action.operation.as_str()));
    writer.write_event(Event::Start(start))?;
    match &action.body {
        DiffBody::Create(element) => write_element(writer, element)?,
        DiffBody::Change { old, new } => {
            for (wrapper, element) in [("old", old), ("new", new)] {
                writer.write_event(Event::Start(BytesStart::new(wrapper)))?;
                write_element(writer, element)?;
                writer.write_event(Event::End(BytesEnd::new(wrapper)))?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new("action")))?;
    Ok(())
}

fn push_location(start: &mut BytesStart<'_>, location: Location) {
    start.push_attribute(("lat", location.lat_string().as_str()));
    start.push_attribute(("lon", location.lon_string().as_str()));
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &ElementState) -> AugmentResult<()> {
    let name = element.kind().as_str();
    let mut start = BytesStart::new(name);
    start.push_attribute(("id", element.id.to_string().as_str()));
    if let Some(version) = element.version {
        start.push_attribute(("version", version.to_string().as_str()));
    }
    if let Some(visible) = element.visible {
        start.push_attribute(("visible", if visible { "true" } else { "false" }));
    }
    let metadata = &element.metadata;
    if let Some(user) = &metadata.user {
        start.push_attribute(("user", user.as_str()));
    }
    if let Some(uid) = metadata.uid {
        start.push_attribute(("uid", uid.to_string().as_str()));
    }
    if let Some(timestamp) = &metadata.timestamp {
        start.push_attribute(("timestamp", timestamp.as_str()));
    }
    if let Some(changeset) = metadata.changeset {
        start.push_attribute(("changeset", changeset.to_string().as_str()));
    }
    if let Some(location) = element.location() {
        push_location(&mut start, location);
    }

    let has_children = element.bounds.is_some()
        || !element.tags.is_empty()
        || match &element.body {
            ElementBody::Node { .. } => false,
            ElementBody::Way { nodes } => !nodes.is_empty(),
            ElementBody::Relation { members } => !members.is_empty(),
        };
    if !has_children {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(bounds) = element.bounds {
        write_bounds(writer, bounds)?;
    }
    match &element.body {
        ElementBody::Node { .. } => {}
        ElementBody::Way { nodes } => {
            for node in nodes {
                write_node_ref(writer, node)?;
            }
        }
        ElementBody::Relation { members } => {
            for member in members {
                write_member(writer, member)?;
            }
        }
    }
    for (k, v) in element.tags.iter() {
        let mut tag = BytesStart::new("tag");
        tag.push_attribute(("k", k));
        tag.push_attribute(("v", v));
        writer.write_event(Event::Empty(tag))?;
    }
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_bounds<W: Write>(writer: &mut Writer<W>, bounds: Bounds) -> AugmentResult<()> {
    let (min, max) = (bounds.min(), bounds.max());
    let mut start = BytesStart::new("bounds");
    start.push_attribute(("minlat", min.lat_string().as_str()));
    start.push_attribute(("minlon", min.lon_string().as_str()));
    start.push_attribute(("maxlat", max.lat_string().as_str()));
    start.push_attribute(("maxlon", max.lon_string().as_str()));
    writer.write_event(Event::Empty(start))?;
    Ok(())
}

fn write_node_ref<W: Write>(writer: &mut Writer<W>, node: &NodeRef) -> AugmentResult<()> {
    let mut start = BytesStart::new("nd");
    start.push_attribute(("ref", node.id.to_string().as_str()));
    if let Some(location) = node.location {
        push_location(&mut start, location);
    }
    writer.write_event(Event::Empty(start))?;
    Ok(())
}

fn write_member<W: Write>(writer: &mut Writer<W>, member: &Member) -> AugmentResult<()> {
    let mut start = BytesStart::new("member");
    start.push_attribute(("type", member.kind.as_str()));
    start.push_attribute(("ref", member.id.to_string().as_str()));
    start.push_attribute(("role", member.role.as_str()));
    match &member.geometry {
        MemberGeometry::Point(location) => {
            push_location(&mut start, *location);
            writer.write_event(Event::Empty(start))?;
        }
        MemberGeometry::Line(line) if !line.is_empty() => {
            writer.write_event(Event::Start(start))?;
            for location in line {
                let mut nd = BytesStart::new("nd");
                push_location(&mut nd, *location);
                writer.write_event(Event::Empty(nd))?;
            }
            writer.write_event(Event::End(BytesEnd::new("member")))?;
        }
        MemberGeometry::Line(_) | MemberGeometry::Unresolved => {
            writer.write_event(Event::Empty(start))?;
        }
    }
    Ok(())
}
