//! Core type definitions for the augmented diff generator.
//!
//! This crate defines the plain data types shared by every stage:
//! - Element kinds, keys and change operations
//! - Fixed-point locations and bounding boxes
//! - Ordered tag maps and edit metadata
//! - Element state (the typed form of an OSM element on one side of a diff)
//! - Change records (one parsed entry of an osmChange document)
//! - Stored elements (what the snapshot store returns)
//!
//! Nothing here touches the store or the XML format; those live in
//! `adiff-store`, `adiff-osc` and `adiff-core`.

mod element;
mod kind;
mod location;
mod stored;
mod tags;

pub use element::{ChangeRecord, EditMetadata, ElementBody, ElementState, Member, MemberGeometry, NodeRef};
pub use kind::{ElementKey, ElementKind, Operation};
pub use location::{Bounds, Location, COORDINATE_SCALE};
pub use stored::{StoredMember, StoredNode, StoredRelation, StoredWay};
pub use tags::Tags;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when parsing the textual form of a type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid element kind: {0}")]
    InvalidKind(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
}
