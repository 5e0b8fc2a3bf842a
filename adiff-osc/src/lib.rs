//! osmChange and OSM XML parsing.
//!
//! - [`parse_change_list`] reads an osmChange (`.osc`) document into
//!   [`ChangeRecord`]s, in document order.
//! - [`parse_osm`] reads an OSM extract (`.osm`) into stored elements for
//!   loading an element store.
//!
//! Both parsers are strict about structure and values (ids, versions,
//! coordinates, member types) and lenient about unknown attributes and
//! elements, which are skipped.
//!
//! [`ChangeRecord`]: adiff_types::ChangeRecord

mod change;
mod error;
mod osm;
mod reader;

pub use change::parse_change_list;
pub use error::{OscError, OscResult};
pub use osm::{parse_osm, OsmData};
