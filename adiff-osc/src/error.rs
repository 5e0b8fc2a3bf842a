//! Error types for change-list parsing.

use thiserror::Error;

/// Result type for parsing operations.
pub type OscResult<T> = Result<T, OscError>;

/// Errors that make a change list or extract unusable.
///
/// All of these are fatal for a run: a half-parsed change list would
/// produce a misleading diff.
#[derive(Debug, Error)]
pub enum OscError {
    /// The document is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute could not be read.
    #[error("attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// Well-formed XML with the wrong structure or values.
    #[error("malformed document: {0}")]
    Malformed(String),
}

impl From<adiff_types::Error> for OscError {
    fn from(err: adiff_types::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
