//! Error types for the diff pipeline.

use adiff_store::StoreError;
use thiserror::Error;

/// Result type for pipeline operations.
pub type AugmentResult<T> = Result<T, AugmentError>;

/// Errors that abort a run.
///
/// Per-entity problems (missing references, version regressions) are not
/// errors; they are recorded as [`Diagnostic`](crate::Diagnostic)s.
#[derive(Debug, Error)]
pub enum AugmentError {
    /// The store failed to answer a lookup.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Reading an input document failed.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A document handed to the merge utility is unusable.
    #[error("merge input error: {0}")]
    MergeInput(String),
}
