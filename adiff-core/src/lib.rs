//! Augmented diff generation.
//!
//! Turns a change list and a point-in-time store snapshot into an
//! augmented diff: each touched element with its state before and after
//! the batch, resolved geometry on both sides, context actions for
//! untouched containers whose shape changed, and bounding boxes.
//!
//! The run is a sequence of passes, each owning the data handed to it:
//!
//! 1. [`Batch::deduplicate`]: one record per element, highest version.
//! 2. [`reconstruct`]: old side from the store, new side from the record.
//! 3. [`Augmenter`]: coordinates for way nodes and relation members.
//! 4. [`propagate`]: `modify` actions for affected containers.
//! 5. [`finalize`]: bounds, ordering, create shape.
//!
//! [`augment_changes`] runs them all. [`write_document`] serializes the
//! result, and [`merge_documents`] joins finished documents.

mod action;
mod augment;
mod config;
mod dedup;
mod diagnostics;
mod document;
mod error;
mod finalize;
mod merge;
mod pipeline;
mod propagate;
mod reconstruct;
mod writer;

pub use action::{Action, Origin};
pub use augment::{Augmenter, Resolution, Side};
pub use config::{AugmentConfig, DEFAULT_GENERATOR, DEFAULT_NOTE};
pub use dedup::Batch;
pub use diagnostics::{Diagnostic, Diagnostics, SkipReason};
pub use document::AugmentedDiff;
pub use error::{AugmentError, AugmentResult};
pub use finalize::{attach_bounds, finalize, DiffAction, DiffBody};
pub use merge::{merge_documents, MERGED_ROOT_ATTRIBUTES};
pub use pipeline::augment_changes;
pub use propagate::{find_affected, propagate, Affected};
pub use reconstruct::{load_current, reconstruct};
pub use writer::write_document;
