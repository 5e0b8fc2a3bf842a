//! Per-entity problems that do not abort a run.

use crate::Side;
use adiff_types::ElementKey;
use std::fmt;
use tracing::warn;

/// Why a propagated action was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The store has no current version of the container.
    NotInStore,
    /// A member of the container could not be resolved.
    Unresolved(ElementKey),
}

/// A recoverable problem found while building a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A record with a lower version came after a higher one and was
    /// discarded.
    VersionRegression {
        key: ElementKey,
        kept: u64,
        discarded: u64,
    },
    /// Two records carried the same version; the first was kept.
    DuplicateVersion { key: ElementKey, version: u64 },
    /// A modify targeted an element the store does not have.
    ReclassifiedAsCreate { key: ElementKey },
    /// A delete targeted an element the store does not have.
    MissingPriorVersion { key: ElementKey },
    /// Geometry of an action could not be fully resolved.
    IncompleteGeometry {
        key: ElementKey,
        side: Side,
        missing: ElementKey,
    },
    /// A container of a changed element was left out.
    PropagationSkipped { key: ElementKey, reason: SkipReason },
}

impl Diagnostic {
    /// The element the diagnostic is about.
    #[must_use]
    pub const fn key(&self) -> ElementKey {
        match self {
            Self::VersionRegression { key, .. }
            | Self::DuplicateVersion { key, .. }
            | Self::ReclassifiedAsCreate { key }
            | Self::MissingPriorVersion { key }
            | Self::IncompleteGeometry { key, .. }
            | Self::PropagationSkipped { key, .. } => *key,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VersionRegression {
                key,
                kept,
                discarded,
            } => write!(
                f,
                "{key}: version {discarded} follows version {kept}, keeping {kept}"
            ),
            Self::DuplicateVersion { key, version } => {
                write!(f, "{key}: version {version} listed twice, keeping the first")
            }
            Self::ReclassifiedAsCreate { key } => {
                write!(f, "{key}: modified but not in the store, treating as create")
            }
            Self::MissingPriorVersion { key } => {
                write!(f, "{key}: deleted but no prior version in the store")
            }
            Self::IncompleteGeometry { key, side, missing } => {
                write!(f, "{key}: {side} geometry incomplete, {missing} not found")
            }
            Self::PropagationSkipped { key, reason } => match reason {
                SkipReason::NotInStore => {
                    write!(f, "{key}: container not in the store, not propagated")
                }
                SkipReason::Unresolved(missing) => {
                    write!(f, "{key}: {missing} not found, not propagated")
                }
            },
        }
    }
}

/// Collects diagnostics for a run, logging each as it arrives.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.0.push(diagnostic);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}
