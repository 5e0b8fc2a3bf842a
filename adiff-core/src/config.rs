//! Output configuration.

use crate::AugmentResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Generator string written on the output root. Review tools look for the
/// leading "Overpass API" to recognise the format.
pub const DEFAULT_GENERATOR: &str =
    "Overpass API not used, but achavi detects it at the start of string; adiff";

/// Attribution note written as the first child of the output root.
pub const DEFAULT_NOTE: &str = "The data included in this document is from www.openstreetmap.org. The data is made available under ODbL.";

/// Configuration for document output.
///
/// Every field is optional in the TOML form; missing fields take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// `generator` attribute of the root element.
    pub generator: String,
    /// Text of the `<note>` element.
    pub note: String,
    /// Pretty-print with two-space indentation.
    pub indent: bool,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            generator: DEFAULT_GENERATOR.to_string(),
            note: DEFAULT_NOTE.to_string(),
            indent: false,
        }
    }
}

impl AugmentConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> AugmentResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a configuration file.
    pub fn load(path: &Path) -> AugmentResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
