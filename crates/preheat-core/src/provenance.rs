//! Schema version and provenance recorded on every built specification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, ModelError};

/// `major.minor.patch` version of the serialized specification layout.
///
/// Serialized as a dotted string. Readers accept any layout with the same
/// major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SchemaVersion {
    /// Incremented when fields are removed or change meaning.
    pub major: u32,
    /// Incremented when fields are added.
    pub minor: u32,
    /// Incremented for fixes that leave the layout unchanged.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether a reader of `self` can consume data written as `other`.
    pub fn reads(&self, other: &SchemaVersion) -> bool {
        self.major == other.major && self.minor >= other.minor
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = ModelError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let parts = text
            .split('.')
            .map(str::parse::<u32>)
            .collect::<Result<Vec<_>, _>>();
        match parts.as_deref() {
            Ok([major, minor, patch]) => Ok(Self::new(*major, *minor, *patch)),
            _ => Err(ModelError::Serde(
                ErrorInfo::new("schema_version", "expected major.minor.patch")
                    .with_context("value", text),
            )),
        }
    }
}

impl From<SchemaVersion> for String {
    fn from(version: SchemaVersion) -> Self {
        version.to_string()
    }
}

impl TryFrom<String> for SchemaVersion {
    type Error = ModelError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

/// Where a specification came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecProvenance {
    /// Layout version of the serialized specification.
    pub schema_version: SchemaVersion,
    /// Model name, usually the preset name.
    pub model_name: String,
    /// Hex SHA-256 of the canonical JSON of the input configuration.
    pub config_hash: String,
}
