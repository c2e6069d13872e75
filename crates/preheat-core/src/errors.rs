//! Structured error types shared across the preheat crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What went wrong and where, carried by every [`ModelError`].
///
/// `context` usually holds `field` (a dotted configuration path such as
/// `time.dtau`) and `value`; parse errors add `expression` and `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Snake-case code, stable across releases; tests and callers match on it.
    pub code: String,
    /// One-line description.
    pub message: String,
    /// Offending configuration path, value and related quantities.
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Suggested correction, e.g. the nearest valid lattice sizes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Payload with an empty context and no hint.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Records `value` under `key`, replacing an earlier entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Attaches a suggested correction.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Failure while loading a configuration or building a specification.
///
/// Serialized as `{"family": <variant>, "detail": <ErrorInfo>}`. Every variant is a configuration error: none of them are transient and
/// retrying with the same input always fails the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum ModelError {
    /// Lattice point count is not a power of two.
    #[error("invalid lattice size: {0}")]
    InvalidLatticeSize(ErrorInfo),
    /// Coefficient placeholders and coefficient values disagree.
    #[error("coefficient arity mismatch: {0}")]
    CoefficientArityMismatch(ErrorInfo),
    /// A time step or end time is zero, negative or not a number.
    #[error("non-positive time parameter: {0}")]
    NonPositiveTimeParameter(ErrorInfo),
    /// Per-field arrays have different lengths or reference missing fields.
    #[error("inconsistent field arity: {0}")]
    InconsistentFieldArity(ErrorInfo),
    /// A physical constant is out of its admissible range.
    #[error("invalid physical parameter: {0}")]
    InvalidPhysicalParameter(ErrorInfo),
    /// A potential expression failed to parse or evaluate.
    #[error("invalid expression: {0}")]
    InvalidExpression(ErrorInfo),
    /// The requested preset does not exist.
    #[error("unknown preset: {0}")]
    UnknownPreset(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Filesystem errors while reading configuration files.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

/// `message (code: c) | context: [k=v, ...] | hint: h`, omitting empty parts.
impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        let mut entries = self.context.iter();
        if let Some((key, value)) = entries.next() {
            write!(f, " | context: [{key}={value}")?;
            for (key, value) in entries {
                write!(f, ", {key}={value}")?;
            }
            f.write_str("]")?;
        }
        match &self.hint {
            Some(hint) => write!(f, " | hint: {hint}"),
            None => Ok(()),
        }
    }
}

impl ModelError {
    /// Payload of whichever family the error belongs to.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            Self::InvalidLatticeSize(info)
            | Self::CoefficientArityMismatch(info)
            | Self::NonPositiveTimeParameter(info)
            | Self::InconsistentFieldArity(info)
            | Self::InvalidPhysicalParameter(info)
            | Self::InvalidExpression(info)
            | Self::UnknownPreset(info)
            | Self::Serde(info)
            | Self::Io(info) => info,
        }
    }

    /// Shorthand for `self.info().code`.
    pub fn code(&self) -> &str {
        &self.info().code
    }
}
