//! Configuration documents: a preset plus overrides, or an inline model.

use std::fs;
use std::path::Path;

use preheat_core::errors::{ErrorInfo, ModelError};
use serde::{Deserialize, Serialize};

use crate::codec::Format;
use crate::config::ModelConfig;
use crate::presets::Preset;

/// Top-level layout of a configuration file.
///
/// ```yaml
/// preset: chaotic-inflation
/// overrides:
///   lattice:
///     points: 128
/// ```
///
/// A complete configuration may be given under `model:` instead of `preset:`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Name of the preset to start from.
    #[serde(default)]
    pub preset: Option<String>,
    /// Inline configuration.
    #[serde(default)]
    pub model: Option<ModelConfig>,
    /// Values deep-merged over the selected configuration.
    #[serde(default)]
    pub overrides: Option<serde_yaml::Value>,
}

impl ConfigFile {
    /// Resolves the document into a concrete configuration.
    pub fn resolve(&self) -> Result<ModelConfig, ModelError> {
        let base = match (&self.preset, &self.model) {
            (Some(name), None) => Preset::from_name(name)?.config()?,
            (None, Some(model)) => model.clone(),
            (Some(_), Some(_)) => {
                return Err(ModelError::Serde(
                    ErrorInfo::new("config_source_ambiguous", "both preset and model are set")
                        .with_hint("keep either `preset` or `model`"),
                ))
            }
            (None, None) => {
                return Err(ModelError::Serde(
                    ErrorInfo::new("config_source_missing", "neither preset nor model is set")
                        .with_hint("add `preset: <name>` or an inline `model:` section"),
                ))
            }
        };
        match &self.overrides {
            Some(overrides) => base.with_overrides(overrides),
            None => Ok(base),
        }
    }
}

/// Parses and resolves a configuration document in the given format.
pub fn parse_config(source: &str, format: Format) -> Result<ModelConfig, ModelError> {
    let file: ConfigFile = format.decode(source)?;
    file.resolve()
}

/// Parses and resolves a YAML configuration document.
pub fn parse_config_str(source: &str) -> Result<ModelConfig, ModelError> {
    parse_config(source, Format::Yaml)
}

/// Reads, parses and resolves the configuration file at `path`.
///
/// Files ending in `.json` are read as JSON, everything else as YAML.
pub fn load_config(path: impl AsRef<Path>) -> Result<ModelConfig, ModelError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|err| {
        ModelError::Io(
            ErrorInfo::new("config_read", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    let format = Format::from_path(path);
    tracing::debug!(path = %path.display(), ?format, "loading model configuration");
    parse_config(&source, format).map_err(|err| match err {
        ModelError::Serde(info) => {
            ModelError::Serde(info.with_context("path", path.display().to_string()))
        }
        other => other,
    })
}
