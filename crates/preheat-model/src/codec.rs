//! Text encodings of configurations and specifications, plus the canonical
//! digest recorded in provenance.

use std::path::Path;

use preheat_core::errors::{ErrorInfo, ModelError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

pub(crate) fn codec_error(code: &str, err: impl ToString) -> ModelError {
    ModelError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Pretty-printed JSON.
    Json,
    /// YAML, used for presets and configuration files.
    Yaml,
}

impl Format {
    /// Picks the format from a file extension; anything but `.json` is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Yaml,
        }
    }

    /// Encodes `value` as text.
    pub fn encode<T: Serialize>(self, value: &T) -> Result<String, ModelError> {
        match self {
            Format::Json => serde_json::to_string_pretty(value)
                .map_err(|err| codec_error("json_serialize", err)),
            Format::Yaml => {
                serde_yaml::to_string(value).map_err(|err| codec_error("yaml_serialize", err))
            }
        }
    }

    /// Decodes a value from text.
    pub fn decode<T: DeserializeOwned>(self, text: &str) -> Result<T, ModelError> {
        match self {
            Format::Json => {
                serde_json::from_str(text).map_err(|err| codec_error("json_deserialize", err))
            }
            Format::Yaml => {
                serde_yaml::from_str(text).map_err(|err| codec_error("yaml_deserialize", err))
            }
        }
    }
}

fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            for (key, mut child) in entries {
                sort_keys(&mut child);
                map.insert(key, child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}

/// Compact JSON with object keys sorted at every level.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>, ModelError> {
    let mut tree = serde_json::to_value(value).map_err(|err| codec_error("json_serialize", err))?;
    sort_keys(&mut tree);
    serde_json::to_vec(&tree).map_err(|err| codec_error("json_write", err))
}

/// Hex SHA-256 of [`canonical_json`].
pub fn digest<T: Serialize>(value: &T) -> Result<String, ModelError> {
    let bytes = canonical_json(value)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
