//! Named presets. Each preset is a YAML document embedded at compile time, so
//! adding a model means adding data rather than code.

use std::fmt;
use std::str::FromStr;

use preheat_core::errors::{ErrorInfo, ModelError};
use serde::{Deserialize, Serialize};

use crate::codec::Format;
use crate::config::ModelConfig;

/// Named model presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Massive inflaton driving a massless spectator through `g2·f1²·f2²/2`.
    ChaoticInflation,
    /// Single field with a quartic-sextic potential supporting oscillons.
    Oscillon,
}

impl Preset {
    /// Every preset, in table order.
    pub const ALL: [Preset; 2] = [Preset::ChaoticInflation, Preset::Oscillon];

    /// Stable preset name.
    pub fn name(self) -> &'static str {
        match self {
            Preset::ChaoticInflation => "chaotic-inflation",
            Preset::Oscillon => "oscillon",
        }
    }

    /// Looks up a preset by name.
    pub fn from_name(name: &str) -> Result<Self, ModelError> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == name)
            .ok_or_else(|| {
                let known = Self::ALL.map(Preset::name).join(", ");
                ModelError::UnknownPreset(
                    ErrorInfo::new("preset_unknown", "no preset with this name")
                        .with_context("preset", name)
                        .with_hint(format!("known presets: {known}")),
                )
            })
    }

    fn source(self) -> &'static str {
        match self {
            Preset::ChaoticInflation => include_str!("../presets/chaotic-inflation.yaml"),
            Preset::Oscillon => include_str!("../presets/oscillon.yaml"),
        }
    }

    /// Returns the literal configuration of the preset.
    pub fn config(self) -> Result<ModelConfig, ModelError> {
        Format::Yaml.decode(self.source())
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ModelError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::from_name(name)
    }
}
