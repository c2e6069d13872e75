#![deny(missing_docs)]
#![doc = "Validated, derived model specifications for preheating lattice simulations."]

/// JSON and YAML encodings and the canonical digest.
pub mod codec;
/// Configuration schema and override merging.
pub mod config;
mod derive;
/// Feature flags, output schedule and curvature-mode normalisation.
pub mod flags;
/// Configuration file loading.
pub mod loader;
/// Embedded preset table.
pub mod presets;
/// The built specification and its groups.
pub mod spec;
mod validate;

pub use codec::{canonical_json, digest, Format};
pub use config::{
    BackgroundConfig, CoefficientSource, CouplingRule, CouplingsConfig, CurvatureConfig,
    Discretization, FieldsConfig, InverseMass, LatticeConfig, ModelConfig, PotentialConfig,
    Quantity, SeedPolicy, TimeConfig, UnitsConfig,
};
pub use flags::{
    FeatureFlags, GwSpectrumMethod, OutputSchedule, RunControls, CURVATURE_FLUSH_FREQ,
};
pub use loader::{load_config, parse_config, parse_config_str, ConfigFile};
pub use presets::Preset;
pub use spec::{
    Background, Couplings, FieldSet, Lattice, ModelSpecification, Potential, TimeStepping, Units,
    SPEC_SCHEMA_VERSION,
};

pub use preheat_core::errors::{ErrorInfo, ModelError};
