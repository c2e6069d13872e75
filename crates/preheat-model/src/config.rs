//! Configuration schema consumed by
//! [`ModelSpecification::build`](crate::ModelSpecification::build).
//!
//! Dimensioned inputs are written in natural units of the model: masses and
//! mass-squared values as multiples of `m` (or `m²`), lengths and times as
//! multiples of `1/m` (see [`InverseMass`]). The derivation multiplies them
//! out.

use preheat_core::errors::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec::codec_error;
use crate::flags::{FeatureFlags, OutputSchedule};

/// Complete, overridable description of one model and run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Human readable model name.
    pub name: String,
    /// Fundamental mass scales.
    pub units: UnitsConfig,
    /// Per-field masses and initial conditions.
    pub fields: FieldsConfig,
    /// Coupling constants.
    pub couplings: CouplingsConfig,
    /// Symbolic potential and coefficient definitions.
    pub potential: PotentialConfig,
    /// Homogeneous radiation and matter components.
    #[serde(default)]
    pub background: BackgroundConfig,
    /// Lattice discretization.
    pub lattice: LatticeConfig,
    /// Time stepping and run window.
    pub time: TimeConfig,
    /// Curvature perturbation settings.
    #[serde(default)]
    pub curvature: CurvatureConfig,
    /// Feature toggles for downstream components.
    #[serde(default)]
    pub flags: FeatureFlags,
    /// Output cadence and batching.
    pub output: OutputSchedule,
    /// Seeding policy for the initial fluctuations.
    #[serde(default)]
    pub seed: SeedPolicy,
}

/// Fundamental mass scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitsConfig {
    /// Reduced Planck mass.
    pub mpl: f64,
    /// Problem mass unit `m` in units of `mpl`.
    pub mass_unit: f64,
}

/// Per-field arrays. All arrays must have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldsConfig {
    /// Optional field names; defaults to `f1, f2, ...`.
    #[serde(default)]
    pub names: Vec<String>,
    /// Mass-squared values in units of `m²`.
    pub mass_squared: Vec<f64>,
    /// Initial field values.
    pub initial_values: Vec<Quantity>,
    /// Initial field time derivatives.
    pub initial_derivatives: Vec<Quantity>,
}

/// A scalar written relative to one of the model scales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Quantity {
    /// Used as is.
    Value {
        /// Raw value.
        value: f64,
    },
    /// Multiple of the reduced Planck mass.
    Planck {
        /// Multiplier of `mpl`.
        value: f64,
    },
    /// Multiple of the mass unit.
    Mass {
        /// Multiplier of `m`.
        value: f64,
    },
    /// `sqrt(3λ / (5 g2)) · m`, the amplitude of a quartic-sextic oscillon.
    OscillonAmplitude,
}

/// Coupling constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CouplingsConfig {
    /// Dimensionless self-coupling `λ`, when the model has one.
    #[serde(default)]
    pub lambda: Option<f64>,
    /// Rule producing the coupling strength `g2`.
    pub g2: CouplingRule,
}

/// How `g2` is obtained from the other constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CouplingRule {
    /// Used as is.
    Value {
        /// Raw value.
        value: f64,
    },
    /// `factor · m²`.
    MassSquared {
        /// Multiplier of `m²`.
        factor: f64,
    },
    /// `λ² / ratio`.
    SelfCouplingRatio {
        /// Divisor applied to `λ²`.
        ratio: f64,
    },
}

/// Where the value of a coefficient slot comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CoefficientSource {
    /// Mass squared of field `field` (1-based).
    FieldMassSquared {
        /// 1-based field index.
        field: usize,
    },
    /// The coupling `g2`.
    Coupling,
    /// The self-coupling `λ`.
    SelfCoupling,
    /// `g2 / m²`.
    CouplingOverMassSquared,
    /// A literal value.
    Value {
        /// Raw value.
        value: f64,
    },
}

/// Symbolic potential definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PotentialConfig {
    /// Self-interaction terms, e.g. `0.5*C1*f1**2`.
    pub terms: Vec<String>,
    /// Cross-field interaction terms.
    #[serde(default)]
    pub interactions: Vec<String>,
    /// Sources of the scaled coefficients bound to `C1, C2, ...`.
    pub coefficients: Vec<CoefficientSource>,
    /// Sources of the bare coefficients bound to `D1, D2, ...`.
    #[serde(default)]
    pub bare_coefficients: Vec<CoefficientSource>,
    /// Sub-expressions the evolver tabulates in power form, e.g. `sin(f1)`.
    #[serde(default)]
    pub power_terms: Vec<String>,
}

/// Initial homogeneous radiation and matter energy densities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct BackgroundConfig {
    /// Radiation energy density.
    #[serde(default)]
    pub rho_r0: f64,
    /// Matter energy density.
    #[serde(default)]
    pub rho_m0: f64,
}

/// Spatial discretization scheme used by the evolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Discretization {
    /// DEFROST stencil.
    #[default]
    Defrost,
    /// HLattice stencil.
    Hlattice,
    /// LATTICEEASY stencil.
    Latticeeasy,
}

/// Lattice geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatticeConfig {
    /// Comoving side length.
    pub side_length: InverseMass,
    /// Points per axis; must be a power of two.
    pub points: u64,
    /// Initial scale factor.
    pub a_in: f64,
    /// Scale factor at which linearized evolution hands over.
    pub a_limit: f64,
    /// Discretization scheme.
    #[serde(default)]
    pub discretization: Discretization,
}

/// Time stepping and run window, in units of `1/m`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeConfig {
    /// Step of the nonlinear lattice run.
    pub dtau: InverseMass,
    /// Step of the homogeneous run.
    pub dtau_hom: InverseMass,
    /// Rescale `dtau` by `1/a` for roughly constant physical steps.
    #[serde(default)]
    pub adaptive: bool,
    /// Start time.
    #[serde(default)]
    pub t_in: InverseMass,
    /// End time of the nonlinear run.
    pub t_fin: InverseMass,
    /// End time of the homogeneous run.
    pub t_fin_hom: InverseMass,
}

/// A length or time in units of `1/m`.
///
/// Written either as a plain multiple, `t_fin: 256.0`, or as a ratio,
/// `dtau_hom: {numerator: 1.0, divisor: 10000.0}`. The ratio resolves to
/// `numerator / (divisor · m)`, so a step such as `1/(10000·m)` is computed
/// in that order rather than from the rounded literal `1e-4`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum InverseMass {
    /// `value / m`.
    Multiple(f64),
    /// `numerator / (divisor · m)`.
    Ratio {
        /// Dividend.
        numerator: f64,
        /// Multiplies `m` in the divisor.
        divisor: f64,
    },
}

impl InverseMass {
    /// Value in units of `1/m`.
    pub fn multiple(&self) -> f64 {
        match *self {
            Self::Multiple(value) => value,
            Self::Ratio { numerator, divisor } => numerator / divisor,
        }
    }

    /// Absolute value for the mass unit `m`.
    pub fn resolve(&self, m: f64) -> f64 {
        match *self {
            Self::Multiple(value) => value / m,
            Self::Ratio { numerator, divisor } => numerator / (divisor * m),
        }
    }
}

impl Default for InverseMass {
    fn default() -> Self {
        Self::Multiple(0.0)
    }
}

/// Curvature perturbation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CurvatureConfig {
    /// Hubble rate at which the curvature perturbation is evaluated.
    pub h_ref: f64,
}

impl Default for CurvatureConfig {
    fn default() -> Self {
        Self { h_ref: 1e-12 }
    }
}

/// Seeding policy for the initial fluctuations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SeedPolicy {
    /// Master seed; when absent and deterministic mode is off the evolver draws entropy.
    #[serde(default)]
    pub master: Option<u64>,
}

impl ModelConfig {
    /// Returns a copy with `overrides` deep-merged over this configuration.
    ///
    /// Mappings merge key by key; any other value replaces the existing one
    /// wholesale, so lists such as `potential.terms` are overridden entirely.
    pub fn with_overrides(&self, overrides: &serde_yaml::Value) -> Result<Self, ModelError> {
        let mut base =
            serde_json::to_value(self).map_err(|err| codec_error("config_serialize", err))?;
        let patch =
            serde_json::to_value(overrides).map_err(|err| codec_error("override_convert", err))?;
        if !patch.is_null() {
            merge(&mut base, patch);
        }
        serde_json::from_value(base).map_err(|err| codec_error("override_apply", err))
    }

    /// Field names, falling back to `f1, f2, ...` when none are configured.
    pub fn field_names(&self) -> Vec<String> {
        if self.fields.names.is_empty() {
            (1..=self.fields.mass_squared.len())
                .map(|index| format!("f{index}"))
                .collect()
        } else {
            self.fields.names.clone()
        }
    }
}

fn merge(base: &mut Value, patch: Value) {
    let mergeable = match (&*base, &patch) {
        (Value::Object(current), Value::Object(requested)) => same_variant(current, requested),
        _ => false,
    };
    if !mergeable {
        *base = patch;
        return;
    }
    if let (Value::Object(base), Value::Object(patch)) = (base, patch) {
        for (key, value) in patch {
            match base.get_mut(&key) {
                Some(slot) => merge(slot, value),
                None => {
                    base.insert(key, value);
                }
            }
        }
    }
}

/// Tagged enums switch variant wholesale instead of merging fields.
fn same_variant(base: &Map<String, Value>, patch: &Map<String, Value>) -> bool {
    match (base.get("type"), patch.get("type")) {
        (Some(current), Some(requested)) => current == requested,
        _ => true,
    }
}
