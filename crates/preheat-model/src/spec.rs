//! The immutable, validated model specification.

use preheat_core::errors::{ErrorInfo, ModelError};
use preheat_core::provenance::{SchemaVersion, SpecProvenance};
use preheat_core::rng::{derive_run_seed, RngHandle, DETERMINISTIC_SEED};
use preheat_expr::{Bindings, Expr, Placeholders};
use serde::Serialize;

use crate::codec::{digest, Format};
use crate::config::{Discretization, ModelConfig, SeedPolicy};
use crate::derive;
use crate::flags::{FeatureFlags, OutputSchedule, RunControls};
use crate::presets::Preset;
use crate::validate;

/// Schema version of serialized specifications.
pub const SPEC_SCHEMA_VERSION: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Fundamental mass scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Units {
    /// Reduced Planck mass.
    pub mpl: f64,
    /// Planck mass, `sqrt(8π)·mpl`.
    pub planck_mass: f64,
    /// Mass unit `m`.
    pub mass_unit: f64,
}

/// Per-field values. All vectors share one length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSet {
    /// Field names.
    pub names: Vec<String>,
    /// Mass squared of each field.
    pub mass_squared: Vec<f64>,
    /// Initial field values.
    pub initial_values: Vec<f64>,
    /// Initial field time derivatives.
    pub initial_derivatives: Vec<f64>,
}

impl FieldSet {
    /// Number of fields.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false for a built specification.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Coupling constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Couplings {
    /// Self-coupling `λ`, when the model has one.
    pub lambda: Option<f64>,
    /// Coupling strength `g2`.
    pub g2: f64,
}

/// Parsed potential with its bound coefficient values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Potential {
    /// Self-interaction terms.
    pub terms: Vec<Expr>,
    /// Cross-field interaction terms.
    pub interactions: Vec<Expr>,
    /// Sub-expressions tabulated in power form by the evolver.
    pub power_terms: Vec<Expr>,
    /// Values bound to `C1, C2, ...`, before the evolver's `a³·dτ` scaling.
    pub coefficients: Vec<f64>,
    /// Values bound to `D1, D2, ...`.
    pub bare_coefficients: Vec<f64>,
}

impl Potential {
    /// Placeholders referenced across terms and interactions.
    pub fn placeholders(&self) -> Placeholders {
        Placeholders::collect_all(self.terms.iter().chain(self.interactions.iter()))
    }

    /// Bindings of the coefficient lists together with `fields`.
    pub fn bindings<'a>(&'a self, fields: &'a [f64]) -> Bindings<'a> {
        Bindings {
            fields,
            coefficients: &self.coefficients,
            bare: &self.bare_coefficients,
        }
    }
}

/// Initial homogeneous radiation and matter energy densities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Background {
    /// Radiation energy density.
    pub rho_r0: f64,
    /// Matter energy density.
    pub rho_m0: f64,
}

/// Lattice geometry in absolute units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lattice {
    /// Comoving side length.
    pub side_length: f64,
    /// Points per axis, a power of two.
    pub points: u64,
    /// Initial scale factor.
    pub a_in: f64,
    /// Scale factor ending linearized evolution.
    pub a_limit: f64,
    /// Discretization scheme.
    pub discretization: Discretization,
}

impl Lattice {
    /// Comoving grid spacing `L/n`.
    pub fn spacing(&self) -> f64 {
        self.side_length / self.points as f64
    }
}

/// Time steps and run window in absolute units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeStepping {
    /// Step of the nonlinear run.
    pub dtau: f64,
    /// Step of the homogeneous run.
    pub dtau_hom: f64,
    /// Whether `dtau` is rescaled by the inverse scale factor.
    pub adaptive: bool,
    /// Start time.
    pub t_in: f64,
    /// End time of the nonlinear run.
    pub t_fin: f64,
    /// End time of the homogeneous run.
    pub t_fin_hom: f64,
}

impl TimeStepping {
    /// Nonlinear step at scale factor `a`.
    pub fn step_at(&self, a: f64) -> f64 {
        if self.adaptive {
            self.dtau / a
        } else {
            self.dtau
        }
    }
}

/// Complete description of one model and run configuration.
///
/// Built once per run by [`ModelSpecification::build`] and read-only
/// afterwards. There are no mutators; a different configuration needs a new
/// specification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSpecification {
    provenance: SpecProvenance,
    units: Units,
    fields: FieldSet,
    couplings: Couplings,
    potential: Potential,
    background: Background,
    resonance_q: Option<f64>,
    lattice: Lattice,
    time: TimeStepping,
    h_ref: f64,
    controls: RunControls,
    seed: SeedPolicy,
}

impl ModelSpecification {
    /// Validates `config` and derives the specification from it.
    pub fn build(config: &ModelConfig) -> Result<Self, ModelError> {
        let field_count = validate::check_field_arity(&config.fields)?;
        validate::check_lattice(&config.lattice)?;
        validate::check_time(&config.time)?;
        validate::check_physical(config)?;
        let parsed = validate::parse_potential(&config.potential, field_count)?;
        validate::check_coefficient_sources(config)?;

        let units = derive::units(config);
        let couplings = derive::couplings(config, &units)?;
        let fields = derive::field_set(config, &units, &couplings)?;
        let resonance_q = derive::resonance_q(&fields, &couplings);
        let coefficients = derive::coefficients(
            "potential.coefficients",
            &config.potential.coefficients,
            &units,
            &fields,
            &couplings,
        )?;
        let bare_coefficients = derive::coefficients(
            "potential.bare_coefficients",
            &config.potential.bare_coefficients,
            &units,
            &fields,
            &couplings,
        )?;
        let controls = RunControls {
            flags: config.flags,
            output: config.output.clone(),
        }
        .normalized();

        if controls.output.sim_num > 1 && !controls.flags.superfolder {
            tracing::warn!(
                model = %config.name,
                sim_num = controls.output.sim_num,
                "several runs requested without a superfolder; outputs share one directory level"
            );
        }

        let lattice = derive::lattice(config, &units)?;
        let time = derive::time_stepping(config, &units)?;

        let provenance = SpecProvenance {
            schema_version: SPEC_SCHEMA_VERSION,
            model_name: config.name.clone(),
            config_hash: digest(config)?,
        };
        tracing::debug!(
            model = %provenance.model_name,
            config_hash = %provenance.config_hash,
            fields = fields.len(),
            "built model specification"
        );

        Ok(Self {
            provenance,
            units,
            fields,
            couplings,
            potential: Potential {
                terms: parsed.terms,
                interactions: parsed.interactions,
                power_terms: parsed.power_terms,
                coefficients,
                bare_coefficients,
            },
            background: Background {
                rho_r0: config.background.rho_r0,
                rho_m0: config.background.rho_m0,
            },
            resonance_q,
            lattice,
            time,
            h_ref: config.curvature.h_ref,
            controls,
            seed: config.seed.clone(),
        })
    }

    /// Builds the specification of a named preset without overrides.
    pub fn from_preset(preset: Preset) -> Result<Self, ModelError> {
        Self::build(&preset.config()?)
    }

    /// Schema version, model name and configuration hash.
    pub fn provenance(&self) -> &SpecProvenance {
        &self.provenance
    }

    /// Fundamental mass scales.
    pub fn units(&self) -> &Units {
        &self.units
    }

    /// Per-field masses and initial conditions.
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Coupling constants.
    pub fn couplings(&self) -> &Couplings {
        &self.couplings
    }

    /// Potential terms and coefficient values.
    pub fn potential(&self) -> &Potential {
        &self.potential
    }

    /// Initial radiation and matter densities.
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Resonance parameter `q`; `None` when the first field is massless.
    pub fn resonance_q(&self) -> Option<f64> {
        self.resonance_q
    }

    /// Lattice geometry.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Time stepping and run window.
    pub fn time(&self) -> &TimeStepping {
        &self.time
    }

    /// Hubble rate at which the curvature perturbation is evaluated.
    pub fn h_ref(&self) -> f64 {
        self.h_ref
    }

    /// Normalised feature flags.
    pub fn flags(&self) -> &FeatureFlags {
        &self.controls.flags
    }

    /// Normalised output schedule.
    pub fn output(&self) -> &OutputSchedule {
        &self.controls.output
    }

    /// Value of the potential at the given field values.
    pub fn potential_at(&self, field_values: &[f64]) -> Result<f64, ModelError> {
        if field_values.len() != self.fields.len() {
            return Err(ModelError::InconsistentFieldArity(
                ErrorInfo::new("potential_fields", "wrong number of field values")
                    .with_context("supplied", field_values.len().to_string())
                    .with_context("field_count", self.fields.len().to_string()),
            ));
        }
        let bindings = self.potential.bindings(field_values);
        self.potential
            .terms
            .iter()
            .chain(self.potential.interactions.iter())
            .try_fold(0.0, |total, term| term.eval(&bindings).map(|value| total + value))
    }

    /// Seed for run `run_index` of a batch.
    ///
    /// Deterministic mode always uses the fixed test seed. Otherwise a seed is
    /// derived only when a master seed is configured; `None` tells the evolver
    /// to draw entropy.
    pub fn run_seed(&self, run_index: u64) -> Option<u64> {
        if self.controls.flags.deterministic_seed {
            Some(derive_run_seed(DETERMINISTIC_SEED, run_index))
        } else {
            self.seed
                .master
                .map(|master| derive_run_seed(master, run_index))
        }
    }

    /// RNG for run `run_index`, when [`run_seed`](Self::run_seed) yields a seed.
    pub fn rng_for_run(&self, run_index: u64) -> Option<RngHandle> {
        self.run_seed(run_index).map(RngHandle::from_seed)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ModelError> {
        Format::Json.encode(self)
    }

    /// YAML document.
    pub fn to_yaml(&self) -> Result<String, ModelError> {
        Format::Yaml.encode(self)
    }

    /// SHA-256 of the canonical JSON form.
    pub fn spec_hash(&self) -> Result<String, ModelError> {
        digest(self)
    }
}
