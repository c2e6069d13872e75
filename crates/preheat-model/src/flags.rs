//! Feature toggles, output cadence and the curvature-mode normalisation rule.

use serde::{Deserialize, Serialize};

/// Flush frequency used in curvature mode; large enough that no intermediate
/// write ever happens.
pub const CURVATURE_FLUSH_FREQ: u64 = 256 * 120 * 100_000;

/// Independent boolean toggles read by the evolver, analyzer and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureFlags {
    /// Use linearized evolution until `a_limit`.
    pub linearized: bool,
    /// Solve the homogeneous companion system.
    pub homogeneous: bool,
    /// Run the full nonlinear lattice evolution.
    pub evolve: bool,
    /// Curvature perturbation (zeta) mode.
    pub curvature: bool,
    /// Solve tensor perturbations.
    pub tensor: bool,
    /// Compute spectra.
    pub spectra: bool,
    /// Compute empirical distributions.
    pub distributions: bool,
    /// Compute skewness and kurtosis.
    pub statistics: bool,
    /// Write field data into the output files.
    pub save_fields: bool,
    /// Decompose energy densities per field.
    pub field_energy: bool,
    /// Compute correlation lengths of the per-field energy densities.
    pub correlation_lengths: bool,
    /// Include the de Sitter `-9H²/(4m²)` term in `ω_k²`.
    pub de_sitter: bool,
    /// Seed the initial fluctuations with a fixed seed.
    pub deterministic_seed: bool,
    /// Write the effective mass and comoving number density.
    pub effective_mass: bool,
    /// Export curves to CSV after the run.
    pub csv: bool,
    /// Scale energy densities by `1/m²` on output.
    pub scale: bool,
    /// Collect all runs of a batch under one superfolder.
    pub superfolder: bool,
    /// Write results to disk.
    pub save: bool,
}

impl FeatureFlags {
    /// Returns every flag with its name, in declaration order.
    pub fn entries(&self) -> [(&'static str, bool); 18] {
        [
            ("linearized", self.linearized),
            ("homogeneous", self.homogeneous),
            ("evolve", self.evolve),
            ("curvature", self.curvature),
            ("tensor", self.tensor),
            ("spectra", self.spectra),
            ("distributions", self.distributions),
            ("statistics", self.statistics),
            ("save_fields", self.save_fields),
            ("field_energy", self.field_energy),
            ("correlation_lengths", self.correlation_lengths),
            ("de_sitter", self.de_sitter),
            ("deterministic_seed", self.deterministic_seed),
            ("effective_mass", self.effective_mass),
            ("csv", self.csv),
            ("scale", self.scale),
            ("superfolder", self.superfolder),
            ("save", self.save),
        ]
    }

    /// Names of the flags whose value differs from `other`.
    pub fn changed_from(&self, other: &FeatureFlags) -> Vec<&'static str> {
        self.entries()
            .into_iter()
            .zip(other.entries())
            .filter(|((_, mine), (_, theirs))| mine != theirs)
            .map(|((name, _), _)| name)
            .collect()
    }
}

/// Method used for gravitational-wave spectra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GwSpectrumMethod {
    /// Continuum wave numbers.
    #[default]
    Std,
    /// Effective wave numbers of the discretized Laplacian.
    KEff,
}

/// Output cadence, batching and backend knobs read by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSchedule {
    /// Steps between writes of the lattice run.
    pub flush_freq: u64,
    /// Steps between writes of the homogeneous run.
    pub flush_freq_hom: u64,
    /// Number of runs with identical initial values.
    #[serde(default = "default_sim_num")]
    pub sim_num: u32,
    /// Name of the superfolder collecting a batch.
    pub superfolder_name: String,
    /// Gravitational-wave spectrum method.
    #[serde(default)]
    pub gw_spectrum_method: GwSpectrumMethod,
    /// Register cap per GPU thread; `None` keeps the backend default.
    #[serde(default)]
    pub max_registers: Option<u32>,
}

fn default_sim_num() -> u32 {
    1
}

/// Flags and output schedule, normalised together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunControls {
    /// Feature toggles.
    pub flags: FeatureFlags,
    /// Output schedule.
    pub output: OutputSchedule,
}

impl RunControls {
    /// Applies the curvature-mode rule.
    ///
    /// Curvature mode is authoritative: it turns off evolution and every
    /// analysis product, forces batching into a superfolder without saving
    /// the lattice run, and pushes `flush_freq` out of reach. Without
    /// curvature mode the controls are returned unchanged.
    pub fn normalized(self) -> Self {
        if !self.flags.curvature {
            return self;
        }
        let before = self.flags;
        let flags = FeatureFlags {
            evolve: false,
            spectra: false,
            distributions: false,
            statistics: false,
            save_fields: false,
            field_energy: false,
            correlation_lengths: false,
            deterministic_seed: false,
            effective_mass: false,
            superfolder: true,
            save: false,
            ..before
        };
        let output = OutputSchedule {
            flush_freq: CURVATURE_FLUSH_FREQ,
            ..self.output
        };
        tracing::info!(
            overridden = ?flags.changed_from(&before),
            flush_freq = output.flush_freq,
            "curvature mode normalised run controls"
        );
        Self { flags, output }
    }
}
