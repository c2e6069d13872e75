//! Derivation of physical values from a validated configuration.
//!
//! Each step depends only on the ones before it: Planck mass, per-field
//! masses, couplings, initial conditions, resonance parameter and the
//! coefficient lists. Lattice and time values come last. Every derived value
//! is checked again, since scaling a valid input by `m` can overflow or
//! underflow.

use std::f64::consts::PI;

use preheat_core::errors::{ErrorInfo, ModelError};

use crate::config::{CoefficientSource, CouplingRule, ModelConfig, Quantity};
use crate::spec::{Couplings, FieldSet, Lattice, TimeStepping, Units};
use crate::validate::{check_time_window, TimeWindow};

fn non_finite(field: impl Into<String>, value: f64) -> ModelError {
    ModelError::InvalidPhysicalParameter(
        ErrorInfo::new("derived_non_finite", "derived value is not finite")
            .with_context("field", field)
            .with_context("value", value.to_string()),
    )
}

fn finite(field: impl Into<String>, value: f64) -> Result<f64, ModelError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(non_finite(field, value))
    }
}

/// Absolute scales: `MPl = sqrt(8π)·mpl` and `m = mass_unit·mpl`.
pub(crate) fn units(config: &ModelConfig) -> Units {
    let mpl = config.units.mpl;
    let units = Units {
        mpl,
        planck_mass: (8.0 * PI).sqrt() * mpl,
        mass_unit: config.units.mass_unit * mpl,
    };
    tracing::debug!(
        mpl = units.mpl,
        planck_mass = units.planck_mass,
        mass_unit = units.mass_unit,
        "derived units"
    );
    units
}

/// Per-field `m²` in absolute units.
pub(crate) fn mass_squared(config: &ModelConfig, units: &Units) -> Result<Vec<f64>, ModelError> {
    let m = units.mass_unit;
    config
        .fields
        .mass_squared
        .iter()
        .enumerate()
        .map(|(index, multiplier)| {
            finite(format!("fields.mass_squared[{index}]"), multiplier * (m * m))
        })
        .collect()
}

pub(crate) fn couplings(config: &ModelConfig, units: &Units) -> Result<Couplings, ModelError> {
    let m = units.mass_unit;
    let lambda = config.couplings.lambda;
    let g2 = match config.couplings.g2 {
        CouplingRule::Value { value } => value,
        CouplingRule::MassSquared { factor } => factor * (m * m),
        CouplingRule::SelfCouplingRatio { ratio } => {
            let lambda = self_coupling(lambda, "couplings.g2")?;
            lambda * lambda / ratio
        }
    };
    let g2 = finite("couplings.g2", g2)?;
    tracing::debug!(?lambda, g2, "derived couplings");
    Ok(Couplings { lambda, g2 })
}

fn self_coupling(lambda: Option<f64>, field: &str) -> Result<f64, ModelError> {
    lambda.ok_or_else(|| {
        ModelError::InvalidPhysicalParameter(
            ErrorInfo::new("coupling_lambda_missing", "rule requires the self-coupling lambda")
                .with_context("field", field),
        )
    })
}

fn resolve(
    quantity: &Quantity,
    field: String,
    units: &Units,
    couplings: &Couplings,
) -> Result<f64, ModelError> {
    let value = match quantity {
        Quantity::Value { value } => *value,
        Quantity::Planck { value } => value * units.mpl,
        Quantity::Mass { value } => value * units.mass_unit,
        Quantity::OscillonAmplitude => {
            let lambda = self_coupling(couplings.lambda, &field)?;
            ((3.0 * lambda) / (5.0 * couplings.g2)).sqrt() * units.mass_unit
        }
    };
    finite(field, value)
}

/// Builds the field set with resolved initial values and derivatives.
pub(crate) fn field_set(
    config: &ModelConfig,
    units: &Units,
    couplings: &Couplings,
) -> Result<FieldSet, ModelError> {
    let resolve_all = |list: &str, quantities: &[Quantity]| {
        quantities
            .iter()
            .enumerate()
            .map(|(index, quantity)| {
                resolve(quantity, format!("{list}[{index}]"), units, couplings)
            })
            .collect::<Result<Vec<_>, _>>()
    };
    let fields = FieldSet {
        names: config.field_names(),
        mass_squared: mass_squared(config, units)?,
        initial_values: resolve_all("fields.initial_values", &config.fields.initial_values)?,
        initial_derivatives: resolve_all(
            "fields.initial_derivatives",
            &config.fields.initial_derivatives,
        )?,
    };
    tracing::debug!(
        names = ?fields.names,
        mass_squared = ?fields.mass_squared,
        initial_values = ?fields.initial_values,
        initial_derivatives = ?fields.initial_derivatives,
        "derived field set"
    );
    Ok(fields)
}

/// `q = g2·f1₀² / (4·m²_f1)`, undefined when the first field is massless.
pub(crate) fn resonance_q(fields: &FieldSet, couplings: &Couplings) -> Option<f64> {
    let m2 = *fields.mass_squared.first()?;
    let f0 = *fields.initial_values.first()?;
    if m2 == 0.0 {
        return None;
    }
    let q = couplings.g2 * (f0 * f0) / (4.0 * m2);
    tracing::debug!(q, "derived resonance parameter");
    Some(q)
}

/// Evaluates each coefficient source against the derived constants.
pub(crate) fn coefficients(
    list: &str,
    sources: &[CoefficientSource],
    units: &Units,
    fields: &FieldSet,
    couplings: &Couplings,
) -> Result<Vec<f64>, ModelError> {
    let m = units.mass_unit;
    let values = sources
        .iter()
        .enumerate()
        .map(|(index, source)| {
            let field = format!("{list}[{index}]");
            let value = match source {
                CoefficientSource::FieldMassSquared { field: which } => which
                    .checked_sub(1)
                    .and_then(|slot| fields.mass_squared.get(slot))
                    .copied()
                    .ok_or_else(|| {
                        let message = "coefficient refers to a missing field";
                        ModelError::InconsistentFieldArity(
                            ErrorInfo::new("coefficient_field", message)
                                .with_context("field", field.clone())
                                .with_context("value", which.to_string()),
                        )
                    })?,
                CoefficientSource::Coupling => couplings.g2,
                CoefficientSource::SelfCoupling => self_coupling(couplings.lambda, &field)?,
                CoefficientSource::CouplingOverMassSquared => couplings.g2 / (m * m),
                CoefficientSource::Value { value } => *value,
            };
            finite(field, value)
        })
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(list, values = ?values, "derived coefficients");
    Ok(values)
}

/// Lattice geometry with the side length converted to absolute units.
pub(crate) fn lattice(config: &ModelConfig, units: &Units) -> Result<Lattice, ModelError> {
    let side_length = config.lattice.side_length.resolve(units.mass_unit);
    if side_length <= 0.0 {
        return Err(ModelError::InvalidPhysicalParameter(
            ErrorInfo::new("derived_non_positive", "derived value underflows to zero")
                .with_context("field", "lattice.side_length")
                .with_context("value", side_length.to_string()),
        ));
    }
    let lattice = Lattice {
        side_length: finite("lattice.side_length", side_length)?,
        points: config.lattice.points,
        a_in: config.lattice.a_in,
        a_limit: config.lattice.a_limit,
        discretization: config.lattice.discretization,
    };
    tracing::debug!(side_length, points = lattice.points, "derived lattice");
    Ok(lattice)
}

/// Time steps and run window in absolute units.
pub(crate) fn time_stepping(
    config: &ModelConfig,
    units: &Units,
) -> Result<TimeStepping, ModelError> {
    let m = units.mass_unit;
    let time = &config.time;
    let window = TimeWindow {
        dtau: time.dtau.resolve(m),
        dtau_hom: time.dtau_hom.resolve(m),
        t_in: time.t_in.resolve(m),
        t_fin: time.t_fin.resolve(m),
        t_fin_hom: time.t_fin_hom.resolve(m),
    };
    check_time_window("time_derived", &window)?;
    tracing::debug!(
        dtau = window.dtau,
        dtau_hom = window.dtau_hom,
        t_fin = window.t_fin,
        "derived time stepping"
    );
    Ok(TimeStepping {
        dtau: window.dtau,
        dtau_hom: window.dtau_hom,
        adaptive: time.adaptive,
        t_in: window.t_in,
        t_fin: window.t_fin,
        t_fin_hom: window.t_fin_hom,
    })
}
