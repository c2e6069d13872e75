//! Configuration checks run before any derivation.

use preheat_core::errors::{ErrorInfo, ModelError};
use preheat_expr::{parse_expr, Expr, Placeholders};

use crate::config::{
    CoefficientSource, CouplingRule, FieldsConfig, LatticeConfig, ModelConfig, PotentialConfig,
    Quantity, TimeConfig,
};
use crate::flags::OutputSchedule;

/// Parsed potential expressions, ready for derivation.
#[derive(Debug)]
pub(crate) struct ParsedPotential {
    pub terms: Vec<Expr>,
    pub interactions: Vec<Expr>,
    pub power_terms: Vec<Expr>,
}

fn physical(code: &str, field: &str, message: &str, value: impl ToString) -> ModelError {
    ModelError::InvalidPhysicalParameter(
        ErrorInfo::new(code, message)
            .with_context("field", field)
            .with_context("value", value.to_string()),
    )
}

fn require_positive(code: &str, field: &str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(physical(code, field, "must be finite and strictly positive", value))
    }
}

fn require_finite(code: &str, field: &str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(physical(code, field, "must be finite", value))
    }
}

/// Checks every per-field array against the mass list and returns the field count.
pub(crate) fn check_field_arity(fields: &FieldsConfig) -> Result<usize, ModelError> {
    let count = fields.mass_squared.len();
    if count == 0 {
        return Err(ModelError::InconsistentFieldArity(
            ErrorInfo::new("field_empty", "a model needs at least one field")
                .with_context("field", "fields.mass_squared"),
        ));
    }
    let names = if fields.names.is_empty() {
        count
    } else {
        fields.names.len()
    };
    let lengths = [
        ("fields.names", names),
        ("fields.initial_values", fields.initial_values.len()),
        ("fields.initial_derivatives", fields.initial_derivatives.len()),
    ];
    for (field, len) in lengths {
        if len != count {
            return Err(ModelError::InconsistentFieldArity(
                ErrorInfo::new("field_arity", "per-field arrays differ in length")
                    .with_context("field", field)
                    .with_context("length", len.to_string())
                    .with_context("mass_squared_length", count.to_string()),
            ));
        }
    }
    Ok(count)
}

/// The spectral transform downstream needs a power-of-two grid.
pub(crate) fn check_lattice(lattice: &LatticeConfig) -> Result<(), ModelError> {
    if !lattice.points.is_power_of_two() {
        let lower = match lattice.points {
            0 => 1,
            points => 1u64 << (63 - points.leading_zeros()),
        };
        return Err(ModelError::InvalidLatticeSize(
            ErrorInfo::new("lattice_points", "lattice point count must be a power of two")
                .with_context("field", "lattice.points")
                .with_context("value", lattice.points.to_string())
                .with_hint(format!(
                    "nearest valid sizes are {lower} and {}",
                    lower.saturating_mul(2)
                )),
        ));
    }
    require_positive("lattice_side", "lattice.side_length", lattice.side_length.multiple())?;
    require_positive("lattice_a_in", "lattice.a_in", lattice.a_in)?;
    require_finite("lattice_a_limit", "lattice.a_limit", lattice.a_limit)
}

/// Time steps and end times must be strictly positive, and the run window non-empty.
///
/// Values are compared in units of `1/m`; the derivation repeats the check on
/// the absolute values.
pub(crate) fn check_time(time: &TimeConfig) -> Result<(), ModelError> {
    let time = TimeWindow {
        dtau: time.dtau.multiple(),
        dtau_hom: time.dtau_hom.multiple(),
        t_in: time.t_in.multiple(),
        t_fin: time.t_fin.multiple(),
        t_fin_hom: time.t_fin_hom.multiple(),
    };
    check_time_window("time_non_positive", &time)
}

/// Time values checked both before and after conversion to absolute units.
pub(crate) struct TimeWindow {
    pub dtau: f64,
    pub dtau_hom: f64,
    pub t_in: f64,
    pub t_fin: f64,
    pub t_fin_hom: f64,
}

pub(crate) fn check_time_window(code: &str, time: &TimeWindow) -> Result<(), ModelError> {
    let positive = [
        ("time.dtau", time.dtau),
        ("time.dtau_hom", time.dtau_hom),
        ("time.t_fin", time.t_fin),
        ("time.t_fin_hom", time.t_fin_hom),
    ];
    for (field, value) in positive {
        if !(value.is_finite() && value > 0.0) {
            return Err(ModelError::NonPositiveTimeParameter(
                ErrorInfo::new(code, "time parameter must be finite and strictly positive")
                    .with_context("field", field)
                    .with_context("value", value.to_string()),
            ));
        }
    }
    require_finite("time_t_in", "time.t_in", time.t_in)?;
    for (field, end) in [("time.t_fin", time.t_fin), ("time.t_fin_hom", time.t_fin_hom)] {
        if end <= time.t_in {
            return Err(ModelError::NonPositiveTimeParameter(
                ErrorInfo::new("time_window", "run window must have positive length")
                    .with_context("field", field)
                    .with_context("value", end.to_string())
                    .with_context("t_in", time.t_in.to_string()),
            ));
        }
    }
    Ok(())
}

/// Scales, masses, couplings and background values.
pub(crate) fn check_physical(config: &ModelConfig) -> Result<(), ModelError> {
    require_positive("units_mpl", "units.mpl", config.units.mpl)?;
    require_positive("units_mass", "units.mass_unit", config.units.mass_unit)?;
    for (index, value) in config.fields.mass_squared.iter().enumerate() {
        if !(value.is_finite() && *value >= 0.0) {
            return Err(physical(
                "mass_squared",
                &format!("fields.mass_squared[{index}]"),
                "mass squared must be finite and non-negative",
                value,
            ));
        }
    }
    for (list, quantities) in [
        ("fields.initial_values", &config.fields.initial_values),
        ("fields.initial_derivatives", &config.fields.initial_derivatives),
    ] {
        for (index, quantity) in quantities.iter().enumerate() {
            let field = format!("{list}[{index}]");
            match quantity {
                Quantity::Value { value }
                | Quantity::Planck { value }
                | Quantity::Mass { value } => require_finite("initial_value", &field, *value)?,
                Quantity::OscillonAmplitude => require_lambda(config, &field)?,
            }
        }
    }
    if let Some(lambda) = config.couplings.lambda {
        require_finite("coupling_lambda", "couplings.lambda", lambda)?;
    }
    match config.couplings.g2 {
        CouplingRule::Value { value } => {
            require_finite("coupling_g2", "couplings.g2.value", value)?
        }
        CouplingRule::MassSquared { factor } => {
            require_finite("coupling_g2", "couplings.g2.factor", factor)?
        }
        CouplingRule::SelfCouplingRatio { ratio } => {
            require_lambda(config, "couplings.g2")?;
            if !(ratio.is_finite() && ratio != 0.0) {
                return Err(physical(
                    "coupling_ratio",
                    "couplings.g2.ratio",
                    "ratio must be finite and non-zero",
                    ratio,
                ));
            }
        }
    }
    for (field, value) in [
        ("background.rho_r0", config.background.rho_r0),
        ("background.rho_m0", config.background.rho_m0),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            let message = "energy density must be non-negative";
            return Err(physical("background", field, message, value));
        }
    }
    require_finite("curvature_h_ref", "curvature.h_ref", config.curvature.h_ref)?;
    check_output(&config.output)
}

fn require_lambda(config: &ModelConfig, field: &str) -> Result<(), ModelError> {
    if config.couplings.lambda.is_some() {
        Ok(())
    } else {
        Err(ModelError::InvalidPhysicalParameter(
            ErrorInfo::new("coupling_lambda_missing", "rule requires the self-coupling lambda")
                .with_context("field", field)
                .with_hint("set couplings.lambda"),
        ))
    }
}

fn check_output(output: &OutputSchedule) -> Result<(), ModelError> {
    for (field, value) in [
        ("output.flush_freq", output.flush_freq),
        ("output.flush_freq_hom", output.flush_freq_hom),
        ("output.sim_num", u64::from(output.sim_num)),
    ] {
        if value == 0 {
            return Err(physical("output_zero", field, "must be at least one", value));
        }
    }
    Ok(())
}

fn locate(err: ModelError, location: String) -> ModelError {
    match err {
        ModelError::InvalidExpression(info) => {
            ModelError::InvalidExpression(info.with_context("field", location))
        }
        other => other,
    }
}

fn parse_list(list: &str, sources: &[String]) -> Result<Vec<Expr>, ModelError> {
    sources
        .iter()
        .enumerate()
        .map(|(index, source)| {
            parse_expr(source).map_err(|err| locate(err, format!("{list}[{index}]")))
        })
        .collect()
}

/// Parses every expression and checks placeholder arity against the
/// coefficient lists and the field count.
pub(crate) fn parse_potential(
    potential: &PotentialConfig,
    field_count: usize,
) -> Result<ParsedPotential, ModelError> {
    let terms = parse_list("potential.terms", &potential.terms)?;
    let interactions = parse_list("potential.interactions", &potential.interactions)?;
    let power_terms = parse_list("potential.power_terms", &potential.power_terms)?;

    let placeholders = Placeholders::collect_all(terms.iter().chain(interactions.iter()));
    placeholders.check_field_arity(field_count)?;
    placeholders.check_coefficient_arity(potential.coefficients.len())?;
    placeholders.check_bare_arity(potential.bare_coefficients.len())?;

    for (index, term) in power_terms.iter().enumerate() {
        let used = Placeholders::collect(term);
        used.check_field_arity(field_count)?;
        if !used.coefficients.is_empty() || !used.bare.is_empty() {
            return Err(ModelError::InvalidExpression(
                ErrorInfo::new("power_term_slots", "power terms may only reference fields")
                    .with_context("field", format!("potential.power_terms[{index}]"))
                    .with_context("expression", term.to_string()),
            ));
        }
    }

    for (list, sources) in [
        ("potential.coefficients", &potential.coefficients),
        ("potential.bare_coefficients", &potential.bare_coefficients),
    ] {
        for (index, source) in sources.iter().enumerate() {
            if let CoefficientSource::FieldMassSquared { field } = source {
                if *field == 0 || *field > field_count {
                    return Err(ModelError::InconsistentFieldArity(
                        ErrorInfo::new("coefficient_field", "coefficient refers to a missing field")
                            .with_context("field", format!("{list}[{index}]"))
                            .with_context("value", field.to_string())
                            .with_context("field_count", field_count.to_string()),
                    ));
                }
            }
        }
    }

    Ok(ParsedPotential {
        terms,
        interactions,
        power_terms,
    })
}

/// Coefficient sources that need `λ` fail early when it is missing.
pub(crate) fn check_coefficient_sources(config: &ModelConfig) -> Result<(), ModelError> {
    let sources = config
        .potential
        .coefficients
        .iter()
        .chain(config.potential.bare_coefficients.iter());
    for source in sources {
        match source {
            CoefficientSource::SelfCoupling => require_lambda(config, "potential.coefficients")?,
            CoefficientSource::Value { value } => {
                require_finite("coefficient_value", "potential.coefficients", *value)?
            }
            _ => {}
        }
    }
    Ok(())
}
