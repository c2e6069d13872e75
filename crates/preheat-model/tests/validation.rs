use preheat_model::{
    CoefficientSource, CouplingRule, InverseMass, ModelConfig, ModelError, ModelSpecification,
    Preset, Quantity,
};
use proptest::prelude::*;

fn chaotic() -> ModelConfig {
    Preset::ChaoticInflation.config().expect("preset")
}

fn build_err(config: &ModelConfig) -> ModelError {
    ModelSpecification::build(config).expect_err("invalid configuration")
}

#[test]
fn non_power_of_two_lattice_is_rejected() {
    let mut config = chaotic();
    config.lattice.points = 100;
    match build_err(&config) {
        ModelError::InvalidLatticeSize(info) => {
            assert_eq!(info.context["field"], "lattice.points");
            assert_eq!(info.context["value"], "100");
            assert_eq!(info.hint.as_deref(), Some("nearest valid sizes are 64 and 128"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn power_of_two_lattices_build() {
    for points in [64, 128] {
        let mut config = chaotic();
        config.lattice.points = points;
        let spec = ModelSpecification::build(&config).expect("power of two");
        assert_eq!(spec.lattice().points, points);
    }
}

#[test]
fn zero_lattice_is_rejected() {
    let mut config = chaotic();
    config.lattice.points = 0;
    assert!(matches!(build_err(&config), ModelError::InvalidLatticeSize(_)));
}

#[test]
fn zero_time_step_is_rejected() {
    let mut config = chaotic();
    config.time.dtau = InverseMass::Multiple(0.0);
    match build_err(&config) {
        ModelError::NonPositiveTimeParameter(info) => {
            assert_eq!(info.code, "time_non_positive");
            assert_eq!(info.context["field"], "time.dtau");
            assert_eq!(info.context["value"], "0");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn negative_and_nan_time_parameters_are_rejected() {
    let mut config = chaotic();
    config.time.t_fin_hom = InverseMass::Multiple(-1.0);
    let err = build_err(&config);
    assert!(matches!(err, ModelError::NonPositiveTimeParameter(_)));
    assert_eq!(err.info().context["field"], "time.t_fin_hom");

    let mut config = chaotic();
    config.time.dtau_hom = InverseMass::Multiple(f64::NAN);
    assert!(matches!(build_err(&config), ModelError::NonPositiveTimeParameter(_)));
}

#[test]
fn zero_divisor_is_rejected() {
    let mut config = chaotic();
    config.time.dtau_hom = InverseMass::Ratio {
        numerator: 1.0,
        divisor: 0.0,
    };
    let err = build_err(&config);
    assert_eq!(err.code(), "time_non_positive");
    assert_eq!(err.info().context["field"], "time.dtau_hom");
}

#[test]
fn time_step_underflowing_after_scaling_is_rejected() {
    let mut config = chaotic();
    config.units.mass_unit = 1e100;
    config.time.dtau = InverseMass::Multiple(1e-300);
    match build_err(&config) {
        ModelError::NonPositiveTimeParameter(info) => {
            assert_eq!(info.code, "time_derived");
            assert_eq!(info.context["field"], "time.dtau");
            assert_eq!(info.context["value"], "0");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn end_time_overflowing_after_scaling_is_rejected() {
    let mut config = chaotic();
    config.units.mass_unit = 1e-300;
    config.time.t_fin = InverseMass::Multiple(1e10);
    let err = build_err(&config);
    assert!(matches!(err, ModelError::NonPositiveTimeParameter(_)));
    assert_eq!(err.code(), "time_derived");
    assert_eq!(err.info().context["field"], "time.t_fin");
    assert_eq!(err.info().context["value"], "inf");
}

#[test]
fn side_length_out_of_range_after_scaling_is_rejected() {
    let mut config = chaotic();
    config.units.mass_unit = 1e-300;
    config.lattice.side_length = InverseMass::Multiple(1e10);
    let err = build_err(&config);
    assert!(matches!(err, ModelError::InvalidPhysicalParameter(_)));
    assert_eq!(err.code(), "derived_non_finite");
    assert_eq!(err.info().context["field"], "lattice.side_length");

    let mut config = chaotic();
    config.units.mass_unit = 1e150;
    config.lattice.side_length = InverseMass::Multiple(1e-200);
    let err = build_err(&config);
    assert_eq!(err.code(), "derived_non_positive");
    assert_eq!(err.info().context["field"], "lattice.side_length");
}

#[test]
fn mass_squared_overflowing_after_scaling_is_rejected() {
    let mut config = chaotic();
    config.units.mass_unit = 1e200;
    config.couplings.g2 = CouplingRule::Value { value: 1e-8 };
    match build_err(&config) {
        ModelError::InvalidPhysicalParameter(info) => {
            assert_eq!(info.code, "derived_non_finite");
            assert_eq!(info.context["field"], "fields.mass_squared[0]");
            assert_eq!(info.context["value"], "inf");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn end_time_before_start_is_rejected() {
    let mut config = chaotic();
    config.time.t_in = InverseMass::Multiple(300.0);
    let err = build_err(&config);
    assert_eq!(err.code(), "time_window");
}

#[test]
fn lattice_is_checked_before_time() {
    let mut config = chaotic();
    config.lattice.points = 100;
    config.time.dtau = InverseMass::Multiple(0.0);
    assert!(matches!(build_err(&config), ModelError::InvalidLatticeSize(_)));
}

#[test]
fn mismatched_field_arrays_are_rejected() {
    let mut config = chaotic();
    config.fields.initial_values.pop();
    match build_err(&config) {
        ModelError::InconsistentFieldArity(info) => {
            assert_eq!(info.code, "field_arity");
            assert_eq!(info.context["field"], "fields.initial_values");
            assert_eq!(info.context["length"], "1");
            assert_eq!(info.context["mass_squared_length"], "2");
        }
        other => panic!("unexpected error {other:?}"),
    }

    let mut config = chaotic();
    config.fields.names = vec!["phi".into()];
    assert!(matches!(build_err(&config), ModelError::InconsistentFieldArity(_)));
}

#[test]
fn terms_referencing_missing_fields_are_rejected() {
    let mut config = chaotic();
    config.potential.interactions = vec!["0.5*C3*f1**2*f3**2".into()];
    let err = build_err(&config);
    assert!(matches!(err, ModelError::InconsistentFieldArity(_)));
    assert_eq!(err.info().context["placeholder"], "f3");
}

#[test]
fn coefficient_count_must_match_placeholders() {
    let mut config = chaotic();
    config.potential.coefficients.pop();
    match build_err(&config) {
        ModelError::CoefficientArityMismatch(info) => {
            assert_eq!(info.context["field"], "potential.coefficients");
            assert_eq!(info.context["referenced"], "C1,C2,C3");
            assert_eq!(info.context["supplied"], "2");
        }
        other => panic!("unexpected error {other:?}"),
    }

    let mut config = chaotic();
    config.potential.coefficients.push(CoefficientSource::Value { value: 1.0 });
    assert!(matches!(build_err(&config), ModelError::CoefficientArityMismatch(_)));
}

#[test]
fn bare_coefficients_follow_the_same_rule() {
    let mut config = chaotic();
    config.potential.terms.push("D1*f2".into());
    let err = build_err(&config);
    assert_eq!(err.code(), "bare_coefficient_arity");

    config.potential.bare_coefficients = vec![CoefficientSource::Value { value: 0.25 }];
    let spec = ModelSpecification::build(&config).expect("bound bare slot");
    assert_eq!(spec.potential().bare_coefficients, vec![0.25]);
}

#[test]
fn unparsable_terms_report_their_location() {
    let mut config = chaotic();
    config.potential.terms[1] = "0.5*C2*".into();
    match build_err(&config) {
        ModelError::InvalidExpression(info) => {
            assert_eq!(info.context["field"], "potential.terms[1]");
            assert_eq!(info.context["expression"], "0.5*C2*");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn deeply_nested_terms_fail_without_exhausting_the_stack() {
    let mut config = chaotic();
    config.potential.terms[0] = format!("{}0.5*C1*f1**2{}", "(".repeat(50_000), ")".repeat(50_000));
    let err = build_err(&config);
    assert!(matches!(err, ModelError::InvalidExpression(_)));
    assert_eq!(err.code(), "expr_depth");
    assert_eq!(err.info().context["field"], "potential.terms[0]");
}

#[test]
fn power_terms_may_not_bind_coefficients() {
    let mut config = chaotic();
    config.potential.power_terms = vec!["sin(f1)".into()];
    ModelSpecification::build(&config).expect("field-only power term");

    config.potential.power_terms = vec!["C1*f1".into()];
    let err = build_err(&config);
    assert!(matches!(err, ModelError::InvalidExpression(_)));
    assert_eq!(err.code(), "power_term_slots");
}

#[test]
fn negative_mass_squared_is_rejected() {
    let mut config = chaotic();
    config.fields.mass_squared[1] = -1.0;
    match build_err(&config) {
        ModelError::InvalidPhysicalParameter(info) => {
            assert_eq!(info.context["field"], "fields.mass_squared[1]");
            assert_eq!(info.context["value"], "-1");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn scales_must_be_positive() {
    let mut config = chaotic();
    config.units.mass_unit = 0.0;
    assert!(matches!(build_err(&config), ModelError::InvalidPhysicalParameter(_)));

    let mut config = chaotic();
    config.lattice.side_length = InverseMass::Multiple(-5.0);
    assert_eq!(build_err(&config).info().context["field"], "lattice.side_length");

    let mut config = chaotic();
    config.output.flush_freq = 0;
    assert_eq!(build_err(&config).info().context["field"], "output.flush_freq");

    let mut config = chaotic();
    config.output.sim_num = 0;
    assert_eq!(build_err(&config).info().context["field"], "output.sim_num");
}

#[test]
fn rules_needing_lambda_fail_without_it() {
    let mut config = Preset::Oscillon.config().expect("preset");
    config.couplings.lambda = None;
    let err = build_err(&config);
    assert!(matches!(err, ModelError::InvalidPhysicalParameter(_)));
    assert_eq!(err.code(), "coupling_lambda_missing");
}

#[test]
fn coefficients_must_name_existing_fields() {
    let mut config = chaotic();
    config.potential.coefficients[1] = CoefficientSource::FieldMassSquared { field: 3 };
    let err = build_err(&config);
    assert!(matches!(err, ModelError::InconsistentFieldArity(_)));
    assert_eq!(err.info().context["field"], "potential.coefficients[1]");
}

#[test]
fn massless_first_field_has_no_resonance_parameter() {
    let mut config = chaotic();
    config.fields.mass_squared = vec![0.0, 1.0];
    config.fields.initial_values[0] = Quantity::Mass { value: 2.0 };
    let spec = ModelSpecification::build(&config).expect("massless inflaton");
    assert_eq!(spec.resonance_q(), None);
}

proptest! {
    #[test]
    fn only_powers_of_two_build(points in 1u64..5000) {
        let mut config = chaotic();
        config.lattice.points = points;
        let result = ModelSpecification::build(&config);
        if points.is_power_of_two() {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(matches!(result, Err(ModelError::InvalidLatticeSize(_))));
        }
    }

    #[test]
    fn field_arrays_stay_aligned(count in 1usize..6) {
        let mut config = chaotic();
        config.fields.names = Vec::new();
        config.fields.mass_squared = vec![1.0; count];
        config.fields.initial_values = vec![Quantity::Value { value: 0.1 }; count];
        config.fields.initial_derivatives = vec![Quantity::Mass { value: 0.0 }; count];
        config.potential.terms = (1..=count).map(|i| format!("0.5*C{i}*f{i}**2")).collect();
        config.potential.interactions = Vec::new();
        config.potential.coefficients = (1..=count)
            .map(|field| CoefficientSource::FieldMassSquared { field })
            .collect();
        let spec = ModelSpecification::build(&config).expect("aligned fields");
        let fields = spec.fields();
        prop_assert_eq!(fields.len(), count);
        prop_assert_eq!(fields.mass_squared.len(), count);
        prop_assert_eq!(fields.initial_values.len(), count);
        prop_assert_eq!(fields.initial_derivatives.len(), count);
        prop_assert_eq!(spec.potential().coefficients.len(), count);
    }
}
