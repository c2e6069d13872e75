use preheat_core::errors::{ErrorInfo, ModelError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("field", "lattice.points")
        .with_context("value", "100")
}

#[test]
fn lattice_error_surface() {
    let err = ModelError::InvalidLatticeSize(sample_info("lattice_points", "not a power of two"));
    assert_eq!(err.code(), "lattice_points");
    assert_eq!(err.info().context["value"], "100");
}

#[test]
fn arity_error_surface() {
    let err = ModelError::CoefficientArityMismatch(sample_info("coefficient_arity", "3 != 2"));
    assert_eq!(err.info().code, "coefficient_arity");
    assert!(err.info().context.contains_key("field"));
}

#[test]
fn time_error_surface() {
    let err = ModelError::NonPositiveTimeParameter(sample_info("time_dtau", "dtau <= 0"));
    assert_eq!(err.code(), "time_dtau");
}

#[test]
fn field_error_surface() {
    let err = ModelError::InconsistentFieldArity(sample_info("field_arity", "length mismatch"));
    assert_eq!(err.code(), "field_arity");
}

#[test]
fn display_includes_context_and_hint() {
    let err = ModelError::InvalidLatticeSize(
        sample_info("lattice_points", "not a power of two").with_hint("use 64 or 128"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("invalid lattice size: not a power of two"));
    assert!(rendered.contains("field=lattice.points, value=100"));
    assert!(rendered.ends_with("hint: use 64 or 128"));
}

#[test]
fn errors_round_trip_json() {
    let err = ModelError::InvalidPhysicalParameter(sample_info("mass_squared", "negative"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"InvalidPhysicalParameter\""));
    let decoded: ModelError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}

#[test]
fn display_omits_empty_context_and_hint() {
    let bare = ErrorInfo::new("preset_unknown", "no such preset");
    assert_eq!(bare.to_string(), "no such preset (code: preset_unknown)");

    let info = ErrorInfo::new("time_derived", "time parameter must be finite and strictly positive")
        .with_context("value", "0")
        .with_context("field", "time.dtau");
    assert_eq!(
        info.to_string(),
        "time parameter must be finite and strictly positive (code: time_derived) \
         | context: [field=time.dtau, value=0]"
    );
}

#[test]
fn later_context_entries_replace_earlier_ones() {
    let info = ErrorInfo::new("lattice_points", "not a power of two")
        .with_context("value", "100")
        .with_context("value", "96");
    assert_eq!(info.context.len(), 1);
    assert_eq!(info.context["value"], "96");
}
