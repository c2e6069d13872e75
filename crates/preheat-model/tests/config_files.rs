use std::fs;

use preheat_model::{
    load_config, parse_config_str, ConfigFile, CouplingRule, Format, InverseMass, ModelError,
    ModelSpecification, Preset,
};
use tempfile::tempdir;

fn yaml(source: &str) -> serde_yaml::Value {
    serde_yaml::from_str(source).expect("yaml")
}

#[test]
fn overrides_touch_only_addressed_keys() {
    let base = Preset::ChaoticInflation.config().expect("preset");
    let patched = base
        .with_overrides(&yaml("lattice:\n  points: 128\n"))
        .expect("override");
    assert_eq!(patched.lattice.points, 128);

    let mut expected = base.clone();
    expected.lattice.points = 128;
    assert_eq!(patched, expected);
}

#[test]
fn lists_are_replaced_wholesale() {
    let base = Preset::ChaoticInflation.config().expect("preset");
    let patched = base
        .with_overrides(&yaml("fields:\n  mass_squared: [2.0, 0.5]\n"))
        .expect("override");
    assert_eq!(patched.fields.mass_squared, vec![2.0, 0.5]);
    assert_eq!(patched.fields.initial_values, base.fields.initial_values);
}

#[test]
fn tagged_values_switch_variant_cleanly() {
    let base = Preset::ChaoticInflation.config().expect("preset");
    let patched = base
        .with_overrides(&yaml("couplings:\n  g2:\n    type: value\n    value: 2.0e-8\n"))
        .expect("override");
    assert_eq!(patched.couplings.g2, CouplingRule::Value { value: 2.0e-8 });

    let same_variant = base
        .with_overrides(&yaml("couplings:\n  g2:\n    factor: 5.0e3\n"))
        .expect("override");
    assert_eq!(same_variant.couplings.g2, CouplingRule::MassSquared { factor: 5.0e3 });
}

#[test]
fn times_accept_plain_multiples_and_ratios() {
    let base = Preset::ChaoticInflation.config().expect("preset");
    assert_eq!(
        base.time.dtau_hom,
        InverseMass::Ratio {
            numerator: 1.0,
            divisor: 10000.0
        }
    );

    let patched = base
        .with_overrides(&yaml("time:\n  dtau_hom: 2.0e-4\n  dtau:\n    divisor: 512.0\n"))
        .expect("override");
    assert_eq!(patched.time.dtau_hom, InverseMass::Multiple(2.0e-4));
    assert_eq!(
        patched.time.dtau,
        InverseMass::Ratio {
            numerator: 2.0,
            divisor: 512.0
        }
    );

    let spec = ModelSpecification::build(&patched).expect("build");
    let m = 1e-6;
    assert_eq!(spec.time().dtau, 2.0 / (512.0 * m));
    assert_eq!(spec.time().dtau_hom, 2.0e-4 / m);

    let err = base
        .with_overrides(&yaml("time:\n  dtau:\n    numerator: 1.0\n    scale: 3.0\n"))
        .expect_err("unknown key");
    assert_eq!(err.code(), "override_apply");
}

#[test]
fn unknown_override_keys_are_errors() {
    let base = Preset::Oscillon.config().expect("preset");
    let err = base
        .with_overrides(&yaml("lattice:\n  pointz: 64\n"))
        .expect_err("typo");
    assert!(matches!(err, ModelError::Serde(_)));
    assert_eq!(err.code(), "override_apply");
}

#[test]
fn empty_overrides_keep_the_preset() {
    let base = Preset::Oscillon.config().expect("preset");
    let patched = base.with_overrides(&serde_yaml::Value::Null).expect("no-op");
    assert_eq!(patched, base);
}

#[test]
fn preset_file_with_overrides_loads() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("run.yaml");
    fs::write(
        &path,
        "preset: oscillon\noverrides:\n  lattice:\n    points: 64\n  output:\n    sim_num: 4\n",
    )
    .expect("write config");

    let config = load_config(&path).expect("load");
    assert_eq!(config.lattice.points, 64);
    assert_eq!(config.output.sim_num, 4);
    let spec = ModelSpecification::build(&config).expect("build");
    assert_eq!(spec.lattice().points, 64);
    assert_eq!(spec.output().sim_num, 4);
}

#[test]
fn json_files_are_detected_by_extension() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("run.json");
    fs::write(
        &path,
        r#"{"preset": "chaotic-inflation",
            "overrides": {"flags": {"curvature": true}, "output": {"sim_num": 8}}}"#,
    )
    .expect("write config");

    let config = load_config(&path).expect("load");
    assert!(config.flags.curvature);
    let spec = ModelSpecification::build(&config).expect("build");
    assert!(spec.flags().superfolder);
    assert_eq!(spec.output().sim_num, 8);
}

#[test]
fn inline_model_file_round_trips() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("inline.yaml");
    let config = Preset::ChaoticInflation.config().expect("preset");
    let document = ConfigFile {
        model: Some(config.clone()),
        ..ConfigFile::default()
    };
    fs::write(&path, Format::Yaml.encode(&document).expect("yaml")).expect("write config");

    let loaded = load_config(&path).expect("load");
    assert_eq!(loaded, config);
}

#[test]
fn documents_need_exactly_one_source() {
    let err = parse_config_str("overrides:\n  lattice:\n    points: 64\n").expect_err("no source");
    assert_eq!(err.code(), "config_source_missing");

    let inline = Format::Yaml.encode(&Preset::Oscillon.config().expect("preset")).expect("yaml");
    let indented: String = inline.lines().map(|line| format!("  {line}\n")).collect();
    let both = format!("preset: oscillon\nmodel:\n{indented}");
    let err = parse_config_str(&both).expect_err("two sources");
    assert_eq!(err.code(), "config_source_ambiguous");

    let err = parse_config_str("preset: hybrid\n").expect_err("unknown preset");
    assert!(matches!(err, ModelError::UnknownPreset(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("absent.yaml");
    let err = load_config(&path).expect_err("missing");
    match err {
        ModelError::Io(info) => {
            assert_eq!(info.code, "config_read");
            assert_eq!(info.context["path"], path.display().to_string());
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn malformed_file_names_its_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "preset: [oscillon\n").expect("write config");
    let err = load_config(&path).expect_err("malformed");
    assert!(matches!(err, ModelError::Serde(_)));
    assert_eq!(err.info().context["path"], path.display().to_string());
}
