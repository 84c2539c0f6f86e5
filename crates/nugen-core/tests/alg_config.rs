use nugen_core::{AlgConfig, NugenError, ParamValue};

#[test]
fn parameters_fall_back_to_defaults() {
    let config = AlgConfig::new()
        .with_param("MA", ParamValue::Double(1.05))
        .with_param("bins", ParamValue::Int(201))
        .with_param("transparent", ParamValue::Bool(true));

    assert_eq!(config.get_f64("MA", 0.99), 1.05);
    assert_eq!(config.get_f64("bins", 0.0), 201.0);
    assert_eq!(config.get_i64("missing", 7), 7);
    assert!(config.get_bool("transparent", false));
    assert_eq!(config.get_str("mode", "woods-saxon"), "woods-saxon");
}

#[test]
fn missing_required_entries_are_config_errors() {
    let config = AlgConfig::new().with_sub_algorithm("xsec", "qel-dipole");
    assert_eq!(config.sub_algorithm("xsec").expect("present"), "qel-dipole");
    assert!(matches!(config.sub_algorithm("hadronizer"), Err(NugenError::Config(_))));
    assert!(matches!(config.require_f64("MA"), Err(NugenError::Config(_))));
}

#[test]
fn untagged_values_parse_from_json() {
    let json = r#"{"params":{"MA":0.99,"bins":201,"on":true,"name":"dipole"},"sub_algorithms":{"xsec":"qel-dipole"}}"#;
    let config: AlgConfig = serde_json::from_str(json).expect("parse");
    assert_eq!(config.params.get("bins"), Some(&ParamValue::Int(201)));
    assert_eq!(config.params.get("MA"), Some(&ParamValue::Double(0.99)));
    assert_eq!(config.require_str("name").expect("string"), "dipole");
}
