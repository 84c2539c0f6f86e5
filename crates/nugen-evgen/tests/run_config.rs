use nugen_core::{pdg, NugenError, ScatteringType};
use nugen_evgen::{
    chunk_ranges, config_hash, generate_batch, read_events_jsonl, write_events_jsonl,
    AlgorithmCatalogue, CacheSharing, RunConfig, RunSummary,
};
use tempfile::tempdir;

const YAML: &str = r#"
probe: -14
energy: 3.5
target:
  z: 8
  a: 16
channels:
  - process: deep-inelastic
    nc: true
    hadronizer: charm-dis
    hadronizer_config:
      params:
        pt2-scale: 0.8
  - process: resonant
    cc: true
    model_config:
      params:
        w-cut: 1.6
events: 250
workers: 4
seed:
  label: beam-run-7
cache:
  sharing: per-worker
  safety_factor: 1.4
  channel_safety:
    DIS: 2.0
driver:
  max_attempts: 20
"#;

#[test]
fn yaml_fills_unspecified_fields_with_defaults() {
    let config = RunConfig::from_yaml_str(YAML).unwrap();
    config.validate().unwrap();
    assert_eq!(config.probe, -pdg::NU_MU);
    assert_eq!(config.target.a, 16);
    assert_eq!(config.channels.len(), 2);
    let dis = &config.channels[0];
    assert!(dis.cc && dis.nc);
    assert_eq!(dis.hadronizer_name(), "charm-dis");
    assert_eq!(dis.hadronizer_config.get_f64("pt2-scale", 0.0), 0.8);
    assert_eq!(config.channels[1].model_config.get_f64("w-cut", 0.0), 1.6);
    assert_eq!(config.cache.sharing, CacheSharing::PerWorker);
    assert_eq!(config.cache.safety_for(ScatteringType::DeepInelastic), 2.0);
    assert_eq!(config.cache.safety_for(ScatteringType::Resonant), 1.4);
    assert_eq!(config.kinematics.max_trials, 1000);
    assert_eq!(config.driver.max_attempts, 20);
    assert!(config.decayer.enabled);
    assert_ne!(config.seed.resolve(), RunConfig::default().seed.resolve());
}

#[test]
fn empty_document_is_the_default_run() {
    let config = RunConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, RunConfig::default());
    assert_eq!(config.cache.safety_factor, 1.25);
    assert_eq!(config.cache.reprobe_tolerance, 0.05);
    assert_eq!(config.driver.max_attempts, 100);
}

#[test]
fn validation_rejects_bad_runs() {
    let cases = [
        ("probe: 13", "probe"),
        ("energy: -1.0", "energy"),
        ("target: {z: 7, a: 6}", "target"),
        ("channels: []", "channels"),
        ("channels: [{process: quasi-elastic, cc: false}]", "channels"),
        ("cache: {safety_factor: 0.9}", "cache"),
        ("driver: {max_attempts: 0}", "driver"),
    ];
    for (yaml, field) in cases {
        let config = RunConfig::from_yaml_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        let info = err.info().unwrap();
        assert_eq!(info.code, "invalid-run-config", "{yaml}");
        assert!(
            info.context["field"].starts_with(field),
            "{yaml}: {:?}",
            info.context
        );
    }
}

#[test]
fn malformed_yaml_is_a_serde_error() {
    let err = RunConfig::from_yaml_str("energy: [1, 2").unwrap_err();
    assert!(matches!(err, NugenError::Serde(_)));
}

#[test]
fn load_reads_and_validates_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.yaml");
    std::fs::write(&path, YAML).unwrap();
    let config = RunConfig::load(&path).unwrap();
    assert_eq!(config.events, 250);

    let missing = RunConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
    assert_eq!(missing.info().unwrap().code, "config-read");
}

#[test]
fn config_hash_tracks_content() {
    let config = RunConfig::default();
    let same = config_hash(&config).unwrap();
    assert_eq!(same, config_hash(&RunConfig::default()).unwrap());
    assert_eq!(same.len(), 64);
    let mut other = config.clone();
    other.energy = 2.0;
    assert_ne!(same, config_hash(&other).unwrap());
}

#[test]
fn chunks_cover_every_event_once() {
    let ranges = chunk_ranges(10, 3);
    assert_eq!(ranges, vec![0..4, 4..7, 7..10]);
    assert_eq!(chunk_ranges(2, 5).len(), 2);
    assert!(chunk_ranges(0, 4).is_empty());
}

#[test]
fn summary_and_events_are_written_to_disk() {
    let config = RunConfig {
        target: nugen_evgen::TargetConfig { z: 0, a: 1 },
        events: 6,
        ..RunConfig::default()
    };
    let output = generate_batch(&config, &AlgorithmCatalogue::builtin()).unwrap();
    let summary = RunSummary::from_batch(&config, &output).unwrap();
    assert_eq!(summary.events_generated, 6);
    assert_eq!(summary.provenance.master_seed, config.seed.resolve());

    let dir = tempdir().unwrap();
    let summary_path = dir.path().join("out").join("summary.json");
    summary.write(&summary_path).unwrap();
    let loaded = RunSummary::load(&summary_path).unwrap();
    assert_eq!(loaded.provenance.config_hash, summary.provenance.config_hash);
    assert_eq!(loaded.stats.events, 6);

    let events_path = dir.path().join("events.jsonl");
    write_events_jsonl(&events_path, &output.events).unwrap();
    let text = std::fs::read_to_string(&events_path).unwrap();
    assert_eq!(text.lines().count(), 6);
    let events = read_events_jsonl(&events_path).unwrap();
    assert_eq!(events.len(), 6);
    assert_eq!(events[3].index, 3);
}
