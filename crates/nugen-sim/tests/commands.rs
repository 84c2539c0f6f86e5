use std::fs;
use std::path::Path;

use nugen_evgen::{read_events_jsonl, RunSummary};
use nugen_sim::commands::check_config::{self, CheckConfigArgs};
use nugen_sim::commands::generate::{self, GenerateArgs};
use nugen_sim::commands::xsec::{self, XsecArgs};

const CONFIG: &str = r#"
probe: 14
energy: 1.5
target:
  z: 0
  a: 1
channels:
  - process: quasi-elastic
events: 12
seed:
  master_seed: 11
"#;

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("run.yaml");
    fs::write(&path, CONFIG).expect("config written");
    path
}

#[test]
fn generate_writes_summary_events_and_config_copy() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(dir.path());
    let out = dir.path().join("out");
    let args = GenerateArgs {
        config,
        out: out.clone(),
        events: Some(5),
        seed: None,
        workers: Some(2),
    };

    let summary = generate::run(&args).expect("generation succeeds");
    assert_eq!(summary.events_requested, 5);
    assert_eq!(summary.events_generated, 5);

    let loaded = RunSummary::load(&out.join("summary.json")).expect("summary readable");
    assert_eq!(loaded.events_generated, 5);
    let events = read_events_jsonl(&out.join("events.jsonl")).expect("events readable");
    assert_eq!(events.len(), 5);
    assert!(events.windows(2).all(|pair| pair[0].index < pair[1].index));
    assert_eq!(
        fs::read_to_string(out.join("config.yaml")).expect("copy present"),
        CONFIG
    );
}

#[test]
fn seed_override_changes_resolved_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = GenerateArgs {
        config: write_config(dir.path()),
        out: dir.path().join("out"),
        events: None,
        seed: Some(99),
        workers: None,
    };
    let config = generate::resolve_config(&args).expect("config resolves");
    assert_eq!(config.seed.master_seed, 99);
    assert_eq!(config.events, 12);
    assert_eq!(config.workers, 1);
}

#[test]
fn zero_workers_override_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = GenerateArgs {
        config: write_config(dir.path()),
        out: dir.path().join("out"),
        events: None,
        seed: None,
        workers: Some(0),
    };
    assert!(generate::resolve_config(&args).is_err());
}

#[test]
fn xsec_lists_the_charged_current_interaction() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = xsec::run(&XsecArgs {
        config: write_config(dir.path()),
    })
    .expect("xsec succeeds");
    assert!(!table.is_empty());
    assert!(table.iter().all(|entry| entry.channel == "QES"));
    assert!(table.iter().all(|entry| entry.integral > 0.0));
}

#[test]
fn check_config_reports_stage_layout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let layout = check_config::run(&CheckConfigArgs {
        config: write_config(dir.path()),
    })
    .expect("pipelines build");
    assert_eq!(layout.len(), 1);
    assert_eq!(layout[0].0, "QES");
    assert_eq!(layout[0].1.first().map(String::as_str), Some("initial-state"));
}

#[test]
fn missing_config_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = check_config::run(&CheckConfigArgs {
        config: dir.path().join("absent.yaml"),
    });
    assert!(result.is_err());
}
