use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use nugen_core::rng::stable_label_hash;
use nugen_core::{pdg, AlgConfig, ErrorInfo, NugenError, ScatteringType, Target};
use nugen_intranuke::CascadeConfig;
use nugen_xsec::{
    CohReinSehgalToy, DisScaling, KovalenkoQelCharm, MaxSearch, MecGaussian, NuElastic,
    QelDipole, ResBreitWigner,
};

/// Target nucleus. `a == 1` selects a free nucleon (proton when `z == 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Proton number.
    #[serde(default = "default_z")]
    pub z: u32,
    /// Mass number.
    #[serde(default = "default_a")]
    pub a: u32,
}

fn default_z() -> u32 {
    6
}

fn default_a() -> u32 {
    12
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            z: default_z(),
            a: default_a(),
        }
    }
}

impl TargetConfig {
    /// Target description used to build interactions.
    pub fn target(&self) -> Target {
        if self.a == 1 {
            Target::free_nucleon(if self.z == 1 { pdg::PROTON } else { pdg::NEUTRON })
        } else {
            Target::nucleus(self.z, self.a)
        }
    }
}

/// One enabled interaction channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Scattering family.
    pub process: ScatteringType,
    /// Enable charged-current interactions.
    #[serde(default = "default_true")]
    pub cc: bool,
    /// Enable neutral-current interactions.
    #[serde(default)]
    pub nc: bool,
    /// Cross-section model name; defaults per process.
    #[serde(default)]
    pub model: Option<String>,
    /// Cross-section model parameters.
    #[serde(default)]
    pub model_config: AlgConfig,
    /// Hadronizer name for inclusive channels.
    #[serde(default)]
    pub hadronizer: Option<String>,
    /// Hadronizer parameters.
    #[serde(default)]
    pub hadronizer_config: AlgConfig,
}

fn default_true() -> bool {
    true
}

impl ChannelConfig {
    /// Channel with the process defaults.
    pub fn new(process: ScatteringType) -> Self {
        Self {
            process,
            cc: true,
            nc: false,
            model: None,
            model_config: AlgConfig::default(),
            hadronizer: None,
            hadronizer_config: AlgConfig::default(),
        }
    }

    /// Configured model name or the process default.
    pub fn model_name(&self) -> &str {
        if let Some(name) = &self.model {
            return name;
        }
        match self.process {
            ScatteringType::QuasiElastic => QelDipole::NAME,
            ScatteringType::DeepInelastic => DisScaling::NAME,
            ScatteringType::Resonant => ResBreitWigner::NAME,
            ScatteringType::Coherent => CohReinSehgalToy::NAME,
            ScatteringType::MesonExchange => MecGaussian::NAME,
            ScatteringType::QuasiElasticCharm => KovalenkoQelCharm::NAME,
            ScatteringType::Elastic => NuElastic::NAME,
        }
    }

    /// Configured hadronizer name or the default.
    pub fn hadronizer_name(&self) -> &str {
        self.hadronizer.as_deref().unwrap_or(crate::fragmentation::ToyHadronizer::NAME)
    }
}

/// Seed policy for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label; when set the master seed is derived from it.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x5EED
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

impl SeedPolicy {
    /// Effective master seed.
    pub fn resolve(&self) -> u64 {
        match &self.label {
            Some(label) => stable_label_hash(label),
            None => self.master_seed,
        }
    }
}

/// How the max cross-section cache is shared across workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CacheSharing {
    /// One cache for every worker.
    #[default]
    Shared,
    /// A private cache per worker.
    PerWorker,
}

/// Max cross-section cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Sharing mode.
    #[serde(default)]
    pub sharing: CacheSharing,
    /// Safety multiplier applied to cached maxima.
    #[serde(default = "default_safety_factor")]
    pub safety_factor: f64,
    /// Per-channel safety overrides keyed by channel label (`QES`, `DIS`, ...).
    #[serde(default)]
    pub channel_safety: BTreeMap<String, f64>,
    /// Relative energy increase that triggers a re-probe of a cached entry.
    #[serde(default = "default_reprobe_tolerance")]
    pub reprobe_tolerance: f64,
    /// Maximisation search used on cache misses.
    #[serde(default)]
    pub search: MaxSearch,
}

fn default_safety_factor() -> f64 {
    1.25
}

fn default_reprobe_tolerance() -> f64 {
    0.05
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            sharing: CacheSharing::default(),
            safety_factor: default_safety_factor(),
            channel_safety: BTreeMap::new(),
            reprobe_tolerance: default_reprobe_tolerance(),
            search: MaxSearch::default(),
        }
    }
}

impl CachePolicy {
    /// Safety factor for a channel.
    pub fn safety_for(&self, process: ScatteringType) -> f64 {
        self.channel_safety
            .get(process.as_str())
            .copied()
            .unwrap_or(self.safety_factor)
    }
}

/// Rejection sampling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KinematicsPolicy {
    /// Candidates drawn before the stage gives up.
    #[serde(default = "default_max_trials")]
    pub max_trials: usize,
}

fn default_max_trials() -> usize {
    1000
}

impl Default for KinematicsPolicy {
    fn default() -> Self {
        Self {
            max_trials: default_max_trials(),
        }
    }
}

/// Event restart settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverPolicy {
    /// Full-event attempts before the run is aborted.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

fn default_max_attempts() -> usize {
    100
}

impl Default for DriverPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

/// Unstable particle decayer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayerConfig {
    /// Run the decayer stage.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Decay model name.
    #[serde(default = "default_decay_model")]
    pub model: String,
    /// Decay model parameters.
    #[serde(default)]
    pub config: AlgConfig,
    /// Species decayed when they reach the final state.
    #[serde(default = "default_unstable")]
    pub unstable: Vec<i32>,
}

fn default_decay_model() -> String {
    crate::decays::ToyDecayModel::NAME.to_string()
}

fn default_unstable() -> Vec<i32> {
    vec![
        pdg::PI0,
        pdg::D0,
        -pdg::D0,
        pdg::D_PLUS,
        -pdg::D_PLUS,
        pdg::DS_PLUS,
        -pdg::DS_PLUS,
        pdg::LAMBDA_C_PLUS,
        pdg::SIGMA_C_PLUS,
        pdg::SIGMA_C_PLUSPLUS,
        pdg::DELTA_MINUS,
        pdg::DELTA_0,
        pdg::DELTA_PLUS,
        pdg::DELTA_PLUSPLUS,
    ]
}

impl Default for DecayerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_decay_model(),
            config: AlgConfig::default(),
            unstable: default_unstable(),
        }
    }
}

/// Output file names, relative to the run directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Write every generated record as one JSON line.
    #[serde(default = "default_true")]
    pub write_events: bool,
    /// Event file name.
    #[serde(default = "default_events_file")]
    pub events_file: PathBuf,
    /// Summary file name.
    #[serde(default = "default_summary_file")]
    pub summary_file: PathBuf,
}

fn default_events_file() -> PathBuf {
    PathBuf::from("events.jsonl")
}

fn default_summary_file() -> PathBuf {
    PathBuf::from("summary.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            write_events: true,
            events_file: default_events_file(),
            summary_file: default_summary_file(),
        }
    }
}

/// Full run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Probe PDG code.
    #[serde(default = "default_probe")]
    pub probe: i32,
    /// Probe energy, GeV.
    #[serde(default = "default_energy")]
    pub energy: f64,
    /// Target.
    #[serde(default)]
    pub target: TargetConfig,
    /// Enabled channels.
    #[serde(default = "default_channels")]
    pub channels: Vec<ChannelConfig>,
    /// Number of events to generate.
    #[serde(default = "default_events")]
    pub events: u64,
    /// Worker threads.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Seed policy.
    #[serde(default)]
    pub seed: SeedPolicy,
    /// Cache policy.
    #[serde(default)]
    pub cache: CachePolicy,
    /// Rejection sampling policy.
    #[serde(default)]
    pub kinematics: KinematicsPolicy,
    /// Event restart policy.
    #[serde(default)]
    pub driver: DriverPolicy,
    /// Intranuclear cascade.
    #[serde(default)]
    pub cascade: CascadeConfig,
    /// Unstable particle decayer.
    #[serde(default)]
    pub decayer: DecayerConfig,
    /// Output layout.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_probe() -> i32 {
    pdg::NU_MU
}

fn default_energy() -> f64 {
    1.0
}

fn default_channels() -> Vec<ChannelConfig> {
    vec![ChannelConfig::new(ScatteringType::QuasiElastic)]
}

fn default_events() -> u64 {
    100
}

fn default_workers() -> usize {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            probe: default_probe(),
            energy: default_energy(),
            target: TargetConfig::default(),
            channels: default_channels(),
            events: default_events(),
            workers: default_workers(),
            seed: SeedPolicy::default(),
            cache: CachePolicy::default(),
            kinematics: KinematicsPolicy::default(),
            driver: DriverPolicy::default(),
            cascade: CascadeConfig::default(),
            decayer: DecayerConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

fn invalid(field: &str, message: &str) -> NugenError {
    NugenError::Config(ErrorInfo::new("invalid-run-config", message).with_context("field", field))
}

impl RunConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, NugenError> {
        serde_yaml::from_str(text)
            .map_err(|err| NugenError::Serde(ErrorInfo::new("config-parse", err.to_string())))
    }

    /// Loads and validates a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, NugenError> {
        let text = fs::read_to_string(path).map_err(|err| {
            NugenError::Serde(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        let config = Self::from_yaml_str(&text).map_err(|err| match err {
            NugenError::Serde(info) => NugenError::Serde(info.with_context("path", path.display())),
            other => other,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), NugenError> {
        if !pdg::is_neutrino(self.probe) && !pdg::is_antineutrino(self.probe) {
            return Err(invalid("probe", "probe must be a neutrino or antineutrino"));
        }
        if !(self.energy.is_finite() && self.energy > 0.0) {
            return Err(invalid("energy", "probe energy must be positive and finite"));
        }
        if self.target.a == 0 || self.target.z > self.target.a || self.target.a > 999 {
            return Err(invalid("target", "target needs 1 <= A <= 999 and Z <= A"));
        }
        if self.channels.is_empty() {
            return Err(invalid("channels", "at least one channel must be enabled"));
        }
        for channel in &self.channels {
            if !channel.cc && !channel.nc {
                return Err(NugenError::Config(
                    ErrorInfo::new("invalid-run-config", "a channel enables neither CC nor NC")
                        .with_context("field", "channels")
                        .with_context("channel", channel.process),
                ));
            }
        }
        if self.cache.safety_factor <= 1.0
            || self.cache.channel_safety.values().any(|s| !(*s > 1.0))
        {
            return Err(invalid("cache.safety_factor", "safety factors must exceed 1.0"));
        }
        if self.kinematics.max_trials == 0 {
            return Err(invalid("kinematics.max_trials", "retry ceiling must be positive"));
        }
        if self.workers == 0 {
            return Err(invalid("workers", "at least one worker is required"));
        }
        if self.driver.max_attempts == 0 {
            return Err(invalid("driver.max_attempts", "attempt budget must be positive"));
        }
        Ok(())
    }
}
