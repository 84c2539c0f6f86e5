use serde::{Deserialize, Serialize};

/// Radial density profile of the target nucleus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DensityProfile {
    /// Fermi (Woods-Saxon) distribution.
    #[default]
    WoodsSaxon,
    /// Hard sphere of radius `R`.
    Uniform,
}

/// Where the primary vertex is placed inside the nucleus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum VertexMode {
    /// Sampled from the density profile.
    #[default]
    Random,
    /// Nucleus centre.
    Center,
}

/// Intranuclear cascade settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Skip transport entirely; hadrons leave the nucleus untouched.
    #[serde(default)]
    pub transparent: bool,
    /// Radius parameter in `R = R0 A^{1/3}`, fm.
    #[serde(default = "default_r0")]
    pub r0: f64,
    /// Density profile.
    #[serde(default)]
    pub density: DensityProfile,
    /// Woods-Saxon diffuseness, fm.
    #[serde(default = "default_diffuseness")]
    pub diffuseness: f64,
    /// Escape radius is `R + n_diffuse · a` for Woods-Saxon nuclei.
    #[serde(default = "default_n_diffuse")]
    pub n_diffuse: f64,
    /// Formation time parameter `c·τ0`, fm. Zero disables the formation zone.
    #[serde(default = "default_ct0")]
    pub ct0: f64,
    /// Multiplier applied to the formation length `ct0 · p / m`.
    #[serde(default = "default_formation_k")]
    pub formation_k: f64,
    /// Vertex placement.
    #[serde(default)]
    pub vertex: VertexMode,
    /// Kinetic energy (GeV) below which a hadron stops being transported.
    #[serde(default = "default_kinetic_threshold")]
    pub kinetic_threshold: f64,
    /// Steps a single hadron lineage may take before the event is abandoned.
    #[serde(default = "default_max_steps_per_hadron")]
    pub max_steps_per_hadron: u32,
    /// Attempts at finding a permitted fate outcome at one interaction point.
    #[serde(default = "default_max_fate_attempts")]
    pub max_fate_attempts: usize,
    /// Upper bound on entries the cascade may add to one event.
    #[serde(default = "default_max_produced")]
    pub max_produced: usize,
}

fn default_r0() -> f64 {
    1.4
}

fn default_diffuseness() -> f64 {
    0.54
}

fn default_n_diffuse() -> f64 {
    3.0
}

fn default_ct0() -> f64 {
    0.342
}

fn default_formation_k() -> f64 {
    1.0
}

fn default_kinetic_threshold() -> f64 {
    0.01
}

fn default_max_steps_per_hadron() -> u32 {
    200
}

fn default_max_fate_attempts() -> usize {
    20
}

fn default_max_produced() -> usize {
    400
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            transparent: false,
            r0: default_r0(),
            density: DensityProfile::default(),
            diffuseness: default_diffuseness(),
            n_diffuse: default_n_diffuse(),
            ct0: default_ct0(),
            formation_k: default_formation_k(),
            vertex: VertexMode::default(),
            kinetic_threshold: default_kinetic_threshold(),
            max_steps_per_hadron: default_max_steps_per_hadron(),
            max_fate_attempts: default_max_fate_attempts(),
            max_produced: default_max_produced(),
        }
    }
}
