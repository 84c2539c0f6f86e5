//! Interaction summary: initial state, process, kinematics and exclusive tag.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

use crate::lorentz::LorentzVector;
use crate::pdg;

/// Scattering family of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScatteringType {
    /// Quasi-elastic scattering on a single nucleon.
    QuasiElastic,
    /// Deep-inelastic scattering.
    DeepInelastic,
    /// Baryon resonance production.
    Resonant,
    /// Coherent pion production on the whole nucleus.
    Coherent,
    /// Meson-exchange currents on a nucleon pair.
    MesonExchange,
    /// Quasi-elastic charm baryon production.
    QuasiElasticCharm,
    /// Neutral-current elastic scattering.
    Elastic,
}

impl ScatteringType {
    /// Every scattering type, in registry order.
    pub const ALL: [ScatteringType; 7] = [
        ScatteringType::QuasiElastic,
        ScatteringType::DeepInelastic,
        ScatteringType::Resonant,
        ScatteringType::Coherent,
        ScatteringType::MesonExchange,
        ScatteringType::QuasiElasticCharm,
        ScatteringType::Elastic,
    ];

    /// Short label used in interaction codes and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScatteringType::QuasiElastic => "QES",
            ScatteringType::DeepInelastic => "DIS",
            ScatteringType::Resonant => "RES",
            ScatteringType::Coherent => "COH",
            ScatteringType::MesonExchange => "MEC",
            ScatteringType::QuasiElasticCharm => "QES-charm",
            ScatteringType::Elastic => "NuEL",
        }
    }
}

impl fmt::Display for ScatteringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current type of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionType {
    /// Weak charged current.
    WeakCC,
    /// Weak neutral current.
    WeakNC,
    /// Electromagnetic.
    EM,
}

impl InteractionType {
    /// Short label used in interaction codes.
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::WeakCC => "Weak[CC]",
            InteractionType::WeakNC => "Weak[NC]",
            InteractionType::EM => "EM",
        }
    }
}

/// Process description. Immutable once the interaction is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessInfo {
    /// Scattering family.
    pub scattering: ScatteringType,
    /// Current type.
    pub interaction: InteractionType,
}

/// Nuclear or free-nucleon target, including the struck constituent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Proton number.
    pub z: u32,
    /// Mass number.
    pub a: u32,
    /// Struck nucleon, if any.
    #[serde(default)]
    pub hit_nucleon: Option<i32>,
    /// Struck nucleon pair for meson-exchange currents.
    #[serde(default)]
    pub hit_cluster: Option<i32>,
}

impl Target {
    /// A nucleus with `z` protons and `a` nucleons.
    pub fn nucleus(z: u32, a: u32) -> Self {
        Self {
            z,
            a,
            hit_nucleon: None,
            hit_cluster: None,
        }
    }

    /// A free proton or neutron, which is also the struck nucleon.
    pub fn free_nucleon(pdg_code: i32) -> Self {
        let z = if pdg_code == pdg::PROTON { 1 } else { 0 };
        Self {
            z,
            a: 1,
            hit_nucleon: Some(pdg_code),
            hit_cluster: None,
        }
    }

    /// Returns a copy with the struck nucleon set.
    pub fn with_hit_nucleon(mut self, nucleon: i32) -> Self {
        self.hit_nucleon = Some(nucleon);
        self.hit_cluster = None;
        self
    }

    /// Returns a copy with the struck nucleon pair set.
    pub fn with_hit_cluster(mut self, cluster: i32) -> Self {
        self.hit_cluster = Some(cluster);
        self.hit_nucleon = None;
        self
    }

    /// Neutron number.
    pub fn n(&self) -> u32 {
        self.a.saturating_sub(self.z)
    }

    /// True for a bare proton or neutron.
    pub fn is_free_nucleon(&self) -> bool {
        self.a == 1
    }

    /// True for nuclei with more than one nucleon.
    pub fn is_nucleus(&self) -> bool {
        self.a > 1
    }

    /// PDG code of the whole target.
    pub fn pdg(&self) -> i32 {
        if self.is_free_nucleon() {
            if self.z == 1 {
                pdg::PROTON
            } else {
                pdg::NEUTRON
            }
        } else {
            pdg::ion_code(self.z, self.a)
        }
    }

    /// Mass of the whole target.
    pub fn mass(&self) -> f64 {
        if self.is_free_nucleon() {
            pdg::mass(self.pdg()).unwrap_or(pdg::NUCLEON_MASS)
        } else {
            pdg::ion_mass(self.z, self.a)
        }
    }

    /// Mass of the struck constituent (nucleon or pair), falling back to the
    /// average nucleon mass.
    pub fn hit_mass(&self) -> f64 {
        self.hit_cluster
            .or(self.hit_nucleon)
            .and_then(pdg::mass)
            .unwrap_or(pdg::NUCLEON_MASS)
    }
}

/// Probe species, energy and target. Immutable once the interaction is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialState {
    /// Probe PDG code.
    pub probe_pdg: i32,
    /// Probe energy in the lab (target rest) frame, GeV.
    pub probe_energy: f64,
    /// Target description.
    pub target: Target,
}

impl InitialState {
    /// Probe four-momentum along +z.
    pub fn probe_p4(&self) -> LorentzVector {
        let m = pdg::mass(self.probe_pdg).unwrap_or(0.0);
        let p = (self.probe_energy * self.probe_energy - m * m).max(0.0).sqrt();
        LorentzVector::new(0.0, 0.0, p, self.probe_energy)
    }

    /// Struck-constituent four-momentum (at rest).
    pub fn hit_p4(&self) -> LorentzVector {
        LorentzVector::at_rest(self.target.hit_mass())
    }
}

/// Kinematic variable identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KineVar {
    /// Bjorken x.
    X,
    /// Inelasticity y.
    Y,
    /// Momentum transfer squared Q².
    Q2,
    /// Hadronic invariant mass W.
    W,
    /// Momentum transfer to the nucleus |t|.
    T,
}

/// Mutable bag of kinematic variables: running values used while sampling
/// and selected values written on acceptance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Kinematics {
    running: BTreeMap<KineVar, f64>,
    selected: BTreeMap<KineVar, f64>,
}

impl Kinematics {
    /// Running value of `var`, if set.
    pub fn get(&self, var: KineVar) -> Option<f64> {
        self.running.get(&var).copied()
    }

    /// Running value of `var` or `default`.
    pub fn get_or(&self, var: KineVar, default: f64) -> f64 {
        self.get(var).unwrap_or(default)
    }

    /// Sets a running value.
    pub fn set(&mut self, var: KineVar, value: f64) {
        self.running.insert(var, value);
    }

    /// Selected value of `var`, if set.
    pub fn selected(&self, var: KineVar) -> Option<f64> {
        self.selected.get(&var).copied()
    }

    /// Sets a selected value.
    pub fn set_selected(&mut self, var: KineVar, value: f64) {
        self.selected.insert(var, value);
    }

    /// Copies every selected value into the running set.
    pub fn use_selected_kinematics(&mut self) {
        for (var, value) in &self.selected {
            self.running.insert(*var, *value);
        }
    }

    /// Clears running values.
    pub fn clear_running_values(&mut self) {
        self.running.clear();
    }

    /// Clears running and selected values.
    pub fn reset(&mut self) {
        self.running.clear();
        self.selected.clear();
    }
}

/// Extra information describing exclusive final states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExclusiveTag {
    /// Charm hadron produced by charm channels.
    #[serde(default)]
    pub charm_hadron: Option<i32>,
    /// Final-state pion multiplicity hint.
    #[serde(default)]
    pub n_pions: Option<u32>,
    /// Final-state nucleon multiplicity hint.
    #[serde(default)]
    pub n_nucleons: Option<u32>,
}

/// Canonical cache key for an interaction class and kinematic family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct XSecFingerprint(u64);

impl XSecFingerprint {
    /// Creates a fingerprint from its raw value.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw digest.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for XSecFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// One interaction per event attempt.
///
/// The initial state and process are fixed at construction; only the
/// kinematics and exclusive tag change while the event is generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    init: InitialState,
    process: ProcessInfo,
    kine: Kinematics,
    excl: ExclusiveTag,
}

impl Interaction {
    /// Builds an interaction from its parts.
    pub fn new(init: InitialState, process: ProcessInfo) -> Self {
        Self {
            init,
            process,
            kine: Kinematics::default(),
            excl: ExclusiveTag::default(),
        }
    }

    fn build(
        scattering: ScatteringType,
        interaction: InteractionType,
        probe_pdg: i32,
        target: Target,
        energy: f64,
    ) -> Self {
        Self::new(
            InitialState {
                probe_pdg,
                probe_energy: energy,
                target,
            },
            ProcessInfo {
                scattering,
                interaction,
            },
        )
    }

    /// Charged-current quasi-elastic scattering.
    pub fn qel_cc(probe: i32, target: Target, energy: f64) -> Self {
        Self::build(ScatteringType::QuasiElastic, InteractionType::WeakCC, probe, target, energy)
    }

    /// Neutral-current quasi-elastic scattering.
    pub fn qel_nc(probe: i32, target: Target, energy: f64) -> Self {
        Self::build(ScatteringType::QuasiElastic, InteractionType::WeakNC, probe, target, energy)
    }

    /// Charged-current deep-inelastic scattering.
    pub fn dis_cc(probe: i32, target: Target, energy: f64) -> Self {
        Self::build(ScatteringType::DeepInelastic, InteractionType::WeakCC, probe, target, energy)
    }

    /// Neutral-current deep-inelastic scattering.
    pub fn dis_nc(probe: i32, target: Target, energy: f64) -> Self {
        Self::build(ScatteringType::DeepInelastic, InteractionType::WeakNC, probe, target, energy)
    }

    /// Charged-current resonance production.
    pub fn res_cc(probe: i32, target: Target, energy: f64) -> Self {
        Self::build(ScatteringType::Resonant, InteractionType::WeakCC, probe, target, energy)
    }

    /// Neutral-current resonance production.
    pub fn res_nc(probe: i32, target: Target, energy: f64) -> Self {
        Self::build(ScatteringType::Resonant, InteractionType::WeakNC, probe, target, energy)
    }

    /// Charged-current coherent pion production.
    pub fn coh_cc(probe: i32, target: Target, energy: f64) -> Self {
        Self::build(ScatteringType::Coherent, InteractionType::WeakCC, probe, target, energy)
    }

    /// Neutral-current coherent pion production.
    pub fn coh_nc(probe: i32, target: Target, energy: f64) -> Self {
        Self::build(ScatteringType::Coherent, InteractionType::WeakNC, probe, target, energy)
    }

    /// Charged-current meson-exchange current scattering on a nucleon pair.
    pub fn mec_cc(probe: i32, target: Target, energy: f64) -> Self {
        Self::build(ScatteringType::MesonExchange, InteractionType::WeakCC, probe, target, energy)
    }

    /// Quasi-elastic charm production with the given charm baryon.
    pub fn qel_charm(probe: i32, target: Target, energy: f64, charm_hadron: i32) -> Self {
        let mut interaction = Self::build(
            ScatteringType::QuasiElasticCharm,
            InteractionType::WeakCC,
            probe,
            target,
            energy,
        );
        interaction.excl.charm_hadron = Some(charm_hadron);
        interaction
    }

    /// Neutral-current elastic scattering on a nucleon.
    pub fn nu_elastic(probe: i32, target: Target, energy: f64) -> Self {
        Self::build(ScatteringType::Elastic, InteractionType::WeakNC, probe, target, energy)
    }

    /// Initial state.
    pub fn init_state(&self) -> &InitialState {
        &self.init
    }

    /// Process description.
    pub fn process(&self) -> &ProcessInfo {
        &self.process
    }

    /// Kinematics.
    pub fn kine(&self) -> &Kinematics {
        &self.kine
    }

    /// Mutable kinematics.
    pub fn kine_mut(&mut self) -> &mut Kinematics {
        &mut self.kine
    }

    /// Exclusive tag.
    pub fn excl_tag(&self) -> &ExclusiveTag {
        &self.excl
    }

    /// Mutable exclusive tag.
    pub fn excl_tag_mut(&mut self) -> &mut ExclusiveTag {
        &mut self.excl
    }

    /// Probe energy in GeV.
    pub fn energy(&self) -> f64 {
        self.init.probe_energy
    }

    /// True for charged-current processes.
    pub fn is_cc(&self) -> bool {
        self.process.interaction == InteractionType::WeakCC
    }

    /// Primary final-state lepton species.
    pub fn fs_primary_lepton_pdg(&self) -> i32 {
        match self.process.interaction {
            InteractionType::WeakCC => {
                pdg::charged_lepton_partner(self.init.probe_pdg).unwrap_or(self.init.probe_pdg)
            }
            InteractionType::WeakNC | InteractionType::EM => self.init.probe_pdg,
        }
    }

    /// Primary final-state lepton mass.
    pub fn fs_lepton_mass(&self) -> f64 {
        pdg::mass(self.fs_primary_lepton_pdg()).unwrap_or(0.0)
    }

    /// Charge transferred to the hadronic system.
    pub fn charge_transfer(&self) -> i32 {
        let probe_q = pdg::charge(self.init.probe_pdg).unwrap_or(0);
        let lepton_q = pdg::charge(self.fs_primary_lepton_pdg()).unwrap_or(0);
        probe_q - lepton_q
    }

    /// Total charge of the hadronic system (struck constituent plus transfer).
    pub fn hadronic_charge(&self) -> i32 {
        let hit_q = match self.process.scattering {
            ScatteringType::Coherent => 0,
            _ => self
                .init
                .target
                .hit_cluster
                .or(self.init.target.hit_nucleon)
                .and_then(pdg::charge)
                .unwrap_or(0),
        };
        hit_q + self.charge_transfer()
    }

    /// Recoiling baryon for quasi-elastic style channels.
    pub fn recoil_nucleon_pdg(&self) -> Option<i32> {
        match self.process.scattering {
            ScatteringType::QuasiElasticCharm => self.excl.charm_hadron,
            ScatteringType::QuasiElastic | ScatteringType::Elastic => {
                pdg::nucleon_with_charge(self.hadronic_charge())
            }
            _ => None,
        }
    }

    /// Mass against which kinematics are generated: the whole nucleus for
    /// coherent scattering, the struck constituent otherwise.
    pub fn kinematic_mass(&self) -> f64 {
        match self.process.scattering {
            ScatteringType::Coherent => self.init.target.mass(),
            _ => self.init.target.hit_mass(),
        }
    }

    /// Lightest hadronic final state reachable by this process.
    pub fn min_hadronic_mass(&self) -> f64 {
        let m = self.kinematic_mass();
        match self.process.scattering {
            ScatteringType::QuasiElastic | ScatteringType::Elastic => self
                .recoil_nucleon_pdg()
                .and_then(pdg::mass)
                .unwrap_or(m),
            ScatteringType::QuasiElasticCharm => self
                .excl
                .charm_hadron
                .and_then(pdg::mass)
                .unwrap_or(m),
            ScatteringType::DeepInelastic | ScatteringType::Resonant => m + pdg::PION_MASS,
            ScatteringType::Coherent => {
                let pion = if self.is_cc() {
                    pdg::PION_MASS
                } else {
                    pdg::PI0_MASS
                };
                m + pion
            }
            ScatteringType::MesonExchange => m,
        }
    }

    /// Probe energy below which the process is closed.
    pub fn energy_threshold(&self) -> f64 {
        let m = self.kinematic_mass();
        let ml = self.fs_lepton_mass();
        let mf = self.min_hadronic_mass();
        let threshold = ((ml + mf) * (ml + mf) - m * m) / (2.0 * m);
        threshold.max(0.0)
    }

    /// Centre-of-mass energy squared with the struck constituent at rest.
    pub fn s(&self) -> f64 {
        let m = self.kinematic_mass();
        let ml_probe = pdg::mass(self.init.probe_pdg).unwrap_or(0.0);
        m * m + ml_probe * ml_probe + 2.0 * m * self.init.probe_energy
    }

    /// Canonical code string, stable across runs and energies.
    pub fn as_code(&self) -> String {
        let target = &self.init.target;
        let mut code = format!(
            "nu:{};tgt:{};",
            self.init.probe_pdg,
            target.pdg()
        );
        if let Some(cluster) = target.hit_cluster {
            code.push_str(&format!("N:{cluster};"));
        } else if let Some(nucleon) = target.hit_nucleon {
            code.push_str(&format!("N:{nucleon};"));
        }
        code.push_str(&format!(
            "proc:{},{};",
            self.process.interaction.as_str(),
            self.process.scattering.as_str()
        ));
        if let Some(charm) = self.excl.charm_hadron {
            code.push_str(&format!("charm:{charm};"));
        }
        code
    }

    /// Cache fingerprint for this interaction class and a kinematic family.
    pub fn fingerprint(&self, family: &str) -> XSecFingerprint {
        let mut hasher = SipHasher13::new_with_keys(0, 0);
        hasher.write(self.as_code().as_bytes());
        hasher.write_u8(0xff);
        hasher.write(family.as_bytes());
        XSecFingerprint(hasher.finish())
    }

    /// Returns a copy at a different probe energy with cleared kinematics.
    pub fn at_energy(&self, energy: f64) -> Self {
        let mut copy = Self::new(
            InitialState {
                probe_energy: energy,
                ..self.init
            },
            self.process,
        );
        copy.excl = self.excl;
        copy
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}E:{:.4}", self.as_code(), self.init.probe_energy)
    }
}
