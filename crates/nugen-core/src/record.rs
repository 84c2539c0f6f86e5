//! Event record: the ordered particle list mutated by every pipeline stage.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, FailureKind, NugenError};
use crate::interaction::Interaction;
use crate::lorentz::LorentzVector;

/// Status tag of a particle entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticleStatus {
    /// Incoming probe or target.
    Initial,
    /// Struck nucleon (or nucleon pair) inside a nuclear target.
    NucleonTarget,
    /// Intermediate state such as a resonance or hadronic system.
    Intermediate,
    /// Hadron produced inside the nucleus, awaiting transport.
    HadronInNucleus,
    /// Stable final-state particle.
    StableFinal,
    /// Hadron that interacted inside the nucleus and was replaced.
    Rescattered,
    /// Particle that was decayed.
    Decayed,
}

impl ParticleStatus {
    /// Permitted status changes. Transitions only move forward.
    pub fn can_transition_to(&self, next: ParticleStatus) -> bool {
        use ParticleStatus::*;
        matches!(
            (self, next),
            (HadronInNucleus, StableFinal)
                | (HadronInNucleus, Rescattered)
                | (HadronInNucleus, Decayed)
                | (StableFinal, Decayed)
        )
    }
}

/// One particle entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// PDG species code.
    pub pdg: i32,
    status: ParticleStatus,
    /// Index of the parent entry.
    pub mother: Option<usize>,
    /// Index of the first daughter entry.
    pub first_daughter: Option<usize>,
    /// Index of the last daughter entry.
    pub last_daughter: Option<usize>,
    /// Four-momentum, GeV.
    pub p4: LorentzVector,
    /// Four-position, fm (relative to the nucleus centre).
    pub x4: LorentzVector,
    /// Distance stepped inside the nucleus, fm.
    pub travelled: f64,
    /// Whether the hadron is still inside its formation zone.
    pub in_formation_zone: bool,
    /// Number of cascade steps taken by this entry.
    pub rescatter_steps: u32,
}

impl Particle {
    /// Status tag.
    pub fn status(&self) -> ParticleStatus {
        self.status
    }

    /// Invariant mass of the entry.
    pub fn mass(&self) -> f64 {
        self.p4.m()
    }

    /// Kinetic energy of the entry.
    pub fn kinetic_energy(&self) -> f64 {
        (self.p4.e() - self.mass()).max(0.0)
    }
}

/// Diagnostic flags attached to abandoned records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventFlag {
    /// Kinematics exhausted the retry ceiling.
    NoAvailablePhaseSpace,
    /// Hadronizer returned no particles.
    HadronizationFailure,
    /// Decayer returned no particles.
    DecayFailure,
    /// Cascade exhausted its retry budget.
    CascadeExhausted,
}

impl From<FailureKind> for EventFlag {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::NoAvailablePhaseSpace => EventFlag::NoAvailablePhaseSpace,
            FailureKind::HadronizationFailure => EventFlag::HadronizationFailure,
            FailureKind::DecayFailure => EventFlag::DecayFailure,
            FailureKind::CascadeExhausted => EventFlag::CascadeExhausted,
        }
    }
}

/// Ordered particle list with the interaction summary attached.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    particles: Vec<Particle>,
    interaction: Option<Interaction>,
    flags: BTreeSet<EventFlag>,
    /// Position of the primary vertex, fm.
    pub vertex: LorentzVector,
}

impl EventRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a particle and links it to its parent.
    ///
    /// The parent, when given, must refer to an earlier entry.
    pub fn append_particle(
        &mut self,
        pdg: i32,
        status: ParticleStatus,
        parent: Option<usize>,
        p4: LorentzVector,
        x4: LorentzVector,
    ) -> Result<usize, NugenError> {
        let idx = self.particles.len();
        if let Some(parent_idx) = parent {
            let Some(parent_entry) = self.particles.get_mut(parent_idx) else {
                return Err(NugenError::Record(
                    ErrorInfo::new("parent-not-earlier", "parent index does not refer to an earlier entry")
                        .with_context("parent", parent_idx)
                        .with_context("index", idx),
                ));
            };
            if parent_entry.first_daughter.is_none() {
                parent_entry.first_daughter = Some(idx);
            }
            parent_entry.last_daughter = Some(idx);
        }
        self.particles.push(Particle {
            pdg,
            status,
            mother: parent,
            first_daughter: None,
            last_daughter: None,
            p4,
            x4,
            travelled: 0.0,
            in_formation_zone: false,
            rescatter_steps: 0,
        });
        Ok(idx)
    }

    /// Changes the status of an entry, enforcing forward-only transitions.
    pub fn set_status(&mut self, idx: usize, status: ParticleStatus) -> Result<(), NugenError> {
        let len = self.particles.len();
        let entry = self.particles.get_mut(idx).ok_or_else(|| {
            NugenError::Record(
                ErrorInfo::new("index-out-of-range", "no particle at index")
                    .with_context("index", idx)
                    .with_context("len", len),
            )
        })?;
        if entry.status == status {
            return Ok(());
        }
        if !entry.status.can_transition_to(status) {
            return Err(NugenError::Record(
                ErrorInfo::new("status-not-monotonic", "illegal particle status transition")
                    .with_context("index", idx)
                    .with_context("from", format!("{:?}", entry.status))
                    .with_context("to", format!("{status:?}")),
            ));
        }
        entry.status = status;
        Ok(())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True when the record holds no entries.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Entry at `idx`.
    pub fn particle(&self, idx: usize) -> Option<&Particle> {
        self.particles.get(idx)
    }

    /// Mutable entry at `idx`. The status can only change via [`Self::set_status`].
    pub fn particle_mut(&mut self, idx: usize) -> Option<&mut Particle> {
        self.particles.get_mut(idx)
    }

    /// All entries in insertion order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// First entry with the given status.
    pub fn find_particle_by_status(&self, status: ParticleStatus) -> Option<(usize, &Particle)> {
        self.particles
            .iter()
            .enumerate()
            .find(|(_, p)| p.status == status)
    }

    /// Indices of every entry with the given status.
    pub fn indices_with_status(&self, status: ParticleStatus) -> Vec<usize> {
        self.particles
            .iter()
            .enumerate()
            .filter(|(_, p)| p.status == status)
            .map(|(idx, _)| idx)
            .collect()
    }

    /// The incoming probe (first entry).
    pub fn probe(&self) -> Option<&Particle> {
        self.particles
            .first()
            .filter(|p| p.status == ParticleStatus::Initial)
    }

    /// Index of the struck nucleon: the `NucleonTarget` entry, or the
    /// free-nucleon target itself.
    pub fn hit_nucleon_index(&self) -> Option<usize> {
        if let Some((idx, _)) = self.find_particle_by_status(ParticleStatus::NucleonTarget) {
            return Some(idx);
        }
        match self.particles.get(1) {
            Some(p) if p.status == ParticleStatus::Initial && !crate::pdg::is_ion(p.pdg) => Some(1),
            _ => None,
        }
    }

    /// Index of the nuclear target entry, if the target is a nucleus.
    pub fn target_nucleus_index(&self) -> Option<usize> {
        self.particles
            .iter()
            .position(|p| p.status == ParticleStatus::Initial && crate::pdg::is_ion(p.pdg))
    }

    /// Iterator over stable final-state entries.
    pub fn final_state(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.particles
            .iter()
            .filter(|p| p.status == ParticleStatus::StableFinal)
    }

    /// Sum of four-momenta of every entry with the given status.
    pub fn total_p4_by_status(&self, status: ParticleStatus) -> LorentzVector {
        self.particles
            .iter()
            .filter(|p| p.status == status)
            .fold(LorentzVector::default(), |acc, p| acc + p.p4)
    }

    /// Attaches the interaction summary.
    pub fn attach_interaction(&mut self, interaction: Interaction) {
        self.interaction = Some(interaction);
    }

    /// Interaction summary.
    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    /// Mutable interaction summary.
    pub fn interaction_mut(&mut self) -> Option<&mut Interaction> {
        self.interaction.as_mut()
    }

    /// Interaction summary or a record error naming the requesting stage.
    pub fn require_interaction(&self, stage: &str) -> Result<&Interaction, NugenError> {
        self.interaction.as_ref().ok_or_else(|| {
            NugenError::Record(
                ErrorInfo::new("missing-interaction", "no interaction attached to the record")
                    .with_context("stage", stage),
            )
        })
    }

    /// Mutable variant of [`Self::require_interaction`].
    pub fn require_interaction_mut(&mut self, stage: &str) -> Result<&mut Interaction, NugenError> {
        self.interaction.as_mut().ok_or_else(|| {
            NugenError::Record(
                ErrorInfo::new("missing-interaction", "no interaction attached to the record")
                    .with_context("stage", stage),
            )
        })
    }

    /// Raises a diagnostic flag.
    pub fn set_event_flag(&mut self, flag: EventFlag) {
        self.flags.insert(flag);
    }

    /// True when the flag is raised.
    pub fn has_flag(&self, flag: EventFlag) -> bool {
        self.flags.contains(&flag)
    }

    /// Raised flags.
    pub fn flags(&self) -> impl Iterator<Item = EventFlag> + '_ {
        self.flags.iter().copied()
    }

    /// Clears every entry, flag and the interaction.
    pub fn reset(&mut self) {
        self.particles.clear();
        self.flags.clear();
        self.interaction = None;
        self.vertex = LorentzVector::default();
    }
}
