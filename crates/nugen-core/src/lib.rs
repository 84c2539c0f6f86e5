#![deny(missing_docs)]
#![doc = "Core traits and data types for the nugen neutrino event generator."]

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod errors;
pub mod interaction;
pub mod lorentz;
pub mod pdg;
pub mod phase_space;
pub mod provenance;
pub mod record;
pub mod rng;

pub use config::{AlgConfig, ParamValue};
pub use errors::{ErrorInfo, EventFailure, FailureKind, NugenError};
pub use interaction::{
    ExclusiveTag, InitialState, Interaction, InteractionType, KineVar, Kinematics, ProcessInfo,
    ScatteringType, Target, XSecFingerprint,
};
pub use lorentz::{LorentzVector, ThreeVector};
pub use phase_space::{jacobian, KinePhaseSpace};
pub use provenance::{RunProvenance, SchemaVersion};
pub use record::{EventFlag, EventRecord, Particle, ParticleStatus};
pub use rng::{derive_substream_seed, RngHandle};

/// Differential cross-section model.
///
/// Implementations are pure functions of the interaction and their fixed
/// configuration. Kinematically forbidden points evaluate to zero.
pub trait XSecModel: Debug + Send + Sync {
    /// Catalogue name of the model.
    fn name(&self) -> &str;

    /// Convention in which [`XSecModel::native_xsec`] is expressed.
    fn native_phase_space(&self) -> KinePhaseSpace;

    /// Differential cross section at the running kinematics, in the native
    /// convention.
    fn native_xsec(&self, interaction: &Interaction) -> f64;

    /// Total cross section at the interaction's probe energy.
    fn integral(&self, interaction: &Interaction) -> Result<f64, NugenError>;

    /// Whether the model handles this process at all.
    fn valid_process(&self, interaction: &Interaction) -> bool;

    /// Whether the running kinematics are usable. Defaults to checking that
    /// the probe is above threshold.
    fn valid_kinematics(&self, interaction: &Interaction) -> bool {
        interaction.energy() > interaction.energy_threshold()
    }

    /// Differential cross section in the requested convention.
    ///
    /// Fails with [`NugenError::Config`] when no Jacobian exists between the
    /// native and requested conventions; returns zero for invalid processes,
    /// invalid kinematics and non-finite values.
    fn xsec(&self, interaction: &Interaction, kps: KinePhaseSpace) -> Result<f64, NugenError> {
        let native = self.native_phase_space();
        let Some(factor) = jacobian(interaction, native, kps) else {
            return Err(NugenError::Config(
                ErrorInfo::new("no-jacobian", "no Jacobian between phase-space conventions")
                    .with_context("model", self.name())
                    .with_context("native", native.as_str())
                    .with_context("requested", kps.as_str()),
            ));
        };
        if !self.valid_process(interaction) || !self.valid_kinematics(interaction) {
            return Ok(0.0);
        }
        let value = self.native_xsec(interaction) * factor;
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Ok(0.0)
        }
    }
}

/// A pipeline stage: reads and mutates the event record.
///
/// A stage communicates only through the record. Returning
/// [`NugenError::Event`] asks the driver to abandon the event and restart.
pub trait EventRecordVisitor: Send + Sync {
    /// Stage name used in logs and statistics.
    fn name(&self) -> &str;

    /// Processes the record in place.
    fn process(&self, record: &mut EventRecord, rng: &mut RngHandle) -> Result<(), NugenError>;
}

/// A particle produced by a hadronizer or decayer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalStateParticle {
    /// PDG species code.
    pub pdg: i32,
    /// Four-momentum in the lab frame.
    pub p4: LorentzVector,
}

/// Fragmentation collaborator for inclusive hadronic systems.
pub trait Hadronizer: Debug + Send + Sync {
    /// Catalogue name.
    fn name(&self) -> &str;

    /// Produces final-state hadrons for the hadronic system `hadronic_p4`.
    /// `None` means no particles could be produced.
    fn hadronize(
        &self,
        interaction: &Interaction,
        hadronic_p4: &LorentzVector,
        rng: &mut RngHandle,
    ) -> Option<Vec<FinalStateParticle>>;
}

/// Decay collaborator for unstable particles.
pub trait DecayModel: Debug + Send + Sync {
    /// Catalogue name.
    fn name(&self) -> &str;

    /// Whether the model decays this species.
    fn handles(&self, pdg: i32) -> bool;

    /// Decay products of a particle, or `None` when no channel is open.
    fn decay(
        &self,
        pdg: i32,
        p4: &LorentzVector,
        rng: &mut RngHandle,
    ) -> Option<Vec<FinalStateParticle>>;
}
