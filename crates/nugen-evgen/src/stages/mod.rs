//! Pipeline stages that build the event record around the sampled
//! kinematics.

mod decayer;
mod hadronic;
mod initial;
mod lepton;

pub use decayer::UnstableParticleDecayer;
pub use hadronic::HadronicSystemGenerator;
pub use initial::InitialStateBuilder;
pub use lepton::PrimaryLeptonGenerator;
