use std::f64::consts::PI;

use tracing::debug;

use nugen_core::{
    EventFailure, EventFlag, EventRecord, EventRecordVisitor, KineVar, LorentzVector, NugenError,
    ParticleStatus, RngHandle, ThreeVector,
};

/// Tolerance on |cos θ| before a lepton is declared unphysical.
const COS_TOLERANCE: f64 = 1e-6;

/// Builds the primary lepton from the selected `(Q², W)` in the struck
/// nucleon rest frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimaryLeptonGenerator;

impl PrimaryLeptonGenerator {
    /// Lepton four-momentum for the selected kinematics with the probe
    /// along `axis`, or `None` when the point is unphysical.
    pub fn lepton_p4(
        energy: f64,
        target_mass: f64,
        lepton_mass: f64,
        q2: f64,
        w: f64,
        axis: &ThreeVector,
        phi: f64,
    ) -> Option<LorentzVector> {
        let m = target_mass;
        let el = energy - (w * w - m * m + q2) / (2.0 * m);
        if !(el >= lepton_mass) {
            return None;
        }
        let pl = (el * el - lepton_mass * lepton_mass).max(0.0).sqrt();
        let cos_theta = if pl > 0.0 {
            (el - (q2 + lepton_mass * lepton_mass) / (2.0 * energy)) / pl
        } else {
            1.0
        };
        if !cos_theta.is_finite() || cos_theta.abs() > 1.0 + COS_TOLERANCE {
            return None;
        }
        let cos_theta = cos_theta.clamp(-1.0, 1.0);
        let p = ThreeVector::from_spherical(pl, cos_theta, phi).rotate_uz(axis);
        Some(LorentzVector::from_parts(p, el))
    }
}

impl EventRecordVisitor for PrimaryLeptonGenerator {
    fn name(&self) -> &str {
        "primary-lepton"
    }

    fn process(&self, record: &mut EventRecord, rng: &mut RngHandle) -> Result<(), NugenError> {
        let interaction = record.require_interaction("primary-lepton")?;
        let kine = interaction.kine();
        let (Some(q2), Some(w)) = (kine.selected(KineVar::Q2), kine.selected(KineVar::W)) else {
            return Err(NugenError::kinematics(
                "missing-selected-kinematics",
                "primary lepton needs selected Q2 and W",
            ));
        };
        let lepton_pdg = interaction.fs_primary_lepton_pdg();
        let energy = interaction.energy();
        let target_mass = interaction.kinematic_mass();
        let lepton_mass = interaction.fs_lepton_mass();
        let Some(probe) = record.probe().map(|p| p.p4) else {
            return Err(NugenError::record("missing-probe", "record has no probe entry"));
        };
        let axis = probe.vect.unit();
        let phi = rng.uniform_in(0.0, 2.0 * PI);

        let Some(p4) = Self::lepton_p4(energy, target_mass, lepton_mass, q2, w, &axis, phi) else {
            debug!(q2, w, energy, "unphysical lepton kinematics");
            record.set_event_flag(EventFlag::NoAvailablePhaseSpace);
            return Err(EventFailure::no_phase_space(format!(
                "no physical lepton for Q2 = {q2:.5}, W = {w:.5}"
            ))
            .into());
        };
        let vertex = record.vertex;
        record.append_particle(lepton_pdg, ParticleStatus::StableFinal, Some(0), p4, vertex)?;
        Ok(())
    }
}
