use std::sync::Arc;

use nugen_core::{
    pdg, AlgConfig, Interaction, InteractionType, KinePhaseSpace, KineVar, NugenError,
    ScatteringType, Target, XSecModel,
};

use crate::phase_space::wq2_allowed;

/// Meson-exchange currents on a nucleon pair.
///
/// The differential shape is a Gaussian in W times `(1 + Q²/Mq2d)^-1.5`.
/// The integral is a tunable fraction of the CCQE integral at the same
/// energy, times the combinatorial factor `(A − 1)/2`.
#[derive(Debug, Clone)]
pub struct MecGaussian {
    mass: f64,
    width: f64,
    mq2d: f64,
    frac_ccqe: f64,
    ccqe: Arc<dyn XSecModel>,
}

impl MecGaussian {
    /// Catalogue name.
    pub const NAME: &'static str = "mec-gaussian";

    /// Reads `mass`, `width`, `Mq2d`, `frac-ccqe`; `ccqe` supplies the
    /// quasi-elastic integral.
    pub fn new(config: &AlgConfig, ccqe: Arc<dyn XSecModel>) -> Result<Self, NugenError> {
        let width = config.get_f64("width", 0.3);
        let mq2d = config.get_f64("Mq2d", 0.5);
        if width <= 0.0 || mq2d <= 0.0 {
            return Err(NugenError::config(
                "invalid-parameter",
                "MEC width and Mq2d must be positive",
            ));
        }
        Ok(Self {
            mass: config.get_f64("mass", 2.1),
            width,
            mq2d,
            frac_ccqe: config.get_f64("frac-ccqe", 0.1),
            ccqe,
        })
    }
}

impl XSecModel for MecGaussian {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn native_phase_space(&self) -> KinePhaseSpace {
        KinePhaseSpace::WQ2
    }

    fn native_xsec(&self, interaction: &Interaction) -> f64 {
        let kine = interaction.kine();
        let (Some(w), Some(q2)) = (kine.get(KineVar::W), kine.get(KineVar::Q2)) else {
            return 0.0;
        };
        if !wq2_allowed(interaction, w, q2, None) {
            return 0.0;
        }
        let z = (w - self.mass) / self.width;
        let w_dep = (-0.5 * z * z).exp();
        let q2_dep = (1.0 + q2 / self.mq2d).powf(-1.5);
        w_dep * q2_dep
    }

    fn integral(&self, interaction: &Interaction) -> Result<f64, NugenError> {
        if !self.valid_process(interaction) || !interaction.is_cc() {
            return Ok(0.0);
        }
        let init = interaction.init_state();
        let nucleon = if pdg::is_antineutrino(init.probe_pdg) {
            pdg::PROTON
        } else {
            pdg::NEUTRON
        };
        let target = Target::nucleus(init.target.z, init.target.a).with_hit_nucleon(nucleon);
        let qel = Interaction::qel_cc(init.probe_pdg, target, init.probe_energy);
        let combinatorial = (init.target.a as f64 - 1.0) / 2.0;
        Ok(self.ccqe.integral(&qel)? * self.frac_ccqe * combinatorial)
    }

    fn valid_process(&self, interaction: &Interaction) -> bool {
        interaction.process().scattering == ScatteringType::MesonExchange
            && interaction.process().interaction != InteractionType::EM
            && interaction.init_state().target.is_nucleus()
            && interaction
                .init_state()
                .target
                .hit_cluster
                .map(pdg::is_cluster)
                .unwrap_or(false)
    }
}
