use nugen_core::{
    pdg, AlgConfig, Interaction, InteractionType, KinePhaseSpace, KineVar, NugenError,
    ScatteringType, XSecModel,
};

use super::{dipole, helicity_factor, integrate_native, GF2_OVER_2PI, SIN2_WEINBERG};
use crate::numerics::{GridIntegrator, IntegrationRule};
use crate::phase_space::q2_range;

/// Neutral-current elastic scattering off a nucleon.
#[derive(Debug, Clone)]
pub struct NuElastic {
    ma: f64,
    mv: f64,
    ga: f64,
    integrator: GridIntegrator,
}

impl NuElastic {
    /// Catalogue name.
    pub const NAME: &'static str = "nu-elastic";

    /// Reads `MA`, `MV`, `gA` and `nbins`.
    pub fn from_config(config: &AlgConfig) -> Result<Self, NugenError> {
        Ok(Self {
            ma: config.get_f64("MA", 0.99),
            mv: config.get_f64("MV", 0.84),
            ga: config.get_f64("gA", 1.267),
            integrator: GridIntegrator::new(
                IntegrationRule::Simpson,
                config.get_i64("nbins", 201).max(3) as usize,
            ),
        })
    }

    fn couplings(&self, nucleon: i32) -> (f64, f64) {
        // isospin sign: +1 proton, -1 neutron
        let tau = if nucleon == pdg::PROTON { 1.0 } else { -1.0 };
        let gv = if tau > 0.0 { 0.5 - 2.0 * SIN2_WEINBERG } else { -0.5 };
        (gv, 0.5 * tau * self.ga)
    }
}

impl XSecModel for NuElastic {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn native_phase_space(&self) -> KinePhaseSpace {
        KinePhaseSpace::Q2
    }

    fn native_xsec(&self, interaction: &Interaction) -> f64 {
        let kine = interaction.kine();
        let Some(q2) = kine.get(KineVar::Q2) else {
            return 0.0;
        };
        if !q2_range(interaction).contains(q2) {
            return 0.0;
        }
        let nucleon = interaction.init_state().target.hit_nucleon.unwrap_or(pdg::PROTON);
        let (gv, ga) = self.couplings(nucleon);
        let fv = gv * dipole(q2, self.mv);
        let fa = ga * dipole(q2, self.ma);
        GF2_OVER_2PI * (fv * fv + fa * fa) * helicity_factor(kine.get_or(KineVar::Y, 0.0))
    }

    fn integral(&self, interaction: &Interaction) -> Result<f64, NugenError> {
        Ok(integrate_native(self, interaction, &self.integrator, &self.integrator, None))
    }

    fn valid_process(&self, interaction: &Interaction) -> bool {
        interaction.process().scattering == ScatteringType::Elastic
            && interaction.process().interaction == InteractionType::WeakNC
            && pdg::is_neutrino(interaction.init_state().probe_pdg)
            && interaction
                .init_state()
                .target
                .hit_nucleon
                .map(pdg::is_nucleon)
                .unwrap_or(false)
    }
}
