use nugen_core::{
    pdg, AlgConfig, Interaction, InteractionType, KinePhaseSpace, KineVar, NugenError,
    ScatteringType, XSecModel,
};

use super::{dipole, integrate_native};
use crate::numerics::{GridIntegrator, IntegrationRule};
use crate::phase_space::xy_allowed;

/// 1 fm in GeV⁻¹.
const FM_TO_INV_GEV: f64 = 5.068;

/// Coherent pion production with an exponential |t| fall-off whose slope
/// follows the nuclear size, scaled by A².
#[derive(Debug, Clone)]
pub struct CohReinSehgalToy {
    norm: f64,
    ma: f64,
    r0: f64,
    integrator: GridIntegrator,
}

impl CohReinSehgalToy {
    /// Catalogue name.
    pub const NAME: &'static str = "coh-rein-sehgal-toy";

    /// Reads `norm`, `MA`, `R0` (fm) and `nbins`.
    pub fn from_config(config: &AlgConfig) -> Result<Self, NugenError> {
        Ok(Self {
            norm: config.get_f64("norm", 1.0e-3),
            ma: config.get_f64("MA", 1.0),
            r0: config.get_f64("R0", 1.0),
            integrator: GridIntegrator::new(
                IntegrationRule::Simpson,
                config.get_i64("nbins", 81).max(3) as usize,
            ),
        })
    }

    fn slope(&self, a: u32) -> f64 {
        let r = self.r0 * FM_TO_INV_GEV * (a as f64).cbrt();
        r * r / 3.0
    }
}

impl XSecModel for CohReinSehgalToy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn native_phase_space(&self) -> KinePhaseSpace {
        KinePhaseSpace::XY
    }

    fn native_xsec(&self, interaction: &Interaction) -> f64 {
        let kine = interaction.kine();
        let (Some(x), Some(y)) = (kine.get(KineVar::X), kine.get(KineVar::Y)) else {
            return 0.0;
        };
        if !xy_allowed(interaction, x, y, interaction.min_hadronic_mass()) {
            return 0.0;
        }
        let a = interaction.init_state().target.a;
        let q2 = kine.get_or(KineVar::Q2, 0.0);
        let t = kine.get_or(KineVar::T, 0.0);
        let a2 = (a as f64) * (a as f64);
        let scale = if interaction.is_cc() { 2.0 } else { 1.0 };
        scale
            * self.norm
            * interaction.energy()
            * a2
            * (1.0 - y)
            * dipole(q2, self.ma)
            * (-self.slope(a) * t).exp()
    }

    fn integral(&self, interaction: &Interaction) -> Result<f64, NugenError> {
        Ok(integrate_native(self, interaction, &self.integrator, &self.integrator, None))
    }

    fn valid_process(&self, interaction: &Interaction) -> bool {
        interaction.process().scattering == ScatteringType::Coherent
            && interaction.process().interaction != InteractionType::EM
            && pdg::is_neutrino(interaction.init_state().probe_pdg)
            && interaction.init_state().target.is_nucleus()
    }
}
