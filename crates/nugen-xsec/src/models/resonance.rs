use std::f64::consts::PI;

use nugen_core::{
    pdg, AlgConfig, Interaction, InteractionType, KinePhaseSpace, KineVar, NugenError,
    ScatteringType, XSecModel,
};

use super::{dipole, helicity_factor, integrate_native, GF2_OVER_2PI};
use crate::numerics::{GridIntegrator, IntegrationRule};
use crate::phase_space::wq2_allowed;

/// Delta(1232) production: Breit-Wigner in W times a dipole in Q².
#[derive(Debug, Clone)]
pub struct ResBreitWigner {
    mass: f64,
    width: f64,
    ma: f64,
    norm: f64,
    nc_scale: f64,
    w_cut: Option<f64>,
    integrator: GridIntegrator,
}

impl ResBreitWigner {
    /// Catalogue name.
    pub const NAME: &'static str = "res-breit-wigner";

    /// Reads `mass`, `width`, `MA`, `norm`, `nc-scale`, `w-cut` and `nbins`.
    pub fn from_config(config: &AlgConfig) -> Result<Self, NugenError> {
        let width = config.get_f64("width", 0.117);
        if width <= 0.0 {
            return Err(NugenError::config("invalid-parameter", "resonance width must be positive"));
        }
        let w_cut = config.get_f64("w-cut", -1.0);
        Ok(Self {
            mass: config.get_f64("mass", 1.232),
            width,
            ma: config.get_f64("MA", 1.12),
            norm: config.get_f64("norm", 1.0),
            nc_scale: config.get_f64("nc-scale", 0.3),
            w_cut: (w_cut > 0.0).then_some(w_cut),
            integrator: GridIntegrator::new(
                IntegrationRule::Simpson,
                config.get_i64("nbins", 81).max(3) as usize,
            ),
        })
    }

    /// Upper W limit applied by the model, if any.
    pub fn w_cut(&self) -> Option<f64> {
        self.w_cut
    }

    fn breit_wigner(&self, w: f64) -> f64 {
        let half = 0.5 * self.width;
        (half / PI) / ((w - self.mass) * (w - self.mass) + half * half)
    }
}

impl XSecModel for ResBreitWigner {
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
        if !wq2_allowed(interaction, w, q2, self.w_cut) {
            return 0.0;
        }
        let scale = match interaction.process().interaction {
            InteractionType::WeakCC => 1.0,
            _ => self.nc_scale,
        };
        scale
            * self.norm
            * GF2_OVER_2PI
            * self.breit_wigner(w)
            * dipole(q2, self.ma)
            * helicity_factor(kine.get_or(KineVar::Y, 0.0))
    }

    fn integral(&self, interaction: &Interaction) -> Result<f64, NugenError> {
        Ok(integrate_native(self, interaction, &self.integrator, &self.integrator, self.w_cut))
    }

    fn valid_process(&self, interaction: &Interaction) -> bool {
        interaction.process().scattering == ScatteringType::Resonant
            && interaction.process().interaction != InteractionType::EM
            && pdg::is_neutrino(interaction.init_state().probe_pdg)
            && interaction
                .init_state()
                .target
                .hit_nucleon
                .map(pdg::is_nucleon)
                .unwrap_or(false)
            && pdg::delta_with_charge(interaction.hadronic_charge()).is_some()
    }
}
