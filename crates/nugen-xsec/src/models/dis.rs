use nugen_core::{
    pdg, AlgConfig, Interaction, InteractionType, KinePhaseSpace, KineVar, NugenError,
    ScatteringType, XSecModel,
};

use super::{helicity_factor, integrate_native};
use crate::numerics::{GridIntegrator, IntegrationRule};
use crate::phase_space::xy_allowed;

/// Parton-model style deep-inelastic scattering with a scaling structure
/// function `F2(x) = A x^a (1 − x)^b`.
#[derive(Debug, Clone)]
pub struct DisScaling {
    norm: f64,
    amplitude: f64,
    low_x_power: f64,
    high_x_power: f64,
    nc_scale: f64,
    integrator: GridIntegrator,
}

impl DisScaling {
    /// Catalogue name.
    pub const NAME: &'static str = "dis-scaling";

    /// Reads `norm`, `F2-A`, `F2-a`, `F2-b`, `nc-scale` and `nbins`.
    pub fn from_config(config: &AlgConfig) -> Result<Self, NugenError> {
        let low_x_power = config.get_f64("F2-a", 0.5);
        if low_x_power <= -1.0 {
            return Err(NugenError::config(
                "invalid-parameter",
                "F2 low-x power must exceed -1 for a finite integral",
            ));
        }
        Ok(Self {
            norm: config.get_f64("norm", 3.5),
            amplitude: config.get_f64("F2-A", 1.5),
            low_x_power,
            high_x_power: config.get_f64("F2-b", 3.0),
            nc_scale: config.get_f64("nc-scale", 0.3),
            integrator: GridIntegrator::new(
                IntegrationRule::Simpson,
                config.get_i64("nbins", 81).max(3) as usize,
            ),
        })
    }

    fn f2(&self, x: f64) -> f64 {
        self.amplitude * x.powf(self.low_x_power) * (1.0 - x).powf(self.high_x_power)
    }
}

impl XSecModel for DisScaling {
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
        let m = interaction.kinematic_mass();
        let scale = match interaction.process().interaction {
            InteractionType::WeakCC => 1.0,
            _ => self.nc_scale,
        };
        scale * self.norm * 2.0 * m * interaction.energy() * self.f2(x) * helicity_factor(y)
    }

    fn integral(&self, interaction: &Interaction) -> Result<f64, NugenError> {
        Ok(integrate_native(self, interaction, &self.integrator, &self.integrator, None))
    }

    fn valid_process(&self, interaction: &Interaction) -> bool {
        interaction.process().scattering == ScatteringType::DeepInelastic
            && interaction.process().interaction != InteractionType::EM
            && pdg::is_neutrino(interaction.init_state().probe_pdg)
            && interaction
                .init_state()
                .target
                .hit_nucleon
                .map(pdg::is_nucleon)
                .unwrap_or(false)
    }
}
