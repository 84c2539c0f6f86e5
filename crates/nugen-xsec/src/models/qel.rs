use nugen_core::{
    pdg, AlgConfig, Interaction, InteractionType, KinePhaseSpace, KineVar, NugenError,
    ScatteringType, XSecModel,
};

use super::{dipole, helicity_factor, integrate_native, COS2_CABIBBO, GF2_OVER_2PI};
use crate::numerics::{GridIntegrator, IntegrationRule};
use crate::phase_space::q2_range;

/// Quasi-elastic scattering with dipole vector and axial form factors.
#[derive(Debug, Clone)]
pub struct QelDipole {
    ma: f64,
    mv: f64,
    ga: f64,
    nc_scale: f64,
    integrator: GridIntegrator,
}

impl QelDipole {
    /// Catalogue name.
    pub const NAME: &'static str = "qel-dipole";

    /// Reads `MA`, `MV`, `gA`, `nc-scale` and `nbins`.
    pub fn from_config(config: &AlgConfig) -> Result<Self, NugenError> {
        let ma = config.get_f64("MA", 0.99);
        let mv = config.get_f64("MV", 0.84);
        if ma <= 0.0 || mv <= 0.0 {
            return Err(NugenError::config("invalid-parameter", "dipole masses must be positive"));
        }
        Ok(Self {
            ma,
            mv,
            ga: config.get_f64("gA", 1.267),
            nc_scale: config.get_f64("nc-scale", 0.25),
            integrator: GridIntegrator::new(
                IntegrationRule::Simpson,
                config.get_i64("nbins", 201).max(3) as usize,
            ),
        })
    }
}

impl XSecModel for QelDipole {
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
        let fv = dipole(q2, self.mv);
        let fa = self.ga * dipole(q2, self.ma);
        let coupling = match interaction.process().interaction {
            InteractionType::WeakCC => GF2_OVER_2PI * COS2_CABIBBO,
            _ => GF2_OVER_2PI * self.nc_scale,
        };
        coupling * (fv * fv + fa * fa) * helicity_factor(kine.get_or(KineVar::Y, 0.0))
    }

    fn integral(&self, interaction: &Interaction) -> Result<f64, NugenError> {
        Ok(integrate_native(self, interaction, &self.integrator, &self.integrator, None))
    }

    fn valid_process(&self, interaction: &Interaction) -> bool {
        let hit = interaction.init_state().target.hit_nucleon;
        interaction.process().scattering == ScatteringType::QuasiElastic
            && matches!(
                interaction.process().interaction,
                InteractionType::WeakCC | InteractionType::WeakNC
            )
            && pdg::is_neutrino(interaction.init_state().probe_pdg)
            && hit.map(pdg::is_nucleon).unwrap_or(false)
            && interaction.recoil_nucleon_pdg().is_some()
    }
}
