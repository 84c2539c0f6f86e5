use nugen_core::{
    pdg, AlgConfig, Interaction, InteractionType, KinePhaseSpace, KineVar, NugenError,
    ScatteringType, XSecModel,
};
use tracing::debug;

use super::{integrate_native, GF2_OVER_2PI, SIN2_CABIBBO};
use crate::numerics::{FunctionMap, GridIntegrator, IntegrationRule, UnifGrid};
use crate::phase_space::q2_range;

/// Quasi-elastic charm baryon production (Kovalenko local duality).
///
/// The resonance strength is the integral of the struck-quark density over
/// the ξ̄ window spanned by the resonance mass ± ΔM, evaluated on a uniform
/// grid.
#[derive(Debug, Clone)]
pub struct KovalenkoQelCharm {
    f2_lambda_p: f64,
    f2_sigma_p: f64,
    f2_sigma_pp: f64,
    res_dm_lambda: f64,
    res_dm_sigma: f64,
    mo: f64,
    q2_min: f64,
    q2_max: f64,
    bins: usize,
    integrator: GridIntegrator,
    q2_integrator: GridIntegrator,
}

impl KovalenkoQelCharm {
    /// Catalogue name.
    pub const NAME: &'static str = "qel-charm-kovalenko";

    /// Reads the form-factor sums, resonance widths, `Mo`, Q² cuts, `nbins`
    /// and the `integrator` rule (`simpson` or `trapezoid`).
    pub fn from_config(config: &AlgConfig) -> Result<Self, NugenError> {
        let q2_min = config.get_f64("Q2min", -999_999.0);
        let q2_max = config.get_f64("Q2max", 999_999.0);
        if q2_min >= q2_max {
            return Err(NugenError::config("invalid-parameter", "Q2min must be below Q2max"));
        }
        let bins = config.get_i64("nbins", 201);
        if bins < 2 {
            return Err(NugenError::config("invalid-parameter", "nbins must exceed one"));
        }
        let rule = match config.get_str("integrator", "simpson") {
            "simpson" => IntegrationRule::Simpson,
            "trapezoid" => IntegrationRule::Trapezoid,
            other => {
                return Err(NugenError::Config(
                    nugen_core::ErrorInfo::new("unknown-integrator", "unsupported integration rule")
                        .with_context("integrator", other),
                ))
            }
        };
        let bins = bins as usize;
        Ok(Self {
            f2_lambda_p: config.get_f64("F1^2+FA^2-LambdaP", 2.07),
            f2_sigma_p: config.get_f64("F1^2+FA^2-SigmaP", 0.71),
            f2_sigma_pp: config.get_f64("F1^2+FA^2-SigmaPP", 1.42),
            res_dm_lambda: config.get_f64("Res-DeltaM-Lambda", 0.56),
            res_dm_sigma: config.get_f64("Res-DeltaM-Sigma", 0.20),
            mo: config.get_f64("Mo", 0.1),
            q2_min,
            q2_max,
            bins,
            integrator: GridIntegrator::new(rule, bins),
            q2_integrator: GridIntegrator::new(IntegrationRule::Simpson, 101),
        })
    }

    fn resonance_mass(&self, interaction: &Interaction) -> Option<f64> {
        interaction.excl_tag().charm_hadron.and_then(pdg::mass)
    }

    fn res_dm(&self, charm: i32) -> Option<f64> {
        match charm {
            pdg::LAMBDA_C_PLUS => Some(self.res_dm_lambda),
            pdg::SIGMA_C_PLUS | pdg::SIGMA_C_PLUSPLUS => Some(self.res_dm_sigma),
            _ => None,
        }
    }

    fn sum_f2(&self, charm: i32, nucleon: i32) -> Option<f64> {
        match (charm, nucleon) {
            (pdg::LAMBDA_C_PLUS, pdg::NEUTRON) => Some(self.f2_lambda_p),
            (pdg::SIGMA_C_PLUS, pdg::NEUTRON) => Some(self.f2_sigma_p),
            (pdg::SIGMA_C_PLUSPLUS, pdg::PROTON) => Some(self.f2_sigma_pp),
            _ => None,
        }
    }

    fn xi_bar(&self, q2: f64, v: f64) -> f64 {
        let m = pdg::NUCLEON_MASS;
        let mo2 = self.mo * self.mo;
        let xi = (q2 / m) / (v + (v * v + q2).sqrt());
        xi * (1.0 + (1.0 + mo2 / (q2 + mo2)) * mo2 / q2)
    }

    /// Struck d-quark density for protons, u-quark density for neutrons.
    fn quark_density(&self, t: f64, q2: f64, proton: bool) -> f64 {
        if !(0.0..=1.0).contains(&t) {
            return 0.0;
        }
        let evolution = 1.0 + 0.05 * (1.0 + q2 / 0.25).ln();
        let sea = 0.2 * (1.0 - t).powi(7);
        let valence = if proton {
            1.0 * t.sqrt() * (1.0 - t).powi(4)
        } else {
            2.0 * t.sqrt() * (1.0 - t).powi(3)
        };
        (valence + sea) * evolution
    }

    fn dr(&self, q2: f64, mr: f64, delta: f64, proton: bool, at_zero_q2: bool) -> f64 {
        let m = pdg::NUCLEON_MASS;
        let m2 = m * m;
        let v_minus = ((mr - delta).powi(2) - m2 + q2) / (2.0 * m);
        let v_plus = ((mr + delta).powi(2) - m2 + q2) / (2.0 * m);
        let xi_plus = self.xi_bar(q2, v_plus);
        let xi_minus = self.xi_bar(q2, v_minus);
        let pdf_q2 = if at_zero_q2 { 0.0 } else { q2 };
        let grid = UnifGrid::new(xi_plus, xi_minus, self.bins);
        let map = FunctionMap::sample(grid, |t| self.quark_density(t, pdf_q2, proton));
        self.integrator.integrate_map(&map)
    }
}

impl XSecModel for KovalenkoQelCharm {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn native_phase_space(&self) -> KinePhaseSpace {
        KinePhaseSpace::Q2
    }

    fn native_xsec(&self, interaction: &Interaction) -> f64 {
        let Some(q2) = interaction.kine().get(KineVar::Q2) else {
            return 0.0;
        };
        if q2 <= 0.0 || !q2_range(interaction).contains(q2) {
            return 0.0;
        }
        let init = interaction.init_state();
        let (Some(charm), Some(nucleon)) =
            (interaction.excl_tag().charm_hadron, init.target.hit_nucleon)
        else {
            return 0.0;
        };
        let (Some(mr), Some(delta), Some(sum_f2)) = (
            self.resonance_mass(interaction),
            self.res_dm(charm),
            self.sum_f2(charm, nucleon),
        ) else {
            return 0.0;
        };
        let proton = nucleon == pdg::PROTON;
        let e = interaction.energy();
        let m = pdg::NUCLEON_MASS;
        let vr = (mr * mr - m * m + q2) / (2.0 * m);
        let xi_r = self.xi_bar(q2, vr);
        let d = self.dr(q2, mr, delta, proton, false);
        let d0 = self.dr(q2, mr, delta, proton, true);
        if d0 <= 0.0 {
            return 0.0;
        }
        let z = 2.0 * self.mo * self.mo * SIN2_CABIBBO * sum_f2 / (d0 * (mr * mr - m * m));
        debug!(q2, z, d, "kovalenko resonance strength");
        GF2_OVER_2PI
            * z
            * d
            * (1.0 - vr / e + q2 / (4.0 * e * e) + q2 / (2.0 * m * e * xi_r))
            * (vr * vr + q2).sqrt()
            / (vr * xi_r)
    }

    fn integral(&self, interaction: &Interaction) -> Result<f64, NugenError> {
        Ok(integrate_native(
            self,
            interaction,
            &self.q2_integrator,
            &self.q2_integrator,
            None,
        ))
    }

    fn valid_process(&self, interaction: &Interaction) -> bool {
        let init = interaction.init_state();
        let process = interaction.process();
        if process.scattering != ScatteringType::QuasiElasticCharm
            || process.interaction != InteractionType::WeakCC
            || !pdg::is_neutrino(init.probe_pdg)
            || pdg::is_antineutrino(init.probe_pdg)
        {
            return false;
        }
        match (interaction.excl_tag().charm_hadron, init.target.hit_nucleon) {
            (Some(charm), Some(nucleon)) => self.sum_f2(charm, nucleon).is_some(),
            _ => false,
        }
    }

    fn valid_kinematics(&self, interaction: &Interaction) -> bool {
        let Some(mr) = self.resonance_mass(interaction) else {
            return false;
        };
        let m = pdg::NUCLEON_MASS;
        let ml = interaction.fs_lepton_mass();
        let threshold = ((mr + ml).powi(2) - m * m) / (2.0 * m);
        if interaction.energy() <= threshold {
            return false;
        }
        match interaction.kine().get(KineVar::Q2) {
            Some(q2) => q2 > self.q2_min && q2 < self.q2_max,
            None => true,
        }
    }
}
