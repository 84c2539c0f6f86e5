//! Swappable differential cross-section models.
//!
//! Values are in units of 1e-38 cm² per the model's native phase-space
//! element. Only ratios matter to selection and sampling.

use nugen_core::{Interaction, KinePhaseSpace, XSecModel};

use crate::numerics::GridIntegrator;
use crate::phase_space::{
    q2_range, q2_range_at_w, set_q2_point, set_wq2_point, set_xy_point, w_range, x_range,
    y_range_at_x,
};

mod coherent;
mod dis;
mod elastic;
mod mec;
mod qel;
mod qel_charm;
mod resonance;

pub use coherent::CohReinSehgalToy;
pub use dis::DisScaling;
pub use elastic::NuElastic;
pub use mec::MecGaussian;
pub use qel::QelDipole;
pub use qel_charm::KovalenkoQelCharm;
pub use resonance::ResBreitWigner;

/// G_F² / 2π converted to 1e-38 cm² / GeV².
pub const GF2_OVER_2PI: f64 = 0.843;
/// sin²θ_C.
pub const SIN2_CABIBBO: f64 = 0.0513;
/// cos²θ_C.
pub const COS2_CABIBBO: f64 = 1.0 - SIN2_CABIBBO;
/// sin²θ_W.
pub const SIN2_WEINBERG: f64 = 0.2312;

/// `(1 + (1 − y)²) / 2`, clamped to the physical region.
pub(crate) fn helicity_factor(y: f64) -> f64 {
    let y = y.clamp(0.0, 1.0);
    0.5 * (1.0 + (1.0 - y) * (1.0 - y))
}

/// Dipole form factor `(1 + Q²/M²)^-2`.
pub(crate) fn dipole(q2: f64, mass: f64) -> f64 {
    let d = 1.0 + q2 / (mass * mass);
    1.0 / (d * d)
}

/// Integrates a model's native cross section over the full closed-form
/// phase space at the interaction's probe energy.
///
/// `w_cut` caps the hadronic invariant mass for `(W, Q²)` models.
pub fn integrate_native(
    model: &dyn XSecModel,
    interaction: &Interaction,
    integrator_1d: &GridIntegrator,
    integrator_2d: &GridIntegrator,
    w_cut: Option<f64>,
) -> f64 {
    if !model.valid_process(interaction) {
        return 0.0;
    }
    let frozen = interaction.at_energy(interaction.energy());
    if !model.valid_kinematics(&frozen) {
        return 0.0;
    }
    let total = match model.native_phase_space() {
        KinePhaseSpace::Q2 | KinePhaseSpace::Y => {
            let range = q2_range(&frozen);
            integrator_1d.integrate(
                |q2| {
                    let mut point = frozen.clone();
                    set_q2_point(&mut point, q2);
                    model.xsec(&point, KinePhaseSpace::Q2).unwrap_or(0.0)
                },
                range.min,
                range.max,
            )
        }
        KinePhaseSpace::XY => {
            let range = x_range(&frozen);
            let w_min = frozen.min_hadronic_mass();
            integrator_2d.integrate_2d(
                |x, y| {
                    let mut point = frozen.clone();
                    set_xy_point(&mut point, x, y);
                    model.native_xsec(&point)
                },
                range.min,
                range.max,
                |x| {
                    let ys = y_range_at_x(&frozen, x, w_min);
                    (ys.min, ys.max)
                },
            )
        }
        KinePhaseSpace::WQ2 => {
            let range = w_range(&frozen, w_cut);
            integrator_2d.integrate_2d(
                |w, q2| {
                    let mut point = frozen.clone();
                    set_wq2_point(&mut point, w, q2);
                    model.native_xsec(&point)
                },
                range.min,
                range.max,
                |w| {
                    let qs = q2_range_at_w(&frozen, w);
                    (qs.min, qs.max)
                },
            )
        }
    };
    if total.is_finite() && total > 0.0 {
        total
    } else {
        0.0
    }
}
