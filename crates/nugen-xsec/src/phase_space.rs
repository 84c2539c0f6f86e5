//! Closed-form kinematic limits and helpers that fill consistent running
//! kinematics for a point in each phase-space convention.

use serde::{Deserialize, Serialize};

use nugen_core::{pdg, Interaction, KineVar, ScatteringType};

/// Closed interval; empty when `max < min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range1D {
    /// Lower limit.
    pub min: f64,
    /// Upper limit.
    pub max: f64,
}

impl Range1D {
    /// Creates a range.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// The canonical empty range.
    pub fn empty() -> Self {
        Self { min: 0.0, max: -1.0 }
    }

    /// True when the range admits no interior point.
    pub fn is_empty(&self) -> bool {
        !(self.max > self.min) || !self.min.is_finite() || !self.max.is_finite()
    }

    /// Inclusive membership test with a small relative tolerance.
    pub fn contains(&self, v: f64) -> bool {
        let tol = 1e-9 * (1.0 + self.max.abs().max(self.min.abs()));
        !self.is_empty() && v >= self.min - tol && v <= self.max + tol
    }

    /// Intersection with another range.
    pub fn intersect(&self, other: &Range1D) -> Range1D {
        Range1D::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Width, zero when empty.
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max - self.min
        }
    }
}

/// Lower edge used for Bjorken x to keep Q² away from zero.
pub const X_FLOOR: f64 = 1e-4;

/// Hadronic invariant mass limits `[W_min, √s − m_l]`, optionally capped.
pub fn w_range(interaction: &Interaction, w_cut: Option<f64>) -> Range1D {
    let w_min = interaction.min_hadronic_mass();
    let mut w_max = interaction.s().max(0.0).sqrt() - interaction.fs_lepton_mass();
    if let Some(cut) = w_cut {
        w_max = w_max.min(cut);
    }
    Range1D::new(w_min, w_max)
}

/// Two-body Q² limits for a hadronic final state of mass `w`.
pub fn q2_range_at_w(interaction: &Interaction, w: f64) -> Range1D {
    let m = interaction.kinematic_mass();
    let ml = interaction.fs_lepton_mass();
    let s = interaction.s();
    if !(s > 0.0) || s < (ml + w) * (ml + w) {
        return Range1D::empty();
    }
    let sqrt_s = s.sqrt();
    let e1 = (s - m * m) / (2.0 * sqrt_s);
    let p1 = e1.max(0.0);
    let e3 = (s + ml * ml - w * w) / (2.0 * sqrt_s);
    let p3 = (e3 * e3 - ml * ml).max(0.0).sqrt();
    let q2_min = (-ml * ml + 2.0 * (e1 * e3 - p1 * p3)).max(0.0);
    let q2_max = -ml * ml + 2.0 * (e1 * e3 + p1 * p3);
    Range1D::new(q2_min, q2_max)
}

/// Q² limits for quasi-elastic style channels (fixed recoil mass).
pub fn q2_range(interaction: &Interaction) -> Range1D {
    q2_range_at_w(interaction, interaction.min_hadronic_mass())
}

/// Bjorken x limits.
pub fn x_range(interaction: &Interaction) -> Range1D {
    let m = interaction.kinematic_mass();
    let e = interaction.energy();
    let ml = interaction.fs_lepton_mass();
    let x_min = if e > ml {
        (ml * ml / (2.0 * m * (e - ml))).max(X_FLOOR)
    } else {
        return Range1D::empty();
    };
    let x_max = match interaction.process().scattering {
        ScatteringType::Coherent => 1.0,
        _ => 1.0 - X_FLOOR,
    };
    Range1D::new(x_min, x_max)
}

/// Inelasticity limits at fixed x.
///
/// Intersects the lepton-angle region `a·y² + b·y + c ≤ 0` with the
/// lepton-energy bound `y ≤ 1 − m_l/E` and, for inelastic channels, the
/// invariant-mass cut `W ≥ W_min` (coherent channels instead need
/// `y ≥ m_π/E`).
pub fn y_range_at_x(interaction: &Interaction, x: f64, w_min: f64) -> Range1D {
    let m = interaction.kinematic_mass();
    let e = interaction.energy();
    let ml = interaction.fs_lepton_mass();
    if !(x > 0.0) || x > 1.0 || !(e > ml) {
        return Range1D::empty();
    }
    let ml2 = ml * ml;
    let e2 = e * e;
    let big_a = 2.0 * m * e * x;
    let a = big_a * (big_a + 4.0 * e2);
    let b = 2.0 * big_a * ml2 - 4.0 * e2 * big_a + 4.0 * e2 * ml2;
    let c = ml2 * ml2;
    let region = if ml2 == 0.0 {
        // c = 0: roots at 0 and -b/a
        Range1D::new(0.0, -b / a)
    } else {
        let disc = b * b - 4.0 * a * c;
        if !(disc >= 0.0) || !(a > 0.0) {
            return Range1D::empty();
        }
        let sqrt_disc = disc.sqrt();
        Range1D::new((-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a))
    };
    let mut limits = region.intersect(&Range1D::new(0.0, 1.0 - ml / e));
    match interaction.process().scattering {
        ScatteringType::Coherent => {
            let pion = if interaction.is_cc() {
                pdg::PION_MASS
            } else {
                pdg::PI0_MASS
            };
            limits = limits.intersect(&Range1D::new(pion / e, 1.0));
        }
        _ => {
            if x < 1.0 {
                let y_w = (w_min * w_min - m * m) / (2.0 * m * e * (1.0 - x));
                limits = limits.intersect(&Range1D::new(y_w, 1.0));
            }
        }
    }
    limits
}

/// Sets Q² and the derived x, y for a quasi-elastic point with recoil mass `w`.
pub fn set_q2_point(interaction: &mut Interaction, q2: f64) {
    let w = interaction.min_hadronic_mass();
    set_wq2_point(interaction, w, q2);
}

/// Sets `(W, Q²)` and the derived x, y.
pub fn set_wq2_point(interaction: &mut Interaction, w: f64, q2: f64) {
    let m = interaction.kinematic_mass();
    let e = interaction.energy();
    let nu = (w * w - m * m + q2) / (2.0 * m);
    let y = nu / e;
    let x = if nu > 0.0 { q2 / (2.0 * m * nu) } else { 0.0 };
    let kine = interaction.kine_mut();
    kine.set(KineVar::W, w);
    kine.set(KineVar::Q2, q2);
    kine.set(KineVar::X, x);
    kine.set(KineVar::Y, y);
}

/// Sets `(x, y)` and the derived Q², W (and |t| for coherent channels).
pub fn set_xy_point(interaction: &mut Interaction, x: f64, y: f64) {
    let m = interaction.kinematic_mass();
    let e = interaction.energy();
    let q2 = 2.0 * m * e * x * y;
    let w2 = m * m + 2.0 * m * e * y * (1.0 - x);
    let coherent = interaction.process().scattering == ScatteringType::Coherent;
    let kine = interaction.kine_mut();
    kine.set(KineVar::X, x);
    kine.set(KineVar::Y, y);
    kine.set(KineVar::Q2, q2);
    kine.set(KineVar::W, w2.max(0.0).sqrt());
    if coherent {
        // |t| lower bound for the pion emitted along q
        let nu = e * y;
        let t = (q2 / (2.0 * nu.max(f64::MIN_POSITIVE))).powi(2);
        kine.set(KineVar::T, t);
    }
}

/// True when `(x, y)` lies inside the closed-form region.
pub fn xy_allowed(interaction: &Interaction, x: f64, y: f64, w_min: f64) -> bool {
    x_range(interaction).contains(x) && y_range_at_x(interaction, x, w_min).contains(y)
}

/// True when `(W, Q²)` lies inside the closed-form region.
pub fn wq2_allowed(interaction: &Interaction, w: f64, q2: f64, w_cut: Option<f64>) -> bool {
    w_range(interaction, w_cut).contains(w) && q2_range_at_w(interaction, w).contains(q2)
}
