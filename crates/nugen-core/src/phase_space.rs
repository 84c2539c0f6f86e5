//! Phase-space conventions for differential cross sections and the
//! Jacobians converting between them.

use serde::{Deserialize, Serialize};

use crate::interaction::{Interaction, KineVar};

/// Differential convention a cross section is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KinePhaseSpace {
    /// dσ/dQ².
    Q2,
    /// dσ/dy.
    Y,
    /// d²σ/dxdy.
    XY,
    /// d²σ/dWdQ².
    WQ2,
}

impl KinePhaseSpace {
    /// Short label used in fingerprints and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            KinePhaseSpace::Q2 => "dQ2",
            KinePhaseSpace::Y => "dy",
            KinePhaseSpace::XY => "dxdy",
            KinePhaseSpace::WQ2 => "dWdQ2",
        }
    }

    /// True when a Jacobian between `self` and `other` is defined.
    pub fn convertible_to(&self, other: KinePhaseSpace) -> bool {
        use KinePhaseSpace::*;
        matches!(
            (self, other),
            (Q2, Q2) | (Y, Y) | (XY, XY) | (WQ2, WQ2) | (Q2, Y) | (Y, Q2) | (XY, WQ2) | (WQ2, XY)
        )
    }
}

/// Multiplicative factor turning a cross section in `from` into one in `to`
/// at the interaction's running kinematics.
///
/// Returns `None` when no conversion is defined, which callers treat as a
/// configuration error. Non-finite factors collapse to zero.
pub fn jacobian(interaction: &Interaction, from: KinePhaseSpace, to: KinePhaseSpace) -> Option<f64> {
    use KinePhaseSpace::*;
    if !from.convertible_to(to) {
        return None;
    }
    if from == to {
        return Some(1.0);
    }
    let m = interaction.kinematic_mass();
    let e = interaction.energy();
    let kine = interaction.kine();
    let factor = match (from, to) {
        // Q² = 2 M E x y
        (Q2, Y) => 2.0 * m * e * kine.get_or(KineVar::X, 1.0),
        (Y, Q2) => 1.0 / (2.0 * m * e * kine.get_or(KineVar::X, 1.0)),
        // |∂(W, Q²) / ∂(x, y)| = 2 M² E² y / W
        (WQ2, XY) => {
            let y = kine.get_or(KineVar::Y, 0.0);
            let w = kine.get_or(KineVar::W, 0.0);
            2.0 * m * m * e * e * y / w
        }
        (XY, WQ2) => {
            let y = kine.get_or(KineVar::Y, 0.0);
            let w = kine.get_or(KineVar::W, 0.0);
            w / (2.0 * m * m * e * e * y)
        }
        _ => return None,
    };
    Some(if factor.is_finite() { factor } else { 0.0 })
}
