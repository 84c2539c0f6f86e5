//! Kinematic outcomes of hadron-nucleon interactions inside the nucleus.

use std::fmt::Debug;

use nugen_core::lorentz::isotropic_two_body;
use nugen_core::{pdg, FinalStateParticle, LorentzVector, RngHandle};

use crate::hadron_xsec::Fate;

/// Produces the particles leaving one interaction point.
pub trait Rescatterer: Debug + Send + Sync {
    /// Outcome of `fate` for hadron `pdg` with momentum `p4` on a nucleus
    /// whose proton fraction is `proton_fraction`. `None` means the fate has
    /// no permitted outcome for this draw.
    fn outcome(
        &self,
        fate: Fate,
        pdg: i32,
        p4: &LorentzVector,
        proton_fraction: f64,
        rng: &mut RngHandle,
    ) -> Option<Vec<FinalStateParticle>>;
}

/// Two- and three-body outcomes against a nucleon (or pair) at rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToyRescatterer;

impl ToyRescatterer {
    fn pick_nucleon(proton_fraction: f64, rng: &mut RngHandle) -> i32 {
        if rng.uniform() < proton_fraction {
            pdg::PROTON
        } else {
            pdg::NEUTRON
        }
    }

    fn two_body(
        system: &LorentzVector,
        first: i32,
        second: i32,
        rng: &mut RngHandle,
    ) -> Option<Vec<FinalStateParticle>> {
        let (p1, p2) = isotropic_two_body(system, pdg::mass(first)?, pdg::mass(second)?, rng)?;
        Some(vec![
            FinalStateParticle { pdg: first, p4: p1 },
            FinalStateParticle { pdg: second, p4: p2 },
        ])
    }

    fn other_nucleon(nucleon: i32) -> i32 {
        if nucleon == pdg::PROTON {
            pdg::NEUTRON
        } else {
            pdg::PROTON
        }
    }
}

impl Rescatterer for ToyRescatterer {
    fn outcome(
        &self,
        fate: Fate,
        hadron: i32,
        p4: &LorentzVector,
        proton_fraction: f64,
        rng: &mut RngHandle,
    ) -> Option<Vec<FinalStateParticle>> {
        match fate {
            Fate::Elastic => {
                let nucleon = Self::pick_nucleon(proton_fraction, rng);
                let system = *p4 + LorentzVector::at_rest(pdg::mass(nucleon)?);
                Self::two_body(&system, hadron, nucleon, rng)
            }
            Fate::ChargeExchange => {
                let nucleon = Self::pick_nucleon(proton_fraction, rng);
                let swapped = Self::other_nucleon(nucleon);
                let system = *p4 + LorentzVector::at_rest(pdg::mass(nucleon)?);
                if pdg::is_pion(hadron) {
                    let q = pdg::charge(hadron)? + pdg::charge(nucleon)? - pdg::charge(swapped)?;
                    let pion = pdg::pion_with_charge(q)?;
                    Self::two_body(&system, pion, swapped, rng)
                } else if pdg::is_nucleon(hadron) && hadron != nucleon {
                    Self::two_body(&system, nucleon, hadron, rng)
                } else {
                    None
                }
            }
            Fate::Inelastic => {
                let nucleon = Self::pick_nucleon(proton_fraction, rng);
                let system = *p4 + LorentzVector::at_rest(pdg::mass(nucleon)?);
                let m_h = pdg::mass(hadron)?;
                let m_n = pdg::mass(nucleon)?;
                let w = system.m();
                let x_min = m_n + pdg::PI0_MASS;
                let x_max = w - m_h;
                if x_max <= x_min {
                    return None;
                }
                let m_x = rng.uniform_in(x_min, x_max);
                let (h, x) = isotropic_two_body(&system, m_h, m_x, rng)?;
                let (n, pi) = isotropic_two_body(&x, m_n, pdg::PI0_MASS, rng)?;
                Some(vec![
                    FinalStateParticle { pdg: hadron, p4: h },
                    FinalStateParticle { pdg: nucleon, p4: n },
                    FinalStateParticle { pdg: pdg::PI0, p4: pi },
                ])
            }
            Fate::Absorption => {
                if !pdg::is_pion(hadron) {
                    return None;
                }
                let first = Self::pick_nucleon(proton_fraction, rng);
                let second = Self::pick_nucleon(proton_fraction, rng);
                let pair_mass = pdg::mass(first)? + pdg::mass(second)?;
                let q = pdg::charge(hadron)? + pdg::charge(first)? + pdg::charge(second)?;
                let (out1, out2) = match q {
                    0 => (pdg::NEUTRON, pdg::NEUTRON),
                    1 => (pdg::PROTON, pdg::NEUTRON),
                    2 => (pdg::PROTON, pdg::PROTON),
                    _ => return None,
                };
                let system = *p4 + LorentzVector::at_rest(pair_mass);
                Self::two_body(&system, out1, out2, rng)
            }
        }
    }
}
