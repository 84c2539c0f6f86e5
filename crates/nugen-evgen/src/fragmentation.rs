//! Default hadronization collaborators.

use std::f64::consts::PI;

use nugen_core::lorentz::isotropic_two_body;
use nugen_core::{
    pdg, AlgConfig, FinalStateParticle, Hadronizer, Interaction, LorentzVector, NugenError,
    RngHandle, ThreeVector,
};

/// Splits `parent` into the listed species by successive isotropic two-body
/// decays. Four-momentum is conserved exactly; `None` when the parent mass
/// cannot accommodate the species.
pub fn split_sequential(
    parent: &LorentzVector,
    species: &[i32],
    rng: &mut RngHandle,
) -> Option<Vec<FinalStateParticle>> {
    let masses: Vec<f64> = species.iter().map(|code| pdg::mass(*code)).collect::<Option<_>>()?;
    let n = species.len();
    match n {
        0 => return None,
        1 => {
            return ((parent.m() - masses[0]).abs() < 1e-6).then(|| {
                vec![FinalStateParticle {
                    pdg: species[0],
                    p4: *parent,
                }]
            })
        }
        _ => {}
    }
    let mut out = Vec::with_capacity(n);
    let mut remaining = *parent;
    for i in 0..n - 1 {
        let rest_min: f64 = masses[i + 1..].iter().sum();
        let available = remaining.m();
        if available < masses[i] + rest_min {
            return None;
        }
        let m_rest = if i == n - 2 {
            masses[n - 1]
        } else {
            rng.uniform_in(rest_min, available - masses[i])
        };
        let (first, rest) = isotropic_two_body(&remaining, masses[i], m_rest, rng)?;
        out.push(FinalStateParticle {
            pdg: species[i],
            p4: first,
        });
        remaining = rest;
    }
    out.push(FinalStateParticle {
        pdg: species[n - 1],
        p4: remaining,
    });
    Some(out)
}

/// Pion charges summing to `charge`, `n` pions in total; `None` if impossible.
fn pion_charges(n: usize, charge: i32, rng: &mut RngHandle) -> Option<Vec<i32>> {
    if charge.unsigned_abs() as usize > n {
        return None;
    }
    let sign = if charge < 0 { pdg::PI_MINUS } else { pdg::PI_PLUS };
    let mut out = vec![sign; charge.unsigned_abs() as usize];
    let mut free = n - out.len();
    while free >= 2 {
        if rng.uniform() < 1.0 / 3.0 {
            out.push(pdg::PI_PLUS);
            out.push(pdg::PI_MINUS);
            free -= 2;
        } else {
            out.push(pdg::PI0);
            free -= 1;
        }
    }
    if free == 1 {
        out.push(pdg::PI0);
    }
    Some(out)
}

/// Nucleon plus pions with multiplicity `max(1, ⌊a + b ln W²⌋)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToyHadronizer {
    a: f64,
    b: f64,
}

impl Default for ToyHadronizer {
    fn default() -> Self {
        Self { a: 0.4, b: 1.42 }
    }
}

impl ToyHadronizer {
    /// Catalogue name.
    pub const NAME: &'static str = "toy-hadronizer";

    /// Reads `multiplicity-a` and `multiplicity-b`.
    pub fn from_config(config: &AlgConfig) -> Result<Self, NugenError> {
        let defaults = Self::default();
        Ok(Self {
            a: config.get_f64("multiplicity-a", defaults.a),
            b: config.get_f64("multiplicity-b", defaults.b),
        })
    }

    /// Pion multiplicity at hadronic invariant mass `w`.
    pub fn multiplicity(&self, w: f64) -> usize {
        let n = (self.a + self.b * (w * w).max(1e-12).ln()).floor();
        if n.is_finite() && n >= 1.0 {
            n as usize
        } else {
            1
        }
    }
}

impl Hadronizer for ToyHadronizer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn hadronize(
        &self,
        interaction: &Interaction,
        hadronic_p4: &LorentzVector,
        rng: &mut RngHandle,
    ) -> Option<Vec<FinalStateParticle>> {
        let w = hadronic_p4.m();
        let charge = interaction.hadronic_charge();
        let mut n = self.multiplicity(w);
        while n > 1 && pdg::NUCLEON_MASS + n as f64 * pdg::PION_MASS >= w {
            n -= 1;
        }
        let mut nucleons = [pdg::PROTON, pdg::NEUTRON];
        if rng.uniform() < 0.5 {
            nucleons.swap(0, 1);
        }
        for nucleon in nucleons {
            let q_nucleon = pdg::charge(nucleon).unwrap_or(0);
            let Some(pions) = pion_charges(n, charge - q_nucleon, rng) else {
                continue;
            };
            let mut species = Vec::with_capacity(n + 1);
            species.push(nucleon);
            species.extend(pions);
            if let Some(products) = split_sequential(hadronic_p4, &species, rng) {
                return Some(products);
            }
        }
        None
    }
}

/// Charm hadron species drawn from the energy-dependent fraction table.
pub fn charm_hadron_for_energy(energy: f64, u: f64) -> i32 {
    let (d0, d_plus, ds) = if energy <= 20.0 {
        (0.32, 0.37, 0.55)
    } else if energy <= 40.0 {
        (0.50, 0.60, 0.82)
    } else {
        (0.64, 0.86, 0.95)
    };
    if u <= d0 {
        pdg::D0
    } else if u <= d_plus {
        pdg::D_PLUS
    } else if u <= ds {
        pdg::DS_PLUS
    } else {
        pdg::LAMBDA_C_PLUS
    }
}

/// Charm DIS fragmentation: one charm hadron carrying a Peterson-distributed
/// energy fraction of the hadronic system, plus charge-conserving remnants.
#[derive(Debug, Clone, PartialEq)]
pub struct CharmHadronizer {
    peterson_eps: f64,
    pt2_scale: f64,
    max_tries: usize,
    peterson_max: f64,
}

impl CharmHadronizer {
    /// Catalogue name.
    pub const NAME: &'static str = "charm-dis";

    /// Reads `peterson-eps` (0.2), `pt2-scale` (0.6 GeV²) and `max-tries` (1000).
    pub fn from_config(config: &AlgConfig) -> Result<Self, NugenError> {
        let peterson_eps = config.get_f64("peterson-eps", 0.2);
        let pt2_scale = config.get_f64("pt2-scale", 0.6);
        let max_tries = config.get_i64("max-tries", 1000);
        if !(peterson_eps > 0.0) || !(pt2_scale > 0.0) || max_tries < 1 {
            return Err(NugenError::config(
                "invalid-charm-fragmentation",
                "peterson-eps, pt2-scale and max-tries must be positive",
            ));
        }
        let mut hadronizer = Self {
            peterson_eps,
            pt2_scale,
            max_tries: max_tries as usize,
            peterson_max: 0.0,
        };
        hadronizer.peterson_max = (1..1000)
            .map(|i| hadronizer.peterson(i as f64 / 1000.0))
            .fold(0.0, f64::max);
        Ok(hadronizer)
    }

    /// Unnormalised Peterson fragmentation function.
    pub fn peterson(&self, z: f64) -> f64 {
        if !(z > 0.0 && z < 1.0) {
            return 0.0;
        }
        let d = 1.0 - 1.0 / z - self.peterson_eps / (1.0 - z);
        1.0 / (z * d * d)
    }

    fn sample_z(&self, rng: &mut RngHandle) -> Option<f64> {
        let bound = 1.05 * self.peterson_max;
        for _ in 0..self.max_tries {
            let z = rng.uniform_open().min(1.0 - 1e-9);
            if rng.uniform() * bound < self.peterson(z) {
                return Some(z);
            }
        }
        None
    }

    /// `p_T²` from `exp(-p_T²/scale)` truncated to `[0, max]`.
    fn sample_pt2(&self, max: f64, rng: &mut RngHandle) -> f64 {
        let cut = 1.0 - (-max / self.pt2_scale).exp();
        -self.pt2_scale * (1.0 - rng.uniform() * cut).ln()
    }

    fn remnant_species(charge: i32, with_nucleon: bool, rng: &mut RngHandle) -> Option<Vec<i32>> {
        let mut species = Vec::new();
        let mut q = charge;
        if with_nucleon {
            let nucleon = if q > 0 { pdg::PROTON } else { pdg::NEUTRON };
            q -= pdg::charge(nucleon).unwrap_or(0);
            species.push(nucleon);
        }
        let n = 2.max(q.unsigned_abs() as usize);
        species.extend(pion_charges(n, q, rng)?);
        Some(species)
    }
}

impl Hadronizer for CharmHadronizer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn hadronize(
        &self,
        interaction: &Interaction,
        hadronic_p4: &LorentzVector,
        rng: &mut RngHandle,
    ) -> Option<Vec<FinalStateParticle>> {
        let anti = pdg::is_antineutrino(interaction.init_state().probe_pdg);
        let e_had = hadronic_p4.e();
        let m_had = hadronic_p4.m();
        let axis = hadronic_p4.vect.unit();
        let charge = interaction.hadronic_charge();

        for _ in 0..self.max_tries {
            let mut charm = charm_hadron_for_energy(interaction.energy(), rng.uniform());
            if anti {
                // anti-charm baryons would need an extra baryon pair
                charm = if charm == pdg::LAMBDA_C_PLUS { -pdg::D0 } else { -charm };
            }
            let Some(m) = pdg::mass(charm) else {
                continue;
            };
            let Some(z) = self.sample_z(rng) else {
                continue;
            };
            let e_c = z * e_had;
            let p2 = e_c * e_c - m * m;
            if m > m_had || p2 < 0.0 {
                continue;
            }
            let pt2 = self.sample_pt2(p2, rng);
            let pt = pt2.sqrt();
            let phi = rng.uniform_in(0.0, 2.0 * PI);
            let local = ThreeVector::new(pt * phi.sin(), pt * phi.cos(), (p2 - pt2).max(0.0).sqrt());
            let charm_p4 = LorentzVector::from_parts(local.rotate_uz(&axis), e_c);
            let remnant = *hadronic_p4 - charm_p4;
            if !(remnant.m2() > 0.0) {
                continue;
            }
            let q_charm = pdg::charge(charm).unwrap_or(0);
            // charm mesons leave the struck baryon in the remnant
            let with_nucleon = charm.abs() < 1000;
            let Some(species) = Self::remnant_species(charge - q_charm, with_nucleon, rng) else {
                continue;
            };
            let Some(mut products) = split_sequential(&remnant, &species, rng) else {
                continue;
            };
            products.insert(0, FinalStateParticle { pdg: charm, p4: charm_p4 });
            return Some(products);
        }
        None
    }
}
