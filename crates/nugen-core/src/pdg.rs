//! PDG particle codes, masses and charges used throughout the generator.
//!
//! Masses are in GeV. Ions follow the `10LZZZAAAI` convention and nucleon
//! clusters use the `2000000200 + charge` convention.

/// Electron.
pub const ELECTRON: i32 = 11;
/// Electron neutrino.
pub const NU_E: i32 = 12;
/// Muon.
pub const MUON: i32 = 13;
/// Muon neutrino.
pub const NU_MU: i32 = 14;
/// Tau lepton.
pub const TAU: i32 = 15;
/// Tau neutrino.
pub const NU_TAU: i32 = 16;
/// Photon.
pub const PHOTON: i32 = 22;
/// Neutral pion.
pub const PI0: i32 = 111;
/// Positive pion.
pub const PI_PLUS: i32 = 211;
/// Negative pion.
pub const PI_MINUS: i32 = -211;
/// Positive kaon.
pub const K_PLUS: i32 = 321;
/// Negative kaon.
pub const K_MINUS: i32 = -321;
/// Neutral D meson.
pub const D0: i32 = 421;
/// Charged D meson.
pub const D_PLUS: i32 = 411;
/// Charmed strange meson.
pub const DS_PLUS: i32 = 431;
/// Proton.
pub const PROTON: i32 = 2212;
/// Neutron.
pub const NEUTRON: i32 = 2112;
/// Lambda_c+ baryon.
pub const LAMBDA_C_PLUS: i32 = 4122;
/// Sigma_c+ baryon.
pub const SIGMA_C_PLUS: i32 = 4212;
/// Sigma_c++ baryon.
pub const SIGMA_C_PLUSPLUS: i32 = 4222;
/// Delta(1232) with charge -1.
pub const DELTA_MINUS: i32 = 1114;
/// Delta(1232) with charge 0.
pub const DELTA_0: i32 = 2114;
/// Delta(1232) with charge +1.
pub const DELTA_PLUS: i32 = 2214;
/// Delta(1232) with charge +2.
pub const DELTA_PLUSPLUS: i32 = 2224;
/// Neutron-neutron cluster.
pub const CLUSTER_NN: i32 = 2000000200;
/// Neutron-proton cluster.
pub const CLUSTER_NP: i32 = 2000000201;
/// Proton-proton cluster.
pub const CLUSTER_PP: i32 = 2000000202;

/// Proton mass.
pub const PROTON_MASS: f64 = 0.938272;
/// Neutron mass.
pub const NEUTRON_MASS: f64 = 0.939565;
/// Average nucleon mass.
pub const NUCLEON_MASS: f64 = 0.5 * (PROTON_MASS + NEUTRON_MASS);
/// Charged pion mass.
pub const PION_MASS: f64 = 0.139570;
/// Neutral pion mass.
pub const PI0_MASS: f64 = 0.134977;
/// Binding energy per nucleon used by the ion mass approximation.
const BINDING_PER_NUCLEON: f64 = 0.008;

/// Returns the mass of the given species, or `None` for unknown codes.
pub fn mass(pdg: i32) -> Option<f64> {
    if is_ion(pdg) {
        return Some(ion_mass(ion_z(pdg), ion_a(pdg)));
    }
    let m = match pdg.abs() {
        ELECTRON => 0.000511,
        MUON => 0.105658,
        TAU => 1.77686,
        NU_E | NU_MU | NU_TAU | PHOTON => 0.0,
        111 => PI0_MASS,
        211 => PION_MASS,
        321 => 0.493677,
        421 => 1.86484,
        411 => 1.86966,
        431 => 1.96835,
        2212 => PROTON_MASS,
        2112 => NEUTRON_MASS,
        4122 => 2.28646,
        4212 => 2.4529,
        4222 => 2.45397,
        1114 | 2114 | 2214 | 2224 => 1.232,
        2000000200 => 2.0 * NEUTRON_MASS,
        2000000201 => PROTON_MASS + NEUTRON_MASS,
        2000000202 => 2.0 * PROTON_MASS,
        _ => return None,
    };
    Some(m)
}

/// Returns the electric charge in units of the positron charge.
pub fn charge(pdg: i32) -> Option<i32> {
    if is_ion(pdg) {
        return Some(ion_z(pdg) as i32);
    }
    let sign = pdg.signum();
    let q = match pdg.abs() {
        ELECTRON | MUON | TAU => -1,
        NU_E | NU_MU | NU_TAU | PHOTON | 111 | 421 | 2112 | 2114 => 0,
        211 | 321 | 411 | 431 | 2212 | 4122 | 4212 | 2214 => 1,
        4222 | 2224 => 2,
        1114 => -1,
        2000000200 => 0,
        2000000201 => 1,
        2000000202 => 2,
        _ => return None,
    };
    Some(sign * q)
}

/// True for the three neutrino flavours and their antiparticles.
pub fn is_neutrino(pdg: i32) -> bool {
    matches!(pdg.abs(), NU_E | NU_MU | NU_TAU)
}

/// True for antineutrinos.
pub fn is_antineutrino(pdg: i32) -> bool {
    is_neutrino(pdg) && pdg < 0
}

/// True for charged leptons.
pub fn is_charged_lepton(pdg: i32) -> bool {
    matches!(pdg.abs(), ELECTRON | MUON | TAU)
}

/// True for protons and neutrons.
pub fn is_nucleon(pdg: i32) -> bool {
    pdg == PROTON || pdg == NEUTRON
}

/// True for pions of any charge.
pub fn is_pion(pdg: i32) -> bool {
    matches!(pdg, PI0 | PI_PLUS | PI_MINUS)
}

/// True for the charm hadrons produced by the charm channels.
pub fn is_charm_hadron(pdg: i32) -> bool {
    matches!(pdg.abs(), 421 | 411 | 431 | 4122 | 4212 | 4222)
}

/// True for Delta(1232) resonances.
pub fn is_delta(pdg: i32) -> bool {
    matches!(pdg, DELTA_MINUS | DELTA_0 | DELTA_PLUS | DELTA_PLUSPLUS)
}

/// True for nucleon cluster codes.
pub fn is_cluster(pdg: i32) -> bool {
    matches!(pdg, CLUSTER_NN | CLUSTER_NP | CLUSTER_PP)
}

/// True for ion codes (`10LZZZAAAI`).
pub fn is_ion(pdg: i32) -> bool {
    pdg > 1_000_000_000
        && pdg < 1_100_000_000
        && !is_cluster(pdg)
}

/// Builds the ion code for a nucleus with `z` protons and `a` nucleons.
pub fn ion_code(z: u32, a: u32) -> i32 {
    1_000_000_000 + (z as i32) * 10_000 + (a as i32) * 10
}

/// Proton number of an ion code.
pub fn ion_z(pdg: i32) -> u32 {
    ((pdg / 10_000) % 1000) as u32
}

/// Mass number of an ion code.
pub fn ion_a(pdg: i32) -> u32 {
    ((pdg / 10) % 1000) as u32
}

/// Approximate nuclear mass from its proton and nucleon numbers.
pub fn ion_mass(z: u32, a: u32) -> f64 {
    let n = a.saturating_sub(z);
    z as f64 * PROTON_MASS + n as f64 * NEUTRON_MASS - BINDING_PER_NUCLEON * a as f64
}

/// Charged lepton partner of a neutrino in charged-current scattering.
pub fn charged_lepton_partner(neutrino: i32) -> Option<i32> {
    let sign = neutrino.signum();
    let lepton = match neutrino.abs() {
        NU_E => ELECTRON,
        NU_MU => MUON,
        NU_TAU => TAU,
        _ => return None,
    };
    Some(sign * lepton)
}

/// Nucleon cluster code for a pair of nucleons.
pub fn cluster_code(first: i32, second: i32) -> i32 {
    let protons = [first, second].iter().filter(|p| **p == PROTON).count() as i32;
    CLUSTER_NN + protons
}

/// The two nucleons contained in a cluster, proton first.
pub fn cluster_constituents(cluster: i32) -> Option<[i32; 2]> {
    match cluster {
        CLUSTER_NN => Some([NEUTRON, NEUTRON]),
        CLUSTER_NP => Some([PROTON, NEUTRON]),
        CLUSTER_PP => Some([PROTON, PROTON]),
        _ => None,
    }
}

/// Pion species for a given charge.
pub fn pion_with_charge(q: i32) -> Option<i32> {
    match q {
        -1 => Some(PI_MINUS),
        0 => Some(PI0),
        1 => Some(PI_PLUS),
        _ => None,
    }
}

/// Nucleon species for a given charge.
pub fn nucleon_with_charge(q: i32) -> Option<i32> {
    match q {
        0 => Some(NEUTRON),
        1 => Some(PROTON),
        _ => None,
    }
}

/// Delta(1232) species for a given charge.
pub fn delta_with_charge(q: i32) -> Option<i32> {
    match q {
        -1 => Some(DELTA_MINUS),
        0 => Some(DELTA_0),
        1 => Some(DELTA_PLUS),
        2 => Some(DELTA_PLUSPLUS),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ion_codes_roundtrip_z_and_a() {
        let carbon = ion_code(6, 12);
        assert_eq!(carbon, 1000060120);
        assert!(is_ion(carbon));
        assert_eq!(ion_z(carbon), 6);
        assert_eq!(ion_a(carbon), 12);
        assert!(!is_ion(CLUSTER_NP));
    }

    #[test]
    fn charges_follow_antiparticle_sign() {
        assert_eq!(charge(MUON), Some(-1));
        assert_eq!(charge(-MUON), Some(1));
        assert_eq!(charge(PI_MINUS), Some(-1));
        assert_eq!(charge(DELTA_PLUSPLUS), Some(2));
        assert_eq!(charged_lepton_partner(-NU_MU), Some(-MUON));
    }

    #[test]
    fn cluster_code_counts_protons() {
        assert_eq!(cluster_code(PROTON, NEUTRON), CLUSTER_NP);
        assert_eq!(cluster_code(PROTON, PROTON), CLUSTER_PP);
        assert_eq!(cluster_constituents(CLUSTER_NN), Some([NEUTRON, NEUTRON]));
    }
}
