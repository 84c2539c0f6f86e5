use nugen_core::{
    jacobian, pdg, Interaction, KinePhaseSpace, KineVar, ScatteringType, Target,
};

#[test]
fn cc_quasi_elastic_on_neutron_recoils_proton() {
    let interaction = Interaction::qel_cc(pdg::NU_MU, Target::free_nucleon(pdg::NEUTRON), 1.0);
    assert_eq!(interaction.fs_primary_lepton_pdg(), pdg::MUON);
    assert_eq!(interaction.recoil_nucleon_pdg(), Some(pdg::PROTON));
    assert!(interaction.energy_threshold() > 0.0 && interaction.energy_threshold() < 0.2);

    let anti = Interaction::qel_cc(-pdg::NU_MU, Target::free_nucleon(pdg::PROTON), 1.0);
    assert_eq!(anti.fs_primary_lepton_pdg(), -pdg::MUON);
    assert_eq!(anti.recoil_nucleon_pdg(), Some(pdg::NEUTRON));
}

#[test]
fn fingerprints_ignore_energy_but_not_channel() {
    let carbon = Target::nucleus(6, 12).with_hit_nucleon(pdg::NEUTRON);
    let low = Interaction::qel_cc(pdg::NU_MU, carbon, 1.0);
    let high = low.at_energy(5.0);
    assert_eq!(low.fingerprint("Q2"), high.fingerprint("Q2"));
    assert_ne!(low.fingerprint("Q2"), low.fingerprint("XY"));

    let dis = Interaction::dis_cc(pdg::NU_MU, carbon, 1.0);
    assert_ne!(low.fingerprint("Q2"), dis.fingerprint("Q2"));
    assert_eq!(dis.process().scattering, ScatteringType::DeepInelastic);
}

#[test]
fn coherent_uses_nucleus_mass() {
    let carbon = Target::nucleus(6, 12);
    let coh = Interaction::coh_nc(pdg::NU_MU, carbon, 2.0);
    assert!((coh.kinematic_mass() - carbon.mass()).abs() < 1e-12);
    assert_eq!(coh.hadronic_charge(), 0);
}

#[test]
fn jacobians_are_reciprocal() {
    let mut interaction = Interaction::dis_cc(pdg::NU_MU, Target::free_nucleon(pdg::PROTON), 10.0);
    interaction.kine_mut().set(KineVar::X, 0.3);
    interaction.kine_mut().set(KineVar::Y, 0.5);
    interaction.kine_mut().set(KineVar::W, 2.5);

    let forward = jacobian(&interaction, KinePhaseSpace::WQ2, KinePhaseSpace::XY).expect("defined");
    let back = jacobian(&interaction, KinePhaseSpace::XY, KinePhaseSpace::WQ2).expect("defined");
    assert!((forward * back - 1.0).abs() < 1e-12);

    let q2y = jacobian(&interaction, KinePhaseSpace::Q2, KinePhaseSpace::Y).expect("defined");
    let m = interaction.kinematic_mass();
    assert!((q2y - 2.0 * m * 10.0 * 0.3).abs() < 1e-12);

    assert!(jacobian(&interaction, KinePhaseSpace::Q2, KinePhaseSpace::XY).is_none());
}

#[test]
fn degenerate_jacobian_collapses_to_zero() {
    let mut interaction = Interaction::res_cc(pdg::NU_MU, Target::free_nucleon(pdg::PROTON), 2.0);
    interaction.kine_mut().set(KineVar::Y, 0.0);
    interaction.kine_mut().set(KineVar::W, 1.2);
    let factor = jacobian(&interaction, KinePhaseSpace::XY, KinePhaseSpace::WQ2).expect("defined");
    assert_eq!(factor, 0.0);
}
