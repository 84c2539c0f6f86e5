use nugen_core::{
    pdg, AlgConfig, Interaction, KinePhaseSpace, KineVar, NugenError, ParamValue, Target,
};
use nugen_xsec::{set_q2_point, XSecCatalogue};

fn carbon() -> Target {
    Target::nucleus(6, 12)
}

#[test]
fn unknown_models_are_configuration_errors() {
    let catalogue = XSecCatalogue::builtin();
    let err = catalogue
        .build("no-such-model", &AlgConfig::default())
        .expect_err("unknown");
    assert!(matches!(err, NugenError::Config(_)));
}

#[test]
fn mec_requires_its_ccqe_sub_algorithm() {
    let catalogue = XSecCatalogue::builtin();
    let err = catalogue
        .build("mec-gaussian", &AlgConfig::default())
        .expect_err("missing sub-algorithm");
    assert!(matches!(err, NugenError::Config(_)));
}

#[test]
fn mec_integral_is_a_fraction_of_ccqe() {
    let catalogue = XSecCatalogue::builtin();
    let mec = catalogue
        .build(
            "mec-gaussian",
            &AlgConfig::new()
                .with_sub_algorithm("ccqe-xsec", "qel-dipole")
                .with_param("frac-ccqe", ParamValue::Double(0.2)),
        )
        .expect("mec");
    let qel = catalogue.build("qel-dipole", &AlgConfig::default()).expect("qel");

    let target = carbon().with_hit_cluster(pdg::CLUSTER_NP);
    let mec_interaction = Interaction::mec_cc(pdg::NU_MU, target, 2.0);
    let qel_interaction =
        Interaction::qel_cc(pdg::NU_MU, carbon().with_hit_nucleon(pdg::NEUTRON), 2.0);

    let expected = qel.integral(&qel_interaction).expect("qel integral") * 0.2 * 5.5;
    let got = mec.integral(&mec_interaction).expect("mec integral");
    assert!(expected > 0.0);
    assert!((got - expected).abs() < 1e-9 * expected);
}

#[test]
fn requested_conventions_without_jacobian_are_rejected() {
    let qel = XSecCatalogue::builtin()
        .build("qel-dipole", &AlgConfig::default())
        .expect("qel");
    let mut interaction = Interaction::qel_cc(pdg::NU_MU, Target::free_nucleon(pdg::NEUTRON), 1.0);
    set_q2_point(&mut interaction, 0.3);
    assert!(qel.xsec(&interaction, KinePhaseSpace::Q2).expect("native") > 0.0);
    assert!(qel.xsec(&interaction, KinePhaseSpace::Y).expect("jacobian") > 0.0);
    assert!(matches!(
        qel.xsec(&interaction, KinePhaseSpace::WQ2),
        Err(NugenError::Config(_))
    ));
}

#[test]
fn forbidden_points_evaluate_to_zero() {
    let qel = XSecCatalogue::builtin()
        .build("qel-dipole", &AlgConfig::default())
        .expect("qel");
    let mut interaction = Interaction::qel_cc(pdg::NU_MU, Target::free_nucleon(pdg::NEUTRON), 1.0);
    interaction.kine_mut().set(KineVar::Q2, 25.0);
    assert_eq!(qel.xsec(&interaction, KinePhaseSpace::Q2).expect("value"), 0.0);

    let below = Interaction::qel_cc(pdg::NU_MU, Target::free_nucleon(pdg::NEUTRON), 0.05);
    assert_eq!(qel.integral(&below).expect("integral"), 0.0);
}

#[test]
fn every_builtin_model_has_a_positive_integral_in_its_channel() {
    let catalogue = XSecCatalogue::builtin();
    let free_n = Target::free_nucleon(pdg::NEUTRON);
    let free_p = Target::free_nucleon(pdg::PROTON);
    let cases = vec![
        ("qel-dipole", Interaction::qel_cc(pdg::NU_MU, free_n, 1.0)),
        ("nu-elastic", Interaction::nu_elastic(pdg::NU_MU, free_p, 1.0)),
        ("dis-scaling", Interaction::dis_cc(pdg::NU_MU, free_p, 10.0)),
        ("res-breit-wigner", Interaction::res_cc(pdg::NU_MU, free_p, 2.0)),
        ("coh-rein-sehgal-toy", Interaction::coh_nc(pdg::NU_MU, carbon(), 2.0)),
        (
            "qel-charm-kovalenko",
            Interaction::qel_charm(pdg::NU_MU, free_n, 10.0, pdg::LAMBDA_C_PLUS),
        ),
    ];
    for (name, interaction) in cases {
        let model = catalogue.build(name, &AlgConfig::default()).expect("model");
        assert!(model.valid_process(&interaction), "{name} rejects its channel");
        let integral = model.integral(&interaction).expect("integral");
        assert!(integral > 0.0 && integral.is_finite(), "{name}: {integral}");
    }
}

#[test]
fn charm_model_rejects_unsupported_pairs() {
    let model = XSecCatalogue::builtin()
        .build("qel-charm-kovalenko", &AlgConfig::default())
        .expect("charm");
    let wrong = Interaction::qel_charm(
        pdg::NU_MU,
        Target::free_nucleon(pdg::PROTON),
        10.0,
        pdg::LAMBDA_C_PLUS,
    );
    assert!(!model.valid_process(&wrong));
    let below = Interaction::qel_charm(
        pdg::NU_MU,
        Target::free_nucleon(pdg::NEUTRON),
        1.5,
        pdg::LAMBDA_C_PLUS,
    );
    assert_eq!(model.integral(&below).expect("integral"), 0.0);
}
