use nugen_core::{pdg, Interaction, KineVar, Target};
use nugen_xsec::{
    q2_range, q2_range_at_w, set_wq2_point, set_xy_point, w_range, x_range, y_range_at_x,
};
use proptest::prelude::*;

fn lepton_cos_theta(interaction: &Interaction) -> f64 {
    let e = interaction.energy();
    let ml = interaction.fs_lepton_mass();
    let m = interaction.kinematic_mass();
    let kine = interaction.kine();
    let q2 = kine.get_or(KineVar::Q2, 0.0);
    let w = kine.get_or(KineVar::W, 0.0);
    let el = e - (w * w - m * m + q2) / (2.0 * m);
    let pl = (el * el - ml * ml).max(0.0).sqrt();
    (el - (q2 + ml * ml) / (2.0 * e)) / pl
}

#[test]
fn quasi_elastic_range_is_closed_below_threshold() {
    let qel = Interaction::qel_cc(pdg::NU_MU, Target::free_nucleon(pdg::NEUTRON), 0.1);
    assert!(q2_range(&qel).is_empty());
    let open = Interaction::qel_cc(pdg::NU_MU, Target::free_nucleon(pdg::NEUTRON), 1.0);
    let range = q2_range(&open);
    assert!(!range.is_empty());
    assert!(range.min >= 0.0 && range.max < 2.0);
}

#[test]
fn resonance_w_range_starts_at_pion_threshold() {
    let res = Interaction::res_cc(pdg::NU_MU, Target::free_nucleon(pdg::PROTON), 2.0);
    let range = w_range(&res, None);
    assert!((range.min - (pdg::PROTON_MASS + pdg::PION_MASS)).abs() < 1e-12);
    assert!(w_range(&res, Some(1.4)).max <= 1.4);
}

proptest! {
    #[test]
    fn wq2_points_give_physical_lepton_angles(e in 0.8f64..20.0, u in 0.0f64..1.0, v in 0.0f64..1.0) {
        let mut res = Interaction::res_cc(pdg::NU_MU, Target::free_nucleon(pdg::PROTON), e);
        let ws = w_range(&res, None);
        prop_assume!(!ws.is_empty());
        let w = ws.min + u * ws.width();
        let qs = q2_range_at_w(&res, w);
        prop_assume!(!qs.is_empty());
        let q2 = qs.min + v * qs.width();
        set_wq2_point(&mut res, w, q2);
        let cos = lepton_cos_theta(&res);
        prop_assert!(cos.abs() <= 1.0 + 1e-6, "cos = {}", cos);
    }

    #[test]
    fn xy_points_give_physical_lepton_angles(e in 1.0f64..50.0, u in 0.0f64..1.0, v in 0.0f64..1.0) {
        let mut dis = Interaction::dis_cc(pdg::NU_MU, Target::free_nucleon(pdg::NEUTRON), e);
        let xs = x_range(&dis);
        prop_assume!(!xs.is_empty());
        let x = xs.min + u * xs.width();
        let ys = y_range_at_x(&dis, x, dis.min_hadronic_mass());
        prop_assume!(!ys.is_empty());
        let y = ys.min + v * ys.width();
        set_xy_point(&mut dis, x, y);
        let cos = lepton_cos_theta(&dis);
        prop_assert!(cos.abs() <= 1.0 + 1e-6, "cos = {}", cos);
        prop_assert!(dis.kine().get_or(KineVar::W, 0.0) >= dis.min_hadronic_mass() - 1e-9);
    }
}
