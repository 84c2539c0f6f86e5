use nugen_core::lorentz::{isotropic_two_body, two_body_momentum};
use nugen_core::{LorentzVector, RngHandle, ThreeVector};

#[test]
fn boost_preserves_invariant_mass() {
    let p = LorentzVector::on_shell(ThreeVector::new(0.3, -0.2, 0.9), 0.938);
    let boosted = p.boost(&ThreeVector::new(0.1, 0.2, -0.4));
    assert!((boosted.m() - 0.938).abs() < 1e-9);
    let back = boosted.boost(&ThreeVector::new(-0.1, -0.2, 0.4));
    assert!(back.max_abs_diff(&p) < 1e-9);
}

#[test]
fn rotate_uz_maps_z_axis_onto_direction() {
    let u = ThreeVector::new(1.0, 1.0, 1.0).unit();
    let rotated = ThreeVector::unit_z().rotate_uz(&u);
    assert!((rotated - u).mag() < 1e-12);
    let flipped = ThreeVector::new(0.2, 0.0, 1.0).rotate_uz(&ThreeVector::new(0.0, 0.0, -1.0));
    assert_eq!(flipped, ThreeVector::new(-0.2, 0.0, -1.0));
}

#[test]
fn two_body_decay_conserves_four_momentum() {
    assert!(two_body_momentum(0.2, 0.139, 0.139).is_none());
    let parent = LorentzVector::on_shell(ThreeVector::new(0.0, 0.4, 1.2), 1.232);
    let mut rng = RngHandle::from_seed(5);
    for _ in 0..100 {
        let (a, b) = isotropic_two_body(&parent, 0.938, 0.1396, &mut rng).expect("open");
        assert!((a + b).max_abs_diff(&parent) < 1e-12);
        assert!((a.m() - 0.938).abs() < 1e-6);
        assert!((b.m() - 0.1396).abs() < 1e-6);
    }
}
