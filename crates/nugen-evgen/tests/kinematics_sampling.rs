use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use nugen_core::{
    pdg, AlgConfig, FailureKind, Interaction, KinePhaseSpace, KineVar, NugenError, RngHandle,
    Target, XSecModel,
};
use nugen_evgen::{KineFamily, KinematicsGenerator, MaxXSecCache};
use nugen_xsec::{q2_range, q2_range_at_w, y_range_at_x, DisScaling, QelDipole, ResBreitWigner};
use proptest::prelude::*;

/// dσ/dQ² = Q², a triangle on the allowed range.
#[derive(Debug)]
struct Triangle;

impl XSecModel for Triangle {
    fn name(&self) -> &str {
        "triangle"
    }

    fn native_phase_space(&self) -> KinePhaseSpace {
        KinePhaseSpace::Q2
    }

    fn native_xsec(&self, interaction: &Interaction) -> f64 {
        interaction.kine().get_or(KineVar::Q2, 0.0)
    }

    fn integral(&self, _interaction: &Interaction) -> Result<f64, NugenError> {
        Ok(1.0)
    }

    fn valid_process(&self, _interaction: &Interaction) -> bool {
        true
    }
}

/// Always zero; counts how often it is asked.
#[derive(Debug, Default)]
struct CountingZero {
    calls: AtomicUsize,
}

impl XSecModel for CountingZero {
    fn name(&self) -> &str {
        "counting-zero"
    }

    fn native_phase_space(&self) -> KinePhaseSpace {
        KinePhaseSpace::Q2
    }

    fn native_xsec(&self, _interaction: &Interaction) -> f64 {
        self.calls.fetch_add(1, Ordering::Relaxed);
        0.0
    }

    fn integral(&self, _interaction: &Interaction) -> Result<f64, NugenError> {
        Ok(1.0)
    }

    fn valid_process(&self, _interaction: &Interaction) -> bool {
        true
    }
}

fn nc_on_proton(energy: f64) -> Interaction {
    Interaction::qel_nc(pdg::NU_MU, Target::free_nucleon(pdg::PROTON), energy)
}

#[test]
fn acceptance_rate_matches_envelope_for_triangle() {
    let cache = Arc::new(MaxXSecCache::default());
    let generator = KinematicsGenerator::new(Arc::new(Triangle), cache, KineFamily::Q2, 1.25, 1000);
    let mut rng = RngHandle::from_seed(17);
    let template = nc_on_proton(1.0);
    assert_eq!(q2_range(&template).min, 0.0);
    for _ in 0..20_000 {
        let mut interaction = template.clone();
        generator.generate(&mut interaction, &mut rng).unwrap();
    }
    let stats = generator.counters().snapshot();
    assert_eq!(stats.accepted, 20_000);
    assert_eq!(stats.exhausted, 0);
    let rate = stats.acceptance_rate();
    assert!((rate - 0.4).abs() < 0.02, "acceptance rate {rate}");
}

#[test]
fn triangle_samples_follow_the_density() {
    let cache = Arc::new(MaxXSecCache::default());
    let generator = KinematicsGenerator::new(Arc::new(Triangle), cache, KineFamily::Q2, 1.25, 1000);
    let mut rng = RngHandle::from_seed(3);
    let template = nc_on_proton(1.0);
    let q2_max = q2_range(&template).max;
    let n = 10_000;
    let mut sum = 0.0;
    for _ in 0..n {
        let mut interaction = template.clone();
        generator.generate(&mut interaction, &mut rng).unwrap();
        sum += interaction.kine().selected(KineVar::Q2).unwrap();
    }
    // mean of a triangle on [0, max] is 2/3 max
    let mean = sum / n as f64;
    assert!((mean / q2_max - 2.0 / 3.0).abs() < 0.02, "mean {mean} of {q2_max}");
}

#[test]
fn zero_model_exhausts_after_exactly_max_trials() {
    let model = Arc::new(CountingZero::default());
    let cache = Arc::new(MaxXSecCache::default());
    let mut interaction = nc_on_proton(1.0);
    let fingerprint = interaction.fingerprint(KineFamily::Q2.as_str());
    cache.observe(fingerprint, 1.0, 1.0);
    let generator = KinematicsGenerator::new(
        Arc::clone(&model) as Arc<dyn XSecModel>,
        cache,
        KineFamily::Q2,
        1.25,
        50,
    );
    let mut rng = RngHandle::from_seed(1);
    let err = generator.generate(&mut interaction, &mut rng).unwrap_err();
    let failure = err.failure().expect("recoverable failure");
    assert_eq!(failure.kind, FailureKind::NoAvailablePhaseSpace);
    assert_eq!(failure.attempts, Some(50));
    assert_eq!(model.calls.load(Ordering::Relaxed), 50);
    assert_eq!(generator.counters().snapshot().exhausted, 1);
    assert!(interaction.kine().selected(KineVar::Q2).is_none());
}

#[test]
fn accepted_kinematics_clear_running_values() {
    let cache = Arc::new(MaxXSecCache::default());
    let generator = KinematicsGenerator::new(Arc::new(Triangle), cache, KineFamily::Q2, 1.25, 1000);
    let mut rng = RngHandle::from_seed(5);
    let mut interaction = nc_on_proton(2.0);
    generator.generate(&mut interaction, &mut rng).unwrap();
    assert!(interaction.kine().get(KineVar::Q2).is_none());
    assert!(interaction.kine().selected(KineVar::Q2).is_some());
    assert!(interaction.kine().selected(KineVar::W).is_some());
}

#[test]
fn cache_miss_populates_a_positive_maximum() {
    let cache = Arc::new(MaxXSecCache::default());
    let generator = KinematicsGenerator::new(
        Arc::new(Triangle),
        Arc::clone(&cache),
        KineFamily::Q2,
        1.25,
        1000,
    );
    let mut rng = RngHandle::from_seed(8);
    let mut interaction = nc_on_proton(1.0);
    let fingerprint = interaction.fingerprint(KineFamily::Q2.as_str());
    assert!(cache.peek(fingerprint).is_none());
    generator.generate(&mut interaction, &mut rng).unwrap();
    let max = cache.peek(fingerprint).unwrap();
    let q2_max = q2_range(&nc_on_proton(1.0)).max;
    assert!(max > 0.0 && max <= q2_max * (1.0 + 1e-9));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn accepted_q2_lies_in_closed_form_range(energy in 0.4f64..5.0, seed in any::<u64>()) {
        let model = Arc::new(QelDipole::from_config(&AlgConfig::default()).unwrap());
        let generator = KinematicsGenerator::new(
            model,
            Arc::new(MaxXSecCache::default()),
            KineFamily::Q2,
            1.25,
            1000,
        );
        let template = Interaction::qel_cc(pdg::NU_MU, Target::free_nucleon(pdg::NEUTRON), energy);
        let range = q2_range(&template);
        let mut rng = RngHandle::from_seed(seed);
        for _ in 0..20 {
            let mut interaction = template.clone();
            generator.generate(&mut interaction, &mut rng).unwrap();
            let q2 = interaction.kine().selected(KineVar::Q2).unwrap();
            prop_assert!(range.contains(q2), "Q2 {} outside [{}, {}]", q2, range.min, range.max);
        }
    }

    #[test]
    fn accepted_xy_lies_in_closed_form_region(energy in 3.0f64..20.0, seed in any::<u64>()) {
        let model = Arc::new(DisScaling::from_config(&AlgConfig::default()).unwrap());
        let generator = KinematicsGenerator::new(
            model,
            Arc::new(MaxXSecCache::default()),
            KineFamily::XY,
            1.25,
            100_000,
        );
        let template = Interaction::dis_cc(pdg::NU_MU, Target::free_nucleon(pdg::PROTON), energy);
        let w_min = template.min_hadronic_mass();
        let mut rng = RngHandle::from_seed(seed);
        for _ in 0..10 {
            let mut interaction = template.clone();
            generator.generate(&mut interaction, &mut rng).unwrap();
            let kine = interaction.kine();
            let x = kine.selected(KineVar::X).unwrap();
            let y = kine.selected(KineVar::Y).unwrap();
            let w = kine.selected(KineVar::W).unwrap();
            let ys = y_range_at_x(&template, x, w_min);
            prop_assert!(ys.contains(y), "y {} outside [{}, {}] at x {}", y, ys.min, ys.max, x);
            prop_assert!(w >= w_min * (1.0 - 1e-9), "W {} below {}", w, w_min);
        }
    }

    #[test]
    fn accepted_w_q2_lies_in_closed_form_region(energy in 1.0f64..5.0, seed in any::<u64>()) {
        let model = Arc::new(ResBreitWigner::from_config(&AlgConfig::default()).unwrap());
        let generator = KinematicsGenerator::new(
            model,
            Arc::new(MaxXSecCache::default()),
            KineFamily::WQ2,
            1.25,
            100_000,
        );
        let template = Interaction::res_cc(pdg::NU_MU, Target::free_nucleon(pdg::PROTON), energy);
        let w_min = template.min_hadronic_mass();
        let mut rng = RngHandle::from_seed(seed);
        for _ in 0..10 {
            let mut interaction = template.clone();
            generator.generate(&mut interaction, &mut rng).unwrap();
            let w = interaction.kine().selected(KineVar::W).unwrap();
            let q2 = interaction.kine().selected(KineVar::Q2).unwrap();
            let qs = q2_range_at_w(&template, w);
            prop_assert!(w >= w_min * (1.0 - 1e-9), "W {} below {}", w, w_min);
            prop_assert!(qs.contains(q2), "Q2 {} outside [{}, {}] at W {}", q2, qs.min, qs.max, w);
        }
    }

    #[test]
    fn cache_maximum_never_decreases(
        updates in proptest::collection::vec((0.1f64..10.0, -1.0f64..100.0), 1..40)
    ) {
        let cache = MaxXSecCache::new(0.05);
        let fingerprint = nc_on_proton(1.0).fingerprint("kine:q2");
        let mut previous = 0.0;
        for (i, (energy, value)) in updates.into_iter().enumerate() {
            let current = if i % 2 == 0 {
                cache.observe(fingerprint, energy, value);
                cache.peek(fingerprint).unwrap()
            } else {
                cache.get_or_compute_max(fingerprint, energy, |_| value)
            };
            prop_assert!(current >= previous);
            prop_assert!(current >= 0.0);
            previous = current;
        }
    }
}
