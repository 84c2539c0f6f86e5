use nugen_xsec::{FunctionMap, GridIntegrator, IntegrationRule, MaxSearch, UnifGrid};

#[test]
fn simpson_is_exact_for_cubics() {
    let integrator = GridIntegrator::new(IntegrationRule::Simpson, 11);
    let value = integrator.integrate(|x| x * x * x - 2.0 * x + 1.0, 0.0, 2.0);
    assert!((value - 2.0).abs() < 1e-12, "value = {value}");
}

#[test]
fn even_point_counts_fall_back_on_the_last_interval() {
    let integrator = GridIntegrator::new(IntegrationRule::Simpson, 200);
    let value = integrator.integrate(|x| x.sin(), 0.0, std::f64::consts::PI);
    assert!((value - 2.0).abs() < 1e-4, "value = {value}");
}

#[test]
fn degenerate_ranges_integrate_to_zero() {
    let integrator = GridIntegrator::default();
    assert_eq!(integrator.integrate(|_| 1.0, 1.0, 1.0), 0.0);
    assert_eq!(integrator.integrate(|_| 1.0, 2.0, 1.0), 0.0);
    assert_eq!(integrator.integrate(|_| 1.0, 0.0, f64::NAN), 0.0);
    let map = FunctionMap::sample(UnifGrid::new(3.0, 1.0, 5), |x| x);
    assert_eq!(integrator.integrate_map(&map), 0.0);
}

#[test]
fn non_finite_samples_are_zeroed() {
    let integrator = GridIntegrator::new(IntegrationRule::Trapezoid, 5);
    let value = integrator.integrate(|x| if x == 0.0 { f64::INFINITY } else { 1.0 }, 0.0, 1.0);
    assert!((value - 0.875).abs() < 1e-12);
}

#[test]
fn two_dimensional_integral_over_triangle() {
    let integrator = GridIntegrator::new(IntegrationRule::Simpson, 41);
    let area = integrator.integrate_2d(|_, _| 1.0, 0.0, 1.0, |x| (0.0, x));
    assert!((area - 0.5).abs() < 1e-9);
}

#[test]
fn maximisers_locate_smooth_peaks() {
    let search = MaxSearch::default();
    let best = search.maximize_1d(|x| (-(x - 0.37) * (x - 0.37) * 50.0).exp(), 0.0, 1.0);
    assert!((best.at[0] - 0.37).abs() < 1e-3);
    assert!((best.value - 1.0).abs() < 1e-5);

    let best = search.maximize_2d(
        |x, y| 3.0 - (x - 0.2).powi(2) - (y - 0.6).powi(2),
        0.0,
        1.0,
        |_| (0.0, 1.0),
    );
    assert!((best.value - 3.0).abs() < 1e-3);

    let nothing = search.maximize_1d(|_| -1.0, 0.0, 1.0);
    assert_eq!(nothing.value, 0.0);
}
