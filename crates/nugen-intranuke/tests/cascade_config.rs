use nugen_intranuke::{CascadeConfig, DensityProfile, NuclearModel, VertexMode};
use nugen_core::RngHandle;

#[test]
fn yaml_defaults_fill_missing_fields() {
    let config: CascadeConfig = serde_yaml::from_str("density: uniform\nct0: 0.5\n").expect("parse");
    assert_eq!(config.density, DensityProfile::Uniform);
    assert_eq!(config.ct0, 0.5);
    assert_eq!(config.r0, CascadeConfig::default().r0);
    assert_eq!(config.vertex, VertexMode::Random);
    assert!(!config.transparent);
}

#[test]
fn woods_saxon_density_integrates_to_mass_number() {
    let config = CascadeConfig::default();
    let model = NuclearModel::new(40, &config);
    let integral = nugen_xsec::GridIntegrator::default().integrate(
        |r| 4.0 * std::f64::consts::PI * r * r * model.density(r),
        0.0,
        model.escape_radius(),
    );
    assert!((integral - 40.0).abs() < 0.05, "integral {integral}");
    assert!(model.escape_radius() > model.radius());
}

#[test]
fn sampled_vertices_stay_inside() {
    let model = NuclearModel::new(56, &CascadeConfig::default());
    let mut rng = RngHandle::from_seed(8);
    for _ in 0..500 {
        let v = model.sample_vertex(VertexMode::Random, &mut rng);
        assert!(v.mag() <= model.escape_radius() + 1e-12);
    }
}
