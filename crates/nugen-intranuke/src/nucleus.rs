//! Nuclear size and density model.

use std::f64::consts::PI;

use nugen_core::{RngHandle, ThreeVector};
use nugen_xsec::{GridIntegrator, IntegrationRule};

use crate::config::{CascadeConfig, DensityProfile, VertexMode};

/// Radius, density and escape surface of one nucleus.
#[derive(Debug, Clone, PartialEq)]
pub struct NuclearModel {
    a: u32,
    radius: f64,
    diffuseness: f64,
    escape_radius: f64,
    profile: DensityProfile,
    central_density: f64,
}

impl NuclearModel {
    /// Builds the model for a nucleus with `a` nucleons.
    pub fn new(a: u32, config: &CascadeConfig) -> Self {
        let radius = config.r0 * (a.max(1) as f64).cbrt();
        let diffuseness = config.diffuseness.max(0.0);
        let escape_radius = match config.density {
            DensityProfile::Uniform => radius,
            DensityProfile::WoodsSaxon => radius + config.n_diffuse * diffuseness,
        };
        let mut model = Self {
            a,
            radius,
            diffuseness,
            escape_radius,
            profile: config.density,
            central_density: 1.0,
        };
        let volume = match model.profile {
            DensityProfile::Uniform => 4.0 / 3.0 * PI * radius.powi(3),
            DensityProfile::WoodsSaxon => GridIntegrator::new(IntegrationRule::Simpson, 401)
                .integrate(
                    |r| 4.0 * PI * r * r * model.shape(r),
                    0.0,
                    model.escape_radius,
                ),
        };
        model.central_density = if volume > 0.0 { a as f64 / volume } else { 0.0 };
        model
    }

    fn shape(&self, r: f64) -> f64 {
        match self.profile {
            DensityProfile::Uniform => {
                if r <= self.radius {
                    1.0
                } else {
                    0.0
                }
            }
            DensityProfile::WoodsSaxon => {
                if self.diffuseness > 0.0 {
                    1.0 / (1.0 + ((r - self.radius) / self.diffuseness).exp())
                } else if r <= self.radius {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Mass number.
    pub fn a(&self) -> u32 {
        self.a
    }

    /// Nuclear radius `R`, fm.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Radius beyond which a hadron has escaped, fm.
    pub fn escape_radius(&self) -> f64 {
        self.escape_radius
    }

    /// Nucleon density at radius `r`, fm⁻³. The profile integrates to A
    /// inside the escape radius.
    pub fn density(&self, r: f64) -> f64 {
        if r > self.escape_radius {
            return 0.0;
        }
        self.central_density * self.shape(r)
    }

    /// Primary vertex position.
    pub fn sample_vertex(&self, mode: VertexMode, rng: &mut RngHandle) -> ThreeVector {
        match mode {
            VertexMode::Center => ThreeVector::zero(),
            VertexMode::Random => {
                // r² ρ(r) is bounded by R_esc² ρ0
                let bound = self.escape_radius * self.escape_radius;
                let r = loop {
                    let r = self.escape_radius * rng.uniform();
                    if rng.uniform() * bound <= r * r * self.shape(r) {
                        break r;
                    }
                };
                let cos_theta = rng.uniform_in(-1.0, 1.0);
                let phi = rng.uniform_in(0.0, 2.0 * PI);
                ThreeVector::from_spherical(r, cos_theta, phi)
            }
        }
    }
}
