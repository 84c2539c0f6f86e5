//! Numerics, phase-space limits and the cross-section model catalogue.

pub mod catalogue;
pub mod models;
pub mod numerics;
pub mod phase_space;

pub use catalogue::{XSecCatalogue, XSecFactory};
pub use models::{
    integrate_native, CohReinSehgalToy, DisScaling, KovalenkoQelCharm, MecGaussian, NuElastic,
    QelDipole, ResBreitWigner,
};
pub use numerics::{FunctionMap, GridIntegrator, IntegrationRule, MaxPoint, MaxSearch, UnifGrid};
pub use phase_space::{
    q2_range, q2_range_at_w, set_q2_point, set_wq2_point, set_xy_point, w_range, wq2_allowed,
    x_range, xy_allowed, y_range_at_x, Range1D,
};
