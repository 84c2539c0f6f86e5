#![doc = "Intranuclear hadron transport for nuclear-target events."]

pub mod cascade;
pub mod config;
pub mod fates;
pub mod hadron_xsec;
pub mod nucleus;

pub use cascade::{CascadeSummary, Intranuke};
pub use config::{CascadeConfig, DensityProfile, VertexMode};
pub use fates::{Rescatterer, ToyRescatterer};
pub use hadron_xsec::{Fate, FateWeights, HadronNucleonXSec, Table, TabulatedHadronXSec};
pub use nucleus::NuclearModel;
