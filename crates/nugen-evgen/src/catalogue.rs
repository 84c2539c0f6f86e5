//! Registry of every swappable algorithm a run can name in its
//! configuration: cross-section models, hadronizers and decay models.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use nugen_core::{AlgConfig, DecayModel, ErrorInfo, Hadronizer, NugenError};
use nugen_xsec::XSecCatalogue;

use crate::decays::ToyDecayModel;
use crate::fragmentation::{CharmHadronizer, ToyHadronizer};

/// Factory for a hadronizer.
pub type HadronizerFactory = fn(&AlgConfig) -> Result<Arc<dyn Hadronizer>, NugenError>;
/// Factory for a decay model.
pub type DecayFactory = fn(&AlgConfig) -> Result<Arc<dyn DecayModel>, NugenError>;

/// Name-to-factory lookup for all algorithm families.
#[derive(Clone)]
pub struct AlgorithmCatalogue {
    /// Cross-section models.
    pub xsec: XSecCatalogue,
    hadronizers: BTreeMap<String, HadronizerFactory>,
    decayers: BTreeMap<String, DecayFactory>,
}

impl fmt::Debug for AlgorithmCatalogue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmCatalogue")
            .field("xsec", &self.xsec)
            .field("hadronizers", &self.hadronizers.keys().collect::<Vec<_>>())
            .field("decayers", &self.decayers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for AlgorithmCatalogue {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AlgorithmCatalogue {
    /// Catalogue with every built-in algorithm.
    pub fn builtin() -> Self {
        let mut catalogue = Self {
            xsec: XSecCatalogue::builtin(),
            hadronizers: BTreeMap::new(),
            decayers: BTreeMap::new(),
        };
        catalogue.register_hadronizer(ToyHadronizer::NAME, |config| {
            Ok(Arc::new(ToyHadronizer::from_config(config)?))
        });
        catalogue.register_hadronizer(CharmHadronizer::NAME, |config| {
            Ok(Arc::new(CharmHadronizer::from_config(config)?))
        });
        catalogue.register_decay_model(ToyDecayModel::NAME, |config| {
            Ok(Arc::new(ToyDecayModel::from_config(config)?))
        });
        catalogue
    }

    /// Registers (or replaces) a hadronizer factory.
    pub fn register_hadronizer(&mut self, name: impl Into<String>, factory: HadronizerFactory) {
        self.hadronizers.insert(name.into(), factory);
    }

    /// Registers (or replaces) a decay model factory.
    pub fn register_decay_model(&mut self, name: impl Into<String>, factory: DecayFactory) {
        self.decayers.insert(name.into(), factory);
    }

    /// Registered hadronizer names.
    pub fn hadronizer_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.hadronizers.keys().map(String::as_str)
    }

    /// Registered decay model names.
    pub fn decay_model_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.decayers.keys().map(String::as_str)
    }

    /// Builds a hadronizer by name.
    pub fn build_hadronizer(
        &self,
        name: &str,
        config: &AlgConfig,
    ) -> Result<Arc<dyn Hadronizer>, NugenError> {
        let factory = self
            .hadronizers
            .get(name)
            .ok_or_else(|| unknown("unknown-hadronizer", name, self.hadronizer_names()))?;
        debug!(hadronizer = name, "building hadronizer");
        factory(config)
    }

    /// Builds a decay model by name.
    pub fn build_decay_model(
        &self,
        name: &str,
        config: &AlgConfig,
    ) -> Result<Arc<dyn DecayModel>, NugenError> {
        let factory = self
            .decayers
            .get(name)
            .ok_or_else(|| unknown("unknown-decay-model", name, self.decay_model_names()))?;
        debug!(decay_model = name, "building decay model");
        factory(config)
    }
}

fn unknown<'a>(code: &str, name: &str, available: impl Iterator<Item = &'a str>) -> NugenError {
    NugenError::Config(
        ErrorInfo::new(code, "algorithm is not registered")
            .with_context("name", name)
            .with_hint(format!("available: {}", available.collect::<Vec<_>>().join(", "))),
    )
}
