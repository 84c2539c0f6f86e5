//! Name-to-factory registry for cross-section models.

use std::collections::BTreeMap;
use std::sync::Arc;

use nugen_core::{AlgConfig, ErrorInfo, NugenError, XSecModel};
use tracing::debug;

use crate::models::{
    CohReinSehgalToy, DisScaling, KovalenkoQelCharm, MecGaussian, NuElastic, QelDipole,
    ResBreitWigner,
};

/// Factory building a model from its configuration. The catalogue is passed
/// so factories can resolve their own sub-algorithms.
pub type XSecFactory =
    fn(&AlgConfig, &XSecCatalogue) -> Result<Arc<dyn XSecModel>, NugenError>;

/// Registry of cross-section model factories.
#[derive(Clone)]
pub struct XSecCatalogue {
    factories: BTreeMap<String, XSecFactory>,
}

impl std::fmt::Debug for XSecCatalogue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XSecCatalogue")
            .field("models", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for XSecCatalogue {
    fn default() -> Self {
        Self::builtin()
    }
}

impl XSecCatalogue {
    /// Empty catalogue.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Catalogue holding every built-in model.
    pub fn builtin() -> Self {
        let mut catalogue = Self::empty();
        catalogue.register(QelDipole::NAME, |config, _| {
            Ok(Arc::new(QelDipole::from_config(config)?))
        });
        catalogue.register(NuElastic::NAME, |config, _| {
            Ok(Arc::new(NuElastic::from_config(config)?))
        });
        catalogue.register(DisScaling::NAME, |config, _| {
            Ok(Arc::new(DisScaling::from_config(config)?))
        });
        catalogue.register(ResBreitWigner::NAME, |config, _| {
            Ok(Arc::new(ResBreitWigner::from_config(config)?))
        });
        catalogue.register(CohReinSehgalToy::NAME, |config, _| {
            Ok(Arc::new(CohReinSehgalToy::from_config(config)?))
        });
        catalogue.register(KovalenkoQelCharm::NAME, |config, _| {
            Ok(Arc::new(KovalenkoQelCharm::from_config(config)?))
        });
        catalogue.register(MecGaussian::NAME, |config, catalogue| {
            let ccqe_name = config.sub_algorithm("ccqe-xsec")?;
            let ccqe = catalogue.build(ccqe_name, &AlgConfig::default())?;
            Ok(Arc::new(MecGaussian::new(config, ccqe)?))
        });
        catalogue
    }

    /// Registers (or replaces) a factory.
    pub fn register(&mut self, name: impl Into<String>, factory: XSecFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Registered model names.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }

    /// Builds a model; unknown names are configuration errors.
    pub fn build(&self, name: &str, config: &AlgConfig) -> Result<Arc<dyn XSecModel>, NugenError> {
        let factory = self.factories.get(name).ok_or_else(|| {
            NugenError::Config(
                ErrorInfo::new("unknown-xsec-model", "cross-section model is not registered")
                    .with_context("name", name)
                    .with_hint(format!(
                        "available: {}",
                        self.names().collect::<Vec<_>>().join(", ")
                    )),
            )
        })?;
        debug!(model = name, "building cross-section model");
        factory(config, self)
    }
}
