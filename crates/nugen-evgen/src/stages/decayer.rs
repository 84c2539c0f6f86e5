use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use nugen_core::{
    DecayModel, EventFailure, EventFlag, EventRecord, EventRecordVisitor, NugenError,
    ParticleStatus, RngHandle,
};

/// Upper bound on decays per event; decay chains are short.
const MAX_DECAYS: usize = 1000;

/// Decays unstable final-state particles until none remain.
///
/// Products of a decay are themselves eligible, so chains such as
/// `Σc → Λc π → p K π γ γ` resolve in a single pass over the growing record.
#[derive(Debug, Clone)]
pub struct UnstableParticleDecayer {
    model: Arc<dyn DecayModel>,
    unstable: BTreeSet<i32>,
}

impl UnstableParticleDecayer {
    /// Decayer for the listed species.
    pub fn new(model: Arc<dyn DecayModel>, unstable: impl IntoIterator<Item = i32>) -> Self {
        Self {
            model,
            unstable: unstable.into_iter().collect(),
        }
    }

    /// Whether `pdg` is decayed by this stage.
    pub fn is_unstable(&self, pdg: i32) -> bool {
        self.unstable.contains(&pdg) && self.model.handles(pdg)
    }
}

impl EventRecordVisitor for UnstableParticleDecayer {
    fn name(&self) -> &str {
        "decayer"
    }

    fn process(&self, record: &mut EventRecord, rng: &mut RngHandle) -> Result<(), NugenError> {
        let mut idx = 0;
        let mut decays = 0;
        while idx < record.len() {
            let Some(particle) = record.particle(idx) else {
                break;
            };
            if particle.status() != ParticleStatus::StableFinal || !self.is_unstable(particle.pdg) {
                idx += 1;
                continue;
            }
            let (pdg, p4, x4) = (particle.pdg, particle.p4, particle.x4);
            if decays >= MAX_DECAYS {
                warn!(decays, "decay ceiling reached, leaving remaining particles undecayed");
                break;
            }
            let Some(products) = self.model.decay(pdg, &p4, rng) else {
                record.set_event_flag(EventFlag::DecayFailure);
                return Err(EventFailure::decay(format!(
                    "{} has no open channel for {pdg}",
                    self.model.name()
                ))
                .into());
            };
            debug!(pdg, products = products.len(), "decayed");
            record.set_status(idx, ParticleStatus::Decayed)?;
            for product in products {
                record.append_particle(
                    product.pdg,
                    ParticleStatus::StableFinal,
                    Some(idx),
                    product.p4,
                    x4,
                )?;
            }
            decays += 1;
            idx += 1;
        }
        Ok(())
    }
}
