//! Default decay table for unstable final-state particles.

use std::collections::BTreeMap;

use nugen_core::{pdg, AlgConfig, DecayModel, FinalStateParticle, LorentzVector, NugenError, RngHandle};

use crate::fragmentation::split_sequential;

fn conjugate(code: i32) -> i32 {
    match code {
        pdg::PI0 | pdg::PHOTON => code,
        other => -other,
    }
}

/// One dominant channel per species, phase-space distributed.
#[derive(Debug, Clone, PartialEq)]
pub struct ToyDecayModel {
    channels: BTreeMap<i32, Vec<i32>>,
}

impl Default for ToyDecayModel {
    fn default() -> Self {
        let channels = [
            (pdg::PI0, vec![pdg::PHOTON, pdg::PHOTON]),
            (pdg::D0, vec![pdg::K_MINUS, pdg::PI_PLUS]),
            (pdg::D_PLUS, vec![pdg::K_MINUS, pdg::PI_PLUS, pdg::PI_PLUS]),
            (pdg::DS_PLUS, vec![pdg::K_PLUS, pdg::K_MINUS, pdg::PI_PLUS]),
            (pdg::LAMBDA_C_PLUS, vec![pdg::PROTON, pdg::K_MINUS, pdg::PI_PLUS]),
            (pdg::SIGMA_C_PLUS, vec![pdg::LAMBDA_C_PLUS, pdg::PI0]),
            (pdg::SIGMA_C_PLUSPLUS, vec![pdg::LAMBDA_C_PLUS, pdg::PI_PLUS]),
            (pdg::DELTA_PLUSPLUS, vec![pdg::PROTON, pdg::PI_PLUS]),
            (pdg::DELTA_PLUS, vec![pdg::PROTON, pdg::PI0]),
            (pdg::DELTA_0, vec![pdg::NEUTRON, pdg::PI0]),
            (pdg::DELTA_MINUS, vec![pdg::NEUTRON, pdg::PI_MINUS]),
        ]
        .into_iter()
        .collect();
        Self { channels }
    }
}

impl ToyDecayModel {
    /// Catalogue name.
    pub const NAME: &'static str = "toy-decays";

    /// The toy table takes no parameters.
    pub fn from_config(_config: &AlgConfig) -> Result<Self, NugenError> {
        Ok(Self::default())
    }

    fn products(&self, code: i32) -> Option<Vec<i32>> {
        if let Some(products) = self.channels.get(&code) {
            return Some(products.clone());
        }
        self.channels
            .get(&conjugate(code))
            .filter(|_| conjugate(code) != code)
            .map(|products| products.iter().map(|p| conjugate(*p)).collect())
    }
}

impl DecayModel for ToyDecayModel {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn handles(&self, code: i32) -> bool {
        self.products(code).is_some()
    }

    fn decay(
        &self,
        code: i32,
        p4: &LorentzVector,
        rng: &mut RngHandle,
    ) -> Option<Vec<FinalStateParticle>> {
        let species = self.products(code)?;
        split_sequential(p4, &species, rng)
    }
}
