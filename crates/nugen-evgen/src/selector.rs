//! Interaction list generation and cross-section weighted selection.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use nugen_core::{
    pdg, ErrorInfo, Interaction, NugenError, RngHandle, ScatteringType, Target, XSecFingerprint,
    XSecModel,
};

use crate::config::ChannelConfig;

const CHARM_BARYONS: [i32; 3] = [pdg::LAMBDA_C_PLUS, pdg::SIGMA_C_PLUS, pdg::SIGMA_C_PLUSPLUS];

fn hit_nucleons(target: &Target) -> Vec<i32> {
    if target.is_free_nucleon() {
        return target.hit_nucleon.into_iter().collect();
    }
    let mut hits = Vec::new();
    if target.z > 0 {
        hits.push(pdg::PROTON);
    }
    if target.n() > 0 {
        hits.push(pdg::NEUTRON);
    }
    hits
}

fn hit_clusters(target: &Target) -> Vec<i32> {
    let (z, n) = (target.z, target.n());
    let mut clusters = Vec::new();
    if n >= 2 {
        clusters.push(pdg::CLUSTER_NN);
    }
    if z >= 1 && n >= 1 {
        clusters.push(pdg::CLUSTER_NP);
    }
    if z >= 2 {
        clusters.push(pdg::CLUSTER_PP);
    }
    clusters
}

/// Every concrete interaction a channel contributes for this probe and
/// target, before filtering by the channel's model.
pub fn enumerate_interactions(
    probe: i32,
    target: &Target,
    energy: f64,
    channel: &ChannelConfig,
) -> Vec<Interaction> {
    let on_nucleon = |hit: i32| {
        if target.is_free_nucleon() {
            *target
        } else {
            target.with_hit_nucleon(hit)
        }
    };
    let mut out = Vec::new();
    match channel.process {
        ScatteringType::QuasiElastic => {
            for hit in hit_nucleons(target) {
                if channel.cc {
                    out.push(Interaction::qel_cc(probe, on_nucleon(hit), energy));
                }
                if channel.nc {
                    out.push(Interaction::qel_nc(probe, on_nucleon(hit), energy));
                }
            }
            out.retain(|i| i.recoil_nucleon_pdg().is_some());
        }
        ScatteringType::DeepInelastic => {
            for hit in hit_nucleons(target) {
                if channel.cc {
                    out.push(Interaction::dis_cc(probe, on_nucleon(hit), energy));
                }
                if channel.nc {
                    out.push(Interaction::dis_nc(probe, on_nucleon(hit), energy));
                }
            }
        }
        ScatteringType::Resonant => {
            for hit in hit_nucleons(target) {
                if channel.cc {
                    out.push(Interaction::res_cc(probe, on_nucleon(hit), energy));
                }
                if channel.nc {
                    out.push(Interaction::res_nc(probe, on_nucleon(hit), energy));
                }
            }
            out.retain(|i| pdg::delta_with_charge(i.hadronic_charge()).is_some());
        }
        ScatteringType::Coherent => {
            if target.is_nucleus() {
                let nucleus = Target::nucleus(target.z, target.a);
                if channel.cc {
                    out.push(Interaction::coh_cc(probe, nucleus, energy));
                }
                if channel.nc {
                    out.push(Interaction::coh_nc(probe, nucleus, energy));
                }
            }
        }
        ScatteringType::MesonExchange => {
            if channel.cc && target.is_nucleus() {
                for cluster in hit_clusters(target) {
                    let interaction =
                        Interaction::mec_cc(probe, target.with_hit_cluster(cluster), energy);
                    if (0..=2).contains(&interaction.hadronic_charge()) {
                        out.push(interaction);
                    }
                }
            }
        }
        ScatteringType::QuasiElasticCharm => {
            if channel.cc && pdg::is_neutrino(probe) {
                for hit in hit_nucleons(target) {
                    for charm in CHARM_BARYONS {
                        let interaction =
                            Interaction::qel_charm(probe, on_nucleon(hit), energy, charm);
                        if pdg::charge(charm) == Some(interaction.hadronic_charge()) {
                            out.push(interaction);
                        }
                    }
                }
            }
        }
        ScatteringType::Elastic => {
            if channel.nc {
                for hit in hit_nucleons(target) {
                    out.push(Interaction::nu_elastic(probe, on_nucleon(hit), energy));
                }
            }
        }
    }
    out
}

/// Memoised integrated cross sections keyed by fingerprint and energy.
#[derive(Debug, Default)]
pub struct IntegralTable {
    values: RwLock<HashMap<(XSecFingerprint, u64), f64>>,
}

impl IntegralTable {
    /// Integral of `model` for `interaction`, computed at most once per
    /// fingerprint and energy.
    pub fn integral(
        &self,
        model: &dyn XSecModel,
        interaction: &Interaction,
    ) -> Result<f64, NugenError> {
        let key = (
            interaction.fingerprint(model.name()),
            interaction.energy().to_bits(),
        );
        if let Some(value) = self
            .values
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .get(&key)
        {
            return Ok(*value);
        }
        let value = model.integral(interaction)?;
        let value = if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        };
        self.values
            .write()
            .unwrap_or_else(|poison| poison.into_inner())
            .insert(key, value);
        Ok(value)
    }

    /// Number of memoised integrals.
    pub fn len(&self) -> usize {
        self.values
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .len()
    }

    /// True when nothing has been integrated yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One selectable interaction.
#[derive(Debug, Clone)]
pub struct InteractionCandidate {
    /// Interaction template with empty kinematics.
    pub interaction: Interaction,
    /// Channel the interaction belongs to.
    pub channel: ScatteringType,
    /// Integrated cross section at the probe energy.
    pub integral: f64,
}

/// Integrated cross section of one interaction, for summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelXSec {
    /// Canonical interaction code.
    pub code: String,
    /// Channel label.
    pub channel: String,
    /// Integrated cross section, 1e-38 cm².
    pub integral: f64,
}

/// Picks an interaction with probability proportional to its integral.
#[derive(Debug, Clone)]
pub struct InteractionSelector {
    candidates: Vec<InteractionCandidate>,
    total: f64,
}

impl InteractionSelector {
    /// Builds the list for every channel and integrates each entry.
    ///
    /// Fails when no interaction has a positive cross section.
    pub fn build(
        probe: i32,
        target: &Target,
        energy: f64,
        channels: &[(ChannelConfig, Arc<dyn XSecModel>)],
        integrals: &IntegralTable,
    ) -> Result<Self, NugenError> {
        let mut candidates = Vec::new();
        for (channel, model) in channels {
            for interaction in enumerate_interactions(probe, target, energy, channel) {
                if !model.valid_process(&interaction) {
                    continue;
                }
                let integral = integrals.integral(model.as_ref(), &interaction)?;
                info!(
                    interaction = %interaction,
                    model = model.name(),
                    integral,
                    "interaction integrated"
                );
                if integral > 0.0 {
                    candidates.push(InteractionCandidate {
                        interaction,
                        channel: channel.process,
                        integral,
                    });
                }
            }
        }
        let total: f64 = candidates.iter().map(|c| c.integral).sum();
        if candidates.is_empty() || !(total > 0.0) {
            return Err(NugenError::Config(
                ErrorInfo::new("no-open-channels", "no enabled interaction has a positive cross section")
                    .with_context("probe", probe)
                    .with_context("target", target.pdg())
                    .with_context("energy", energy)
                    .with_hint("raise the probe energy or enable more channels"),
            ));
        }
        Ok(Self { candidates, total })
    }

    /// Selectable interactions.
    pub fn candidates(&self) -> &[InteractionCandidate] {
        &self.candidates
    }

    /// Sum of the integrals.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Draws one candidate.
    pub fn select(&self, rng: &mut RngHandle) -> &InteractionCandidate {
        let target = rng.uniform() * self.total;
        let mut acc = 0.0;
        for candidate in &self.candidates {
            acc += candidate.integral;
            if target < acc {
                return candidate;
            }
        }
        // rounding can leave target just above the final sum
        &self.candidates[self.candidates.len() - 1]
    }

    /// Integrals for summaries.
    pub fn channel_xsecs(&self) -> Vec<ChannelXSec> {
        self.candidates
            .iter()
            .map(|c| ChannelXSec {
                code: c.interaction.as_code(),
                channel: c.channel.as_str().to_string(),
                integral: c.integral,
            })
            .collect()
    }
}
