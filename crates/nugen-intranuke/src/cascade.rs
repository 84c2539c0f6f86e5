//! Hadron transport through the nuclear medium.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use nugen_core::{
    pdg, EventFailure, EventFlag, EventRecord, EventRecordVisitor, LorentzVector, NugenError,
    ParticleStatus, RngHandle, ThreeVector,
};

use crate::config::CascadeConfig;
use crate::fates::{Rescatterer, ToyRescatterer};
use crate::hadron_xsec::{Fate, HadronNucleonXSec, TabulatedHadronXSec};
use crate::nucleus::NuclearModel;

/// 1 mb = 0.1 fm².
const MB_TO_FM2: f64 = 0.1;

/// Counters for one cascade run (or the sum over many).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CascadeSummary {
    /// Transport steps taken, including formation-zone and exit steps.
    pub steps: u64,
    /// Interactions per fate.
    pub interactions: BTreeMap<Fate, u64>,
    /// Hadrons released through the nuclear surface (or never transported).
    pub escaped: u64,
    /// Hadrons released below the kinetic energy threshold.
    pub below_threshold: u64,
    /// Entries added to records by interactions.
    pub produced: u64,
}

impl CascadeSummary {
    /// Adds another summary into this one.
    pub fn merge(&mut self, other: &CascadeSummary) {
        self.steps += other.steps;
        for (fate, n) in &other.interactions {
            *self.interactions.entry(*fate).or_default() += n;
        }
        self.escaped += other.escaped;
        self.below_threshold += other.below_threshold;
        self.produced += other.produced;
    }

    /// Total interactions over every fate.
    pub fn total_interactions(&self) -> u64 {
        self.interactions.values().sum()
    }
}

/// Intranuclear cascade stage.
///
/// Moves every `HadronInNucleus` entry through the nucleus in straight
/// steps of exponentially distributed length until it escapes, falls below
/// the kinetic threshold, or interacts and is replaced by its products.
#[derive(Debug)]
pub struct Intranuke {
    config: CascadeConfig,
    xsec: Arc<dyn HadronNucleonXSec>,
    rescatterer: Arc<dyn Rescatterer>,
    totals: Mutex<CascadeSummary>,
}

enum StepOutcome {
    Released,
    Moved,
    Interacted,
}

impl Intranuke {
    /// Cascade with the tabulated cross sections and toy fate kinematics.
    pub fn new(config: CascadeConfig) -> Self {
        Self::with_models(
            config,
            Arc::new(TabulatedHadronXSec::default()),
            Arc::new(ToyRescatterer),
        )
    }

    /// Cascade with explicit collaborators.
    pub fn with_models(
        config: CascadeConfig,
        xsec: Arc<dyn HadronNucleonXSec>,
        rescatterer: Arc<dyn Rescatterer>,
    ) -> Self {
        Self {
            config,
            xsec,
            rescatterer,
            totals: Mutex::new(CascadeSummary::default()),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Counters accumulated over every record processed as a pipeline stage.
    pub fn totals(&self) -> CascadeSummary {
        self.totals
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Transports every hadron in the record.
    ///
    /// On a free-nucleon target, or in transparent mode, hadrons are marked
    /// final without being moved.
    pub fn run_cascade(
        &self,
        record: &mut EventRecord,
        rng: &mut RngHandle,
    ) -> Result<CascadeSummary, NugenError> {
        let mut summary = CascadeSummary::default();
        let target = record
            .target_nucleus_index()
            .and_then(|idx| record.particle(idx))
            .map(|p| (pdg::ion_z(p.pdg), pdg::ion_a(p.pdg)));
        let Some((z, a)) = target.filter(|(_, a)| *a > 1) else {
            summary.escaped += release_all(record)?;
            return Ok(summary);
        };
        if self.config.transparent {
            summary.escaped += release_all(record)?;
            return Ok(summary);
        }

        let model = NuclearModel::new(a, &self.config);
        let proton_fraction = z as f64 / a as f64;
        let previous = record.vertex;
        let vertex = LorentzVector::from_parts(model.sample_vertex(self.config.vertex, rng), 0.0);
        record.vertex = vertex;
        // entries placed at the primary vertex move with it
        for idx in 0..record.len() {
            let Some(p) = record.particle_mut(idx) else {
                continue;
            };
            match p.status() {
                ParticleStatus::HadronInNucleus => {
                    p.x4 = vertex;
                    p.travelled = 0.0;
                    p.in_formation_zone = self.config.ct0 > 0.0;
                }
                ParticleStatus::Initial => {}
                _ if p.x4 == previous => p.x4 = vertex,
                _ => {}
            }
        }

        let mut produced = 0usize;
        while let Some((idx, _)) = record.find_particle_by_status(ParticleStatus::HadronInNucleus) {
            match self.step(record, idx, &model, proton_fraction, rng, &mut summary)? {
                StepOutcome::Interacted => {
                    produced = summary.produced as usize;
                    if produced > self.config.max_produced {
                        record.set_event_flag(EventFlag::CascadeExhausted);
                        return Err(EventFailure::cascade("cascade produced too many hadrons")
                            .with_attempts(produced)
                            .into());
                    }
                }
                StepOutcome::Moved | StepOutcome::Released => {}
            }
        }
        debug!(
            a,
            z,
            steps = summary.steps,
            interactions = summary.total_interactions(),
            produced,
            "cascade finished"
        );
        Ok(summary)
    }

    fn step(
        &self,
        record: &mut EventRecord,
        idx: usize,
        model: &NuclearModel,
        proton_fraction: f64,
        rng: &mut RngHandle,
        summary: &mut CascadeSummary,
    ) -> Result<StepOutcome, NugenError> {
        let Some(particle) = record.particle(idx) else {
            return Err(NugenError::record("missing-particle", "cascade index out of range"));
        };
        let hadron = particle.pdg;
        let p4 = particle.p4;
        let position = particle.x4.vect;
        let in_formation_zone = particle.in_formation_zone;
        let steps_taken = particle.rescatter_steps;
        let ke = particle.kinetic_energy();

        if !pdg::is_pion(hadron) && !pdg::is_nucleon(hadron) {
            record.set_status(idx, ParticleStatus::StableFinal)?;
            summary.escaped += 1;
            return Ok(StepOutcome::Released);
        }
        if ke < self.config.kinetic_threshold {
            record.set_status(idx, ParticleStatus::StableFinal)?;
            summary.below_threshold += 1;
            return Ok(StepOutcome::Released);
        }
        if steps_taken >= self.config.max_steps_per_hadron {
            warn!(idx, pdg = hadron, steps_taken, "hadron lineage hit the step ceiling");
            record.set_event_flag(EventFlag::CascadeExhausted);
            return Err(EventFailure::cascade(format!(
                "hadron {hadron} still inside the nucleus after {steps_taken} steps"
            ))
            .with_attempts(steps_taken as usize)
            .into());
        }

        let direction = p4.vect.unit();
        // path length to elapsed time at velocity p/E
        let time_per_fm = if p4.p() > 0.0 { p4.e() / p4.p() } else { 1.0 };
        let exit = distance_to_surface(&position, &direction, model.escape_radius());
        let (length, interacts) = if in_formation_zone {
            let m = p4.m();
            let length = if m > 0.0 {
                self.config.ct0 * self.config.formation_k * p4.p() / m
            } else {
                0.0
            };
            (length, false)
        } else {
            let inv_lambda =
                model.density(position.mag()) * self.xsec.total(hadron, ke) * MB_TO_FM2;
            if inv_lambda > 0.0 {
                (-rng.uniform_open().ln() / inv_lambda, true)
            } else {
                (f64::INFINITY, false)
            }
        };
        summary.steps += 1;

        if length >= exit {
            if let Some(p) = record.particle_mut(idx) {
                p.x4 = LorentzVector::from_parts(
                    position + direction * exit,
                    p.x4.t + exit * time_per_fm,
                );
                p.travelled += exit;
                p.in_formation_zone = false;
                p.rescatter_steps += 1;
            }
            record.set_status(idx, ParticleStatus::StableFinal)?;
            summary.escaped += 1;
            return Ok(StepOutcome::Released);
        }

        let landed = position + direction * length;
        let x4 = match record.particle_mut(idx) {
            Some(p) => {
                p.x4 = LorentzVector::from_parts(landed, p.x4.t + length * time_per_fm);
                p.travelled += length;
                p.in_formation_zone = false;
                p.rescatter_steps += 1;
                p.x4
            }
            None => return Err(NugenError::record("missing-particle", "cascade index out of range")),
        };
        if !interacts {
            return Ok(StepOutcome::Moved);
        }

        let weights = self.xsec.fate_weights(hadron, ke);
        for _ in 0..self.config.max_fate_attempts {
            let Some(fate) = weights.sample(rng.uniform()) else {
                break;
            };
            let Some(products) = self
                .rescatterer
                .outcome(fate, hadron, &p4, proton_fraction, rng)
            else {
                continue;
            };
            record.set_status(idx, ParticleStatus::Rescattered)?;
            for product in &products {
                let child = record.append_particle(
                    product.pdg,
                    ParticleStatus::HadronInNucleus,
                    Some(idx),
                    product.p4,
                    x4,
                )?;
                if let Some(p) = record.particle_mut(child) {
                    p.rescatter_steps = steps_taken + 1;
                }
            }
            *summary.interactions.entry(fate).or_default() += 1;
            summary.produced += products.len() as u64;
            return Ok(StepOutcome::Interacted);
        }

        record.set_event_flag(EventFlag::CascadeExhausted);
        Err(EventFailure::cascade(format!(
            "no permitted fate for hadron {hadron} at kinetic energy {ke:.4} GeV"
        ))
        .with_attempts(self.config.max_fate_attempts)
        .into())
    }
}

impl EventRecordVisitor for Intranuke {
    fn name(&self) -> &str {
        "intranuke"
    }

    fn process(&self, record: &mut EventRecord, rng: &mut RngHandle) -> Result<(), NugenError> {
        let summary = self.run_cascade(record, rng)?;
        if let Ok(mut totals) = self.totals.lock() {
            totals.merge(&summary);
        }
        Ok(())
    }
}

fn release_all(record: &mut EventRecord) -> Result<u64, NugenError> {
    let pending = record.indices_with_status(ParticleStatus::HadronInNucleus);
    for idx in &pending {
        record.set_status(*idx, ParticleStatus::StableFinal)?;
    }
    Ok(pending.len() as u64)
}

/// Path length from `position` along unit vector `direction` to the sphere
/// of radius `radius`; zero when already outside.
fn distance_to_surface(position: &ThreeVector, direction: &ThreeVector, radius: f64) -> f64 {
    let b = position.dot(direction);
    let c = position.mag2() - radius * radius;
    if c >= 0.0 {
        return 0.0;
    }
    -b + (b * b - c).sqrt()
}
