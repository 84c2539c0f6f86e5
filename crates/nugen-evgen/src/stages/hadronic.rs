use std::sync::Arc;

use tracing::debug;

use nugen_core::lorentz::isotropic_two_body;
use nugen_core::{
    pdg, ErrorInfo, EventFailure, EventFlag, EventRecord, EventRecordVisitor, FinalStateParticle,
    Hadronizer, Interaction, LorentzVector, NugenError, ParticleStatus, RngHandle,
    ScatteringType,
};

/// Builds the hadronic final state from four-momentum conservation at the
/// primary vertex and, for nuclear targets, the spectator remnant.
///
/// Exclusive channels are handled directly; inclusive ones go through the
/// configured [`Hadronizer`].
#[derive(Debug, Clone)]
pub struct HadronicSystemGenerator {
    process: ScatteringType,
    hadronizer: Option<Arc<dyn Hadronizer>>,
}

impl HadronicSystemGenerator {
    /// Generator for an exclusive channel.
    pub fn new(process: ScatteringType) -> Self {
        Self {
            process,
            hadronizer: None,
        }
    }

    /// Attaches the hadronizer used for inclusive channels.
    pub fn with_hadronizer(mut self, hadronizer: Arc<dyn Hadronizer>) -> Self {
        self.hadronizer = Some(hadronizer);
        self
    }

    /// Channel handled by this generator.
    pub fn process(&self) -> ScatteringType {
        self.process
    }

    fn products(
        &self,
        interaction: &Interaction,
        hadronic: &LorentzVector,
        rng: &mut RngHandle,
    ) -> Result<Products, NugenError> {
        let charge = interaction.hadronic_charge();
        match self.process {
            ScatteringType::QuasiElastic
            | ScatteringType::QuasiElasticCharm
            | ScatteringType::Elastic => {
                let Some(recoil) = interaction.recoil_nucleon_pdg() else {
                    return Err(no_species(interaction, charge));
                };
                Ok(Products::direct(vec![FinalStateParticle {
                    pdg: recoil,
                    p4: *hadronic,
                }]))
            }
            ScatteringType::Resonant => {
                let Some(delta) = pdg::delta_with_charge(charge) else {
                    return Err(no_species(interaction, charge));
                };
                let (nucleon, pion) = delta_decay_species(charge, rng)
                    .ok_or_else(|| no_species(interaction, charge))?;
                let pair = two_body(hadronic, nucleon, pion, rng)?;
                Ok(Products {
                    intermediate: Some(FinalStateParticle {
                        pdg: delta,
                        p4: *hadronic,
                    }),
                    particles: pair,
                })
            }
            ScatteringType::Coherent => {
                let Some(pion) = pdg::pion_with_charge(interaction.charge_transfer()) else {
                    return Err(no_species(interaction, charge));
                };
                let nucleus = interaction.init_state().target.pdg();
                Ok(Products::direct(two_body(hadronic, pion, nucleus, rng)?))
            }
            ScatteringType::MesonExchange => {
                let pair = match charge {
                    0 => (pdg::NEUTRON, pdg::NEUTRON),
                    1 => (pdg::PROTON, pdg::NEUTRON),
                    2 => (pdg::PROTON, pdg::PROTON),
                    _ => return Err(no_species(interaction, charge)),
                };
                Ok(Products::direct(two_body(hadronic, pair.0, pair.1, rng)?))
            }
            ScatteringType::DeepInelastic => {
                let Some(hadronizer) = &self.hadronizer else {
                    return Err(NugenError::config(
                        "missing-hadronizer",
                        "inclusive channel has no hadronizer configured",
                    ));
                };
                match hadronizer.hadronize(interaction, hadronic, rng) {
                    Some(particles) if !particles.is_empty() => Ok(Products::direct(particles)),
                    _ => Err(EventFailure::hadronization(format!(
                        "{} produced no particles for W = {:.4}",
                        hadronizer.name(),
                        hadronic.m()
                    ))
                    .into()),
                }
            }
        }
    }
}

struct Products {
    intermediate: Option<FinalStateParticle>,
    particles: Vec<FinalStateParticle>,
}

impl Products {
    fn direct(particles: Vec<FinalStateParticle>) -> Self {
        Self {
            intermediate: None,
            particles,
        }
    }
}

fn no_species(interaction: &Interaction, charge: i32) -> NugenError {
    NugenError::Kinematics(
        ErrorInfo::new("no-hadronic-species", "no hadron matches the hadronic charge")
            .with_context("interaction", interaction)
            .with_context("charge", charge),
    )
}

/// Nucleon and pion from Δ(1232) decay, weighted by isospin.
fn delta_decay_species(charge: i32, rng: &mut RngHandle) -> Option<(i32, i32)> {
    let pair = match charge {
        2 => (pdg::PROTON, pdg::PI_PLUS),
        1 => {
            if rng.uniform() < 2.0 / 3.0 {
                (pdg::PROTON, pdg::PI0)
            } else {
                (pdg::NEUTRON, pdg::PI_PLUS)
            }
        }
        0 => {
            if rng.uniform() < 2.0 / 3.0 {
                (pdg::NEUTRON, pdg::PI0)
            } else {
                (pdg::PROTON, pdg::PI_MINUS)
            }
        }
        -1 => (pdg::NEUTRON, pdg::PI_MINUS),
        _ => return None,
    };
    Some(pair)
}

fn two_body(
    parent: &LorentzVector,
    first: i32,
    second: i32,
    rng: &mut RngHandle,
) -> Result<Vec<FinalStateParticle>, NugenError> {
    let masses = pdg::mass(first).zip(pdg::mass(second));
    let split = masses.and_then(|(m1, m2)| isotropic_two_body(parent, m1, m2, rng));
    let Some((p1, p2)) = split else {
        return Err(EventFailure::hadronization(format!(
            "W = {:.4} cannot produce {first} + {second}",
            parent.m()
        ))
        .into());
    };
    Ok(vec![
        FinalStateParticle { pdg: first, p4: p1 },
        FinalStateParticle { pdg: second, p4: p2 },
    ])
}

/// Spectator nucleus left after removing the struck constituent, or `None`
/// when nothing remains.
fn remnant_species(interaction: &Interaction) -> Option<i32> {
    let target = &interaction.init_state().target;
    let (removed_z, removed_a) = match (target.hit_cluster, target.hit_nucleon) {
        (Some(cluster), _) => (pdg::charge(cluster).unwrap_or(0), 2),
        (None, Some(nucleon)) => (pdg::charge(nucleon).unwrap_or(0), 1),
        (None, None) => return None,
    };
    let z = (target.z as i32 - removed_z).max(0) as u32;
    let a = target.a.checked_sub(removed_a)?;
    match a {
        0 => None,
        1 => pdg::nucleon_with_charge(z as i32),
        _ => Some(pdg::ion_code(z, a)),
    }
}

impl EventRecordVisitor for HadronicSystemGenerator {
    fn name(&self) -> &str {
        "hadronic-system"
    }

    fn process(&self, record: &mut EventRecord, rng: &mut RngHandle) -> Result<(), NugenError> {
        let interaction = record.require_interaction("hadronic-system")?.clone();
        let target = interaction.init_state().target;
        let coherent = self.process == ScatteringType::Coherent;
        let hit_idx = if coherent {
            Some(1)
        } else {
            record.hit_nucleon_index()
        };
        let (Some(probe), Some(hit_idx)) = (record.probe().map(|p| p.p4), hit_idx) else {
            return Err(NugenError::record(
                "missing-initial-state",
                "hadronic system needs the probe and struck constituent",
            ));
        };
        let Some((_, lepton)) = record.find_particle_by_status(ParticleStatus::StableFinal) else {
            return Err(NugenError::record(
                "missing-primary-lepton",
                "hadronic system needs the primary lepton",
            ));
        };
        let lepton = lepton.p4;
        let hit = record
            .particle(hit_idx)
            .map(|p| p.p4)
            .unwrap_or_else(|| LorentzVector::at_rest(target.hit_mass()));
        let hadronic = probe + hit - lepton;

        let products = match self.products(&interaction, &hadronic, rng) {
            Ok(products) => products,
            Err(err) => {
                if let Some(failure) = err.failure() {
                    debug!(reason = %failure, "hadronic system abandoned");
                    record.set_event_flag(EventFlag::from(failure.kind));
                }
                return Err(err);
            }
        };

        let in_nucleus = target.is_nucleus() && !coherent;
        let status = if in_nucleus {
            ParticleStatus::HadronInNucleus
        } else {
            ParticleStatus::StableFinal
        };
        let vertex = record.vertex;
        let parent = match products.intermediate {
            Some(resonance) => record.append_particle(
                resonance.pdg,
                ParticleStatus::Intermediate,
                Some(hit_idx),
                resonance.p4,
                vertex,
            )?,
            None => hit_idx,
        };
        for particle in products.particles {
            record.append_particle(particle.pdg, status, Some(parent), particle.p4, vertex)?;
        }

        if in_nucleus {
            if let Some(remnant) = remnant_species(&interaction) {
                let target_p4 = record
                    .particle(1)
                    .map(|p| p.p4)
                    .unwrap_or_else(|| LorentzVector::at_rest(target.mass()));
                record.append_particle(
                    remnant,
                    ParticleStatus::StableFinal,
                    Some(1),
                    target_p4 - hit,
                    vertex,
                )?;
            }
        }
        Ok(())
    }
}
