use nugen_core::{
    EventRecord, EventRecordVisitor, LorentzVector, NugenError, ParticleStatus, RngHandle,
    ScatteringType,
};

/// Appends the probe, the target and (for nuclear targets) the struck
/// nucleon or nucleon pair.
///
/// Index 0 is always the probe and index 1 the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitialStateBuilder;

impl EventRecordVisitor for InitialStateBuilder {
    fn name(&self) -> &str {
        "initial-state"
    }

    fn process(&self, record: &mut EventRecord, _rng: &mut RngHandle) -> Result<(), NugenError> {
        if !record.is_empty() {
            return Err(NugenError::record(
                "record-not-empty",
                "initial state must be the first entries of the record",
            ));
        }
        let interaction = record.require_interaction("initial-state")?;
        let init = *interaction.init_state();
        let coherent = interaction.process().scattering == ScatteringType::Coherent;
        let origin = LorentzVector::default();

        let probe = record.append_particle(
            init.probe_pdg,
            ParticleStatus::Initial,
            None,
            init.probe_p4(),
            origin,
        )?;
        debug_assert_eq!(probe, 0);
        let target = record.append_particle(
            init.target.pdg(),
            ParticleStatus::Initial,
            None,
            LorentzVector::at_rest(init.target.mass()),
            origin,
        )?;
        if init.target.is_nucleus() && !coherent {
            if let Some(hit) = init.target.hit_cluster.or(init.target.hit_nucleon) {
                record.append_particle(
                    hit,
                    ParticleStatus::NucleonTarget,
                    Some(target),
                    init.hit_p4(),
                    origin,
                )?;
            }
        }
        Ok(())
    }
}
