use nugen_core::{
    EventFlag, EventRecord, Interaction, LorentzVector, NugenError, ParticleStatus, Target,
};
use proptest::prelude::*;

fn zero() -> LorentzVector {
    LorentzVector::default()
}

#[test]
fn parent_must_be_earlier() {
    let mut record = EventRecord::new();
    let probe = record
        .append_particle(14, ParticleStatus::Initial, None, LorentzVector::new(0.0, 0.0, 1.0, 1.0), zero())
        .expect("probe");
    let lepton = record
        .append_particle(13, ParticleStatus::StableFinal, Some(probe), zero(), zero())
        .expect("lepton");
    assert_eq!(record.particle(probe).and_then(|p| p.first_daughter), Some(lepton));

    let err = record
        .append_particle(2212, ParticleStatus::StableFinal, Some(5), zero(), zero())
        .expect_err("forward parent");
    assert!(matches!(err, NugenError::Record(_)));
    assert_eq!(record.len(), 2);
}

#[test]
fn status_transitions_only_move_forward() {
    let mut record = EventRecord::new();
    let idx = record
        .append_particle(211, ParticleStatus::HadronInNucleus, None, zero(), zero())
        .expect("pion");
    record.set_status(idx, ParticleStatus::StableFinal).expect("escape");
    record.set_status(idx, ParticleStatus::Decayed).expect("decay");
    let err = record
        .set_status(idx, ParticleStatus::HadronInNucleus)
        .expect_err("reverse");
    assert!(matches!(err, NugenError::Record(_)));
    assert_eq!(record.particle(idx).map(|p| p.status()), Some(ParticleStatus::Decayed));
}

#[test]
fn flags_and_reset() {
    let mut record = EventRecord::new();
    record.attach_interaction(Interaction::qel_cc(14, Target::free_nucleon(2112), 1.0));
    record
        .append_particle(14, ParticleStatus::Initial, None, zero(), zero())
        .expect("probe");
    record.set_event_flag(EventFlag::NoAvailablePhaseSpace);
    assert!(record.has_flag(EventFlag::NoAvailablePhaseSpace));
    assert!(record.find_particle_by_status(ParticleStatus::Initial).is_some());

    record.reset();
    assert!(record.is_empty());
    assert!(record.interaction().is_none());
    assert_eq!(record.flags().count(), 0);
}

const STATUSES: [ParticleStatus; 7] = [
    ParticleStatus::Initial,
    ParticleStatus::NucleonTarget,
    ParticleStatus::Intermediate,
    ParticleStatus::HadronInNucleus,
    ParticleStatus::StableFinal,
    ParticleStatus::Rescattered,
    ParticleStatus::Decayed,
];

proptest! {
    #[test]
    fn random_builds_keep_parents_earlier(parents in proptest::collection::vec(0usize..40, 1..40)) {
        let mut record = EventRecord::new();
        for (i, parent) in parents.iter().enumerate() {
            let parent = if i == 0 { None } else { Some(parent % i) };
            record
                .append_particle(211, ParticleStatus::HadronInNucleus, parent, zero(), zero())
                .expect("append");
        }
        for (idx, particle) in record.particles().iter().enumerate() {
            if let Some(mother) = particle.mother {
                prop_assert!(mother < idx);
            }
            if let (Some(first), Some(last)) = (particle.first_daughter, particle.last_daughter) {
                prop_assert!(first > idx && last >= first);
            }
        }
    }

    #[test]
    fn transition_table_never_returns_to_transport(from in 0usize..7, to in 0usize..7) {
        let (from, to) = (STATUSES[from], STATUSES[to]);
        if from.can_transition_to(to) {
            prop_assert!(to != ParticleStatus::HadronInNucleus);
            prop_assert!(from == ParticleStatus::HadronInNucleus || from == ParticleStatus::StableFinal);
        }
    }
}
