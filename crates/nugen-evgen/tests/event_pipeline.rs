use std::sync::Arc;

use nugen_core::{
    pdg, DecayModel, EventFlag, EventRecord, EventRecordVisitor, FailureKind, FinalStateParticle,
    Hadronizer, Interaction, KinePhaseSpace, KineVar, LorentzVector, NugenError, ParticleStatus,
    RngHandle, ScatteringType, Target, ThreeVector, XSecModel,
};
use nugen_evgen::stages::{
    HadronicSystemGenerator, InitialStateBuilder, PrimaryLeptonGenerator, UnstableParticleDecayer,
};
use nugen_evgen::{
    generate_batch, AlgorithmCatalogue, CacheSharing, ChannelConfig, EventGenerator, RunConfig,
    TargetConfig, ToyDecayModel,
};

fn free_neutron_qel(events: u64) -> RunConfig {
    RunConfig {
        probe: pdg::NU_MU,
        energy: 1.0,
        target: TargetConfig { z: 0, a: 1 },
        channels: vec![ChannelConfig::new(ScatteringType::QuasiElastic)],
        events,
        workers: 1,
        ..RunConfig::default()
    }
}

fn initial_p4(record: &EventRecord) -> LorentzVector {
    record.total_p4_by_status(ParticleStatus::Initial)
}

fn final_p4(record: &EventRecord) -> LorentzVector {
    record.total_p4_by_status(ParticleStatus::StableFinal)
}

#[test]
fn qel_cc_on_free_neutron_gives_muon_and_proton() {
    let output = generate_batch(&free_neutron_qel(25), &AlgorithmCatalogue::builtin()).unwrap();
    assert_eq!(output.events.len(), 25);
    for (i, event) in output.events.iter().enumerate() {
        assert_eq!(event.index, i as u64);
        let record = &event.record;
        let mut species: Vec<i32> = record.final_state().map(|p| p.pdg).collect();
        species.sort_unstable();
        assert_eq!(species, vec![pdg::MUON, pdg::PROTON]);
        let diff = initial_p4(record).max_abs_diff(&final_p4(record));
        assert!(diff < 1e-6, "four-momentum mismatch {diff}");
        let selected = record.interaction().unwrap().kine().selected(KineVar::Q2);
        assert!(selected.is_some());
    }
    assert_eq!(output.stats.events, 25);
    let qel = &output.stats.kinematics["QES"];
    assert!(qel.accepted >= 25);
    assert_eq!(output.channels.len(), 1);
    assert!(!output.cache.is_empty());
}

#[test]
fn same_seed_reproduces_every_record() {
    let config = free_neutron_qel(15);
    let catalogue = AlgorithmCatalogue::builtin();
    let first = generate_batch(&config, &catalogue).unwrap();
    let second = generate_batch(&config, &catalogue).unwrap();
    assert_eq!(first.events, second.events);
}

#[test]
fn per_worker_caches_reproduce_multi_worker_runs() {
    let mut config = free_neutron_qel(30);
    config.workers = 3;
    config.cache.sharing = CacheSharing::PerWorker;
    let catalogue = AlgorithmCatalogue::builtin();
    let first = generate_batch(&config, &catalogue).unwrap();
    let second = generate_batch(&config, &catalogue).unwrap();
    assert_eq!(first.events, second.events);
    let indices: Vec<u64> = first.events.iter().map(|e| e.index).collect();
    assert_eq!(indices, (0..30).collect::<Vec<_>>());
}

#[test]
fn different_seeds_give_different_events() {
    let catalogue = AlgorithmCatalogue::builtin();
    let config = free_neutron_qel(5);
    let mut other = config.clone();
    other.seed.master_seed ^= 0xABCD;
    let a = generate_batch(&config, &catalogue).unwrap();
    let b = generate_batch(&other, &catalogue).unwrap();
    assert_ne!(a.events, b.events);
}

#[test]
fn resonance_on_free_proton_decays_through_delta() {
    let config = RunConfig {
        energy: 2.0,
        target: TargetConfig { z: 1, a: 1 },
        channels: vec![ChannelConfig::new(ScatteringType::Resonant)],
        events: 10,
        ..RunConfig::default()
    };
    let output = generate_batch(&config, &AlgorithmCatalogue::builtin()).unwrap();
    for event in &output.events {
        let record = &event.record;
        let (_, delta) = record
            .find_particle_by_status(ParticleStatus::Intermediate)
            .expect("resonance entry");
        assert_eq!(delta.pdg, pdg::DELTA_PLUSPLUS);
        let mut species: Vec<i32> = record.final_state().map(|p| p.pdg).collect();
        species.sort_unstable();
        assert_eq!(species, vec![pdg::MUON, pdg::PI_PLUS, pdg::PROTON]);
        assert!(initial_p4(record).max_abs_diff(&final_p4(record)) < 1e-6);
    }
}

#[test]
fn carbon_events_finish_the_cascade() {
    let config = RunConfig {
        energy: 1.0,
        target: TargetConfig { z: 6, a: 12 },
        events: 20,
        ..RunConfig::default()
    };
    let output = generate_batch(&config, &AlgorithmCatalogue::builtin()).unwrap();
    assert_eq!(output.events.len(), 20);
    for event in &output.events {
        let record = &event.record;
        assert!(record
            .find_particle_by_status(ParticleStatus::HadronInNucleus)
            .is_none());
        assert_eq!(
            record.find_particle_by_status(ParticleStatus::NucleonTarget).map(|(i, _)| i),
            Some(2)
        );
        let lepton = record
            .particles()
            .iter()
            .find(|p| p.pdg == pdg::MUON && p.mother == Some(0))
            .expect("primary lepton");
        assert_eq!(lepton.x4, record.vertex);
    }
    assert!(output.stats.cascade.escaped > 0);
}

#[test]
fn pipelines_run_stages_in_order() {
    let generator =
        EventGenerator::build(&free_neutron_qel(1), &AlgorithmCatalogue::builtin()).unwrap();
    let channel = generator.registry().get(ScatteringType::QuasiElastic).unwrap();
    assert_eq!(
        channel.pipeline.stage_names(),
        vec![
            "initial-state",
            "kinematics",
            "primary-lepton",
            "hadronic-system",
            "intranuke",
            "decayer"
        ]
    );
}

#[test]
fn duplicate_channels_are_rejected() {
    let mut config = free_neutron_qel(1);
    config
        .channels
        .push(ChannelConfig::new(ScatteringType::QuasiElastic));
    let err = EventGenerator::build(&config, &AlgorithmCatalogue::builtin()).unwrap_err();
    assert_eq!(err.info().unwrap().code, "duplicate-channel");
}

#[test]
fn unknown_hadronizer_fails_at_setup() {
    let mut channel = ChannelConfig::new(ScatteringType::DeepInelastic);
    channel.hadronizer = Some("no-such-hadronizer".to_string());
    let config = RunConfig {
        energy: 5.0,
        target: TargetConfig { z: 1, a: 1 },
        channels: vec![channel],
        ..RunConfig::default()
    };
    let err = EventGenerator::build(&config, &AlgorithmCatalogue::builtin()).unwrap_err();
    assert!(matches!(err, NugenError::Config(_)));
    assert_eq!(err.info().unwrap().code, "unknown-hadronizer");
}

/// Positive integral, zero everywhere.
#[derive(Debug)]
struct Hollow;

impl XSecModel for Hollow {
    fn name(&self) -> &str {
        "hollow"
    }

    fn native_phase_space(&self) -> KinePhaseSpace {
        KinePhaseSpace::Q2
    }

    fn native_xsec(&self, _interaction: &Interaction) -> f64 {
        0.0
    }

    fn integral(&self, _interaction: &Interaction) -> Result<f64, NugenError> {
        Ok(1.0)
    }

    fn valid_process(&self, _interaction: &Interaction) -> bool {
        true
    }
}

#[test]
fn exhausted_attempt_budget_aborts_the_run() {
    let mut catalogue = AlgorithmCatalogue::builtin();
    catalogue.xsec.register("hollow", |_, _| Ok(Arc::new(Hollow)));
    let mut channel = ChannelConfig::new(ScatteringType::QuasiElastic);
    channel.model = Some("hollow".to_string());
    let mut config = free_neutron_qel(1);
    config.channels = vec![channel];
    config.kinematics.max_trials = 10;
    config.driver.max_attempts = 3;

    let generator = EventGenerator::build(&config, &catalogue).unwrap();
    let err = generator.generate_event(0).unwrap_err();
    assert!(matches!(err, NugenError::Exhausted(_)));
    let stats = generator.stats();
    assert_eq!(stats.events, 0);
    assert_eq!(stats.attempts, 3);
    assert_eq!(stats.failures[FailureKind::NoAvailablePhaseSpace.as_str()], 3);
    assert_eq!(stats.kinematics["QES"].exhausted, 3);

    assert!(matches!(
        generate_batch(&config, &catalogue),
        Err(NugenError::Exhausted(_))
    ));
}

#[derive(Debug)]
struct Barren;

impl Hadronizer for Barren {
    fn name(&self) -> &str {
        "barren"
    }

    fn hadronize(
        &self,
        _interaction: &Interaction,
        _hadronic_p4: &LorentzVector,
        _rng: &mut RngHandle,
    ) -> Option<Vec<FinalStateParticle>> {
        None
    }
}

fn dis_record(q2: f64, w: f64) -> EventRecord {
    let mut interaction =
        Interaction::dis_cc(pdg::NU_MU, Target::free_nucleon(pdg::PROTON), 5.0);
    interaction.kine_mut().set_selected(KineVar::Q2, q2);
    interaction.kine_mut().set_selected(KineVar::W, w);
    let mut record = EventRecord::new();
    record.attach_interaction(interaction);
    record
}

#[test]
fn empty_hadronization_raises_the_flag() {
    let mut record = dis_record(1.0, 2.0);
    let mut rng = RngHandle::from_seed(4);
    InitialStateBuilder.process(&mut record, &mut rng).unwrap();
    PrimaryLeptonGenerator.process(&mut record, &mut rng).unwrap();
    let stage =
        HadronicSystemGenerator::new(ScatteringType::DeepInelastic).with_hadronizer(Arc::new(Barren));
    let err = EventRecordVisitor::process(&stage, &mut record, &mut rng).unwrap_err();
    assert_eq!(err.failure().unwrap().kind, FailureKind::HadronizationFailure);
    assert!(record.has_flag(EventFlag::HadronizationFailure));
}

#[test]
fn unphysical_lepton_is_a_recoverable_failure() {
    // W far above the available energy
    let mut record = dis_record(1.0, 4.0);
    let mut rng = RngHandle::from_seed(4);
    InitialStateBuilder.process(&mut record, &mut rng).unwrap();
    let err = PrimaryLeptonGenerator.process(&mut record, &mut rng).unwrap_err();
    assert_eq!(err.failure().unwrap().kind, FailureKind::NoAvailablePhaseSpace);
    assert!(record.has_flag(EventFlag::NoAvailablePhaseSpace));
}

#[test]
fn lepton_momentum_matches_selected_q2() {
    let mut record = dis_record(1.0, 2.0);
    let mut rng = RngHandle::from_seed(9);
    InitialStateBuilder.process(&mut record, &mut rng).unwrap();
    PrimaryLeptonGenerator.process(&mut record, &mut rng).unwrap();
    let probe = record.probe().unwrap().p4;
    let (_, lepton) = record.find_particle_by_status(ParticleStatus::StableFinal).unwrap();
    assert_eq!(lepton.pdg, pdg::MUON);
    let q = probe - lepton.p4;
    assert!((-q.m2() - 1.0).abs() < 1e-9);
}

fn single_particle_record(code: i32, p4: LorentzVector) -> EventRecord {
    let mut record = EventRecord::new();
    record
        .append_particle(code, ParticleStatus::StableFinal, None, p4, LorentzVector::default())
        .unwrap();
    record
}

#[test]
fn neutral_pion_decays_to_two_photons() {
    let p4 = LorentzVector::on_shell(ThreeVector::new(0.1, 0.2, 0.5), pdg::PI0_MASS);
    let mut record = single_particle_record(pdg::PI0, p4);
    let decayer = UnstableParticleDecayer::new(Arc::new(ToyDecayModel::default()), [pdg::PI0]);
    decayer
        .process(&mut record, &mut RngHandle::from_seed(2))
        .unwrap();
    assert_eq!(record.particle(0).unwrap().status(), ParticleStatus::Decayed);
    let photons: Vec<_> = record.final_state().collect();
    assert_eq!(photons.len(), 2);
    assert!(photons.iter().all(|p| p.pdg == pdg::PHOTON && p.mother == Some(0)));
    assert!(final_p4(&record).max_abs_diff(&p4) < 1e-9);
}

#[test]
fn decay_chains_resolve_in_one_pass() {
    let p4 = LorentzVector::on_shell(ThreeVector::new(0.0, 0.0, 1.0), 2.4529);
    let mut record = single_particle_record(pdg::SIGMA_C_PLUS, p4);
    let decayer = UnstableParticleDecayer::new(
        Arc::new(ToyDecayModel::default()),
        [pdg::SIGMA_C_PLUS, pdg::LAMBDA_C_PLUS, pdg::PI0],
    );
    decayer
        .process(&mut record, &mut RngHandle::from_seed(6))
        .unwrap();
    let mut species: Vec<i32> = record.final_state().map(|p| p.pdg).collect();
    species.sort_unstable();
    assert_eq!(
        species,
        vec![pdg::K_MINUS, pdg::PHOTON, pdg::PHOTON, pdg::PI_PLUS, pdg::PROTON]
    );
    assert!(final_p4(&record).max_abs_diff(&p4) < 1e-6);
}

#[derive(Debug)]
struct Refusing;

impl DecayModel for Refusing {
    fn name(&self) -> &str {
        "refusing"
    }

    fn handles(&self, _pdg: i32) -> bool {
        true
    }

    fn decay(
        &self,
        _pdg: i32,
        _p4: &LorentzVector,
        _rng: &mut RngHandle,
    ) -> Option<Vec<FinalStateParticle>> {
        None
    }
}

#[test]
fn claimed_but_undecayed_particle_is_a_decay_failure() {
    let p4 = LorentzVector::on_shell(ThreeVector::new(0.0, 0.0, 0.3), pdg::PI0_MASS);
    let mut record = single_particle_record(pdg::PI0, p4);
    let decayer = UnstableParticleDecayer::new(Arc::new(Refusing), [pdg::PI0]);
    let err = decayer
        .process(&mut record, &mut RngHandle::from_seed(2))
        .unwrap_err();
    assert_eq!(err.failure().unwrap().kind, FailureKind::DecayFailure);
    assert!(record.has_flag(EventFlag::DecayFailure));
}
