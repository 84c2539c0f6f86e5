use criterion::{criterion_group, criterion_main, Criterion};

use nugen_core::{pdg, ScatteringType};
use nugen_evgen::{
    AlgorithmCatalogue, ChannelConfig, EventGenerator, MaxXSecCache, RunConfig, TargetConfig,
};

fn carbon_config() -> RunConfig {
    RunConfig {
        probe: pdg::NU_MU,
        energy: 2.0,
        target: TargetConfig { z: 6, a: 12 },
        channels: vec![
            ChannelConfig::new(ScatteringType::QuasiElastic),
            ChannelConfig::new(ScatteringType::Resonant),
        ],
        ..RunConfig::default()
    }
}

fn bench_events(c: &mut Criterion) {
    let config = carbon_config();
    let generator = EventGenerator::build(&config, &AlgorithmCatalogue::builtin()).unwrap();
    let mut index = 0u64;
    c.bench_function("carbon_qel_res_event", |b| {
        b.iter(|| {
            index += 1;
            let _ = generator.generate_event(index).unwrap();
        })
    });
}

fn bench_cache(c: &mut Criterion) {
    let cache = MaxXSecCache::default();
    let interaction = nugen_core::Interaction::qel_cc(
        pdg::NU_MU,
        nugen_core::Target::free_nucleon(pdg::NEUTRON),
        1.0,
    );
    let fingerprint = interaction.fingerprint("kine:q2");
    cache.observe(fingerprint, 1.0, 3.0);
    c.bench_function("cache_hit", |b| {
        b.iter(|| cache.get_or_compute_max(fingerprint, 1.0, |_| 0.0))
    });
}

criterion_group!(benches, bench_events, bench_cache);
criterion_main!(benches);
