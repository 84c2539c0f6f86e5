//! Event generation driver: interaction selection, the per-event retry
//! state machine and parallel batch generation.

use std::ops::Range;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use nugen_core::{
    derive_substream_seed, ErrorInfo, EventRecord, NugenError, RngHandle,
};

use crate::cache::{merge_snapshots, CacheEntrySnapshot, MaxXSecCache};
use crate::catalogue::AlgorithmCatalogue;
use crate::config::{CacheSharing, DriverPolicy, RunConfig};
use crate::metrics::{GenerationStats, StatsSnapshot};
use crate::pipeline::PipelineRegistry;
use crate::selector::{ChannelXSec, IntegralTable, InteractionSelector};

/// A successfully generated event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedEvent {
    /// Event index within the run.
    pub index: u64,
    /// Full-event attempts spent, including the successful one.
    pub attempts: usize,
    /// Final record.
    pub record: EventRecord,
}

/// Generates events for one probe, target and energy.
///
/// Each attempt draws a fresh interaction and runs its channel pipeline.
/// Recoverable failures restart the event with the next retry substream;
/// anything else aborts.
#[derive(Debug)]
pub struct EventGenerator {
    registry: PipelineRegistry,
    selector: InteractionSelector,
    policy: DriverPolicy,
    master_seed: u64,
    stats: GenerationStats,
}

impl EventGenerator {
    /// Generator with a private cache and integral table.
    pub fn build(config: &RunConfig, catalogue: &AlgorithmCatalogue) -> Result<Self, NugenError> {
        let cache = Arc::new(MaxXSecCache::new(config.cache.reprobe_tolerance));
        Self::build_with(config, catalogue, cache, &IntegralTable::default())
    }

    /// Generator sharing an existing cache and integral table.
    pub fn build_with(
        config: &RunConfig,
        catalogue: &AlgorithmCatalogue,
        cache: Arc<MaxXSecCache>,
        integrals: &IntegralTable,
    ) -> Result<Self, NugenError> {
        let registry = PipelineRegistry::build(config, catalogue, cache)?;
        let target = config.target.target();
        let selector = InteractionSelector::build(
            config.probe,
            &target,
            config.energy,
            &registry.models(),
            integrals,
        )?;
        Ok(Self {
            registry,
            selector,
            policy: config.driver,
            master_seed: config.seed.resolve(),
            stats: GenerationStats::default(),
        })
    }

    /// Channel pipelines.
    pub fn registry(&self) -> &PipelineRegistry {
        &self.registry
    }

    /// Interaction selector.
    pub fn selector(&self) -> &InteractionSelector {
        &self.selector
    }

    /// Master seed in use.
    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Generates event `index`, restarting on recoverable failures.
    ///
    /// Fails with [`NugenError::Exhausted`] once the attempt budget is spent.
    pub fn generate_event(&self, index: u64) -> Result<GeneratedEvent, NugenError> {
        let event_seed = derive_substream_seed(self.master_seed, index);
        let budget = self.policy.max_attempts;
        for attempt in 0..budget {
            let mut rng = RngHandle::from_seed(derive_substream_seed(event_seed, attempt as u64));
            let candidate = self.selector.select(&mut rng);
            let Some(channel) = self.registry.get(candidate.channel) else {
                return Err(NugenError::Config(
                    ErrorInfo::new("missing-pipeline", "no pipeline for the selected channel")
                        .with_context("channel", candidate.channel),
                ));
            };
            let mut record = EventRecord::new();
            record.attach_interaction(candidate.interaction.clone());
            match channel.pipeline.run(&mut record, &mut rng) {
                Ok(()) => {
                    self.stats.record_event(attempt + 1);
                    return Ok(GeneratedEvent {
                        index,
                        attempts: attempt + 1,
                        record,
                    });
                }
                Err(NugenError::Event(failure)) => {
                    self.stats.record_failure(failure.kind);
                    debug!(index, attempt, reason = %failure, "event restarted");
                }
                Err(err) => return Err(err),
            }
        }
        self.stats.record_abandoned(budget);
        warn!(index, budget, "event attempt budget exhausted");
        Err(NugenError::Exhausted(
            ErrorInfo::new("event-attempts-exhausted", "no attempt produced a complete event")
                .with_context("event", index)
                .with_context("attempts", budget)
                .with_hint("raise driver.max_attempts or check the channel configuration"),
        ))
    }

    /// Driver, kinematics and cascade counters.
    pub fn stats(&self) -> StatsSnapshot {
        let mut snapshot = self.stats.snapshot();
        for (channel, pipeline) in self.registry.iter() {
            snapshot.kinematics.insert(
                channel.as_str().to_string(),
                pipeline.kinematics.counters().snapshot(),
            );
        }
        snapshot.cascade = self.registry.intranuke().totals();
        snapshot
    }
}

/// Everything a batch run produces.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    /// Events in index order.
    pub events: Vec<GeneratedEvent>,
    /// Merged statistics.
    pub stats: StatsSnapshot,
    /// Merged cache entries.
    pub cache: Vec<CacheEntrySnapshot>,
    /// Integrated cross sections used for selection.
    pub channels: Vec<ChannelXSec>,
}

/// Splits `0..events` into `workers` contiguous ranges.
pub fn chunk_ranges(events: u64, workers: usize) -> Vec<Range<u64>> {
    let workers = workers.max(1) as u64;
    let base = events / workers;
    let extra = events % workers;
    let mut start = 0;
    (0..workers)
        .map(|w| {
            let len = base + u64::from(w < extra);
            let range = start..start + len;
            start += len;
            range
        })
        .filter(|range| !range.is_empty())
        .collect()
}

struct WorkerOutput {
    events: Vec<GeneratedEvent>,
    stats: StatsSnapshot,
    cache: Vec<CacheEntrySnapshot>,
    channels: Vec<ChannelXSec>,
}

/// Generates `config.events` events on a pool of `config.workers` threads.
///
/// Every worker owns its generator and random streams. Event `i` always
/// uses the substream derived from `i`, so a fixed seed and worker count
/// give identical output when the cache is per worker (or with one worker).
pub fn generate_batch(
    config: &RunConfig,
    catalogue: &AlgorithmCatalogue,
) -> Result<BatchOutput, NugenError> {
    config.validate()?;
    let workers = config.workers.max(1);
    let tolerance = config.cache.reprobe_tolerance;
    let shared_cache = Arc::new(MaxXSecCache::new(tolerance));
    let integrals = Arc::new(IntegralTable::default());
    let ranges = chunk_ranges(config.events, workers);
    info!(events = config.events, workers, sharing = ?config.cache.sharing, "starting batch");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|err| NugenError::Config(ErrorInfo::new("thread-pool", err.to_string())))?;

    let results: Result<Vec<_>, NugenError> = pool.install(|| {
        ranges
            .par_iter()
            .enumerate()
            .map(|(chunk, range)| -> Result<(usize, WorkerOutput), NugenError> {
                let cache = match config.cache.sharing {
                    CacheSharing::Shared => Arc::clone(&shared_cache),
                    CacheSharing::PerWorker => Arc::new(MaxXSecCache::new(tolerance)),
                };
                let generator =
                    EventGenerator::build_with(config, catalogue, Arc::clone(&cache), &integrals)?;
                let events = range
                    .clone()
                    .map(|index| generator.generate_event(index))
                    .collect::<Result<Vec<_>, _>>()?;
                debug!(chunk, events = events.len(), "worker finished");
                Ok((
                    chunk,
                    WorkerOutput {
                        events,
                        stats: generator.stats(),
                        cache: cache.snapshot(),
                        channels: generator.selector().channel_xsecs(),
                    },
                ))
            })
            .collect()
    });

    let mut ordered = results?;
    ordered.sort_by_key(|(chunk, _)| *chunk);

    let mut events = Vec::with_capacity(config.events as usize);
    let mut stats = StatsSnapshot::default();
    let mut caches = Vec::with_capacity(ordered.len());
    let mut channels = Vec::new();
    for (_, output) in ordered {
        events.extend(output.events);
        stats.merge(&output.stats);
        caches.push(output.cache);
        if channels.is_empty() {
            channels = output.channels;
        }
    }
    let cache = merge_snapshots(caches);
    info!(
        events = events.len(),
        attempts = stats.attempts,
        failures = stats.total_failures(),
        "batch finished"
    );
    Ok(BatchOutput {
        events,
        stats,
        cache,
        channels,
    })
}
