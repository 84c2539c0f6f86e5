#![doc = "Event generation pipeline: cached kinematics sampling, final-state construction and the batch driver."]

/// Monotonic max cross-section cache.
pub mod cache;
/// Registry of swappable algorithms.
pub mod catalogue;
/// YAML run configuration.
pub mod config;
/// Default decay table.
pub mod decays;
/// Per-event retry loop and batch generation.
pub mod driver;
/// Default hadronizers.
pub mod fragmentation;
/// Rejection sampling of kinematics.
pub mod kinegen;
/// Generation counters.
pub mod metrics;
/// Stage chains per channel.
pub mod pipeline;
/// Interaction enumeration and selection.
pub mod selector;
/// Record-building stages.
pub mod stages;
/// Run summary and event output.
pub mod summary;

pub use cache::{merge_snapshots, CacheEntrySnapshot, MaxXSecCache};
pub use catalogue::AlgorithmCatalogue;
pub use config::{
    CachePolicy, CacheSharing, ChannelConfig, DecayerConfig, DriverPolicy, KinematicsPolicy,
    OutputConfig, RunConfig, SeedPolicy, TargetConfig,
};
pub use decays::ToyDecayModel;
pub use driver::{chunk_ranges, generate_batch, BatchOutput, EventGenerator, GeneratedEvent};
pub use fragmentation::{split_sequential, CharmHadronizer, ToyHadronizer};
pub use kinegen::{KineFamily, KinematicsGenerator};
pub use metrics::{GenerationStats, KinematicsStats, StatsSnapshot};
pub use pipeline::{ChannelPipeline, EventPipeline, PipelineRegistry};
pub use selector::{enumerate_interactions, ChannelXSec, IntegralTable, InteractionSelector};
pub use summary::{config_hash, read_events_jsonl, write_events_jsonl, RunSummary};
