//! Per-channel chains of event record visitors.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use nugen_core::{
    EventRecord, EventRecordVisitor, ErrorInfo, NugenError, RngHandle, ScatteringType, XSecModel,
};
use nugen_intranuke::Intranuke;
use nugen_xsec::QelDipole;

use crate::cache::MaxXSecCache;
use crate::catalogue::AlgorithmCatalogue;
use crate::config::{ChannelConfig, RunConfig};
use crate::kinegen::{KineFamily, KinematicsGenerator};
use crate::stages::{
    HadronicSystemGenerator, InitialStateBuilder, PrimaryLeptonGenerator,
    UnstableParticleDecayer,
};

/// Ordered stages run on every record of one channel.
#[derive(Clone)]
pub struct EventPipeline {
    channel: ScatteringType,
    stages: Vec<Arc<dyn EventRecordVisitor>>,
}

impl std::fmt::Debug for EventPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPipeline")
            .field("channel", &self.channel)
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl EventPipeline {
    /// Empty pipeline for a channel.
    pub fn new(channel: ScatteringType) -> Self {
        Self {
            channel,
            stages: Vec::new(),
        }
    }

    /// Appends a stage.
    pub fn with_stage(mut self, stage: Arc<dyn EventRecordVisitor>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Channel this pipeline serves.
    pub fn channel(&self) -> ScatteringType {
        self.channel
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs every stage in order, stopping at the first error.
    pub fn run(&self, record: &mut EventRecord, rng: &mut RngHandle) -> Result<(), NugenError> {
        for stage in &self.stages {
            if let Err(err) = stage.process(record, rng) {
                debug!(stage = stage.name(), channel = %self.channel, error = %err, "stage failed");
                return Err(err);
            }
        }
        Ok(())
    }
}

/// Pipeline, kinematics stage and model of one enabled channel.
#[derive(Debug, Clone)]
pub struct ChannelPipeline {
    /// Stage chain.
    pub pipeline: EventPipeline,
    /// Kinematics stage, kept for its counters.
    pub kinematics: Arc<KinematicsGenerator>,
    /// Cross-section model.
    pub model: Arc<dyn XSecModel>,
    /// Channel configuration.
    pub config: ChannelConfig,
}

/// Every channel pipeline of a run, in configuration order.
#[derive(Debug, Clone)]
pub struct PipelineRegistry {
    channels: IndexMap<ScatteringType, ChannelPipeline>,
    intranuke: Arc<Intranuke>,
}

fn model_config_for(channel: &ChannelConfig) -> nugen_core::AlgConfig {
    let mut config = channel.model_config.clone();
    if channel.process == ScatteringType::MesonExchange
        && !config.sub_algorithms.contains_key("ccqe-xsec")
    {
        config
            .sub_algorithms
            .insert("ccqe-xsec".to_string(), QelDipole::NAME.to_string());
    }
    config
}

impl PipelineRegistry {
    /// Builds the models, collaborators and stage chain of every channel.
    pub fn build(
        config: &RunConfig,
        catalogue: &AlgorithmCatalogue,
        cache: Arc<MaxXSecCache>,
    ) -> Result<Self, NugenError> {
        let intranuke = Arc::new(Intranuke::new(config.cascade.clone()));
        let decayer: Option<Arc<dyn EventRecordVisitor>> = if config.decayer.enabled {
            let model = catalogue.build_decay_model(&config.decayer.model, &config.decayer.config)?;
            Some(Arc::new(UnstableParticleDecayer::new(
                model,
                config.decayer.unstable.iter().copied(),
            )))
        } else {
            None
        };

        let mut channels = IndexMap::new();
        for channel in &config.channels {
            if channels.contains_key(&channel.process) {
                return Err(NugenError::Config(
                    ErrorInfo::new("duplicate-channel", "a channel is configured twice")
                        .with_context("channel", channel.process),
                ));
            }
            let model_name = channel.model_name();
            let model = catalogue.xsec.build(model_name, &model_config_for(channel))?;
            let family = KineFamily::for_scattering(channel.process);
            if !model.native_phase_space().convertible_to(family.phase_space()) {
                return Err(NugenError::Config(
                    ErrorInfo::new(
                        "incompatible-model",
                        "model phase space cannot be converted to the sampled variables",
                    )
                    .with_context("channel", channel.process)
                    .with_context("model", model_name)
                    .with_context("native", model.native_phase_space().as_str())
                    .with_context("sampled", family.phase_space().as_str()),
                ));
            }
            let w_cut = channel
                .model_config
                .params
                .contains_key("w-cut")
                .then(|| channel.model_config.get_f64("w-cut", f64::INFINITY));
            let kinematics = Arc::new(
                KinematicsGenerator::new(
                    Arc::clone(&model),
                    Arc::clone(&cache),
                    family,
                    config.cache.safety_for(channel.process),
                    config.kinematics.max_trials,
                )
                .with_w_cut(w_cut)
                .with_search(config.cache.search),
            );

            let mut hadronic = HadronicSystemGenerator::new(channel.process);
            if channel.process == ScatteringType::DeepInelastic {
                let hadronizer = catalogue
                    .build_hadronizer(channel.hadronizer_name(), &channel.hadronizer_config)?;
                hadronic = hadronic.with_hadronizer(hadronizer);
            }

            let mut pipeline = EventPipeline::new(channel.process)
                .with_stage(Arc::new(InitialStateBuilder))
                .with_stage(Arc::clone(&kinematics) as Arc<dyn EventRecordVisitor>)
                .with_stage(Arc::new(PrimaryLeptonGenerator))
                .with_stage(Arc::new(hadronic))
                .with_stage(Arc::clone(&intranuke) as Arc<dyn EventRecordVisitor>);
            if let Some(decayer) = &decayer {
                pipeline = pipeline.with_stage(Arc::clone(decayer));
            }
            info!(
                channel = %channel.process,
                model = model_name,
                stages = ?pipeline.stage_names(),
                "channel pipeline ready"
            );
            channels.insert(
                channel.process,
                ChannelPipeline {
                    pipeline,
                    kinematics,
                    model,
                    config: channel.clone(),
                },
            );
        }
        Ok(Self {
            channels,
            intranuke,
        })
    }

    /// Pipeline for a channel.
    pub fn get(&self, channel: ScatteringType) -> Option<&ChannelPipeline> {
        self.channels.get(&channel)
    }

    /// Pipelines in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (&ScatteringType, &ChannelPipeline)> + '_ {
        self.channels.iter()
    }

    /// Model and channel configuration pairs for interaction selection.
    pub fn models(&self) -> Vec<(ChannelConfig, Arc<dyn XSecModel>)> {
        self.channels
            .values()
            .map(|c| (c.config.clone(), Arc::clone(&c.model)))
            .collect()
    }

    /// Shared cascade stage.
    pub fn intranuke(&self) -> &Intranuke {
        &self.intranuke
    }
}
