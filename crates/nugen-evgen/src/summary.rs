//! Run summary and event file output.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use nugen_core::{ErrorInfo, NugenError, RunProvenance, SchemaVersion};

use crate::cache::CacheEntrySnapshot;
use crate::config::RunConfig;
use crate::driver::{BatchOutput, GeneratedEvent};
use crate::metrics::StatsSnapshot;
use crate::selector::ChannelXSec;

fn serde_error(code: &str, err: impl ToString, path: &Path) -> NugenError {
    NugenError::Serde(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
}

/// SHA-256 over the JSON encoding of the run configuration.
pub fn config_hash(config: &RunConfig) -> Result<String, NugenError> {
    let bytes = serde_json::to_vec(config)
        .map_err(|err| NugenError::Serde(ErrorInfo::new("config-serialize", err.to_string())))?;
    Ok(format!("{:x}", Sha256::digest(bytes)))
}

/// Machine readable description of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Summary schema.
    pub schema: SchemaVersion,
    /// Configuration hash, seed and tool versions.
    pub provenance: RunProvenance,
    /// RFC 3339 creation time.
    pub created_at: String,
    /// Events requested by the configuration.
    pub events_requested: u64,
    /// Events actually produced.
    pub events_generated: u64,
    /// Merged statistics.
    pub stats: StatsSnapshot,
    /// Cache entries at the end of the run.
    pub cache: Vec<CacheEntrySnapshot>,
    /// Integrated cross sections per interaction.
    pub channels: Vec<ChannelXSec>,
}

impl RunSummary {
    /// Summarises a batch.
    pub fn from_batch(config: &RunConfig, output: &BatchOutput) -> Result<Self, NugenError> {
        let mut provenance = RunProvenance::new(config_hash(config)?, config.seed.resolve());
        provenance
            .tool_versions
            .insert("nugen-evgen".to_string(), env!("CARGO_PKG_VERSION").to_string());
        Ok(Self {
            schema: SchemaVersion::default(),
            provenance,
            created_at: Utc::now().to_rfc3339(),
            events_requested: config.events,
            events_generated: output.events.len() as u64,
            stats: output.stats.clone(),
            cache: output.cache.clone(),
            channels: output.channels.clone(),
        })
    }

    /// Writes the summary as pretty JSON, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), NugenError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| serde_error("summary-mkdir", err, parent))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| serde_error("summary-serialize", err, path))?;
        fs::write(path, json).map_err(|err| serde_error("summary-write", err, path))
    }

    /// Reads a summary back.
    pub fn load(path: &Path) -> Result<Self, NugenError> {
        let contents =
            fs::read_to_string(path).map_err(|err| serde_error("summary-read", err, path))?;
        serde_json::from_str(&contents).map_err(|err| serde_error("summary-parse", err, path))
    }
}

/// Writes one JSON object per event.
pub fn write_events_jsonl(path: &Path, events: &[GeneratedEvent]) -> Result<(), NugenError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| serde_error("events-mkdir", err, parent))?;
    }
    let file = File::create(path).map_err(|err| serde_error("events-create", err, path))?;
    let mut writer = BufWriter::new(file);
    for event in events {
        serde_json::to_writer(&mut writer, event)
            .map_err(|err| serde_error("events-serialize", err, path))?;
        writer
            .write_all(b"\n")
            .map_err(|err| serde_error("events-write", err, path))?;
    }
    writer
        .flush()
        .map_err(|err| serde_error("events-write", err, path))
}

/// Reads an events file written by [`write_events_jsonl`].
pub fn read_events_jsonl(path: &Path) -> Result<Vec<GeneratedEvent>, NugenError> {
    let contents = fs::read_to_string(path).map_err(|err| serde_error("events-read", err, path))?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(|err| serde_error("events-parse", err, path)))
        .collect()
}
