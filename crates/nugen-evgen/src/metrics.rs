use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use nugen_core::FailureKind;
use nugen_intranuke::CascadeSummary;

/// Counters kept by one kinematics generator.
#[derive(Debug, Default)]
pub struct KinematicsCounters {
    trials: AtomicU64,
    accepted: AtomicU64,
    exhausted: AtomicU64,
}

impl KinematicsCounters {
    pub(crate) fn record_trial(&self) {
        self.trials.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_accept(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> KinematicsStats {
        KinematicsStats {
            trials: self.trials.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            exhausted: self.exhausted.load(Ordering::Relaxed),
        }
    }
}

/// Candidate, acceptance and exhaustion counts for one channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KinematicsStats {
    /// Candidates evaluated.
    pub trials: u64,
    /// Candidates accepted.
    pub accepted: u64,
    /// Times the retry ceiling was reached.
    pub exhausted: u64,
}

impl KinematicsStats {
    /// Accepted over evaluated candidates; zero before the first trial.
    pub fn acceptance_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.accepted as f64 / self.trials as f64
        }
    }

    fn merge(&mut self, other: &KinematicsStats) {
        self.trials += other.trials;
        self.accepted += other.accepted;
        self.exhausted += other.exhausted;
    }
}

fn kind_slot(kind: FailureKind) -> usize {
    match kind {
        FailureKind::NoAvailablePhaseSpace => 0,
        FailureKind::HadronizationFailure => 1,
        FailureKind::DecayFailure => 2,
        FailureKind::CascadeExhausted => 3,
    }
}

const KINDS: [FailureKind; 4] = [
    FailureKind::NoAvailablePhaseSpace,
    FailureKind::HadronizationFailure,
    FailureKind::DecayFailure,
    FailureKind::CascadeExhausted,
];

/// Driver counters shared by every event of one generator.
#[derive(Debug, Default)]
pub struct GenerationStats {
    events: AtomicU64,
    attempts: AtomicU64,
    failures: [AtomicU64; 4],
}

impl GenerationStats {
    pub(crate) fn record_event(&self, attempts: usize) {
        self.events.fetch_add(1, Ordering::Relaxed);
        self.attempts.fetch_add(attempts as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, kind: FailureKind) {
        self.failures[kind_slot(kind)].fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abandoned(&self, attempts: usize) {
        self.attempts.fetch_add(attempts as u64, Ordering::Relaxed);
    }

    /// Recoverable failures of one kind.
    pub fn failures(&self, kind: FailureKind) -> u64 {
        self.failures[kind_slot(kind)].load(Ordering::Relaxed)
    }

    /// Copy of the driver counters; channel and cascade counters are
    /// attached by the caller.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            events: self.events.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            failures: KINDS
                .iter()
                .map(|kind| (kind.as_str().to_string(), self.failures(*kind)))
                .collect(),
            kinematics: BTreeMap::new(),
            cascade: CascadeSummary::default(),
        }
    }
}

/// Serializable statistics for a run or one worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Events generated.
    pub events: u64,
    /// Full-event attempts, successful or not.
    pub attempts: u64,
    /// Recoverable failures keyed by kind label.
    pub failures: BTreeMap<String, u64>,
    /// Kinematics counters keyed by channel label.
    pub kinematics: BTreeMap<String, KinematicsStats>,
    /// Cascade counters.
    pub cascade: CascadeSummary,
}

impl StatsSnapshot {
    /// Adds another snapshot into this one.
    pub fn merge(&mut self, other: &StatsSnapshot) {
        self.events += other.events;
        self.attempts += other.attempts;
        for (kind, n) in &other.failures {
            *self.failures.entry(kind.clone()).or_default() += n;
        }
        for (channel, stats) in &other.kinematics {
            self.kinematics.entry(channel.clone()).or_default().merge(stats);
        }
        self.cascade.merge(&other.cascade);
    }

    /// Total recoverable failures.
    pub fn total_failures(&self) -> u64 {
        self.failures.values().sum()
    }
}
