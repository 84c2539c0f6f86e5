//! Process-wide store of maximum differential cross sections.
//!
//! Entries only grow. A fingerprint's maximum is raised by atomic
//! compare-and-swap, so readers may see a stale lower value but never a
//! torn or shrinking one. Re-probing at higher energies assumes that the
//! envelope of every supported channel does not decrease with energy.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use nugen_core::XSecFingerprint;

#[derive(Debug)]
struct CacheEntry {
    max: AtomicU64,
    energy: AtomicU64,
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn raise(cell: &AtomicU64, value: f64) -> bool {
    cell.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
        if value > f64::from_bits(bits) {
            Some(value.to_bits())
        } else {
            None
        }
    })
    .is_ok()
}

impl CacheEntry {
    fn new(energy: f64) -> Self {
        Self {
            max: AtomicU64::new(0f64.to_bits()),
            energy: AtomicU64::new(energy.to_bits()),
        }
    }

    fn max(&self) -> f64 {
        f64::from_bits(self.max.load(Ordering::Acquire))
    }

    fn energy(&self) -> f64 {
        f64::from_bits(self.energy.load(Ordering::Acquire))
    }
}

/// One cache entry as exported in run summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntrySnapshot {
    /// Interaction fingerprint.
    pub fingerprint: XSecFingerprint,
    /// Largest cross section recorded.
    pub max: f64,
    /// Highest energy the maximum was probed at.
    pub energy: f64,
}

/// Monotonic max cross-section cache keyed by interaction fingerprint.
#[derive(Debug)]
pub struct MaxXSecCache {
    entries: RwLock<HashMap<XSecFingerprint, Arc<CacheEntry>>>,
    reprobe_tolerance: f64,
}

impl Default for MaxXSecCache {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl MaxXSecCache {
    /// Empty cache. Entries are re-probed when the requested energy exceeds
    /// the recorded one by more than `reprobe_tolerance` (relative).
    pub fn new(reprobe_tolerance: f64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            reprobe_tolerance: reprobe_tolerance.max(0.0),
        }
    }

    fn lookup(&self, fingerprint: XSecFingerprint) -> Option<Arc<CacheEntry>> {
        let entries = self.entries.read().unwrap_or_else(|poison| poison.into_inner());
        entries.get(&fingerprint).cloned()
    }

    fn entry(&self, fingerprint: XSecFingerprint, energy: f64) -> Arc<CacheEntry> {
        let mut entries = self.entries.write().unwrap_or_else(|poison| poison.into_inner());
        entries
            .entry(fingerprint)
            .or_insert_with(|| Arc::new(CacheEntry::new(energy)))
            .clone()
    }

    /// Maximum for `fingerprint` at `energy`, running `probe(energy)` on a
    /// miss or when the energy materially exceeds the recorded one.
    ///
    /// The returned value never decreases across calls for a fingerprint.
    pub fn get_or_compute_max(
        &self,
        fingerprint: XSecFingerprint,
        energy: f64,
        probe: impl FnOnce(f64) -> f64,
    ) -> f64 {
        if let Some(entry) = self.lookup(fingerprint) {
            let recorded = entry.energy();
            if energy > recorded * (1.0 + self.reprobe_tolerance) {
                let value = sanitize(probe(energy));
                raise(&entry.max, value);
                raise(&entry.energy, energy);
                debug!(%fingerprint, energy, recorded, value, "max cross section re-probed");
            }
            return entry.max();
        }
        let value = sanitize(probe(energy));
        let entry = self.entry(fingerprint, energy);
        raise(&entry.max, value);
        raise(&entry.energy, energy);
        debug!(%fingerprint, energy, value, "max cross section computed");
        entry.max()
    }

    /// Raises the maximum for `fingerprint` to `value` if larger. Returns
    /// whether the stored maximum changed.
    pub fn observe(&self, fingerprint: XSecFingerprint, energy: f64, value: f64) -> bool {
        let value = sanitize(value);
        let entry = match self.lookup(fingerprint) {
            Some(entry) => entry,
            None => self.entry(fingerprint, energy),
        };
        raise(&entry.max, value)
    }

    /// Current maximum, if the fingerprint has been seen.
    pub fn peek(&self, fingerprint: XSecFingerprint) -> Option<f64> {
        self.lookup(fingerprint).map(|entry| entry.max())
    }

    /// Number of cached fingerprints.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|poison| poison.into_inner())
            .clear();
    }

    /// Entries sorted by fingerprint.
    pub fn snapshot(&self) -> Vec<CacheEntrySnapshot> {
        let entries = self.entries.read().unwrap_or_else(|poison| poison.into_inner());
        let mut out: Vec<_> = entries
            .iter()
            .map(|(fingerprint, entry)| CacheEntrySnapshot {
                fingerprint: *fingerprint,
                max: entry.max(),
                energy: entry.energy(),
            })
            .collect();
        out.sort_by_key(|e| e.fingerprint);
        out
    }
}

/// Combines snapshots from independent caches, keeping the larger maximum.
pub fn merge_snapshots(parts: impl IntoIterator<Item = Vec<CacheEntrySnapshot>>) -> Vec<CacheEntrySnapshot> {
    let mut merged: HashMap<XSecFingerprint, CacheEntrySnapshot> = HashMap::new();
    for entry in parts.into_iter().flatten() {
        merged
            .entry(entry.fingerprint)
            .and_modify(|current| {
                current.max = current.max.max(entry.max);
                current.energy = current.energy.max(entry.energy);
            })
            .or_insert(entry);
    }
    let mut out: Vec<_> = merged.into_values().collect();
    out.sort_by_key(|e| e.fingerprint);
    out
}
