//! Cached rejection sampling of event kinematics.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use nugen_core::{
    pdg, EventFailure, EventFlag, EventRecord, EventRecordVisitor, Interaction, KinePhaseSpace,
    KineVar, NugenError, RngHandle, ScatteringType, XSecModel,
};
use nugen_xsec::{
    q2_range, q2_range_at_w, set_q2_point, set_wq2_point, set_xy_point, w_range, wq2_allowed,
    x_range, xy_allowed, y_range_at_x, MaxSearch, Range1D,
};

use crate::cache::MaxXSecCache;
use crate::metrics::KinematicsCounters;

/// Free variables sampled for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KineFamily {
    /// Momentum transfer only (quasi-elastic style).
    Q2,
    /// Bjorken x and inelasticity y.
    XY,
    /// Hadronic invariant mass and momentum transfer.
    WQ2,
}

impl KineFamily {
    /// Family used for a scattering type.
    pub fn for_scattering(scattering: ScatteringType) -> Self {
        match scattering {
            ScatteringType::QuasiElastic
            | ScatteringType::QuasiElasticCharm
            | ScatteringType::Elastic => KineFamily::Q2,
            ScatteringType::DeepInelastic | ScatteringType::Coherent => KineFamily::XY,
            ScatteringType::Resonant | ScatteringType::MesonExchange => KineFamily::WQ2,
        }
    }

    /// Phase-space convention the candidates are drawn in.
    pub fn phase_space(&self) -> KinePhaseSpace {
        match self {
            KineFamily::Q2 => KinePhaseSpace::Q2,
            KineFamily::XY => KinePhaseSpace::XY,
            KineFamily::WQ2 => KinePhaseSpace::WQ2,
        }
    }

    /// Label mixed into cache fingerprints.
    pub fn as_str(&self) -> &'static str {
        match self {
            KineFamily::Q2 => "kine:q2",
            KineFamily::XY => "kine:xy",
            KineFamily::WQ2 => "kine:wq2",
        }
    }
}

const SELECTED_VARS: [KineVar; 5] = [KineVar::X, KineVar::Y, KineVar::Q2, KineVar::W, KineVar::T];

/// Pipeline stage drawing kinematics for one channel.
///
/// Candidates are drawn uniformly in a box enclosing the allowed region
/// and accepted with probability `xsec / (safety · max)`. The maximum comes
/// from the shared [`MaxXSecCache`]. After `max_trials` rejections the
/// event is abandoned with [`nugen_core::FailureKind::NoAvailablePhaseSpace`].
#[derive(Debug)]
pub struct KinematicsGenerator {
    model: Arc<dyn XSecModel>,
    cache: Arc<MaxXSecCache>,
    family: KineFamily,
    safety: f64,
    max_trials: usize,
    w_cut: Option<f64>,
    search: MaxSearch,
    counters: KinematicsCounters,
}

struct Candidate {
    interaction: Interaction,
    allowed: bool,
}

impl KinematicsGenerator {
    /// Creates a generator.
    pub fn new(
        model: Arc<dyn XSecModel>,
        cache: Arc<MaxXSecCache>,
        family: KineFamily,
        safety: f64,
        max_trials: usize,
    ) -> Self {
        Self {
            model,
            cache,
            family,
            safety,
            max_trials,
            w_cut: None,
            search: MaxSearch::default(),
            counters: KinematicsCounters::default(),
        }
    }

    /// Caps W for `(W, Q²)` sampling.
    pub fn with_w_cut(mut self, w_cut: Option<f64>) -> Self {
        self.w_cut = w_cut;
        self
    }

    /// Overrides the maximisation search used on cache misses.
    pub fn with_search(mut self, search: MaxSearch) -> Self {
        self.search = search;
        self
    }

    /// Sampled family.
    pub fn family(&self) -> KineFamily {
        self.family
    }

    /// Trial and acceptance counters.
    pub fn counters(&self) -> &KinematicsCounters {
        &self.counters
    }

    /// Cross section in the sampling convention; zero outside the region.
    fn evaluate(&self, candidate: &Candidate) -> Result<f64, NugenError> {
        if !candidate.allowed {
            return Ok(0.0);
        }
        self.model.xsec(&candidate.interaction, self.family.phase_space())
    }

    fn y_box(interaction: &Interaction) -> Range1D {
        let e = interaction.energy();
        let y_max = 1.0 - interaction.fs_lepton_mass() / e;
        let y_min = match interaction.process().scattering {
            ScatteringType::Coherent => {
                let pion = if interaction.is_cc() {
                    pdg::PION_MASS
                } else {
                    pdg::PI0_MASS
                };
                pion / e
            }
            _ => 0.0,
        };
        Range1D::new(y_min, y_max)
    }

    fn propose(&self, interaction: &Interaction, rng: &mut RngHandle) -> Option<Candidate> {
        let mut point = interaction.clone();
        let allowed = match self.family {
            KineFamily::Q2 => {
                let range = q2_range(interaction);
                if range.is_empty() {
                    return None;
                }
                set_q2_point(&mut point, rng.uniform_in(range.min, range.max));
                true
            }
            KineFamily::XY => {
                let xs = x_range(interaction);
                let ys = Self::y_box(interaction);
                if xs.is_empty() || ys.is_empty() {
                    return None;
                }
                let x = rng.uniform_in(xs.min, xs.max);
                let y = rng.uniform_in(ys.min, ys.max);
                set_xy_point(&mut point, x, y);
                xy_allowed(interaction, x, y, interaction.min_hadronic_mass())
            }
            KineFamily::WQ2 => {
                let ws = w_range(interaction, self.w_cut);
                if ws.is_empty() {
                    return None;
                }
                let q2_box = q2_range_at_w(interaction, ws.min);
                if q2_box.is_empty() {
                    return None;
                }
                let w = rng.uniform_in(ws.min, ws.max);
                let q2 = rng.uniform_in(0.0, q2_box.max);
                set_wq2_point(&mut point, w, q2);
                wq2_allowed(interaction, w, q2, self.w_cut)
            }
        };
        Some(Candidate {
            interaction: point,
            allowed,
        })
    }

    /// Largest cross section over the allowed region at the interaction's
    /// energy.
    pub fn search_max(&self, interaction: &Interaction) -> f64 {
        let kps = self.family.phase_space();
        let at = |point: Interaction| self.model.xsec(&point, kps).unwrap_or(0.0);
        let best = match self.family {
            KineFamily::Q2 => {
                let range = q2_range(interaction);
                self.search.maximize_1d(
                    |q2| {
                        let mut point = interaction.clone();
                        set_q2_point(&mut point, q2);
                        at(point)
                    },
                    range.min,
                    range.max,
                )
            }
            KineFamily::XY => {
                let xs = x_range(interaction);
                let w_min = interaction.min_hadronic_mass();
                self.search.maximize_2d(
                    |x, y| {
                        let mut point = interaction.clone();
                        set_xy_point(&mut point, x, y);
                        at(point)
                    },
                    xs.min,
                    xs.max,
                    |x| {
                        let ys = y_range_at_x(interaction, x, w_min);
                        (ys.min, ys.max)
                    },
                )
            }
            KineFamily::WQ2 => {
                let ws = w_range(interaction, self.w_cut);
                self.search.maximize_2d(
                    |w, q2| {
                        let mut point = interaction.clone();
                        set_wq2_point(&mut point, w, q2);
                        at(point)
                    },
                    ws.min,
                    ws.max,
                    |w| {
                        let qs = q2_range_at_w(interaction, w);
                        (qs.min, qs.max)
                    },
                )
            }
        };
        debug!(
            model = self.model.name(),
            family = self.family.as_str(),
            max = best.value,
            at_0 = best.at[0],
            at_1 = best.at[1],
            "maximum search finished"
        );
        best.value
    }

    /// Draws kinematics and stores them as the interaction's selected
    /// values. Returns the number of candidates evaluated.
    pub fn generate(
        &self,
        interaction: &mut Interaction,
        rng: &mut RngHandle,
    ) -> Result<usize, NugenError> {
        let energy = interaction.energy();
        let fingerprint = interaction.fingerprint(self.family.as_str());
        let mut max = self.cache.get_or_compute_max(fingerprint, energy, |e| {
            self.search_max(&interaction.at_energy(e))
        });

        let mut trials = 0;
        while trials < self.max_trials {
            trials += 1;
            self.counters.record_trial();
            let Some(candidate) = self.propose(interaction, rng) else {
                continue;
            };
            let value = self.evaluate(&candidate)?;
            let envelope = self.safety * max;
            if value > envelope {
                warn!(
                    model = self.model.name(),
                    %fingerprint,
                    value,
                    envelope,
                    "cross section exceeds the cached envelope"
                );
            }
            if value > max {
                self.cache.observe(fingerprint, energy, value);
                max = value;
            }
            if value > 0.0 && rng.uniform() * envelope < value {
                let kine = interaction.kine_mut();
                for var in SELECTED_VARS {
                    if let Some(v) = candidate.interaction.kine().get(var) {
                        kine.set_selected(var, v);
                    }
                }
                kine.clear_running_values();
                self.counters.record_accept();
                return Ok(trials);
            }
        }

        self.counters.record_exhausted();
        Err(EventFailure::no_phase_space(format!(
            "no {} candidate accepted for {}",
            self.family.as_str(),
            interaction
        ))
        .with_attempts(trials)
        .into())
    }
}

impl EventRecordVisitor for KinematicsGenerator {
    fn name(&self) -> &str {
        "kinematics"
    }

    fn process(&self, record: &mut EventRecord, rng: &mut RngHandle) -> Result<(), NugenError> {
        let result = {
            let interaction = record.require_interaction_mut("kinematics")?;
            self.generate(interaction, rng)
        };
        match result {
            Ok(_) => Ok(()),
            Err(err) => {
                if let Some(failure) = err.failure() {
                    record.set_event_flag(EventFlag::from(failure.kind));
                }
                Err(err)
            }
        }
    }
}
