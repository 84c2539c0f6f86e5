//! Hadron-nucleon cross sections and fate weights driving the cascade.

use std::fmt::Debug;

use nugen_core::pdg;
use serde::{Deserialize, Serialize};

/// Interaction outcome of a hadron inside the nucleus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Fate {
    /// Pion absorbed on a nucleon pair.
    Absorption,
    /// Charge swapped with the struck nucleon.
    ChargeExchange,
    /// Elastic scattering.
    Elastic,
    /// Inelastic scattering with pion production.
    Inelastic,
}

impl Fate {
    /// Every fate in sampling order.
    pub const ALL: [Fate; 4] = [
        Fate::Absorption,
        Fate::ChargeExchange,
        Fate::Elastic,
        Fate::Inelastic,
    ];
}

/// Relative weights of each fate at one kinematic point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FateWeights {
    /// Absorption weight.
    pub absorption: f64,
    /// Charge exchange weight.
    pub charge_exchange: f64,
    /// Elastic weight.
    pub elastic: f64,
    /// Inelastic weight.
    pub inelastic: f64,
}

impl FateWeights {
    /// Weight of one fate.
    pub fn weight(&self, fate: Fate) -> f64 {
        let w = match fate {
            Fate::Absorption => self.absorption,
            Fate::ChargeExchange => self.charge_exchange,
            Fate::Elastic => self.elastic,
            Fate::Inelastic => self.inelastic,
        };
        if w.is_finite() {
            w.max(0.0)
        } else {
            0.0
        }
    }

    /// Sum of the weights.
    pub fn total(&self) -> f64 {
        Fate::ALL.iter().map(|f| self.weight(*f)).sum()
    }

    /// Picks a fate for a uniform draw `u ∈ [0, 1)`; `None` if every weight is zero.
    pub fn sample(&self, u: f64) -> Option<Fate> {
        let total = self.total();
        if total <= 0.0 {
            return None;
        }
        let mut acc = 0.0;
        let target = u * total;
        for fate in Fate::ALL {
            acc += self.weight(fate);
            if target < acc {
                return Some(fate);
            }
        }
        Fate::ALL.iter().rev().copied().find(|f| self.weight(*f) > 0.0)
    }
}

/// Hadron-nucleon cross-section source.
pub trait HadronNucleonXSec: Debug + Send + Sync {
    /// Total cross section in mb for a hadron with kinetic energy `ke` (GeV).
    fn total(&self, pdg: i32, ke: f64) -> f64;

    /// Relative fate weights at the same point.
    fn fate_weights(&self, pdg: i32, ke: f64) -> FateWeights;
}

/// Piecewise-linear table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Table {
    /// Creates a table from matching abscissa and ordinate slices.
    pub fn new(x: &[f64], y: &[f64]) -> Self {
        let n = x.len().min(y.len());
        Self {
            x: x[..n].to_vec(),
            y: y[..n].to_vec(),
        }
    }

    /// Linear interpolation, clamped to the end values.
    pub fn eval(&self, at: f64) -> f64 {
        let (x, y) = (&self.x, &self.y);
        match x.len() {
            0 => return 0.0,
            1 => return y[0],
            _ => {}
        }
        if at <= x[0] {
            return y[0];
        }
        if at >= x[x.len() - 1] {
            return y[y.len() - 1];
        }
        let hi = x.partition_point(|v| *v <= at);
        let lo = hi - 1;
        y[lo] + (at - x[lo]) * (y[hi] - y[lo]) / (x[hi] - x[lo])
    }
}

/// Tabulated pion-nucleon and nucleon-nucleon cross sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulatedHadronXSec {
    pion_total: Table,
    pion_absorption: Table,
    pion_cex: Table,
    pion_inelastic: Table,
    nucleon_total: Table,
    nucleon_cex: Table,
    nucleon_inelastic: Table,
}

impl Default for TabulatedHadronXSec {
    fn default() -> Self {
        let pion_ke = [0.0, 0.1, 0.2, 0.3, 0.5, 0.8, 1.2, 2.0, 5.0];
        let nucleon_ke = [0.0, 0.05, 0.1, 0.2, 0.4, 0.8, 1.5, 3.0];
        Self {
            pion_total: Table::new(
                &pion_ke,
                &[20.0, 60.0, 180.0, 120.0, 50.0, 40.0, 35.0, 30.0, 28.0],
            ),
            pion_absorption: Table::new(
                &pion_ke,
                &[0.45, 0.35, 0.25, 0.2, 0.1, 0.05, 0.02, 0.01, 0.0],
            ),
            pion_cex: Table::new(&pion_ke, &[0.1, 0.12, 0.15, 0.12, 0.1, 0.08, 0.06, 0.05, 0.05]),
            pion_inelastic: Table::new(
                &pion_ke,
                &[0.0, 0.0, 0.0, 0.05, 0.2, 0.35, 0.45, 0.55, 0.6],
            ),
            nucleon_total: Table::new(
                &nucleon_ke,
                &[200.0, 150.0, 80.0, 40.0, 30.0, 35.0, 42.0, 40.0],
            ),
            nucleon_cex: Table::new(&nucleon_ke, &[0.05, 0.05, 0.05, 0.04, 0.03, 0.02, 0.02, 0.02]),
            nucleon_inelastic: Table::new(
                &nucleon_ke,
                &[0.0, 0.0, 0.0, 0.0, 0.1, 0.3, 0.45, 0.5],
            ),
        }
    }
}

impl HadronNucleonXSec for TabulatedHadronXSec {
    fn total(&self, pdg: i32, ke: f64) -> f64 {
        if pdg::is_pion(pdg) {
            self.pion_total.eval(ke)
        } else if pdg::is_nucleon(pdg) {
            self.nucleon_total.eval(ke)
        } else {
            0.0
        }
    }

    fn fate_weights(&self, pdg: i32, ke: f64) -> FateWeights {
        if pdg::is_pion(pdg) {
            let absorption = self.pion_absorption.eval(ke);
            let charge_exchange = self.pion_cex.eval(ke);
            let inelastic = self.pion_inelastic.eval(ke);
            FateWeights {
                absorption,
                charge_exchange,
                inelastic,
                elastic: (1.0 - absorption - charge_exchange - inelastic).max(0.0),
            }
        } else if pdg::is_nucleon(pdg) {
            let charge_exchange = self.nucleon_cex.eval(ke);
            let inelastic = self.nucleon_inelastic.eval(ke);
            FateWeights {
                absorption: 0.0,
                charge_exchange,
                inelastic,
                elastic: (1.0 - charge_exchange - inelastic).max(0.0),
            }
        } else {
            FateWeights::default()
        }
    }
}
