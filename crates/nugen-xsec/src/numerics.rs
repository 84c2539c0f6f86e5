//! Grid integration and maximisation helpers shared by the model catalogue
//! and the max cross-section cache.

use serde::{Deserialize, Serialize};

/// Uniform one-dimensional grid with `points` nodes spanning `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnifGrid {
    /// Lower edge.
    pub min: f64,
    /// Upper edge.
    pub max: f64,
    /// Number of nodes (at least two for a usable grid).
    pub points: usize,
}

impl UnifGrid {
    /// Creates a grid.
    pub fn new(min: f64, max: f64, points: usize) -> Self {
        Self { min, max, points }
    }

    /// True when the grid spans no interval.
    pub fn is_degenerate(&self) -> bool {
        self.points < 2 || !(self.max > self.min) || !self.min.is_finite() || !self.max.is_finite()
    }

    /// Node spacing.
    pub fn step(&self) -> f64 {
        if self.points < 2 {
            0.0
        } else {
            (self.max - self.min) / (self.points - 1) as f64
        }
    }

    /// Coordinate of node `i`.
    pub fn coord(&self, i: usize) -> f64 {
        self.min + i as f64 * self.step()
    }
}

/// Function values sampled on a [`UnifGrid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionMap {
    grid: UnifGrid,
    values: Vec<f64>,
}

impl FunctionMap {
    /// Samples `f` on every node. Non-finite samples are stored as zero.
    pub fn sample(grid: UnifGrid, f: impl Fn(f64) -> f64) -> Self {
        let values = (0..grid.points)
            .map(|i| {
                let v = f(grid.coord(i));
                if v.is_finite() {
                    v
                } else {
                    0.0
                }
            })
            .collect();
        Self { grid, values }
    }

    /// Grid the map is defined on.
    pub fn grid(&self) -> &UnifGrid {
        &self.grid
    }

    /// Sampled values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Quadrature rule applied to a function map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrationRule {
    /// Composite Simpson rule (trapezoid on a trailing odd interval).
    #[default]
    Simpson,
    /// Composite trapezoid rule.
    Trapezoid,
}

/// Integrator over uniform grids with a configurable resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridIntegrator {
    /// Quadrature rule.
    pub rule: IntegrationRule,
    /// Number of grid nodes per dimension.
    pub points: usize,
}

impl Default for GridIntegrator {
    fn default() -> Self {
        Self {
            rule: IntegrationRule::Simpson,
            points: 201,
        }
    }
}

impl GridIntegrator {
    /// Creates an integrator; fewer than three nodes are bumped to three.
    pub fn new(rule: IntegrationRule, points: usize) -> Self {
        Self {
            rule,
            points: points.max(3),
        }
    }

    /// Integrates a pre-sampled map. Degenerate grids integrate to zero.
    pub fn integrate_map(&self, map: &FunctionMap) -> f64 {
        let grid = map.grid();
        if grid.is_degenerate() {
            return 0.0;
        }
        let h = grid.step();
        let values = map.values();
        let n = values.len();
        let total = match self.rule {
            IntegrationRule::Trapezoid => trapezoid(values, h),
            IntegrationRule::Simpson => {
                if n < 3 {
                    trapezoid(values, h)
                } else if n % 2 == 1 {
                    simpson(values, h)
                } else {
                    simpson(&values[..n - 1], h) + 0.5 * h * (values[n - 2] + values[n - 1])
                }
            }
        };
        if total.is_finite() {
            total
        } else {
            0.0
        }
    }

    /// Integrates `f` over `[lo, hi]`; returns zero when `hi <= lo`.
    pub fn integrate(&self, f: impl Fn(f64) -> f64, lo: f64, hi: f64) -> f64 {
        let grid = UnifGrid::new(lo, hi, self.points);
        if grid.is_degenerate() {
            return 0.0;
        }
        self.integrate_map(&FunctionMap::sample(grid, f))
    }

    /// Integrates `f(x, y)` over `x ∈ [lo, hi]` and `y ∈ y_range(x)`.
    pub fn integrate_2d(
        &self,
        f: impl Fn(f64, f64) -> f64,
        lo: f64,
        hi: f64,
        y_range: impl Fn(f64) -> (f64, f64),
    ) -> f64 {
        self.integrate(
            |x| {
                let (y_lo, y_hi) = y_range(x);
                self.integrate(|y| f(x, y), y_lo, y_hi)
            },
            lo,
            hi,
        )
    }
}

fn trapezoid(values: &[f64], h: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let inner: f64 = values[1..values.len() - 1].iter().sum();
    h * (0.5 * (values[0] + values[values.len() - 1]) + inner)
}

fn simpson(values: &[f64], h: f64) -> f64 {
    let n = values.len();
    let mut sum = values[0] + values[n - 1];
    for (i, v) in values.iter().enumerate().take(n - 1).skip(1) {
        sum += if i % 2 == 1 { 4.0 * v } else { 2.0 * v };
    }
    sum * h / 3.0
}

/// Maximisation settings: a coarse scan followed by shrinking refinement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxSearch {
    /// Nodes per dimension in the coarse scan.
    pub coarse_points: usize,
    /// Refinement rounds around the best node.
    pub refine_rounds: usize,
}

impl Default for MaxSearch {
    fn default() -> Self {
        Self {
            coarse_points: 41,
            refine_rounds: 6,
        }
    }
}

/// Best point found by a maximisation search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxPoint {
    /// Coordinates of the best point (unused trailing entries are zero).
    pub at: [f64; 2],
    /// Function value at the best point; zero when nothing positive was found.
    pub value: f64,
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

impl MaxSearch {
    /// Maximises `f` over `[lo, hi]`.
    pub fn maximize_1d(&self, f: impl Fn(f64) -> f64, lo: f64, hi: f64) -> MaxPoint {
        let mut best = MaxPoint {
            at: [lo, 0.0],
            value: 0.0,
        };
        if !(hi > lo) || !lo.is_finite() || !hi.is_finite() {
            return best;
        }
        let points = self.coarse_points.max(3);
        let (mut a, mut b) = (lo, hi);
        for _ in 0..=self.refine_rounds {
            let h = (b - a) / (points - 1) as f64;
            for i in 0..points {
                let x = a + i as f64 * h;
                let v = finite_or_zero(f(x));
                if v > best.value {
                    best = MaxPoint { at: [x, 0.0], value: v };
                }
            }
            a = (best.at[0] - h).max(lo);
            b = (best.at[0] + h).min(hi);
            if !(b > a) {
                break;
            }
        }
        best
    }

    /// Maximises `f(x, y)` over `x ∈ [lo, hi]`, `y ∈ y_range(x)`.
    pub fn maximize_2d(
        &self,
        f: impl Fn(f64, f64) -> f64,
        lo: f64,
        hi: f64,
        y_range: impl Fn(f64) -> (f64, f64),
    ) -> MaxPoint {
        let mut best = MaxPoint {
            at: [lo, 0.0],
            value: 0.0,
        };
        if !(hi > lo) || !lo.is_finite() || !hi.is_finite() {
            return best;
        }
        let points = self.coarse_points.max(3);
        let hx = (hi - lo) / (points - 1) as f64;
        let mut hy = 0.0;
        for i in 0..points {
            let x = lo + i as f64 * hx;
            let (y_lo, y_hi) = y_range(x);
            if !(y_hi > y_lo) {
                continue;
            }
            let step = (y_hi - y_lo) / (points - 1) as f64;
            for j in 0..points {
                let y = y_lo + j as f64 * step;
                let v = finite_or_zero(f(x, y));
                if v > best.value {
                    best = MaxPoint { at: [x, y], value: v };
                    hy = step;
                }
            }
        }
        if best.value <= 0.0 {
            return best;
        }
        let (mut dx, mut dy) = (hx, hy);
        for _ in 0..self.refine_rounds {
            let [cx, cy] = best.at;
            let fine = 5usize;
            for i in 0..fine {
                let x = (cx - dx + 2.0 * dx * i as f64 / (fine - 1) as f64).clamp(lo, hi);
                let (y_lo, y_hi) = y_range(x);
                for j in 0..fine {
                    let y = cy - dy + 2.0 * dy * j as f64 / (fine - 1) as f64;
                    if y < y_lo || y > y_hi {
                        continue;
                    }
                    let v = finite_or_zero(f(x, y));
                    if v > best.value {
                        best = MaxPoint { at: [x, y], value: v };
                    }
                }
            }
            dx *= 0.5;
            dy *= 0.5;
        }
        best
    }
}
