//! 2-D lattice random walk with running statistics
//!
//! The path starts at the origin and only ever grows until reset. Its length
//! (origin included) is bounded by a hard limit; past a soft limit a sticky
//! performance warning is raised. Requests at the hard limit are refused and
//! raise a cap warning that disappears on its own after a fixed delay. The
//! `*_at` variants take the host's clock for both raising and expiring that
//! warning; the plain ones read `Instant::now()`.

pub mod lattice;
pub mod theory;

pub use lattice::*;
pub use theory::*;

use serde::Serialize;
use std::time::{Duration, Instant};

use vizsim_types::WalkSettings;

use crate::error::{ConfigError, ConfigResult};
use crate::noise::UniformNoise;
use crate::simulator::{Simulator, StepOutcome, TerminalReason};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkMetrics {
    pub steps: usize,
    pub position: LatticePoint,
    pub distance: f64,
    pub bounds: BoundingBox,
    pub max_extent: i64,
    pub expected_distance: f64,
    pub rayleigh: RayleighCurve,
    /// Current distance as a fraction of the Rayleigh window
    pub distance_marker: f64,
    pub performance_warning: bool,
    pub capped: bool,
}

/// Result of a bulk step request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkOutcome {
    pub requested: usize,
    pub added: usize,
}

impl BulkOutcome {
    pub fn was_clamped(&self) -> bool {
        self.added < self.requested
    }
}

#[derive(Debug, Clone)]
pub struct RandomWalk {
    settings: WalkSettings,
    noise: UniformNoise,
    path: Vec<LatticePoint>,
    distances: Vec<f64>,
    bounds: BoundingBox,
    running: bool,
    performance_warning: bool,
    cap_warning_at: Option<Instant>,
}

impl RandomWalk {
    pub fn new(settings: WalkSettings) -> ConfigResult<Self> {
        validate(&settings)?;
        let noise = UniformNoise::new(settings.seed);
        Ok(Self {
            settings,
            noise,
            path: vec![LatticePoint::ORIGIN],
            distances: vec![0.0],
            bounds: BoundingBox::at(LatticePoint::ORIGIN),
            running: false,
            performance_warning: false,
            cap_warning_at: None,
        })
    }

    pub fn settings(&self) -> &WalkSettings {
        &self.settings
    }

    pub fn path(&self) -> &[LatticePoint] {
        &self.path
    }

    /// Distance from the origin of every stored point
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Steps taken (stored points minus the origin)
    pub fn steps(&self) -> usize {
        self.path.len() - 1
    }

    pub fn position(&self) -> LatticePoint {
        self.path.last().copied().unwrap_or(LatticePoint::ORIGIN)
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Let the host tick driver resume; refused at the cap
    pub fn start(&mut self) -> bool {
        self.start_at(Instant::now())
    }

    pub fn start_at(&mut self, now: Instant) -> bool {
        if self.at_cap() {
            self.raise_cap_warning(now);
            return false;
        }
        self.running = true;
        true
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn performance_warning(&self) -> bool {
        self.performance_warning
    }

    /// When the cap warning was last raised
    pub fn cap_warning_raised_at(&self) -> Option<Instant> {
        self.cap_warning_at
    }

    /// Whether the cap warning is still showing at `now`
    pub fn cap_warning_visible(&self, now: Instant) -> bool {
        let duration = Duration::from_millis(self.settings.warning_duration_ms);
        self.cap_warning_at
            .is_some_and(|raised| now.saturating_duration_since(raised) < duration)
    }

    /// Forget an expired cap warning
    pub fn clear_expired_warning(&mut self, now: Instant) {
        if !self.cap_warning_visible(now) {
            self.cap_warning_at = None;
        }
    }

    fn at_cap(&self) -> bool {
        self.path.len() >= self.settings.max_limit
    }

    fn raise_cap_warning(&mut self, now: Instant) {
        if self.cap_warning_at.is_none() {
            tracing::warn!(limit = self.settings.max_limit, "random walk reached its step limit");
        }
        self.cap_warning_at = Some(now);
    }

    fn push(&mut self, direction: Direction) {
        let next = self.position().moved(direction);
        self.path.push(next);
        self.distances.push(next.distance());
        self.bounds.include(next);

        if !self.performance_warning && self.path.len() > self.settings.warn_limit {
            self.performance_warning = true;
            tracing::warn!(
                length = self.path.len(),
                limit = self.settings.warn_limit,
                "random walk passed the performance warning threshold"
            );
        }
    }

    fn random_direction(&mut self) -> Direction {
        Direction::ALL[self.noise.index(Direction::ALL.len())]
    }

    fn stop_at_cap(&mut self, now: Instant) -> StepOutcome {
        self.running = false;
        self.raise_cap_warning(now);
        StepOutcome::Terminal(TerminalReason::Capped)
    }

    /// Take one step in a fixed direction, subject to the cap
    pub fn step_in(&mut self, direction: Direction) -> StepOutcome {
        self.step_in_at(direction, Instant::now())
    }

    pub fn step_in_at(&mut self, direction: Direction, now: Instant) -> StepOutcome {
        if self.at_cap() {
            return self.stop_at_cap(now);
        }
        self.push(direction);
        StepOutcome::Advanced
    }

    /// One random step; `now` stamps the cap warning if refused
    pub fn step_at(&mut self, now: Instant) -> StepOutcome {
        if self.at_cap() {
            return self.stop_at_cap(now);
        }
        let direction = self.random_direction();
        self.push(direction);
        StepOutcome::Advanced
    }

    /// Append up to `n` random steps, stopping at the cap
    ///
    /// Equivalent to `n` calls to [`Simulator::step`]. A request made at the
    /// cap adds nothing and raises the cap warning.
    pub fn add_steps(&mut self, n: usize) -> BulkOutcome {
        self.add_steps_at(n, Instant::now())
    }

    pub fn add_steps_at(&mut self, n: usize, now: Instant) -> BulkOutcome {
        if self.at_cap() {
            self.raise_cap_warning(now);
            return BulkOutcome {
                requested: n,
                added: 0,
            };
        }

        let added = n.min(self.settings.max_limit - self.path.len());
        self.path.reserve(added);
        self.distances.reserve(added);
        for _ in 0..added {
            let direction = self.random_direction();
            self.push(direction);
        }
        tracing::debug!(requested = n, added, length = self.path.len(), "bulk steps added");

        BulkOutcome { requested: n, added }
    }

    /// Add the configured bulk amount
    pub fn add_bulk(&mut self) -> BulkOutcome {
        self.add_steps(self.settings.bulk_steps)
    }

    /// Realized distance curve thinned for plotting
    ///
    /// Keeps every point up to 1000, otherwise every `ceil(len / 500)`-th
    /// point plus the final one. Items are `(step, distance)`.
    pub fn distance_series(&self) -> Vec<(usize, f64)> {
        let len = self.distances.len();
        let stride = if len > 1000 { len.div_ceil(500) } else { 1 };

        let mut series: Vec<(usize, f64)> = self
            .distances
            .iter()
            .copied()
            .enumerate()
            .step_by(stride)
            .collect();
        if (len - 1) % stride != 0 {
            series.push((len - 1, self.distances[len - 1]));
        }
        series
    }

    /// Mean squared displacement over the stored path
    pub fn mean_squared_distance(&self) -> f64 {
        self.distances.iter().map(|d| d * d).sum::<f64>() / self.distances.len() as f64
    }
}

impl Simulator for RandomWalk {
    type Metrics = WalkMetrics;

    fn step(&mut self) -> StepOutcome {
        self.step_at(Instant::now())
    }

    fn is_terminal(&self) -> bool {
        self.at_cap()
    }

    fn metrics(&self) -> WalkMetrics {
        let steps = self.steps();
        let position = self.position();
        let distance = position.distance();
        let rayleigh = RayleighCurve::new(steps);
        WalkMetrics {
            steps,
            position,
            distance,
            bounds: self.bounds,
            max_extent: self.bounds.max_extent(),
            expected_distance: expected_distance(steps),
            distance_marker: rayleigh.position_of(distance),
            rayleigh,
            performance_warning: self.performance_warning,
            capped: self.at_cap(),
        }
    }

    fn reset(&mut self) {
        tracing::info!(steps = self.steps(), "random walk reset");
        self.path.clear();
        self.path.push(LatticePoint::ORIGIN);
        self.distances.clear();
        self.distances.push(0.0);
        self.bounds = BoundingBox::at(LatticePoint::ORIGIN);
        self.running = false;
        self.performance_warning = false;
        self.cap_warning_at = None;
    }
}

fn validate(settings: &WalkSettings) -> ConfigResult<()> {
    if settings.max_limit == 0 {
        return Err(ConfigError::ZeroLimit);
    }
    if settings.warn_limit > settings.max_limit {
        return Err(ConfigError::LimitsInverted {
            warn: settings.warn_limit,
            max: settings.max_limit,
        });
    }
    Ok(())
}
