//! Core Simulator trait
//!
//! Every simulator owns its state and advances by exactly one tick per
//! [`Simulator::step`] call. The host decides when to call it (animation
//! frame, timer, benchmark loop); nothing in this crate sleeps or schedules.

use serde::Serialize;

/// Why a simulator stopped producing new states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalReason {
    /// Every run reached its target
    Converged,
    /// Every run left the numerically sane region
    Diverged,
    /// A resource cap was reached
    Capped,
    /// Nothing left to advance (no runs, or runs ended with mixed outcomes)
    Finished,
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepOutcome {
    /// State moved forward
    Advanced,
    /// The tick was a no-op (e.g. a non-finite update was discarded)
    #[default]
    Unchanged,
    /// The simulator is done; further ticks are no-ops
    Terminal(TerminalReason),
}

impl StepOutcome {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepOutcome::Terminal(_))
    }
}

/// Frame-stepped simulator
///
/// # Example
///
/// ```ignore
/// let mut walk = RandomWalk::new(WalkSettings::default())?;
/// while !walk.is_terminal() {
///     walk.step();
/// }
/// println!("{:?}", walk.metrics());
/// ```
pub trait Simulator {
    /// Derived quantities exposed after each tick
    type Metrics;

    /// Advance exactly one tick
    fn step(&mut self) -> StepOutcome;

    /// Whether further ticks would be no-ops
    fn is_terminal(&self) -> bool {
        false
    }

    /// Snapshot of the derived metrics
    fn metrics(&self) -> Self::Metrics;

    /// Return to a freshly-initialized state from the current settings
    fn reset(&mut self);

    /// Run up to `ticks` steps, stopping early on a terminal outcome
    fn advance(&mut self, ticks: usize) -> StepOutcome {
        let mut outcome = StepOutcome::Unchanged;
        for _ in 0..ticks {
            outcome = self.step();
            if outcome.is_terminal() {
                break;
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Countdown {
        remaining: usize,
    }

    impl Simulator for Countdown {
        type Metrics = usize;

        fn step(&mut self) -> StepOutcome {
            if self.remaining == 0 {
                return StepOutcome::Terminal(TerminalReason::Finished);
            }
            self.remaining -= 1;
            StepOutcome::Advanced
        }

        fn is_terminal(&self) -> bool {
            self.remaining == 0
        }

        fn metrics(&self) -> usize {
            self.remaining
        }

        fn reset(&mut self) {
            self.remaining = 3;
        }
    }

    #[test]
    fn test_advance_stops_at_terminal() {
        let mut sim = Countdown { remaining: 3 };
        assert_eq!(sim.advance(10), StepOutcome::Terminal(TerminalReason::Finished));
        assert_eq!(sim.metrics(), 0);
        assert!(sim.is_terminal());

        sim.reset();
        assert_eq!(sim.advance(2), StepOutcome::Advanced);
        assert_eq!(sim.metrics(), 1);
    }

    #[test]
    fn test_advance_zero_ticks() {
        let mut sim = Countdown { remaining: 3 };
        assert_eq!(sim.advance(0), StepOutcome::Unchanged);
        assert_eq!(sim.metrics(), 3);
    }
}
