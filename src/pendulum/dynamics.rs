//! Double-pendulum equations of motion and energy bookkeeping
//!
//! Angles are measured from the downward vertical; positive angles swing the
//! bob to the right. Positions use screen orientation (y grows downward) so a
//! host can draw them directly; potential energy measures height upward from
//! the lowest reachable point.

use nalgebra::{Point2, Vector4};
use serde::Serialize;
use std::f64::consts::{PI, TAU};

use crate::utils::constants::{PENDULUM_MAX_ACCELERATION, PENDULUM_MIN_KINETIC_ENERGY};

/// Arm lengths, bob masses and gravity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendulumParams {
    pub l1: f64,
    pub l2: f64,
    pub m1: f64,
    pub m2: f64,
    pub g: f64,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            l1: 1.0,
            l2: 1.0,
            m1: 1.0,
            m2: 1.0,
            g: 1.0,
        }
    }
}

/// Angles and angular velocities of one double pendulum
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendulumState {
    pub angle1: f64,
    pub angle2: f64,
    pub velocity1: f64,
    pub velocity2: f64,
}

impl PendulumState {
    /// Released from rest at the given angles
    pub fn at_rest(angle1: f64, angle2: f64) -> Self {
        Self {
            angle1,
            angle2,
            velocity1: 0.0,
            velocity2: 0.0,
        }
    }

    /// (θ1, θ2, ω1, ω2)
    pub fn as_vector(&self) -> Vector4<f64> {
        Vector4::new(self.angle1, self.angle2, self.velocity1, self.velocity2)
    }

    /// Euclidean distance in the 4-D phase space
    pub fn phase_distance(&self, other: &PendulumState) -> f64 {
        (self.as_vector() - other.as_vector()).norm()
    }

    pub fn is_finite(&self) -> bool {
        self.as_vector().iter().all(|v| v.is_finite())
    }
}

/// Keep an angle within (-2π, 2π] so it cannot grow without bound
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    if angle > TAU {
        angle - TAU
    } else if angle < -TAU {
        angle + TAU
    } else {
        angle
    }
}

impl PendulumParams {
    /// Angular accelerations (α1, α2)
    pub fn accelerations(&self, s: &PendulumState) -> (f64, f64) {
        let Self { l1, l2, m1, m2, g } = *self;
        let (a1, a2, w1, w2) = (s.angle1, s.angle2, s.velocity1, s.velocity2);
        let delta = a1 - a2;
        let shared = 2.0 * m1 + m2 - m2 * (2.0 * a1 - 2.0 * a2).cos();

        let num1 = -g * (2.0 * m1 + m2) * a1.sin();
        let num2 = -m2 * g * (a1 - 2.0 * a2).sin();
        let num3 = -2.0 * delta.sin() * m2;
        let num4 = w2 * w2 * l2 + w1 * w1 * l1 * delta.cos();
        let acc1 = (num1 + num2 + num3 * num4) / (l1 * shared);

        let num5 = 2.0 * delta.sin();
        let num6 = w1 * w1 * l1 * (m1 + m2);
        let num7 = g * (m1 + m2) * a1.cos();
        let num8 = w2 * w2 * l2 * m2 * delta.cos();
        let acc2 = num5 * (num6 + num7 + num8) / (l2 * shared);

        (acc1, acc2)
    }

    /// Bob positions relative to the pivot, y pointing down
    pub fn bob_positions(&self, s: &PendulumState) -> (Point2<f64>, Point2<f64>) {
        let inner = Point2::new(self.l1 * s.angle1.sin(), self.l1 * s.angle1.cos());
        let outer = Point2::new(
            inner.x + self.l2 * s.angle2.sin(),
            inner.y + self.l2 * s.angle2.cos(),
        );
        (inner, outer)
    }

    pub fn kinetic_energy(&self, s: &PendulumState) -> f64 {
        let v1x = self.l1 * s.velocity1 * s.angle1.cos();
        let v1y = -self.l1 * s.velocity1 * s.angle1.sin();
        let v2x = v1x + self.l2 * s.velocity2 * s.angle2.cos();
        let v2y = v1y - self.l2 * s.velocity2 * s.angle2.sin();
        0.5 * self.m1 * (v1x * v1x + v1y * v1y) + 0.5 * self.m2 * (v2x * v2x + v2y * v2y)
    }

    /// Height of each bob above the lowest reachable point (`L1 + L2` below
    /// the pivot); hanging straight down this is `m1·g·L2`
    pub fn potential_energy(&self, s: &PendulumState) -> f64 {
        let reach = self.l1 + self.l2;
        let y1 = -self.l1 * s.angle1.cos();
        let y2 = y1 - self.l2 * s.angle2.cos();
        self.m1 * self.g * (y1 + reach) + self.m2 * self.g * (y2 + reach)
    }

    pub fn total_energy(&self, s: &PendulumState) -> f64 {
        self.kinetic_energy(s) + self.potential_energy(s)
    }

    /// Upper bound on the phase-space distance between two pendulums at this energy
    pub fn max_divergence(&self, energy: f64) -> f64 {
        let angular = 2.0 * TAU;
        let velocity = 2.0 * (2.0 * energy / (self.m1 + self.m2)).max(0.0).sqrt();
        (2.0 * angular * angular + 2.0 * velocity * velocity).sqrt()
    }

    /// Expected distance between two independent random states at this energy
    ///
    /// Angles uniform on [-π, π] give E[Δθ²] = 2π²/3 per axis; velocities are
    /// treated as Gaussian with standard deviation sqrt(E / m_total).
    pub fn random_expected_divergence(&self, energy: f64) -> f64 {
        let angular = PI * (2.0_f64 / 3.0).sqrt();
        let velocity = 2.0_f64.sqrt() * (energy / (self.m1 + self.m2)).max(0.0).sqrt();
        (2.0 * angular * angular + 2.0 * velocity * velocity).sqrt()
    }

    /// Advance one semi-implicit Euler step
    ///
    /// Velocities are updated first and the new velocities move the angles.
    /// With a `target_energy`, velocities are then rescaled so the total energy
    /// matches it, provided there is enough kinetic energy to scale and the
    /// target lies above the current potential energy.
    ///
    /// Returns `None` when the update is not finite; the caller keeps the old
    /// state in that case.
    pub fn step(
        &self,
        s: &PendulumState,
        dt: f64,
        target_energy: Option<f64>,
    ) -> Option<PendulumState> {
        let (acc1, acc2) = self.accelerations(s);
        if !acc1.is_finite() || !acc2.is_finite() {
            return None;
        }
        let acc1 = acc1.clamp(-PENDULUM_MAX_ACCELERATION, PENDULUM_MAX_ACCELERATION);
        let acc2 = acc2.clamp(-PENDULUM_MAX_ACCELERATION, PENDULUM_MAX_ACCELERATION);

        let velocity1 = s.velocity1 + acc1 * dt;
        let velocity2 = s.velocity2 + acc2 * dt;
        let mut next = PendulumState {
            angle1: wrap_angle(s.angle1 + velocity1 * dt),
            angle2: wrap_angle(s.angle2 + velocity2 * dt),
            velocity1,
            velocity2,
        };

        if let Some(target) = target_energy {
            let kinetic = self.kinetic_energy(&next);
            let headroom = target - self.potential_energy(&next);
            if kinetic > PENDULUM_MIN_KINETIC_ENERGY && headroom > 0.0 {
                let factor = (headroom / kinetic).sqrt();
                next.velocity1 *= factor;
                next.velocity2 *= factor;
            }
        }

        next.is_finite().then_some(next)
    }
}
