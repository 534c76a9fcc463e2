//! Optimizer update rules
//!
//! Each rule owns its accumulators and maps (position, gradient) to the next
//! position. Rules never see the loss surface, only the gradients handed to
//! them, so they can be exercised on synthetic gradients in isolation.

use nalgebra::{Matrix2, Vector2};
use std::fmt;

use vizsim_types::{
    AdamParams, AdamWParams, Hyperparameters, MomentumParams, MuonParams, OptimizerKind,
    RmsPropParams, ShampooParams,
};

use crate::utils::constants::{MUON_NORM_EPSILON, SHAMPOO_DECAY};

/// One optimizer's stateful update
pub trait UpdateRule: fmt::Debug + Send {
    fn kind(&self) -> OptimizerKind;

    /// Next position after one update
    ///
    /// `iteration` counts updates already recorded on the run's path,
    /// including its start point.
    fn update(
        &mut self,
        position: Vector2<f64>,
        grad: Vector2<f64>,
        lr: f64,
        iteration: usize,
    ) -> Vector2<f64>;

    /// Clear accumulators
    fn reset(&mut self);
}

/// Build the rule for `kind` with its hyperparameters
pub fn build_rule(kind: OptimizerKind, hp: &Hyperparameters) -> Box<dyn UpdateRule> {
    match kind {
        OptimizerKind::Sgd => Box::new(Sgd),
        OptimizerKind::SgdMomentum => Box::new(SgdMomentum::new(hp.sgd_momentum)),
        OptimizerKind::RmsProp => Box::new(RmsProp::new(hp.rmsprop)),
        OptimizerKind::Adam => Box::new(Adam::new(hp.adam)),
        OptimizerKind::AdamW => Box::new(AdamW::new(hp.adamw)),
        OptimizerKind::Muon => Box::new(Muon::new(hp.muon)),
        OptimizerKind::Shampoo => Box::new(Shampoo::new(hp.shampoo)),
    }
}

/// Plain gradient descent
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgd;

impl UpdateRule for Sgd {
    fn kind(&self) -> OptimizerKind {
        OptimizerKind::Sgd
    }

    fn update(
        &mut self,
        position: Vector2<f64>,
        grad: Vector2<f64>,
        lr: f64,
        _iteration: usize,
    ) -> Vector2<f64> {
        position - lr * grad
    }

    fn reset(&mut self) {}
}

/// Heavy-ball momentum: v ← μv + g
#[derive(Debug, Clone)]
pub struct SgdMomentum {
    pub momentum: f64,
    velocity: Vector2<f64>,
}

impl SgdMomentum {
    pub fn new(params: MomentumParams) -> Self {
        Self {
            momentum: params.momentum,
            velocity: Vector2::zeros(),
        }
    }

    pub fn velocity(&self) -> Vector2<f64> {
        self.velocity
    }
}

impl UpdateRule for SgdMomentum {
    fn kind(&self) -> OptimizerKind {
        OptimizerKind::SgdMomentum
    }

    fn update(
        &mut self,
        position: Vector2<f64>,
        grad: Vector2<f64>,
        lr: f64,
        _iteration: usize,
    ) -> Vector2<f64> {
        self.velocity = self.momentum * self.velocity + grad;
        position - lr * self.velocity
    }

    fn reset(&mut self) {
        self.velocity = Vector2::zeros();
    }
}

/// RMSprop with an exponential average of squared gradients
#[derive(Debug, Clone)]
pub struct RmsProp {
    pub alpha: f64,
    pub epsilon: f64,
    square_avg: Vector2<f64>,
}

impl RmsProp {
    pub fn new(params: RmsPropParams) -> Self {
        Self {
            alpha: params.alpha,
            epsilon: params.epsilon,
            square_avg: Vector2::zeros(),
        }
    }
}

impl UpdateRule for RmsProp {
    fn kind(&self) -> OptimizerKind {
        OptimizerKind::RmsProp
    }

    fn update(
        &mut self,
        position: Vector2<f64>,
        grad: Vector2<f64>,
        lr: f64,
        _iteration: usize,
    ) -> Vector2<f64> {
        self.square_avg =
            self.alpha * self.square_avg + (1.0 - self.alpha) * grad.component_mul(&grad);
        let denom = self.square_avg.map(|s| s.sqrt() + self.epsilon);
        position - lr * grad.component_div(&denom)
    }

    fn reset(&mut self) {
        self.square_avg = Vector2::zeros();
    }
}

/// First and second moment estimates shared by Adam and AdamW
#[derive(Debug, Clone)]
struct Moments {
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    m: Vector2<f64>,
    v: Vector2<f64>,
    t: usize,
}

impl Moments {
    fn new(beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            beta1,
            beta2,
            epsilon,
            m: Vector2::zeros(),
            v: Vector2::zeros(),
            t: 0,
        }
    }

    /// Accumulate `grad` and return the bias-corrected step direction
    fn direction(&mut self, grad: Vector2<f64>, iteration: usize) -> Vector2<f64> {
        self.t = iteration + 1;
        self.m = self.beta1 * self.m + (1.0 - self.beta1) * grad;
        self.v = self.beta2 * self.v + (1.0 - self.beta2) * grad.component_mul(&grad);

        let (m_hat, v_hat) = self.bias_corrected();
        m_hat.component_div(&v_hat.map(|v| v.sqrt() + self.epsilon))
    }

    fn bias_corrected(&self) -> (Vector2<f64>, Vector2<f64>) {
        if self.t == 0 {
            return (self.m, self.v);
        }
        let t = self.t as i32;
        (
            self.m / (1.0 - self.beta1.powi(t)),
            self.v / (1.0 - self.beta2.powi(t)),
        )
    }

    fn reset(&mut self) {
        self.m = Vector2::zeros();
        self.v = Vector2::zeros();
        self.t = 0;
    }
}

/// Adam with bias correction; the timestep is `iteration + 1`
#[derive(Debug, Clone)]
pub struct Adam {
    moments: Moments,
}

impl Adam {
    pub fn new(params: AdamParams) -> Self {
        Self {
            moments: Moments::new(params.beta1, params.beta2, params.epsilon),
        }
    }

    /// Raw (m, v) accumulators
    pub fn moments(&self) -> (Vector2<f64>, Vector2<f64>) {
        (self.moments.m, self.moments.v)
    }

    /// (m̂, v̂) at the timestep of the most recent update
    pub fn bias_corrected_moments(&self) -> (Vector2<f64>, Vector2<f64>) {
        self.moments.bias_corrected()
    }
}

impl UpdateRule for Adam {
    fn kind(&self) -> OptimizerKind {
        OptimizerKind::Adam
    }

    fn update(
        &mut self,
        position: Vector2<f64>,
        grad: Vector2<f64>,
        lr: f64,
        iteration: usize,
    ) -> Vector2<f64> {
        position - lr * self.moments.direction(grad, iteration)
    }

    fn reset(&mut self) {
        self.moments.reset();
    }
}

/// Adam with decoupled weight decay
#[derive(Debug, Clone)]
pub struct AdamW {
    pub weight_decay: f64,
    moments: Moments,
}

impl AdamW {
    pub fn new(params: AdamWParams) -> Self {
        Self {
            weight_decay: params.weight_decay,
            moments: Moments::new(params.beta1, params.beta2, params.epsilon),
        }
    }
}

impl UpdateRule for AdamW {
    fn kind(&self) -> OptimizerKind {
        OptimizerKind::AdamW
    }

    fn update(
        &mut self,
        position: Vector2<f64>,
        grad: Vector2<f64>,
        lr: f64,
        iteration: usize,
    ) -> Vector2<f64> {
        let direction = self.moments.direction(grad, iteration);
        position - lr * (direction + self.weight_decay * position)
    }

    fn reset(&mut self) {
        self.moments.reset();
    }
}

/// Momentum with a normalized step whose length grows as sqrt(‖u‖)
#[derive(Debug, Clone)]
pub struct Muon {
    pub momentum: f64,
    velocity: Vector2<f64>,
}

impl Muon {
    pub fn new(params: MuonParams) -> Self {
        Self {
            momentum: params.momentum,
            velocity: Vector2::zeros(),
        }
    }
}

impl UpdateRule for Muon {
    fn kind(&self) -> OptimizerKind {
        OptimizerKind::Muon
    }

    fn update(
        &mut self,
        position: Vector2<f64>,
        grad: Vector2<f64>,
        lr: f64,
        _iteration: usize,
    ) -> Vector2<f64> {
        let u = self.momentum * self.velocity + grad;
        let norm = u.norm();
        let direction = u / (norm + MUON_NORM_EPSILON);
        self.velocity = u;
        position - lr * norm.sqrt() * direction
    }

    fn reset(&mut self) {
        self.velocity = Vector2::zeros();
    }
}

/// Diagonal Shampoo: per-coordinate second moments, inverse fourth-root scaling
///
/// Only the diagonal of the preconditioner is ever updated; off-diagonal
/// entries stay zero.
#[derive(Debug, Clone)]
pub struct Shampoo {
    pub epsilon: f64,
    pub update_freq: usize,
    preconditioner: Matrix2<f64>,
}

impl Shampoo {
    pub fn new(params: ShampooParams) -> Self {
        Self {
            epsilon: params.epsilon,
            update_freq: params.update_freq.max(1),
            preconditioner: Matrix2::identity() * params.epsilon,
        }
    }

    pub fn preconditioner(&self) -> &Matrix2<f64> {
        &self.preconditioner
    }
}

impl UpdateRule for Shampoo {
    fn kind(&self) -> OptimizerKind {
        OptimizerKind::Shampoo
    }

    fn update(
        &mut self,
        position: Vector2<f64>,
        grad: Vector2<f64>,
        lr: f64,
        iteration: usize,
    ) -> Vector2<f64> {
        if iteration % self.update_freq == 0 {
            for i in 0..2 {
                self.preconditioner[(i, i)] = SHAMPOO_DECAY * self.preconditioner[(i, i)]
                    + (1.0 - SHAMPOO_DECAY) * grad[i] * grad[i];
            }
        }
        let scale = Vector2::new(self.preconditioner[(0, 0)], self.preconditioner[(1, 1)])
            .map(|h| h.powf(0.25));
        position - lr * grad.component_div(&scale)
    }

    fn reset(&mut self) {
        self.preconditioner = Matrix2::identity() * self.epsilon;
    }
}
