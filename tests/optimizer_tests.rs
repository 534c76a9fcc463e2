//! Optimizer bank integration tests
//!
//! Convex bowl: 5·(4u² + v²) with u, v the rotated coordinates. Its Hessian
//! eigenvalues are 40 and 10, so plain SGD is stable for lr < 0.05.

use approx::assert_relative_eq;
use vizsim::optim::*;
use vizsim::prelude::*;
use vizsim_types::AdamParams;

fn bank(landscape: LandscapeType, optimizers: Vec<OptimizerKind>, lr: f64) -> OptimizerBank {
    OptimizerBank::new(OptimizerSettings {
        landscape_type: landscape,
        optimizers,
        shared_learning_rate: lr,
        seed: Some(9),
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_sgd_descends_convex_bowl() {
    for start in [
        Vector2::new(1.0, 1.0),
        Vector2::new(-1.5, 0.5),
        Vector2::new(0.3, -1.8),
    ] {
        let mut b = bank(LandscapeType::Convex, vec![OptimizerKind::Sgd], 0.01);
        b.launch(start);

        let outcome = b.advance(10_000);
        assert_eq!(outcome, StepOutcome::Terminal(TerminalReason::Converged));

        let run = b.run(OptimizerKind::Sgd).unwrap();
        assert_eq!(run.status, RunStatus::Converged);
        assert!(run.position().norm() < 0.05);
        for pair in run.losses.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-12, "loss rose: {:?}", pair);
        }
    }
}

#[test]
fn test_sgd_diverges_past_stability_bound() {
    let mut b = bank(LandscapeType::Convex, vec![OptimizerKind::Sgd], 0.06);
    b.launch(Vector2::new(1.0, 0.0));

    let outcome = b.advance(10_000);
    assert_eq!(outcome, StepOutcome::Terminal(TerminalReason::Diverged));
    assert!(b.run(OptimizerKind::Sgd).unwrap().is_diverged());
}

#[test]
fn test_adam_first_step_recovers_raw_gradient() {
    let mut adam = Adam::new(AdamParams::default());
    let grad = Vector2::new(0.3, -2.0);
    let next = adam.update(Vector2::new(1.0, 1.0), grad, 0.01, 0);

    let (m_hat, v_hat) = adam.bias_corrected_moments();
    assert_relative_eq!(m_hat, grad, max_relative = 1e-12);
    assert_relative_eq!(v_hat, grad.component_mul(&grad), max_relative = 1e-12);

    // m̂ / sqrt(v̂) is the gradient sign, so each coordinate moves by lr
    assert_relative_eq!(next.x, 0.99, epsilon = 1e-8);
    assert_relative_eq!(next.y, 1.01, epsilon = 1e-8);
}

#[test]
fn test_runs_are_independent() {
    let all = OptimizerKind::ALL.to_vec();
    let mut together = bank(LandscapeType::Convex, all.clone(), 0.003);
    together.launch(Vector2::new(1.5, -1.2));
    together.advance(300);

    for kind in all {
        let mut alone = bank(LandscapeType::Convex, vec![kind], 0.003);
        alone.launch(Vector2::new(1.5, -1.2));
        alone.advance(300);

        let a = together.run(kind).unwrap();
        let b = alone.run(kind).unwrap();
        assert_eq!(a.path, b.path, "{} differs when run alongside others", kind);
    }
}

#[test]
fn test_metrics_report_every_run() {
    let mut b = bank(
        LandscapeType::Rastrigin,
        vec![OptimizerKind::Muon, OptimizerKind::Shampoo],
        0.003,
    );
    b.launch(Vector2::new(1.2, -0.7));
    b.advance(10);

    let metrics = b.metrics();
    assert_eq!(metrics.landscape, LandscapeType::Rastrigin);
    assert_eq!(metrics.runs.len(), 2);
    for run in &metrics.runs {
        assert!(run.steps <= 10);
        assert!(run.loss.is_finite());
        assert_relative_eq!(run.distance_to_optimum, run.position.norm(), epsilon = 1e-12);
    }
}
