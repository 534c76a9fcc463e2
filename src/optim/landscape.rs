//! Closed-form loss surfaces on the display square [-2, 2]²

use nalgebra::{DMatrix, Vector2};
use std::f64::consts::{FRAC_1_SQRT_2, TAU};

use vizsim_types::LandscapeType;

use super::gradient::central_gradient;
use crate::error::{require_finite, ConfigError, ConfigResult};
use crate::utils::constants::GRADIENT_STEP;

/// Amplitude of the Rastrigin ripples; small so the global basin dominates
pub const RASTRIGIN_AMPLITUDE: f64 = 0.5;

/// Display range along each axis
pub const DISPLAY_RANGE: (f64, f64) = (-2.0, 2.0);

/// Heat maps saturate above this loss
pub const HEATMAP_LOSS_CAP: f64 = 50.0;

/// A differentiable scalar field with a known global minimum
pub trait LossSurface {
    fn loss(&self, p: Vector2<f64>) -> f64;

    /// Location of the global minimum
    fn optimum(&self) -> Vector2<f64>;

    /// Noise-free gradient by central differences
    fn gradient(&self, p: Vector2<f64>) -> Vector2<f64> {
        central_gradient(|q| self.loss(q), p, GRADIENT_STEP)
    }
}

impl LossSurface for LandscapeType {
    fn loss(&self, p: Vector2<f64>) -> f64 {
        let (x, y) = (p.x, p.y);
        match self {
            LandscapeType::Convex => {
                // 45° rotated ellipse, 4:1 curvature ratio
                let u = (x + y) * FRAC_1_SQRT_2;
                let v = (x - y) * FRAC_1_SQRT_2;
                5.0 * (4.0 * u * u + v * v)
            }
            LandscapeType::Rosenbrock => (1.0 - x).powi(2) + 100.0 * (y - x * x).powi(2),
            LandscapeType::Beale => {
                // Compress x so the minimum (3, 0.5) lands at (1, 0.5)
                let xb = 3.0 * x;
                (1.5 - xb + xb * y).powi(2)
                    + (2.25 - xb + xb * y * y).powi(2)
                    + (2.625 - xb + xb * y * y * y).powi(2)
            }
            LandscapeType::Rastrigin => {
                let a = RASTRIGIN_AMPLITUDE;
                2.0 * a + (x * x - a * (TAU * x).cos()) + (y * y - a * (TAU * y).cos())
            }
        }
    }

    fn optimum(&self) -> Vector2<f64> {
        match self {
            LandscapeType::Convex | LandscapeType::Rastrigin => Vector2::zeros(),
            LandscapeType::Rosenbrock => Vector2::new(1.0, 1.0),
            LandscapeType::Beale => Vector2::new(1.0, 0.5),
        }
    }
}

/// Loss sampled on a regular grid, for heat-map backgrounds
#[derive(Debug, Clone)]
pub struct LossGrid {
    /// `values[(row, col)]`: row 0 is the top edge (largest y)
    pub values: DMatrix<f64>,
    pub min: f64,
    /// Largest sampled loss, capped
    pub max: f64,
}

impl LossGrid {
    /// Loss mapped to [0, 1] between the grid minimum and the capped maximum
    pub fn normalized(&self, row: usize, col: usize) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.values[(row, col)] - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Sample `surface` on a `resolution × resolution` grid over `x_range × y_range`
pub fn sample_grid<S: LossSurface + ?Sized>(
    surface: &S,
    x_range: (f64, f64),
    y_range: (f64, f64),
    resolution: usize,
    cap: f64,
) -> ConfigResult<LossGrid> {
    for (name, (lo, hi)) in [("x", x_range), ("y", y_range)] {
        require_finite(name, lo)?;
        require_finite(name, hi)?;
        if lo >= hi {
            return Err(ConfigError::EmptyRange { name, min: lo, max: hi });
        }
    }
    if resolution < 2 {
        return Err(ConfigError::NonPositive {
            name: "resolution",
            value: resolution as f64,
        });
    }

    let step = |(lo, hi): (f64, f64), i: usize| lo + (hi - lo) * i as f64 / (resolution - 1) as f64;
    let values = DMatrix::from_fn(resolution, resolution, |row, col| {
        let x = step(x_range, col);
        let y = step(y_range, resolution - 1 - row);
        surface.loss(Vector2::new(x, y))
    });

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max).min(cap);

    Ok(LossGrid { values, min, max })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_minimum_at_optimum() {
        for landscape in LandscapeType::ALL {
            let opt = landscape.optimum();
            assert_relative_eq!(landscape.loss(opt), 0.0, epsilon = 1e-12);

            let g = landscape.gradient(opt);
            assert!(g.norm() < 1e-4, "{} gradient at optimum: {}", landscape, g);

            let offsets = [
                Vector2::new(0.1, 0.0),
                Vector2::new(0.0, -0.1),
                Vector2::new(0.07, 0.07),
            ];
            for offset in offsets {
                assert!(landscape.loss(opt + offset) > 0.0);
            }
        }
    }

    #[test]
    fn test_convex_orientation() {
        let l = LandscapeType::Convex;
        // Steep along the diagonal, shallow across it
        assert_relative_eq!(l.loss(Vector2::new(1.0, 1.0)), 40.0, epsilon = 1e-12);
        assert_relative_eq!(l.loss(Vector2::new(1.0, -1.0)), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_analytic_gradients() {
        let p = Vector2::new(-0.5, 0.8);

        let g = LandscapeType::Rosenbrock.gradient(p);
        let gx = -2.0 * (1.0 - p.x) - 400.0 * p.x * (p.y - p.x * p.x);
        let gy = 200.0 * (p.y - p.x * p.x);
        assert_relative_eq!(g.x, gx, epsilon = 1e-5);
        assert_relative_eq!(g.y, gy, epsilon = 1e-5);

        let g = LandscapeType::Rastrigin.gradient(p);
        let d = |v: f64| 2.0 * v + RASTRIGIN_AMPLITUDE * TAU * (TAU * v).sin();
        assert_relative_eq!(g.x, d(p.x), epsilon = 1e-5);
        assert_relative_eq!(g.y, d(p.y), epsilon = 1e-5);
    }

    #[test]
    fn test_sample_grid_orientation() {
        let rosenbrock = LandscapeType::Rosenbrock;
        let grid =
            sample_grid(&rosenbrock, DISPLAY_RANGE, DISPLAY_RANGE, 5, HEATMAP_LOSS_CAP).unwrap();

        // Top-left corner is (-2, 2)
        assert_relative_eq!(grid.values[(0, 0)], rosenbrock.loss(Vector2::new(-2.0, 2.0)));
        // Centre is the origin
        assert_relative_eq!(grid.values[(2, 2)], 1.0);
        assert_eq!(grid.max, HEATMAP_LOSS_CAP);
        assert_eq!(grid.normalized(0, 4), 1.0);
    }

    #[test]
    fn test_sample_grid_rejects_empty_range() {
        assert!(matches!(
            sample_grid(&LandscapeType::Convex, (1.0, 1.0), DISPLAY_RANGE, 10, 50.0),
            Err(ConfigError::EmptyRange { name: "x", .. })
        ));
        let too_coarse = sample_grid(&LandscapeType::Convex, DISPLAY_RANGE, DISPLAY_RANGE, 1, 50.0);
        assert!(too_coarse.is_err());
    }
}
