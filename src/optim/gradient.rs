//! Finite-difference gradients of scalar 2-D fields

use nalgebra::Vector2;

/// Gradient by central differences with a fixed step `h`
///
/// # Example
///
/// ```ignore
/// let g = central_gradient(|p| p.x * p.x + 3.0 * p.y, Vector2::new(1.0, 0.0), 1e-4);
/// // g ≈ (2, 3)
/// ```
pub fn central_gradient<F>(func: F, p: Vector2<f64>, h: f64) -> Vector2<f64>
where
    F: Fn(Vector2<f64>) -> f64,
{
    let mut grad = Vector2::zeros();

    for i in 0..2 {
        let mut p_plus = p;
        let mut p_minus = p;

        p_plus[i] += h;
        p_minus[i] -= h;

        grad[i] = (func(p_plus) - func(p_minus)) / (2.0 * h);
    }

    grad
}

/// Gradient by forward differences with a fixed step `h`
pub fn forward_gradient<F>(func: F, p: Vector2<f64>, h: f64) -> Vector2<f64>
where
    F: Fn(Vector2<f64>) -> f64,
{
    let f0 = func(p);
    let mut grad = Vector2::zeros();

    for i in 0..2 {
        let mut p_plus = p;
        p_plus[i] += h;
        grad[i] = (func(p_plus) - f0) / h;
    }

    grad
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_central_gradient_quadratic() {
        let f = |p: Vector2<f64>| 3.0 * p.x * p.x + p.x * p.y - 2.0 * p.y * p.y;
        let p = Vector2::new(0.7, -1.3);

        let g = central_gradient(f, p, 1e-4);
        // Exact for quadratics up to rounding
        assert_relative_eq!(g.x, 6.0 * 0.7 - 1.3, epsilon = 1e-8);
        assert_relative_eq!(g.y, 0.7 + 4.0 * 1.3, epsilon = 1e-8);
    }

    #[test]
    fn test_forward_gradient_linear() {
        let f = |p: Vector2<f64>| 2.0 * p.x - 5.0 * p.y + 1.0;
        let g = forward_gradient(f, Vector2::new(10.0, 20.0), 1.0);
        assert_relative_eq!(g.x, 2.0, epsilon = 1e-12);
        assert_relative_eq!(g.y, -5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_forward_gradient_bias() {
        // Forward differences carry an O(h) error: d/dx x² at 0 with h = 1 gives 1
        let g = forward_gradient(|p: Vector2<f64>| p.x * p.x, Vector2::zeros(), 1.0);
        assert_relative_eq!(g.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(g.y, 0.0);
    }
}
