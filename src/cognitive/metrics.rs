//! Population-level order parameters of the cognitive maps

use nalgebra::DMatrix;
use serde::Serialize;

use crate::utils::constants::{DOMAIN_WALL_OVERLAP, TOLERANCE};

/// Frobenius inner product ⟨A, B⟩ = Σ a_ij b_ij
#[inline]
pub fn frobenius_product(a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
    a.dot(b)
}

/// Scale `m` to unit Frobenius norm; a zero matrix is left as is
pub fn normalize_frobenius(m: &mut DMatrix<f64>) {
    let norm = m.norm();
    if norm > TOLERANCE {
        *m /= norm;
    }
}

/// ‖X‖_F² / σ_max(X)², between 1 and min(rows, cols)
///
/// Returns 0 for the zero matrix.
pub fn stable_rank(m: &DMatrix<f64>) -> f64 {
    let spectral = m.singular_values().max();
    if spectral <= TOLERANCE {
        return 0.0;
    }
    m.norm_squared() / (spectral * spectral)
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveMetrics {
    pub time: f64,
    /// Mean |⟨X_i, X_j⟩| over all agent pairs
    pub mutual_intelligibility: f64,
    /// Strongest mean alignment of a single concept row across pairs
    pub nematic_order: f64,
    /// Mean stable rank of the agents' maps
    pub average_rank: f64,
    /// Fraction of agent pairs with overlap below 0.1
    pub domain_walls: f64,
}

impl CognitiveMetrics {
    pub fn compute<'a, I>(maps: I, time: f64) -> Self
    where
        I: IntoIterator<Item = &'a DMatrix<f64>>,
    {
        let maps: Vec<&DMatrix<f64>> = maps.into_iter().collect();
        let n = maps.len();
        if n == 0 {
            return Self { time, ..Default::default() };
        }

        let concepts = maps[0].nrows();
        let mut total_overlap = 0.0;
        let mut walls = 0usize;
        let mut row_alignment = vec![0.0; concepts];
        let mut pairs = 0usize;

        for i in 0..n {
            for j in (i + 1)..n {
                let overlap = frobenius_product(maps[i], maps[j]).abs();
                total_overlap += overlap;
                if overlap < DOMAIN_WALL_OVERLAP {
                    walls += 1;
                }
                for (c, alignment) in row_alignment.iter_mut().enumerate() {
                    *alignment += maps[i].row(c).dot(&maps[j].row(c)).abs();
                }
                pairs += 1;
            }
        }

        let average_rank = maps.iter().map(|m| stable_rank(m)).sum::<f64>() / n as f64;

        if pairs == 0 {
            return Self {
                time,
                average_rank,
                ..Default::default()
            };
        }

        let pairs_f = pairs as f64;
        Self {
            time,
            mutual_intelligibility: total_overlap / pairs_f,
            nematic_order: row_alignment.iter().fold(0.0_f64, |acc, a| acc.max(a / pairs_f)),
            average_rank,
            domain_walls: walls as f64 / pairs_f,
        }
    }
}
