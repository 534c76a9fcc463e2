//! Chinchilla-style scaling law and its compute-optimal frontier
//!
//! Loss is modelled as `L(N, C) = L0 + (Nc/N)^αN + (Dc/D)^αD` where the
//! training tokens follow from the budget as `D = C / 6N`. Everything here is
//! closed-form; there is no state to step.

use serde::Serialize;

use vizsim_types::ScalingSettings;

use crate::error::{require_positive, ConfigError, ConfigResult};

/// One row of the frontier table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontierPoint {
    /// Parameter count
    pub n: f64,
    /// Compute budget at which `n` is loss-optimal
    pub optimal_compute: f64,
    pub optimal_loss: f64,
    /// Tokens seen at the optimal budget
    pub optimal_data: f64,
    /// Loss with unlimited data
    pub infinite_loss: f64,
    /// Loss at each of the configured fixed budgets, in order
    pub fixed_compute_losses: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalingLaw {
    settings: ScalingSettings,
}

impl ScalingLaw {
    pub fn new(settings: ScalingSettings) -> ConfigResult<Self> {
        require_positive("l0", settings.l0)?;
        require_positive("nc", settings.nc)?;
        require_positive("dc", settings.dc)?;
        require_positive("alpha_n", settings.alpha_n)?;
        require_positive("alpha_d", settings.alpha_d)?;
        for &c in &settings.fixed_compute {
            require_positive("fixed_compute", c)?;
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ScalingSettings {
        &self.settings
    }

    /// Tokens processed by an `n`-parameter model with budget `c` (C = 6ND)
    #[inline]
    pub fn data_tokens(&self, n: f64, c: f64) -> f64 {
        c / (6.0 * n)
    }

    pub fn loss(&self, n: f64, c: f64) -> f64 {
        let s = &self.settings;
        let d = self.data_tokens(n, c);
        s.l0 + (s.nc / n).powf(s.alpha_n) + (s.dc / d).powf(s.alpha_d)
    }

    /// Loss in the unlimited-data limit
    pub fn infinite_data_loss(&self, n: f64) -> f64 {
        let s = &self.settings;
        s.l0 + (s.nc / n).powf(s.alpha_n)
    }

    /// Budget `C` for which `n` minimizes `L(·, C)`, and the loss there
    ///
    /// Obtained by setting ∂L/∂N = 0 at fixed C.
    pub fn optimal_compute(&self, n: f64) -> (f64, f64) {
        let s = &self.settings;
        let c = 6.0
            * s.dc
            * (s.alpha_d / s.alpha_n).powf(1.0 / s.alpha_d)
            * (n / s.nc).powf(s.alpha_n / s.alpha_d)
            * n;
        (c, self.loss(n, c))
    }

    pub fn frontier_point(&self, n: f64) -> FrontierPoint {
        let (optimal_compute, optimal_loss) = self.optimal_compute(n);
        FrontierPoint {
            n,
            optimal_compute,
            optimal_loss,
            optimal_data: self.data_tokens(n, optimal_compute),
            infinite_loss: self.infinite_data_loss(n),
            fixed_compute_losses: self.fixed_compute_curve(n),
        }
    }

    /// Loss of an `n`-parameter model at every configured fixed budget
    pub fn fixed_compute_curve(&self, n: f64) -> Vec<f64> {
        self.settings
            .fixed_compute
            .iter()
            .map(|&c| self.loss(n, c))
            .collect()
    }

    /// Frontier sampled at `points` log-uniformly spaced sizes in `[n_min, n_max]`
    ///
    /// # Example
    ///
    /// ```ignore
    /// let law = ScalingLaw::new(ScalingSettings::default())?;
    /// let rows = law.frontier(1e7, 1e13, 100)?;
    /// ```
    pub fn frontier(
        &self,
        n_min: f64,
        n_max: f64,
        points: usize,
    ) -> ConfigResult<Vec<FrontierPoint>> {
        require_positive("n_min", n_min)?;
        require_positive("n_max", n_max)?;
        if n_max <= n_min || points < 2 {
            return Err(ConfigError::EmptyRange {
                name: "n",
                min: n_min,
                max: n_max,
            });
        }

        let (lo, hi) = (n_min.log10(), n_max.log10());
        let last = (points - 1) as f64;
        Ok((0..points)
            .map(|i| {
                let n = 10f64.powf(lo + (hi - lo) * i as f64 / last);
                self.frontier_point(n)
            })
            .collect())
    }
}
