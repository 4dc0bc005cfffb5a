//! Population Stability Index over shared reference-derived bins
//!
//! Bin edges always come from the reference side, so the measure is not
//! swap-invariant even though each summand is algebraically symmetric.
//! Degenerate inputs are defined, not errors: too few points is an
//! undefined score, too few distinct edges is exactly zero.

use std::cmp::Ordering;

/// Additive smoothing constant applied per bin on both sides
const PSI_EPS: f64 = 1e-6;

/// PSI calculator with a fixed bin budget
#[derive(Debug, Clone)]
pub struct PsiScorer {
    n_bins: usize,
}

impl Default for PsiScorer {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PsiScorer {
    pub fn new(n_bins: usize) -> Self {
        Self {
            n_bins: n_bins.max(2),
        }
    }

    /// Score one feature. NaNs are dropped from each side independently.
    ///
    /// Returns `None` when either side keeps fewer than 2 values (the
    /// score is undefined, not zero). A reference too degenerate to form
    /// 2 bins yields `Some(0.0)`.
    pub fn score(&self, reference: &[f64], current: &[f64]) -> Option<f64> {
        let reference: Vec<f64> = reference.iter().copied().filter(|v| !v.is_nan()).collect();
        let current: Vec<f64> = current.iter().copied().filter(|v| !v.is_nan()).collect();

        if reference.len() < 2 || current.len() < 2 {
            return None;
        }

        let Some(edges) = self.bin_edges(&reference) else {
            // Not discriminable at this bin resolution
            return Some(0.0);
        };

        let ref_probs = Self::smoothed_probabilities(&reference, &edges);
        let cur_probs = Self::smoothed_probabilities(&current, &edges);

        let psi: f64 = ref_probs
            .iter()
            .zip(cur_probs.iter())
            .map(|(&p_ref, &p_cur)| (p_cur - p_ref) * (p_cur / p_ref).ln())
            .sum();

        Some(psi)
    }

    /// Build shared bin edges from the reference distribution.
    ///
    /// Two branches: a quantile cut with duplicate edges collapsed, and a
    /// linear-spacing fallback when the quantiles leave fewer than 3
    /// distinct edges. `None` means even the fallback could not form 2
    /// bins. The surviving outer edges are widened to cover any value.
    fn bin_edges(&self, reference: &[f64]) -> Option<Vec<f64>> {
        let mut sorted = reference.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let mut edges = Self::quantile_edges(&sorted, self.n_bins);
        edges.dedup();

        if edges.len() < 3 {
            let n_unique = Self::count_distinct(&sorted);
            let n_points = self.n_bins.min(n_unique.max(2));
            edges = Self::linear_edges(sorted[0], sorted[sorted.len() - 1], n_points);
            edges.dedup();
        }

        if edges.len() < 3 {
            return None;
        }

        let last = edges.len() - 1;
        edges[0] = f64::NEG_INFINITY;
        edges[last] = f64::INFINITY;
        Some(edges)
    }

    /// Quantile edges over sorted data, linearly interpolating between
    /// order statistics at position `q * (n - 1)`
    fn quantile_edges(sorted: &[f64], n_bins: usize) -> Vec<f64> {
        let n = sorted.len();
        (0..=n_bins)
            .map(|i| {
                let pos = (i as f64 / n_bins as f64) * (n - 1) as f64;
                let lo = pos.floor() as usize;
                let hi = pos.ceil() as usize;
                let frac = pos - lo as f64;
                sorted[lo] + frac * (sorted[hi] - sorted[lo])
            })
            .collect()
    }

    /// Evenly spaced edges over [min, max], endpoints included
    fn linear_edges(min: f64, max: f64, n_points: usize) -> Vec<f64> {
        let step = (max - min) / (n_points - 1) as f64;
        (0..n_points).map(|i| min + step * i as f64).collect()
    }

    fn count_distinct(sorted: &[f64]) -> usize {
        sorted.windows(2).filter(|w| w[0] != w[1]).count() + 1
    }

    /// Per-bin probabilities with additive smoothing so an empty bin on
    /// either side never produces an undefined logarithm
    fn smoothed_probabilities(values: &[f64], edges: &[f64]) -> Vec<f64> {
        let k = edges.len() - 1;
        let mut counts = vec![0usize; k];

        for &value in values {
            for i in 0..k {
                if value > edges[i] && value <= edges[i + 1] {
                    counts[i] += 1;
                    break;
                }
            }
        }

        let total: usize = counts.iter().sum();
        let denom = total as f64 + PSI_EPS * k as f64;
        counts
            .iter()
            .map(|&c| (c as f64 + PSI_EPS) / denom)
            .collect()
    }
}
