use crate::types::{AngleWindow, OrderChain, Permutation};
use serde::{Deserialize, Serialize};

/// Thresholds of the per-attempt quality checks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    /// Fewer chains than this flags a retry.
    pub min_chains: usize,
    /// Fewer chains than this fraction of all localizations flags a retry.
    pub min_chain_fraction: f64,
    /// Bins of the coarse link-angle histogram across the angle window.
    pub angle_bins: usize,
    /// A bin counts as populated above this fraction of the samples.
    pub population_fraction: f64,
    pub min_populated_bins: usize,
    /// An edge bin above this share of the samples suggests window clipping.
    pub clipping_fraction: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_chains: 10,
            min_chain_fraction: 0.1,
            angle_bins: 10,
            population_fraction: 0.05,
            min_populated_bins: 2,
            clipping_fraction: 0.25,
        }
    }
}

/// Outcome of the quality checks of one attempt.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub few_chains: bool,
    pub sparse_chains: bool,
    pub no_angle_peak: bool,
    /// Informational only; never triggers a retry.
    pub clipped: bool,
    pub populated_bins: usize,
    pub angle_histogram: Vec<usize>,
}

impl QualityReport {
    pub fn needs_retry(&self) -> bool {
        self.few_chains || self.sparse_chains || self.no_angle_peak
    }

    pub fn warnings(&self, permutation: Permutation, count: usize) -> Vec<SearchWarning> {
        let mut out = Vec::new();
        if self.few_chains || self.sparse_chains {
            out.push(SearchWarning::SparseResult { permutation, count });
        }
        if self.no_angle_peak {
            out.push(SearchWarning::NoAnglePeak {
                permutation,
                populated_bins: self.populated_bins,
            });
        }
        if self.clipped {
            out.push(SearchWarning::SuspectedClipping { permutation });
        }
        out
    }
}

/// Soft conditions met during a search. None of them abort a run.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SearchWarning {
    /// The estimator found no spacing peak and no distance override was given.
    NoUsableCalibration { permutation: Permutation },
    SparseResult { permutation: Permutation, count: usize },
    NoAnglePeak {
        permutation: Permutation,
        populated_bins: usize,
    },
    /// The link-angle mass piles up at an edge of the angle window.
    SuspectedClipping { permutation: Permutation },
}

/// Runs the three retry checks and the clipping check on an attempt's chains.
pub fn assess(
    chains: &[OrderChain],
    window: &AngleWindow,
    localizations: usize,
    thresholds: &QualityThresholds,
) -> QualityReport {
    let count = chains.len();
    let histogram = link_angle_histogram(chains, window, thresholds.angle_bins);
    let samples: usize = histogram.iter().sum();
    let cutoff = thresholds.population_fraction * samples as f64;
    let populated_bins = histogram.iter().filter(|&&c| c as f64 > cutoff).count();

    let edge_cutoff = thresholds.clipping_fraction * samples as f64;
    let clipped = samples > 0
        && (histogram.first().is_some_and(|&c| c as f64 > edge_cutoff)
            || histogram.last().is_some_and(|&c| c as f64 > edge_cutoff));

    QualityReport {
        few_chains: count < thresholds.min_chains,
        sparse_chains: (count as f64) < thresholds.min_chain_fraction * localizations as f64,
        no_angle_peak: populated_bins < thresholds.min_populated_bins,
        clipped,
        populated_bins,
        angle_histogram: histogram,
    }
}

/// Counts populated link angles in `bins` equal slices of `window`, measured
/// counter-clockwise from its lower edge.
fn link_angle_histogram(chains: &[OrderChain], window: &AngleWindow, bins: usize) -> Vec<usize> {
    let mut histogram = vec![0usize; bins];
    if bins == 0 {
        return histogram;
    }
    let span = window.span();
    for link in chains.iter().flat_map(|c| c.populated_links()) {
        if !link.angle.is_finite() {
            continue;
        }
        let idx = if span > 0.0 {
            ((window.offset_of(link.angle) / span) * bins as f64).floor() as usize
        } else {
            0
        };
        histogram[idx.min(bins - 1)] += 1;
    }
    histogram
}
