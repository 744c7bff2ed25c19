use crate::diagnostics::{AttemptSummary, TimingBreakdown};
use crate::error::{ConfigError, PipelineError};
use crate::filter::{filter_isolated, IsolationParams};
use crate::matching::MatchParams;
use crate::orientation::{EstimatorParams, OrientationEstimator};
use crate::scheduler::FrameScheduler;
use crate::types::{
    AngleWindow, DistanceWindow, LocalizationSet, MatchWindow, OrderChain, OrientationEstimate,
    Permutation,
};
use log::{debug, info, warn};
use serde::Serialize;
use std::time::Instant;

use super::quality::{assess, QualityThresholds, SearchWarning};
use super::state::{Attempt, SearchState};

/// Everything the controller needs for a run, already resolved from config.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchSettings {
    pub angle_override: Option<AngleWindow>,
    pub distance_override: Option<DistanceWindow>,
    pub orders: usize,
    /// Maximum `I(reference) / I(partner)`; `None` disables the check.
    pub intensity_ratio: Option<f64>,
    /// Starting flip/mirror hypothesis.
    pub permutation: Permutation,
    pub search: bool,
    pub deep_search: bool,
    /// Extra permutations tried after the first one when not in deep mode.
    pub max_retries: usize,
    pub isolation: Option<IsolationParams>,
    pub threads: usize,
    pub estimator: EstimatorParams,
    pub quality: QualityThresholds,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            angle_override: None,
            distance_override: None,
            orders: 2,
            intensity_ratio: None,
            permutation: Permutation::CANONICAL[0],
            search: true,
            deep_search: false,
            max_retries: 2,
            isolation: None,
            threads: 0,
            estimator: EstimatorParams::default(),
            quality: QualityThresholds::default(),
        }
    }
}

impl SearchSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.orders < 2 {
            return Err(ConfigError::TooFewOrders(self.orders));
        }
        if let Some(w) = &self.angle_override {
            for value in [w.low, w.high] {
                if !value.is_finite() {
                    return Err(ConfigError::NonFiniteAngle { value });
                }
            }
        }
        if let Some(w) = &self.distance_override {
            validate_distance(w)?;
        }
        if let Some(ratio) = self.intensity_ratio {
            if !(ratio > 0.0) {
                return Err(ConfigError::InvalidRatio(ratio));
            }
        }
        if let Some(iso) = &self.isolation {
            if !(iso.radius > 0.0) {
                return Err(ConfigError::InvalidRadius(iso.radius));
            }
        }
        Ok(())
    }

    /// Permutations to try, in evaluation order.
    pub fn plan(&self) -> Vec<Permutation> {
        if self.angle_override.is_some() || !self.search {
            return vec![self.permutation];
        }
        if self.deep_search {
            return Permutation::CANONICAL.to_vec();
        }
        let start = self.permutation.index();
        (0..Permutation::CANONICAL.len())
            .map(|k| Permutation::CANONICAL[(start + k) % Permutation::CANONICAL.len()])
            .take(1 + self.max_retries)
            .collect()
    }
}

fn validate_distance(w: &DistanceWindow) -> Result<(), ConfigError> {
    if w.low < 0.0 || w.high < 0.0 {
        return Err(ConfigError::NegativeDistance {
            low: w.low,
            high: w.high,
        });
    }
    if w.low > w.high {
        return Err(ConfigError::InvertedDistance {
            low: w.low,
            high: w.high,
        });
    }
    Ok(())
}

/// Final result of a search.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub permutation: Permutation,
    /// Window tightened to the winning chains' own link geometry.
    pub window: MatchWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<OrientationEstimate>,
    #[serde(skip)]
    pub chains: Vec<OrderChain>,
    pub attempts: Vec<AttemptSummary>,
    pub warnings: Vec<SearchWarning>,
    pub timings: TimingBreakdown,
}

/// Runs estimate → schedule → assess over the permutation plan and keeps the
/// attempt with the most chains.
pub struct SearchController {
    settings: SearchSettings,
    estimator: OrientationEstimator,
}

impl SearchController {
    pub fn new(settings: SearchSettings) -> Self {
        let estimator = OrientationEstimator::new(settings.estimator.clone());
        Self {
            settings,
            estimator,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub fn run(&self, set: &LocalizationSet) -> Result<SearchOutcome, PipelineError> {
        let t0 = Instant::now();
        self.settings.validate()?;
        let scheduler = FrameScheduler::new(self.settings.threads)?;
        let positions = set.positions();
        let plan = self.settings.plan();
        info!(
            "search: {} localizations, plan of {} permutation(s), {} workers",
            set.len(),
            plan.len(),
            scheduler.threads()
        );

        let mut state = SearchState::new();
        let mut warnings = Vec::new();
        let mut timings = TimingBreakdown::default();
        let mut summaries = Vec::with_capacity(plan.len());

        for permutation in plan {
            let (attempt, attempt_warnings) =
                self.attempt(set, &positions, permutation, &scheduler, &mut timings)?;
            let retry = attempt.quality.needs_retry();
            debug!(
                "search: flip={} mirror={} count={} retry={}",
                permutation.flip,
                permutation.mirror,
                attempt.count(),
                retry
            );
            summaries.push(AttemptSummary::from(&attempt));
            warnings.extend(attempt_warnings);
            state = state.with_attempt(attempt);
            if !self.settings.deep_search && !retry {
                break;
            }
        }

        let Some(best) = state.into_best() else {
            timings.total_ms = t0.elapsed().as_secs_f64() * 1000.0;
            return Ok(SearchOutcome {
                permutation: self.settings.permutation,
                window: MatchWindow::new(
                    AngleWindow::full(),
                    DistanceWindow::new(0.0, 0.0),
                ),
                estimate: None,
                chains: Vec::new(),
                attempts: summaries,
                warnings,
                timings,
            });
        };
        let window = tightened_window(&best.chains, &best.window);
        let mut chains = best.chains;
        if let Some(iso) = &self.settings.isolation {
            let start = Instant::now();
            chains = filter_isolated(chains, iso);
            timings.push_since("filter", start);
        }
        timings.total_ms = t0.elapsed().as_secs_f64() * 1000.0;
        info!(
            "search: selected flip={} mirror={} with {} chains, angle=[{:.4}, {:.4}] dist=[{:.1}, {:.1}]",
            best.permutation.flip,
            best.permutation.mirror,
            chains.len(),
            window.angle.low,
            window.angle.high,
            window.distance.low,
            window.distance.high
        );

        Ok(SearchOutcome {
            permutation: best.permutation,
            window,
            estimate: best.estimate,
            chains,
            attempts: summaries,
            warnings,
            timings,
        })
    }

    fn attempt(
        &self,
        set: &LocalizationSet,
        positions: &[[f64; 2]],
        permutation: Permutation,
        scheduler: &FrameScheduler,
        timings: &mut TimingBreakdown,
    ) -> Result<(Attempt, Vec<SearchWarning>), PipelineError> {
        let s = &self.settings;
        let t0 = Instant::now();
        let tag = format!("[{}]", permutation.index());

        let estimate = if s.angle_override.is_some() && s.distance_override.is_some() {
            None
        } else {
            let start = Instant::now();
            let e = self.estimator.estimate(positions, permutation);
            timings.push_since(format!("estimate{tag}"), start);
            Some(e)
        };

        let angle = s
            .angle_override
            .or_else(|| estimate.as_ref().map(OrientationEstimate::angle_window))
            .unwrap_or_else(AngleWindow::full);
        let distance = s
            .distance_override
            .or_else(|| estimate.as_ref().map(OrientationEstimate::distance_window))
            .unwrap_or(DistanceWindow::new(0.0, 0.0));
        let window = MatchWindow::new(angle, distance);

        let mut warnings = Vec::new();
        let calibrated =
            s.distance_override.is_some() || estimate.as_ref().is_some_and(|e| e.success);
        let chains = if calibrated {
            validate_distance(&window.distance)?;
            let params = MatchParams {
                window,
                intensity_ratio: s.intensity_ratio,
                orders: s.orders,
            };
            let start = Instant::now();
            let chains = scheduler.run(set, &params);
            timings.push_since(format!("match{tag}"), start);
            chains
        } else {
            warn!(
                "search: no usable calibration for flip={} mirror={}",
                permutation.flip, permutation.mirror
            );
            warnings.push(SearchWarning::NoUsableCalibration { permutation });
            Vec::new()
        };

        let quality = assess(&chains, &window.angle, set.len(), &s.quality);
        let quality_warnings = quality.warnings(permutation, chains.len());
        for w in &quality_warnings {
            debug!("search: {:?}", w);
        }
        warnings.extend(quality_warnings);

        let attempt = Attempt {
            permutation,
            estimate,
            window,
            chains,
            quality,
            elapsed_ms: t0.elapsed().as_secs_f64() * 1000.0,
        };
        Ok((attempt, warnings))
    }
}

/// Empirical min/max of the chains' link angles and distances. Angles are
/// measured as offsets from the lower edge of `window` so wrapped windows
/// stay contiguous. Without chains the window is returned unchanged.
pub fn tightened_window(chains: &[OrderChain], window: &MatchWindow) -> MatchWindow {
    let mut offsets = (f64::INFINITY, f64::NEG_INFINITY);
    let mut distances = (f64::INFINITY, f64::NEG_INFINITY);
    let mut seen = false;
    for link in chains.iter().flat_map(|c| c.populated_links()) {
        if !link.angle.is_finite() {
            continue;
        }
        let off = window.angle.offset_of(link.angle);
        offsets = (offsets.0.min(off), offsets.1.max(off));
        distances = (distances.0.min(link.distance), distances.1.max(link.distance));
        seen = true;
    }
    if !seen {
        return *window;
    }
    let angle = AngleWindow::new(window.angle.low + offsets.0, window.angle.low + offsets.1);
    MatchWindow::new(angle, DistanceWindow::new(distances.0, distances.1))
}
