use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Wall-clock duration of one named stage of a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Stage timings of a full search, in execution order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }

    /// Records the time elapsed since `start` under `label`.
    pub fn push_since(&mut self, label: impl Into<String>, start: Instant) {
        self.push(label, start.elapsed().as_secs_f64() * 1000.0);
    }

    /// Sum of every stage whose label starts with `prefix`.
    pub fn stage_ms(&self, prefix: &str) -> f64 {
        self.stages
            .iter()
            .filter(|s| s.label.starts_with(prefix))
            .map(|s| s.elapsed_ms)
            .sum()
    }
}
