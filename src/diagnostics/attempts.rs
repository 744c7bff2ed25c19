use crate::search::{Attempt, QualityReport};
use crate::types::{MatchWindow, OrientationEstimate, Permutation};
use serde::Serialize;

/// Serializable digest of one search attempt.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSummary {
    pub permutation: Permutation,
    pub count: usize,
    pub window: MatchWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<OrientationEstimate>,
    pub quality: QualityReport,
    pub retry: bool,
    pub elapsed_ms: f64,
}

impl From<&Attempt> for AttemptSummary {
    fn from(attempt: &Attempt) -> Self {
        Self {
            permutation: attempt.permutation,
            count: attempt.count(),
            window: attempt.window,
            estimate: attempt.estimate.clone(),
            quality: attempt.quality.clone(),
            retry: attempt.quality.needs_retry(),
            elapsed_ms: attempt.elapsed_ms,
        }
    }
}
