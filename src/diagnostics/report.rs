use crate::output::{self, RowSchema};
use crate::search::{SearchOutcome, SearchWarning};
use crate::types::{LocalizationSet, MatchWindow, OrientationEstimate, Permutation};
use serde::Serialize;

use super::attempts::AttemptSummary;
use super::timing::TimingBreakdown;

/// Shape of the input table.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub localizations: usize,
    pub frames: usize,
    pub extra_columns: Vec<String>,
}

impl InputDescriptor {
    pub fn from_set(set: &LocalizationSet) -> Self {
        Self {
            localizations: set.len(),
            frames: set.group_by_frame().len(),
            extra_columns: set.extra_columns().to_vec(),
        }
    }
}

/// Everything the binary writes for one run: the selected permutation and
/// window, per-attempt digests, warnings, timings and the chain rows.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub input: InputDescriptor,
    pub permutation: Permutation,
    pub window: MatchWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<OrientationEstimate>,
    pub attempts: Vec<AttemptSummary>,
    pub warnings: Vec<SearchWarning>,
    pub timings: TimingBreakdown,
    pub chain_count: usize,
    pub schema: RowSchema,
    pub header: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl RunReport {
    pub fn new(set: &LocalizationSet, outcome: &SearchOutcome, orders: usize, schema: RowSchema) -> Self {
        Self {
            input: InputDescriptor::from_set(set),
            permutation: outcome.permutation,
            window: outcome.window,
            estimate: outcome.estimate.clone(),
            attempts: outcome.attempts.clone(),
            warnings: outcome.warnings.clone(),
            timings: outcome.timings.clone(),
            chain_count: outcome.chains.len(),
            schema,
            header: output::header(schema, orders),
            rows: output::rows(schema, &outcome.chains),
        }
    }
}
