use crate::types::{MatchWindow, OrderChain, OrientationEstimate, Permutation};

use super::quality::QualityReport;

/// One full estimate-and-match pass under a single permutation.
#[derive(Clone, Debug)]
pub struct Attempt {
    pub permutation: Permutation,
    /// `None` when both windows were overridden.
    pub estimate: Option<OrientationEstimate>,
    pub window: MatchWindow,
    pub chains: Vec<OrderChain>,
    pub quality: QualityReport,
    pub elapsed_ms: f64,
}

impl Attempt {
    pub fn count(&self) -> usize {
        self.chains.len()
    }
}

#[derive(Clone, Debug, Default)]
pub enum PermutationStatus {
    #[default]
    Untried,
    Computed(Attempt),
}

/// Per-permutation results of a search, indexed by canonical position.
///
/// Values are never mutated in place: recording an attempt consumes the state
/// and returns the next one.
#[derive(Clone, Debug, Default)]
pub struct SearchState {
    slots: [PermutationStatus; 4],
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attempt(self, attempt: Attempt) -> Self {
        let mut slots = self.slots;
        let idx = attempt.permutation.index();
        slots[idx] = PermutationStatus::Computed(attempt);
        Self { slots }
    }

    pub fn status(&self, permutation: Permutation) -> &PermutationStatus {
        &self.slots[permutation.index()]
    }

    /// Computed attempts in canonical order.
    pub fn computed(&self) -> impl Iterator<Item = &Attempt> {
        self.slots.iter().filter_map(|s| match s {
            PermutationStatus::Computed(a) => Some(a),
            PermutationStatus::Untried => None,
        })
    }

    pub fn attempts(&self) -> usize {
        self.computed().count()
    }

    /// Index of the attempt with the most chains; ties go to the lowest
    /// canonical index.
    fn best_index(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (idx, status) in self.slots.iter().enumerate() {
            if let PermutationStatus::Computed(a) = status {
                if best.map_or(true, |(_, count)| a.count() > count) {
                    best = Some((idx, a.count()));
                }
            }
        }
        best.map(|(idx, _)| idx)
    }

    pub fn best(&self) -> Option<&Attempt> {
        match &self.slots[self.best_index()?] {
            PermutationStatus::Computed(a) => Some(a),
            PermutationStatus::Untried => None,
        }
    }

    pub fn into_best(self) -> Option<Attempt> {
        let idx = self.best_index()?;
        match self.slots.into_iter().nth(idx) {
            Some(PermutationStatus::Computed(attempt)) => Some(attempt),
            _ => None,
        }
    }
}
