//! Pair matching and order chaining for a single frame.
//!
//! Every ordered pair `(i, j)` whose displacement lies inside the match window
//! is a candidate link from order `k` (point `i`) to order `k + 1` (point `j`).
//! References competing for the same partner are merged into their centroid,
//! and each merged pair is walked forward to the configured order count.
//! The function is pure: no I/O, no shared state.

mod chain;
mod pairs;

use crate::types::{Localization, MatchWindow, OrderChain};
use log::trace;

use chain::grow_chain;
use pairs::{seed_pairs, PairGeometry};

/// Per-run matching parameters shared by all frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchParams {
    pub window: MatchWindow,
    /// Maximum `I(reference) / I(partner)`; `None` disables the check.
    pub intensity_ratio: Option<f64>,
    /// Number of order slots per chain (K ≥ 2).
    pub orders: usize,
}

/// Chains found in one frame. `points` pairs each localization with its index
/// in the owning set; chain ids are left at 0 for the caller to assign.
pub fn match_frame(
    frame: u32,
    points: &[(usize, &Localization)],
    params: &MatchParams,
) -> Vec<OrderChain> {
    if points.len() < 2 || params.orders < 2 {
        return Vec::new();
    }
    let geometry = PairGeometry::new(points);
    let seeds = seed_pairs(&geometry, points, params);
    trace!(
        "frame {}: {} points, {} seed pairs",
        frame,
        points.len(),
        seeds.len()
    );
    seeds
        .iter()
        .map(|seed| grow_chain(frame, seed, points, &geometry, params))
        .collect()
}
