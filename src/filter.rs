//! Isolated-point filter.
//!
//! Drops chains whose order-0 anchor has fewer than `neighbors` other anchors
//! within `radius`. Brute force over all pairs, all frames pooled.

use crate::types::OrderChain;
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IsolationParams {
    /// Required number of other anchors within `radius`.
    pub neighbors: usize,
    /// Inclusive search radius, same units as the coordinates.
    pub radius: f64,
}

/// Keeps chains with at least `params.neighbors` neighbours; ids and order
/// are preserved.
pub fn filter_isolated(chains: Vec<OrderChain>, params: &IsolationParams) -> Vec<OrderChain> {
    let anchors: Vec<[f64; 2]> = chains.iter().map(OrderChain::anchor).collect();
    let r2 = params.radius * params.radius;
    let keep: Vec<bool> = anchors
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let mut found = 0usize;
            for (j, b) in anchors.iter().enumerate() {
                if i == j {
                    continue;
                }
                let (dx, dy) = (a[0] - b[0], a[1] - b[1]);
                if dx * dx + dy * dy <= r2 {
                    found += 1;
                    if found >= params.neighbors {
                        break;
                    }
                }
            }
            found >= params.neighbors
        })
        .collect();

    let before = chains.len();
    let kept: Vec<OrderChain> = chains
        .into_iter()
        .zip(keep)
        .filter_map(|(c, k)| k.then_some(c))
        .collect();
    debug!(
        "isolation filter: kept {} of {} chains (k={}, r={})",
        kept.len(),
        before,
        params.neighbors,
        params.radius
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderLink, OrderSlot};

    fn chain_at(id: usize, x: f64, y: f64) -> OrderChain {
        let mut s0 = OrderSlot::empty(0);
        s0.localization = Some(id);
        s0.x = x;
        s0.y = y;
        OrderChain {
            id,
            frame: 1,
            slots: vec![s0, OrderSlot::empty(1)],
            links: vec![OrderLink::default()],
        }
    }

    /// Centre chain plus `n` neighbours on a circle of radius 10.
    fn star(n: usize) -> Vec<OrderChain> {
        let mut chains = vec![chain_at(0, 0.0, 0.0)];
        for k in 0..n {
            let t = k as f64 * std::f64::consts::TAU / n as f64;
            chains.push(chain_at(k + 1, 10.0 * t.cos(), 10.0 * t.sin()));
        }
        chains
    }

    #[test]
    fn exactly_k_minus_one_neighbours_is_removed() {
        let params = IsolationParams {
            neighbors: 3,
            radius: 10.5,
        };
        let kept = filter_isolated(star(2), &params);
        assert!(kept.iter().all(|c| c.id != 0));
    }

    #[test]
    fn exactly_k_neighbours_is_kept() {
        let params = IsolationParams {
            neighbors: 3,
            radius: 10.5,
        };
        let kept = filter_isolated(star(3), &params);
        assert!(kept.iter().any(|c| c.id == 0));
    }

    #[test]
    fn radius_is_inclusive_and_ids_survive() {
        let chains = vec![chain_at(4, 0.0, 0.0), chain_at(9, 3.0, 4.0), chain_at(11, 50.0, 0.0)];
        let params = IsolationParams {
            neighbors: 1,
            radius: 5.0,
        };
        let kept = filter_isolated(chains, &params);
        let ids: Vec<usize> = kept.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![4, 9]);
    }
}
