//! Fixed-width row projections of chains.
//!
//! Full rows carry `[id, frame]` followed by six columns per order:
//! localization index, x, y, intensity, distance and angle to the previous
//! order. Order 0 has no previous order, so its distance and angle are zero.
//! Reduced rows carry `[id, frame, mean x, mean y, total intensity, mean
//! distance]`. Unreached orders are zero-filled.

use crate::types::OrderChain;
use serde::{Deserialize, Serialize};

/// Columns per order in a full row.
pub const ORDER_COLUMNS: usize = 6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowSchema {
    #[default]
    Full,
    Reduced,
}

pub fn full_header(orders: usize) -> Vec<String> {
    let mut header = vec!["id".to_string(), "frame".to_string()];
    for k in 0..orders {
        for name in ["index", "x", "y", "intensity", "distance", "angle"] {
            header.push(format!("{name}_{k}"));
        }
    }
    header
}

pub fn reduced_header() -> Vec<String> {
    ["id", "frame", "x", "y", "intensity", "distance"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn full_row(chain: &OrderChain) -> Vec<f64> {
    let mut row = Vec::with_capacity(2 + ORDER_COLUMNS * chain.orders());
    row.push(chain.id as f64);
    row.push(chain.frame as f64);
    for (k, slot) in chain.slots.iter().enumerate() {
        let link = if k == 0 { None } else { chain.links.get(k - 1) };
        row.push(slot.localization.map_or(0.0, |i| i as f64));
        row.push(slot.x);
        row.push(slot.y);
        row.push(slot.intensity);
        row.push(link.map_or(0.0, |l| l.distance));
        row.push(link.map_or(0.0, |l| l.angle));
    }
    row
}

pub fn reduced_row(chain: &OrderChain) -> Vec<f64> {
    let [x, y] = chain.mean_position();
    vec![
        chain.id as f64,
        chain.frame as f64,
        x,
        y,
        chain.total_intensity(),
        chain.mean_distance(),
    ]
}

pub fn header(schema: RowSchema, orders: usize) -> Vec<String> {
    match schema {
        RowSchema::Full => full_header(orders),
        RowSchema::Reduced => reduced_header(),
    }
}

pub fn rows(schema: RowSchema, chains: &[OrderChain]) -> Vec<Vec<f64>> {
    let project = match schema {
        RowSchema::Full => full_row,
        RowSchema::Reduced => reduced_row,
    };
    chains.iter().map(project).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderLink, OrderSlot};

    fn sample_chain() -> OrderChain {
        OrderChain {
            id: 7,
            frame: 12,
            slots: vec![
                OrderSlot {
                    order: 0,
                    localization: Some(3),
                    x: 10.0,
                    y: 20.0,
                    intensity: 100.0,
                },
                OrderSlot {
                    order: 1,
                    localization: Some(4),
                    x: 30.0,
                    y: 20.0,
                    intensity: 200.0,
                },
                OrderSlot::empty(2),
            ],
            links: vec![
                OrderLink {
                    distance: 20.0,
                    angle: 0.0,
                },
                OrderLink::default(),
            ],
        }
    }

    #[test]
    fn full_row_layout() {
        let chain = sample_chain();
        let row = full_row(&chain);
        assert_eq!(row.len(), 2 + 6 * 3);
        assert_eq!(row.len(), full_header(3).len());
        assert_eq!(&row[..2], &[7.0, 12.0]);
        assert_eq!(&row[2..8], &[3.0, 10.0, 20.0, 100.0, 0.0, 0.0]);
        assert_eq!(&row[8..14], &[4.0, 30.0, 20.0, 200.0, 20.0, 0.0]);
        assert!(row[14..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn reduced_row_averages_populated_orders() {
        let row = reduced_row(&sample_chain());
        assert_eq!(row, vec![7.0, 12.0, 20.0, 20.0, 300.0, 20.0]);
        assert_eq!(reduced_header().len(), row.len());
    }
}
