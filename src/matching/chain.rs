use crate::angle::polar_angle;
use crate::types::{Localization, OrderChain, OrderLink, OrderSlot};

use super::pairs::{PairGeometry, SeedPair};
use super::MatchParams;

/// Builds the chain seeded by `seed` and walks it forward order by order.
///
/// Order 0 is the centroid of the tied references and keeps the lowest tied
/// index. Each further order is the unused point accepted from the newest
/// order whose distance is closest to the previous link.
pub(crate) fn grow_chain(
    frame: u32,
    seed: &SeedPair,
    points: &[(usize, &Localization)],
    geometry: &PairGeometry,
    params: &MatchParams,
) -> OrderChain {
    let orders = params.orders;
    let mut slots: Vec<OrderSlot> = (0..orders).map(OrderSlot::empty).collect();
    let mut links = vec![OrderLink::default(); orders.saturating_sub(1)];

    let tied = seed.references.len().max(1) as f64;
    let (sx, sy, si) = seed.references.iter().fold((0.0, 0.0, 0.0), |acc, &r| {
        let loc = points[r].1;
        (acc.0 + loc.x, acc.1 + loc.y, acc.2 + loc.intensity)
    });
    slots[0] = OrderSlot {
        order: 0,
        localization: Some(points[seed.references[0]].0),
        x: sx / tied,
        y: sy / tied,
        intensity: si / tied,
    };

    let mut used: Vec<usize> = seed.references.clone();
    let mut current = seed.partner;
    for order in 1..orders {
        if order > 1 {
            let previous = links[order - 2].distance;
            match next_order(current, previous, &used, points, geometry, params) {
                Some(next) => current = next,
                None => break,
            }
        }
        used.push(current);
        let loc = points[current].1;
        slots[order] = OrderSlot {
            order,
            localization: Some(points[current].0),
            x: loc.x,
            y: loc.y,
            intensity: loc.intensity,
        };
        let prev = &slots[order - 1];
        let (dx, dy) = (loc.x - prev.x, loc.y - prev.y);
        links[order - 1] = OrderLink {
            distance: dx.hypot(dy),
            angle: polar_angle(dx, dy),
        };
    }

    OrderChain {
        id: 0,
        frame,
        slots,
        links,
    }
}

fn next_order(
    from: usize,
    previous_distance: f64,
    used: &[usize],
    points: &[(usize, &Localization)],
    geometry: &PairGeometry,
    params: &MatchParams,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for k in 0..points.len() {
        if used.contains(&k) || !geometry.accepts(from, k, points, params) {
            continue;
        }
        let deviation = (geometry.distance[(from, k)] - previous_distance).abs();
        if best.map_or(true, |(_, d)| deviation < d) {
            best = Some((k, deviation));
        }
    }
    best.map(|(k, _)| k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AngleWindow, DistanceWindow, MatchWindow};

    fn params(orders: usize) -> MatchParams {
        MatchParams {
            window: MatchWindow::new(
                AngleWindow::new(-0.2, 0.2),
                DistanceWindow::new(90.0, 110.0),
            ),
            intensity_ratio: None,
            orders,
        }
    }

    #[test]
    fn extends_through_all_orders() {
        let locs = [
            Localization::new(0, 1, 0.0, 0.0, 1.0),
            Localization::new(1, 1, 100.0, 0.0, 2.0),
            Localization::new(2, 1, 200.0, 5.0, 3.0),
        ];
        let points: Vec<(usize, &Localization)> = locs.iter().enumerate().collect();
        let g = PairGeometry::new(&points);
        let seed = SeedPair {
            references: vec![0],
            partner: 1,
        };
        let chain = grow_chain(1, &seed, &points, &g, &params(3));
        assert_eq!(chain.populated(), 3);
        assert_eq!(chain.slots[2].localization, Some(2));
        assert!((chain.links[1].distance - 100.0f64.hypot(5.0)).abs() < 1e-12);
    }

    #[test]
    fn unreached_orders_stay_zero() {
        let locs = [
            Localization::new(0, 1, 0.0, 0.0, 1.0),
            Localization::new(1, 1, 100.0, 0.0, 2.0),
        ];
        let points: Vec<(usize, &Localization)> = locs.iter().enumerate().collect();
        let g = PairGeometry::new(&points);
        let seed = SeedPair {
            references: vec![0],
            partner: 1,
        };
        let chain = grow_chain(4, &seed, &points, &g, &params(4));
        assert_eq!(chain.slots.len(), 4);
        assert_eq!(chain.links.len(), 3);
        assert_eq!(chain.populated(), 2);
        assert_eq!(chain.slots[3], OrderSlot::empty(3));
        assert_eq!(chain.links[2], OrderLink::default());
    }

    #[test]
    fn prefers_distance_closest_to_previous_link() {
        let locs = [
            Localization::new(0, 1, 0.0, 0.0, 1.0),
            Localization::new(1, 1, 100.0, 0.0, 1.0),
            Localization::new(2, 1, 192.0, 0.0, 1.0),
            Localization::new(3, 1, 201.0, 0.0, 1.0),
        ];
        let points: Vec<(usize, &Localization)> = locs.iter().enumerate().collect();
        let g = PairGeometry::new(&points);
        let seed = SeedPair {
            references: vec![0],
            partner: 1,
        };
        let chain = grow_chain(1, &seed, &points, &g, &params(3));
        assert_eq!(chain.slots[2].localization, Some(3));
    }
}
