use crate::angle::polar_angle;
use crate::types::Localization;
use nalgebra::DMatrix;
use std::collections::BTreeMap;

use super::MatchParams;

/// Pairwise geometry of one frame. Entry `(i, j)` describes the displacement
/// from point `i` (reference) to point `j` (partner).
#[derive(Clone, Debug)]
pub(crate) struct PairGeometry {
    pub distance: DMatrix<f64>,
    pub angle: DMatrix<f64>,
}

impl PairGeometry {
    pub(crate) fn new(points: &[(usize, &Localization)]) -> Self {
        let n = points.len();
        let dx = DMatrix::from_fn(n, n, |i, j| points[j].1.x - points[i].1.x);
        let dy = DMatrix::from_fn(n, n, |i, j| points[j].1.y - points[i].1.y);
        let distance = dx.zip_map(&dy, |x, y| x.hypot(y));
        let angle = dx.zip_map(&dy, polar_angle);
        Self { distance, angle }
    }

    /// Whether `(i, j)` passes the geometric window and, if enabled, the
    /// asymmetric intensity check `I(i) / I(j) <= ratio`.
    pub(crate) fn accepts(
        &self,
        i: usize,
        j: usize,
        points: &[(usize, &Localization)],
        params: &MatchParams,
    ) -> bool {
        if i == j || !params.window.accepts(self.distance[(i, j)], self.angle[(i, j)]) {
            return false;
        }
        match params.intensity_ratio {
            Some(ratio) => points[i].1.intensity / points[j].1.intensity <= ratio,
            None => true,
        }
    }
}

/// References that all matched the same partner, merged into one seed.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SeedPair {
    /// Local indices of the tied references, ascending.
    pub references: Vec<usize>,
    pub partner: usize,
}

/// All accepted ordered pairs, grouped by partner. Seeds are returned in
/// ascending order of their first reference, then partner.
pub(crate) fn seed_pairs(
    geometry: &PairGeometry,
    points: &[(usize, &Localization)],
    params: &MatchParams,
) -> Vec<SeedPair> {
    let n = points.len();
    let mut by_partner: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for i in 0..n {
        for j in 0..n {
            if geometry.accepts(i, j, points, params) {
                by_partner.entry(j).or_default().push(i);
            }
        }
    }
    let mut seeds: Vec<SeedPair> = by_partner
        .into_iter()
        .map(|(partner, references)| SeedPair {
            references,
            partner,
        })
        .collect();
    seeds.sort_by_key(|s| (s.references[0], s.partner));
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AngleWindow, DistanceWindow, MatchWindow};

    fn params(ratio: Option<f64>) -> MatchParams {
        MatchParams {
            window: MatchWindow::new(
                AngleWindow::new(-0.2, 0.2),
                DistanceWindow::new(90.0, 110.0),
            ),
            intensity_ratio: ratio,
            orders: 2,
        }
    }

    #[test]
    fn geometry_is_reference_to_partner() {
        let a = Localization::new(0, 1, 0.0, 0.0, 1.0);
        let b = Localization::new(1, 1, 0.0, 5.0, 1.0);
        let points = vec![(0, &a), (1, &b)];
        let g = PairGeometry::new(&points);
        assert_eq!(g.distance[(0, 1)], 5.0);
        assert!((g.angle[(0, 1)] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!((g.angle[(1, 0)] + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert!(g.angle[(0, 0)].is_nan());
    }

    #[test]
    fn intensity_check_is_asymmetric() {
        let a = Localization::new(0, 1, 0.0, 0.0, 1000.0);
        let b = Localization::new(1, 1, 100.0, 0.0, 2000.0);
        let points = vec![(0, &a), (1, &b)];
        let g = PairGeometry::new(&points);
        assert!(g.accepts(0, 1, &points, &params(Some(1.0))));
        assert!(!g.accepts(0, 1, &points, &params(Some(0.4))));
        assert!(g.accepts(0, 1, &points, &params(None)));
    }

    #[test]
    fn shared_partner_groups_references() {
        let a = Localization::new(0, 1, 0.0, 1.0, 1.0);
        let b = Localization::new(1, 1, 0.0, -1.0, 1.0);
        let c = Localization::new(2, 1, 100.0, 0.0, 1.0);
        let points = vec![(0, &a), (1, &b), (2, &c)];
        let g = PairGeometry::new(&points);
        let seeds = seed_pairs(&g, &points, &params(None));
        assert_eq!(
            seeds,
            vec![SeedPair {
                references: vec![0, 1],
                partner: 2
            }]
        );
    }
}
