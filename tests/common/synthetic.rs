use order_matcher::{Localization, LocalizationSet, LocalizationTable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Direction of the order-0 → order-1 displacement used by the generators.
pub const OFFSET_ANGLE: f64 = 0.3;
/// Length of the order-0 → order-1 displacement used by the generators.
pub const OFFSET_DISTANCE: f64 = 1800.0;

pub const ORDER0_INTENSITY: f64 = 1000.0;
pub const ORDER1_INTENSITY: f64 = 2000.0;
pub const SINGLE_INTENSITY: f64 = 1500.0;

pub fn offset() -> [f64; 2] {
    [
        OFFSET_DISTANCE * OFFSET_ANGLE.cos(),
        OFFSET_DISTANCE * OFFSET_ANGLE.sin(),
    ]
}

/// Five points per frame: two emitters with their order-1 partner and one
/// unpaired emitter. The three emitters live in separate 9000-unit blocks
/// placed far enough apart that no cross-block pair fits the offset window.
pub fn two_pair_frames(frames: u32, seed: u64) -> LocalizationSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let d = offset();
    let mut locs = Vec::with_capacity(5 * frames as usize);
    for frame in 1..=frames {
        let mut jitter = || [rng.gen_range(0.0..9000.0), rng.gen_range(0.0..9000.0)];
        let a = jitter();
        let b = jitter();
        let c = jitter();
        let a = [2000.0 + a[0], 3000.0 + a[1]];
        let b = [2000.0 + b[0], 17000.0 + b[1]];
        let c = [16000.0 + c[0], 10000.0 + c[1]];
        for (p, intensity) in [
            (a, ORDER0_INTENSITY),
            ([a[0] + d[0], a[1] + d[1]], ORDER1_INTENSITY),
            (b, ORDER0_INTENSITY),
            ([b[0] + d[0], b[1] + d[1]], ORDER1_INTENSITY),
            (c, SINGLE_INTENSITY),
        ] {
            let id = locs.len() as u64;
            locs.push(Localization::new(id, frame, p[0], p[1], intensity));
        }
    }
    LocalizationSet::from(locs)
}

/// `count` emitters uniformly spread over `[0, extent)²`, each followed by its
/// order-1 partner.
pub fn random_pairs(count: usize, extent: f64, seed: u64) -> Vec<[f64; 2]> {
    let mut rng = StdRng::seed_from_u64(seed);
    let d = offset();
    let mut points = Vec::with_capacity(2 * count);
    for _ in 0..count {
        let p = [rng.gen_range(0.0..extent), rng.gen_range(0.0..extent)];
        points.push(p);
        points.push([p[0] + d[0], p[1] + d[1]]);
    }
    points
}

/// `side × side` square lattice with one axis along the generator offset and
/// a lattice constant of `OFFSET_DISTANCE`.
pub fn square_lattice(side: usize, origin: [f64; 2]) -> Vec<[f64; 2]> {
    let u = offset();
    let v = [-u[1], u[0]];
    let mut points = Vec::with_capacity(side * side);
    for i in 0..side {
        for j in 0..side {
            let (a, b) = (i as f64, j as f64);
            points.push([origin[0] + a * u[0] + b * v[0], origin[1] + a * u[1] + b * v[1]]);
        }
    }
    points
}

/// Table with export-style headers and one pass-through column.
pub fn as_table(set: &LocalizationSet) -> LocalizationTable {
    LocalizationTable {
        columns: ["id", "frame", "x [nm]", "y [nm]", "sigma [nm]", "intensity [photon]"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        rows: set
            .iter()
            .map(|l| vec![l.id as f64, l.frame as f64, l.x, l.y, 12.5, l.intensity])
            .collect(),
    }
}
