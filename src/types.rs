use crate::angle::wrap_pi;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};

/// One detected emitter position at a given frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Localization {
    pub id: u64,
    pub frame: u32,
    pub x: f64,
    pub y: f64,
    pub intensity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Unresolved input columns, passed through untouched.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<f64>,
}

impl Localization {
    pub fn new(id: u64, frame: u32, x: f64, y: f64, intensity: f64) -> Self {
        Self {
            id,
            frame,
            x,
            y,
            intensity,
            z: None,
            extra: Vec::new(),
        }
    }

    #[inline]
    pub fn position(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// Read-only localization table shared by every stage of a run.
#[derive(Clone, Debug, Default)]
pub struct LocalizationSet {
    localizations: Vec<Localization>,
    extra_columns: Vec<String>,
}

impl LocalizationSet {
    pub fn new(localizations: Vec<Localization>, extra_columns: Vec<String>) -> Self {
        Self {
            localizations,
            extra_columns,
        }
    }

    pub fn len(&self) -> usize {
        self.localizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.localizations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Localization> {
        self.localizations.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Localization> {
        self.localizations.iter()
    }

    /// Names of the pass-through columns, in the order of `Localization::extra`.
    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn positions(&self) -> Vec<[f64; 2]> {
        self.localizations.iter().map(Localization::position).collect()
    }

    /// Localization indices grouped by frame, frames in ascending order.
    pub fn group_by_frame(&self) -> Vec<(u32, Vec<usize>)> {
        let mut frames: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (idx, loc) in self.localizations.iter().enumerate() {
            frames.entry(loc.frame).or_default().push(idx);
        }
        frames.into_iter().collect()
    }
}

impl From<Vec<Localization>> for LocalizationSet {
    fn from(localizations: Vec<Localization>) -> Self {
        Self::new(localizations, Vec::new())
    }
}

/// Angular acceptance window in (-π, π]. When `low > high` the window wraps
/// through ±π.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AngleWindow {
    pub low: f64,
    pub high: f64,
}

impl AngleWindow {
    /// Window from `low` to `high`, both wrapped into (-π, π]. A range at least
    /// 2π wide accepts every direction.
    pub fn new(low: f64, high: f64) -> Self {
        if high - low >= TAU - 1e-9 {
            return Self::full();
        }
        Self {
            low: wrap_pi(low),
            high: wrap_pi(high),
        }
    }

    /// Window `center ± half_width`, wrapped. A half width of π or more
    /// accepts every direction.
    pub fn centered(center: f64, half_width: f64) -> Self {
        if half_width >= PI {
            return Self::full();
        }
        Self::new(center - half_width, center + half_width)
    }

    pub fn full() -> Self {
        Self {
            low: -PI + f64::EPSILON,
            high: PI,
        }
    }

    pub fn contains(&self, angle: f64) -> bool {
        if !angle.is_finite() {
            return false;
        }
        if self.low <= self.high {
            angle >= self.low && angle <= self.high
        } else {
            angle >= self.low || angle <= self.high
        }
    }

    /// Angular extent covered by the window, in [0, 2π).
    pub fn span(&self) -> f64 {
        (self.high - self.low).rem_euclid(TAU)
    }

    /// Counter-clockwise offset of `angle` from the window's lower edge.
    pub fn offset_of(&self, angle: f64) -> f64 {
        (angle - self.low).rem_euclid(TAU)
    }

    pub fn center(&self) -> f64 {
        wrap_pi(self.low + 0.5 * self.span())
    }
}

/// Distance acceptance window (inclusive).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistanceWindow {
    pub low: f64,
    pub high: f64,
}

impl DistanceWindow {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    #[inline]
    pub fn contains(&self, distance: f64) -> bool {
        distance >= self.low && distance <= self.high
    }
}

/// Combined geometric window used by the matcher.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchWindow {
    pub angle: AngleWindow,
    pub distance: DistanceWindow,
}

impl MatchWindow {
    pub fn new(angle: AngleWindow, distance: DistanceWindow) -> Self {
        Self { angle, distance }
    }

    #[inline]
    pub fn accepts(&self, distance: f64, angle: f64) -> bool {
        self.distance.contains(distance) && self.angle.contains(angle)
    }
}

/// Result of the spectral orientation/spacing estimate.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationEstimate {
    pub angle_low: f64,
    pub angle_high: f64,
    pub dist_low: f64,
    pub dist_high: f64,
    pub success: bool,
    /// Dominant direction after π resolution and flip/mirror, before windowing.
    pub theta: f64,
    /// Clamped angular spread of the directionality peak.
    pub sigma: f64,
    /// Spacing peaks that survived artifact rejection.
    pub peaks: usize,
    /// Real-world units per raster pixel.
    pub downscale: f64,
}

impl OrientationEstimate {
    pub fn angle_window(&self) -> AngleWindow {
        AngleWindow::new(self.angle_low, self.angle_high)
    }

    pub fn distance_window(&self) -> DistanceWindow {
        DistanceWindow::new(self.dist_low, self.dist_high)
    }
}

/// One diffraction order of a chain.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OrderSlot {
    pub order: usize,
    /// Index into the `LocalizationSet`; `None` for unreached orders.
    pub localization: Option<usize>,
    pub x: f64,
    pub y: f64,
    pub intensity: f64,
}

impl OrderSlot {
    pub fn empty(order: usize) -> Self {
        Self {
            order,
            localization: None,
            x: 0.0,
            y: 0.0,
            intensity: 0.0,
        }
    }

    #[inline]
    pub fn is_populated(&self) -> bool {
        self.localization.is_some()
    }
}

/// Geometry between two consecutive populated orders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct OrderLink {
    pub distance: f64,
    pub angle: f64,
}

/// One emitter's appearances across successive diffraction orders.
///
/// `slots` always holds one entry per configured order and `links` one entry
/// per consecutive slot pair; entries past the last reached order are zero.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderChain {
    pub id: usize,
    pub frame: u32,
    pub slots: Vec<OrderSlot>,
    pub links: Vec<OrderLink>,
}

impl OrderChain {
    pub fn orders(&self) -> usize {
        self.slots.len()
    }

    /// Number of reached orders (populated slots are always a prefix).
    pub fn populated(&self) -> usize {
        self.slots.iter().take_while(|s| s.is_populated()).count()
    }

    /// Links between populated slots.
    pub fn populated_links(&self) -> &[OrderLink] {
        let n = self.populated().saturating_sub(1);
        &self.links[..n.min(self.links.len())]
    }

    /// Order-0 position.
    pub fn anchor(&self) -> [f64; 2] {
        let s = &self.slots[0];
        [s.x, s.y]
    }

    pub fn mean_position(&self) -> [f64; 2] {
        let n = self.populated().max(1) as f64;
        let (sx, sy) = self
            .slots
            .iter()
            .filter(|s| s.is_populated())
            .fold((0.0, 0.0), |(ax, ay), s| (ax + s.x, ay + s.y));
        [sx / n, sy / n]
    }

    pub fn total_intensity(&self) -> f64 {
        self.slots
            .iter()
            .filter(|s| s.is_populated())
            .map(|s| s.intensity)
            .sum()
    }

    pub fn mean_distance(&self) -> f64 {
        let links = self.populated_links();
        if links.is_empty() {
            return 0.0;
        }
        links.iter().map(|l| l.distance).sum::<f64>() / links.len() as f64
    }
}

/// One of the four flip/mirror sign hypotheses for the recovered orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permutation {
    pub flip: bool,
    pub mirror: bool,
}

impl Permutation {
    /// Canonical evaluation order; ties between permutations resolve to the
    /// lowest index in this table.
    pub const CANONICAL: [Permutation; 4] = [
        Permutation::new(false, false),
        Permutation::new(true, false),
        Permutation::new(false, true),
        Permutation::new(true, true),
    ];

    pub const fn new(flip: bool, mirror: bool) -> Self {
        Self { flip, mirror }
    }

    pub fn index(&self) -> usize {
        (self.flip as usize) + 2 * (self.mirror as usize)
    }

    /// Applies the hypothesis to a direction: `flip` moves it into the opposite
    /// half-plane, `mirror` negates it.
    pub fn apply(&self, theta: f64) -> f64 {
        let mut t = wrap_pi(theta);
        if self.flip {
            t = if t > 0.0 { t - PI } else { t + PI };
        }
        if self.mirror {
            t = -t;
        }
        wrap_pi(t)
    }
}
