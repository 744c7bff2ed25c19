use crate::angle::{circular_distance, orientation_delta, polar_angle, wrap_pi};
use crate::image::ImageF32;
use crate::spectrum::magnitude_spectrum;
use crate::types::{AngleWindow, OrientationEstimate, Permutation};
use log::debug;
use serde::Serialize;
use std::cmp::Ordering;
use std::f64::consts::PI;
use std::time::Instant;

use super::blobs::{extract_blobs, quantile, Blob};
use super::histogram::OrientationHistogram;
use super::params::EstimatorParams;
use super::raster::rasterize;

/// Spacing peak that survived artifact rejection, in real-world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpacingPeak {
    pub distance: f64,
    pub angle: f64,
    pub strength: f32,
}

/// Intermediate products of one estimate, kept for debugging and reports.
#[derive(Clone, Debug, Default)]
pub struct EstimatorTrace {
    pub density: Option<ImageF32>,
    pub magnitude: Option<ImageF32>,
    pub spacing: Option<ImageF32>,
    pub histogram: Vec<f64>,
    pub peaks: Vec<SpacingPeak>,
    pub elapsed_ms: f64,
}

/// Spectral estimator of the inter-order direction and spacing.
///
/// The density image of a cloud in which every emitter repeats at a fixed
/// offset `d` has a magnitude spectrum modulated by `|cos(k·d / 2)|`. The
/// Fourier components of that magnitude concentrate along `d` (direction),
/// and a second transform of its central crop peaks at `±d` (spacing).
#[derive(Clone, Debug, Default)]
pub struct OrientationEstimator {
    pub params: EstimatorParams,
}

impl OrientationEstimator {
    pub fn new(params: EstimatorParams) -> Self {
        Self { params }
    }

    /// Angle and distance windows for the matcher under the `perm` hypothesis.
    pub fn estimate(&self, points: &[[f64; 2]], perm: Permutation) -> OrientationEstimate {
        self.estimate_with_trace(points, perm).0
    }

    pub fn estimate_with_trace(
        &self,
        points: &[[f64; 2]],
        perm: Permutation,
    ) -> (OrientationEstimate, EstimatorTrace) {
        let t0 = Instant::now();
        let p = &self.params;
        let mut trace = EstimatorTrace::default();

        // 1) density raster
        let Some(raster) = rasterize(points, p.raster_size) else {
            debug!("orientation: no finite points to rasterize");
            return (self.failed(0.0, p.sigma_max, 0.0), trace);
        };

        // 2) magnitude spectrum; DC only carries the point count
        let mut magnitude = magnitude_spectrum(&raster.image);
        let (cx, cy) = (magnitude.w / 2, magnitude.h / 2);
        magnitude.set(cx, cy, 0.0);

        // 3) dominant direction from the directionality histogram
        let mut hist = OrientationHistogram::from_fourier_components(
            &magnitude,
            p.histogram_bins,
            p.min_frequency_radius,
        );
        let fit = hist.fit_peak(p.refine_half_window, p.spread_half_window);
        trace.histogram = hist.bins().to_vec();
        let Some(fit) = fit else {
            debug!("orientation: directionality histogram is empty");
            trace.density = Some(raster.image);
            trace.magnitude = Some(magnitude);
            return (self.failed(0.0, p.sigma_max, raster.downscale), trace);
        };

        // 4) resolve the π ambiguity of the symmetric spectrum
        let base = resolve_half_plane(&magnitude, fit.theta, p.crop_size / 2);

        // 5) caller hypothesis, 6) clamped coarse window
        let sigma = fit.sigma.clamp(p.sigma_min, p.sigma_max);
        let theta = perm.apply(base);
        let mut window = AngleWindow::centered(theta, p.coarse_window_sigmas * sigma);
        debug!(
            "orientation: raw_theta={:.4} sigma_raw={:.4} base={:.4} theta={:.4} flip={} mirror={}",
            fit.theta, fit.sigma, base, theta, perm.flip, perm.mirror
        );

        // 7) spacing spectrum of the central crop
        let crop = magnitude.crop_center(p.crop_size);
        let spacing = magnitude_spectrum(&crop);
        let threshold = quantile(&spacing, p.peak_quantile);
        let mut blobs = extract_blobs(&spacing, threshold);
        let center = ((spacing.w / 2) as f64, (spacing.h / 2) as f64);
        blobs.sort_by(|a, b| {
            center_distance(a, center)
                .partial_cmp(&center_distance(b, center))
                .unwrap_or(Ordering::Equal)
        });

        // 8) real-world offsets relative to the reference blob
        let scale = raster.downscale * p.raster_size as f64 / spacing.w.max(1) as f64;
        let peaks = self.spacing_peaks(&blobs, scale, raster.average_extent);
        debug!(
            "orientation: blobs={} surviving_peaks={} scale={:.3} extent={:.1}",
            blobs.len(),
            peaks.len(),
            scale,
            raster.average_extent
        );

        // 9) recentre on the fundamental peaks along the spectral direction
        let mut centre = theta;
        if let Some(direction) = self.fundamental_direction(&peaks, base) {
            centre = perm.apply(direction);
            window = AngleWindow::centered(centre, p.refined_window_sigmas * sigma);
        }

        // 10) distance window
        let success = !peaks.is_empty();
        let (dist_low, dist_high) = if success {
            let buffer = p.distance_buffer_fraction * raster.average_extent;
            let min = peaks.iter().map(|pk| pk.distance).fold(f64::INFINITY, f64::min);
            let max = peaks.iter().map(|pk| pk.distance).fold(0.0, f64::max);
            (
                (p.distance_low_factor * min - 0.5 * buffer).max(0.0),
                p.distance_high_factor * max + 0.5 * buffer,
            )
        } else {
            (0.0, 0.0)
        };

        let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;
        debug!(
            "orientation: success={} angle=[{:.4}, {:.4}] dist=[{:.1}, {:.1}] elapsed_ms={:.1}",
            success, window.low, window.high, dist_low, dist_high, elapsed_ms
        );

        trace.density = Some(raster.image);
        trace.magnitude = Some(magnitude);
        trace.spacing = Some(spacing);
        trace.peaks = peaks.clone();
        trace.elapsed_ms = elapsed_ms;

        let estimate = OrientationEstimate {
            angle_low: window.low,
            angle_high: window.high,
            dist_low,
            dist_high,
            success,
            theta: centre,
            sigma,
            peaks: peaks.len(),
            downscale: raster.downscale,
        };
        (estimate, trace)
    }

    fn spacing_peaks(&self, blobs: &[Blob], scale: f64, extent: f64) -> Vec<SpacingPeak> {
        let p = &self.params;
        let Some(reference) = blobs.first() else {
            return Vec::new();
        };
        let lo = p.min_distance_fraction * extent;
        let hi = p.max_distance_fraction * extent;
        let mut peaks: Vec<SpacingPeak> = blobs
            .iter()
            .skip(1)
            .filter_map(|b| {
                let ox = (b.x - reference.x) * scale;
                let oy = (b.y - reference.y) * scale;
                let distance = (ox * ox + oy * oy).sqrt();
                (distance >= lo && distance <= hi).then(|| SpacingPeak {
                    distance,
                    angle: polar_angle(ox, oy),
                    strength: b.peak,
                })
            })
            .collect();
        let strongest = peaks.iter().map(|pk| pk.strength).fold(0.0f32, f32::max);
        let cutoff = p.min_relative_peak as f32 * strongest;
        peaks.retain(|pk| pk.strength >= cutoff);
        peaks
    }

    /// Mean direction of the nearest peaks lying along `base` (modulo π),
    /// moved to the half-plane of `base`. Diagonal and harmonic peaks of a
    /// lattice are left out. Only peaks above `min_peak_angle` are averaged,
    /// one of each ± pair.
    fn fundamental_direction(&self, peaks: &[SpacingPeak], base: f64) -> Option<f64> {
        let p = &self.params;
        let nearest = peaks.iter().map(|pk| pk.distance).fold(f64::INFINITY, f64::min);
        let directional: Vec<f64> = peaks
            .iter()
            .filter(|pk| pk.distance <= p.fundamental_distance_factor * nearest)
            .filter(|pk| orientation_delta(pk.angle, base).abs() < p.fundamental_angle_tolerance)
            .map(|pk| pk.angle)
            .filter(|&a| a > p.min_peak_angle)
            .collect();
        if directional.is_empty() {
            return None;
        }
        let avg = directional.iter().sum::<f64>() / directional.len() as f64;
        let partner = wrap_pi(avg - PI);
        if circular_distance(avg, base) <= circular_distance(partner, base) {
            Some(avg)
        } else {
            Some(partner)
        }
    }

    fn failed(&self, theta: f64, sigma: f64, downscale: f64) -> OrientationEstimate {
        let window = AngleWindow::centered(theta, self.params.coarse_window_sigmas * sigma);
        OrientationEstimate {
            angle_low: window.low,
            angle_high: window.high,
            dist_low: 0.0,
            dist_high: 0.0,
            success: false,
            theta,
            sigma,
            peaks: 0,
            downscale,
        }
    }
}

fn center_distance(blob: &Blob, center: (f64, f64)) -> f64 {
    let dx = blob.x - center.0;
    let dy = blob.y - center.1;
    dx * dx + dy * dy
}

/// Picks the half-plane of `theta` ∈ [0, π): the spectrum is rotated by
/// `-theta` and the energy right of the centre line is compared with the
/// energy left of it inside a square of half side `radius`. More energy on the
/// right moves the direction to `theta - π`.
fn resolve_half_plane(magnitude: &ImageF32, theta: f64, radius: usize) -> f64 {
    let (c, s) = (theta.cos(), theta.sin());
    let cx = magnitude.w / 2;
    let cy = magnitude.h / 2;
    let r = radius.min(cx).min(cy) as isize;
    let mut left = 0.0f64;
    let mut right = 0.0f64;
    for dy in -r..r {
        let y = (cy as isize + dy) as usize;
        let row = magnitude.row(y);
        for dx in -r..r {
            let x = (cx as isize + dx) as usize;
            let along = dx as f64 * c + dy as f64 * s;
            let v = row[x] as f64;
            if along < 0.0 {
                left += v;
            } else if along > 0.0 {
                right += v;
            }
        }
    }
    if right > left {
        theta - PI
    } else {
        theta
    }
}
