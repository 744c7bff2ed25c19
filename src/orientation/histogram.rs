use crate::angle::{normalize_half_pi, orientation_delta};
use crate::image::ImageF32;
use crate::spectrum::magnitude_spectrum;
use std::f64::consts::PI;

/// Circular histogram over [0, π) used to find the dominant spectral direction.
#[derive(Clone, Debug)]
pub(crate) struct OrientationHistogram {
    bins: Vec<f64>,
    bin_width: f64,
}

/// Dominant direction in [0, π) and its angular spread.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PeakFit {
    pub theta: f64,
    pub sigma: f64,
}

impl OrientationHistogram {
    pub(crate) fn new(num_bins: usize) -> Self {
        let num_bins = num_bins.max(1);
        OrientationHistogram {
            bins: vec![0.0; num_bins],
            bin_width: PI / num_bins as f64,
        }
    }

    /// Directionality of `image` from its Fourier components: the power of
    /// every frequency at least `min_radius` away from DC is accumulated into
    /// the bin of its polar angle.
    pub(crate) fn from_fourier_components(
        image: &ImageF32,
        num_bins: usize,
        min_radius: f64,
    ) -> Self {
        let mut hist = Self::new(num_bins);
        let spectrum = magnitude_spectrum(image);
        let cx = (spectrum.w / 2) as f64;
        let cy = (spectrum.h / 2) as f64;
        let max_radius = cx.min(cy);
        for y in 0..spectrum.h {
            let dy = y as f64 - cy;
            for (x, &amp) in spectrum.row(y).iter().enumerate() {
                let dx = x as f64 - cx;
                let r = (dx * dx + dy * dy).sqrt();
                if r < min_radius || r >= max_radius {
                    continue;
                }
                let power = (amp as f64) * (amp as f64);
                hist.accumulate(normalize_half_pi(dy.atan2(dx)), power);
            }
        }
        hist
    }

    pub(crate) fn bins(&self) -> &[f64] {
        &self.bins
    }

    pub(crate) fn bin_center(&self, index: usize) -> f64 {
        (index as f64 + 0.5) * self.bin_width
    }

    pub(crate) fn accumulate(&mut self, angle: f64, weight: f64) {
        if self.bins.is_empty() || !angle.is_finite() {
            return;
        }
        let mut idx = (angle / self.bin_width) as usize;
        if idx >= self.bins.len() {
            idx = self.bins.len() - 1;
        }
        self.bins[idx] += weight.max(0.0);
    }

    /// Applies a circular [1, 2, 1]/4 smoothing kernel to reduce bin quantization noise.
    pub(crate) fn smooth_121(&mut self) {
        let n = self.bins.len();
        if n <= 1 {
            return;
        }
        let mut smoothed = vec![0.0f64; n];
        for (i, dst) in smoothed.iter_mut().enumerate() {
            let prev = self.bins[(i + n - 1) % n];
            let curr = self.bins[i];
            let next = self.bins[(i + 1) % n];
            *dst = (prev + 2.0 * curr + next) * 0.25;
        }
        self.bins = smoothed;
    }

    /// Refines the angle around a peak by computing a circular mean over a window.
    pub(crate) fn refined_angle(&self, index: usize, half_window: usize) -> f64 {
        if self.bins.is_empty() {
            return 0.0;
        }
        let n = self.bins.len();
        let mut sx = 0.0f64;
        let mut sy = 0.0f64;
        let mut total = 0.0f64;
        let half = half_window.min(n.saturating_sub(1) / 2);
        for offset in -(half as isize)..=(half as isize) {
            let idx = ((index as isize + offset).rem_euclid(n as isize)) as usize;
            let weight = self.bins[idx];
            if weight <= 0.0 {
                continue;
            }
            total += weight;
            let doubled = self.bin_center(idx) * 2.0;
            sx += weight * doubled.cos();
            sy += weight * doubled.sin();
        }
        if total <= 0.0 || (sx * sx + sy * sy) <= 1e-24 {
            return self.bin_center(index);
        }
        normalize_half_pi(0.5 * sy.atan2(sx))
    }

    /// Angular standard deviation of the floor-subtracted mass around `theta`.
    /// The floor is the median bin, which stands for isotropic background.
    pub(crate) fn spread(&self, index: usize, theta: f64, half_window: usize) -> f64 {
        let n = self.bins.len();
        if n == 0 {
            return 0.0;
        }
        let floor = median(&self.bins);
        let half = half_window.min(n.saturating_sub(1) / 2);
        let mut total = 0.0;
        let mut second_moment = 0.0;
        for offset in -(half as isize)..=(half as isize) {
            let idx = ((index as isize + offset).rem_euclid(n as isize)) as usize;
            let weight = (self.bins[idx] - floor).max(0.0);
            if weight <= 0.0 {
                continue;
            }
            let delta = orientation_delta(self.bin_center(idx), theta);
            total += weight;
            second_moment += weight * delta * delta;
        }
        if total <= 0.0 {
            return PI / 2.0;
        }
        (second_moment / total).sqrt()
    }

    /// Smooths, locates the strongest bin and fits direction and spread.
    pub(crate) fn fit_peak(&mut self, refine_half_window: usize, spread_half_window: usize) -> Option<PeakFit> {
        self.smooth_121();
        let peak = self.argmax()?;
        if self.bins[peak] <= 0.0 {
            return None;
        }
        let theta = self.refined_angle(peak, refine_half_window);
        let sigma = self.spread(peak, theta, spread_half_window);
        Some(PeakFit { theta, sigma })
    }

    fn argmax(&self) -> Option<usize> {
        let mut best_idx = None;
        let mut best_val = f64::MIN;
        for (i, &val) in self.bins.iter().enumerate() {
            if val > best_val {
                best_val = val;
                best_idx = Some(i);
            }
        }
        best_idx
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let m = sorted.len();
    if m == 0 {
        0.0
    } else if m % 2 == 1 {
        sorted[m / 2]
    } else {
        0.5 * (sorted[m / 2 - 1] + sorted[m / 2])
    }
}

#[cfg(test)]
mod tests {
    use super::OrientationHistogram;
    use crate::angle::normalize_half_pi;
    use crate::image::ImageF32;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn accumulate_and_smooth() {
        let mut hist = OrientationHistogram::new(8);
        hist.accumulate(0.0, 1.0);
        hist.accumulate(FRAC_PI_2, 3.0);
        hist.smooth_121();
        let bins = hist.bins();
        assert_eq!(bins.len(), 8);
        assert!((bins.iter().sum::<f64>() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn refined_angle_interpolates() {
        let mut hist = OrientationHistogram::new(18);
        let bw = PI / 18.0;
        let target = bw * 4.3;
        hist.accumulate(target, 2.0);
        hist.accumulate(target + bw * 0.5, 1.0);
        hist.smooth_121();
        let refined = hist.refined_angle(4, 1);
        let expected = normalize_half_pi(target);
        assert!(
            (refined - expected).abs() < bw * 0.5,
            "refined={refined} expected={expected}"
        );
    }

    #[test]
    fn peak_fit_handles_wrap_at_zero() {
        let mut hist = OrientationHistogram::new(180);
        hist.accumulate(0.2f64.to_radians(), 10.0);
        hist.accumulate(PI - 0.7f64.to_radians(), 10.0);
        let fit = hist.fit_peak(2, 10).expect("peak");
        let folded = fit.theta.min(PI - fit.theta);
        assert!(folded < 2f64.to_radians(), "theta={}", fit.theta);
        assert!(fit.sigma < 3f64.to_radians(), "sigma={}", fit.sigma);
    }

    #[test]
    fn stripes_yield_their_normal_direction() {
        // Intensity varies along 60°, so the Fourier energy lies on that direction.
        let n = 128;
        let angle = 60f64.to_radians();
        let (c, s) = (angle.cos(), angle.sin());
        let mut img = ImageF32::new(n, n);
        for y in 0..n {
            for x in 0..n {
                let t = x as f64 * c + y as f64 * s;
                img.set(x, y, (1.0 + (2.0 * PI * t / 9.0).cos()) as f32);
            }
        }
        let mut hist = OrientationHistogram::from_fourier_components(&img, 180, 3.0);
        let fit = hist.fit_peak(2, 10).expect("peak");
        let err = (fit.theta - angle).abs();
        assert!(err < 3f64.to_radians(), "theta={} expected={}", fit.theta, angle);
    }
}
