//! Tunables of the orientation estimator.
//!
//! The fractional cutoffs, the quantile and the σ clamp are empirical values
//! carried over from practice on real diffraction-order datasets.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorParams {
    /// Side of the square density raster (pixels).
    pub raster_size: usize,
    /// Side of the central spectrum crop used for the spacing transform.
    pub crop_size: usize,
    /// Bins of the [0, π) directionality histogram.
    pub histogram_bins: usize,
    /// Fourier components closer than this to DC are ignored (pixels).
    pub min_frequency_radius: f64,
    /// Half window (bins) of the circular mean around the histogram peak.
    pub refine_half_window: usize,
    /// Half window (bins) of the spread measurement around the peak.
    pub spread_half_window: usize,
    /// Clamp of the fitted angular spread (radians).
    pub sigma_min: f64,
    pub sigma_max: f64,
    /// Window half width, in σ, around the spectral direction.
    pub coarse_window_sigmas: f64,
    /// Window half width, in σ, around the spacing-peak direction.
    pub refined_window_sigmas: f64,
    /// Pixel quantile above which the spacing spectrum is considered a peak.
    pub peak_quantile: f64,
    /// Peaks weaker than this fraction of the strongest surviving peak are noise.
    pub min_relative_peak: f64,
    /// Accepted peak distances as fractions of the average axis extent.
    pub min_distance_fraction: f64,
    pub max_distance_fraction: f64,
    /// Distance window padding as a fraction of the average axis extent.
    pub distance_buffer_fraction: f64,
    /// Multipliers applied to the smallest and largest peak distance.
    pub distance_low_factor: f64,
    pub distance_high_factor: f64,
    /// Only peaks whose polar angle exceeds this contribute to the direction
    /// average, which keeps one peak of each ± pair (radians).
    pub min_peak_angle: f64,
    /// Peaks farther than this multiple of the nearest peak distance are
    /// harmonics or lattice diagonals and do not steer the direction.
    pub fundamental_distance_factor: f64,
    /// Peaks whose orientation differs from the spectral direction by this
    /// much or more (radians, modulo π) do not steer the direction.
    pub fundamental_angle_tolerance: f64,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            raster_size: 1024,
            crop_size: 512,
            histogram_bins: 180,
            min_frequency_radius: 4.0,
            refine_half_window: 2,
            spread_half_window: 10,
            sigma_min: 0.04,
            sigma_max: 0.2,
            coarse_window_sigmas: 2.5,
            refined_window_sigmas: 2.0,
            peak_quantile: 0.9986,
            min_relative_peak: 0.25,
            min_distance_fraction: 0.01,
            max_distance_fraction: 0.1,
            distance_buffer_fraction: 0.0075,
            distance_low_factor: 0.9,
            distance_high_factor: 1.1,
            min_peak_angle: 0.1,
            fundamental_distance_factor: 1.2,
            fundamental_angle_tolerance: FRAC_PI_4,
        }
    }
}
