//! Spectral orientation and spacing estimator.
//!
//! Recovers the dominant inter-order displacement of a localization cloud
//! without knowing which points belong together.
//!
//! Pipeline
//! - Density raster: all positions binned into a square count image with one
//!   isotropic downscale factor.
//! - Magnitude spectrum: centred FFT magnitude of the raster, DC removed. A
//!   repeated offset `d` shows up as fringes perpendicular to `d`.
//! - Directionality: power of the magnitude's own Fourier components binned by
//!   polar angle over [0, π); a smoothed peak gives `theta` and its spread
//!   `sigma`.
//! - Half-plane: energy balance of the spectrum on either side of the centre
//!   line picks `theta` or `theta - π`.
//! - Hypothesis: flip/mirror applied, `sigma` clamped, coarse window.
//! - Spacing: a second magnitude spectrum of the central crop has peaks at
//!   `±d`. Peaks are filtered by distance band and relative strength; their
//!   mean direction refines the window and their distances give the distance
//!   window.
//!
//! Notes
//! - A failed spacing stage is reported through `success == false` and a
//!   `0..0` distance window; it is never an error.
//! - Tunables live in [`EstimatorParams`].

mod blobs;
mod estimator;
mod histogram;
pub mod params;
mod raster;

pub use estimator::{EstimatorTrace, OrientationEstimator, SpacingPeak};
pub use params::EstimatorParams;
