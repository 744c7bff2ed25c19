//! Frequency-domain helpers on [`ImageF32`](crate::image::ImageF32).
//!
//! The 2D transform is separable: rows first, then columns via a transpose.
//! Spectra are returned quadrant-shifted so DC sits at `(w / 2, h / 2)`.

mod fft;

pub use fft::{fft2, fftshift, magnitude_spectrum};
