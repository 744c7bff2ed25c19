use crate::image::ImageF32;
use num_complex::Complex;
use rustfft::FftPlanner;

type C64 = Complex<f64>;

/// Forward 2D DFT of `image`, row-major, unshifted.
pub fn fft2(image: &ImageF32) -> Vec<C64> {
    let (w, h) = (image.w, image.h);
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let mut planner = FftPlanner::<f64>::new();
    let mut rows: Vec<C64> = image
        .data
        .iter()
        .map(|&v| C64::new(v as f64, 0.0))
        .collect();
    // process() walks the buffer in chunks of the transform length
    planner.plan_fft_forward(w).process(&mut rows);

    let mut cols = transpose(&rows, w, h);
    planner.plan_fft_forward(h).process(&mut cols);
    transpose(&cols, h, w)
}

/// Magnitude of the 2D DFT, quadrant-shifted.
pub fn magnitude_spectrum(image: &ImageF32) -> ImageF32 {
    let spectrum = fft2(image);
    let magnitude: Vec<f32> = spectrum.iter().map(|c| c.norm() as f32).collect();
    fftshift(&magnitude, image.w, image.h)
}

/// Swaps quadrants so index (0, 0) moves to (w / 2, h / 2).
pub fn fftshift(data: &[f32], w: usize, h: usize) -> ImageF32 {
    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        let ty = (y + h / 2) % h;
        for x in 0..w {
            let tx = (x + w / 2) % w;
            out.data[ty * w + tx] = data[y * w + x];
        }
    }
    out
}

fn transpose(data: &[C64], w: usize, h: usize) -> Vec<C64> {
    let mut out = vec![C64::new(0.0, 0.0); w * h];
    for y in 0..h {
        for x in 0..w {
            out[x * h + y] = data[y * w + x];
        }
    }
    out
}
