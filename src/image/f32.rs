//! Owned single-channel f32 image in row-major layout (stride == width).
//!
//! Used for the density raster and the spectral magnitude images of the
//! orientation estimator.
#[derive(Clone, Debug)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![0.0; w * h],
        }
    }

    /// Wrap an existing row-major buffer. Returns `None` on a size mismatch.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == w * h).then_some(Self { w, h, data })
    }

    #[inline]
    /// Convert (x, y) to a linear index into `data`.
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }
    #[inline]
    /// Get the pixel value at (x, y).
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }
    #[inline]
    /// Set the pixel value at (x, y).
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }
    #[inline]
    /// Add `v` to the pixel at (x, y).
    pub fn add(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] += v;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[f32] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }

    /// Sum of all pixels, accumulated in f64.
    pub fn sum(&self) -> f64 {
        self.data.iter().map(|&v| v as f64).sum()
    }

    /// Square `size × size` window centred on the image centre.
    pub fn crop_center(&self, size: usize) -> ImageF32 {
        let size = size.min(self.w).min(self.h);
        let x0 = self.w / 2 - size / 2;
        let y0 = self.h / 2 - size / 2;
        let mut out = ImageF32::new(size, size);
        for y in 0..size {
            let src = &self.row(y0 + y)[x0..x0 + size];
            out.data[y * size..(y + 1) * size].copy_from_slice(src);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::ImageF32;

    #[test]
    fn crop_center_keeps_center_pixel() {
        let mut img = ImageF32::new(8, 8);
        img.set(4, 4, 7.0);
        let crop = img.crop_center(4);
        assert_eq!(crop.w, 4);
        assert_eq!(crop.get(2, 2), 7.0);
        assert_eq!(crop.sum(), 7.0);
    }

    #[test]
    fn from_vec_checks_size() {
        assert!(ImageF32::from_vec(2, 2, vec![0.0; 3]).is_none());
        assert!(ImageF32::from_vec(2, 2, vec![0.0; 4]).is_some());
    }
}
