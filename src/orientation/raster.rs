use crate::image::ImageF32;

/// Point-density image of a localization cloud.
#[derive(Clone, Debug)]
pub(crate) struct Raster {
    pub image: ImageF32,
    /// Real-world units per pixel (identical on both axes).
    pub downscale: f64,
    /// Mean of the x and y coordinate ranges measured from the origin.
    pub average_extent: f64,
}

/// Bins `points` into a `size × size` count image.
///
/// Coordinates are measured from `min(0, min_coord)` so negative inputs stay
/// in range. One integer downscale factor, `ceil((max_coord + 1) / size)`
/// over both axes, keeps the full extent in frame without distorting angles.
pub(crate) fn rasterize(points: &[[f64; 2]], size: usize) -> Option<Raster> {
    let finite: Vec<[f64; 2]> = points
        .iter()
        .copied()
        .filter(|p| p[0].is_finite() && p[1].is_finite())
        .collect();
    if finite.is_empty() || size == 0 {
        return None;
    }
    let mut origin = [0.0f64; 2];
    let mut max = [f64::MIN; 2];
    for p in &finite {
        for axis in 0..2 {
            origin[axis] = origin[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    let span = [max[0] - origin[0], max[1] - origin[1]];
    let max_coord = span[0].max(span[1]);
    let downscale = ((max_coord + 1.0) / size as f64).ceil().max(1.0);

    let mut image = ImageF32::new(size, size);
    let last = (size - 1) as f64;
    for p in &finite {
        let col = ((p[0] - origin[0]) / downscale).floor().clamp(0.0, last) as usize;
        let row = ((p[1] - origin[1]) / downscale).floor().clamp(0.0, last) as usize;
        image.add(col, row, 1.0);
    }
    Some(Raster {
        image,
        downscale,
        average_extent: 0.5 * (span[0] + span[1]),
    })
}

#[cfg(test)]
mod tests {
    use super::rasterize;

    #[test]
    fn fits_full_extent() {
        let points = [[0.0, 0.0], [2047.0, 10.0], [2047.0, 10.5]];
        let raster = rasterize(&points, 1024).unwrap();
        assert_eq!(raster.downscale, 2.0);
        assert_eq!(raster.image.get(1023, 5), 2.0);
        assert_eq!(raster.image.sum(), 3.0);
        assert!((raster.average_extent - (2047.0 + 10.5) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn small_coordinates_keep_unit_scale() {
        let points = [[3.0, 4.0], [-2.0, 1.0]];
        let raster = rasterize(&points, 16).unwrap();
        assert_eq!(raster.downscale, 1.0);
        assert_eq!(raster.image.get(5, 4), 1.0);
        assert_eq!(raster.image.get(0, 1), 1.0);
    }

    #[test]
    fn empty_input_has_no_raster() {
        assert!(rasterize(&[], 1024).is_none());
    }
}
