//! Bright-peak extraction on a spectrum: quantile threshold, 8-connected
//! labeling and intensity-weighted centroids.

use crate::image::ImageF32;

/// Connected bright region of a thresholded image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Blob {
    /// Intensity-weighted centroid in pixel coordinates.
    pub x: f64,
    pub y: f64,
    pub peak: f32,
    pub pixels: usize,
}

/// Value below which a fraction `q` of the pixels fall.
pub(crate) fn quantile(image: &ImageF32, q: f64) -> f32 {
    if image.data.is_empty() {
        return 0.0;
    }
    let mut values = image.data.clone();
    let k = ((values.len() - 1) as f64 * q.clamp(0.0, 1.0)).round() as usize;
    let (_, kth, _) =
        values.select_nth_unstable_by(k, |a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    *kth
}

/// Blobs of all pixels strictly above `threshold`.
pub(crate) fn extract_blobs(image: &ImageF32, threshold: f32) -> Vec<Blob> {
    let mask: Vec<bool> = image.data.iter().map(|&v| v > threshold).collect();
    let (labels, count) = label_components(&mask, image.w, image.h);
    accumulate_blobs(image, &labels, count)
}

/// Two-pass union-find labeling with 8-connectivity. Label 0 is background;
/// foreground labels are compacted to `1..=count`.
fn label_components(mask: &[bool], w: usize, h: usize) -> (Vec<u32>, usize) {
    fn find(parent: &mut [u32], mut x: u32) -> u32 {
        while parent[x as usize] != x {
            parent[x as usize] = parent[parent[x as usize] as usize];
            x = parent[x as usize];
        }
        x
    }

    let mut labels = vec![0u32; w * h];
    let mut parent: Vec<u32> = vec![0];

    for row in 0..h {
        for col in 0..w {
            let idx = row * w + col;
            if !mask[idx] {
                continue;
            }
            let mut neighbors = [0u32; 4];
            if col > 0 {
                neighbors[0] = labels[idx - 1];
            }
            if row > 0 {
                neighbors[1] = labels[idx - w];
                if col > 0 {
                    neighbors[2] = labels[idx - w - 1];
                }
                if col + 1 < w {
                    neighbors[3] = labels[idx - w + 1];
                }
            }
            let smallest = neighbors.iter().copied().filter(|&l| l > 0).min();
            match smallest {
                None => {
                    let next = parent.len() as u32;
                    parent.push(next);
                    labels[idx] = next;
                }
                Some(min_label) => {
                    labels[idx] = min_label;
                    for &n in neighbors.iter().filter(|&&l| l > 0) {
                        let ra = find(&mut parent, min_label);
                        let rb = find(&mut parent, n);
                        if ra != rb {
                            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
                            parent[hi as usize] = lo;
                        }
                    }
                }
            }
        }
    }

    let mut compact = vec![0u32; parent.len()];
    let mut count = 0usize;
    for label in labels.iter_mut() {
        if *label == 0 {
            continue;
        }
        let root = find(&mut parent, *label) as usize;
        if compact[root] == 0 {
            count += 1;
            compact[root] = count as u32;
        }
        *label = compact[root];
    }
    (labels, count)
}

fn accumulate_blobs(image: &ImageF32, labels: &[u32], count: usize) -> Vec<Blob> {
    #[derive(Clone, Copy, Default)]
    struct Accum {
        sum_x: f64,
        sum_y: f64,
        mass: f64,
        peak: f32,
        pixels: usize,
    }

    let mut accums = vec![Accum::default(); count + 1];
    for (idx, (&label, &value)) in labels.iter().zip(image.data.iter()).enumerate() {
        if label == 0 {
            continue;
        }
        let acc = &mut accums[label as usize];
        let weight = value.max(0.0) as f64;
        acc.sum_x += weight * (idx % image.w) as f64;
        acc.sum_y += weight * (idx / image.w) as f64;
        acc.mass += weight;
        acc.peak = acc.peak.max(value);
        acc.pixels += 1;
    }

    accums
        .into_iter()
        .skip(1)
        .filter(|a| a.pixels > 0 && a.mass > 0.0)
        .map(|a| Blob {
            x: a.sum_x / a.mass,
            y: a.sum_y / a.mass,
            peak: a.peak,
            pixels: a.pixels,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separate_and_diagonal_regions() {
        let mut img = ImageF32::new(10, 10);
        // diagonal neighbours merge under 8-connectivity
        img.set(1, 1, 5.0);
        img.set(2, 2, 5.0);
        // isolated single pixel
        img.set(7, 3, 9.0);
        // U-shape whose arms are joined only at the bottom
        for y in 5..9 {
            img.set(5, y, 2.0);
            img.set(7, y, 2.0);
        }
        img.set(6, 8, 2.0);

        let mut blobs = extract_blobs(&img, 1.0);
        blobs.sort_by(|a, b| a.pixels.cmp(&b.pixels));
        assert_eq!(blobs.len(), 3);
        assert_eq!(blobs[0].pixels, 1);
        assert_eq!(blobs[0].peak, 9.0);
        assert_eq!(blobs[1].pixels, 2);
        assert!((blobs[1].x - 1.5).abs() < 1e-12);
        assert_eq!(blobs[2].pixels, 9);
        assert!((blobs[2].x - 6.0).abs() < 1e-12);
    }

    #[test]
    fn weighted_centroid() {
        let mut img = ImageF32::new(5, 5);
        img.set(1, 2, 1.0);
        img.set(2, 2, 3.0);
        let blobs = extract_blobs(&img, 0.5);
        assert_eq!(blobs.len(), 1);
        assert!((blobs[0].x - 1.75).abs() < 1e-12);
        assert!((blobs[0].y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn quantile_picks_top_values() {
        let data: Vec<f32> = (0..1000).map(|v| v as f32).collect();
        let img = ImageF32::from_vec(100, 10, data).unwrap();
        let t = quantile(&img, 0.99);
        assert!((t - 989.0).abs() <= 1.0, "t={t}");
        let above = img.data.iter().filter(|&&v| v > t).count();
        assert!((9..=11).contains(&above));
    }
}
