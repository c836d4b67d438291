//! Canny edge detection on the L1 Sobel magnitude, without pre-smoothing.

use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// `tan(22.5 deg)` in Q15 fixed point.
const TAN_22_5_Q15: i64 = 13573;
const Q15_SHIFT: u32 = 15;

const EDGE: u8 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    Suppressed,
    Weak,
    Strong,
}

/// Returns a binary mask, 255 on edge pixels and 0 elsewhere.
///
/// Gradient strength is `|gx| + |gy|` of the 3x3 Sobel responses (borders
/// replicated). Pixels that are local maxima across the gradient direction
/// and stronger than `high_threshold` seed edges; maxima stronger than
/// `low_threshold` join an edge when 8-connected to one.
pub fn detect_edges(gray: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);
    let (gx, gy) = (gx.as_raw(), gy.as_raw());

    let magnitude: Vec<i32> = gx
        .iter()
        .zip(gy)
        .map(|(&x, &y)| (x as i32).abs() + (y as i32).abs())
        .collect();
    let low = low_threshold.floor() as i32;
    let high = high_threshold.floor() as i32;

    let (w, h) = (width as i64, height as i64);
    let index = |x: i64, y: i64| (x >= 0 && y >= 0 && x < w && y < h).then(|| (y * w + x) as usize);
    let magnitude_at = |x: i64, y: i64| index(x, y).map_or(0, |i| magnitude[i]);

    let mut state = vec![Candidate::Suppressed; magnitude.len()];
    let mut stack = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) as usize;
            let m = magnitude[i];
            if m <= low {
                continue;
            }
            let neighbour = |dx: i64, dy: i64| magnitude_at(x + dx, y + dy);
            if !is_local_maximum(m, gx[i] as i64, gy[i] as i64, neighbour) {
                continue;
            }
            if m > high {
                state[i] = Candidate::Strong;
                stack.push((x, y));
            } else {
                state[i] = Candidate::Weak;
            }
        }
    }

    while let Some((x, y)) = stack.pop() {
        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(j) = index(x + dx, y + dy) else {
                    continue;
                };
                if state[j] == Candidate::Weak {
                    state[j] = Candidate::Strong;
                    stack.push((x + dx, y + dy));
                }
            }
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let strong = state[(y * width + x) as usize] == Candidate::Strong;
        Luma([if strong { EDGE } else { 0 }])
    })
}

/// Non-maximum suppression over the gradient direction, quantised to four
/// sectors. Ties are broken towards the pixel after the current one.
fn is_local_maximum(m: i32, dx: i64, dy: i64, neighbour: impl Fn(i64, i64) -> i32) -> bool {
    let (ax, ay) = (dx.abs(), dy.abs());
    let tan_22 = ax * TAN_22_5_Q15;
    let ay = ay << Q15_SHIFT;

    if ay < tan_22 {
        m > neighbour(-1, 0) && m >= neighbour(1, 0)
    } else {
        let tan_67 = tan_22 + (ax << (Q15_SHIFT + 1));
        if ay > tan_67 {
            m > neighbour(0, -1) && m >= neighbour(0, 1)
        } else {
            let s = if (dx < 0) != (dy < 0) { -1 } else { 1 };
            m > neighbour(-s, -1) && m > neighbour(s, 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn count(mask: &GrayImage) -> usize {
        mask.as_raw().iter().filter(|&&v| v == EDGE).count()
    }

    fn vertical_step(width: u32, height: u32, at: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| Luma([if x < at { 0 } else { 200 }]))
    }

    #[test]
    fn flat_image_has_no_edges() {
        let mask = detect_edges(&GrayImage::from_pixel(32, 24, Luma([120])), 50.0, 150.0);
        assert_eq!(count(&mask), 0);
        assert_eq!(mask.dimensions(), (32, 24));
    }

    #[test]
    fn step_produces_a_one_pixel_line() {
        let mask = detect_edges(&vertical_step(20, 10, 10), 50.0, 150.0);

        assert_eq!(count(&mask), 10);
        for y in 0..10 {
            assert_eq!(mask.get_pixel(9, y).0[0], EDGE);
        }
    }

    #[test]
    fn step_weaker_than_high_threshold_is_dropped() {
        // Step of 200 gives an L1 strength of 800.
        let mask = detect_edges(&vertical_step(20, 10, 10), 50.0, 900.0);
        assert_eq!(count(&mask), 0);

        let mask = detect_edges(&vertical_step(20, 10, 10), 50.0, 799.0);
        assert_eq!(count(&mask), 10);
    }

    #[test]
    fn weak_maxima_join_connected_strong_edges() {
        // One tall column: strong in the top rows, weak below.
        let image = GrayImage::from_fn(20, 10, |x, y| {
            let high = if y < 3 { 200 } else { 30 };
            Luma([if x < 10 { 0 } else { high }])
        });
        let connected = detect_edges(&image, 50.0, 150.0);
        assert_eq!(connected.get_pixel(9, 8).0[0], EDGE);

        // Without the strong rows nothing seeds the edge.
        let isolated = GrayImage::from_fn(20, 10, |x, _| Luma([if x < 10 { 0 } else { 30 }]));
        assert_eq!(count(&detect_edges(&isolated, 50.0, 150.0)), 0);
    }

    #[test]
    fn noise_is_edge_dense() {
        let mut rng = StdRng::seed_from_u64(17);
        let noise = GrayImage::from_fn(128, 128, |_, _| Luma([rng.gen_range(0..=255)]));
        let density = count(&detect_edges(&noise, 50.0, 150.0)) as f64 / (128.0 * 128.0);
        assert!(density > 0.2, "edge density {density}");
    }

    #[test]
    fn single_pixel_image() {
        let mask = detect_edges(&GrayImage::from_pixel(1, 1, Luma([255])), 50.0, 150.0);
        assert_eq!(count(&mask), 0);
    }
}
