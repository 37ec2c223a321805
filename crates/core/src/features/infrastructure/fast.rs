//! FAST segment-test corner detection.
//!
//! A pixel is a corner when at least `n` contiguous pixels on the 16-pixel
//! Bresenham circle of radius 3 are all brighter than `p + t` or all darker
//! than `p - t`.

use ndarray::{Array2, ArrayView2};

pub const RADIUS: usize = 3;

/// `(d_row, d_col)` offsets, clockwise starting at twelve o'clock.
const CIRCLE: [(isize, isize); 16] = [
    (-3, 0),
    (-3, 1),
    (-2, 2),
    (-1, 3),
    (0, 3),
    (1, 3),
    (2, 2),
    (3, 1),
    (3, 0),
    (3, -1),
    (2, -2),
    (1, -3),
    (0, -3),
    (-1, -3),
    (-2, -2),
    (-3, -1),
];

/// Returns a mask of pixels passing the FAST-`n` segment test.
///
/// `threshold` is in the same units as `image` (intensities in `[0, 1]`).
/// Pixels within [`RADIUS`] of the border are never corners.
pub fn fast_corners(image: ArrayView2<f32>, threshold: f32, n: usize) -> Array2<bool> {
    let (h, w) = image.dim();
    let mut mask = Array2::from_elem((h, w), false);
    if h <= 2 * RADIUS || w <= 2 * RADIUS {
        return mask;
    }

    let mut signs = [0i8; 16];
    for r in RADIUS..h - RADIUS {
        for c in RADIUS..w - RADIUS {
            let p = image[[r, c]];
            for (k, &(dr, dc)) in CIRCLE.iter().enumerate() {
                let v = image[[(r as isize + dr) as usize, (c as isize + dc) as usize]];
                signs[k] = if v > p + threshold {
                    1
                } else if v < p - threshold {
                    -1
                } else {
                    0
                };
            }
            mask[[r, c]] = longest_arc(&signs) >= n;
        }
    }
    mask
}

/// Longest run of equal, non-zero signs around the circle (wrapping).
fn longest_arc(signs: &[i8; 16]) -> usize {
    let mut best = 0;
    let mut run = 0;
    let mut current = 0i8;
    for i in 0..32 {
        let s = signs[i % 16];
        if s != 0 && s == current {
            run += 1;
        } else if s != 0 {
            current = s;
            run = 1;
        } else {
            current = 0;
            run = 0;
        }
        best = best.max(run);
    }
    best.min(16)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(h: usize, w: usize, v: f32) -> Array2<f32> {
        Array2::from_elem((h, w), v)
    }

    #[test]
    fn test_flat_image_has_no_corners() {
        let img = flat(20, 20, 0.5);
        let mask = fast_corners(img.view(), 0.05, 9);
        assert!(mask.iter().all(|&m| !m));
    }

    #[test]
    fn test_bright_square_corner_detected() {
        // Bright quadrant: pixel at its corner sees a long dark arc.
        let mut img = flat(21, 21, 0.0);
        for r in 10..21 {
            for c in 10..21 {
                img[[r, c]] = 1.0;
            }
        }
        let mask = fast_corners(img.view(), 0.05, 9);
        assert!(mask[[10, 10]]);
    }

    #[test]
    fn test_isolated_bright_pixel_is_corner() {
        let mut img = flat(11, 11, 0.0);
        img[[5, 5]] = 1.0;
        let mask = fast_corners(img.view(), 0.05, 9);
        assert!(mask[[5, 5]]);
        assert!(!mask[[5, 6]]);
    }

    #[test]
    fn test_straight_edge_is_not_corner() {
        // Left half dark, right half bright: only 7 circle pixels differ.
        let mut img = flat(15, 15, 0.0);
        for r in 0..15 {
            for c in 8..15 {
                img[[r, c]] = 1.0;
            }
        }
        let mask = fast_corners(img.view(), 0.05, 9);
        assert!(!mask[[7, 7]]);
    }

    #[test]
    fn test_tiny_image_returns_empty_mask() {
        let img = flat(5, 5, 0.3);
        let mask = fast_corners(img.view(), 0.05, 9);
        assert_eq!(mask.dim(), (5, 5));
        assert!(mask.iter().all(|&m| !m));
    }

    #[test]
    fn test_longest_arc_wraps_around() {
        let mut signs = [0i8; 16];
        for i in [13, 14, 15, 0, 1, 2, 3, 4, 5] {
            signs[i] = -1;
        }
        assert_eq!(longest_arc(&signs), 9);
    }

    #[test]
    fn test_longest_arc_all_same_is_capped() {
        assert_eq!(longest_arc(&[1i8; 16]), 16);
    }
}
