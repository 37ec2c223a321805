//! Oriented FAST and rotated BRIEF feature extractor.
//!
//! Runs over an image pyramid: FAST candidates per level, scored and
//! non-max suppressed by Harris response, oriented by intensity centroid
//! and described with steered BRIEF on a smoothed copy of the level.
//! Keypoints from all levels are ranked by response and capped.

use image::imageops::{self, FilterType};
use image::GrayImage;
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

use crate::features::domain::feature_extractor::FeatureExtractor;
use crate::features::domain::feature_set::{Descriptor, FeatureSet, Keypoint};
use crate::features::infrastructure::brief::{BriefPattern, BORDER};
use crate::features::infrastructure::fast::fast_corners;
use crate::features::infrastructure::harris::harris_response;
use crate::shared::config::GroupingConfig;
use crate::shared::constants::*;
use crate::shared::frame::Frame;

const ORIENTATION_RADIUS: i32 = 15;
const DESCRIPTOR_BLUR_SIGMA: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct OrbParams {
    pub max_keypoints: usize,
    pub fast_threshold: f32,
    pub fast_n: usize,
    pub n_scales: usize,
    pub downscale: f64,
    pub harris_k: f32,
}

impl Default for OrbParams {
    fn default() -> Self {
        Self {
            max_keypoints: DEFAULT_MAX_KEYPOINTS,
            fast_threshold: DEFAULT_FAST_THRESHOLD,
            fast_n: DEFAULT_FAST_N,
            n_scales: DEFAULT_N_SCALES,
            downscale: DEFAULT_DOWNSCALE,
            harris_k: DEFAULT_HARRIS_K,
        }
    }
}

impl From<&GroupingConfig> for OrbParams {
    fn from(config: &GroupingConfig) -> Self {
        Self {
            max_keypoints: config.max_keypoints,
            fast_threshold: config.fast_threshold,
            fast_n: config.fast_n,
            n_scales: config.n_scales,
            downscale: config.downscale,
            harris_k: config.harris_k,
        }
    }
}

pub struct OrbExtractor {
    params: OrbParams,
    pattern: BriefPattern,
}

impl OrbExtractor {
    pub fn new(params: OrbParams) -> Self {
        Self {
            params,
            pattern: BriefPattern::default(),
        }
    }

    fn extract_level(&self, level: &GrayImage, octave: u8, row_scale: f64, col_scale: f64) -> Vec<(Keypoint, Descriptor)> {
        let image = to_unit_array(level);
        let smoothed = to_unit_array(&imageops::blur(level, DESCRIPTOR_BLUR_SIGMA));

        let corners = fast_corners(image.view(), self.params.fast_threshold, self.params.fast_n);
        let response = harris_response(image.view(), self.params.harris_k);

        let (h, w) = image.dim();
        let mut features = Vec::new();
        for r in BORDER..h - BORDER {
            for c in BORDER..w - BORDER {
                if !corners[[r, c]] || !is_local_max(&corners, &response, r, c) {
                    continue;
                }
                let angle = intensity_centroid_angle(image.view(), r, c);
                let descriptor = self.pattern.describe(smoothed.view(), r, c, angle);
                let keypoint = Keypoint {
                    row: r as f64 * row_scale,
                    col: c as f64 * col_scale,
                    response: response[[r, c]],
                    angle,
                    octave,
                };
                features.push((keypoint, descriptor));
            }
        }
        features
    }
}

impl Default for OrbExtractor {
    fn default() -> Self {
        Self::new(OrbParams::default())
    }
}

impl FeatureExtractor for OrbExtractor {
    fn extract(&self, frame: &Frame) -> FeatureSet {
        let Some(base) = to_gray_image(frame) else {
            return FeatureSet::empty();
        };
        let (base_w, base_h) = base.dimensions();

        let levels: Vec<(u8, GrayImage)> = (0..self.params.n_scales)
            .map_while(|s| {
                let factor = self.params.downscale.powi(s as i32);
                let w = (base_w as f64 / factor).round() as u32;
                let h = (base_h as f64 / factor).round() as u32;
                if (w.min(h) as usize) < 2 * BORDER + 1 {
                    return None;
                }
                let level = if s == 0 {
                    base.clone()
                } else {
                    imageops::resize(&base, w, h, FilterType::Triangle)
                };
                Some((s as u8, level))
            })
            .collect();

        let per_level: Vec<Vec<(Keypoint, Descriptor)>> = levels
            .par_iter()
            .map(|(octave, level)| {
                let row_scale = base_h as f64 / level.height() as f64;
                let col_scale = base_w as f64 / level.width() as f64;
                self.extract_level(level, *octave, row_scale, col_scale)
            })
            .collect();

        let mut all: Vec<(Keypoint, Descriptor)> = per_level.into_iter().flatten().collect();
        // Stable sort keeps level-then-raster order among equal responses.
        all.sort_by(|a, b| {
            b.0.response
                .partial_cmp(&a.0.response)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        all.truncate(self.params.max_keypoints);

        all.into_iter().collect()
    }
}

fn to_gray_image(frame: &Frame) -> Option<GrayImage> {
    let data = match frame.channels() {
        1 => frame.data().to_vec(),
        3 => frame
            .data()
            .chunks_exact(3)
            .map(|px| {
                (0.2125 * px[0] as f32 + 0.7154 * px[1] as f32 + 0.0721 * px[2] as f32).round() as u8
            })
            .collect(),
        _ => return None,
    };
    GrayImage::from_raw(frame.width(), frame.height(), data)
}

fn to_unit_array(image: &GrayImage) -> Array2<f32> {
    let (w, h) = image.dimensions();
    Array2::from_shape_fn((h as usize, w as usize), |(r, c)| {
        image.get_pixel(c as u32, r as u32)[0] as f32 / 255.0
    })
}

/// 3x3 non-maximum suppression among FAST candidates. Plateaus keep the
/// first candidate in raster order.
fn is_local_max(corners: &Array2<bool>, response: &Array2<f32>, r: usize, c: usize) -> bool {
    let value = response[[r, c]];
    for dr in -1isize..=1 {
        for dc in -1isize..=1 {
            if dr == 0 && dc == 0 {
                continue;
            }
            let (nr, nc) = ((r as isize + dr) as usize, (c as isize + dc) as usize);
            if !corners[[nr, nc]] {
                continue;
            }
            let other = response[[nr, nc]];
            let earlier = dr < 0 || (dr == 0 && dc < 0);
            if other > value || (earlier && other == value) {
                return false;
            }
        }
    }
    true
}

/// Orientation from the intensity centroid of a circular patch.
fn intensity_centroid_angle(image: ArrayView2<f32>, r: usize, c: usize) -> f32 {
    let mut m01 = 0.0f32;
    let mut m10 = 0.0f32;
    let radius_sq = ORIENTATION_RADIUS * ORIENTATION_RADIUS;
    for dr in -ORIENTATION_RADIUS..=ORIENTATION_RADIUS {
        for dc in -ORIENTATION_RADIUS..=ORIENTATION_RADIUS {
            if dr * dr + dc * dc > radius_sq {
                continue;
            }
            let v = image[[(r as i32 + dr) as usize, (c as i32 + dc) as usize]];
            m01 += dr as f32 * v;
            m10 += dc as f32 * v;
        }
    }
    m01.atan2(m10)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Random blocky texture: plenty of high-contrast corners.
    pub(crate) fn textured_frame(width: u32, height: u32, block: u32, seed: u64) -> Frame {
        let mut rng = StdRng::seed_from_u64(seed);
        let bw = width.div_ceil(block);
        let bh = height.div_ceil(block);
        let blocks: Vec<u8> = (0..bw * bh).map(|_| rng.random_range(0..=255)).collect();
        let mut data = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(blocks[((y / block) * bw + x / block) as usize]);
            }
        }
        Frame::gray(data, width, height)
    }

    /// `width x height` window of `frame` starting at `(x0, y0)`.
    pub(crate) fn crop(frame: &Frame, x0: u32, y0: u32, width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity((width * height) as usize);
        for y in y0..y0 + height {
            let start = (y * frame.width() + x0) as usize;
            data.extend_from_slice(&frame.data()[start..start + width as usize]);
        }
        Frame::gray(data, width, height)
    }

    #[test]
    fn test_blank_image_yields_no_features() {
        let frame = Frame::gray(vec![128u8; 200 * 150], 200, 150);
        let set = OrbExtractor::default().extract(&frame);
        assert!(set.is_empty());
    }

    #[test]
    fn test_image_smaller_than_border_yields_no_features() {
        let frame = textured_frame(30, 30, 3, 1);
        let set = OrbExtractor::default().extract(&frame);
        assert!(set.is_empty());
    }

    #[test]
    fn test_textured_image_yields_features() {
        let frame = textured_frame(200, 160, 6, 7);
        let set = OrbExtractor::default().extract(&frame);
        assert!(set.len() > 50, "got {}", set.len());
        assert_eq!(set.keypoints().len(), set.descriptors().len());
    }

    #[test]
    fn test_keypoints_respect_cap_and_ranking() {
        let frame = textured_frame(200, 160, 5, 3);
        let params = OrbParams {
            max_keypoints: 25,
            ..OrbParams::default()
        };
        let set = OrbExtractor::new(params).extract(&frame);
        assert_eq!(set.len(), 25);
        let responses: Vec<f32> = set.keypoints().iter().map(|k| k.response).collect();
        assert!(responses.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_keypoints_lie_inside_image() {
        let frame = textured_frame(180, 140, 6, 11);
        let set = OrbExtractor::default().extract(&frame);
        for kp in set.keypoints() {
            assert!(kp.row >= 0.0 && kp.row < 140.0);
            assert!(kp.col >= 0.0 && kp.col < 180.0);
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let frame = textured_frame(160, 120, 6, 5);
        let extractor = OrbExtractor::default();
        assert_eq!(extractor.extract(&frame), extractor.extract(&frame));
    }

    #[test]
    fn test_colour_frame_is_converted() {
        let gray = textured_frame(120, 100, 6, 9);
        let rgb: Vec<u8> = gray.data().iter().flat_map(|&v| [v, v, v]).collect();
        let colour = Frame::new(rgb, 120, 100, 3, 0);
        let extractor = OrbExtractor::default();
        assert_eq!(extractor.extract(&colour), extractor.extract(&gray));
    }

    #[test]
    fn test_single_scale_uses_octave_zero_only() {
        let frame = textured_frame(160, 120, 6, 13);
        let params = OrbParams {
            n_scales: 1,
            ..OrbParams::default()
        };
        let set = OrbExtractor::new(params).extract(&frame);
        assert!(!set.is_empty());
        assert!(set.keypoints().iter().all(|k| k.octave == 0));
    }
}
