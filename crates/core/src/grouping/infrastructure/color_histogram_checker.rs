/// HSV colour-layout features.
///
/// Splits the image into a central box (the middle third on each axis) and
/// the four quadrants with that box cut out, then builds a normalised
/// 3D Hue-Saturation-Value histogram per region. The five histograms are
/// concatenated into one vector. No pairwise acceptance rule is defined for
/// these vectors yet, so `is_match` reports the strategy as unsupported.
use crate::grouping::domain::group_checker::{CheckerError, GroupChecker, LoadOptions, MatchOutcome};
use crate::shared::frame::Frame;

const HUE_BINS: usize = 8;
const SAT_BINS: usize = 12;
const VAL_BINS: usize = 3;
const REGIONS: usize = 5;

pub const BINS_PER_REGION: usize = HUE_BINS * SAT_BINS * VAL_BINS;

pub struct ColorHistogramChecker {
    scale: f64,
}

impl ColorHistogramChecker {
    pub fn new(scale: f64) -> Self {
        Self { scale }
    }
}

impl GroupChecker for ColorHistogramChecker {
    type Features = Vec<f64>;

    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            grayscale: false,
            scale: self.scale,
        }
    }

    fn compute_features(&self, frame: &Frame) -> Result<Vec<f64>, CheckerError> {
        if frame.channels() != 3 {
            return Err(CheckerError::InvalidFrame {
                index: frame.index(),
                channels: frame.channels(),
                expected: 3,
            });
        }
        Ok(region_histograms(frame))
    }

    fn is_match(&self, _candidate: &Vec<f64>, _retained: &Vec<f64>) -> Result<MatchOutcome, CheckerError> {
        Err(CheckerError::Unsupported("colour histogram grouping"))
    }
}

/// Region 0 is the centre; 1..=4 are top-left, top-right, bottom-right and
/// bottom-left with the centre removed.
fn region_of(x: u32, y: u32, width: u32, height: u32) -> usize {
    let in_centre = x >= width / 3 && x < width - width / 3 && y >= height / 3 && y < height - height / 3;
    if in_centre {
        return 0;
    }
    let right = x >= width / 2;
    let bottom = y >= height / 2;
    match (right, bottom) {
        (false, false) => 1,
        (true, false) => 2,
        (true, true) => 3,
        (false, true) => 4,
    }
}

fn region_histograms(frame: &Frame) -> Vec<f64> {
    let (width, height) = (frame.width(), frame.height());
    let mut hist = vec![0.0f64; REGIONS * BINS_PER_REGION];
    let mut counts = [0usize; REGIONS];

    for (i, px) in frame.data().chunks_exact(3).enumerate() {
        let x = i as u32 % width;
        let y = i as u32 / width;
        let region = region_of(x, y, width, height);

        let (h, s, v) = rgb_to_hsv(px[0] as f64 / 255.0, px[1] as f64 / 255.0, px[2] as f64 / 255.0);
        let h_bin = ((h / 360.0) * HUE_BINS as f64).min(HUE_BINS as f64 - 1.0) as usize;
        let s_bin = (s * SAT_BINS as f64).min(SAT_BINS as f64 - 1.0) as usize;
        let v_bin = (v * VAL_BINS as f64).min(VAL_BINS as f64 - 1.0) as usize;

        hist[region * BINS_PER_REGION + (h_bin * SAT_BINS + s_bin) * VAL_BINS + v_bin] += 1.0;
        counts[region] += 1;
    }

    for (region, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let total = count as f64;
        for v in &mut hist[region * BINS_PER_REGION..(region + 1) * BINS_PER_REGION] {
            *v /= total;
        }
    }

    hist
}

fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else if (max - r).abs() < f64::EPSILON {
        60.0 * (((g - b) / delta) % 6.0)
    } else if (max - g).abs() < f64::EPSILON {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let h = if h < 0.0 { h + 360.0 } else { h };

    (h, s, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solid_rgb(r: u8, g: u8, b: u8, w: u32, h: u32) -> Frame {
        let data = [r, g, b].repeat((w * h) as usize);
        Frame::new(data, w, h, 3, 0)
    }

    #[test]
    fn test_feature_vector_has_five_regions() {
        let checker = ColorHistogramChecker::new(1.0);
        let features = checker.compute_features(&solid_rgb(10, 200, 30, 30, 30)).unwrap();
        assert_eq!(features.len(), 5 * 8 * 12 * 3);
    }

    #[test]
    fn test_each_region_is_normalised() {
        let checker = ColorHistogramChecker::new(1.0);
        let features = checker.compute_features(&solid_rgb(200, 40, 90, 31, 17)).unwrap();
        for region in features.chunks(BINS_PER_REGION) {
            assert_relative_eq!(region.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_solid_colour_fills_single_bin() {
        let checker = ColorHistogramChecker::new(1.0);
        let features = checker.compute_features(&solid_rgb(255, 0, 0, 12, 12)).unwrap();
        // Pure red: hue 0, full saturation, full value.
        let bin = (SAT_BINS - 1) * VAL_BINS + (VAL_BINS - 1);
        assert_relative_eq!(features[bin], 1.0);
    }

    #[test]
    fn test_centre_and_corner_are_separated() {
        assert_eq!(region_of(15, 15, 30, 30), 0);
        assert_eq!(region_of(0, 0, 30, 30), 1);
        assert_eq!(region_of(29, 0, 30, 30), 2);
        assert_eq!(region_of(29, 29, 30, 30), 3);
        assert_eq!(region_of(0, 29, 30, 30), 4);
    }

    #[test]
    fn test_grey_frame_is_rejected() {
        let checker = ColorHistogramChecker::new(1.0);
        let frame = Frame::gray(vec![0; 4], 2, 2);
        assert!(matches!(
            checker.compute_features(&frame),
            Err(CheckerError::InvalidFrame { expected: 3, .. })
        ));
    }

    #[test]
    fn test_pairwise_matching_is_unsupported() {
        let checker = ColorHistogramChecker::new(1.0);
        assert!(matches!(
            checker.is_match(&vec![], &vec![]),
            Err(CheckerError::Unsupported(_))
        ));
        assert!(!checker.load_options().grayscale);
    }
}
