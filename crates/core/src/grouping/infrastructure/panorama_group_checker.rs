use nalgebra::Point2;

use crate::features::domain::feature_extractor::FeatureExtractor;
use crate::features::domain::feature_set::FeatureSet;
use crate::features::infrastructure::orb_extractor::{OrbExtractor, OrbParams};
use crate::grouping::domain::group_checker::{CheckerError, GroupChecker, LoadOptions, MatchOutcome};
use crate::matching::domain::descriptor_matcher::DescriptorMatcher;
use crate::matching::infrastructure::cross_check_matcher::CrossCheckMatcher;
use crate::shared::config::GroupingConfig;
use crate::shared::constants::{DEFAULT_OVERLAP_THRESHOLD, DEFAULT_SCALE};
use crate::shared::frame::Frame;
use crate::verification::domain::overlap_verifier::OverlapVerifier;
use crate::verification::infrastructure::ransac_homography_verifier::RansacHomographyVerifier;

/// Two images overlap when more than `overlap_threshold` of their
/// cross-checked ORB matches agree on a single homography.
pub struct PanoramaGroupChecker {
    extractor: Box<dyn FeatureExtractor>,
    matcher: Box<dyn DescriptorMatcher>,
    verifier: Box<dyn OverlapVerifier>,
    overlap_threshold: usize,
    scale: f64,
}

impl PanoramaGroupChecker {
    pub fn new(
        extractor: Box<dyn FeatureExtractor>,
        matcher: Box<dyn DescriptorMatcher>,
        verifier: Box<dyn OverlapVerifier>,
        overlap_threshold: usize,
        scale: f64,
    ) -> Self {
        Self {
            extractor,
            matcher,
            verifier,
            overlap_threshold,
            scale,
        }
    }

    pub fn from_config(config: &GroupingConfig) -> Self {
        Self::new(
            Box::new(OrbExtractor::new(OrbParams::from(config))),
            Box::new(CrossCheckMatcher::from(config)),
            Box::new(RansacHomographyVerifier::from(config)),
            config.overlap_threshold,
            config.scale,
        )
    }
}

impl Default for PanoramaGroupChecker {
    fn default() -> Self {
        Self::new(
            Box::new(OrbExtractor::default()),
            Box::new(CrossCheckMatcher::new()),
            Box::new(RansacHomographyVerifier::default()),
            DEFAULT_OVERLAP_THRESHOLD,
            DEFAULT_SCALE,
        )
    }
}

impl GroupChecker for PanoramaGroupChecker {
    type Features = FeatureSet;

    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            grayscale: true,
            scale: self.scale,
        }
    }

    fn compute_features(&self, frame: &Frame) -> Result<FeatureSet, CheckerError> {
        if !frame.is_gray() {
            return Err(CheckerError::InvalidFrame {
                index: frame.index(),
                channels: frame.channels(),
                expected: 1,
            });
        }
        Ok(self.extractor.extract(frame))
    }

    fn is_match(&self, candidate: &FeatureSet, retained: &FeatureSet) -> Result<MatchOutcome, CheckerError> {
        let correspondences = self.matcher.match_descriptors(retained, candidate);

        let (source, destination): (Vec<Point2<f64>>, Vec<Point2<f64>>) = correspondences
            .iter()
            .map(|c| {
                let (sx, sy) = candidate.keypoints()[c.index_b].xy();
                let (dx, dy) = retained.keypoints()[c.index_a].xy();
                (Point2::new(sx, sy), Point2::new(dx, dy))
            })
            .unzip();

        let inliers = self.verifier.verify(&source, &destination).inlier_count;
        Ok(MatchOutcome {
            is_match: inliers > self.overlap_threshold,
            score: inliers as f64,
        })
    }
}
