use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::shared::config::GroupingConfig;
use crate::shared::constants::*;
use crate::verification::domain::overlap_verifier::{OverlapVerifier, Verification};
use crate::verification::infrastructure::homography::HomographyEstimator;
use crate::verification::infrastructure::ransac::{ransac, Estimator, RansacOptions};

/// Projective RANSAC verifier.
///
/// Each call reseeds its generator from `seed`, so the same correspondences
/// always produce the same verdict. Use [`verify_with_rng`] to drive it from
/// an external random source instead.
///
/// [`verify_with_rng`]: RansacHomographyVerifier::verify_with_rng
#[derive(Debug, Clone)]
pub struct RansacHomographyVerifier {
    options: RansacOptions,
    seed: u64,
}

impl RansacHomographyVerifier {
    pub fn new(max_trials: usize, residual_threshold: f64, seed: u64) -> Self {
        Self {
            options: RansacOptions {
                max_trials,
                residual_threshold,
                refit_on_inliers: true,
            },
            seed,
        }
    }

    pub fn verify_with_rng<R: Rng + ?Sized>(
        &self,
        source: &[Point2<f64>],
        destination: &[Point2<f64>],
        rng: &mut R,
    ) -> Verification {
        if source.len() != destination.len() || source.len() < HomographyEstimator::MIN_SAMPLES {
            return Verification::rejected(source.len().max(destination.len()));
        }

        let data: Vec<(Point2<f64>, Point2<f64>)> = source
            .iter()
            .copied()
            .zip(destination.iter().copied())
            .collect();
        let result = ransac::<HomographyEstimator, _>(&data, &self.options, rng);

        Verification {
            inliers: result.inliers,
            inlier_count: result.inlier_count,
            model: result.model,
        }
    }
}

impl Default for RansacHomographyVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TRIALS, DEFAULT_RESIDUAL_THRESHOLD, DEFAULT_RANSAC_SEED)
    }
}

impl From<&GroupingConfig> for RansacHomographyVerifier {
    fn from(config: &GroupingConfig) -> Self {
        Self::new(config.max_trials, config.residual_threshold, config.seed)
    }
}

impl OverlapVerifier for RansacHomographyVerifier {
    fn verify(&self, source: &[Point2<f64>], destination: &[Point2<f64>]) -> Verification {
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.verify_with_rng(source, destination, &mut rng)
    }
}
