/// Linear downscale applied to every image before feature work.
pub const DEFAULT_SCALE: f64 = 0.25;

pub const DEFAULT_MAX_KEYPOINTS: usize = 4000;
/// FAST segment-test threshold as a fraction of full intensity.
pub const DEFAULT_FAST_THRESHOLD: f32 = 0.05;
pub const DEFAULT_FAST_N: usize = 9;
pub const DEFAULT_N_SCALES: usize = 8;
pub const DEFAULT_DOWNSCALE: f64 = 1.2;
pub const DEFAULT_HARRIS_K: f32 = 0.04;

/// Inlier count a pair must strictly exceed to be considered overlapping.
pub const DEFAULT_OVERLAP_THRESHOLD: usize = 100;
pub const DEFAULT_MAX_TRIALS: usize = 300;
/// Reprojection residual, in pixels of the downscaled frame.
pub const DEFAULT_RESIDUAL_THRESHOLD: f64 = 1.0;
pub const DEFAULT_RANSAC_SEED: u64 = 1_234_567;

/// Images loaded and described ahead of the assigner.
pub const DEFAULT_READ_AHEAD: usize = 2;

pub const DEFAULT_LOG_FILE: &str = "image_grouping.log";
