pub mod homography;
pub mod ransac;
pub mod ransac_homography_verifier;
