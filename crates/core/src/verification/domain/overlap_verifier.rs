use nalgebra::{Matrix3, Point2};

/// Projective transform mapping source `(x, y, 1)` onto destination.
pub type Homography = Matrix3<f64>;

/// Outcome of fitting a transform to a set of correspondences.
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    /// One flag per correspondence: consistent with the best model.
    pub inliers: Vec<bool>,
    pub inlier_count: usize,
    pub model: Option<Homography>,
}

impl Verification {
    /// No model: every one of the `len` correspondences is an outlier.
    pub fn rejected(len: usize) -> Self {
        Self {
            inliers: vec![false; len],
            inlier_count: 0,
            model: None,
        }
    }
}

/// Domain interface for the "do these two images overlap" oracle.
///
/// `source[i]` and `destination[i]` are the two ends of correspondence `i`,
/// in `(x, y)` pixel coordinates. Degenerate input must yield
/// [`Verification::rejected`], never a panic.
pub trait OverlapVerifier: Send + Sync {
    fn verify(&self, source: &[Point2<f64>], destination: &[Point2<f64>]) -> Verification;
}
