use nalgebra::{DMatrix, Matrix3, Point2};
use thiserror::Error;

use crate::verification::domain::overlap_verifier::Homography;
use crate::verification::infrastructure::ransac::Estimator;

#[derive(Debug, Error, PartialEq)]
pub enum HomographyError {
    #[error("need at least 4 point correspondences, got {0}")]
    NotEnoughPoints(usize),
    #[error("source and destination lengths differ ({0} vs {1})")]
    LengthMismatch(usize, usize),
    #[error("point configuration is degenerate")]
    Degenerate,
    #[error("svd failed")]
    SvdFailed,
}

/// Estimate H such that `dst ~ H * src` with the normalised DLT.
///
/// Both point sets are translated to their centroid and scaled to a mean
/// distance of sqrt(2) before solving `A h = 0`; the result is
/// de-normalised and scaled so that `H[(2, 2)] = 1` where possible.
pub fn dlt_homography(src: &[Point2<f64>], dst: &[Point2<f64>]) -> Result<Homography, HomographyError> {
    let n = src.len();
    if dst.len() != n {
        return Err(HomographyError::LengthMismatch(n, dst.len()));
    }
    if n < 4 {
        return Err(HomographyError::NotEnoughPoints(n));
    }

    let (src_n, t_src) = normalize(src).ok_or(HomographyError::Degenerate)?;
    let (dst_n, t_dst) = normalize(dst).ok_or(HomographyError::Degenerate)?;

    // Pad to at least 9 rows so the SVD yields the full 9x9 V^T.
    let rows = (2 * n).max(9);
    let mut a = DMatrix::<f64>::zeros(rows, 9);
    for (i, (p, q)) in src_n.iter().zip(dst_n.iter()).enumerate() {
        let (x, y, u, v) = (p.x, p.y, q.x, q.y);
        let r0 = 2 * i;
        let r1 = 2 * i + 1;

        a[(r0, 0)] = -x;
        a[(r0, 1)] = -y;
        a[(r0, 2)] = -1.0;
        a[(r0, 6)] = u * x;
        a[(r0, 7)] = u * y;
        a[(r0, 8)] = u;

        a[(r1, 3)] = -x;
        a[(r1, 4)] = -y;
        a[(r1, 5)] = -1.0;
        a[(r1, 6)] = v * x;
        a[(r1, 7)] = v * y;
        a[(r1, 8)] = v;
    }

    let svd = a.svd(false, true);
    let v_t = svd.v_t.ok_or(HomographyError::SvdFailed)?;
    let h = v_t.row(svd.singular_values.imin());
    let h_norm = Matrix3::from_row_slice(&[h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8]]);

    let t_dst_inv = t_dst.try_inverse().ok_or(HomographyError::Degenerate)?;
    let mut h_mat = t_dst_inv * h_norm * t_src;

    let scale = h_mat[(2, 2)];
    if scale.abs() > f64::EPSILON {
        h_mat /= scale;
    }
    if !h_mat.iter().all(|v| v.is_finite()) || h_mat.determinant().abs() < 1e-12 {
        return Err(HomographyError::Degenerate);
    }

    Ok(h_mat)
}

/// Applies `h` to `p`; `None` when the point maps to infinity.
pub fn project(h: &Homography, p: &Point2<f64>) -> Option<Point2<f64>> {
    let w = h[(2, 0)] * p.x + h[(2, 1)] * p.y + h[(2, 2)];
    if w.abs() < 1e-12 {
        return None;
    }
    Some(Point2::new(
        (h[(0, 0)] * p.x + h[(0, 1)] * p.y + h[(0, 2)]) / w,
        (h[(1, 0)] * p.x + h[(1, 1)] * p.y + h[(1, 2)]) / w,
    ))
}

/// Similarity transform moving the centroid to the origin with mean
/// distance sqrt(2). `None` if all points coincide.
fn normalize(points: &[Point2<f64>]) -> Option<(Vec<Point2<f64>>, Matrix3<f64>)> {
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
    let mean_dist = points
        .iter()
        .map(|p| ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    if mean_dist <= f64::EPSILON {
        return None;
    }

    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);
    let normalized = points
        .iter()
        .map(|p| Point2::new(s * (p.x - cx), s * (p.y - cy)))
        .collect();
    Some((normalized, t))
}

fn collinear(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> bool {
    let area = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
    area.abs() < 1e-9
}

fn has_collinear_triple(points: &[Point2<f64>]) -> bool {
    let n = points.len();
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                if collinear(&points[i], &points[j], &points[k]) {
                    return true;
                }
            }
        }
    }
    false
}

/// RANSAC adapter: data are `(source, destination)` pairs, the residual is
/// the forward reprojection distance in destination pixels.
pub struct HomographyEstimator;

impl Estimator for HomographyEstimator {
    type Datum = (Point2<f64>, Point2<f64>);
    type Model = Homography;

    const MIN_SAMPLES: usize = 4;

    fn fit(data: &[Self::Datum], sample: &[usize]) -> Option<Self::Model> {
        let (src, dst): (Vec<_>, Vec<_>) = sample.iter().map(|&i| data[i]).unzip();
        dlt_homography(&src, &dst).ok()
    }

    fn residual(model: &Self::Model, datum: &Self::Datum) -> f64 {
        match project(model, &datum.0) {
            Some(p) => ((p.x - datum.1.x).powi(2) + (p.y - datum.1.y).powi(2)).sqrt(),
            None => f64::INFINITY,
        }
    }

    fn is_degenerate(data: &[Self::Datum], sample: &[usize]) -> bool {
        let src: Vec<_> = sample.iter().map(|&i| data[i].0).collect();
        let dst: Vec<_> = sample.iter().map(|&i| data[i].1).collect();
        has_collinear_triple(&src) || has_collinear_triple(&dst)
    }

    fn refit(data: &[Self::Datum], inliers: &[usize]) -> Option<Self::Model> {
        Self::fit(data, inliers)
    }
}
