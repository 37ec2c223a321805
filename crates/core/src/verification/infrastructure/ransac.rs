//! Model-agnostic random sample consensus.
//!
//! Implement [`Estimator`] for a model and call [`ransac`] with the data, a
//! fixed trial budget and a random source. No early termination other than
//! "every datum is already an inlier": the trial count is a hard cap, not a
//! confidence-driven estimate.

use rand::seq::index;
use rand::Rng;

#[derive(Debug, Clone)]
pub struct RansacOptions {
    pub max_trials: usize,
    /// A datum is an inlier when its residual is strictly below this.
    pub residual_threshold: f64,
    /// Refit the winning model on all of its inliers.
    pub refit_on_inliers: bool,
}

#[derive(Debug, Clone)]
pub struct RansacResult<M> {
    pub model: Option<M>,
    pub inliers: Vec<bool>,
    pub inlier_count: usize,
    /// Sum of squared inlier residuals of the winning trial.
    pub residual_sum: f64,
    pub trials: usize,
}

impl<M> RansacResult<M> {
    fn empty(len: usize) -> Self {
        Self {
            model: None,
            inliers: vec![false; len],
            inlier_count: 0,
            residual_sum: f64::INFINITY,
            trials: 0,
        }
    }
}

pub trait Estimator {
    type Datum;
    type Model;

    const MIN_SAMPLES: usize;

    /// Fit from the data at `sample`; `None` when fitting fails.
    fn fit(data: &[Self::Datum], sample: &[usize]) -> Option<Self::Model>;

    /// Non-negative error of one datum under `model`.
    fn residual(model: &Self::Model, datum: &Self::Datum) -> f64;

    fn is_degenerate(_data: &[Self::Datum], _sample: &[usize]) -> bool {
        false
    }

    fn refit(_data: &[Self::Datum], _inliers: &[usize]) -> Option<Self::Model> {
        None
    }
}

/// Runs up to `opts.max_trials` minimal-sample trials and keeps the model
/// with the most inliers (ties: lower residual sum).
///
/// Fewer than `E::MIN_SAMPLES` data yields an empty result, not an error.
pub fn ransac<E, R>(data: &[E::Datum], opts: &RansacOptions, rng: &mut R) -> RansacResult<E::Model>
where
    E: Estimator,
    R: Rng + ?Sized,
{
    let n = data.len();
    let mut best = RansacResult::empty(n);
    if n < E::MIN_SAMPLES {
        return best;
    }

    let mut mask = vec![false; n];
    for trial in 1..=opts.max_trials {
        best.trials = trial;
        let sample = index::sample(rng, n, E::MIN_SAMPLES).into_vec();
        if E::is_degenerate(data, &sample) {
            continue;
        }
        let Some(model) = E::fit(data, &sample) else {
            continue;
        };

        let mut count = 0;
        let mut residual_sum = 0.0;
        for (flag, datum) in mask.iter_mut().zip(data) {
            let r = E::residual(&model, datum);
            *flag = r < opts.residual_threshold;
            if *flag {
                count += 1;
                residual_sum += r * r;
            }
        }

        let better = count > best.inlier_count
            || (count == best.inlier_count && count > 0 && residual_sum < best.residual_sum);
        if better {
            best.model = Some(model);
            best.inliers.copy_from_slice(&mask);
            best.inlier_count = count;
            best.residual_sum = residual_sum;
        }

        if best.inlier_count == n {
            break;
        }
    }

    if opts.refit_on_inliers && best.inlier_count >= E::MIN_SAMPLES {
        let inlier_indices: Vec<usize> = best
            .inliers
            .iter()
            .enumerate()
            .filter_map(|(i, &flag)| flag.then_some(i))
            .collect();
        if let Some(refitted) = E::refit(data, &inlier_indices) {
            best.model = Some(refitted);
        }
    }

    best
}
