use thiserror::Error;

use crate::shared::frame::Frame;

/// How the loader should prepare images for a checker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    pub grayscale: bool,
    /// Linear resize factor in `(0, 1]`.
    pub scale: f64,
}

/// Result of comparing a candidate image against one retained image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOutcome {
    pub is_match: bool,
    /// Strategy-specific evidence (inlier count for panoramas).
    pub score: f64,
}

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("frame {index} has {channels} channel(s), expected {expected}")]
    InvalidFrame {
        index: usize,
        channels: u8,
        expected: u8,
    },
    #[error("{0} does not support pairwise matching")]
    Unsupported(&'static str),
}

/// Domain interface for a grouping strategy.
///
/// Features are computed once per image and kept by the assigner while the
/// image's group stays open; `is_match` must not depend on call order.
pub trait GroupChecker: Send + Sync {
    type Features: Send;

    fn load_options(&self) -> LoadOptions;

    fn compute_features(&self, frame: &Frame) -> Result<Self::Features, CheckerError>;

    fn is_match(
        &self,
        candidate: &Self::Features,
        retained: &Self::Features,
    ) -> Result<MatchOutcome, CheckerError>;
}

impl<C: GroupChecker + ?Sized> GroupChecker for std::sync::Arc<C> {
    type Features = C::Features;

    fn load_options(&self) -> LoadOptions {
        (**self).load_options()
    }

    fn compute_features(&self, frame: &Frame) -> Result<Self::Features, CheckerError> {
        (**self).compute_features(frame)
    }

    fn is_match(
        &self,
        candidate: &Self::Features,
        retained: &Self::Features,
    ) -> Result<MatchOutcome, CheckerError> {
        (**self).is_match(candidate, retained)
    }
}
