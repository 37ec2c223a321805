use crate::features::domain::feature_set::FeatureSet;
use crate::shared::frame::Frame;

/// Domain interface for local-feature extraction.
///
/// Implementations must be deterministic for a given frame and parameters,
/// and may be shared with a read-ahead worker thread.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, frame: &Frame) -> FeatureSet;
}
