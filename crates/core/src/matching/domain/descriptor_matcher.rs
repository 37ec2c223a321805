use crate::features::domain::feature_set::FeatureSet;
use crate::matching::domain::correspondence::Correspondence;

/// Domain interface for descriptor correspondence search.
///
/// Must be a pure function of its inputs and return an empty list when
/// either set has no keypoints.
pub trait DescriptorMatcher: Send + Sync {
    fn match_descriptors(&self, a: &FeatureSet, b: &FeatureSet) -> Vec<Correspondence>;
}
