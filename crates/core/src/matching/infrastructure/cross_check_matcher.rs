//! Brute-force Hamming matcher with mutual nearest-neighbour filtering.
//!
//! A pair `(i, j)` survives only when `j` is the nearest descriptor in B to
//! `a[i]` and `i` is the nearest descriptor in A to `b[j]`. Ties resolve to
//! the lowest index, so results are reproducible.

use rayon::prelude::*;

use crate::features::domain::feature_set::{Descriptor, FeatureSet};
use crate::matching::domain::correspondence::Correspondence;
use crate::matching::domain::descriptor_matcher::DescriptorMatcher;
use crate::shared::config::GroupingConfig;

#[derive(Debug, Clone, Default)]
pub struct CrossCheckMatcher {
    max_distance: Option<u32>,
}

impl CrossCheckMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops mutual pairs whose distance exceeds `max_distance`.
    pub fn with_max_distance(mut self, max_distance: u32) -> Self {
        self.max_distance = Some(max_distance);
        self
    }
}

impl From<&GroupingConfig> for CrossCheckMatcher {
    fn from(config: &GroupingConfig) -> Self {
        Self {
            max_distance: config.max_distance,
        }
    }
}

impl DescriptorMatcher for CrossCheckMatcher {
    fn match_descriptors(&self, a: &FeatureSet, b: &FeatureSet) -> Vec<Correspondence> {
        if a.is_empty() || b.is_empty() {
            return Vec::new();
        }

        let forward = nearest_neighbours(a.descriptors(), b.descriptors());
        let backward = nearest_neighbours(b.descriptors(), a.descriptors());

        forward
            .into_iter()
            .enumerate()
            .filter(|&(i, (j, _))| backward[j].0 == i)
            .filter(|&(_, (_, d))| self.max_distance.map_or(true, |max| d <= max))
            .map(|(i, (j, d))| Correspondence::new(i, j, d))
            .collect()
    }
}

/// For every query descriptor, `(index, distance)` of its nearest train
/// descriptor. `train` must be non-empty.
fn nearest_neighbours(query: &[Descriptor], train: &[Descriptor]) -> Vec<(usize, u32)> {
    query
        .par_iter()
        .map(|q| {
            let mut best = (0, u32::MAX);
            for (idx, t) in train.iter().enumerate() {
                let d = q.hamming_distance(t);
                if d < best.1 {
                    best = (idx, d);
                }
            }
            best
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::domain::feature_set::{Keypoint, DESCRIPTOR_BYTES};

    fn desc(fill: &[(usize, u8)]) -> Descriptor {
        let mut bytes = [0u8; DESCRIPTOR_BYTES];
        for &(i, v) in fill {
            bytes[i] = v;
        }
        Descriptor(bytes)
    }

    fn set(descriptors: Vec<Descriptor>) -> FeatureSet {
        descriptors
            .into_iter()
            .enumerate()
            .map(|(i, d)| (Keypoint::new(i as f64, 0.0), d))
            .collect()
    }

    #[test]
    fn test_empty_inputs_return_empty() {
        let matcher = CrossCheckMatcher::new();
        let some = set(vec![desc(&[])]);
        assert!(matcher.match_descriptors(&FeatureSet::empty(), &some).is_empty());
        assert!(matcher.match_descriptors(&some, &FeatureSet::empty()).is_empty());
    }

    #[test]
    fn test_identical_sets_match_one_to_one() {
        let descriptors = vec![
            desc(&[(0, 0xFF)]),
            desc(&[(5, 0x0F), (6, 0xF0)]),
            desc(&[(31, 0xAA)]),
        ];
        let a = set(descriptors.clone());
        let b = set(descriptors);
        let matches = CrossCheckMatcher::new().match_descriptors(&a, &b);
        assert_eq!(
            matches,
            vec![
                Correspondence::new(0, 0, 0),
                Correspondence::new(1, 1, 0),
                Correspondence::new(2, 2, 0),
            ]
        );
    }

    #[test]
    fn test_non_mutual_pair_is_dropped() {
        // a0 and a1 both prefer b0, b0 prefers a1: only (1, 0) survives.
        let a = set(vec![desc(&[(0, 0b0000_0011)]), desc(&[(0, 0b0000_0001)])]);
        let b = set(vec![desc(&[(0, 0b0000_0001)])]);
        let matches = CrossCheckMatcher::new().match_descriptors(&a, &b);
        assert_eq!(matches, vec![Correspondence::new(1, 0, 0)]);
    }

    #[test]
    fn test_each_index_used_at_most_once() {
        let a = set((0..8u8).map(|i| desc(&[(0, i), (1, i * 3)])).collect());
        let b = set((0..8u8).rev().map(|i| desc(&[(0, i), (1, i * 3)])).collect());
        let matches = CrossCheckMatcher::new().match_descriptors(&a, &b);

        let mut seen_a: Vec<usize> = matches.iter().map(|m| m.index_a).collect();
        let mut seen_b: Vec<usize> = matches.iter().map(|m| m.index_b).collect();
        seen_a.dedup();
        seen_b.sort();
        seen_b.dedup();
        assert_eq!(seen_a.len(), matches.len());
        assert_eq!(seen_b.len(), matches.len());
        assert_eq!(matches.len(), 8);
        assert!(matches.iter().all(|m| m.index_b == 7 - m.index_a));
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let a = set(vec![desc(&[])]);
        let b = set(vec![desc(&[(0, 1)]), desc(&[(1, 1)])]);
        let matches = CrossCheckMatcher::new().match_descriptors(&a, &b);
        assert_eq!(matches, vec![Correspondence::new(0, 0, 1)]);
    }

    #[test]
    fn test_max_distance_filters_far_pairs() {
        let a = set(vec![desc(&[]), desc(&[(3, 0xFF)])]);
        let b = set(vec![desc(&[(0, 0b1)]), desc(&[(3, 0xFF), (4, 0xFF)])]);
        let all = CrossCheckMatcher::new().match_descriptors(&a, &b);
        assert_eq!(all.len(), 2);

        let close = CrossCheckMatcher::new()
            .with_max_distance(4)
            .match_descriptors(&a, &b);
        assert_eq!(close, vec![Correspondence::new(0, 0, 1)]);
    }

    #[test]
    fn test_config_max_distance_is_applied() {
        let a = set(vec![desc(&[]), desc(&[(3, 0xFF)])]);
        let b = set(vec![desc(&[(0, 0b1)]), desc(&[(3, 0xFF), (4, 0xFF)])]);

        let unbounded = CrossCheckMatcher::from(&GroupingConfig::default());
        assert_eq!(unbounded.match_descriptors(&a, &b).len(), 2);

        let config = GroupingConfig {
            max_distance: Some(4),
            ..Default::default()
        };
        let bounded = CrossCheckMatcher::from(&config);
        assert_eq!(
            bounded.match_descriptors(&a, &b),
            vec![Correspondence::new(0, 0, 1)]
        );
    }

    #[test]
    fn test_matching_is_deterministic() {
        let a = set((0..20u8).map(|i| desc(&[(i as usize, i.wrapping_mul(37))])).collect());
        let b = set((0..20u8).map(|i| desc(&[(i as usize % 7, i.wrapping_mul(11))])).collect());
        let matcher = CrossCheckMatcher::new();
        assert_eq!(
            matcher.match_descriptors(&a, &b),
            matcher.match_descriptors(&a, &b)
        );
    }
}
