/// A putative match: keypoint `index_a` of the first set corresponds to
/// keypoint `index_b` of the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Correspondence {
    pub index_a: usize,
    pub index_b: usize,
    /// Hamming distance between the two descriptors.
    pub distance: u32,
}

impl Correspondence {
    pub fn new(index_a: usize, index_b: usize, distance: u32) -> Self {
        Self {
            index_a,
            index_b,
            distance,
        }
    }
}
