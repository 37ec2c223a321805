/// Bytes per binary descriptor (256 bits).
pub const DESCRIPTOR_BYTES: usize = 32;

/// A salient image location in the coordinate frame of the image handed to
/// the extractor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keypoint {
    pub row: f64,
    pub col: f64,
    /// Detector score used for ranking (Harris response).
    pub response: f32,
    /// Orientation in radians.
    pub angle: f32,
    pub octave: u8,
}

impl Keypoint {
    pub fn new(row: f64, col: f64) -> Self {
        Self {
            row,
            col,
            response: 0.0,
            angle: 0.0,
            octave: 0,
        }
    }

    /// `(x, y)` = `(col, row)`, the order geometric fitting works in.
    pub fn xy(&self) -> (f64, f64) {
        (self.col, self.row)
    }
}

/// Fixed-length binary appearance code for one keypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor(pub [u8; DESCRIPTOR_BYTES]);

impl Descriptor {
    pub fn hamming_distance(&self, other: &Descriptor) -> u32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }
}

/// Keypoints and their descriptors, index-aligned: descriptor `i` describes
/// keypoint `i`. May be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    keypoints: Vec<Keypoint>,
    descriptors: Vec<Descriptor>,
}

impl FeatureSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn keypoints(&self) -> &[Keypoint] {
        &self.keypoints
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }
}

impl FromIterator<(Keypoint, Descriptor)> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = (Keypoint, Descriptor)>>(iter: I) -> Self {
        let (keypoints, descriptors) = iter.into_iter().unzip();
        Self {
            keypoints,
            descriptors,
        }
    }
}
