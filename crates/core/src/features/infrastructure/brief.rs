//! Steered BRIEF descriptor.
//!
//! 256 point pairs inside a 31x31 patch are drawn once from a seeded RNG.
//! For each keypoint the pairs are rotated by the keypoint orientation and
//! bit `i` is set when the first sample is darker than the second.

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::features::domain::feature_set::{Descriptor, DESCRIPTOR_BYTES};

const PATTERN_SEED: u64 = 0x0B1E_F5EE_D000_0256;
const PATCH_HALF: i32 = 13;
const N_PAIRS: usize = DESCRIPTOR_BYTES * 8;

/// Minimum distance between a keypoint and the image edge so that every
/// rotated sample stays inside the image (13 * sqrt(2) rounds to 18).
pub const BORDER: usize = 20;

type Pair = ((i32, i32), (i32, i32));

#[derive(Debug, Clone)]
pub struct BriefPattern {
    pairs: Vec<Pair>,
}

impl Default for BriefPattern {
    fn default() -> Self {
        Self::with_seed(PATTERN_SEED)
    }
}

impl BriefPattern {
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pairs = Vec::with_capacity(N_PAIRS);
        while pairs.len() < N_PAIRS {
            let a = sample_offset(&mut rng);
            let b = sample_offset(&mut rng);
            if a != b {
                pairs.push((a, b));
            }
        }
        Self { pairs }
    }

    /// Describes the patch centred on `(row, col)`.
    ///
    /// The caller guarantees the centre is at least [`BORDER`] pixels from
    /// every edge of `smoothed`.
    pub fn describe(&self, smoothed: ArrayView2<f32>, row: usize, col: usize, angle: f32) -> Descriptor {
        let (sin, cos) = angle.sin_cos();
        let sample = |(dr, dc): (i32, i32)| {
            let (dr, dc) = (dr as f32, dc as f32);
            let r = row as f32 + (sin * dc + cos * dr).round();
            let c = col as f32 + (cos * dc - sin * dr).round();
            smoothed[[r as usize, c as usize]]
        };

        let mut bytes = [0u8; DESCRIPTOR_BYTES];
        for (i, &(a, b)) in self.pairs.iter().enumerate() {
            if sample(a) < sample(b) {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        Descriptor(bytes)
    }
}

fn sample_offset(rng: &mut StdRng) -> (i32, i32) {
    (
        rng.random_range(-PATCH_HALF..=PATCH_HALF),
        rng.random_range(-PATCH_HALF..=PATCH_HALF),
    )
}
