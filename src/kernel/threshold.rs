use generic_array::sequence::Flatten;
use num_traits::float::FloatCore;

use super::dct::Grid16;
use crate::Hash256;

/// Set bit `k` of the hash for every coefficient `k` (row-major) strictly greater than `threshold`.
///
/// Ties stay clear. Used for the final quantization step and to re-threshold PDQF coefficients.
pub fn threshold_16x16<F: FloatCore>(input: &Grid16<F>, threshold: F) -> Hash256 {
    let mut hash = Hash256::ZERO;
    for (k, v) in (0..=u8::MAX).zip(input.flatten().iter()) {
        if *v > threshold {
            hash.set_bit(k);
        }
    }
    hash
}
