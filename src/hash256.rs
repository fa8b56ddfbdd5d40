/*
 * Copyright (c) 2025 Yumechi <yume@yumechi.jp>
 *
 * Created on Tuesday, May 6, 2025
 * Author: Yumechi <yume@yumechi.jp>
 *
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use core::{
    cmp::Ordering,
    fmt::{self, Debug, Display},
    ops::{BitAnd, BitOr, BitXor, Not},
    str::FromStr,
};

use const_default::ConstDefault;
use rand::Rng;
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// Number of 16-bit words in a hash.
pub const HASH256_NUM_WORDS: usize = 16;

/// Number of bits in a hash.
pub const HASH256_NUM_BITS: usize = 256;

/// Length of the canonical hex encoding.
pub const HASH256_HEX_NUM_NYBBLES: usize = 4 * HASH256_NUM_WORDS;

/// A 256-bit PDQ hash.
///
/// Stored as 16 little-endian-ordered 16-bit words: word 0 holds bits 0..16, word 15 holds bits 240..256.
/// Bit `k` corresponds to DCT coefficient `k` in row-major order.
///
/// The type is `Copy`, all "mutating" helpers like [`Hash256::fuzz`] return a new value and never alias the original.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Hash256 {
    words: [u16; HASH256_NUM_WORDS],
}

impl Hash256 {
    /// The all-zero hash.
    pub const ZERO: Self = Self {
        words: [0; HASH256_NUM_WORDS],
    };

    /// The all-one hash.
    pub const ONES: Self = Self {
        words: [0xffff; HASH256_NUM_WORDS],
    };

    /// Number of 16-bit words.
    pub const NUM_WORDS: usize = HASH256_NUM_WORDS;

    /// Build a hash from its words, least significant word first.
    #[must_use]
    pub const fn from_words(words: [u16; HASH256_NUM_WORDS]) -> Self {
        Self { words }
    }

    /// The words of the hash, least significant word first.
    #[must_use]
    pub const fn words(&self) -> &[u16; HASH256_NUM_WORDS] {
        &self.words
    }

    /// Clear all bits.
    pub fn clear(&mut self) {
        self.words = [0; HASH256_NUM_WORDS];
    }

    /// Set all bits.
    pub fn set_all(&mut self) {
        self.words = [0xffff; HASH256_NUM_WORDS];
    }

    /// Set bit `k`.
    #[inline]
    pub fn set_bit(&mut self, k: u8) {
        self.words[usize::from(k >> 4)] |= 1 << (k & 15);
    }

    /// Flip bit `k`.
    #[inline]
    pub fn flip_bit(&mut self, k: u8) {
        self.words[usize::from(k >> 4)] ^= 1 << (k & 15);
    }

    /// Read bit `k`.
    #[inline]
    #[must_use]
    pub fn bit(&self, k: u8) -> bool {
        self.words[usize::from(k >> 4)] & (1 << (k & 15)) != 0
    }

    /// Set bit `k`, rejecting indices outside `0..=255`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRangeBitIndex`] if `k > 255`.
    pub fn checked_set_bit(&mut self, k: usize) -> Result<()> {
        let k = u8::try_from(k).map_err(|_| Error::OutOfRangeBitIndex(k))?;
        self.set_bit(k);
        Ok(())
    }

    /// Flip bit `k`, rejecting indices outside `0..=255`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRangeBitIndex`] if `k > 255`.
    pub fn checked_flip_bit(&mut self, k: usize) -> Result<()> {
        let k = u8::try_from(k).map_err(|_| Error::OutOfRangeBitIndex(k))?;
        self.flip_bit(k);
        Ok(())
    }

    /// Number of set bits.
    #[must_use]
    pub fn hamming_norm(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Number of differing bits.
    #[must_use]
    pub fn hamming_distance(&self, other: &Self) -> u32 {
        self.words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// Whether the Hamming distance is at most `d`.
    ///
    /// Stops scanning as soon as the running count exceeds `d`.
    #[must_use]
    pub fn hamming_distance_le(&self, other: &Self, d: u32) -> bool {
        let mut e = 0;
        for (a, b) in self.words.iter().zip(other.words.iter()) {
            e += (a ^ b).count_ones();
            if e > d {
                return false;
            }
        }
        true
    }

    /// Return a copy with `num_error_bits` random bit flips.
    ///
    /// Positions are drawn uniformly from `0..256` with replacement, so a bit can flip back and
    /// the resulting distance is at most `num_error_bits`.
    #[must_use]
    pub fn fuzz<R: Rng + ?Sized>(&self, num_error_bits: usize, rng: &mut R) -> Self {
        let mut rv = *self;
        for _ in 0..num_error_bits {
            rv.flip_bit(rng.random());
        }
        rv
    }

    /// Big-endian bytes, most significant word first.
    ///
    /// This is the byte order used by other PDQ implementations for their 32-byte hashes.
    #[must_use]
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0; 32];
        for (chunk, word) in out.chunks_exact_mut(2).zip(self.words.iter().rev()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    /// Inverse of [`Hash256::to_be_bytes`].
    #[must_use]
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Self {
        let mut words = [0; HASH256_NUM_WORDS];
        for (word, chunk) in words.iter_mut().rev().zip(bytes.chunks_exact(2)) {
            *word = u16::from_be_bytes([chunk[0], chunk[1]]);
        }
        Self { words }
    }

    /// Encode as 64 lowercase ASCII hex characters, most significant word first.
    #[must_use]
    pub fn encode_hex(&self) -> [u8; HASH256_HEX_NUM_NYBBLES] {
        const LUT: &[u8; 16] = b"0123456789abcdef";
        let mut out = [0; HASH256_HEX_NUM_NYBBLES];
        for (chunk, byte) in out.chunks_exact_mut(2).zip(self.to_be_bytes()) {
            chunk[0] = LUT[usize::from(byte >> 4)];
            chunk[1] = LUT[usize::from(byte & 0x0f)];
        }
        out
    }

    /// Parse the canonical 64-nybble hex form. Upper case is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedHashEncoding`] on a wrong length or a non-hex character.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self::from_be_bytes(&bytes))
    }

    /// All 256 bits as 0/1 values, most significant bit first.
    #[must_use]
    pub fn to_bits(&self) -> [u8; HASH256_NUM_BITS] {
        let mut out = [0; HASH256_NUM_BITS];
        for (row, word) in out.chunks_exact_mut(16).zip(self.words.iter().rev()) {
            for (j, bit) in row.iter_mut().enumerate() {
                *bit = ((word >> (15 - j)) & 1) as u8;
            }
        }
        out
    }

    /// Canonical hex string.
    #[cfg(feature = "std")]
    #[must_use]
    pub fn to_hex_string(&self) -> String {
        self.to_string()
    }

    /// Render the hash as 16 lines of 16 space-separated bits, most significant word first.
    #[cfg(feature = "std")]
    #[must_use]
    pub fn dump_bits(&self) -> String {
        self.to_bits()
            .chunks_exact(16)
            .map(|row| {
                row.iter()
                    .map(|b| if *b == 1 { "1" } else { "0" })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render all 256 bits on one line, space-separated, most significant word first.
    #[cfg(feature = "std")]
    #[must_use]
    pub fn dump_bits_across(&self) -> String {
        self.to_bits()
            .iter()
            .map(|b| if *b == 1 { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render the words as comma-separated decimals, most significant word first.
    #[cfg(feature = "std")]
    #[must_use]
    pub fn dump_words(&self) -> String {
        self.words
            .iter()
            .rev()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Ord for Hash256 {
    // most significant word decides
    fn cmp(&self, other: &Self) -> Ordering {
        self.words.iter().rev().cmp(other.words.iter().rev())
    }
}

impl PartialOrd for Hash256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl BitXor for Hash256 {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self {
            words: core::array::from_fn(|i| self.words[i] ^ rhs.words[i]),
        }
    }
}

impl BitAnd for Hash256 {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self {
            words: core::array::from_fn(|i| self.words[i] & rhs.words[i]),
        }
    }
}

impl BitOr for Hash256 {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            words: core::array::from_fn(|i| self.words[i] | rhs.words[i]),
        }
    }
}

impl Not for Hash256 {
    type Output = Self;

    fn not(self) -> Self {
        Self {
            words: self.words.map(|w| !w & 0xffff),
        }
    }
}

impl Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let buf = self.encode_hex();
        f.write_str(core::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl fmt::LowerHex for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl fmt::UpperHex for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = self.encode_hex();
        buf.make_ascii_uppercase();
        f.write_str(core::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl Debug for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash256({self})")
    }
}

impl FromStr for Hash256 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Zeroize for Hash256 {
    fn zeroize(&mut self) {
        self.words.zeroize();
    }
}

impl ConstDefault for Hash256 {
    const DEFAULT: Self = Self::ZERO;
}

impl From<[u16; HASH256_NUM_WORDS]> for Hash256 {
    fn from(words: [u16; HASH256_NUM_WORDS]) -> Self {
        Self::from_words(words)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn random_hash(rng: &mut StdRng) -> Hash256 {
        Hash256::from_words(core::array::from_fn(|_| rng.random::<u16>()))
    }

    #[test]
    fn test_zero_and_set_bit() {
        let mut hash = Hash256::ZERO;
        assert_eq!(
            hash.to_string(),
            "0000000000000000000000000000000000000000000000000000000000000000"
        );

        hash.set_bit(0);
        assert_eq!(hash.words()[0], 1);
        hash.set_bit(15);
        assert_eq!(hash.words()[0], 0x8001);
        hash.set_bit(16);
        assert_eq!(hash.words()[1], 1);
        hash.set_bit(255);
        assert_eq!(hash.words()[15], 0x8000);
        assert!(hash.bit(255));
        assert!(!hash.bit(254));
        assert_eq!(
            hash.to_string(),
            "8000000000000000000000000000000000000000000000000000000000018001"
        );
    }

    #[test]
    fn test_flip_bit() {
        let mut hash = Hash256::ZERO;
        hash.flip_bit(0);
        assert_eq!(hash.words()[0], 1);
        hash.flip_bit(0);
        assert_eq!(hash, Hash256::ZERO);
    }

    #[test]
    fn test_checked_bit_index() {
        let mut hash = Hash256::ZERO;
        hash.checked_set_bit(255).unwrap();
        assert!(hash.bit(255));
        assert_eq!(
            hash.checked_set_bit(256),
            Err(Error::OutOfRangeBitIndex(256))
        );
        assert_eq!(
            hash.checked_flip_bit(1000),
            Err(Error::OutOfRangeBitIndex(1000))
        );
        assert_eq!(hash.hamming_norm(), 1);
    }

    #[test]
    fn test_hamming_norm_and_distance() {
        let mut a = Hash256::ZERO;
        let b = Hash256::ZERO;
        assert_eq!(a.hamming_norm(), 0);
        assert_eq!(a.hamming_distance(&b), 0);

        a.set_bit(0);
        assert_eq!(a.hamming_distance(&b), 1);
        a.set_bit(10);
        a.set_bit(20);
        assert_eq!(a.hamming_norm(), 3);
        assert_eq!(a.hamming_distance(&b), 3);
        assert_eq!(Hash256::ONES.hamming_norm(), 256);
        assert_eq!(Hash256::ONES.hamming_distance(&Hash256::ZERO), 256);
    }

    #[test]
    fn test_distance_laws() {
        let mut rng = StdRng::seed_from_u64(0x5044_5132);
        for _ in 0..200 {
            let a = random_hash(&mut rng);
            let b = random_hash(&mut rng);
            let c = random_hash(&mut rng);
            assert_eq!(a.hamming_distance(&a), 0);
            assert_eq!(a.hamming_distance(&b), b.hamming_distance(&a));
            assert!(a.hamming_distance(&c) <= a.hamming_distance(&b) + b.hamming_distance(&c));
            assert_eq!(a.hamming_distance(&b), (a ^ b).hamming_norm());
        }
    }

    #[test]
    fn test_distance_le_agrees_with_distance() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let a = random_hash(&mut rng);
            let b = a.fuzz(rng.random_range(0..64), &mut rng);
            let dist = a.hamming_distance(&b);
            for d in [0, 1, dist.saturating_sub(1), dist, dist + 1, 31, 128, 256] {
                assert_eq!(a.hamming_distance_le(&b, d), dist <= d, "d={d} dist={dist}");
            }
        }
    }

    #[test]
    fn test_ordering_most_significant_word_first() {
        let mut low = Hash256::ZERO;
        low.set_bit(0);
        let mut high = Hash256::ZERO;
        high.set_bit(255);

        assert!(low < high);
        assert!(high > low);
        assert_eq!(low.cmp(&low), Ordering::Equal);

        // word 15 dominates even if lower words are larger
        let mut a = Hash256::ONES;
        a.flip_bit(255);
        assert!(a < high | Hash256::from_words([1; 16]));
    }

    #[test]
    fn test_boolean_algebra() {
        let mut a = Hash256::ZERO;
        let mut b = Hash256::ZERO;
        a.set_bit(0);
        a.set_bit(2);
        b.set_bit(1);
        b.set_bit(2);

        assert_eq!((a ^ b).words()[0], 3);
        assert_eq!((a & b).words()[0], 4);
        assert_eq!((a | b).words()[0], 7);

        let not_a = !a;
        assert_eq!(not_a.words()[0], 0xfffa);
        assert_eq!(not_a.words()[1], 0xffff);
        assert_eq!(not_a.hamming_norm(), 254);
        assert_eq!(!not_a, a);
    }

    #[test]
    fn test_hex_roundtrip() {
        let hex = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
        let hash: Hash256 = hex.parse().unwrap();
        assert_eq!(hash.to_string(), hex);
        assert_eq!(hash.words()[15], 0x0123);
        assert_eq!(hash.words()[0], 0xcdef);

        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let h = random_hash(&mut rng);
            assert_eq!(Hash256::from_hex(&h.to_hex_string()).unwrap(), h);
        }

        assert_eq!(
            format!("{hash:X}"),
            "0123456789ABCDEF0123456789ABCDEF0123456789ABCDEF0123456789ABCDEF"
        );
        assert_eq!(
            Hash256::from_hex("0123456789ABCDEF0123456789ABCDEF0123456789ABCDEF0123456789ABCDEF")
                .unwrap(),
            hash
        );
    }

    #[test]
    fn test_hex_rejects_malformed() {
        assert!(matches!(
            Hash256::from_hex("0123"),
            Err(Error::MalformedHashEncoding(_))
        ));
        assert!(matches!(
            Hash256::from_hex(
                "g123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef"
            ),
            Err(Error::MalformedHashEncoding(_))
        ));
        assert!(matches!(
            Hash256::from_hex(
                "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdefg123"
            ),
            Err(Error::MalformedHashEncoding(_))
        ));
        assert!(Hash256::from_hex("").is_err());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let hash = Hash256::from_hex(
            "58f8f0cee0f4a84f06370a32038f67f0b36e2ed596623e1d33e6b39c4e9c9b22",
        )
        .unwrap();
        let bytes = hash.to_be_bytes();
        assert_eq!(bytes[0], 0x58);
        assert_eq!(bytes[1], 0xf8);
        assert_eq!(bytes[31], 0x22);
        assert_eq!(Hash256::from_be_bytes(&bytes), hash);
    }

    #[test]
    fn test_clone_does_not_alias() {
        let mut original = Hash256::ZERO;
        original.set_bit(0);
        original.set_bit(100);

        let mut copy = original;
        assert_eq!(copy, original);
        copy.set_bit(200);
        assert_ne!(copy, original);
        assert!(!original.bit(200));
    }

    #[test]
    fn test_fuzz_bound() {
        let mut rng = StdRng::seed_from_u64(1234);
        let hash = Hash256::ONES;
        for n in [0, 1, 5, 10, 64, 300] {
            let fuzzed = hash.fuzz(n, &mut rng);
            let distance = hash.hamming_distance(&fuzzed);
            assert!(distance as usize <= n, "n={n} distance={distance}");
            assert_eq!(distance % 2, (n % 2) as u32);
        }
        assert_eq!(hash, Hash256::ONES);

        let a = hash.fuzz(10, &mut StdRng::seed_from_u64(99));
        let b = hash.fuzz(10, &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_bits_and_dumps() {
        let mut hash = Hash256::ZERO;
        hash.set_bit(255);
        hash.set_bit(0);
        let bits = hash.to_bits();
        assert_eq!(bits[0], 1);
        assert_eq!(bits[255], 1);
        assert_eq!(bits.iter().map(|b| u32::from(*b)).sum::<u32>(), 2);

        let dump = hash.dump_bits();
        let lines = dump.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0], "1 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0");
        assert_eq!(lines[15], "0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 1");

        let across = hash.dump_bits_across();
        assert_eq!(across.len(), 256 * 2 - 1);
        assert_eq!(across, dump.replace('\n', " "));
        assert!(across.starts_with("1 0 "));
        assert!(across.ends_with(" 0 1"));

        assert_eq!(hash.dump_words(), "32768,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1");
    }

    #[test]
    fn test_clear_set_all_zeroize() {
        let mut hash = Hash256::ZERO;
        hash.set_all();
        assert_eq!(hash, Hash256::ONES);
        hash.clear();
        assert_eq!(hash, Hash256::ZERO);
        hash.set_all();
        hash.zeroize();
        assert_eq!(hash, <Hash256 as ConstDefault>::DEFAULT);
    }
}
