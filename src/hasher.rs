/*
 * Copyright (c) 2025 Yumechi <yume@yumechi.jp>
 *
 * Created on Saturday, May 10, 2025
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

use num_traits::Zero;
use tracing::{debug, trace};

use crate::{
    Hash256,
    error::{Error, Result},
    kernel::{
        DctMatrix, DefaultKernel, Grid16, Grid16x64, Grid64, Kernel, PdqFloat,
        constants::jarosz_window_size,
    },
    pixels::PixelGrid,
};

/// A hash with its quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashResult {
    /// The 256-bit hash.
    pub hash: Hash256,
    /// Image-domain quality in `0..=100`. Hashes with a low score (under about 50) are unreliable for matching.
    pub quality: u8,
}

/// Unquantized DCT coefficients ("PDQF") with the quality score.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatHashResult<F> {
    /// The 16x16 coefficients, row-major.
    pub coefficients: Grid16<F>,
    /// Image-domain quality in `0..=100`.
    pub quality: u8,
}

/// Scratch memory for one in-flight hash computation.
///
/// Luma buffers grow to the largest image seen and are reused. Never share one set between
/// concurrent computations, give each thread its own.
#[derive(Debug, Default)]
pub struct HashBuffers<F> {
    luma: Vec<F>,
    scratch: Vec<F>,
    decimated: Box<Grid64<F>>,
    dct_tmp: Box<Grid16x64<F>>,
    coefficients: Box<Grid16<F>>,
}

impl<F: PdqFloat> HashBuffers<F> {
    /// Empty buffers, luma storage is allocated on first use.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffers pre-sized for `width x height` images.
    #[must_use]
    pub fn with_capacity(width: usize, height: usize) -> Self {
        let mut buffers = Self::default();
        buffers.resize(width.saturating_mul(height));
        buffers
    }

    fn resize(&mut self, len: usize) {
        self.luma.resize(len, F::zero());
        self.scratch.resize(len, F::zero());
    }
}

/// The PDQ hasher.
///
/// Owns the DCT basis, which is computed once and only read afterwards. `&PdqHasher` can be shared
/// across threads, each computation brings its own [`HashBuffers`].
#[derive(Debug, Clone)]
pub struct PdqHasher<K: Kernel = DefaultKernel> {
    kernel: K,
    dct: DctMatrix<K::InternalFloat>,
}

impl PdqHasher<DefaultKernel> {
    /// Hasher with the [`DefaultKernel`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_kernel(DefaultKernel)
    }
}

impl Default for PdqHasher<DefaultKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> PdqHasher<K> {
    /// Hasher with a specific kernel.
    #[must_use]
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            dct: DctMatrix::new(),
        }
    }

    /// The kernel in use.
    pub const fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Hash an image with freshly allocated buffers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the image has a zero dimension.
    pub fn hash<P: PixelGrid + ?Sized>(&self, pixels: &P) -> Result<HashResult> {
        let mut buffers = HashBuffers::new();
        self.hash_with_buffers(pixels, &mut buffers)
    }

    /// Hash an image reusing caller-owned buffers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the image has a zero dimension.
    pub fn hash_with_buffers<P: PixelGrid + ?Sized>(
        &self,
        pixels: &P,
        buffers: &mut HashBuffers<K::InternalFloat>,
    ) -> Result<HashResult> {
        self.hash_get_threshold(pixels, buffers)
            .map(|(result, _)| result)
    }

    /// Hash an image and also return the median the coefficients were thresholded at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the image has a zero dimension.
    pub fn hash_get_threshold<P: PixelGrid + ?Sized>(
        &self,
        pixels: &P,
        buffers: &mut HashBuffers<K::InternalFloat>,
    ) -> Result<(HashResult, K::InternalFloat)> {
        let quality = self.transform(pixels, buffers)?;
        let mut threshold = K::InternalFloat::zero();
        let hash = self
            .kernel
            .quantize(&buffers.coefficients, &mut threshold);
        trace!(%hash, quality, %threshold, "computed pdq hash");
        Ok((HashResult { hash, quality }, threshold))
    }

    /// Compute the unquantized 16x16 coefficients.
    ///
    /// Threshold them with [`crate::kernel::threshold::threshold_16x16`] to get the hash.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the image has a zero dimension.
    pub fn hash_float<P: PixelGrid + ?Sized>(
        &self,
        pixels: &P,
        buffers: &mut HashBuffers<K::InternalFloat>,
    ) -> Result<FloatHashResult<K::InternalFloat>> {
        let quality = self.transform(pixels, buffers)?;
        Ok(FloatHashResult {
            coefficients: (*buffers.coefficients).clone(),
            quality,
        })
    }

    /// Hash a precomputed `rows x cols` luma buffer. Both `luma` and `scratch` are overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a dimension is zero or either buffer is shorter than `rows * cols`.
    pub fn hash_luma(
        &self,
        luma: &mut [K::InternalFloat],
        scratch: &mut [K::InternalFloat],
        rows: usize,
        cols: usize,
    ) -> Result<HashResult> {
        let len = checked_len(cols, rows)?;
        if luma.len() < len || scratch.len() < len {
            debug!(rows, cols, luma = luma.len(), scratch = scratch.len(), "luma buffer too short");
            return Err(Error::InvalidInput {
                width: cols,
                height: rows,
                reason: "luma buffer shorter than rows * cols",
            });
        }

        let mut decimated = Box::<Grid64<K::InternalFloat>>::default();
        let mut dct_tmp = Box::<Grid16x64<K::InternalFloat>>::default();
        let mut coefficients = Box::<Grid16<K::InternalFloat>>::default();
        let quality = self.run(
            &mut luma[..len],
            &mut scratch[..len],
            rows,
            cols,
            &mut decimated,
            &mut dct_tmp,
            &mut coefficients,
        );
        let mut threshold = K::InternalFloat::zero();
        let hash = self.kernel.quantize(&coefficients, &mut threshold);
        Ok(HashResult { hash, quality })
    }

    // luma through DCT, coefficients are left in `buffers.coefficients`
    fn transform<P: PixelGrid + ?Sized>(
        &self,
        pixels: &P,
        buffers: &mut HashBuffers<K::InternalFloat>,
    ) -> Result<u8> {
        let (cols, rows) = (pixels.width(), pixels.height());
        let len = checked_len(cols, rows)?;

        buffers.resize(len);
        self.kernel.luma(pixels, &mut buffers.luma);

        Ok(self.run(
            &mut buffers.luma,
            &mut buffers.scratch,
            rows,
            cols,
            &mut buffers.decimated,
            &mut buffers.dct_tmp,
            &mut buffers.coefficients,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn run(
        &self,
        luma: &mut [K::InternalFloat],
        scratch: &mut [K::InternalFloat],
        rows: usize,
        cols: usize,
        decimated: &mut Grid64<K::InternalFloat>,
        dct_tmp: &mut Grid16x64<K::InternalFloat>,
        coefficients: &mut Grid16<K::InternalFloat>,
    ) -> u8 {
        trace!(
            rows,
            cols,
            window_along_rows = jarosz_window_size(cols),
            window_along_cols = jarosz_window_size(rows),
            "hashing"
        );
        self.kernel.jarosz_filter(luma, scratch, rows, cols);
        self.kernel.decimate(luma, rows, cols, decimated);
        let quality = self.kernel.quality(decimated);
        self.kernel
            .dct64_to_16(&self.dct, decimated, dct_tmp, coefficients);
        quality
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize> {
    let invalid = |reason: &'static str| {
        debug!(width, height, reason, "rejecting input");
        Error::InvalidInput {
            width,
            height,
            reason,
        }
    };
    if width == 0 || height == 0 {
        return Err(invalid("zero dimension"));
    }
    width
        .checked_mul(height)
        .ok_or_else(|| invalid("dimensions overflow"))
}
