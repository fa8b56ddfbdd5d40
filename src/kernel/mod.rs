#![allow(
    clippy::needless_range_loop,
    reason = "keep the scalar code comparable to the split-accumulator code"
)]
/*
 * Copyright (c) 2025 Yumechi <yume@yumechi.jp>
 *
 * Created on Saturday, March 22, 2025
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
    fmt::{Debug, Display},
    marker::PhantomData,
};

use generic_array::sequence::Flatten;
use num_traits::{NumAssign, ToPrimitive, float::FloatCore};

pub use generic_array;

use crate::{Hash256, pixels::PixelGrid};
use constants::{
    DECIMATED_DIM, JAROSZ_PASSES, QUALITY_DIVISOR, QUALITY_MAX, RGB8_TO_LUMA_TABLE_ITU,
    jarosz_window_size,
};

/// Sliding-window box filter and the Jarosz filter.
pub mod box_filter;

/// Pipeline constants.
pub mod constants;

/// DCT basis and the 64x64 to 16x16 transform.
pub mod dct;

/// Median selection.
pub mod median;

/// Thresholding methods.
pub mod threshold;

pub use dct::{DctMatrix, Grid16, Grid16x64, Grid64};

/// Floating point types the pipeline can run in.
pub trait PdqFloat:
    FloatCore + NumAssign + From<u8> + From<f32> + Default + Debug + Display + Send + Sync + 'static
{
    /// Exact conversion of an 8-bit sample.
    #[inline(always)]
    fn from_sample(v: u8) -> Self {
        <Self as From<u8>>::from(v)
    }

    /// Conversion of a single-precision constant.
    #[inline(always)]
    fn from_single(v: f32) -> Self {
        <Self as From<f32>>::from(v)
    }
}

impl<T> PdqFloat for T where
    T: FloatCore
        + NumAssign
        + From<u8>
        + From<f32>
        + Default
        + Debug
        + Display
        + Send
        + Sync
        + 'static
{
}

// reference: https://raw.githubusercontent.com/facebook/ThreatExchange/main/hashing/hashing.pdf

/// Compute kernel for the numeric stages of the pipeline.
///
/// Every stage has a straight-loop provided implementation. Kernels override individual stages with
/// faster versions that stay within the tolerated bit error of the reference (10 bits out of 256).
///
/// All methods take `&self`: a kernel holds no per-call state, so one hasher can serve many threads
/// as long as each computation brings its own buffers.
pub trait Kernel {
    /// The internal floating point type used for intermediate calculations.
    type InternalFloat: PdqFloat;

    /// Convert pixels to luma, `0.299 R + 0.587 G + 0.114 B`, row-major into `output`.
    fn luma<P: PixelGrid + ?Sized>(&self, pixels: &P, output: &mut [Self::InternalFloat]) {
        let [cr, cg, cb] = RGB8_TO_LUMA_TABLE_ITU.map(Self::InternalFloat::from_single);
        let width = pixels.width();
        for (y, row) in output
            .chunks_exact_mut(width)
            .take(pixels.height())
            .enumerate()
        {
            for (x, out) in row.iter_mut().enumerate() {
                let [r, g, b] = pixels.rgb(x, y);
                *out = cr * Self::InternalFloat::from_sample(r)
                    + cg * Self::InternalFloat::from_sample(g)
                    + cb * Self::InternalFloat::from_sample(b);
            }
        }
    }

    /// Smooth a `rows x cols` luma buffer in place, using `scratch` as the second buffer.
    fn jarosz_filter(
        &self,
        buffer: &mut [Self::InternalFloat],
        scratch: &mut [Self::InternalFloat],
        rows: usize,
        cols: usize,
    ) {
        box_filter::jarosz_filter(
            buffer,
            scratch,
            rows,
            cols,
            jarosz_window_size(cols),
            jarosz_window_size(rows),
            JAROSZ_PASSES,
        );
    }

    /// Nearest-neighbor decimation of a `rows x cols` buffer to 64x64.
    fn decimate(
        &self,
        input: &[Self::InternalFloat],
        rows: usize,
        cols: usize,
        output: &mut Grid64<Self::InternalFloat>,
    ) {
        for (i, out_row) in output.iter_mut().enumerate() {
            let ini = ((2 * i + 1) * rows) / (2 * DECIMATED_DIM);
            for (j, out) in out_row.iter_mut().enumerate() {
                let inj = ((2 * j + 1) * cols) / (2 * DECIMATED_DIM);
                *out = input[ini * cols + inj];
            }
        }
    }

    /// Image-domain quality in `0..=100` from the gradients of the decimated grid.
    ///
    /// Each vertical and horizontal neighbor difference contributes `|trunc((u - v) * 100 / 255)|`,
    /// the total is divided by 90 and clamped.
    fn quality(&self, input: &Grid64<Self::InternalFloat>) -> u8 {
        let hundred = Self::InternalFloat::from_sample(100);
        let full = Self::InternalFloat::from_sample(255);
        let scaled = |u: Self::InternalFloat, v: Self::InternalFloat| {
            ((u - v) * hundred / full)
                .to_i64()
                .unwrap_or_default()
                .unsigned_abs()
        };

        let mut gradient_sum = 0;
        for i in 0..(DECIMATED_DIM - 1) {
            for j in 0..DECIMATED_DIM {
                gradient_sum += scaled(input[i][j], input[i + 1][j]);
            }
        }
        for i in 0..DECIMATED_DIM {
            for j in 0..(DECIMATED_DIM - 1) {
                gradient_sum += scaled(input[i][j], input[i][j + 1]);
            }
        }

        let quality = (gradient_sum / u64::from(QUALITY_DIVISOR)).min(u64::from(QUALITY_MAX));
        u8::try_from(quality).unwrap_or(u8::MAX)
    }

    /// 2D DCT-II of the 64x64 grid, keeping the lowest 16x16 coefficients.
    fn dct64_to_16(
        &self,
        basis: &DctMatrix<Self::InternalFloat>,
        input: &Grid64<Self::InternalFloat>,
        tmp: &mut Grid16x64<Self::InternalFloat>,
        output: &mut Grid16<Self::InternalFloat>,
    ) {
        dct::dct64_to_16(basis, input, tmp, output);
    }

    /// Median of the 256 coefficients.
    fn median(&self, input: &Grid16<Self::InternalFloat>) -> Self::InternalFloat {
        // 256 samples, never empty
        median::torben_median(input.flatten().as_slice()).unwrap_or_default()
    }

    /// Convert coefficients to a hash by thresholding at their median.
    ///
    /// # Parameters
    ///
    /// * `input`: The DCT coefficients.
    /// * `threshold`: Receives the median used.
    fn quantize(
        &self,
        input: &Grid16<Self::InternalFloat>,
        threshold: &mut Self::InternalFloat,
    ) -> Hash256 {
        let median = self.median(input);
        *threshold = median;
        threshold::threshold_16x16(input, median)
    }
}

/// A pure-Rust single-precision kernel with a split-accumulator DCT.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultKernel;

impl DefaultKernel {
    #[inline(always)]
    pub(crate) fn dct64_to_16_impl(
        basis: &Grid16x64<f32>,
        input: &Grid64<f32>,
        tmp: &mut Grid16x64<f32>,
        output: &mut Grid16<f32>,
    ) {
        for i in 0..16 {
            for j in 0..64 {
                let mut sumks = [0.0; 4];
                for (k, sumk) in (0..64).zip((0..4).cycle()) {
                    sumks[sumk] += basis[i][k] * input[k][j];
                }

                tmp[i][j] = sumks[0] + sumks[1] + sumks[2] + sumks[3];
            }

            for j in 0..16 {
                let mut sumks = [0.0; 4];
                for (k, sumk) in (0..64).zip((0..4).cycle()) {
                    sumks[sumk] += tmp[i][k] * basis[j][k];
                }
                output[i][j] = sumks[0] + sumks[1] + sumks[2] + sumks[3];
            }
        }
    }
}

impl Kernel for DefaultKernel {
    type InternalFloat = f32;

    fn dct64_to_16(
        &self,
        basis: &DctMatrix<f32>,
        input: &Grid64<f32>,
        tmp: &mut Grid16x64<f32>,
        output: &mut Grid16<f32>,
    ) {
        DefaultKernel::dct64_to_16_impl(basis.rows(), input, tmp, output);
    }
}

/// Straight-loop reference kernel, generic over the internal float (`f32` or `f64`).
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceKernel<F = f32> {
    _marker: PhantomData<F>,
}

impl<F> ReferenceKernel<F> {
    /// Create the kernel.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<F: PdqFloat> Kernel for ReferenceKernel<F> {
    type InternalFloat = F;
}
