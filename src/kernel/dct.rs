/*
 * Copyright (c) 2025 Yumechi <yume@yumechi.jp>
 *
 * Created on Friday, May 9, 2025
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

#[cfg(any(feature = "std", test))]
use generic_array::sequence::GenericSequence;
use generic_array::{
    GenericArray,
    typenum::{U16, U64},
};
use num_traits::{NumAssign, float::FloatCore};

use super::constants::{DCT_OUTPUT_DIM, DECIMATED_DIM};

/// A 64x64 row-major grid.
pub type Grid64<F> = GenericArray<GenericArray<F, U64>, U64>;

/// A 16x16 row-major grid.
pub type Grid16<F> = GenericArray<GenericArray<F, U16>, U16>;

/// A 16x64 row-major grid, the shape of the DCT basis and of the intermediate product.
pub type Grid16x64<F> = GenericArray<GenericArray<F, U64>, U16>;

/// The 16x64 DCT-II basis restricted to the lowest 16 non-DC frequencies.
///
/// `basis[i][j] = sqrt(2 / 64) * cos(pi / 128 * (i + 1) * (2j + 1))`, rounded to single precision.
/// Built once and shared read-only by every hash computation of a hasher.
#[derive(Clone, Debug, PartialEq)]
pub struct DctMatrix<F> {
    rows: Grid16x64<F>,
}

impl<F> DctMatrix<F> {
    /// The basis rows.
    #[must_use]
    pub const fn rows(&self) -> &Grid16x64<F> {
        &self.rows
    }
}

#[cfg(feature = "std")]
impl<F: Copy + From<f32>> DctMatrix<F> {
    /// Compute the basis.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn new() -> Self {
        let scale = (2.0f64 / 64.0).sqrt();
        let rows = GenericArray::generate(|i| {
            GenericArray::generate(|j| {
                let angle = core::f64::consts::PI / 2.0 / 64.0 * (i + 1) as f64 * (2 * j + 1) as f64;
                F::from((scale * angle.cos()) as f32)
            })
        });
        Self { rows }
    }
}

#[cfg(feature = "std")]
impl<F: Copy + From<f32>> Default for DctMatrix<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// `output = D * input * D^T`, through `tmp = D * input`.
///
/// Straight loops accumulating over the full inner dimension in order.
pub fn dct64_to_16<F: FloatCore + NumAssign>(
    basis: &DctMatrix<F>,
    input: &Grid64<F>,
    tmp: &mut Grid16x64<F>,
    output: &mut Grid16<F>,
) {
    let d = basis.rows();
    for i in 0..DCT_OUTPUT_DIM {
        for j in 0..DECIMATED_DIM {
            let mut sumk = F::zero();
            for k in 0..DECIMATED_DIM {
                sumk += d[i][k] * input[k][j];
            }
            tmp[i][j] = sumk;
        }
    }

    for i in 0..DCT_OUTPUT_DIM {
        for j in 0..DCT_OUTPUT_DIM {
            let mut sumk = F::zero();
            for k in 0..DECIMATED_DIM {
                sumk += tmp[i][k] * d[j][k];
            }
            output[i][j] = sumk;
        }
    }
}
