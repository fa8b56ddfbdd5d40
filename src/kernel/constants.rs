/*
 * Copyright (c) 2025 Yumechi <yume@yumechi.jp>
 *
 * Created on Wednesday, April 9, 2025
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

/// Lookup table for converting RGB8 to luma using ITU-R BT.601, in R, G, B order.
pub const RGB8_TO_LUMA_TABLE_ITU: [f32; 3] = [0.299, 0.587, 0.114];

/// Number of row-then-column box filter passes in the Jarosz filter.
pub const JAROSZ_PASSES: usize = 2;

/// Side length of the decimated grid fed to the DCT.
pub const DECIMATED_DIM: usize = 64;

/// Side length of the retained low-frequency DCT block.
pub const DCT_OUTPUT_DIM: usize = 16;

/// Input dimension is divided by this (rounding up) to get the box filter window.
pub const JAROSZ_WINDOW_DIVISOR: usize = 2 * DECIMATED_DIM;

/// The summed gradient is divided by this to get the quality score.
pub const QUALITY_DIVISOR: u32 = 90;

/// Maximum quality score.
pub const QUALITY_MAX: u32 = 100;

/// Box filter window for an input dimension, `ceil(dim / 128)`.
#[must_use]
pub const fn jarosz_window_size(dim: usize) -> usize {
    dim.div_ceil(JAROSZ_WINDOW_DIVISOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size() {
        assert_eq!(jarosz_window_size(1), 1);
        assert_eq!(jarosz_window_size(64), 1);
        assert_eq!(jarosz_window_size(128), 1);
        assert_eq!(jarosz_window_size(129), 2);
        assert_eq!(jarosz_window_size(512), 4);
        assert_eq!(jarosz_window_size(1000), 8);
        for dim in 1..2048 {
            assert_eq!(jarosz_window_size(dim), (dim + 2 * 64 - 1) / (2 * 64));
        }
    }
}
