/*
 * Copyright (c) 2025 Yumechi <yume@yumechi.jp>
 *
 * Created on Thursday, May 8, 2025
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

//! Sliding-window mean along strided sequences, and the Jarosz filter built from it.

use num_traits::{NumAssign, float::FloatCore};

/// The four phases of a single box filter pass, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxPhase {
    /// Fill the right half of the first window, no output.
    Accumulate,
    /// Window grows by one sample per output until it reaches full width.
    Grow,
    /// Full window slides: one sample enters, one leaves.
    Slide,
    /// Window shrinks at the tail, samples only leave.
    Shrink,
}

impl BoxPhase {
    /// All phases in execution order.
    pub const ALL: [Self; 4] = [Self::Accumulate, Self::Grow, Self::Slide, Self::Shrink];
}

/// Trip counts of each [`BoxPhase`] for a sequence length and window size.
///
/// All counts are clamped at zero, so windows wider than the sequence are well-defined:
/// the window is simply truncated at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseLengths {
    /// Samples left of the center covered by a full window.
    pub left: usize,
    /// Samples right of the center covered by a full window.
    pub right: usize,
    /// Samples to the right of the center that are summed before the first output.
    pub accumulate: usize,
    /// Outputs emitted while the window grows.
    pub grow: usize,
    /// Outputs emitted with the full window.
    pub slide: usize,
    /// Outputs emitted while the window shrinks.
    pub shrink: usize,
}

impl PhaseLengths {
    /// Compute the phase lengths. A zero window is treated as 1.
    #[must_use]
    pub const fn new(len: usize, window: usize) -> Self {
        let window = if window == 0 { 1 } else { window };
        let right = right_extent(window);
        let accumulate = if right < len { right } else { len };
        let full = if window < len { window } else { len };
        Self {
            left: window - right - 1,
            right,
            accumulate,
            grow: full - accumulate,
            slide: len.saturating_sub(window),
            shrink: accumulate,
        }
    }

    /// Trip count for one phase.
    #[must_use]
    pub const fn of(&self, phase: BoxPhase) -> usize {
        match phase {
            BoxPhase::Accumulate => self.accumulate,
            BoxPhase::Grow => self.grow,
            BoxPhase::Slide => self.slide,
            BoxPhase::Shrink => self.shrink,
        }
    }

    /// Number of outputs written, always equal to the sequence length.
    #[must_use]
    pub const fn outputs(&self) -> usize {
        self.grow + self.slide + self.shrink
    }
}

// 7 -> 3, 8 -> 4
const fn right_extent(window: usize) -> usize {
    (window + 2) / 2 - 1
}

/// Sliding-window mean over `len` samples starting at `start` and spaced `stride` apart.
///
/// Output `i` is the mean of input samples `i - left ..= i + right` clipped to the sequence, where
/// `right = (window + 2) / 2 - 1` and `left = window - right - 1`. Output is written to the same
/// positions of `output`.
///
/// # Panics
///
/// Panics if either buffer is too short for `start + (len - 1) * stride`.
pub fn box_one_d<F: FloatCore + NumAssign>(
    input: &[F],
    start: usize,
    output: &mut [F],
    len: usize,
    stride: usize,
    window: usize,
) {
    let at = |i: usize| start + i * stride;

    if window <= 1 {
        for i in 0..len {
            output[at(i)] = input[at(i)];
        }
        return;
    }

    let phases = PhaseLengths::new(len, window);
    let left = phases.left;

    let mut sum = F::zero();
    let mut count = F::zero();
    let mut ri = 0;
    let mut oi = 0;

    for phase in BoxPhase::ALL {
        let trips = phases.of(phase);
        match phase {
            BoxPhase::Accumulate => {
                for _ in 0..trips {
                    sum += input[at(ri)];
                    count += F::one();
                    ri += 1;
                }
            }
            BoxPhase::Grow => {
                for _ in 0..trips {
                    sum += input[at(ri)];
                    count += F::one();
                    ri += 1;
                    output[at(oi)] = sum / count;
                    oi += 1;
                }
            }
            BoxPhase::Slide => {
                let denom = F::one() / count;
                for _ in 0..trips {
                    sum += input[at(ri)];
                    sum -= input[at(oi - left - 1)];
                    ri += 1;
                    output[at(oi)] = sum * denom;
                    oi += 1;
                }
            }
            BoxPhase::Shrink => {
                for _ in 0..trips {
                    // nothing leaves while the left edge is still clipped
                    if let Some(li) = oi.checked_sub(left + 1) {
                        sum -= input[at(li)];
                        count -= F::one();
                    }
                    output[at(oi)] = sum / count;
                    oi += 1;
                }
            }
        }
    }
}

/// Box filter every row of a `rows x cols` row-major matrix.
pub fn box_along_rows<F: FloatCore + NumAssign>(
    input: &[F],
    output: &mut [F],
    rows: usize,
    cols: usize,
    window: usize,
) {
    for i in 0..rows {
        box_one_d(input, i * cols, output, cols, 1, window);
    }
}

/// Box filter every column of a `rows x cols` row-major matrix.
pub fn box_along_cols<F: FloatCore + NumAssign>(
    input: &[F],
    output: &mut [F],
    rows: usize,
    cols: usize,
    window: usize,
) {
    for j in 0..cols {
        box_one_d(input, j, output, rows, cols, window);
    }
}

/// Jarosz filter: `passes` rounds of rows (`buffer` into `scratch`) then columns (`scratch` back into `buffer`).
///
/// The smoothed result is left in `buffer`.
pub fn jarosz_filter<F: FloatCore + NumAssign>(
    buffer: &mut [F],
    scratch: &mut [F],
    rows: usize,
    cols: usize,
    window_along_rows: usize,
    window_along_cols: usize,
    passes: usize,
) {
    for _ in 0..passes {
        box_along_rows(buffer, scratch, rows, cols, window_along_rows);
        box_along_cols(scratch, buffer, rows, cols, window_along_cols);
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;

    fn brute_force(input: &[f64], window: usize) -> Vec<f64> {
        let PhaseLengths { left, right, .. } = PhaseLengths::new(input.len(), window);
        (0..input.len())
            .map(|i| {
                let lo = i.saturating_sub(left);
                let hi = (i + right).min(input.len() - 1);
                input[lo..=hi].iter().sum::<f64>() / (hi - lo + 1) as f64
            })
            .collect()
    }

    // four unclamped loops, full-window outputs use a precomputed reciprocal
    fn four_loops(input: &[f32], window: usize) -> Vec<f32> {
        let half = (window + 2) / 2;
        let mut output = vec![0.0; input.len()];
        let (mut li, mut ri, mut oi) = (0, 0, 0);
        let mut sum = 0.0f32;
        let mut current = 0.0f32;
        for _ in 0..half - 1 {
            sum += input[ri];
            current += 1.0;
            ri += 1;
        }
        for _ in 0..window - half + 1 {
            sum += input[ri];
            current += 1.0;
            output[oi] = sum / current;
            ri += 1;
            oi += 1;
        }
        let denom = 1.0 / current;
        for _ in 0..input.len() - window {
            sum += input[ri];
            sum -= input[li];
            output[oi] = sum * denom;
            li += 1;
            ri += 1;
            oi += 1;
        }
        for _ in 0..half - 1 {
            sum -= input[li];
            current -= 1.0;
            output[oi] = sum / current;
            li += 1;
            oi += 1;
        }
        output
    }

    #[test]
    fn test_bit_exact_with_four_loops() {
        let mut rng = StdRng::seed_from_u64(4);
        let input: Vec<f32> = (0..1000).map(|_| rng.random_range(0.0..255.0)).collect();
        for window in 2..=9 {
            let mut output = vec![0.0; input.len()];
            box_one_d(&input, 0, &mut output, input.len(), 1, window);
            let expected = four_loops(&input, window);
            let mismatched = output
                .iter()
                .zip(expected.iter())
                .filter(|(a, b)| a.to_bits() != b.to_bits())
                .count();
            assert_eq!(mismatched, 0, "window={window}");
        }
    }

    #[test]
    fn test_phase_lengths() {
        let p = PhaseLengths::new(10, 7);
        assert_eq!(
            p,
            PhaseLengths {
                left: 3,
                right: 3,
                accumulate: 3,
                grow: 4,
                slide: 3,
                shrink: 3
            }
        );
        let p = PhaseLengths::new(10, 8);
        assert_eq!((p.left, p.right), (3, 4));
        assert_eq!((p.accumulate, p.grow, p.slide, p.shrink), (4, 4, 2, 4));

        for len in 0..40 {
            for window in 0..50 {
                assert_eq!(PhaseLengths::new(len, window).outputs(), len);
            }
        }
    }

    #[test]
    fn test_window_one_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        let input: Vec<f32> = (0..97).map(|_| rng.random_range(0.0..255.0)).collect();
        for window in [0, 1] {
            let mut output = vec![0.0; input.len()];
            box_one_d(&input, 0, &mut output, input.len(), 1, window);
            assert_eq!(output, input);
        }
    }

    #[test]
    fn test_constant_input_stays_constant() {
        for len in [1, 2, 3, 16, 100] {
            for window in [2, 3, 4, 7, 8, 64, 150] {
                let input = vec![123.25f32; len];
                let mut output = vec![0.0; len];
                box_one_d(&input, 0, &mut output, len, 1, window);
                for v in output {
                    assert!((v - 123.25).abs() < 1e-3, "len={len} window={window} v={v}");
                }
            }
        }
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(2);
        for len in [1, 2, 5, 13, 64, 200] {
            let input: Vec<f64> = (0..len).map(|_| rng.random_range(0.0..255.0)).collect();
            for window in [2, 3, 4, 5, 8, 9, 13, 100, 500] {
                let mut output = vec![0.0; len];
                box_one_d(&input, 0, &mut output, len, 1, window);
                let expected = brute_force(&input, window);
                for (i, (a, b)) in output.iter().zip(expected.iter()).enumerate() {
                    assert!(
                        (a - b).abs() < 1e-9,
                        "len={len} window={window} i={i}: {a} != {b}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_strided_columns_match_rows_of_transpose() {
        let mut rng = StdRng::seed_from_u64(3);
        let (rows, cols) = (23, 41);
        let input: Vec<f64> = (0..rows * cols)
            .map(|_| rng.random_range(0.0..255.0))
            .collect();
        let mut transposed = vec![0.0; rows * cols];
        for i in 0..rows {
            for j in 0..cols {
                transposed[j * rows + i] = input[i * cols + j];
            }
        }

        let mut by_cols = vec![0.0; rows * cols];
        box_along_cols(&input, &mut by_cols, rows, cols, 5);
        let mut by_rows = vec![0.0; rows * cols];
        box_along_rows(&transposed, &mut by_rows, cols, rows, 5);

        for i in 0..rows {
            for j in 0..cols {
                assert!((by_cols[i * cols + j] - by_rows[j * rows + i]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_jarosz_smooths_and_preserves_constant() {
        let (rows, cols) = (32, 48);
        let mut buffer = vec![77.0f32; rows * cols];
        let mut scratch = vec![0.0; rows * cols];
        jarosz_filter(&mut buffer, &mut scratch, rows, cols, 3, 4, 2);
        assert!(buffer.iter().all(|v| (v - 77.0).abs() < 1e-3));

        let mut buffer: Vec<f32> = (0..rows * cols)
            .map(|i| if (i / cols + i % cols) % 2 == 0 { 255.0 } else { 0.0 })
            .collect();
        jarosz_filter(&mut buffer, &mut scratch, rows, cols, 4, 4, 2);
        let center = buffer[(rows / 2) * cols + cols / 2];
        assert!((center - 127.5).abs() < 20.0, "center={center}");
    }
}
