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

use num_traits::float::FloatCore;

/// Median by Torben's guess/partition method, without sorting or extra memory.
///
/// For even-length input this is the lower of the two middle elements. Returns `None` for empty input.
pub fn torben_median<F: FloatCore>(m: &[F]) -> Option<F> {
    let mut min = m.iter().copied().reduce(F::min)?;
    let mut max = m.iter().copied().reduce(F::max)?;

    let two = F::one() + F::one();
    let half = m.len().div_ceil(2);
    loop {
        let guess = (min + max) / two;
        let mut less = 0;
        let mut greater = 0;
        let mut equal = 0;
        let mut maxltguess = min;
        let mut mingtguess = max;
        for &val in m {
            if val < guess {
                less += 1;
                if val > maxltguess {
                    maxltguess = val;
                }
            } else if val > guess {
                greater += 1;
                if val < mingtguess {
                    mingtguess = val;
                }
            } else {
                equal += 1;
            }
        }
        if less <= half && greater <= half {
            return Some(if less >= half {
                maxltguess
            } else if less + equal >= half {
                guess
            } else {
                mingtguess
            });
        } else if less > greater {
            max = maxltguess;
        } else {
            min = mingtguess;
        }
    }
}
