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

use thiserror::Error;

/// Errors surfaced by hashing and hash parsing.
///
/// Every failure is local and immediate, nothing in this crate retries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The pixel grid is empty, has a zero dimension, or its backing buffer is too short.
    #[error("invalid input image ({width}x{height}): {reason}")]
    InvalidInput {
        /// Claimed width in pixels.
        width: usize,
        /// Claimed height in pixels.
        height: usize,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The textual hash is not exactly 64 hex nybbles.
    #[error("malformed hash encoding: {0}")]
    MalformedHashEncoding(hex::FromHexError),

    /// A bit index outside `0..=255` was supplied.
    #[error("bit index {0} is out of range for a 256-bit hash")]
    OutOfRangeBitIndex(usize),
}

// not `#[from]`: `FromHexError` only implements `Error` with hex's std feature
impl From<hex::FromHexError> for Error {
    fn from(e: hex::FromHexError) -> Self {
        Self::MalformedHashEncoding(e)
    }
}

/// Result alias for this crate.
pub type Result<T> = core::result::Result<T, Error>;
