#![doc = include_str!("../README.md")]
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
#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs, clippy::pedantic)]

pub use generic_array::GenericArray;

/// Error types.
pub mod error;

/// The 256-bit hash value.
pub mod hash256;

/// PDQ compute kernels.
pub mod kernel;

/// Pixel input adapters.
pub mod pixels;

/// The hashing pipeline.
#[cfg(feature = "std")]
pub mod hasher;

/// Diagnostic utilities for debugging, integrating developers, or generally for fun inspecting internals. Not part of the stable API.
#[cfg(any(test, all(feature = "unstable", feature = "std")))]
pub mod testing;

pub use error::{Error, Result};
pub use hash256::Hash256;
#[cfg(feature = "std")]
pub use hasher::{FloatHashResult, HashBuffers, HashResult, PdqHasher};
pub use kernel::{DefaultKernel, Kernel, ReferenceKernel};
pub use pixels::{PackedPixels, PixelGrid};

#[cfg(feature = "std")]
static DEFAULT_HASHER: std::sync::LazyLock<PdqHasher> = std::sync::LazyLock::new(PdqHasher::new);

/// Hash an image with a process-wide [`PdqHasher`] using the [`DefaultKernel`].
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if the image has a zero dimension.
#[cfg(feature = "std")]
pub fn hash<P: PixelGrid + ?Sized>(pixels: &P) -> Result<HashResult> {
    DEFAULT_HASHER.hash(pixels)
}

/// Hash packed 8-bit RGB pixels.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if a dimension is zero or `data` is shorter than `width * height * 3`.
#[cfg(feature = "std")]
pub fn hash_rgb8(data: &[u8], width: usize, height: usize) -> Result<HashResult> {
    hash(&PackedPixels::rgb8(data, width, height)?)
}
