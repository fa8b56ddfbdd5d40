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

//! Decoded pixel input.

use crate::error::{Error, Result};

/// A decoded image the hasher can read 8-bit RGB samples from.
///
/// Alpha, if the source has any, is ignored.
pub trait PixelGrid {
    /// Width in pixels.
    fn width(&self) -> usize;

    /// Height in pixels.
    fn height(&self) -> usize;

    /// The `[r, g, b]` sample at column `x`, row `y`.
    fn rgb(&self, x: usize, y: usize) -> [u8; 3];
}

impl<P: PixelGrid + ?Sized> PixelGrid for &P {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        (**self).rgb(x, y)
    }
}

/// A borrowed view over packed, row-major 8-bit pixels.
///
/// One channel is read as gray, three as RGB and four as RGBA.
#[derive(Debug, Clone, Copy)]
pub struct PackedPixels<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    channels: usize,
}

impl<'a> PackedPixels<'a> {
    /// Validate and wrap a pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a dimension is zero, the channel count is not 1, 3 or 4,
    /// or `data` holds fewer than `width * height * channels` bytes.
    pub fn new(data: &'a [u8], width: usize, height: usize, channels: usize) -> Result<Self> {
        let invalid = |reason: &'static str| Error::InvalidInput {
            width,
            height,
            reason,
        };
        if width == 0 || height == 0 {
            return Err(invalid("zero dimension"));
        }
        if !matches!(channels, 1 | 3 | 4) {
            return Err(invalid("unsupported channel count"));
        }
        let needed = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .ok_or_else(|| invalid("dimensions overflow"))?;
        if data.len() < needed {
            return Err(invalid("pixel buffer shorter than width * height * channels"));
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Packed RGB.
    ///
    /// # Errors
    ///
    /// See [`PackedPixels::new`].
    pub fn rgb8(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        Self::new(data, width, height, 3)
    }

    /// Packed RGBA.
    ///
    /// # Errors
    ///
    /// See [`PackedPixels::new`].
    pub fn rgba8(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        Self::new(data, width, height, 4)
    }

    /// Packed 8-bit gray.
    ///
    /// # Errors
    ///
    /// See [`PackedPixels::new`].
    pub fn luma8(data: &'a [u8], width: usize, height: usize) -> Result<Self> {
        Self::new(data, width, height, 1)
    }

    /// Channels per pixel.
    #[must_use]
    pub const fn channels(&self) -> usize {
        self.channels
    }
}

impl PixelGrid for PackedPixels<'_> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        let offset = (y * self.width + x) * self.channels;
        if self.channels == 1 {
            let v = self.data[offset];
            [v, v, v]
        } else {
            [self.data[offset], self.data[offset + 1], self.data[offset + 2]]
        }
    }
}

#[cfg(feature = "image")]
mod image_impls {
    use image::{DynamicImage, GenericImageView, GrayImage, Pixel, RgbImage, RgbaImage};

    use super::PixelGrid;

    macro_rules! impl_pixel_grid_for_buffer {
        ($($ty:ty),*) => {
            $(
                impl PixelGrid for $ty {
                    fn width(&self) -> usize {
                        self.width() as usize
                    }

                    fn height(&self) -> usize {
                        self.height() as usize
                    }

                    #[allow(clippy::cast_possible_truncation)]
                    #[inline]
                    fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
                        self.get_pixel(x as u32, y as u32).to_rgb().0
                    }
                }
            )*
        };
    }

    impl_pixel_grid_for_buffer!(RgbImage, RgbaImage, GrayImage);

    impl PixelGrid for DynamicImage {
        fn width(&self) -> usize {
            GenericImageView::width(self) as usize
        }

        fn height(&self) -> usize {
            GenericImageView::height(self) as usize
        }

        #[allow(clippy::cast_possible_truncation)]
        fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
            self.get_pixel(x as u32, y as u32).to_rgb().0
        }
    }
}
