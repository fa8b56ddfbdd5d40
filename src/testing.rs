/*
 * Copyright (c) 2025 Yumechi <yume@yumechi.jp>
 *
 * Created on Sunday, May 11, 2025
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

//! Synthetic images and diagnostic dumps.

use std::{f64::consts::PI, path::Path};

use generic_array::{ArrayLength, GenericArray};
use num_traits::ToPrimitive;
use rand::Rng;

/// A packed RGB8 image: bytes, width, height.
pub type RgbImageData = (Vec<u8>, usize, usize);

fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> [u8; 3]) -> RgbImageData {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            data.extend_from_slice(&f(x, y));
        }
    }
    (data, width, height)
}

/// Uniform mid gray.
#[must_use]
pub fn solid(width: usize, height: usize) -> RgbImageData {
    from_fn(width, height, |_, _| [128; 3])
}

/// Horizontal black to white ramp.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn gradient(width: usize, height: usize) -> RgbImageData {
    from_fn(width, height, |x, _| {
        [(x as f64 / width as f64 * 255.0) as u8; 3]
    })
}

/// Black and white squares of side `max(width / 32, 8)`.
#[must_use]
pub fn checkerboard(width: usize, height: usize) -> RgbImageData {
    let square = (width / 32).max(8);
    from_fn(width, height, |x, y| {
        if (x / square + y / square) % 2 == 0 {
            [255; 3]
        } else {
            [0; 3]
        }
    })
}

/// Uniform gray noise.
#[must_use]
pub fn noise<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> RgbImageData {
    from_fn(width, height, |_, _| [rng.random(); 3])
}

/// Two periods of sine waves per axis, one per channel.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn complex(width: usize, height: usize) -> RgbImageData {
    from_fn(width, height, |x, y| {
        let fx = x as f64 / width as f64 * 4.0 * PI;
        let fy = y as f64 / height as f64 * 4.0 * PI;
        let channel = |v: f64| ((v.sin() + 1.0) / 2.0 * 255.0) as u8;
        [channel(fx), channel(fy), channel(fx + fy)]
    })
}

/// Dump a grid as a grayscale PPM, stretched to the full 0..=255 range.
///
/// Non-finite values are drawn red (NaN), green (+inf) or blue (-inf).
///
/// # Errors
///
/// Returns any I/O error from creating or writing the file.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn dump_grid<P: AsRef<Path>, W: ArrayLength, H: ArrayLength, F: ToPrimitive>(
    path: P,
    input: &GenericArray<GenericArray<F, W>, H>,
) -> std::io::Result<()> {
    use std::io::Write;

    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let values = input
        .iter()
        .flatten()
        .map(|v| v.to_f64().unwrap_or(f64::NAN))
        .collect::<Vec<_>>();
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let scale_by = if max > min { (max - min) / 255.0 } else { 1.0 };

    let mut of = std::io::BufWriter::new(std::fs::File::create(path)?);
    writeln!(of, "P6")?;
    writeln!(of, "{} {}", W::USIZE, H::USIZE)?;
    writeln!(of, "255")?;

    for val in values {
        if val.is_nan() {
            of.write_all(&[255, 0, 0])?;
        } else if val.is_infinite() {
            of.write_all(if val.is_sign_positive() {
                &[0, 255, 0]
            } else {
                &[0, 0, 255]
            })?;
        } else {
            let scaled = ((val - min) / scale_by) as u8;
            of.write_all(&[scaled; 3])?;
        }
    }
    of.flush()
}

#[cfg(test)]
mod tests {
    use generic_array::typenum::{U2, U3};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_generators() {
        let (data, w, h) = solid(5, 4);
        assert_eq!((data.len(), w, h), (60, 5, 4));
        assert!(data.iter().all(|v| *v == 128));

        let (data, ..) = gradient(256, 1);
        assert_eq!(data[0], 0);
        assert_eq!(data[3 * 255], 254);

        let (data, ..) = checkerboard(64, 64);
        assert_eq!(data[0], 255);
        assert_eq!(data[8 * 3], 0);

        let (a, ..) = noise(16, 16, &mut StdRng::seed_from_u64(42));
        let (b, ..) = noise(16, 16, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);

        let (data, ..) = complex(100, 100);
        assert_eq!(&data[..3], &[127, 127, 127]);
    }

    #[test]
    fn test_dump_grid() {
        let mut grid = GenericArray::<GenericArray<f32, U3>, U2>::default();
        grid[0][1] = 10.0;
        grid[1][2] = f32::NAN;
        let path = std::env::temp_dir().join(format!("pdq256-dump-{}.ppm", std::process::id()));
        dump_grid(&path, &grid).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(bytes.starts_with(b"P6\n3 2\n255\n"));
        let pixels = &bytes[b"P6\n3 2\n255\n".len()..];
        assert_eq!(pixels.len(), 18);
        assert_eq!(&pixels[3..6], &[255, 255, 255]);
        assert_eq!(&pixels[15..18], &[255, 0, 0]);
    }
}
