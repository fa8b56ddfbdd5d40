//! this demo will demonstrate the robustness of perceptual hash matching against common edits,
//! compatibility of pdq256 hashes with another PDQ implementation, and how fuzzed hashes behave
//! against a matching threshold.
use image::{DynamicImage, RgbImage, imageops};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use pdq256::{Hash256, HashBuffers, PdqHasher, ReferenceKernel, testing};

const MATCH_THRESHOLD: u32 = 31;

fn main() {
    let mut rng = SmallRng::seed_from_u64(u64::from_be_bytes(*b"pdq256!!"));

    // a synthetic photo stand-in: smooth waves with some grain on top
    let (waves, width, height) = testing::complex(640, 480);
    let (grain, ..) = testing::noise(width, height, &mut rng);
    let data = waves
        .iter()
        .zip(grain.iter())
        .map(|(w, g)| ((u16::from(*w) * 3 + u16::from(*g)) / 4) as u8)
        .collect::<Vec<_>>();
    let original =
        RgbImage::from_raw(width as u32, height as u32, data.clone()).expect("buffer size matches");

    let hasher = PdqHasher::new();
    let mut buffers = HashBuffers::new();
    let reference = hasher
        .hash_with_buffers(&original, &mut buffers)
        .expect("failed to hash");
    println!("original:   {} (quality {})", reference.hash, reference.quality);

    // the same image through another implementation
    let other = pdqhash::image::RgbImage::from_raw(width as u32, height as u32, data)
        .expect("buffer size matches");
    let (other_hash, other_quality) =
        pdqhash::generate_pdq_full_size(&pdqhash::image::DynamicImage::ImageRgb8(other));
    let other_hash = Hash256::from_be_bytes(&other_hash);
    println!(
        "pdqhash:    {other_hash} (quality {other_quality:.3}), distance {}",
        reference.hash.hamming_distance(&other_hash)
    );

    let f64_hash = PdqHasher::with_kernel(ReferenceKernel::<f64>::new())
        .hash(&original)
        .expect("failed to hash");
    println!(
        "f64 kernel: {}, distance {}",
        f64_hash.hash,
        reference.hash.hamming_distance(&f64_hash.hash)
    );

    let dynamic = DynamicImage::ImageRgb8(original.clone());
    let edits: Vec<(&str, DynamicImage)> = vec![
        (
            "downscale 50%",
            dynamic.resize_exact(width as u32 / 2, height as u32 / 2, imageops::FilterType::Triangle),
        ),
        (
            "upscale 150%",
            dynamic.resize_exact(width as u32 * 3 / 2, height as u32 * 3 / 2, imageops::FilterType::CatmullRom),
        ),
        ("blur", dynamic.blur(2.0)),
        ("brighten", dynamic.brighten(20)),
        ("contrast", dynamic.adjust_contrast(15.0)),
        ("grayscale", DynamicImage::ImageLuma8(dynamic.to_luma8())),
        ("crop 5%", dynamic.crop_imm(16, 12, width as u32 - 32, height as u32 - 24)),
        ("rotate 90", dynamic.rotate90()),
        ("flip horizontal", dynamic.fliph()),
    ];

    println!("\n{:<18} {:>8} {:>8}  match", "edit", "distance", "quality");
    for (name, edited) in edits {
        let result = hasher
            .hash_with_buffers(&edited, &mut buffers)
            .expect("failed to hash");
        let distance = reference.hash.hamming_distance(&result.hash);
        println!(
            "{name:<18} {distance:>8} {:>8}  {}",
            result.quality,
            reference.hash.hamming_distance_le(&result.hash, MATCH_THRESHOLD)
        );
    }

    println!("\nfuzzed copies against threshold {MATCH_THRESHOLD}:");
    for bits in [8, 16, 31, 32, 64, 128] {
        let trials = 1000;
        let matched = (0..trials)
            .filter(|_| {
                let fuzzed = reference.hash.fuzz(bits, &mut rng);
                reference.hash.hamming_distance_le(&fuzzed, MATCH_THRESHOLD)
            })
            .count();
        println!("  {bits:>3} flips: {matched:>4}/{trials} still match");
    }

    let unrelated = Hash256::from_words(core::array::from_fn(|_| rng.random()));
    println!(
        "\nrandom unrelated hash distance: {}",
        reference.hash.hamming_distance(&unrelated)
    );
}
