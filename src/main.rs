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

use std::{path::PathBuf, process::ExitCode};

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use pdq256::{Hash256, HashBuffers, HashResult, Kernel, PdqHasher, ReferenceKernel};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn build_cli() -> Command {
    Command::new("pdq256")
        .about("PDQ perceptual image hashing")
        .long_about(concat!(
r#"
Compute and compare 256-bit PDQ perceptual hashes.

Two images are typically considered near-duplicates when their hashes differ by 31 bits or less.
Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostics on stderr.

Build Facts:
  Version: "#, env!("CARGO_PKG_VERSION")
        ))
        .version(env!("CARGO_PKG_VERSION"))
        .flatten_help(true)
        .subcommand_required(true)
        .subcommand(
            Command::new("hash")
                .about("Hash image files")
                .long_about(
r#"
Decode and hash image files in parallel, one output line per file in argument order.

Usage examples:

 * Hash a file, print the hash, quality and path:

    > pdq256 hash photo.jpg

       Output: <64 hex digits>,<quality 0-100>,photo.jpg

 * Print only the hash prefixed by the quality score:

    > pdq256 hash -f q+hex photos/*.jpg
"#)
                .arg(
                    Arg::new("files")
                        .help("Image files to hash")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .help("Output format specification")
                        .long_help(
                            "Specify the output format for hashes. Available formats:\n\
                             - csv: hash,quality,path\n\
                             - hex/HEX: Hexadecimal output (lowercase/uppercase)\n\
                             - bin: Binary string output, most significant bit first\n\
                             Modifiers:\n\
                             - q+: Prefix with quality score\n\
                             Examples: q+hex, HEX, q+bin",
                        )
                        .default_value("csv"),
                )
                .arg(
                    Arg::new("kernel")
                        .long("kernel")
                        .help("Compute kernel")
                        .long_help(
                            "Compute kernel. 'default' is the fast single precision kernel, \
                             'reference' runs straight loops in single precision and 'reference-f64' in double precision.",
                        )
                        .value_parser(["default", "reference", "reference-f64"])
                        .default_value("default"),
                ),
        )
        .subcommand(
            Command::new("distance")
                .about("Hamming distance between two hex hashes")
                .arg(Arg::new("a").required(true).help("First hash"))
                .arg(Arg::new("b").required(true).help("Second hash"))
                .arg(
                    Arg::new("max")
                        .long("max")
                        .help("Exit with status 1 if the distance exceeds this")
                        .value_parser(value_parser!(u32)),
                ),
        )
        .subcommand(
            Command::new("fuzz")
                .about("Flip random bits of a hash")
                .long_about(
                    "Flip N random bits of a hash, positions drawn with replacement, so the result is at most N bits away.",
                )
                .arg(Arg::new("hash").required(true).help("Hash in hex"))
                .arg(
                    Arg::new("bits")
                        .short('n')
                        .long("bits")
                        .help("Number of bit flips")
                        .value_parser(value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for reproducible output")
                        .value_parser(value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("dump-bits")
                .about("Print a hash as a 16x16 bit matrix")
                .arg(Arg::new("hash").required(true).help("Hash in hex"))
                .arg(
                    Arg::new("words")
                        .long("words")
                        .help("Print comma-separated decimal words instead")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("across")
                        .long("across")
                        .help("Print all 256 bits on one line")
                        .conflicts_with("words")
                        .action(ArgAction::SetTrue),
                ),
        )
}

#[derive(Clone, Copy)]
enum Encoding {
    Csv,
    Hex,
    UpperHex,
    Bin,
}

struct OutputFormat {
    quality: bool,
    encoding: Encoding,
}

impl OutputFormat {
    fn parse(spec: &str) -> Option<Self> {
        let (quality, rest) = match spec.strip_prefix("q+") {
            Some(rest) => (true, rest),
            None => (false, spec),
        };
        let encoding = match rest {
            "csv" if !quality => Encoding::Csv,
            "hex" => Encoding::Hex,
            "HEX" => Encoding::UpperHex,
            "bin" => Encoding::Bin,
            _ => return None,
        };
        Some(Self { quality, encoding })
    }

    fn render(&self, result: &HashResult, path: &std::path::Path) -> String {
        let hash = match self.encoding {
            Encoding::Csv => {
                return format!("{},{},{}", result.hash, result.quality, path.display());
            }
            Encoding::Hex => format!("{:x}", result.hash),
            Encoding::UpperHex => format!("{:X}", result.hash),
            Encoding::Bin => result
                .hash
                .to_bits()
                .iter()
                .map(|b| if *b == 1 { '1' } else { '0' })
                .collect(),
        };
        if self.quality {
            format!("{}:{}", result.quality, hash)
        } else {
            hash
        }
    }
}

fn hash_files<K: Kernel + Sync>(kernel: K, files: &[PathBuf], format: &OutputFormat) -> u8 {
    let hasher = PdqHasher::with_kernel(kernel);
    let results = files
        .par_iter()
        .map_init(HashBuffers::new, |buffers, path| -> Result<HashResult, String> {
            let image = image::open(path).map_err(|e| e.to_string())?;
            debug!(path = %path.display(), width = image.width(), height = image.height(), "decoded");
            hasher
                .hash_with_buffers(&image, buffers)
                .map_err(|e| e.to_string())
        })
        .collect::<Vec<_>>();

    let mut failed = false;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(result) => println!("{}", format.render(&result, path)),
            Err(e) => {
                error!(path = %path.display(), "{e}");
                failed = true;
            }
        }
    }

    u8::from(failed)
}

const EXIT_USAGE: u8 = 255;

fn parse_hash(matches: &ArgMatches, id: &str) -> Result<Hash256, u8> {
    let text = matches.get_one::<String>(id).map_or("", String::as_str);
    text.parse().map_err(|e| {
        eprintln!("invalid hash '{text}': {e}");
        EXIT_USAGE
    })
}

// exit status: 0 success, 1 failure or threshold exceeded, 255 usage error
fn run(matches: &ArgMatches) -> Result<u8, u8> {
    match matches.subcommand() {
        Some(("hash", sub)) => {
            let files = sub
                .get_many::<PathBuf>("files")
                .map(|files| files.cloned().collect::<Vec<_>>())
                .unwrap_or_default();
            let spec = sub.get_one::<String>("format").map_or("csv", String::as_str);
            let Some(format) = OutputFormat::parse(spec) else {
                eprintln!(
                    r#"invalid output format: '{spec}',
    expected one of: csv, hex, HEX, bin, optionally prefixed with 'q+' (except csv)"#
                );
                return Err(EXIT_USAGE);
            };
            Ok(
                match sub.get_one::<String>("kernel").map(String::as_str) {
                    Some("reference") => hash_files(ReferenceKernel::<f32>::new(), &files, &format),
                    Some("reference-f64") => {
                        hash_files(ReferenceKernel::<f64>::new(), &files, &format)
                    }
                    _ => hash_files(pdq256::DefaultKernel, &files, &format),
                },
            )
        }
        Some(("distance", sub)) => {
            let a = parse_hash(sub, "a")?;
            let b = parse_hash(sub, "b")?;
            let distance = a.hamming_distance(&b);
            println!("{distance}");
            match sub.get_one::<u32>("max") {
                Some(max) if !a.hamming_distance_le(&b, *max) => Ok(1),
                _ => Ok(0),
            }
        }
        Some(("fuzz", sub)) => {
            let hash = parse_hash(sub, "hash")?;
            let bits = sub.get_one::<usize>("bits").copied().unwrap_or(1);
            let mut rng: Box<dyn RngCore> = match sub.get_one::<u64>("seed") {
                Some(seed) => Box::new(StdRng::seed_from_u64(*seed)),
                None => Box::new(rand::rng()),
            };
            let fuzzed = hash.fuzz(bits, &mut *rng);
            println!("{fuzzed}");
            debug!(distance = hash.hamming_distance(&fuzzed), "fuzzed");
            Ok(0)
        }
        Some(("dump-bits", sub)) => {
            let hash = parse_hash(sub, "hash")?;
            if sub.get_flag("words") {
                println!("{}", hash.dump_words());
            } else if sub.get_flag("across") {
                println!("{}", hash.dump_bits_across());
            } else {
                println!("{}", hash.dump_bits());
            }
            Ok(0)
        }
        _ => {
            eprintln!("Invalid subcommand, try --help for usage");
            Err(EXIT_USAGE)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();
    ExitCode::from(run(&matches).unwrap_or_else(|code| code))
}
