//! A baseline sequential JFIF/JPEG encoder.
//!
//! Takes contiguous row-major RGB (or single-channel grayscale) pixel
//! bytes and produces a complete JFIF byte stream: color conversion and
//! chroma subsampling, forward DCT and quantization, zig-zag and DC/AC
//! packing, canonical Huffman coding (default or image-optimal), and
//! the surrounding marker segments.
//!
//! # Examples
//!
//! ```
//! use pix_jpeg::{Component, JpegEncoder, JpegSettingsBuilder};
//!
//! let settings = JpegSettingsBuilder::new(16, 16)
//!     .set_components(Component::default_triple().to_vec())
//!     .set_quality(80)
//!     .build()
//!     .unwrap();
//! let encoder = JpegEncoder::new(settings);
//!
//! let pixels = vec![128u8; 16 * 16 * 3];
//! let mut out = Vec::new();
//! encoder.encode(&pixels, &mut out).unwrap();
//! assert_eq!(&out[..2], &[0xFF, 0xD8]);
//! ```
//!
//! # Crate features
//!
//! - `std` (default): enables the blanket [`ZByteWriterTrait`](pix_core::bytestream::ZByteWriterTrait)
//!   implementation for `std::io::Write` sinks, and `std::error::Error`
//!   on [`EncodingErrors`].
//! - `threads`: runs the per-MCU DCT/quantization phase as a `rayon`
//!   data-parallel iterator instead of a sequential loop.

#![warn(
    clippy::correctness,
    clippy::perf,
    clippy::pedantic,
    clippy::inline_always,
    clippy::missing_errors_doc,
    clippy::panic
)]
#![allow(
    clippy::needless_return,
    clippy::similar_names,
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

pub use crate::component::{Component, DensityUnit, HuffmanMode, TableClass};
pub use crate::encoder::JpegEncoder;
pub use crate::errors::EncodingErrors;
pub use crate::huffman::HuffmanTable;
pub use crate::settings::{HuffmanTables, JpegSettings, JpegSettingsBuilder};

mod bitwriter;
mod blocks;
mod color_convert;
mod component;
mod constants;
mod dct;
mod downsample;
mod encoder;
pub mod errors;
mod entropy;
mod huffman;
mod packing;
mod settings;
mod worker;
mod writer;

#[must_use]
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
