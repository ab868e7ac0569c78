/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core routines shared by all libraries
//!
//! This crate provides a set of core routines shared
//! by the decoders and encoders under the `pix` umbrella
//!
//! It currently contains
//!
//! - A bytestream reader and writer with endian aware reads and writes
//! - Colorspace and bit depth information shared by images
//! - A shared sink error type used by codecs that write through
//!   [`ZByteWriterTrait`](crate::bytestream::ZByteWriterTrait)
//!
//! This library is `#[no_std]` with `alloc` feature needed for defining `Vec`
//! which we need for storing encoded bytes.
//!
//!
//! # Features
//!  - `std`: Enables `std::io::Write` sinks and `std::error::Error` impls.
//!
//!  - `serde`: Enables serializing of some of the data structures
//!     present in the crate
//!
//!
//! # Input/Output
//!
//! For output, we support anything that implements [`ZByteWriterTrait`](crate::bytestream::ZByteWriterTrait),
//! which includes in-memory buffers (`&mut [u8]`, `&mut Vec<u8>`) and, under the `std` feature,
//! anything that implements `std::io::Write` (files, network sockets, etc).
//!
//! For input readers we can read anything that implements `BufRead` + `Seek` and provide an
//! optimized routine for handling in memory buffers by using [`ZCursor`](crate::bytestream::ZCursor).
//!
#![cfg_attr(not(feature = "std"), no_std)]
#![macro_use]
extern crate alloc;
extern crate core;

#[cfg(not(feature = "log"))]
pub mod log;

#[cfg(feature = "log")]
pub use log;

pub mod bit_depth;
pub mod bytestream;
pub mod colorspace;
pub mod errors;
mod serde;
