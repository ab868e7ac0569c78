/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Shared error types for byte-sink failures.
//!
//! Encoders built on top of this crate propagate sink failures through
//! this type rather than inventing their own per-crate I/O error.

use core::fmt;

use crate::bytestream::ZByteIoError;

/// Wraps a byte-sink failure surfaced through a [`ZByteWriterTrait`](crate::bytestream::ZByteWriterTrait)
/// implementor.
pub struct CoreSinkError(pub ZByteIoError);

impl fmt::Debug for CoreSinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for CoreSinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoreSinkError {}

impl From<ZByteIoError> for CoreSinkError {
    fn from(value: ZByteIoError) -> Self {
        CoreSinkError(value)
    }
}
