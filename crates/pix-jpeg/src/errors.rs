//! Errors that can occur while encoding a JPEG image.

use core::fmt;

use pix_core::errors::CoreSinkError;

use crate::component::TableClass;

/// Errors returned by [`JpegEncoder::encode`](crate::encoder::JpegEncoder::encode).
pub enum EncodingErrors {
    /// The settings given to the encoder are not valid, e.g an unsupported
    /// sampling factor or a quality outside `1..=100`.
    ConfigurationError(String),
    /// A component references a Huffman table slot that was never built.
    HuffmanTableMissing { component: usize, class: TableClass },
    /// The category/run-length packer produced a symbol the Huffman encoder
    /// has no code for. Indicates a bug in the packing stage, not bad input.
    UnknownSymbol(i32),
    /// The sink the image is being written to returned an error.
    SinkError(CoreSinkError)
}

impl fmt::Debug for EncodingErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigurationError(reason) => {
                write!(f, "Invalid encoder configuration: {reason}")
            }
            Self::HuffmanTableMissing { component, class } => {
                write!(
                    f,
                    "No {class:?} Huffman table built for component index {component}"
                )
            }
            Self::UnknownSymbol(symbol) => {
                write!(f, "Packer produced symbol {symbol} with no Huffman code")
            }
            Self::SinkError(e) => write!(f, "Error writing to sink: {e:?}")
        }
    }
}

impl fmt::Display for EncodingErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EncodingErrors {}

impl From<CoreSinkError> for EncodingErrors {
    fn from(value: CoreSinkError) -> Self {
        EncodingErrors::SinkError(value)
    }
}
