//! Per-component descriptors and the small enums that describe how a
//! component's samples and coefficients get coded.

/// Which half of a JPEG Huffman table pair a symbol belongs to.
///
/// JPEG keeps DC and AC coefficients in separate table spaces (class 0 and
/// class 1 in the DHT segment) even when both happen to share the same
/// bit pattern.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TableClass {
    Dc,
    Ac
}

impl TableClass {
    /// The `class` nibble written into a DHT segment's Tc/Th byte.
    pub(crate) const fn marker_value(self) -> u8 {
        match self {
            TableClass::Dc => 0,
            TableClass::Ac => 1
        }
    }
}

/// How the Huffman tables used to entropy-code a component are obtained.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum HuffmanMode {
    /// Use the Annex K default DC/AC luminance/chrominance tables.
    #[default]
    Default,
    /// Caller supplies the DC/AC tables for every slot referenced by a
    /// component. Missing slots are a [`ConfigurationError`](crate::errors::EncodingErrors::ConfigurationError).
    Provided,
    /// Build per-class tables from the actual symbol frequencies of this
    /// image (Annex K.1-K.4).
    Optimal
}

/// The unit that a JFIF APP0 segment's density pair is expressed in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum DensityUnit {
    #[default]
    Aspect,
    PixelsPerInch,
    PixelsPerCm
}

impl DensityUnit {
    pub(crate) const fn marker_value(self) -> u8 {
        match self {
            DensityUnit::Aspect => 0,
            DensityUnit::PixelsPerInch => 1,
            DensityUnit::PixelsPerCm => 2
        }
    }
}

/// One entry of a [`JpegSettings`](crate::settings::JpegSettings) component
/// list: how a single color channel is sampled and which quantization and
/// Huffman table slots it codes through.
#[derive(Copy, Clone, Debug)]
pub struct Component {
    /// Horizontal sampling factor, 1..=4.
    pub horizontal_sampling: u8,
    /// Vertical sampling factor, 1..=4.
    pub vertical_sampling: u8,
    /// Index into the settings' quantization table list.
    pub quantization_table: u8,
    /// Index into the settings' DC Huffman table list.
    pub dc_huffman_table: u8,
    /// Index into the settings' AC Huffman table list.
    pub ac_huffman_table: u8
}

impl Component {
    pub const fn new(
        horizontal_sampling: u8, vertical_sampling: u8, quantization_table: u8,
        dc_huffman_table: u8, ac_huffman_table: u8
    ) -> Component {
        Component {
            horizontal_sampling,
            vertical_sampling,
            quantization_table,
            dc_huffman_table,
            ac_huffman_table
        }
    }

    /// Number of 8x8 blocks this component contributes to one MCU.
    pub(crate) const fn blocks_per_mcu(&self) -> usize {
        (self.horizontal_sampling as usize) * (self.vertical_sampling as usize)
    }

    /// The default three-component (4:2:0-capable) layout: full-resolution
    /// luma, quarter-resolution chroma, following the JFIF convention of
    /// putting luminance first.
    pub fn default_triple() -> [Component; 3] {
        [
            Component::new(2, 2, 0, 0, 0),
            Component::new(1, 1, 1, 1, 1),
            Component::new(1, 1, 1, 1, 1),
        ]
    }

    /// The default single-component (grayscale) layout.
    pub fn default_single() -> [Component; 1] {
        [Component::new(1, 1, 0, 0, 0)]
    }
}
