//! Top-level orchestrator (C9): sequences C1-C8 to turn raw RGB (or
//! grayscale) pixels into a complete JFIF byte stream. Contains no
//! algorithmic logic of its own beyond sequencing and error propagation.

use pix_core::bytestream::ZByteWriterTrait;

use crate::bitwriter::BitWriter;
use crate::component::HuffmanMode;
use crate::constants::{
    DEFAULT_CHROMA_AC_BITS, DEFAULT_CHROMA_AC_VALUES, DEFAULT_CHROMA_DC_BITS, DEFAULT_CHROMA_DC_VALUES,
    DEFAULT_LUMA_AC_BITS, DEFAULT_LUMA_AC_VALUES, DEFAULT_LUMA_DC_BITS, DEFAULT_LUMA_DC_VALUES
};
use crate::entropy::emit_entropy_segment;
use crate::errors::EncodingErrors;
use crate::huffman::HuffmanTable;
use crate::packing::{apply_dc_deltas, pack_block};
use crate::settings::JpegSettings;
use crate::worker::build_block_store;
use crate::writer::{write_app0, write_dht, write_dqt, write_eoi, write_sof0, write_soi, write_sos};

/// A validated [`JpegSettings`] ready to encode images. Cheap to clone;
/// holds no open resources, only configuration.
pub struct JpegEncoder {
    settings: JpegSettings
}

impl JpegEncoder {
    pub fn new(settings: JpegSettings) -> JpegEncoder {
        JpegEncoder { settings }
    }

    pub fn settings(&self) -> &JpegSettings {
        &self.settings
    }

    /// Encode `pixels` (row-major, 3 bytes/pixel for a 3-component image,
    /// 1 byte/pixel for a single-component one) into `sink` as a
    /// complete JFIF stream.
    pub fn encode<T: ZByteWriterTrait>(&self, pixels: &[u8], sink: T) -> Result<(), EncodingErrors> {
        let bytes_per_pixel = self.settings.components().len();
        let expected_len = bytes_per_pixel * self.settings.width() * self.settings.height();
        if pixels.len() != expected_len {
            return Err(EncodingErrors::ConfigurationError(format!(
                "expected {expected_len} pixel bytes for a {}x{} {}-component image, got {}",
                self.settings.width(),
                self.settings.height(),
                bytes_per_pixel,
                pixels.len()
            )));
        }

        let mut store = build_block_store(pixels, &self.settings);
        apply_dc_deltas(&mut store, &self.settings);

        let (dc_tables, ac_tables) = self.resolve_huffman_tables(&store);

        let mut writer = BitWriter::new(sink);
        write_soi(&mut writer)?;
        write_app0(&mut writer, &self.settings)?;
        write_dqt(&mut writer, &self.settings)?;
        write_sof0(&mut writer, &self.settings)?;
        write_dht(&mut writer, &dc_tables, &ac_tables)?;
        write_sos(&mut writer, &self.settings)?;
        emit_entropy_segment(&mut writer, &self.settings, &store, &dc_tables, &ac_tables)?;
        write_eoi(&mut writer)?;

        Ok(())
    }

    /// Resolve the DC/AC table pair used for entropy coding, per
    /// [`HuffmanMode`]: the Annex K defaults, the caller-supplied tables,
    /// or tables built from this image's own symbol frequencies.
    fn resolve_huffman_tables(&self, store: &crate::blocks::BlockStore) -> (Vec<HuffmanTable>, Vec<HuffmanTable>) {
        match self.settings.huffman_mode() {
            HuffmanMode::Default => {
                let mut dc_tables =
                    vec![HuffmanTable::from_bits_and_values(DEFAULT_LUMA_DC_BITS, &DEFAULT_LUMA_DC_VALUES)];
                let mut ac_tables =
                    vec![HuffmanTable::from_bits_and_values(DEFAULT_LUMA_AC_BITS, &DEFAULT_LUMA_AC_VALUES)];
                if self.settings.components().len() > 1 {
                    dc_tables.push(HuffmanTable::from_bits_and_values(DEFAULT_CHROMA_DC_BITS, &DEFAULT_CHROMA_DC_VALUES));
                    ac_tables.push(HuffmanTable::from_bits_and_values(DEFAULT_CHROMA_AC_BITS, &DEFAULT_CHROMA_AC_VALUES));
                }
                (dc_tables, ac_tables)
            }
            HuffmanMode::Provided => {
                // Validated present in JpegSettingsBuilder::build.
                let tables = self.settings.provided_tables().expect("validated at settings build time");
                (tables.dc.clone(), tables.ac.clone())
            }
            HuffmanMode::Optimal => self.build_optimal_tables(store)
        }
    }

    /// Build one DC and one AC table per Huffman table slot a component
    /// actually references (`dc_huffman_table`/`ac_huffman_table`), from
    /// this image's own symbol frequencies. Slot count follows the
    /// highest index any component names, not the quantization-table
    /// count, since nothing requires the two to line up.
    fn build_optimal_tables(&self, store: &crate::blocks::BlockStore) -> (Vec<HuffmanTable>, Vec<HuffmanTable>) {
        let components = self.settings.components();
        let dc_table_count = components.iter().map(|c| usize::from(c.dc_huffman_table) + 1).max().unwrap_or(1);
        let ac_table_count = components.iter().map(|c| usize::from(c.ac_huffman_table) + 1).max().unwrap_or(1);

        let mut dc_freq = vec![[0u32; 257]; dc_table_count];
        let mut ac_freq = vec![[0u32; 257]; ac_table_count];
        let offsets = self.settings.component_offsets();

        for mcu in 0..self.settings.num_mcus() {
            for (component_index, component) in components.iter().enumerate() {
                let dc_slot = component.dc_huffman_table as usize;
                let ac_slot = component.ac_huffman_table as usize;
                let base = offsets[component_index];
                for b in 0..component.blocks_per_mcu() {
                    let block = store.block(mcu, base + b);
                    let packed = pack_block(block);
                    dc_freq[dc_slot][packed.dc_category as usize] += 1;
                    for record in &packed.ac {
                        ac_freq[ac_slot][record.symbol as usize] += 1;
                    }
                }
            }
        }

        let dc_tables = dc_freq.into_iter().map(HuffmanTable::new_optimized).collect();
        let ac_tables = ac_freq.into_iter().map(HuffmanTable::new_optimized).collect();
        (dc_tables, ac_tables)
    }
}
