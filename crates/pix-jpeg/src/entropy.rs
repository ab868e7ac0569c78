//! Entropy emitter (C7): walks the block store in MCU/component/block
//! order, consulting each component's Huffman tables (C2) and writing
//! through the escaping bit sink (C1).

use pix_core::bytestream::ZByteWriterTrait;

use crate::bitwriter::BitWriter;
use crate::blocks::BlockStore;
use crate::component::TableClass;
use crate::errors::EncodingErrors;
use crate::huffman::HuffmanTable;
use crate::packing::pack_block;
use crate::settings::JpegSettings;

/// Entropy-code every MCU's blocks into `writer` and flush with 1-bit
/// padding. `dc_tables`/`ac_tables` are indexed by
/// [`Component::dc_huffman_table`](crate::component::Component::dc_huffman_table)/
/// `ac_huffman_table`; a component referencing a slot beyond either slice
/// is a [`EncodingErrors::HuffmanTableMissing`].
pub(crate) fn emit_entropy_segment<T: ZByteWriterTrait>(
    writer: &mut BitWriter<T>, settings: &JpegSettings, store: &BlockStore,
    dc_tables: &[HuffmanTable], ac_tables: &[HuffmanTable]
) -> Result<(), EncodingErrors> {
    let offsets = settings.component_offsets();

    for mcu in 0..settings.num_mcus() {
        for (component_index, component) in settings.components().iter().enumerate() {
            let dc_table = dc_tables.get(component.dc_huffman_table as usize).ok_or(
                EncodingErrors::HuffmanTableMissing {
                    component: component_index,
                    class:     TableClass::Dc
                }
            )?;
            let ac_table = ac_tables.get(component.ac_huffman_table as usize).ok_or(
                EncodingErrors::HuffmanTableMissing {
                    component: component_index,
                    class:     TableClass::Ac
                }
            )?;

            let base = offsets[component_index];
            for b in 0..component.blocks_per_mcu() {
                let block = store.block(mcu, base + b);
                let packed = pack_block(block);

                let (code, length) = dc_table.encode(packed.dc_category)?;
                writer.write_bits(code, length)?;
                writer.write_bits(packed.dc_bits, packed.dc_category)?;

                for record in &packed.ac {
                    let (code, length) = ac_table.encode(record.symbol)?;
                    writer.write_bits(code, length)?;
                    writer.write_bits(record.value_bits, record.symbol & 0x0F)?;
                }
            }
        }
    }

    writer.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::constants::{DEFAULT_LUMA_AC_BITS, DEFAULT_LUMA_AC_VALUES, DEFAULT_LUMA_DC_BITS, DEFAULT_LUMA_DC_VALUES};
    use crate::settings::JpegSettingsBuilder;

    #[test]
    fn single_flat_block_emits_without_error() {
        let settings = JpegSettingsBuilder::new(8, 8)
            .set_components(Component::default_single().to_vec())
            .build()
            .unwrap();
        let mut store = BlockStore::new(settings.num_mcus(), settings.mcu_size());
        store.block_mut(0, 0)[0] = 12;

        let dc_table = HuffmanTable::from_bits_and_values(DEFAULT_LUMA_DC_BITS, &DEFAULT_LUMA_DC_VALUES);
        let ac_table = HuffmanTable::from_bits_and_values(DEFAULT_LUMA_AC_BITS, &DEFAULT_LUMA_AC_VALUES);

        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        emit_entropy_segment(&mut writer, &settings, &store, &[dc_table], &[ac_table]).unwrap();
        drop(writer);
        assert!(!out.is_empty());
    }

    #[test]
    fn missing_table_slot_is_reported() {
        let settings = JpegSettingsBuilder::new(8, 8)
            .set_components(Component::default_single().to_vec())
            .build()
            .unwrap();
        let store = BlockStore::new(settings.num_mcus(), settings.mcu_size());

        let mut out = Vec::new();
        let mut writer = BitWriter::new(&mut out);
        let result = emit_entropy_segment(&mut writer, &settings, &store, &[], &[]);
        assert!(matches!(result, Err(EncodingErrors::HuffmanTableMissing { .. })));
    }
}
