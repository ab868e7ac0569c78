//! DC differential prediction and AC run-length/category packing (C6).
//!
//! Two independent passes over the same [`BlockStore`](crate::blocks::BlockStore):
//! [`apply_dc_deltas`] mutates every block's DC slot in place (the "delta
//! phase" of the block store's lifecycle), then [`pack_block`] reads a
//! (now delta-coded) block and produces the symbol stream the entropy
//! emitter (C7) feeds through the Huffman tables.

use crate::bitwriter::category_and_bits;
use crate::blocks::{Block, BlockStore};
use crate::settings::JpegSettings;

/// One AC run/category record: `symbol` is the `(run << 4) | category`
/// byte (or the reserved ZRL/EOB symbols), `value_bits` the low
/// `symbol & 0xF` bits of the coefficient. `symbol & 0xF` doubling as the
/// value-bit count holds for ZRL and EOB too, since both carry category 0.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct AcRecord {
    pub(crate) symbol: u8,
    pub(crate) value_bits: u16
}

/// Zero-run-length marker: consumes 16 zero AC coefficients, carries no
/// value bits.
pub(crate) const ZRL: u8 = 0xF0;
/// End-of-block marker: the remaining AC coefficients (if any) are zero.
pub(crate) const EOB: u8 = 0x00;

/// A fully packed block: the DC record plus the AC record sequence.
pub(crate) struct PackedBlock {
    pub(crate) dc_category: u8,
    pub(crate) dc_bits: u16,
    pub(crate) ac: Vec<AcRecord>
}

/// Replace every block's DC slot with its difference from the previous
/// block of the same component, walking MCUs in raster order and, within
/// an MCU, components in settings order and blocks in row-major order.
/// Each component's predictor starts at 0 and is never reset.
pub(crate) fn apply_dc_deltas(store: &mut BlockStore, settings: &JpegSettings) {
    let mut predictors = vec![0i32; settings.components().len()];
    let offsets = settings.component_offsets();

    for mcu in 0..settings.num_mcus() {
        for (component_index, component) in settings.components().iter().enumerate() {
            let base = offsets[component_index];
            for b in 0..component.blocks_per_mcu() {
                let block = store.block_mut(mcu, base + b);
                let original_dc = block[0];
                block[0] = original_dc - predictors[component_index];
                predictors[component_index] = original_dc;
            }
        }
    }
}

/// Category/value-bits of a DC delta, reusing the shared SSSS encoding.
#[inline]
fn dc_record(delta: i32) -> (u8, u16) {
    category_and_bits(delta as i16)
}

/// Pack the 63 AC coefficients of a (zig-zag ordered) block into run/
/// category records, splitting runs of 16+ zeros into ZRL markers and
/// appending a trailing EOB unless the last coefficient is nonzero.
fn pack_ac(block: &Block) -> Vec<AcRecord> {
    let mut last_nonzero = 0usize;
    for (k, &value) in block.iter().enumerate().skip(1) {
        if value != 0 {
            last_nonzero = k;
        }
    }

    let mut records = Vec::new();
    let mut zero_run = 0u8;
    for &value in &block[1..=last_nonzero] {
        if value == 0 {
            zero_run += 1;
            if zero_run == 16 {
                records.push(AcRecord { symbol: ZRL, value_bits: 0 });
                zero_run = 0;
            }
            continue;
        }
        let (category, bits) = category_and_bits(value as i16);
        records.push(AcRecord { symbol: (zero_run << 4) | category, value_bits: bits });
        zero_run = 0;
    }

    if last_nonzero < 63 {
        records.push(AcRecord { symbol: EOB, value_bits: 0 });
    }

    records
}

/// Pack one delta-coded block into its full entropy-ready record set.
pub(crate) fn pack_block(block: &Block) -> PackedBlock {
    let (dc_category, dc_bits) = dc_record(block[0]);
    PackedBlock { dc_category, dc_bits, ac: pack_ac(block) }
}
