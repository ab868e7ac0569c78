//! Per-MCU pipeline (C4+C5 glue): downsample the whole image into one
//! plane per component, then extract and forward-DCT+quantize each
//! MCU's blocks into the block store.
//!
//! The per-MCU step is pure and writes into a disjoint chunk of the
//! block store, so with the `threads` feature it runs as a `rayon`
//! data-parallel iterator instead of a sequential loop; both paths share
//! the same per-MCU closure and produce byte-identical output.

use crate::blocks::{Block, BlockStore};
use crate::dct::forward_dct_quantize;
use crate::downsample::{downsample_plane, Channel, Plane};
use crate::settings::JpegSettings;

/// Downsample every component's channel to its own plane, padded to a
/// whole number of MCUs.
fn build_planes(pixels: &[u8], settings: &JpegSettings) -> Vec<Plane> {
    let components = settings.components();
    let pixels_per_sample = components.len();
    components
        .iter()
        .enumerate()
        .map(|(index, component)| {
            let channel = if components.len() == 1 {
                Channel::Y
            } else {
                match index {
                    0 => Channel::Y,
                    1 => Channel::Cb,
                    _ => Channel::Cr
                }
            };
            downsample_plane(
                pixels,
                settings.width(),
                settings.height(),
                pixels_per_sample,
                channel,
                component.horizontal_sampling,
                component.vertical_sampling,
                settings.h_max(),
                settings.v_max(),
                settings.mcus_wide(),
                settings.mcus_high()
            )
        })
        .collect()
}

/// Extract and transform every block belonging to one MCU into
/// `mcu_chunk`, a `mcu_size`-long disjoint slice of the block store.
fn compute_mcu_blocks(mcu_index: usize, mcu_chunk: &mut [Block], settings: &JpegSettings, planes: &[Plane]) {
    let mcu_x = mcu_index % settings.mcus_wide();
    let mcu_y = mcu_index / settings.mcus_wide();
    let offsets = settings.component_offsets();

    for (component_index, component) in settings.components().iter().enumerate() {
        let plane = &planes[component_index];
        let qtable = &settings.quantization_tables()[component.quantization_table as usize];
        let (h, v) = (component.horizontal_sampling as usize, component.vertical_sampling as usize);
        let base = offsets[component_index];

        for by in 0..v {
            for bx in 0..h {
                let block_col = mcu_x * h + bx;
                let block_row = mcu_y * v + by;
                let samples = plane.block(block_col, block_row);
                mcu_chunk[base + by * h + bx] = forward_dct_quantize(&samples, qtable);
            }
        }
    }
}

/// Build the full block store for one image: downsample every
/// component, then DCT+quantize every MCU's blocks.
pub(crate) fn build_block_store(pixels: &[u8], settings: &JpegSettings) -> BlockStore {
    let planes = build_planes(pixels, settings);
    let mut store = BlockStore::new(settings.num_mcus(), settings.mcu_size());
    let mcu_size = settings.mcu_size();

    #[cfg(feature = "threads")]
    {
        use rayon::prelude::*;

        let run = || {
            store
                .all_blocks_mut()
                .par_chunks_mut(mcu_size)
                .enumerate()
                .for_each(|(mcu_index, chunk)| compute_mcu_blocks(mcu_index, chunk, settings, &planes));
        };

        // A caller-requested thread cap builds a scoped pool for this call
        // only; the global rayon pool (and everyone else using it) is left
        // untouched.
        match settings.num_threads() {
            Some(num_threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .expect("valid rayon thread pool configuration")
                .install(run),
            None => run()
        }
    }
    #[cfg(not(feature = "threads"))]
    {
        for (mcu_index, chunk) in store.all_blocks_mut().chunks_mut(mcu_size).enumerate() {
            compute_mcu_blocks(mcu_index, chunk, settings, &planes);
        }
    }

    store
}
