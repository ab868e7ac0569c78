//! Encoder settings and the geometry derived from them once at construction.

use pix_core::log::debug;

use crate::component::{Component, DensityUnit, HuffmanMode};
use crate::constants::{DEFAULT_CHROMA_QTABLE, DEFAULT_LUMA_QTABLE};
use crate::errors::EncodingErrors;
use crate::huffman::HuffmanTable;

/// Caller-supplied Huffman tables for [`HuffmanMode::Provided`], one pair
/// per quantization-table-sized group of components.
#[derive(Clone, Default)]
pub struct HuffmanTables {
    pub dc: Vec<HuffmanTable>,
    pub ac: Vec<HuffmanTable>
}

/// Validated settings plus the geometry derived from them.
///
/// Immutable after construction: every field a downstream component reads
/// is either a direct copy of a builder argument or computed once in
/// [`JpegSettings::build`].
#[derive(Clone)]
pub struct JpegSettings {
    width: usize,
    height: usize,
    components: Vec<Component>,
    quality: u8,
    density_unit: DensityUnit,
    density: (u16, u16),
    huffman_mode: HuffmanMode,
    provided_tables: Option<HuffmanTables>,
    version: (u8, u8),
    quantization_tables: Vec<[u16; 64]>,
    num_threads: Option<usize>,
    // derived
    h_max: u8,
    v_max: u8,
    mcu_size: usize,
    component_offsets: Vec<usize>,
    mcus_wide: usize,
    mcus_high: usize
}

/// Fluent builder for [`JpegSettings`], mirroring the crate family's
/// `EncoderOptions` convention: a constructor for the mandatory geometry,
/// then chained `set_*` calls for everything else, finished off by
/// [`JpegSettingsBuilder::build`].
#[derive(Clone)]
pub struct JpegSettingsBuilder {
    width: usize,
    height: usize,
    components: Option<Vec<Component>>,
    quality: u8,
    density_unit: DensityUnit,
    density: (u16, u16),
    huffman_mode: HuffmanMode,
    provided_tables: Option<HuffmanTables>,
    version: (u8, u8),
    quantization_tables: Option<Vec<[u16; 64]>>,
    num_threads: Option<usize>
}

impl JpegSettingsBuilder {
    /// Start a new builder for a `width` x `height` image. Defaults to the
    /// 3-component 4:2:0-capable layout at quality 75, matching common
    /// JFIF encoder defaults.
    pub fn new(width: usize, height: usize) -> JpegSettingsBuilder {
        JpegSettingsBuilder {
            width,
            height,
            components: None,
            quality: 75,
            density_unit: DensityUnit::Aspect,
            density: (1, 1),
            huffman_mode: HuffmanMode::Default,
            provided_tables: None,
            version: (1, 1),
            quantization_tables: None,
            num_threads: None
        }
    }

    /// Override the component list. Must be length 1 or 3.
    pub fn set_components(mut self, components: Vec<Component>) -> Self {
        self.components = Some(components);
        self
    }

    /// Set the IJG-style quality factor, `1..=100`.
    pub fn set_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    pub fn set_density_unit(mut self, unit: DensityUnit) -> Self {
        self.density_unit = unit;
        self
    }

    pub fn set_density(mut self, x: u16, y: u16) -> Self {
        self.density = (x, y);
        self
    }

    pub fn set_huffman_mode(mut self, mode: HuffmanMode) -> Self {
        self.huffman_mode = mode;
        self
    }

    /// Supply the DC/AC table sets used when the Huffman mode is
    /// [`HuffmanMode::Provided`].
    pub fn set_huffman_tables(mut self, tables: HuffmanTables) -> Self {
        self.provided_tables = Some(tables);
        self
    }

    pub fn set_version(mut self, major: u8, minor: u8) -> Self {
        self.version = (major, minor);
        self
    }

    /// Override the raw (unscaled) quantization tables. Defaults to the
    /// Annex K.1 luminance/chrominance pair.
    pub fn set_quantization_tables(mut self, tables: Vec<[u16; 64]>) -> Self {
        self.quantization_tables = Some(tables);
        self
    }

    /// Cap the number of worker threads the `threads` feature's data-parallel
    /// MCU pipeline may use. Ignored (informational only) when that feature
    /// is disabled; `None` (the default) lets rayon use its global pool.
    pub fn set_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    /// Validate and derive geometry, producing an immutable [`JpegSettings`].
    pub fn build(self) -> Result<JpegSettings, EncodingErrors> {
        if self.width == 0 || self.height == 0 {
            return Err(EncodingErrors::ConfigurationError(format!(
                "image dimensions must be non-zero, got {}x{}",
                self.width,
                self.height
            )));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(EncodingErrors::ConfigurationError(format!(
                "quality must be in 1..=100, got {}",
                self.quality
            )));
        }

        let components = self.components.unwrap_or_else(|| {
            Component::default_triple().to_vec()
        });
        if components.len() != 1 && components.len() != 3 {
            return Err(EncodingErrors::ConfigurationError(format!(
                "component count must be 1 or 3, got {}",
                components.len()
            )));
        }

        let quantization_tables = self.quantization_tables.unwrap_or_else(|| {
            if components.len() == 1 {
                vec![DEFAULT_LUMA_QTABLE]
            } else {
                vec![DEFAULT_LUMA_QTABLE, DEFAULT_CHROMA_QTABLE]
            }
        });

        if self.huffman_mode == HuffmanMode::Provided {
            let tables = self.provided_tables.as_ref().ok_or_else(|| {
                EncodingErrors::ConfigurationError(String::from(
                    "HuffmanMode::Provided requires set_huffman_tables"
                ))
            })?;
            for component in &components {
                if tables.dc.get(component.dc_huffman_table as usize).is_none() {
                    return Err(EncodingErrors::ConfigurationError(format!(
                        "missing provided DC table at index {}",
                        component.dc_huffman_table
                    )));
                }
                if tables.ac.get(component.ac_huffman_table as usize).is_none() {
                    return Err(EncodingErrors::ConfigurationError(format!(
                        "missing provided AC table at index {}",
                        component.ac_huffman_table
                    )));
                }
            }
        }

        let h_max = components.iter().map(|c| c.horizontal_sampling).max().unwrap_or(1);
        let v_max = components.iter().map(|c| c.vertical_sampling).max().unwrap_or(1);

        let mut component_offsets = Vec::with_capacity(components.len());
        let mut running = 0usize;
        for component in &components {
            component_offsets.push(running);
            running += component.blocks_per_mcu();
        }
        let mcu_size = running;

        let mcu_pixels_w = (h_max as usize) * 8;
        let mcu_pixels_h = (v_max as usize) * 8;
        let mcus_wide = (self.width + mcu_pixels_w - 1) / mcu_pixels_w;
        let mcus_high = (self.height + mcu_pixels_h - 1) / mcu_pixels_h;

        let scaled_tables = quantization_tables
            .iter()
            .map(|table| scale_quantization_table(table, self.quality))
            .collect();

        debug!(
            "derived geometry: {mcus_wide}x{mcus_high} MCUs, mcu_size={mcu_size}, Hmax={h_max} Vmax={v_max}"
        );

        Ok(JpegSettings {
            width: self.width,
            height: self.height,
            components,
            quality: self.quality,
            density_unit: self.density_unit,
            density: self.density,
            huffman_mode: self.huffman_mode,
            provided_tables: self.provided_tables,
            version: self.version,
            quantization_tables: scaled_tables,
            num_threads: self.num_threads,
            h_max,
            v_max,
            mcu_size,
            component_offsets,
            mcus_wide,
            mcus_high
        })
    }
}

/// IJG quality scaling (libjpeg `jpeg_quality_scaling` + `jpeg_add_quant_table`):
/// `s = 5000/q` for `q <= 50`, else `s = 200 - 2*q`; each raw entry becomes
/// `clamp(round(raw*s/100), 1, 255)`.
fn scale_quantization_table(raw: &[u16; 64], quality: u8) -> [u16; 64] {
    let q = quality.clamp(1, 100) as i64;
    let scale = if q < 50 { 5000 / q } else { 200 - 2 * q };

    let mut out = [0u16; 64];
    for (dst, &src) in out.iter_mut().zip(raw.iter()) {
        let scaled = (i64::from(src) * scale + 50) / 100;
        *dst = scaled.clamp(1, 255) as u16;
    }
    out
}

impl JpegSettings {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn density_unit(&self) -> DensityUnit {
        self.density_unit
    }

    pub fn density(&self) -> (u16, u16) {
        self.density
    }

    pub fn huffman_mode(&self) -> HuffmanMode {
        self.huffman_mode
    }

    pub fn provided_tables(&self) -> Option<&HuffmanTables> {
        self.provided_tables.as_ref()
    }

    pub fn version(&self) -> (u8, u8) {
        self.version
    }

    /// Scaled quantization tables, natural (row-major) order, indexed the
    /// same way [`Component::quantization_table`] indexes into them.
    pub fn quantization_tables(&self) -> &[[u16; 64]] {
        &self.quantization_tables
    }

    /// The caller's requested worker-thread cap, if any (see
    /// [`JpegSettingsBuilder::set_num_threads`]).
    pub(crate) fn num_threads(&self) -> Option<usize> {
        self.num_threads
    }

    pub(crate) fn h_max(&self) -> u8 {
        self.h_max
    }

    pub(crate) fn v_max(&self) -> u8 {
        self.v_max
    }

    pub(crate) fn mcu_size(&self) -> usize {
        self.mcu_size
    }

    pub(crate) fn component_offsets(&self) -> &[usize] {
        &self.component_offsets
    }

    pub(crate) fn mcus_wide(&self) -> usize {
        self.mcus_wide
    }

    pub(crate) fn mcus_high(&self) -> usize {
        self.mcus_high
    }

    pub(crate) fn num_mcus(&self) -> usize {
        self.mcus_wide * self.mcus_high
    }
}
