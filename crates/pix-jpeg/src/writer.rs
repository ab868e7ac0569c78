//! JFIF container assembler (C8): SOI, APP0/JFIF, DQT, SOF0, DHT, SOS,
//! and EOI segment writers. Every segment is written through
//! [`BitWriter::write_bytes`], which bypasses the entropy bit sink's
//! marker escaping — header bytes are never stuffed.

use pix_core::bytestream::ZByteWriterTrait;

use crate::bitwriter::BitWriter;
use crate::constants::{APP0, DHT, DQT, EOI, SOF0, SOI, SOS, ZIGZAG};
use crate::errors::EncodingErrors;
use crate::huffman::HuffmanTable;
use crate::settings::JpegSettings;

pub(crate) fn write_soi<T: ZByteWriterTrait>(writer: &mut BitWriter<T>) -> Result<(), EncodingErrors> {
    writer.write_bytes(&[0xFF, SOI])?;
    Ok(())
}

pub(crate) fn write_eoi<T: ZByteWriterTrait>(writer: &mut BitWriter<T>) -> Result<(), EncodingErrors> {
    writer.write_bytes(&[0xFF, EOI])?;
    Ok(())
}

/// APP0/JFIF segment: identifier, version, density, and a zero-sized
/// thumbnail (this encoder never embeds one).
pub(crate) fn write_app0<T: ZByteWriterTrait>(
    writer: &mut BitWriter<T>, settings: &JpegSettings
) -> Result<(), EncodingErrors> {
    let (major, minor) = settings.version();
    let (density_x, density_y) = settings.density();

    let mut segment = Vec::with_capacity(18);
    segment.extend_from_slice(&[0xFF, APP0]);
    segment.extend_from_slice(&16u16.to_be_bytes());
    segment.extend_from_slice(b"JFIF\0");
    segment.push(major);
    segment.push(minor);
    segment.push(settings.density_unit().marker_value());
    segment.extend_from_slice(&density_x.to_be_bytes());
    segment.extend_from_slice(&density_y.to_be_bytes());
    segment.extend_from_slice(&[0, 0]); // thumbnail width, height

    writer.write_bytes(&segment)?;
    Ok(())
}

/// One DQT segment per scaled quantization table, emitted in zig-zag
/// order as the JPEG standard requires (the source material's
/// natural-order emission is a confirmed bug, not reproduced here).
pub(crate) fn write_dqt<T: ZByteWriterTrait>(
    writer: &mut BitWriter<T>, settings: &JpegSettings
) -> Result<(), EncodingErrors> {
    for (table_id, table) in settings.quantization_tables().iter().enumerate() {
        let mut segment = Vec::with_capacity(4 + 1 + 64);
        segment.extend_from_slice(&[0xFF, DQT]);
        segment.extend_from_slice(&67u16.to_be_bytes());
        segment.push(table_id as u8); // precision (0, 8-bit) << 4 | table_id
        for &natural_pos in ZIGZAG.iter() {
            segment.push(table[natural_pos as usize] as u8);
        }
        writer.write_bytes(&segment)?;
    }
    Ok(())
}

/// Baseline SOF0 frame header.
pub(crate) fn write_sof0<T: ZByteWriterTrait>(
    writer: &mut BitWriter<T>, settings: &JpegSettings
) -> Result<(), EncodingErrors> {
    let components = settings.components();
    let length = 8 + 3 * components.len();

    let mut segment = Vec::with_capacity(2 + 2 + length);
    segment.extend_from_slice(&[0xFF, SOF0]);
    segment.extend_from_slice(&(length as u16).to_be_bytes());
    segment.push(8); // precision
    segment.extend_from_slice(&(settings.height() as u16).to_be_bytes());
    segment.extend_from_slice(&(settings.width() as u16).to_be_bytes());
    segment.push(components.len() as u8);
    for (i, component) in components.iter().enumerate() {
        segment.push((i + 1) as u8);
        segment.push((component.horizontal_sampling << 4) | component.vertical_sampling);
        segment.push(component.quantization_table);
    }

    writer.write_bytes(&segment)?;
    Ok(())
}

/// One DHT segment per Huffman table slot.
fn write_dht_tables<T: ZByteWriterTrait>(
    writer: &mut BitWriter<T>, tables: &[HuffmanTable], class: u8
) -> Result<(), EncodingErrors> {
    for (table_id, table) in tables.iter().enumerate() {
        let huffval = table.ordered_symbols();
        let length = 3 + 16 + huffval.len();

        let mut segment = Vec::with_capacity(4 + length - 2);
        segment.extend_from_slice(&[0xFF, DHT]);
        segment.extend_from_slice(&(length as u16).to_be_bytes());
        segment.push((class << 4) | (table_id as u8));
        segment.extend_from_slice(table.length_counts());
        segment.extend_from_slice(huffval);

        writer.write_bytes(&segment)?;
    }
    Ok(())
}

pub(crate) fn write_dht<T: ZByteWriterTrait>(
    writer: &mut BitWriter<T>, dc_tables: &[HuffmanTable], ac_tables: &[HuffmanTable]
) -> Result<(), EncodingErrors> {
    write_dht_tables(writer, dc_tables, 0)?;
    write_dht_tables(writer, ac_tables, 1)?;
    Ok(())
}

/// SOS header: component scan selectors followed by the fixed spectral
/// range (0..63, no successive approximation — this encoder never
/// produces a progressive scan).
pub(crate) fn write_sos<T: ZByteWriterTrait>(
    writer: &mut BitWriter<T>, settings: &JpegSettings
) -> Result<(), EncodingErrors> {
    let components = settings.components();
    let length = 6 + 2 * components.len();

    let mut segment = Vec::with_capacity(2 + 2 + length - 2);
    segment.extend_from_slice(&[0xFF, SOS]);
    segment.extend_from_slice(&(length as u16).to_be_bytes());
    segment.push(components.len() as u8);
    for (i, component) in components.iter().enumerate() {
        segment.push((i + 1) as u8);
        segment.push((component.dc_huffman_table << 4) | component.ac_huffman_table);
    }
    segment.extend_from_slice(&[0x00, 0x3F, 0x00]);

    writer.write_bytes(&segment)?;
    Ok(())
}
