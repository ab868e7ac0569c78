//! Forward 8x8 DCT-II, quantization, and zig-zag reordering (C5).
//!
//! A small scalar numeric kernel operating on fixed-size arrays with no
//! I/O concerns, run forward to produce quantized, zig-zag ordered
//! coefficients rather than reconstructed samples.

use std::f64::consts::PI;
use std::sync::OnceLock;

use crate::constants::ZIGZAG;

/// `COS[x][u] = cos(pi/8 * (x + 0.5) * u)`, the 1-D DCT-II basis shared by
/// the row and column passes.
fn cos_table() -> &'static [[f64; 8]; 8] {
    static TABLE: OnceLock<[[f64; 8]; 8]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [[0.0; 8]; 8];
        for (x, row) in table.iter_mut().enumerate() {
            for (u, cell) in row.iter_mut().enumerate() {
                *cell = (PI / 8.0 * (x as f64 + 0.5) * u as f64).cos();
            }
        }
        table
    })
}

/// Orthonormal scale factor `alpha(u)`: `sqrt(1/8)` for the DC term,
/// `sqrt(2/8)` for every AC term, so that the 2-D transform (row pass then
/// column pass) is itself orthonormal.
#[inline]
fn alpha(u: usize) -> f64 {
    if u == 0 {
        (1.0_f64 / 8.0).sqrt()
    } else {
        (2.0_f64 / 8.0).sqrt()
    }
}

/// One 1-D, 8-point forward DCT-II.
fn dct_1d(input: &[f64; 8]) -> [f64; 8] {
    let cos = cos_table();
    let mut out = [0.0; 8];
    for (u, slot) in out.iter_mut().enumerate() {
        let mut sum = 0.0;
        for (x, &value) in input.iter().enumerate() {
            sum += value * cos[x][u];
        }
        *slot = alpha(u) * sum;
    }
    out
}

/// Separable 2-D forward DCT-II: rows then columns. `samples` is an 8x8
/// block of centered (`-128..=127`) values in row-major (natural) order;
/// the result is likewise natural order.
fn forward_dct_2d(samples: &[i16; 64]) -> [f64; 64] {
    let mut rows = [0.0; 64];
    for row in 0..8 {
        let mut line = [0.0; 8];
        for col in 0..8 {
            line[col] = f64::from(samples[row * 8 + col]);
        }
        let transformed = dct_1d(&line);
        rows[row * 8..row * 8 + 8].copy_from_slice(&transformed);
    }

    let mut out = [0.0; 64];
    for col in 0..8 {
        let mut line = [0.0; 8];
        for row in 0..8 {
            line[row] = rows[row * 8 + col];
        }
        let transformed = dct_1d(&line);
        for row in 0..8 {
            out[row * 8 + col] = transformed[row];
        }
    }
    out
}

/// Round-half-away-from-zero, matching the JPEG standard's quantization
/// rounding rule (Rust's `f64::round` already rounds halves away from
/// zero, so this is a thin, self-documenting wrapper).
#[inline]
fn round_half_away_from_zero(value: f64) -> i32 {
    value.round() as i32
}

/// Forward-transform, quantize, and zig-zag reorder one 8x8 block.
///
/// `qtable` is in natural (row-major) order, indexed the same way as the
/// transform output; the returned block is in zig-zag order with index 0
/// holding the DC coefficient.
pub(crate) fn forward_dct_quantize(samples: &[i16; 64], qtable: &[u16; 64]) -> [i32; 64] {
    let coefficients = forward_dct_2d(samples);
    let mut out = [0i32; 64];
    for (zigzag_pos, &natural_pos) in ZIGZAG.iter().enumerate() {
        let natural_pos = natural_pos as usize;
        let quant = round_half_away_from_zero(coefficients[natural_pos] / f64::from(qtable[natural_pos]));
        out[zigzag_pos] = quant;
    }
    out
}
