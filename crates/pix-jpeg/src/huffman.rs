//! Canonical Huffman code tables: explicit construction from (BITS, HUFFVAL)
//! per Annex C, and optimal construction from symbol frequencies per
//! Annex K.1-K.4, both length-limited to 16 bits.

use pix_core::log::debug;

use crate::errors::EncodingErrors;

/// A reserved symbol value used only during optimal table construction to
/// guarantee the longest assigned code is never all-ones, which JPEG
/// forbids as a code word. It never appears in an emitted HUFFVAL.
const SENTINEL_SYMBOL: usize = 256;

/// A canonical Huffman code table for one DC or AC table slot.
///
/// Holds both views needed downstream: `codes` for direct symbol -> (code,
/// length) lookup during entropy coding, and `bits`/`huffval` for DHT
/// segment emission.
#[derive(Clone)]
pub struct HuffmanTable {
    /// code, length (0 when the symbol is unused)
    codes: [(u16, u8); 256],
    /// BITS[L-1] = number of codes of length L, L in 1..=16
    bits: [u8; 16],
    /// symbols in the order their codes were assigned (length ascending,
    /// then insertion order within a length)
    huffval: Vec<u8>
}

impl HuffmanTable {
    /// Build from an explicit (BITS, HUFFVAL) pair, the Annex C construction
    /// used for both the JFIF default tables and caller-provided ones.
    pub fn from_bits_and_values(bits: [u8; 16], huffval: &[u8]) -> HuffmanTable {
        let mut codes = [(0u16, 0u8); 256];

        let mut code = 0u32;
        let mut k = 0usize;
        for (length_index, &count) in bits.iter().enumerate() {
            let length = (length_index + 1) as u8;
            for _ in 0..count {
                let symbol = huffval[k];
                codes[symbol as usize] = (code as u16, length);
                code += 1;
                k += 1;
            }
            code <<= 1;
        }

        HuffmanTable { codes, bits, huffval: huffval.to_vec() }
    }

    /// Build an optimal code from a symbol -> frequency histogram
    /// (Annex K.1-K.4). `freq[256]` is reserved for the sentinel and must
    /// be zero on input; symbols `0..=255` carry the observed counts.
    ///
    /// Every nonzero-frequency symbol receives a code of length `1..=16`.
    pub fn new_optimized(mut freq: [u32; 257]) -> HuffmanTable {
        // Annex K.1: guarantee the sentinel participates, and that it ends
        // up as the *last* symbol merged so it gets the longest code.
        freq[SENTINEL_SYMBOL] = 1;

        let mut codesize = [0u32; 257];
        let mut others: [i32; 257] = [-1; 257];

        loop {
            // Find the two least-frequent nonzero-count symbols.
            let mut v1: i32 = -1;
            let mut v2: i32 = -1;

            for i in 0..257 {
                if freq[i] == 0 {
                    continue;
                }
                if v1 == -1 || freq[i] <= freq[v1 as usize] {
                    v2 = v1;
                    v1 = i as i32;
                } else if v2 == -1 || freq[i] <= freq[v2 as usize] {
                    v2 = i as i32;
                }
            }

            if v2 == -1 {
                // only the sentinel (or nothing) left: done
                break;
            }

            freq[v1 as usize] += freq[v2 as usize];
            freq[v2 as usize] = 0;

            let mut i = v1;
            loop {
                codesize[i as usize] += 1;
                if others[i as usize] == -1 {
                    break;
                }
                i = others[i as usize];
            }
            others[i as usize] = v2;

            let mut i = v2;
            loop {
                codesize[i as usize] += 1;
                if others[i as usize] == -1 {
                    break;
                }
                i = others[i as usize];
            }
        }

        // Annex K.2: histogram code lengths, lengths can exceed 16 here.
        let mut bits_long = [0u32; 33];
        for &size in &codesize {
            if size > 0 {
                bits_long[size as usize] += 1;
            }
        }

        // Annex K.3: length-limit to 16 by redistributing from the top.
        let mut i = 32usize;
        while i > 16 {
            while bits_long[i] > 0 {
                let mut j = i - 2;
                while bits_long[j] == 0 {
                    j -= 1;
                }
                bits_long[i] -= 2;
                bits_long[i - 1] += 1;
                bits_long[j + 1] += 2;
                bits_long[j] -= 1;
            }
            i -= 1;
        }

        // Annex K.3 tail: remove the sentinel's slot from the highest
        // length that still has a count, and strip a trailing empty slot.
        let mut i = 16usize;
        while i > 0 && bits_long[i] == 0 {
            i -= 1;
        }
        bits_long[i] -= 1;

        let mut bits = [0u8; 16];
        for (dst, &src) in bits.iter_mut().zip(bits_long[1..=16].iter()) {
            *dst = src as u8;
        }

        // Annex K.4: order symbols by (codesize ascending, symbol ascending).
        // codesize still holds pre-limiting depths (up to 32); the relative
        // order they impose on HUFFVAL is what the length-limited `bits`
        // histogram above slices into final code lengths, so this must
        // range over 1..=32, not 1..=16. The sentinel's codesize is never
        // equal to any length a real symbol (0..=255) can reach after this
        // sort places it, since HUFFVAL is built only from symbols < 256.
        let mut huffval = Vec::new();
        for length in 1..=32u32 {
            for symbol in 0..256usize {
                if codesize[symbol] == length {
                    huffval.push(symbol as u8);
                }
            }
        }

        let triggered = bits_long[17..=32].iter().any(|&c| c > 0);
        debug!(
            "optimal huffman table: {} symbols, length-limited={}",
            huffval.len(),
            triggered
        );

        HuffmanTable::from_bits_and_values(bits, &huffval)
    }

    /// Encode `symbol` by writing its canonical code through `write`.
    /// `write` receives `(code, length)`; callers pass this straight to a
    /// bit sink's `write`.
    pub fn encode(&self, symbol: u8) -> Result<(u16, u8), EncodingErrors> {
        let (code, length) = self.codes[symbol as usize];
        if length == 0 {
            return Err(EncodingErrors::UnknownSymbol(i32::from(symbol)));
        }
        Ok((code, length))
    }

    /// BITS[L-1], the DHT segment's per-length code counts.
    pub fn length_counts(&self) -> &[u8; 16] {
        &self.bits
    }

    /// HUFFVAL, the DHT segment's symbol list in assignment order.
    pub fn ordered_symbols(&self) -> &[u8] {
        &self.huffval
    }
}
