//! Adaptive move-to-front codec (format v2, `pxa` signature)
//!
//! A bit-oriented format: symbols are indices into a 256-entry table kept in
//! move-to-front order, so recently emitted bytes get the shortest codes.
//! Backreferences use 5, 10 or 15-bit offsets; a reserved 10-bit offset
//! value escapes into raw byte emission for incompressible runs.
//!
//! The header states the decoded length up front; decoding stops exactly
//! there no matter what else the bitstream holds.

use crate::codec::{BitReader, MAX_SOURCE_BYTES};
use crate::error::{CartridgeError, Result};
use tracing::debug;

/// Decompress an adaptive-codec program payload.
///
/// `data` starts right after the signature: a big-endian u16 decompressed
/// length, a big-endian u16 total compressed length (counting the signature
/// and this header, so payload = total - 8), then the bitstream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 4 {
        return Err(CartridgeError::TruncatedPayload);
    }
    let expected = (u16::from_be_bytes([data[0], data[1]]) as usize).min(MAX_SOURCE_BYTES);
    let total = u16::from_be_bytes([data[2], data[3]]) as usize;
    let payload_len = total.saturating_sub(8).min(data.len() - 4);
    let payload = &data[4..4 + payload_len];
    debug!(
        "Adaptive stream: {} compressed bytes for {} output bytes",
        payload_len, expected
    );

    let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);
    let mut reader = BitReader::new(payload);
    let mut out = Vec::with_capacity(expected);

    while out.len() < expected {
        if reader.read_bit()? == 1 {
            // Table literal: unary bucket, then 4+u index bits.
            let mut unary = 0usize;
            while reader.read_bit()? == 1 {
                unary += 1;
                if unary > 4 {
                    // Smallest index in this bucket is already past the table.
                    return Err(CartridgeError::SymbolIndex(((1usize << unary) - 1) << 4));
                }
            }
            let v = reader.read_bits(4 + unary)? as usize;
            let index = v + (((1usize << unary) - 1) << 4);
            if index >= table.len() {
                return Err(CartridgeError::SymbolIndex(index));
            }
            let symbol = table[index];
            for j in (1..=index).rev() {
                table[j] = table[j - 1];
            }
            table[0] = symbol;
            out.push(symbol);
        } else {
            let width = if reader.read_bit()? == 1 {
                if reader.read_bit()? == 1 {
                    5
                } else {
                    10
                }
            } else {
                15
            };
            let offset = reader.read_bits(width)? as usize + 1;

            if width == 10 && offset == 1 {
                // Raw mode: verbatim bytes until an eight-bit zero.
                loop {
                    let byte = reader.read_bits(8)? as u8;
                    if byte == 0 {
                        break;
                    }
                    out.push(byte);
                }
            } else {
                let mut length = 3usize;
                loop {
                    let part = reader.read_bits(3)? as usize;
                    length += part;
                    if part != 7 {
                        break;
                    }
                }
                if offset > out.len() {
                    return Err(CartridgeError::DecodeOverrun {
                        offset,
                        produced: out.len(),
                    });
                }
                // Same overlap rule as the legacy codec: one byte at a time.
                for _ in 0..length {
                    let byte = out[out.len() - offset];
                    out.push(byte);
                }
            }
        }
    }

    // A raw run or backreference may overshoot the stated length.
    out.truncate(expected);
    Ok(out)
}
