//! Steganographic byte extraction from carrier images
//!
//! Binary cartridges ship as ordinary-looking 160x205 screenshots. Each
//! RGBA pixel hides one payload byte in the two low bits of its four
//! channels, so the full image carries 32,800 bytes: the 0x4300-byte raw
//! cartridge region, a four-byte codec signature, and the compressed
//! program source.
//!
//! This module only turns pixels into bytes. Container parsing lives behind
//! the `png` feature; any RGBA producer works here.

use crate::error::{CartridgeError, Result};

pub const CARRIER_WIDTH: u32 = 160;
pub const CARRIER_HEIGHT: u32 = 205;

/// Payload bytes in a full carrier, one per pixel.
pub const CARRIER_BYTES: usize = (CARRIER_WIDTH * CARRIER_HEIGHT) as usize;

const BYTES_PER_PIXEL: usize = 4;

/// Reassemble one payload byte from a pixel's channel low bits.
///
/// Red carries bits 0..2, green 2..4, blue 4..6 and alpha 6..8.
pub fn assemble_byte(r: u8, g: u8, b: u8, a: u8) -> u8 {
    (r & 3) | ((g & 3) << 2) | ((b & 3) << 4) | ((a & 3) << 6)
}

/// Extract the hidden byte stream from an RGBA carrier buffer.
///
/// The buffer must describe exactly a 160x205 image; anything else is a
/// structural error, not a best-effort decode.
pub fn extract(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    if width != CARRIER_WIDTH || height != CARRIER_HEIGHT {
        return Err(CartridgeError::CarrierDimensions {
            width,
            height,
            expected_width: CARRIER_WIDTH,
            expected_height: CARRIER_HEIGHT,
        });
    }

    let expected = CARRIER_BYTES * BYTES_PER_PIXEL;
    if rgba.len() < expected {
        return Err(CartridgeError::CarrierTooSmall {
            expected,
            found: rgba.len(),
        });
    }

    let mut bytes = Vec::with_capacity(CARRIER_BYTES);
    for pixel in rgba[..expected].chunks_exact(BYTES_PER_PIXEL) {
        bytes.push(assemble_byte(pixel[0], pixel[1], pixel[2], pixel[3]));
    }
    Ok(bytes)
}
