//! Compressed program codecs
//!
//! Binary cartridges store program source compressed behind a four-byte
//! signature at the end of the raw region. Two wire formats exist:
//!
//! - `:c:\0` — the original lookup-table format ([`legacy`])
//! - `\0pxa` — the adaptive move-to-front bitstream ([`pxa`])
//!
//! Both decode to the raw source bytes; [`decode`] picks the codec from the
//! signature. Decoding is a pure transform of the input slice, no state
//! survives a call.

pub mod legacy;
pub mod pxa;

use crate::error::{CartridgeError, Result};
use crate::memory::RAW_CARTRIDGE_SIZE;
use tracing::debug;

/// Signature of the legacy lookup-table format.
pub const LEGACY_MAGIC: [u8; 4] = [b':', b'c', b':', 0];

/// Signature of the adaptive move-to-front format.
pub const PXA_MAGIC: [u8; 4] = [0, b'p', b'x', b'a'];

pub const MAGIC_BYTES: usize = 4;

/// Console code-size limit: 32769 bytes of cart content minus the raw region.
/// An empirical constant of the original format, not derived.
pub const MAX_SOURCE_BYTES: usize = 32769 - RAW_CARTRIDGE_SIZE;

/// Which program codec a signature selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Legacy,
    Pxa,
}

impl CodecKind {
    pub fn from_magic(magic: [u8; 4]) -> Option<Self> {
        match magic {
            LEGACY_MAGIC => Some(CodecKind::Legacy),
            PXA_MAGIC => Some(CodecKind::Pxa),
            _ => None,
        }
    }
}

/// Decode a compressed program blob, signature first.
///
/// `data` starts at the four-byte signature; each codec then consumes its
/// own four-byte header and payload.
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < MAGIC_BYTES {
        return Err(CartridgeError::TruncatedPayload);
    }
    let magic = [data[0], data[1], data[2], data[3]];
    match CodecKind::from_magic(magic) {
        Some(CodecKind::Legacy) => {
            debug!("Matched legacy codec signature");
            legacy::decompress(&data[MAGIC_BYTES..])
        }
        Some(CodecKind::Pxa) => {
            debug!("Matched adaptive codec signature");
            pxa::decompress(&data[MAGIC_BYTES..])
        }
        None => Err(CartridgeError::MagicMismatch { found: magic }),
    }
}

/// Least-significant-bit-first reader over a byte slice.
///
/// The adaptive format packs fields starting at bit 0 of each byte;
/// multi-bit reads accumulate low bit first.
pub(crate) struct BitReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        BitReader { bytes, position: 0 }
    }

    pub(crate) fn read_bit(&mut self) -> Result<u32> {
        let byte = self.position / 8;
        if byte >= self.bytes.len() {
            return Err(CartridgeError::TruncatedPayload);
        }
        let bit = (self.bytes[byte] >> (self.position % 8)) & 1;
        self.position += 1;
        Ok(bit as u32)
    }

    pub(crate) fn read_bits(&mut self, count: usize) -> Result<u32> {
        debug_assert!(count <= 32);
        let mut value = 0u32;
        for i in 0..count {
            value |= self.read_bit()? << i;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_dispatch() {
        assert_eq!(CodecKind::from_magic(LEGACY_MAGIC), Some(CodecKind::Legacy));
        assert_eq!(CodecKind::from_magic(PXA_MAGIC), Some(CodecKind::Pxa));
        assert_eq!(CodecKind::from_magic(*b"RIFF"), None);
    }

    #[test]
    fn test_decode_rejects_unknown_signature() {
        let result = decode(b"BAD!rest of payload");
        assert!(matches!(
            result,
            Err(CartridgeError::MagicMismatch { found }) if &found == b"BAD!"
        ));
    }

    #[test]
    fn test_decode_rejects_short_input() {
        assert!(matches!(
            decode(&[b':', b'c']),
            Err(CartridgeError::TruncatedPayload)
        ));
    }

    #[test]
    fn test_bit_reader_lsb_first() {
        // 0xd2 = 1101_0010: bits come out 0,1,0,0,1,0,1,1.
        let mut reader = BitReader::new(&[0xd2]);
        assert_eq!(reader.read_bits(3).unwrap(), 0b010);
        assert_eq!(reader.read_bits(5).unwrap(), 0b11010);
    }

    #[test]
    fn test_bit_reader_crosses_byte_boundary() {
        let mut reader = BitReader::new(&[0b1000_0000, 0b0000_0001]);
        assert_eq!(reader.read_bits(7).unwrap(), 0);
        // Bit 7 of the first byte plus bit 0 of the second.
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
        assert_eq!(reader.read_bits(7).unwrap(), 0);
    }

    #[test]
    fn test_bit_reader_truncation() {
        let mut reader = BitReader::new(&[0xff]);
        assert_eq!(reader.read_bits(8).unwrap(), 0xff);
        assert!(matches!(
            reader.read_bit(),
            Err(CartridgeError::TruncatedPayload)
        ));
    }

    #[test]
    fn test_source_cap_constant() {
        assert_eq!(MAX_SOURCE_BYTES, 15617);
    }
}
