//! Legacy lookup-table codec (format v1, `:c:` signature)
//!
//! The stream is a sequence of single-byte symbol lookups into a fixed
//! 59-entry alphabet, escaped literals for everything else, and two-byte
//! LZ77-style backreferences. The header states how many compressed bytes
//! to scan; output length is whatever those bytes produce.

use crate::codec::MAX_SOURCE_BYTES;
use crate::error::{CartridgeError, Result};
use tracing::debug;

/// The 59 most frequent source symbols. Stream bytes 0x01..=0x3b index this
/// table one-based; everything else is escaped or a backreference.
const ALPHABET: &[u8; 59] = b"\n 0123456789abcdefghijklmnopqrstuvwxyz!#%(){}[]<>+=/*:;.,~_";

/// Decompress a legacy program payload.
///
/// `data` starts right after the signature: a big-endian u16 compressed
/// length, two reserved bytes, then the compressed stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 4 {
        return Err(CartridgeError::TruncatedPayload);
    }
    let stated = u16::from_be_bytes([data[0], data[1]]) as usize;
    let length = stated.min(MAX_SOURCE_BYTES);
    let payload = &data[4..];
    debug!("Legacy stream: {} compressed bytes", length);

    let mut out = Vec::new();
    let mut i = 0;
    while i < length {
        let byte = *payload.get(i).ok_or(CartridgeError::TruncatedPayload)?;
        if byte == 0x00 {
            // Literal escape: the next byte verbatim.
            let literal = *payload.get(i + 1).ok_or(CartridgeError::TruncatedPayload)?;
            out.push(literal);
            i += 2;
        } else if byte <= 0x3b {
            out.push(ALPHABET[(byte - 1) as usize]);
            i += 1;
        } else {
            let n = *payload.get(i + 1).ok_or(CartridgeError::TruncatedPayload)?;
            let offset = (((byte - 0x3c) as usize) << 4) | (n & 0x0f) as usize;
            let count = ((n >> 4) as usize) + 2;
            if offset == 0 || offset > out.len() {
                return Err(CartridgeError::DecodeOverrun {
                    offset,
                    produced: out.len(),
                });
            }
            // Source and destination may overlap when offset < count, so the
            // copy has to proceed one byte at a time.
            for _ in 0..count {
                let byte = out[out.len() - offset];
                out.push(byte);
            }
            i += 2;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_header(payload: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_alphabet_shape() {
        assert_eq!(ALPHABET.len(), 59);
        assert_eq!(ALPHABET[0], b'\n');
        assert_eq!(ALPHABET[1], b' ');
        assert_eq!(ALPHABET[12], b'a');
        assert_eq!(ALPHABET[58], b'_');
    }

    #[test]
    fn test_first_two_symbols() {
        let out = decompress(&with_header(&[0x01, 0x02])).unwrap();
        assert_eq!(out, b"\n ");
    }

    #[test]
    fn test_literal_escape() {
        let out = decompress(&with_header(&[0x00, 0xff, 0x00, 0x41])).unwrap();
        assert_eq!(out, &[0xff, 0x41]);
    }

    #[test]
    fn test_backreference_repeats_output() {
        // "a", "b", then offset=2 length=2.
        let out = decompress(&with_header(&[0x0d, 0x0e, 0x3c, 0x02])).unwrap();
        assert_eq!(out, b"abab");
    }

    #[test]
    fn test_overlapping_backreference() {
        // "a", then offset=1 length=5: each copied byte reads one just written.
        let out = decompress(&with_header(&[0x0d, 0x3c, 0x31])).unwrap();
        assert_eq!(out, b"aaaaaa");
    }

    #[test]
    fn test_backreference_before_any_output() {
        let result = decompress(&with_header(&[0x3c, 0x02]));
        assert!(matches!(
            result,
            Err(CartridgeError::DecodeOverrun {
                offset: 2,
                produced: 0
            })
        ));
    }

    #[test]
    fn test_zero_offset_rejected() {
        // offset=0 would copy the byte being written.
        let result = decompress(&with_header(&[0x01, 0x3c, 0x20]));
        assert!(matches!(
            result,
            Err(CartridgeError::DecodeOverrun {
                offset: 0,
                produced: 1
            })
        ));
    }

    #[test]
    fn test_truncated_escape_pair() {
        let mut data = with_header(&[0x00]);
        data[1] = 2; // claim two compressed bytes, deliver one
        assert!(matches!(
            decompress(&data),
            Err(CartridgeError::TruncatedPayload)
        ));
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            decompress(&[0x00, 0x01]),
            Err(CartridgeError::TruncatedPayload)
        ));
    }

    #[test]
    fn test_stated_length_is_capped() {
        // Stated length far beyond the cap; stream ends after two symbols.
        let mut data = vec![0xff, 0xff, 0x00, 0x00, 0x01, 0x02];
        let result = decompress(&data);
        assert!(matches!(result, Err(CartridgeError::TruncatedPayload)));

        // The same stream with an honest length decodes fine.
        data[0] = 0;
        data[1] = 2;
        assert_eq!(decompress(&data).unwrap(), b"\n ");
    }

    #[test]
    fn test_empty_stream() {
        assert_eq!(decompress(&with_header(&[])).unwrap(), b"");
    }
}
