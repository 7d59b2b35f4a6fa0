//! Error types shared by every decode path

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartridgeError {
    #[error("Unknown cartridge signature: {found:02x?}")]
    MagicMismatch { found: [u8; 4] },

    #[error("Invalid {section} line: expected {expected} hex digits, found {found}")]
    SectionLineLength {
        section: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Invalid hex digit {digit:?} in {section} section")]
    InvalidHexDigit { digit: char, section: &'static str },

    #[error("Malformed music line: {0:?} (expected two flag digits, a space, and eight channel digits)")]
    MalformedMusicLine(String),

    #[error("Too many {section} rows: region holds {capacity}")]
    SectionOverflow {
        section: &'static str,
        capacity: usize,
    },

    #[error("Carrier image is {width}x{height}, expected {expected_width}x{expected_height}")]
    CarrierDimensions {
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },

    #[error("Carrier pixel buffer too small: {found} bytes, expected {expected}")]
    CarrierTooSmall { expected: usize, found: usize },

    #[error("Back-reference past start of output: offset {offset} with {produced} bytes produced")]
    DecodeOverrun { offset: usize, produced: usize },

    #[error("Symbol index {0} outside the 256-entry table")]
    SymbolIndex(usize),

    #[error("Compressed payload ended before decoding completed")]
    TruncatedPayload,

    #[error("PNG cartridge support not enabled (build with the `png` feature)")]
    PngSupportDisabled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "png")]
    #[error("PNG decode error: {0}")]
    Png(#[from] png::DecodingError),

    #[cfg(feature = "png")]
    #[error("Carrier PNG must be RGB or RGBA, got {color_type:?}")]
    CarrierColorType { color_type: png::ColorType },
}

pub type Result<T> = std::result::Result<T, CartridgeError>;
