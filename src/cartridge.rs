//! Cartridge loading and decode orchestration
//!
//! Ties the front ends together: text parsing, carrier-image extraction and
//! codec dispatch all end at the same place, a [`Cartridge`] holding a fully
//! populated [`MemoryImage`] and the program source string. Consumers never
//! learn which on-disk format a cartridge came from.

use crate::codec;
use crate::error::{CartridgeError, Result};
use crate::memory::{MemoryImage, RAW_CARTRIDGE_SIZE};
use crate::stegano;
use crate::text;
use std::path::Path;
use tracing::{debug, info};

/// A fully decoded cartridge.
///
/// Loads are all-or-nothing: on any error no `Cartridge` value exists, so a
/// caller can never observe a half-written memory image.
#[derive(Debug)]
pub struct Cartridge {
    /// The 32KB address space with every cartridge region filled in.
    pub memory: MemoryImage,

    /// Program source exactly as stored in the cartridge. Embedders whose
    /// Lua lacks the console shorthands can run it through
    /// [`crate::rewrite::prepare_source`].
    pub source: String,
}

impl Cartridge {
    /// Load from text cartridge content.
    pub fn from_text(content: &str) -> Result<Self> {
        let (memory, source) = text::parse(content)?;
        Ok(Self::assemble(memory, source, "text"))
    }

    /// Load from pre-split text cartridge lines.
    pub fn from_text_lines<'a, I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let (memory, source) = text::parse_lines(lines)?;
        Ok(Self::assemble(memory, source, "text"))
    }

    /// Load from a decoded RGBA carrier image.
    ///
    /// Any image decoder works as the producer; the buffer must be exactly
    /// 160x205 pixels. See the `png` feature for a bundled container front
    /// end.
    pub fn from_rgba(rgba: &[u8], width: u32, height: u32) -> Result<Self> {
        let bytes = stegano::extract(rgba, width, height)?;
        let (memory, source) = decode_carrier(&bytes)?;
        Ok(Self::assemble(memory, source, "carrier"))
    }

    /// Load from PNG container bytes.
    #[cfg(feature = "png")]
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self> {
        let image = crate::png::decode_rgba(bytes)?;
        Self::from_rgba(&image.rgba, image.width, image.height)
    }

    /// Load a cartridge file, picking the front end by extension.
    ///
    /// `.png` goes through the carrier decoder, everything else is treated
    /// as a text cartridge.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if is_carrier_path(path) {
            #[cfg(feature = "png")]
            {
                debug!("Loading carrier cartridge from {:?}", path);
                let bytes = std::fs::read(path)?;
                return Self::from_png_bytes(&bytes);
            }
            #[cfg(not(feature = "png"))]
            {
                return Err(CartridgeError::PngSupportDisabled);
            }
        }
        debug!("Loading text cartridge from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_text(&content)
    }

    fn assemble(mut memory: MemoryImage, source: String, origin: &str) -> Self {
        memory.backup_cartridge();
        info!("Loaded {} cartridge: {} bytes of source", origin, source.len());
        Cartridge { memory, source }
    }
}

/// Decode an extracted carrier byte stream.
///
/// `bytes` is the full hidden stream of a carrier image: the 0x4300-byte
/// raw region, then the codec signature and compressed program. This is the
/// pure core of the binary path; no I/O, no shared state.
pub fn decode_carrier(bytes: &[u8]) -> Result<(MemoryImage, String)> {
    if bytes.len() < RAW_CARTRIDGE_SIZE + codec::MAGIC_BYTES {
        return Err(CartridgeError::TruncatedPayload);
    }

    let mut memory = MemoryImage::new();
    memory.load_raw_cartridge(bytes);

    let decoded = codec::decode(&bytes[RAW_CARTRIDGE_SIZE..])?;
    // Cartridges carry the console's extended glyphs, so this is lossy by
    // design of the source charset, not a validation step.
    let source = String::from_utf8_lossy(&decoded).into_owned();
    Ok((memory, source))
}

/// `.png` selects the carrier front end, anything else is text.
pub fn is_carrier_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}
