//! Fantasy Console Cartridge Decoder
//!
//! Decodes game cartridges for a PICO-8 style fantasy console into a fixed
//! 32KB memory image plus the program source.
//!
//! ## Features
//!
//! - **Text cartridges**: section-marker format with hex-encoded asset rows
//! - **Carrier images**: 160x205 RGBA screenshots hiding one byte per pixel
//!   in the low bits of each channel
//! - **Two codecs**: the legacy lookup-table format and the adaptive `pxa`
//!   bitstream, picked by signature
//! - **Typed memory map**: sprite sheet, tile map, sound, music and
//!   draw-state views over the raw image
//!
//! ## Example Usage
//!
//! ```rust
//! use cart8::Cartridge;
//!
//! let cart = Cartridge::from_text("__lua__\nprint(\"hi\")\n")?;
//! assert_eq!(cart.source, "print(\"hi\")\n");
//! assert_eq!(cart.memory.sprite_pixel(0, 0), 0);
//! # Ok::<(), cart8::CartridgeError>(())
//! ```
//!
//! Loading from disk picks the front end by extension:
//!
//! ```rust,no_run
//! use cart8::Cartridge;
//!
//! let cart = Cartridge::load("game.png")?;
//! println!("{} bytes of source", cart.source.len());
//! # Ok::<(), cart8::CartridgeError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌───────────────┐
//! │ text        │───▶│ text parser   │──────────────┐
//! │ cartridge   │    └───────────────┘              ▼
//! └─────────────┘                         ┌──────────────────────┐
//! ┌─────────────┐    ┌───────────────┐    │ MemoryImage (32KB)   │
//! │ PNG carrier │───▶│ pixel         │    │ + program source     │
//! │ 160x205     │    │ extraction    │    └──────────────────────┘
//! └─────────────┘    └──────┬────────┘               ▲
//!                           ▼                        │
//!                    ┌───────────────┐               │
//!                    │ codec         │───────────────┘
//!                    │ legacy | pxa  │
//!                    └───────────────┘
//! ```
//!
//! Both paths end at the same [`Cartridge`] value; nothing downstream can
//! tell which format a cartridge came from.
//!
//! ## Modules
//!
//! - [`error`] - Error types shared by every decode path
//! - [`memory`] - The 32KB address space and its region map
//! - [`audio`] - Typed views over 68-byte sound and 4-byte music records
//! - [`text`] - Text cartridge parser
//! - [`stegano`] - Carrier pixel-to-byte extraction
//! - [`codec`] - Compressed source codecs and signature dispatch
//! - [`rewrite`] - Console Lua shorthand rewriting for stock interpreters
//! - [`cartridge`] - Load entry points tying the front ends together
//!
//! ## Feature Flags
//!
//! - `png` (default) - PNG container decoding. Without it, decode the image
//!   yourself and use [`Cartridge::from_rgba`].

pub mod audio;
pub mod cartridge;
pub mod codec;
pub mod error;
pub mod memory;
#[cfg(feature = "png")]
mod png;
pub mod rewrite;
pub mod stegano;
pub mod text;

// Re-export commonly used types
pub use audio::{Effect, MusicSlot, MusicSlotMut, Note, SoundSlot, SoundSlotMut, Waveform};
pub use cartridge::{decode_carrier, is_carrier_path, Cartridge};
pub use codec::{CodecKind, LEGACY_MAGIC, MAX_SOURCE_BYTES, PXA_MAGIC};
pub use error::{CartridgeError, Result};
pub use memory::{ClipRect, ColorBytePair, MemoryImage, MEMORY_SIZE, RAW_CARTRIDGE_SIZE};
pub use stegano::{CARRIER_HEIGHT, CARRIER_WIDTH};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
