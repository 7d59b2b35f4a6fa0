//! Text cartridge parser
//!
//! The human-editable cartridge format is line oriented: exact-match marker
//! lines (`__lua__`, `__gfx__`, ...) switch the current section, and every
//! other non-blank line is data for that section. Program source is carried
//! verbatim; graphics, map, flag and audio sections are rows of hex digits
//! with fixed widths.
//!
//! Parsing is all-or-nothing: a malformed line fails the whole load and no
//! partially-filled [`MemoryImage`] escapes.

use crate::audio::{Effect, MusicSlotMut, Note, SoundSlotMut, Waveform, CHANNELS, NOTES_PER_SOUND};
use crate::error::{CartridgeError, Result};
use crate::memory::{
    ColorBytePair, MemoryImage, MUSIC_COUNT, SOUND_COUNT, SPRITE_FLAG_COUNT, SPRITE_SHEET_HEIGHT,
    TILE_MAP_HEIGHT, TILE_MAP_WIDTH,
};
use tracing::debug;

const GFX_DIGITS: usize = 128;
const MAP_DIGITS: usize = 256;
const GFF_DIGITS: usize = 256;
const SFX_DIGITS: usize = 168;
// Two flag digits, one space, eight channel digits.
const MUSIC_LINE_LEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Lua,
    Gfx,
    Gff,
    Label,
    Map,
    Sfx,
    Music,
}

impl Section {
    fn from_marker(line: &str) -> Option<Self> {
        match line {
            "__lua__" => Some(Section::Lua),
            "__gfx__" => Some(Section::Gfx),
            "__gff__" => Some(Section::Gff),
            "__label__" => Some(Section::Label),
            "__map__" => Some(Section::Map),
            "__sfx__" => Some(Section::Sfx),
            "__music__" => Some(Section::Music),
            _ => None,
        }
    }
}

/// Parse a whole text cartridge.
///
/// Lines are split on `\n`; a trailing `\r` per line is stripped, so DOS
/// line endings work unmodified.
pub fn parse(text: &str) -> Result<(MemoryImage, String)> {
    parse_lines(text.lines())
}

/// Parse a text cartridge from pre-split lines.
pub fn parse_lines<'a, I>(lines: I) -> Result<(MemoryImage, String)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut memory = MemoryImage::new();
    let mut source = String::new();
    let mut parser = Parser::new();

    for line in lines {
        let line = line.strip_suffix('\r').unwrap_or(line);
        parser.feed(&mut memory, &mut source, line)?;
    }

    Ok((memory, source))
}

struct Parser {
    section: Section,
    gfx_row: usize,
    map_row: usize,
    gff_row: usize,
    sound_index: usize,
    music_index: usize,
}

impl Parser {
    fn new() -> Self {
        Parser {
            section: Section::Header,
            gfx_row: 0,
            map_row: 0,
            gff_row: 0,
            sound_index: 0,
            music_index: 0,
        }
    }

    fn feed(&mut self, memory: &mut MemoryImage, source: &mut String, line: &str) -> Result<()> {
        if let Some(section) = Section::from_marker(line) {
            debug!("Entering {:?} section", section);
            self.section = section;
            return Ok(());
        }
        if line.is_empty() {
            return Ok(());
        }

        match self.section {
            // Anything before the first marker, and label art, is ignored.
            Section::Header | Section::Label => Ok(()),
            Section::Lua => {
                source.push_str(line);
                source.push('\n');
                Ok(())
            }
            Section::Gfx => self.gfx_line(memory, line),
            Section::Map => self.map_line(memory, line),
            Section::Gff => self.gff_line(memory, line),
            Section::Sfx => self.sfx_line(memory, line),
            Section::Music => self.music_line(memory, line),
        }
    }

    fn gfx_line(&mut self, memory: &mut MemoryImage, line: &str) -> Result<()> {
        let digits = expect_line_length(line, GFX_DIGITS, "gfx")?;
        if self.gfx_row >= SPRITE_SHEET_HEIGHT {
            return Err(CartridgeError::SectionOverflow {
                section: "gfx",
                capacity: SPRITE_SHEET_HEIGHT,
            });
        }

        let row = self.gfx_row * GFX_DIGITS / 2;
        for x in 0..GFX_DIGITS / 2 {
            // First digit of a pair is the low nibble, the even-x pixel.
            let low = hex_digit(digits[x * 2], "gfx")?;
            let high = hex_digit(digits[x * 2 + 1], "gfx")?;
            memory.sprite_sheet_mut()[row + x] = ColorBytePair::from_nibbles(low, high).byte();
        }
        self.gfx_row += 1;
        Ok(())
    }

    fn map_line(&mut self, memory: &mut MemoryImage, line: &str) -> Result<()> {
        let digits = expect_line_length(line, MAP_DIGITS, "map")?;
        if self.map_row >= TILE_MAP_HEIGHT {
            return Err(CartridgeError::SectionOverflow {
                section: "map",
                capacity: TILE_MAP_HEIGHT,
            });
        }

        for x in 0..TILE_MAP_WIDTH {
            let sprite = hex_byte(digits[x * 2], digits[x * 2 + 1], "map")?;
            memory.set_map_sprite(x, self.map_row, sprite);
        }
        self.map_row += 1;
        Ok(())
    }

    fn gff_line(&mut self, memory: &mut MemoryImage, line: &str) -> Result<()> {
        let digits = expect_line_length(line, GFF_DIGITS, "gff")?;
        let per_row = GFF_DIGITS / 2;
        if self.gff_row >= SPRITE_FLAG_COUNT / per_row {
            return Err(CartridgeError::SectionOverflow {
                section: "gff",
                capacity: SPRITE_FLAG_COUNT / per_row,
            });
        }

        for x in 0..per_row {
            let flags = hex_byte(digits[x * 2], digits[x * 2 + 1], "gff")?;
            memory.set_sprite_flags(self.gff_row * per_row + x, flags);
        }
        self.gff_row += 1;
        Ok(())
    }

    fn sfx_line(&mut self, memory: &mut MemoryImage, line: &str) -> Result<()> {
        let digits = expect_line_length(line, SFX_DIGITS, "sfx")?;
        if self.sound_index >= SOUND_COUNT {
            return Err(CartridgeError::SectionOverflow {
                section: "sfx",
                capacity: SOUND_COUNT,
            });
        }

        let mut slot = SoundSlotMut::new(memory.sound_mut(self.sound_index));
        slot.set_editor_mode(hex_byte(digits[0], digits[1], "sfx")?);
        slot.set_speed(hex_byte(digits[2], digits[3], "sfx")?);
        slot.set_loop_start(hex_byte(digits[4], digits[5], "sfx")?);
        slot.set_loop_end(hex_byte(digits[6], digits[7], "sfx")?);

        for i in 0..NOTES_PER_SOUND {
            let s = &digits[8 + i * 5..8 + i * 5 + 5];
            let mut note = Note::default();
            note.set_pitch(hex_byte(s[0], s[1], "sfx")?);
            // Waveform digits 8..=f select custom instruments 0..=7.
            let waveform = hex_digit(s[2], "sfx")?;
            note.set_waveform(Waveform::from_u8(waveform & 0x7));
            note.set_custom_instrument(waveform >= 8);
            note.set_volume(hex_digit(s[3], "sfx")?);
            note.set_effect(Effect::from_u8(hex_digit(s[4], "sfx")?));
            slot.set_note(i, note);
        }
        self.sound_index += 1;
        Ok(())
    }

    fn music_line(&mut self, memory: &mut MemoryImage, line: &str) -> Result<()> {
        let digits = line.as_bytes();
        if digits.len() != MUSIC_LINE_LEN || digits[2] != b' ' {
            return Err(CartridgeError::MalformedMusicLine(line.to_string()));
        }
        if self.music_index >= MUSIC_COUNT {
            return Err(CartridgeError::SectionOverflow {
                section: "music",
                capacity: MUSIC_COUNT,
            });
        }

        let flags = hex_byte(digits[0], digits[1], "music")?;
        let mut slot = MusicSlotMut::new(memory.music_mut(self.music_index));
        slot.set_loop_begin(flags & 0x1 != 0);
        slot.set_loop_end(flags & 0x2 != 0);
        slot.set_stop(flags & 0x4 != 0);

        for channel in 0..CHANNELS {
            let value = hex_byte(digits[3 + channel * 2], digits[4 + channel * 2], "music")?;
            slot.set_channel(channel, value);
        }
        self.music_index += 1;
        Ok(())
    }
}

fn expect_line_length<'a>(
    line: &'a str,
    expected: usize,
    section: &'static str,
) -> Result<&'a [u8]> {
    if line.len() != expected {
        return Err(CartridgeError::SectionLineLength {
            section,
            expected,
            found: line.len(),
        });
    }
    Ok(line.as_bytes())
}

fn hex_digit(digit: u8, section: &'static str) -> Result<u8> {
    (digit as char)
        .to_digit(16)
        .map(|v| v as u8)
        .ok_or(CartridgeError::InvalidHexDigit {
            digit: digit as char,
            section,
        })
}

fn hex_byte(high: u8, low: u8, section: &'static str) -> Result<u8> {
    Ok((hex_digit(high, section)? << 4) | hex_digit(low, section)?)
}
