//! Typed views over the sound and music tables
//!
//! The audio engine reads these records straight out of memory; the views
//! here only interpret bytes in place, they never reformat them.
//!
//! A sound effect is 68 bytes: 32 notes packed as little-endian u16 values,
//! then editor mode, speed, loop start and loop end. A music pattern is one
//! byte per channel: the low six bits select a sound effect, bit 6 marks the
//! channel unused, and bit 7 of channels 0..3 carries the pattern's
//! loop-begin, loop-end and stop flags.

use crate::memory::{MUSIC_BYTES, SOUND_BYTES};

pub const NOTES_PER_SOUND: usize = 32;
pub const CHANNELS: usize = 4;

/// Oscillator shape, three bits of every note.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Triangle = 0,
    TiltedSaw = 1,
    Saw = 2,
    Square = 3,
    Pulse = 4,
    Organ = 5,
    Noise = 6,
    Phaser = 7,
}

impl Waveform {
    pub fn from_u8(value: u8) -> Self {
        match value & 0x7 {
            0 => Waveform::Triangle,
            1 => Waveform::TiltedSaw,
            2 => Waveform::Saw,
            3 => Waveform::Square,
            4 => Waveform::Pulse,
            5 => Waveform::Organ,
            6 => Waveform::Noise,
            _ => Waveform::Phaser,
        }
    }
}

/// Per-note modulation, three bits of every note.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None = 0,
    Slide = 1,
    Vibrato = 2,
    Drop = 3,
    FadeIn = 4,
    FadeOut = 5,
    ArpeggioFast = 6,
    ArpeggioSlow = 7,
}

impl Effect {
    pub fn from_u8(value: u8) -> Self {
        match value & 0x7 {
            0 => Effect::None,
            1 => Effect::Slide,
            2 => Effect::Vibrato,
            3 => Effect::Drop,
            4 => Effect::FadeIn,
            5 => Effect::FadeOut,
            6 => Effect::ArpeggioFast,
            _ => Effect::ArpeggioSlow,
        }
    }
}

/// One note packed into 16 bits.
///
/// ```text
/// bit  0..6   pitch (0..64)
/// bit  6..9   waveform
/// bit  9..12  volume (0..8)
/// bit 12..15  effect
/// bit 15      custom instrument flag
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Note(u16);

impl Note {
    pub fn from_bits(bits: u16) -> Self {
        Note(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn pitch(self) -> u8 {
        (self.0 & 0x3f) as u8
    }

    pub fn waveform(self) -> Waveform {
        Waveform::from_u8(((self.0 >> 6) & 0x7) as u8)
    }

    pub fn volume(self) -> u8 {
        ((self.0 >> 9) & 0x7) as u8
    }

    pub fn effect(self) -> Effect {
        Effect::from_u8(((self.0 >> 12) & 0x7) as u8)
    }

    pub fn uses_custom_instrument(self) -> bool {
        self.0 & 0x8000 != 0
    }

    pub fn set_pitch(&mut self, pitch: u8) {
        self.0 = (self.0 & !0x3f) | (pitch as u16 & 0x3f);
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.0 = (self.0 & !(0x7 << 6)) | ((waveform as u16) << 6);
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.0 = (self.0 & !(0x7 << 9)) | ((volume as u16 & 0x7) << 9);
    }

    pub fn set_effect(&mut self, effect: Effect) {
        self.0 = (self.0 & !(0x7 << 12)) | ((effect as u16) << 12);
    }

    pub fn set_custom_instrument(&mut self, custom: bool) {
        if custom {
            self.0 |= 0x8000;
        } else {
            self.0 &= !0x8000;
        }
    }
}

/// Read-only view of a 68-byte sound record.
pub struct SoundSlot<'a> {
    bytes: &'a [u8],
}

impl<'a> SoundSlot<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        assert_eq!(bytes.len(), SOUND_BYTES);
        SoundSlot { bytes }
    }

    pub fn note(&self, index: usize) -> Note {
        assert!(index < NOTES_PER_SOUND);
        Note::from_bits(u16::from_le_bytes([
            self.bytes[index * 2],
            self.bytes[index * 2 + 1],
        ]))
    }

    pub fn editor_mode(&self) -> u8 {
        self.bytes[64]
    }

    /// Ticks per note; larger is slower.
    pub fn speed(&self) -> u8 {
        self.bytes[65]
    }

    pub fn loop_start(&self) -> u8 {
        self.bytes[66]
    }

    pub fn loop_end(&self) -> u8 {
        self.bytes[67]
    }
}

/// Mutable view of a 68-byte sound record.
pub struct SoundSlotMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> SoundSlotMut<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        assert_eq!(bytes.len(), SOUND_BYTES);
        SoundSlotMut { bytes }
    }

    pub fn set_note(&mut self, index: usize, note: Note) {
        assert!(index < NOTES_PER_SOUND);
        self.bytes[index * 2..index * 2 + 2].copy_from_slice(&note.bits().to_le_bytes());
    }

    pub fn set_editor_mode(&mut self, mode: u8) {
        self.bytes[64] = mode;
    }

    pub fn set_speed(&mut self, speed: u8) {
        self.bytes[65] = speed;
    }

    pub fn set_loop_start(&mut self, start: u8) {
        self.bytes[66] = start;
    }

    pub fn set_loop_end(&mut self, end: u8) {
        self.bytes[67] = end;
    }
}

/// Read-only view of a 4-byte music pattern record.
pub struct MusicSlot<'a> {
    bytes: &'a [u8],
}

impl<'a> MusicSlot<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        assert_eq!(bytes.len(), MUSIC_BYTES);
        MusicSlot { bytes }
    }

    pub fn channel_byte(&self, channel: usize) -> u8 {
        assert!(channel < CHANNELS);
        self.bytes[channel]
    }

    pub fn sfx_index(&self, channel: usize) -> u8 {
        self.channel_byte(channel) & 0x3f
    }

    pub fn channel_unused(&self, channel: usize) -> bool {
        self.channel_byte(channel) & 0x40 != 0
    }

    pub fn is_loop_begin(&self) -> bool {
        self.bytes[0] & 0x80 != 0
    }

    pub fn is_loop_end(&self) -> bool {
        self.bytes[1] & 0x80 != 0
    }

    pub fn is_stop(&self) -> bool {
        self.bytes[2] & 0x80 != 0
    }
}

/// Mutable view of a 4-byte music pattern record.
pub struct MusicSlotMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> MusicSlotMut<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        assert_eq!(bytes.len(), MUSIC_BYTES);
        MusicSlotMut { bytes }
    }

    /// Store a channel byte, preserving the flag bit already in place.
    ///
    /// Values below 0x40 select a sound effect; values with bit 6 set mark
    /// the channel unused, as the console's own cartridge writer emits them.
    pub fn set_channel(&mut self, channel: usize, value: u8) {
        assert!(channel < CHANNELS);
        self.bytes[channel] = (self.bytes[channel] & 0x80) | (value & 0x7f);
    }

    pub fn set_loop_begin(&mut self, on: bool) {
        Self::set_flag(&mut self.bytes[0], on);
    }

    pub fn set_loop_end(&mut self, on: bool) {
        Self::set_flag(&mut self.bytes[1], on);
    }

    pub fn set_stop(&mut self, on: bool) {
        Self::set_flag(&mut self.bytes[2], on);
    }

    fn set_flag(byte: &mut u8, on: bool) {
        if on {
            *byte |= 0x80;
        } else {
            *byte &= 0x7f;
        }
    }
}
