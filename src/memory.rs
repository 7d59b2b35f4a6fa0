//! Fixed 32KB console address space
//!
//! Every cartridge decodes into the same memory map:
//!
//! ```text
//! 0x0000  sprite sheet      128x128 px, 4bpp   (0x2000 bytes)
//! 0x1000  tile map rows 32..64, shared with the sprite sheet bottom half
//! 0x2000  tile map rows 0..32                  (0x1000 bytes)
//! 0x3000  sprite flags      256 x u8
//! 0x3100  music patterns    64 x 4 bytes
//! 0x3200  sound effects     64 x 68 bytes
//! 0x4300  general-purpose RAM
//! 0x5e00  persistent cart data  64 x i32 LE
//! 0x5f00  draw/screen palettes  2 x 16 bytes
//! 0x5f20  clip rect, pen color, cursor, camera
//! 0x6000  screen framebuffer 128x128 px, 4bpp  (0x2000 bytes)
//! ```
//!
//! The region below 0x4300 is exactly what a cartridge file stores; loaders
//! fill it and leave everything above untouched.

pub const MEMORY_SIZE: usize = 0x8000;

pub const SPRITE_SHEET: usize = 0x0000;
pub const SPRITE_SHEET_SIZE: usize = 0x2000;
pub const TILE_MAP_LOW: usize = 0x1000;
pub const TILE_MAP_HIGH: usize = 0x2000;
pub const SPRITE_FLAGS: usize = 0x3000;
pub const SPRITE_FLAG_COUNT: usize = 256;
pub const MUSIC: usize = 0x3100;
pub const MUSIC_COUNT: usize = 64;
pub const MUSIC_BYTES: usize = 4;
pub const SOUNDS: usize = 0x3200;
pub const SOUND_COUNT: usize = 64;
pub const SOUND_BYTES: usize = 68;
pub const CART_DATA: usize = 0x5e00;
pub const CART_DATA_SLOTS: usize = 64;
pub const PALETTES: usize = 0x5f00;
pub const CLIP_RECT: usize = 0x5f20;
pub const PEN_COLOR: usize = 0x5f25;
pub const CURSOR: usize = 0x5f26;
pub const CAMERA: usize = 0x5f28;
pub const SCREEN: usize = 0x6000;
pub const SCREEN_SIZE: usize = 0x2000;

/// Bytes a cartridge stores verbatim: sprite sheet, tile map, sprite flags,
/// music and sound tables. Always 0x4300.
pub const RAW_CARTRIDGE_SIZE: usize = 0x4300;

pub const SPRITE_SHEET_WIDTH: usize = 128;
pub const SPRITE_SHEET_HEIGHT: usize = 128;
pub const TILE_MAP_WIDTH: usize = 128;
pub const TILE_MAP_HEIGHT: usize = 64;
pub const SCREEN_WIDTH: usize = 128;
pub const SCREEN_HEIGHT: usize = 128;

/// Two 4-bit pixels packed into one byte.
///
/// The even-x pixel lives in the low nibble, the odd-x pixel in the high
/// nibble, which is also the digit order of `__gfx__` rows: the first hex
/// digit of a pair is the low nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorBytePair(u8);

impl ColorBytePair {
    pub fn from_byte(byte: u8) -> Self {
        ColorBytePair(byte)
    }

    pub fn from_nibbles(low: u8, high: u8) -> Self {
        ColorBytePair((low & 0x0f) | ((high & 0x0f) << 4))
    }

    pub fn byte(self) -> u8 {
        self.0
    }

    /// Color of the even-x pixel.
    pub fn low(self) -> u8 {
        self.0 & 0x0f
    }

    /// Color of the odd-x pixel.
    pub fn high(self) -> u8 {
        self.0 >> 4
    }

    pub fn set_low(&mut self, color: u8) {
        self.0 = (self.0 & 0xf0) | (color & 0x0f);
    }

    pub fn set_high(&mut self, color: u8) {
        self.0 = (self.0 & 0x0f) | ((color & 0x0f) << 4);
    }
}

/// Screen-space clipping rectangle, inclusive corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub x0: u8,
    pub y0: u8,
    pub x1: u8,
    pub y1: u8,
}

/// The console's 32KB address space plus the cartridge ROM backup.
///
/// A fresh image is fully zero-initialized. Loaders write only the cartridge
/// region (below 0x4300); draw state is reset separately by the VM via
/// [`reset_draw_state`](MemoryImage::reset_draw_state).
pub struct MemoryImage {
    bytes: Box<[u8; MEMORY_SIZE]>,
    backup: Box<[u8; RAW_CARTRIDGE_SIZE]>,
}

impl MemoryImage {
    pub fn new() -> Self {
        MemoryImage {
            bytes: Box::new([0; MEMORY_SIZE]),
            backup: Box::new([0; RAW_CARTRIDGE_SIZE]),
        }
    }

    /// Full address space, cartridge region first.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[..]
    }

    /// The 0x4300 bytes a cartridge file stores verbatim.
    pub fn raw_cartridge(&self) -> &[u8] {
        &self.bytes[..RAW_CARTRIDGE_SIZE]
    }

    /// Overwrite the raw cartridge region from `bytes`.
    ///
    /// Callers guarantee `bytes` holds at least [`RAW_CARTRIDGE_SIZE`] bytes;
    /// extra bytes are ignored.
    pub fn load_raw_cartridge(&mut self, bytes: &[u8]) {
        assert!(bytes.len() >= RAW_CARTRIDGE_SIZE);
        self.bytes[..RAW_CARTRIDGE_SIZE].copy_from_slice(&bytes[..RAW_CARTRIDGE_SIZE]);
    }

    /// Snapshot the raw cartridge region so the VM can reload it later.
    pub fn backup_cartridge(&mut self) {
        self.backup.copy_from_slice(&self.bytes[..RAW_CARTRIDGE_SIZE]);
    }

    /// The snapshot taken by [`backup_cartridge`](MemoryImage::backup_cartridge).
    pub fn cartridge_backup(&self) -> &[u8] {
        &self.backup[..]
    }

    /// Restore the raw cartridge region from the last snapshot.
    pub fn restore_cartridge(&mut self) {
        self.bytes[..RAW_CARTRIDGE_SIZE].copy_from_slice(&self.backup[..]);
    }

    pub fn sprite_sheet(&self) -> &[u8] {
        &self.bytes[SPRITE_SHEET..SPRITE_SHEET + SPRITE_SHEET_SIZE]
    }

    pub fn sprite_sheet_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[SPRITE_SHEET..SPRITE_SHEET + SPRITE_SHEET_SIZE]
    }

    pub fn sprite_pixel(&self, x: usize, y: usize) -> u8 {
        assert!(x < SPRITE_SHEET_WIDTH && y < SPRITE_SHEET_HEIGHT);
        let pair = ColorBytePair::from_byte(self.bytes[SPRITE_SHEET + y * 64 + x / 2]);
        if x % 2 == 0 {
            pair.low()
        } else {
            pair.high()
        }
    }

    pub fn set_sprite_pixel(&mut self, x: usize, y: usize, color: u8) {
        assert!(x < SPRITE_SHEET_WIDTH && y < SPRITE_SHEET_HEIGHT);
        let mut pair = ColorBytePair::from_byte(self.bytes[SPRITE_SHEET + y * 64 + x / 2]);
        if x % 2 == 0 {
            pair.set_low(color);
        } else {
            pair.set_high(color);
        }
        self.bytes[SPRITE_SHEET + y * 64 + x / 2] = pair.byte();
    }

    fn tile_map_offset(x: usize, y: usize) -> usize {
        assert!(x < TILE_MAP_WIDTH && y < TILE_MAP_HEIGHT);
        // Rows 32..64 live in the half shared with the sprite sheet.
        if y >= 32 {
            TILE_MAP_LOW + (y - 32) * TILE_MAP_WIDTH + x
        } else {
            TILE_MAP_HIGH + y * TILE_MAP_WIDTH + x
        }
    }

    pub fn map_sprite(&self, x: usize, y: usize) -> u8 {
        self.bytes[Self::tile_map_offset(x, y)]
    }

    pub fn set_map_sprite(&mut self, x: usize, y: usize, sprite: u8) {
        self.bytes[Self::tile_map_offset(x, y)] = sprite;
    }

    pub fn sprite_flags(&self, sprite: usize) -> u8 {
        assert!(sprite < SPRITE_FLAG_COUNT);
        self.bytes[SPRITE_FLAGS + sprite]
    }

    pub fn set_sprite_flags(&mut self, sprite: usize, flags: u8) {
        assert!(sprite < SPRITE_FLAG_COUNT);
        self.bytes[SPRITE_FLAGS + sprite] = flags;
    }

    /// Raw 68-byte sound record.
    pub fn sound(&self, index: usize) -> &[u8] {
        assert!(index < SOUND_COUNT);
        let offset = SOUNDS + index * SOUND_BYTES;
        &self.bytes[offset..offset + SOUND_BYTES]
    }

    pub fn sound_mut(&mut self, index: usize) -> &mut [u8] {
        assert!(index < SOUND_COUNT);
        let offset = SOUNDS + index * SOUND_BYTES;
        &mut self.bytes[offset..offset + SOUND_BYTES]
    }

    /// Raw 4-byte music pattern record.
    pub fn music(&self, index: usize) -> &[u8] {
        assert!(index < MUSIC_COUNT);
        let offset = MUSIC + index * MUSIC_BYTES;
        &self.bytes[offset..offset + MUSIC_BYTES]
    }

    pub fn music_mut(&mut self, index: usize) -> &mut [u8] {
        assert!(index < MUSIC_COUNT);
        let offset = MUSIC + index * MUSIC_BYTES;
        &mut self.bytes[offset..offset + MUSIC_BYTES]
    }

    pub fn cart_data(&self, slot: usize) -> i32 {
        assert!(slot < CART_DATA_SLOTS);
        let offset = CART_DATA + slot * 4;
        i32::from_le_bytes([
            self.bytes[offset],
            self.bytes[offset + 1],
            self.bytes[offset + 2],
            self.bytes[offset + 3],
        ])
    }

    pub fn set_cart_data(&mut self, slot: usize, value: i32) {
        assert!(slot < CART_DATA_SLOTS);
        let offset = CART_DATA + slot * 4;
        self.bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    /// Draw palette: color remapping applied while drawing.
    pub fn draw_palette(&self) -> &[u8] {
        &self.bytes[PALETTES..PALETTES + 16]
    }

    pub fn draw_palette_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[PALETTES..PALETTES + 16]
    }

    /// Screen palette: color remapping applied at display time.
    pub fn screen_palette(&self) -> &[u8] {
        &self.bytes[PALETTES + 16..PALETTES + 32]
    }

    pub fn screen_palette_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[PALETTES + 16..PALETTES + 32]
    }

    pub fn clip_rect(&self) -> ClipRect {
        ClipRect {
            x0: self.bytes[CLIP_RECT],
            y0: self.bytes[CLIP_RECT + 1],
            x1: self.bytes[CLIP_RECT + 2],
            y1: self.bytes[CLIP_RECT + 3],
        }
    }

    pub fn set_clip_rect(&mut self, rect: ClipRect) {
        self.bytes[CLIP_RECT] = rect.x0;
        self.bytes[CLIP_RECT + 1] = rect.y0;
        self.bytes[CLIP_RECT + 2] = rect.x1;
        self.bytes[CLIP_RECT + 3] = rect.y1;
    }

    pub fn pen_color(&self) -> u8 {
        self.bytes[PEN_COLOR]
    }

    pub fn set_pen_color(&mut self, color: u8) {
        self.bytes[PEN_COLOR] = color;
    }

    pub fn cursor(&self) -> (u8, u8) {
        (self.bytes[CURSOR], self.bytes[CURSOR + 1])
    }

    pub fn set_cursor(&mut self, x: u8, y: u8) {
        self.bytes[CURSOR] = x;
        self.bytes[CURSOR + 1] = y;
    }

    pub fn camera(&self) -> (i16, i16) {
        let x = i16::from_le_bytes([self.bytes[CAMERA], self.bytes[CAMERA + 1]]);
        let y = i16::from_le_bytes([self.bytes[CAMERA + 2], self.bytes[CAMERA + 3]]);
        (x, y)
    }

    pub fn set_camera(&mut self, x: i16, y: i16) {
        self.bytes[CAMERA..CAMERA + 2].copy_from_slice(&x.to_le_bytes());
        self.bytes[CAMERA + 2..CAMERA + 4].copy_from_slice(&y.to_le_bytes());
    }

    pub fn screen(&self) -> &[u8] {
        &self.bytes[SCREEN..SCREEN + SCREEN_SIZE]
    }

    pub fn screen_mut(&mut self) -> &mut [u8] {
        &mut self.bytes[SCREEN..SCREEN + SCREEN_SIZE]
    }

    pub fn screen_pixel(&self, x: usize, y: usize) -> u8 {
        assert!(x < SCREEN_WIDTH && y < SCREEN_HEIGHT);
        let pair = ColorBytePair::from_byte(self.bytes[SCREEN + y * 64 + x / 2]);
        if x % 2 == 0 {
            pair.low()
        } else {
            pair.high()
        }
    }

    pub fn set_screen_pixel(&mut self, x: usize, y: usize, color: u8) {
        assert!(x < SCREEN_WIDTH && y < SCREEN_HEIGHT);
        let mut pair = ColorBytePair::from_byte(self.bytes[SCREEN + y * 64 + x / 2]);
        if x % 2 == 0 {
            pair.set_low(color);
        } else {
            pair.set_high(color);
        }
        self.bytes[SCREEN + y * 64 + x / 2] = pair.byte();
    }

    /// Identity palettes, full-screen clip rect, pen and cursor at zero.
    ///
    /// Called by the VM at boot and on program reset, never by loaders.
    pub fn reset_draw_state(&mut self) {
        for i in 0..16 {
            self.bytes[PALETTES + i] = i as u8;
            self.bytes[PALETTES + 16 + i] = i as u8;
        }
        self.set_clip_rect(ClipRect {
            x0: 0,
            y0: 0,
            x1: (SCREEN_WIDTH - 1) as u8,
            y1: (SCREEN_HEIGHT - 1) as u8,
        });
        self.set_pen_color(0);
        self.set_cursor(0, 0);
        self.set_camera(0, 0);
    }
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryImage")
            .field("size", &MEMORY_SIZE)
            .finish()
    }
}
