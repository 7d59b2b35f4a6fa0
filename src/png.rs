//! PNG container front end
//!
//! Thin shim over the `png` crate. The only job here is turning container
//! bytes into a tightly packed 8-bit RGBA buffer; dimension checks and bit
//! extraction stay in [`crate::stegano`].

use crate::error::{CartridgeError, Result};
use tracing::debug;

pub(crate) struct DecodedImage {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode PNG bytes to 8-bit RGBA.
///
/// Indexed and 16-bit images are normalized by the decoder. RGB images get
/// an opaque alpha fill; carriers re-saved without an alpha channel have
/// already lost the top two bits of every hidden byte.
pub(crate) fn decode_rgba(bytes: &[u8]) -> Result<DecodedImage> {
    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info()?;

    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf)?;
    buf.truncate(frame.buffer_size());

    debug!(
        "Decoded carrier PNG: {}x{} {:?}",
        width, height, frame.color_type
    );

    let rgba = match frame.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => {
            let mut rgba = Vec::with_capacity(buf.len() / 3 * 4);
            for pixel in buf.chunks_exact(3) {
                rgba.extend_from_slice(pixel);
                rgba.push(0xff);
            }
            rgba
        }
        other => return Err(CartridgeError::CarrierColorType { color_type: other }),
    };

    Ok(DecodedImage {
        rgba,
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(color: png::ColorType, width: u32, height: u32, pixels: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(pixels).unwrap();
        }
        out
    }

    #[test]
    fn test_decode_rgba_round_trip() {
        let pixels: Vec<u8> = (0..4 * 3 * 4).map(|i| i as u8).collect();
        let bytes = encode(png::ColorType::Rgba, 4, 3, &pixels);

        let image = decode_rgba(&bytes).unwrap();
        assert_eq!(image.width, 4);
        assert_eq!(image.height, 3);
        assert_eq!(image.rgba, pixels);
    }

    #[test]
    fn test_decode_rgb_gains_opaque_alpha() {
        let pixels = [10u8, 20, 30, 40, 50, 60];
        let bytes = encode(png::ColorType::Rgb, 2, 1, &pixels);

        let image = decode_rgba(&bytes).unwrap();
        assert_eq!(image.rgba, [10, 20, 30, 0xff, 40, 50, 60, 0xff]);
    }

    #[test]
    fn test_decode_rejects_grayscale() {
        let bytes = encode(png::ColorType::Grayscale, 2, 2, &[1, 2, 3, 4]);
        assert!(matches!(
            decode_rgba(&bytes),
            Err(CartridgeError::CarrierColorType { .. })
        ));
    }
}
