//! Generated image fixtures.
//!
//! Pixels come from a fixed-seed generator so the encoded size stays well
//! above the minimum upload size and tests are reproducible.

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

fn noise(width: u32, height: u32) -> RgbaImage {
    let mut state: u32 = 0x2545_f491 ^ width.wrapping_mul(31) ^ height;
    RgbaImage::from_fn(width, height, |_, _| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let [r, g, b, _] = state.to_be_bytes();
        Rgba([r, g, b, 255])
    })
}

pub fn noise_rgba_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(noise(width, height))
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// PNG-encoded noise.
pub fn noise_png(width: u32, height: u32) -> Vec<u8> {
    encode(&noise_rgba_image(width, height), ImageFormat::Png)
}

/// JPEG-encoded noise. JPEG has no alpha channel, so the image is flattened first.
pub fn noise_jpeg(width: u32, height: u32) -> Vec<u8> {
    let rgb = DynamicImage::ImageRgb8(noise_rgba_image(width, height).to_rgb8());
    encode(&rgb, ImageFormat::Jpeg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_decode() {
        let png = noise_png(40, 30);
        assert!(png.len() > 100);
        assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);

        let jpeg = noise_jpeg(40, 30);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }

    #[test]
    fn test_fixtures_are_deterministic() {
        assert_eq!(noise_png(16, 16), noise_png(16, 16));
    }
}
