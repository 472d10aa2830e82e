// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image decoding and encoding helpers.

use anyhow::{Context, Result};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Load and decode an image file into RGBA pixels.
pub fn load_image(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?;
    Ok(img.to_rgba8())
}

/// Decode an in-memory image payload (any supported format).
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(bytes).context("Failed to decode image data")?;
    Ok(img.to_rgba8())
}

/// Encode RGBA pixels as PNG.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .context("Failed to encode PNG")?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_encode_decode_roundtrip() {
        let img = RgbaImage::from_pixel(12, 7, image::Rgba([200, 100, 50, 255]));

        let bytes = encode_png(&img).expect("encode");
        let decoded = decode_image(&bytes).expect("decode");

        assert_eq!((decoded.width(), decoded.height()), (12, 7));
        assert_eq!(*decoded.get_pixel(5, 5), image::Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image(&[0, 1, 2, 3]).is_err());
    }
}
