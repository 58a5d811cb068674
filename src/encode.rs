//! Image decoding and data-URI encoding.

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{DynamicImage, ImageFormat, RgbaImage};

/// Decodes picked file bytes, accepting only content that sniffs as an image.
///
/// Anything else (unrecognized magic bytes, truncated data) yields `None`; the
/// caller drops the selection without surfacing an error.
pub fn decode_image(bytes: &[u8]) -> Option<DynamicImage> {
    let format = image::guess_format(bytes).ok()?;
    image::load_from_memory_with_format(bytes, format).ok()
}

/// Encodes a raster as a `data:image/png;base64,...` string.
pub fn png_data_uri(raster: &RgbaImage) -> Result<String, image::ImageError> {
    let mut png = Vec::new();
    raster.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", BASE64.encode(&png)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::Rgba;

    /// A tiny in-memory PNG for tests that need real image bytes.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let raster = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut out = Vec::new();
        raster
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn decodes_png_bytes() {
        let img = decode_image(&png_bytes(8, 6)).unwrap();
        assert_eq!((img.width(), img.height()), (8, 6));
    }

    #[test]
    fn rejects_non_image_bytes() {
        assert!(decode_image(b"just some text, not a photo").is_none());
        assert!(decode_image(&[]).is_none());
    }

    #[test]
    fn data_uri_round_trips_through_base64() {
        let raster = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let uri = png_data_uri(&raster).unwrap();
        let payload = uri.strip_prefix("data:image/png;base64,").unwrap();
        let png = BASE64.decode(payload).unwrap();
        let decoded = decode_image(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 4));
    }
}
