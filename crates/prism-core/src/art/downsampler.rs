//! Memory-bounded image downsampling.
//!
//! Decodes arbitrary encoded image bytes under an explicit allocation
//! budget, shrinks so the longer edge fits the requested bound, and
//! re-encodes as JPEG at fixed quality. Pure -- no side effects; every
//! failure is recoverable (the pipeline proceeds metadata-only).

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{GenericImageView, ImageReader, Limits};

use crate::error::DownsampleError;

/// Decode budget for untrusted inputs. Inputs that would decode past this
/// are refused instead of allocated.
const DECODE_MAX_DIMENSION: u32 = 16_384;
const DECODE_ALLOC_BUDGET: u64 = 256 * 1024 * 1024;

/// Re-encode `bytes` as a JPEG whose longer edge is at most
/// `max_pixel_dimension`, preserving aspect ratio.
///
/// Returns an error on empty input, unrecognized or corrupt data, and
/// inputs exceeding the decode budget.
pub fn downsample(
    bytes: &[u8],
    max_pixel_dimension: u32,
    jpeg_quality: u8,
) -> Result<Vec<u8>, DownsampleError> {
    if bytes.is_empty() {
        return Err(DownsampleError::EmptyInput);
    }
    let max_edge = max_pixel_dimension.max(1);

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DownsampleError::Decode(e.to_string()))?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(DECODE_MAX_DIMENSION);
    limits.max_image_height = Some(DECODE_MAX_DIMENSION);
    limits.max_alloc = Some(DECODE_ALLOC_BUDGET);
    reader.limits(limits);

    let decoded = reader
        .decode()
        .map_err(|e| DownsampleError::Decode(e.to_string()))?;

    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(DownsampleError::Decode("zero-dimension image".into()));
    }

    let bounded = if width.max(height) > max_edge {
        decoded.thumbnail(max_edge, max_edge)
    } else {
        decoded
    };

    // JPEG has no alpha channel.
    let rgb = bounded.to_rgb8();

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut out), jpeg_quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|e| DownsampleError::Encode(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Encode a flat-color PNG of the given size.
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([120, 40, 200]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn decoded_dimensions(jpeg: &[u8]) -> (u32, u32) {
        image::load_from_memory(jpeg).unwrap().dimensions()
    }

    #[test]
    fn longer_edge_never_exceeds_bound() {
        let out = downsample(&png_bytes(600, 400), 256, 85).unwrap();
        let (w, h) = decoded_dimensions(&out);
        assert!(w.max(h) <= 256, "got {w}x{h}");
    }

    #[test]
    fn aspect_ratio_is_preserved() {
        let out = downsample(&png_bytes(800, 400), 200, 85).unwrap();
        let (w, h) = decoded_dimensions(&out);
        assert_eq!((w, h), (200, 100));
    }

    #[test]
    fn small_input_keeps_its_dimensions() {
        let out = downsample(&png_bytes(100, 60), 1024, 85).unwrap();
        assert_eq!(decoded_dimensions(&out), (100, 60));
    }

    #[test]
    fn output_is_jpeg() {
        let out = downsample(&png_bytes(64, 64), 1024, 85).unwrap();
        assert_eq!(
            image::guess_format(&out).unwrap(),
            image::ImageFormat::Jpeg
        );
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            downsample(&[], 1024, 85),
            Err(DownsampleError::EmptyInput)
        ));
    }

    #[test]
    fn corrupt_bytes_are_an_error_not_a_panic() {
        let garbage = vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01, 0x02];
        assert!(downsample(&garbage, 1024, 85).is_err());
    }

    #[test]
    fn truncated_png_is_an_error() {
        let mut bytes = png_bytes(64, 64);
        bytes.truncate(bytes.len() / 2);
        assert!(downsample(&bytes, 1024, 85).is_err());
    }
}
