//! Frame encoding: RGB bitmap -> JPEG bytes -> base64 text.

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::error::EncodeError;

/// A single captured or decoded frame.
pub type Frame = RgbImage;

/// Encode an RGB frame as JPEG. `quality` is clamped to 1-100.
pub fn encode_jpeg(frame: &Frame, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder.encode_image(frame)?;
    Ok(buf)
}

/// Standard padded base64.
pub fn to_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Encode a frame straight to the base64 JPEG text the API expects.
pub fn encode_frame(frame: &Frame, quality: u8) -> Result<String, EncodeError> {
    let jpeg = encode_jpeg(frame, quality)?;
    Ok(to_base64(&jpeg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn checkerboard(w: u32, h: u32) -> Frame {
        RgbImage::from_fn(w, h, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        })
    }

    #[test]
    fn test_jpeg_has_soi_and_eoi_markers() {
        let jpeg = encode_jpeg(&checkerboard(32, 24), 80).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encoded_frame_decodes_back_to_same_size() {
        let b64 = encode_frame(&checkerboard(40, 30), 80).unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64)
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 40);
        assert_eq!(decoded.height(), 30);
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let frame = RgbImage::from_fn(64, 64, |x, y| Rgb([(x * 4) as u8, (y * 4) as u8, 128]));
        let high = encode_jpeg(&frame, 100).unwrap();
        let low = encode_jpeg(&frame, 10).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_base64_alphabet() {
        assert_eq!(to_base64(b"hi?"), "aGk/");
        assert_eq!(to_base64(b"a"), "YQ==");
    }
}
