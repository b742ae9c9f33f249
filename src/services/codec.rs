//! Image codec adapter: bytes in, `DynamicImage` out, and back again.

use image::{DynamicImage, ImageError, ImageFormat};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] ImageError),
    #[error("failed to encode image as {format:?}: {source}")]
    Encode {
        format: ImageFormat,
        #[source]
        source: ImageError,
    },
}

/// Decode an image, guessing the format from its magic bytes.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
    image::load_from_memory(bytes).map_err(CodecError::Decode)
}

/// Encode `image` into an in-memory buffer of the given format.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, CodecError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .map_err(|source| CodecError::Encode { format, source })?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    #[test]
    fn png_encode_then_decode_keeps_dimensions() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(7, 3, Rgb([10, 20, 30])));
        let bytes = encode(&image, ImageFormat::Png).unwrap();

        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Png);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (7, 3));
        assert_eq!(decoded.to_rgb8().get_pixel(6, 2), &Rgb([10, 20, 30]));
    }

    #[test]
    fn decodes_jpeg() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 9, Rgb([200, 10, 10])));
        let bytes = encode(&image, ImageFormat::Jpeg).unwrap();
        assert_eq!(decode(&bytes).unwrap().dimensions(), (16, 9));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }
}
