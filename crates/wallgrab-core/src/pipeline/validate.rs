//! Payload validation: content-based format detection and header-only decode.

use std::io::Cursor;

use crate::error::ValidationError;
use crate::types::{DownloadTask, ImageFormat, ImageMetadata};

/// Validates fetched bytes as a supported image.
pub struct Validator;

impl Validator {
    /// Validate `bytes` fetched for `task` and derive its metadata.
    ///
    /// Checks:
    /// - Payload is non-empty
    /// - Magic bytes identify JPEG, PNG, WebP or BMP (the URL extension is ignored)
    /// - The header decodes to non-zero dimensions
    ///
    /// Only the image header is parsed; pixel data is never decoded.
    pub fn validate(bytes: &[u8], task: &DownloadTask) -> Result<ImageMetadata, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::EmptyPayload);
        }

        let format = Self::detect_format(bytes)?;

        let reader = image::ImageReader::with_format(Cursor::new(bytes), format.to_image_format());
        let (width, height) =
            reader
                .into_dimensions()
                .map_err(|e| ValidationError::CorruptImage {
                    message: e.to_string(),
                })?;

        if width == 0 || height == 0 {
            return Err(ValidationError::CorruptImage {
                message: format!("zero dimension ({width}x{height})"),
            });
        }

        Ok(ImageMetadata {
            url: task.url.clone(),
            width,
            height,
            byte_size: bytes.len() as u64,
            format,
            hints: task.hints.clone(),
        })
    }

    /// Identify the format from the payload's magic bytes.
    pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ValidationError> {
        if let Some(format) = Self::sniff(bytes) {
            return Ok(format);
        }

        let format = image::guess_format(bytes)
            .ok()
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("unknown");
        Err(ValidationError::UnsupportedFormat {
            format: format.to_string(),
        })
    }

    /// Check if the header bytes match an allowed format.
    fn sniff(header: &[u8]) -> Option<ImageFormat> {
        // JPEG: FF D8 FF
        if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if header.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }

        // WebP: RIFF....WEBP
        if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        // BMP: BM
        if header.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::{bmp_bytes, jpeg_bytes, png_bytes};

    fn task() -> DownloadTask {
        DownloadTask::new("https://example.com/photo.jpg")
    }

    #[test]
    fn test_sniff_jpeg() {
        let header = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(Validator::sniff(&header), Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_sniff_webp() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert_eq!(Validator::sniff(&header), Some(ImageFormat::WebP));
    }

    #[test]
    fn test_sniff_riff_without_webp_rejected() {
        // RIFF container that is not WebP (e.g. WAV)
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'A', b'V', b'E'];
        assert_eq!(Validator::sniff(&header), None);
    }

    #[test]
    fn test_png_dimensions_from_header() {
        let bytes = png_bytes(64, 32, 0);
        let meta = Validator::validate(&bytes, &task()).unwrap();
        assert_eq!(meta.format, ImageFormat::Png);
        assert_eq!((meta.width, meta.height), (64, 32));
        assert_eq!(meta.byte_size, bytes.len() as u64);
        assert_eq!(meta.url, "https://example.com/photo.jpg");
    }

    #[test]
    fn test_format_detected_by_content_not_extension() {
        // URL says .jpg, payload is BMP
        let bytes = bmp_bytes(20, 10);
        let meta = Validator::validate(&bytes, &task()).unwrap();
        assert_eq!(meta.format, ImageFormat::Bmp);
    }

    #[test]
    fn test_jpeg_dimensions() {
        let bytes = jpeg_bytes(48, 24, 7);
        let meta = Validator::validate(&bytes, &task()).unwrap();
        assert_eq!(meta.format, ImageFormat::Jpeg);
        assert_eq!((meta.width, meta.height), (48, 24));
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(
            Validator::validate(&[], &task()),
            Err(ValidationError::EmptyPayload)
        );
    }

    #[test]
    fn test_gif_is_unsupported() {
        let bytes = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";
        let err = Validator::validate(bytes, &task()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedFormat {
                format: "gif".to_string()
            }
        );
    }

    #[test]
    fn test_html_is_unsupported() {
        let err = Validator::validate(b"<!doctype html><html></html>", &task()).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_truncated_png_is_corrupt() {
        let bytes = png_bytes(64, 32, 0);
        let err = Validator::validate(&bytes[..12], &task()).unwrap_err();
        assert!(matches!(err, ValidationError::CorruptImage { .. }));
    }

    #[test]
    fn test_bare_jpeg_magic_is_corrupt() {
        let err = Validator::validate(&[0xFF, 0xD8, 0xFF, 0xE0], &task()).unwrap_err();
        assert!(matches!(err, ValidationError::CorruptImage { .. }));
    }
}
