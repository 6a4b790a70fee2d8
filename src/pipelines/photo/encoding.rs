// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! Full-size stills are written as JPEG at the requested quality. The inline
//! review preview is a downscaled JPEG carried as base64 text.

use crate::constants;
use crate::errors::CaptureError;
use crate::session::EncodedPreview;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbImage;
use image::imageops::FilterType;
use tracing::debug;

/// Encoding quality settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingQuality {
    /// Medium quality (balanced), used for inline previews
    Medium,
    /// Maximum quality (minimal compression)
    Maximum,
}

impl EncodingQuality {
    /// Get JPEG quality value (0-100)
    pub fn jpeg_quality(&self) -> u8 {
        match self {
            EncodingQuality::Medium => 80,
            EncodingQuality::Maximum => 100,
        }
    }
}

/// Encode image as JPEG
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    {
        let mut cursor = std::io::Cursor::new(&mut buffer);
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);

        encoder
            .encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| CaptureError::Encoding(format!("JPEG encoding failed: {}", e)))?;
    }

    Ok(buffer)
}

/// Size that fits within `max_edge` keeping the aspect ratio
///
/// Never upscales, never returns a zero dimension.
pub fn preview_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_edge || longest == 0 {
        return (width.max(1), height.max(1));
    }

    let scale = max_edge as f64 / longest as f64;
    let w = ((width as f64 * scale).round() as u32).max(1);
    let h = ((height as f64 * scale).round() as u32).max(1);
    (w, h)
}

/// Build the inline preview for a captured image
pub fn encode_preview(image: &RgbImage, max_edge: u32) -> Result<EncodedPreview, CaptureError> {
    let (width, height) = preview_dimensions(image.width(), image.height(), max_edge);

    let jpeg = if (width, height) == image.dimensions() {
        encode_jpeg(image, EncodingQuality::Medium.jpeg_quality())?
    } else {
        let scaled = image::imageops::resize(image, width, height, FilterType::Triangle);
        encode_jpeg(&scaled, EncodingQuality::Medium.jpeg_quality())?
    };

    debug!(width, height, bytes = jpeg.len(), "Inline preview encoded");

    Ok(EncodedPreview {
        mime: constants::JPEG_MIME.to_string(),
        data: STANDARD.encode(&jpeg),
        width,
        height,
    })
}
