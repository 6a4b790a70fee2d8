// SPDX-License-Identifier: MPL-2.0

//! Async photo pipeline
//!
//! Turns a decoded camera frame into the photo the review screen holds:
//!
//! ```text
//! RGB frame → JPEG (requested quality) → staged file  = source handle
//!           ↘ downscale → JPEG → base64               = inline preview
//! ```
//!
//! Encoding runs on the blocking pool; staging is async file I/O.

pub mod encoding;

pub use encoding::EncodingQuality;

use crate::errors::CaptureError;
use crate::session::{CaptureOptions, CapturedPhoto, PhotoMetadata};
use crate::storage;
use image::RgbImage;
use std::path::PathBuf;
use tracing::{debug, info};

/// Capture post-processing pipeline
#[derive(Debug, Clone)]
pub struct PhotoPipeline {
    staging_dir: PathBuf,
    preview_max_edge: u32,
}

impl PhotoPipeline {
    pub fn new(staging_dir: PathBuf, preview_max_edge: u32) -> Self {
        Self {
            staging_dir,
            preview_max_edge,
        }
    }

    /// Encode and stage a captured image
    ///
    /// `metadata` is only attached when the options ask for it.
    pub async fn process(
        &self,
        image: RgbImage,
        options: CaptureOptions,
        metadata: Option<PhotoMetadata>,
    ) -> Result<CapturedPhoto, CaptureError> {
        let (width, height) = image.dimensions();
        let max_edge = self.preview_max_edge;

        let (jpeg, preview) = tokio::task::spawn_blocking(move || {
            let jpeg = encoding::encode_jpeg(&image, options.quality.jpeg_quality())?;
            let preview = if options.inline_preview {
                Some(encoding::encode_preview(&image, max_edge)?)
            } else {
                None
            };
            Ok::<_, CaptureError>((jpeg, preview))
        })
        .await
        .map_err(|e| CaptureError::Encoding(format!("Encode task error: {}", e)))??;

        debug!(width, height, bytes = jpeg.len(), "Photo encoded");

        let source = storage::stage_photo(&self.staging_dir, &jpeg)
            .await
            .map_err(|e| CaptureError::Storage(e.to_string()))?;

        info!(source = %source, "Photo staged");

        Ok(CapturedPhoto {
            source,
            preview,
            width,
            height,
            metadata: if options.include_metadata {
                metadata
            } else {
                None
            },
        })
    }
}
