// SPDX-License-Identifier: MPL-2.0

//! Camera backend
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   CaptureSession    │
//! └──────────┬──────────┘
//!            │ CaptureCapability
//!            ▼
//! ┌─────────────────────┐
//! │     V4l2Camera      │  ← facing → device, blocking grab
//! └──────────┬──────────┘
//!            │ CameraFrame
//!            ▼
//! ┌─────────────────────┐
//! │    PhotoPipeline    │  ← JPEG, staging, inline preview
//! └─────────────────────┘
//! ```

pub mod format_converters;
pub mod types;
pub mod v4l2;

pub use types::*;

use crate::backends::CaptureCapability;
use crate::config::Config;
use crate::errors::CaptureError;
use crate::pipelines::photo::PhotoPipeline;
use crate::session::{CameraFacing, CaptureOptions, CapturedPhoto, PhotoMetadata};
use crate::storage;
use async_trait::async_trait;
use tracing::{debug, info};

/// Capture capability backed by V4L2 devices
#[derive(Debug, Clone)]
pub struct V4l2Camera {
    front_device: Option<String>,
    back_device: Option<String>,
    warmup_frames: u32,
    pipeline: PhotoPipeline,
}

impl V4l2Camera {
    pub fn new(config: &Config) -> Self {
        Self {
            front_device: config.front_device.clone(),
            back_device: config.back_device.clone(),
            warmup_frames: config.warmup_frames,
            pipeline: PhotoPipeline::new(storage::staging_directory(), config.preview_max_edge),
        }
    }

    fn pinned(&self, facing: CameraFacing) -> Option<&str> {
        match facing {
            CameraFacing::Front => self.front_device.as_deref(),
            CameraFacing::Back => self.back_device.as_deref(),
        }
    }

    /// Resolve the device for `facing` (blocking: touches device nodes)
    fn resolve_device(
        facing: CameraFacing,
        pinned: Option<String>,
    ) -> Result<CameraDevice, CaptureError> {
        let devices = v4l2::enumerate_cameras();
        v4l2::select_device(&devices, facing, pinned.as_deref())
            .cloned()
            .ok_or_else(|| CaptureError::NoCamera(format!("no capture device for {} camera", facing)))
    }
}

#[async_trait]
impl CaptureCapability for V4l2Camera {
    async fn start_preview(&self, facing: CameraFacing) -> Result<(), CaptureError> {
        let pinned = self.pinned(facing).map(str::to_string);
        let device = tokio::task::spawn_blocking(move || Self::resolve_device(facing, pinned))
            .await
            .map_err(|e| CaptureError::Device(format!("Preview task error: {}", e)))??;

        info!(%facing, device = %device, "Viewfinder camera selected");
        Ok(())
    }

    async fn capture(
        &self,
        facing: CameraFacing,
        options: CaptureOptions,
    ) -> Result<CapturedPhoto, CaptureError> {
        let pinned = self.pinned(facing).map(str::to_string);
        let warmup = self.warmup_frames;

        let (device, image) = tokio::task::spawn_blocking(move || {
            let device = Self::resolve_device(facing, pinned)?;
            let frame = v4l2::grab_still(&device, warmup)?;
            debug!(
                width = frame.width,
                height = frame.height,
                format = %frame.format,
                "Frame captured from device"
            );
            let image = format_converters::frame_to_rgb(&frame)?;
            Ok::<_, CaptureError>((device, image))
        })
        .await
        .map_err(|e| CaptureError::Device(format!("Capture task error: {}", e)))??;

        let metadata = PhotoMetadata {
            device: device.name.clone(),
            facing,
            captured_at: chrono::Local::now(),
        };

        self.pipeline.process(image, options, Some(metadata)).await
    }
}
