// SPDX-License-Identifier: GPL-3.0-only

//! Pixel format conversion for still capture
//!
//! Everything ends up as an 8-bit RGB image for the photo pipeline.

use super::types::{CameraFrame, PixelFormat};
use crate::errors::CaptureError;
use image::RgbImage;

/// Convert YUV (BT.601) to RGB
pub fn yuv_to_rgb(y: u8, u: u8, v: u8) -> (u8, u8, u8) {
    let y = y as f32;
    let u = u as f32 - 128.0;
    let v = v as f32 - 128.0;

    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344136 * u - 0.714136 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

    (r, g, b)
}

/// Convert YUYV (YUV 4:2:2) to packed RGB
///
/// YUYV format: Y0 U Y1 V - each 4-byte group encodes 2 pixels.
pub fn yuyv_to_rgb(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;
    let stride = (stride as usize).max(w * 2);
    let mut rgb = Vec::with_capacity(w * h * 3);

    for row in 0..h {
        let start = row * stride;
        let Some(line) = data.get(start..start + w * 2) else {
            // Short buffer: pad the remaining rows with black
            rgb.resize(w * h * 3, 0);
            break;
        };

        for chunk in line.chunks_exact(4) {
            let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
            for y in [y0, y1] {
                let (r, g, b) = yuv_to_rgb(y, u, v);
                rgb.extend_from_slice(&[r, g, b]);
            }
        }
        // Odd widths leave one pixel without a full group
        rgb.resize((row + 1) * w * 3, 0);
    }

    rgb
}

/// Decode a device frame into an RGB image
pub fn frame_to_rgb(frame: &CameraFrame) -> Result<RgbImage, CaptureError> {
    let needed = frame
        .format
        .min_frame_bytes(frame.width, frame.height, frame.stride);
    if frame.data.len() < needed {
        return Err(CaptureError::Decode(format!(
            "{} frame truncated: {} of {} bytes",
            frame.format,
            frame.data.len(),
            needed
        )));
    }

    match frame.format {
        PixelFormat::MJPG => {
            let img = image::load_from_memory_with_format(&frame.data, image::ImageFormat::Jpeg)
                .map_err(|e| CaptureError::Decode(format!("MJPG frame: {}", e)))?;
            Ok(img.to_rgb8())
        }
        PixelFormat::YUYV => {
            let rgb = yuyv_to_rgb(&frame.data, frame.width, frame.height, frame.stride);
            RgbImage::from_raw(frame.width, frame.height, rgb)
                .ok_or_else(|| CaptureError::Decode("YUYV frame size mismatch".to_string()))
        }
        PixelFormat::RGB24 => {
            let row = frame.width as usize * 3;
            let stride = (frame.stride as usize).max(row);
            let mut rgb = Vec::with_capacity(row * frame.height as usize);
            for line in frame.data.chunks(stride).take(frame.height as usize) {
                rgb.extend_from_slice(&line[..row.min(line.len())]);
            }
            RgbImage::from_raw(frame.width, frame.height, rgb)
                .ok_or_else(|| CaptureError::Decode("RGB24 frame size mismatch".to_string()))
        }
    }
}
