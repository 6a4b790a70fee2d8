// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for the camera backend

use crate::session::CameraFacing;
use std::fmt;
use std::sync::Arc;

/// A V4L2 capture node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    /// Card name reported by the driver (e.g., "Integrated Camera")
    pub name: String,
    /// Device node (e.g., "/dev/video0")
    pub path: String,
    /// Driver name (e.g., "uvcvideo")
    pub driver: String,
    /// Bus the device sits on (e.g., "usb-0000:00:14.0-6")
    pub bus_info: String,
    /// Facing inferred from the name, if any
    pub location: Option<CameraFacing>,
}

impl fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path)
    }
}

/// Pixel formats the still grabber understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Motion-JPEG, each buffer is a complete JPEG
    MJPG,
    /// Packed YUV 4:2:2: Y0 U Y1 V
    YUYV,
    /// Packed RGB, 3 bytes per pixel
    RGB24,
}

impl PixelFormat {
    /// Preference order for stills
    pub const PREFERRED: [PixelFormat; 3] = [PixelFormat::MJPG, PixelFormat::YUYV, PixelFormat::RGB24];

    pub fn fourcc(&self) -> [u8; 4] {
        match self {
            PixelFormat::MJPG => *b"MJPG",
            PixelFormat::YUYV => *b"YUYV",
            PixelFormat::RGB24 => *b"RGB3",
        }
    }

    pub fn from_fourcc(fourcc: &[u8; 4]) -> Option<Self> {
        Self::PREFERRED.into_iter().find(|f| &f.fourcc() == fourcc)
    }

    /// Smallest payload that can hold a whole frame
    ///
    /// MJPG is compressed, so any non-empty payload qualifies.
    pub fn min_frame_bytes(&self, width: u32, height: u32, stride: u32) -> usize {
        let bytes_per_pixel = match self {
            PixelFormat::MJPG => return 1,
            PixelFormat::YUYV => 2,
            PixelFormat::RGB24 => 3,
        };
        if height == 0 {
            return 0;
        }
        let row = width as usize * bytes_per_pixel;
        let stride = (stride as usize).max(row);
        stride * (height as usize - 1) + row
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.fourcc()))
    }
}

/// Still capture format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
}

impl CameraFormat {
    pub fn pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for CameraFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.pixel_format)
    }
}

/// A single frame as delivered by the device
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// Bytes per row (unused for MJPG)
    pub stride: u32,
}
