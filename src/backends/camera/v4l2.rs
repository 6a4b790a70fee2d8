// SPDX-License-Identifier: GPL-3.0-only

//! Direct V4L2 access for device enumeration and still capture
//!
//! Stills are grabbed with the v4l crate through a short-lived mmap stream:
//! open, negotiate the largest frame size, drop a few warm-up frames, keep
//! the next complete frame, close.

use super::types::{CameraDevice, CameraFormat, CameraFrame, PixelFormat};
use crate::backends::{BackendError, BackendResult};
use crate::constants;
use crate::session::CameraFacing;
use std::sync::Arc;
use tracing::{debug, info, warn};
use v4l::buffer::{Flags as BufferFlags, Type};
use v4l::capability::Flags;
use v4l::framesize::FrameSizeEnum;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;
use v4l::FourCC;

/// Guess which way a camera faces from its card name
pub fn infer_location(name: &str) -> Option<CameraFacing> {
    let name = name.to_ascii_lowercase();
    if ["back", "rear", "world"].iter().any(|k| name.contains(k)) {
        Some(CameraFacing::Back)
    } else if ["front", "user", "integrated", "webcam", "facetime"]
        .iter()
        .any(|k| name.contains(k))
    {
        Some(CameraFacing::Front)
    } else {
        None
    }
}

/// Enumerate V4L2 nodes that can capture video
pub fn enumerate_cameras() -> Vec<CameraDevice> {
    let mut nodes = v4l::context::enum_devices();
    nodes.sort_by_key(|node| node.index());

    let mut cameras = Vec::new();
    for node in nodes {
        let path = node.path().to_string_lossy().to_string();

        let Ok(dev) = Device::with_path(node.path()) else {
            debug!(path = %path, "Cannot open V4L2 node, skipping");
            continue;
        };
        let Ok(caps) = dev.query_caps() else {
            continue;
        };

        // Metadata nodes share the card name but cannot capture
        if !caps.capabilities.contains(Flags::VIDEO_CAPTURE) {
            debug!(path = %path, "Not a capture node, skipping");
            continue;
        }

        let has_still_format = dev
            .enum_formats()
            .map(|formats| {
                formats
                    .iter()
                    .any(|f| PixelFormat::from_fourcc(&f.fourcc.repr).is_some())
            })
            .unwrap_or(false);
        if !has_still_format {
            debug!(path = %path, card = %caps.card, "No supported pixel format, skipping");
            continue;
        }

        cameras.push(CameraDevice {
            location: infer_location(&caps.card),
            name: caps.card,
            path,
            driver: caps.driver,
            bus_info: caps.bus,
        });
    }

    info!(count = cameras.len(), "Enumerated V4L2 cameras");
    cameras
}

/// Choose the device serving `facing`
///
/// A pinned path wins if present, then a device whose inferred location
/// matches, then one with unknown location, then whatever exists. A machine
/// with a single camera serves both facings with it.
pub fn select_device<'a>(
    devices: &'a [CameraDevice],
    facing: CameraFacing,
    pinned: Option<&str>,
) -> Option<&'a CameraDevice> {
    if let Some(pinned) = pinned {
        if let Some(device) = devices.iter().find(|d| d.path == pinned) {
            return Some(device);
        }
        warn!(path = pinned, %facing, "Pinned camera not found, falling back");
    }

    devices
        .iter()
        .find(|d| d.location == Some(facing))
        .or_else(|| devices.iter().find(|d| d.location.is_none()))
        .or_else(|| devices.first())
}

/// Pick the largest frame size, breaking ties by pixel format preference
pub fn select_still_format(candidates: &[CameraFormat]) -> Option<CameraFormat> {
    let rank = |f: &CameraFormat| {
        PixelFormat::PREFERRED
            .iter()
            .position(|p| *p == f.pixel_format)
            .unwrap_or(usize::MAX)
    };

    candidates
        .iter()
        .copied()
        .max_by(|a, b| a.pixels().cmp(&b.pixels()).then(rank(b).cmp(&rank(a))))
}

/// List the still-capable formats of an open device
fn still_formats(dev: &Device) -> BackendResult<Vec<CameraFormat>> {
    let mut formats = Vec::new();

    for pixel_format in PixelFormat::PREFERRED {
        let fourcc = FourCC::new(&pixel_format.fourcc());
        let Ok(sizes) = dev.enum_framesizes(fourcc) else {
            continue;
        };

        for size in sizes {
            let (width, height) = match size.size {
                FrameSizeEnum::Discrete(discrete) => (discrete.width, discrete.height),
                FrameSizeEnum::Stepwise(step) => (step.max_width, step.max_height),
            };
            formats.push(CameraFormat {
                width,
                height,
                pixel_format,
            });
        }
    }

    Ok(formats)
}

/// Still-capable formats of `device`, largest first
pub fn device_formats(device: &CameraDevice) -> BackendResult<Vec<CameraFormat>> {
    let dev = Device::with_path(&device.path).map_err(|e| {
        BackendError::DeviceNotFound(format!("Failed to open {}: {}", device.path, e))
    })?;

    let mut formats = still_formats(&dev)?;
    formats.sort_by(|a, b| b.pixels().cmp(&a.pixels()));
    formats.dedup_by_key(|f| (f.width, f.height));
    Ok(formats)
}

/// Grab one still frame at the highest resolution the device offers
///
/// Blocking; run it on the blocking pool.
pub fn grab_still(device: &CameraDevice, warmup_frames: u32) -> BackendResult<CameraFrame> {
    info!(device = %device, "Opening V4L2 device for still capture");

    let mut dev = Device::with_path(&device.path).map_err(|e| {
        BackendError::DeviceNotFound(format!("Failed to open {}: {}", device.path, e))
    })?;

    let wanted = select_still_format(&still_formats(&dev)?).ok_or_else(|| {
        BackendError::FormatNotSupported(format!("{} offers no MJPG/YUYV/RGB format", device.name))
    })?;

    let mut format = dev.format()?;
    format.width = wanted.width;
    format.height = wanted.height;
    format.fourcc = FourCC::new(&wanted.pixel_format.fourcc());

    let applied = dev.set_format(&format)?;
    let pixel_format = PixelFormat::from_fourcc(&applied.fourcc.repr).ok_or_else(|| {
        BackendError::FormatNotSupported(format!("Device switched to {}", applied.fourcc))
    })?;
    if applied.width != wanted.width || applied.height != wanted.height {
        warn!(
            wanted = %wanted,
            width = applied.width,
            height = applied.height,
            "Device adjusted the requested frame size"
        );
    }
    info!(
        width = applied.width,
        height = applied.height,
        format = %pixel_format,
        "Set V4L2 format"
    );

    let mut stream = MmapStream::with_buffers(&mut dev, Type::VideoCapture, constants::V4L2_BUFFER_COUNT)
        .map_err(|e| BackendError::Other(format!("Failed to create buffer stream: {}", e)))?;

    for n in 0..warmup_frames {
        if let Err(e) = stream.next() {
            warn!(frame = n, error = %e, "Warm-up frame failed");
        }
    }

    let minimum = pixel_format.min_frame_bytes(applied.width, applied.height, applied.stride);
    let mut data: Option<Arc<[u8]>> = None;

    for attempt in 0..constants::STILL_GRAB_ATTEMPTS {
        let (buf, meta) = match stream.next() {
            Ok(next) => next,
            Err(e) => {
                warn!(attempt, error = %e, "Still frame failed");
                continue;
            }
        };

        match usable_length(meta.bytesused, meta.flags, buf.len(), minimum) {
            Some(used) => {
                debug!(sequence = meta.sequence, bytes = used, "Still frame captured");
                data = Some(Arc::from(&buf[..used]));
                break;
            }
            None => warn!(
                attempt,
                bytesused = meta.bytesused,
                flags = ?meta.flags,
                "Skipping unusable frame"
            ),
        }
    }

    let data = data.ok_or_else(|| {
        BackendError::Other(format!(
            "No usable frame from {} after {} attempts",
            device.name,
            constants::STILL_GRAB_ATTEMPTS
        ))
    })?;

    Ok(CameraFrame {
        width: applied.width,
        height: applied.height,
        data,
        format: pixel_format,
        stride: applied.stride,
    })
}

/// Bytes of a dequeued buffer that hold a complete frame
///
/// `None` for buffers the driver flagged as corrupt, empty buffers, and
/// payloads shorter than `minimum`.
pub fn usable_length(
    bytesused: u32,
    flags: BufferFlags,
    buffer_len: usize,
    minimum: usize,
) -> Option<usize> {
    if flags.contains(BufferFlags::ERROR) {
        return None;
    }

    let used = (bytesused as usize).min(buffer_len);
    if used == 0 || used < minimum {
        return None;
    }
    Some(used)
}
