// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Name used for config, cache and log directories
pub const APP_NAME: &str = "quickshot";

/// Default folder name for saving photos
pub const DEFAULT_SAVE_FOLDER: &str = "Camera";

/// Longest edge of the inline review preview
pub const PREVIEW_MAX_EDGE: u32 = 320;

/// Frames to drop before keeping a still (auto exposure settles meanwhile)
pub const WARMUP_FRAMES: u32 = 5;

/// Number of mmap buffers requested from V4L2
pub const V4L2_BUFFER_COUNT: u32 = 4;

/// Dequeues tried for the still itself before giving up
pub const STILL_GRAB_ATTEMPTS: u32 = 5;

/// MIME type of staged photos and previews
pub const JPEG_MIME: &str = "image/jpeg";

/// Staged captures older than this are pruned at startup
pub const STAGING_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Prefix of staged capture files
pub const STAGED_PREFIX: &str = "capture_";

/// Prefix of photos saved to the gallery
pub const GALLERY_PREFIX: &str = "IMG_";

/// Terminal UI input poll interval in milliseconds
pub const UI_POLL_MS: u64 = 16;

/// Log file written by the terminal UI, inside the cache directory
pub const LOG_FILE_NAME: &str = "quickshot.log";
