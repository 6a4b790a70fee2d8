// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for staged captures and gallery files

use crate::constants;
use crate::session::{EncodedPreview, SourceHandle};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Per-user cache directory of the application
pub fn cache_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(constants::APP_NAME)
}

/// Directory captured photos are staged in before share/save
pub fn staging_directory() -> PathBuf {
    cache_directory().join("captures")
}

/// Write an encoded photo into the staging directory
pub async fn stage_photo(staging_dir: &Path, jpeg: &[u8]) -> io::Result<SourceHandle> {
    tokio::fs::create_dir_all(staging_dir).await?;

    let filename = format!(
        "{}{}.jpg",
        constants::STAGED_PREFIX,
        uuid::Uuid::new_v4().simple()
    );
    let path = staging_dir.join(filename);
    tokio::fs::write(&path, jpeg).await?;

    debug!(path = %path.display(), bytes = jpeg.len(), "Staged photo written");
    Ok(SourceHandle::new(path))
}

/// Cutoff for [`prune_staging`]: staged files older than this are abandoned
///
/// Another running instance may still be reviewing a recent capture.
pub fn staging_cutoff() -> SystemTime {
    SystemTime::now()
        .checked_sub(constants::STAGING_MAX_AGE)
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Remove staged captures last modified before `cutoff`
///
/// Returns how many files were removed.
pub fn prune_staging(staging_dir: &Path, cutoff: SystemTime) -> usize {
    let Ok(entries) = std::fs::read_dir(staging_dir) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let is_staged = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(constants::STAGED_PREFIX))
            .unwrap_or(false);

        if !is_staged {
            continue;
        }

        let modified = entry.metadata().and_then(|m| m.modified());
        match modified {
            Ok(modified) if modified < cutoff => {}
            Ok(_) => continue,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No modification time, keeping");
                continue;
            }
        }

        match std::fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove staged photo"),
        }
    }

    if removed > 0 {
        info!(removed, "Pruned stale staged photos");
    }
    removed
}

/// Pick a gallery filename that does not exist yet
///
/// `IMG_<timestamp>.jpg`, then `IMG_<timestamp>_1.jpg` and so on.
pub fn unique_gallery_path(dir: &Path, timestamp: &str) -> PathBuf {
    let base = format!("{}{}", constants::GALLERY_PREFIX, timestamp);
    let candidate = dir.join(format!("{}.jpg", base));
    if !candidate.exists() {
        return candidate;
    }

    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{}_{}.jpg", base, n));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Decode an inline preview for on-screen rendering
pub fn decode_preview(preview: &EncodedPreview) -> Result<image::RgbImage, String> {
    let bytes = preview
        .bytes()
        .map_err(|e| format!("Invalid preview encoding: {}", e))?;
    let img = image::load_from_memory(&bytes).map_err(|e| format!("Invalid preview image: {}", e))?;
    Ok(img.to_rgb8())
}
