// SPDX-License-Identifier: GPL-3.0-only

//! Local photo gallery
//!
//! The gallery is a folder under the user's pictures directory. Write
//! permission means the folder exists (or can be created) and is writable.

use crate::backends::{Authorizer, BackendError, GalleryCapability};
use crate::errors::SaveError;
use crate::permissions::PermissionStatus;
use crate::session::SourceHandle;
use crate::storage;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Gallery folder on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalGallery {
    directory: PathBuf,
}

impl LocalGallery {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn check_writable(directory: &Path) -> Result<PermissionStatus, BackendError> {
        match std::fs::create_dir_all(directory) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                debug!(path = %directory.display(), "Gallery folder cannot be created");
                return Ok(PermissionStatus::Denied);
            }
            Err(e) => return Err(e.into()),
        }

        let metadata = std::fs::metadata(directory)?;
        if !metadata.is_dir() || metadata.permissions().readonly() {
            return Ok(PermissionStatus::Denied);
        }

        // Mode bits can lie (ACLs, read-only mounts); try an actual write
        let probe = directory.join(format!(".quickshot-probe-{}", uuid::Uuid::new_v4().simple()));
        match std::fs::write(&probe, b"") {
            Ok(()) => {
                let _ = std::fs::remove_file(&probe);
                Ok(PermissionStatus::Granted)
            }
            Err(e) if e.kind() == ErrorKind::PermissionDenied || e.kind() == ErrorKind::ReadOnlyFilesystem => {
                Ok(PermissionStatus::Denied)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Authorizer for LocalGallery {
    fn name(&self) -> &'static str {
        "gallery"
    }

    async fn request(&self) -> Result<PermissionStatus, BackendError> {
        let directory = self.directory.clone();
        let status = tokio::task::spawn_blocking(move || Self::check_writable(&directory))
            .await
            .map_err(|e| BackendError::Other(format!("Gallery check task error: {}", e)))??;

        info!(path = %self.directory.display(), ?status, "Gallery permission checked");
        Ok(status)
    }
}

#[async_trait]
impl GalleryCapability for LocalGallery {
    async fn save(&self, source: &SourceHandle) -> Result<PathBuf, SaveError> {
        if !tokio::fs::try_exists(source.path()).await.unwrap_or(false) {
            return Err(SaveError::MissingSource(source.to_string()));
        }

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| SaveError::Failed(format!("Failed to create gallery folder: {}", e)))?;

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let destination = storage::unique_gallery_path(&self.directory, &timestamp);

        info!(source = %source, path = %destination.display(), "Saving photo");

        tokio::fs::copy(source.path(), &destination)
            .await
            .map_err(|e| SaveError::Failed(format!("Failed to save photo: {}", e)))?;

        info!(path = %destination.display(), "Photo saved successfully");
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gallery_permission_creates_folder() {
        let root = tempfile::tempdir().unwrap();
        let gallery = LocalGallery::new(root.path().join("Pictures").join("Camera"));

        assert_eq!(gallery.request().await, Ok(PermissionStatus::Granted));
        assert!(gallery.directory().is_dir());
        // The write probe leaves nothing behind
        assert_eq!(std::fs::read_dir(gallery.directory()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_save_copies_into_gallery() {
        let root = tempfile::tempdir().unwrap();
        let staged = root.path().join("capture_1.jpg");
        std::fs::write(&staged, b"jpeg").unwrap();
        let gallery = LocalGallery::new(root.path().join("Camera"));

        let saved = gallery.save(&SourceHandle::new(&staged)).await.unwrap();

        assert!(saved.starts_with(gallery.directory()));
        assert_eq!(std::fs::read(&saved).unwrap(), b"jpeg");
        // The handle is not consumed by the gallery
        assert!(staged.exists());
    }

    #[tokio::test]
    async fn test_save_missing_source() {
        let root = tempfile::tempdir().unwrap();
        let gallery = LocalGallery::new(root.path().join("Camera"));
        let missing = SourceHandle::new(root.path().join("gone.jpg"));

        assert!(matches!(
            gallery.save(&missing).await,
            Err(SaveError::MissingSource(_))
        ));
    }
}
