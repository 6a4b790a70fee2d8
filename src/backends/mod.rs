// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for the external capabilities
//!
//! The workflow core never talks to hardware, the desktop or the filesystem
//! directly. It consumes the request/response contracts defined here:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        PermissionGate / CaptureSession       │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌─────────────┐    ┌──────────────────┐   │
//! │  │  Authorizer │    │ CaptureCapability│   │
//! │  │  (portal)   │    │     (V4L2)       │   │
//! │  └─────────────┘    └──────────────────┘   │
//! │  ┌─────────────┐    ┌──────────────────┐   │
//! │  │    Share    │    │     Gallery      │   │
//! │  │  (OpenURI)  │    │  (~/Pictures)    │   │
//! │  └─────────────┘    └──────────────────┘   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: V4L2 device enumeration and still capture
//! - [`portal`]: camera authorization through the desktop portal
//! - [`gallery`]: gallery authorization and persistence
//! - [`share`]: hand-off to the desktop's default handler

pub mod camera;
pub mod gallery;
pub mod portal;
pub mod share;

use crate::errors::{CaptureError, SaveError, ShareError};
use crate::permissions::PermissionStatus;
use crate::session::{CameraFacing, CaptureOptions, CapturedPhoto, SourceHandle};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors raised below the capability contracts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Backend is not available on this system
    #[error("Backend not available: {0}")]
    NotAvailable(String),
    /// Camera device not found
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
    /// Format not supported
    #[error("Format not supported: {0}")]
    FormatNotSupported(String),
    /// D-Bus call or signal failure
    #[error("D-Bus error: {0}")]
    DBus(String),
    /// General I/O error
    #[error("I/O error: {0}")]
    IoError(String),
    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::IoError(err.to_string())
    }
}

impl From<zbus::Error> for BackendError {
    fn from(err: zbus::Error) -> Self {
        BackendError::DBus(err.to_string())
    }
}

/// One authorization request (camera capture or gallery write)
///
/// A request may show a one-time prompt. If the host cannot even ask, the
/// implementation reports `Denied` or an error; both resolve to denied.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn request(&self) -> Result<PermissionStatus, BackendError>;
}

/// Still capture from the device camera
#[async_trait]
pub trait CaptureCapability: Send + Sync {
    /// Make the viewfinder show the camera for `facing`
    async fn start_preview(&self, facing: CameraFacing) -> Result<(), CaptureError>;

    /// Capture one still photo
    async fn capture(
        &self,
        facing: CameraFacing,
        options: CaptureOptions,
    ) -> Result<CapturedPhoto, CaptureError>;
}

/// Platform share flow
#[async_trait]
pub trait ShareCapability: Send + Sync {
    /// Resolves when the share flow is finished, completed or cancelled alike
    async fn share(&self, source: &SourceHandle) -> Result<(), ShareError>;
}

/// Persistent photo library
#[async_trait]
pub trait GalleryCapability: Send + Sync {
    /// Store the photo, returning where it landed
    async fn save(&self, source: &SourceHandle) -> Result<PathBuf, SaveError>;
}

/// The full set of collaborators an application instance runs against
#[derive(Clone)]
pub struct Capabilities {
    pub camera_permission: Arc<dyn Authorizer>,
    pub gallery_permission: Arc<dyn Authorizer>,
    pub camera: Arc<dyn CaptureCapability>,
    pub share: Arc<dyn ShareCapability>,
    pub gallery: Arc<dyn GalleryCapability>,
}

impl Capabilities {
    /// Desktop implementations driven by the configuration
    pub fn desktop(config: &crate::config::Config) -> Self {
        let gallery = Arc::new(gallery::LocalGallery::new(config.gallery_directory()));
        let camera = Arc::new(camera::V4l2Camera::new(config));

        let camera_permission: Arc<dyn Authorizer> = if config.use_portal {
            Arc::new(portal::PortalCameraAuthorizer::new())
        } else {
            Arc::new(portal::DeviceProbeAuthorizer)
        };

        Self {
            camera_permission,
            gallery_permission: gallery.clone(),
            camera,
            share: Arc::new(share::DesktopShare::new(config.use_portal)),
            gallery,
        }
    }
}
