// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the capture and review workflow
//!
//! Each failure kind is local to the transition that triggered it. None of
//! them is fatal: the session either stays where it was or returns to the
//! viewfinder, and the UI shows an inline notification.

use crate::backends::BackendError;
use crate::session::{Control, Operation, SessionState};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Top-level error used by the binary and the CLI commands
#[derive(Debug, Error)]
pub enum AppError {
    /// Camera authorization resolved to anything but granted
    #[error("Permission for camera not granted. Please accept it in settings")]
    CameraPermissionDenied,
    /// Gallery authorization is required for the requested action
    #[error("Permission for the photo gallery not granted")]
    GalleryPermissionDenied,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Share(#[from] ShareError),
    #[error(transparent)]
    Save(#[from] SaveError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Storage/filesystem errors
    #[error("Storage error: {0}")]
    Storage(String),
    /// Terminal or runtime setup errors
    #[error("{0}")]
    Other(String),
}

/// Capture capability rejected the request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// No capture device could serve the requested facing
    #[error("No camera found: {0}")]
    NoCamera(String),
    /// The device refused to stream or deliver a frame
    #[error("Capture failed: {0}")]
    Device(String),
    /// Frame data could not be turned into an image
    #[error("Frame decoding failed: {0}")]
    Decode(String),
    /// JPEG or preview encoding failed
    #[error("Encoding failed: {0}")]
    Encoding(String),
    /// The captured image could not be staged
    #[error("Could not stage photo: {0}")]
    Storage(String),
    /// An inline preview was requested but none came back
    #[error("Capture returned no inline preview")]
    MissingPreview,
}

/// Share capability rejected the request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    #[error("Source photo is no longer available: {0}")]
    MissingSource(String),
    #[error("Share failed: {0}")]
    Failed(String),
}

/// Persistence capability rejected the request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("Source photo is no longer available: {0}")]
    MissingSource(String),
    #[error("Save failed: {0}")]
    Failed(String),
}

/// A transition was requested that the session does not allow right now
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The control is not offered in the current state
    #[error("{action:?} is not available while {state:?}")]
    NotAllowed {
        action: Control,
        state: SessionState,
    },
    /// Another boundary call is still in flight
    #[error("{0:?} is still in progress")]
    Busy(Operation),
    /// A completion arrived for a call that was never started
    #[error("No {0:?} in progress")]
    NotInFlight(Operation),
    /// Save requires gallery permission
    #[error("Saving requires gallery permission")]
    GalleryNotGranted,
    /// A session can only be opened once camera permission is granted
    #[error("Camera permission has not been granted")]
    CameraNotGranted,
}

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<BackendError> for CaptureError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::DeviceNotFound(msg) => CaptureError::NoCamera(msg),
            BackendError::FormatNotSupported(msg) => CaptureError::Decode(msg),
            other => CaptureError::Device(other.to_string()),
        }
    }
}
