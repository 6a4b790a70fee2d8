// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::backends::Capabilities;
use crate::errors::{CaptureError, SaveError, ShareError};
use crate::permissions::{PermissionGate, PermissionState};
use crate::session::{CameraFacing, CaptureSession, CapturedPhoto, Control};
use std::path::PathBuf;

/// Main application state
///
/// Owns the permission gate and, once the camera is granted, the capture
/// session built from the gate's result.
pub struct AppModel {
    pub(crate) capabilities: Capabilities,
    pub(crate) gate: PermissionGate,
    pub(crate) session: Option<CaptureSession>,
    pub(crate) notification: Option<Notification>,
}

/// Messages handled by [`AppModel::update`]
///
/// User input and completions of background boundary calls.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Permissions =====
    RequestPermissions,
    PermissionsResolved(PermissionState),

    // ===== Live =====
    ToggleFacing,
    PreviewStarted(CameraFacing, Result<(), CaptureError>),
    Capture,
    Captured(Result<CapturedPhoto, CaptureError>),

    // ===== Reviewing =====
    Share,
    Shared(Result<(), ShareError>),
    Save,
    Saved(Result<PathBuf, SaveError>),
    Discard,

    // ===== UI =====
    DismissNotification,
}

impl Message {
    /// Message triggered by a control
    pub fn for_control(control: Control) -> Self {
        match control {
            Control::ToggleFacing => Message::ToggleFacing,
            Control::Capture => Message::Capture,
            Control::Share => Message::Share,
            Control::Save => Message::Save,
            Control::Discard => Message::Discard,
        }
    }
}

/// Severity of an inline notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// Inline message shown over the current screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// What the UI should render
#[derive(Debug, Clone, PartialEq)]
pub enum Screen<'a> {
    /// Permission requests outstanding
    ResolvingPermissions,
    /// Camera denied; nothing else is reachable for this session
    CameraDenied,
    /// Viewfinder
    Live {
        facing: CameraFacing,
        controls: Vec<Control>,
        busy: bool,
    },
    /// Reviewing a captured photo
    Reviewing {
        photo: &'a CapturedPhoto,
        controls: Vec<Control>,
        busy: bool,
    },
}

impl Screen<'_> {
    /// Controls offered on this screen
    pub fn controls(&self) -> &[Control] {
        match self {
            Screen::ResolvingPermissions | Screen::CameraDenied => &[],
            Screen::Live { controls, .. } | Screen::Reviewing { controls, .. } => controls,
        }
    }

    pub fn offers(&self, control: Control) -> bool {
        self.controls().contains(&control)
    }
}
