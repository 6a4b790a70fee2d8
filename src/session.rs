// SPDX-License-Identifier: GPL-3.0-only

//! Capture and review workflow
//!
//! The session cycles between two states for as long as it lives:
//!
//! ```text
//!        toggle facing
//!          ┌──────┐
//!          ▼      │
//!      ┌────────────┐   capture ok    ┌─────────────┐
//!      │    Live    │ ──────────────► │  Reviewing  │
//!      └────────────┘ ◄────────────── └─────────────┘
//!                      share / save / discard
//! ```
//!
//! Each boundary call is split into `begin_*` and `finish_*` so a UI loop can
//! run the call in the background while the session refuses every other
//! transition. The awaited helpers ([`CaptureSession::capture`],
//! [`CaptureSession::share`], [`CaptureSession::save`]) wrap both halves for
//! callers that can simply wait.

use crate::backends::{CaptureCapability, GalleryCapability, ShareCapability};
use crate::errors::{AppResult, CaptureError, SaveError, SessionError, ShareError};
use crate::permissions::PermissionState;
use crate::pipelines::photo::EncodingQuality;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Direction the active camera faces
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    /// User-facing camera
    Front,
    /// World-facing camera
    #[default]
    Back,
}

impl CameraFacing {
    pub fn toggled(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CameraFacing::Front => "front",
            CameraFacing::Back => "back",
        }
    }
}

impl fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraFacing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" | "user" => Ok(CameraFacing::Front),
            "back" | "rear" | "world" => Ok(CameraFacing::Back),
            other => Err(format!("unknown camera facing '{}'", other)),
        }
    }
}

/// Options handed to the capture capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureOptions {
    pub quality: EncodingQuality,
    /// Return a self-contained preview alongside the source handle
    pub inline_preview: bool,
    /// Attach device and timing metadata to the photo
    pub include_metadata: bool,
}

impl CaptureOptions {
    /// Options used by the review workflow
    pub const REVIEW: CaptureOptions = CaptureOptions {
        quality: EncodingQuality::Maximum,
        inline_preview: true,
        include_metadata: false,
    };
}

/// Opaque reference to the captured image resource
///
/// Share and save consume the handle; the session never copies or deletes
/// the file behind it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceHandle(PathBuf);

impl SourceHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Inline, base64-encoded image suitable for immediate display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPreview {
    /// MIME type of the encoded bytes
    pub mime: String,
    /// Base64 (standard alphabet) payload
    pub data: String,
    pub width: u32,
    pub height: u32,
}

impl EncodedPreview {
    /// `data:` URI for renderers that accept one directly
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.data)
    }

    /// Raw encoded image bytes
    pub fn bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.data)
    }
}

/// Metadata attached when `include_metadata` is requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoMetadata {
    pub device: String,
    pub facing: CameraFacing,
    pub captured_at: chrono::DateTime<chrono::Local>,
}

/// The photo held while reviewing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    pub source: SourceHandle,
    pub preview: Option<EncodedPreview>,
    pub width: u32,
    pub height: u32,
    pub metadata: Option<PhotoMetadata>,
}

/// Observable workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Viewfinder active, no photo held
    Live,
    /// Photo held, waiting for share, save or discard
    Reviewing,
}

/// User-facing controls a UI may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    ToggleFacing,
    Capture,
    Share,
    Save,
    Discard,
}

/// Boundary call currently suspended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Capture,
    Share,
    Save,
}

/// Parameters for a capture that has been started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRequest {
    pub facing: CameraFacing,
    pub options: CaptureOptions,
}

#[derive(Debug)]
enum Stage {
    Live,
    Reviewing { photo: CapturedPhoto },
}

/// Capture/review state machine
///
/// Owns the camera facing and the single captured-photo slot. The slot only
/// exists inside the reviewing stage, so leaving that stage always drops it.
#[derive(Debug)]
pub struct CaptureSession {
    facing: CameraFacing,
    stage: Stage,
    gallery_granted: bool,
    in_flight: Option<Operation>,
}

impl CaptureSession {
    /// Open a session from resolved permissions
    ///
    /// Fails unless camera permission resolved to granted.
    pub fn new(permissions: &PermissionState) -> Result<Self, SessionError> {
        if !permissions.camera.is_granted() {
            return Err(SessionError::CameraNotGranted);
        }

        info!(
            gallery_granted = permissions.gallery.is_granted(),
            "Capture session opened"
        );

        Ok(Self {
            facing: CameraFacing::default(),
            stage: Stage::Live,
            gallery_granted: permissions.gallery.is_granted(),
            in_flight: None,
        })
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn state(&self) -> SessionState {
        match self.stage {
            Stage::Live => SessionState::Live,
            Stage::Reviewing { .. } => SessionState::Reviewing,
        }
    }

    /// Photo under review, if any
    pub fn photo(&self) -> Option<&CapturedPhoto> {
        match &self.stage {
            Stage::Live => None,
            Stage::Reviewing { photo } => Some(photo),
        }
    }

    pub fn gallery_granted(&self) -> bool {
        self.gallery_granted
    }

    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Controls a UI should render right now
    ///
    /// Empty while a boundary call is in flight.
    pub fn controls(&self) -> Vec<Control> {
        if self.is_busy() {
            return Vec::new();
        }

        match self.stage {
            Stage::Live => vec![Control::ToggleFacing, Control::Capture],
            Stage::Reviewing { .. } => {
                let mut controls = vec![Control::Share];
                if self.gallery_granted {
                    controls.push(Control::Save);
                }
                controls.push(Control::Discard);
                controls
            }
        }
    }

    pub fn offers(&self, control: Control) -> bool {
        self.controls().contains(&control)
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        match self.in_flight {
            Some(operation) => Err(SessionError::Busy(operation)),
            None => Ok(()),
        }
    }

    fn ensure_state(&self, action: Control, expected: SessionState) -> Result<(), SessionError> {
        let state = self.state();
        if state == expected {
            Ok(())
        } else {
            Err(SessionError::NotAllowed { action, state })
        }
    }

    fn reviewing_source(&self) -> Option<SourceHandle> {
        self.photo().map(|photo| photo.source.clone())
    }

    fn settle(&mut self, operation: Operation) -> Result<(), SessionError> {
        if self.in_flight == Some(operation) {
            self.in_flight = None;
            Ok(())
        } else {
            warn!(?operation, in_flight = ?self.in_flight, "Ignoring stale completion");
            Err(SessionError::NotInFlight(operation))
        }
    }

    /// Flip between front and back. Live only.
    pub fn toggle_facing(&mut self) -> Result<CameraFacing, SessionError> {
        self.ensure_idle()?;
        self.ensure_state(Control::ToggleFacing, SessionState::Live)?;

        self.facing = self.facing.toggled();
        debug!(facing = %self.facing, "Camera facing toggled");
        Ok(self.facing)
    }

    /// Start a capture. Live only.
    pub fn begin_capture(&mut self) -> Result<CaptureRequest, SessionError> {
        self.ensure_idle()?;
        self.ensure_state(Control::Capture, SessionState::Live)?;

        self.in_flight = Some(Operation::Capture);
        info!(facing = %self.facing, "Capturing photo...");
        Ok(CaptureRequest {
            facing: self.facing,
            options: CaptureOptions::REVIEW,
        })
    }

    /// Apply the result of a capture started with [`Self::begin_capture`]
    ///
    /// Success moves to reviewing. Failure leaves the session live with no
    /// photo set.
    pub fn finish_capture(&mut self, result: Result<CapturedPhoto, CaptureError>) -> AppResult<()> {
        self.settle(Operation::Capture)?;

        let photo = result.and_then(|photo| {
            if CaptureOptions::REVIEW.inline_preview && photo.preview.is_none() {
                Err(CaptureError::MissingPreview)
            } else {
                Ok(photo)
            }
        });

        match photo {
            Ok(photo) => {
                info!(
                    source = %photo.source,
                    width = photo.width,
                    height = photo.height,
                    "Photo captured, reviewing"
                );
                self.stage = Stage::Reviewing { photo };
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Capture failed, staying live");
                Err(e.into())
            }
        }
    }

    /// Start sharing the held photo. Reviewing only.
    pub fn begin_share(&mut self) -> Result<SourceHandle, SessionError> {
        self.ensure_idle()?;
        self.ensure_state(Control::Share, SessionState::Reviewing)?;
        let source = self
            .reviewing_source()
            .ok_or(SessionError::NotAllowed {
                action: Control::Share,
                state: SessionState::Live,
            })?;

        self.in_flight = Some(Operation::Share);
        info!(source = %source, "Sharing photo");
        Ok(source)
    }

    /// Apply the result of a share
    ///
    /// A finished share flow clears the photo whether or not the user picked a
    /// target. Failure keeps the photo for another attempt.
    pub fn finish_share(&mut self, result: Result<(), ShareError>) -> AppResult<()> {
        self.settle(Operation::Share)?;

        match result {
            Ok(()) => {
                self.clear_photo("shared");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Share failed, photo kept for review");
                Err(e.into())
            }
        }
    }

    /// Start saving the held photo to the gallery
    ///
    /// Reviewing only, and only with gallery permission.
    pub fn begin_save(&mut self) -> Result<SourceHandle, SessionError> {
        self.ensure_idle()?;
        self.ensure_state(Control::Save, SessionState::Reviewing)?;
        if !self.gallery_granted {
            return Err(SessionError::GalleryNotGranted);
        }
        let source = self
            .reviewing_source()
            .ok_or(SessionError::NotAllowed {
                action: Control::Save,
                state: SessionState::Live,
            })?;

        self.in_flight = Some(Operation::Save);
        info!(source = %source, "Saving photo to gallery");
        Ok(source)
    }

    /// Apply the result of a save, returning the gallery path on success
    pub fn finish_save(&mut self, result: Result<PathBuf, SaveError>) -> AppResult<PathBuf> {
        self.settle(Operation::Save)?;

        match result {
            Ok(path) => {
                info!(path = %path.display(), "Photo saved to gallery");
                self.clear_photo("saved");
                Ok(path)
            }
            Err(e) => {
                warn!(error = %e, "Save failed, photo kept for review");
                Err(e.into())
            }
        }
    }

    /// Drop the held photo without any external call. Reviewing only.
    pub fn discard(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.ensure_state(Control::Discard, SessionState::Reviewing)?;

        self.clear_photo("discarded");
        Ok(())
    }

    fn clear_photo(&mut self, reason: &'static str) {
        if let Stage::Reviewing { photo } = std::mem::replace(&mut self.stage, Stage::Live) {
            debug!(source = %photo.source, reason, "Photo released, back to live");
        }
    }

    /// Capture and wait for the result
    pub async fn capture(&mut self, camera: &dyn CaptureCapability) -> AppResult<&CapturedPhoto> {
        let request = self.begin_capture()?;
        let result = camera.capture(request.facing, request.options).await;
        self.finish_capture(result)?;
        self.photo()
            .ok_or_else(|| CaptureError::Device("photo missing after capture".to_string()).into())
    }

    /// Share and wait for the share flow to finish
    pub async fn share(&mut self, sharer: &dyn ShareCapability) -> AppResult<()> {
        let source = self.begin_share()?;
        let result = sharer.share(&source).await;
        self.finish_share(result)
    }

    /// Save and wait for the gallery to confirm
    pub async fn save(&mut self, gallery: &dyn GalleryCapability) -> AppResult<PathBuf> {
        let source = self.begin_save()?;
        let result = gallery.save(&source).await;
        self.finish_save(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::Permission;

    fn granted(gallery: bool) -> PermissionState {
        PermissionState {
            camera: Permission::Granted,
            gallery: if gallery {
                Permission::Granted
            } else {
                Permission::Denied
            },
        }
    }

    fn photo() -> CapturedPhoto {
        CapturedPhoto {
            source: SourceHandle::new("/tmp/capture_test.jpg"),
            preview: Some(EncodedPreview {
                mime: "image/jpeg".to_string(),
                data: STANDARD.encode([0xFF, 0xD8, 0xFF, 0xD9]),
                width: 1,
                height: 1,
            }),
            width: 640,
            height: 480,
            metadata: None,
        }
    }

    fn reviewing(gallery: bool) -> CaptureSession {
        let mut session = CaptureSession::new(&granted(gallery)).unwrap();
        session.begin_capture().unwrap();
        session.finish_capture(Ok(photo())).unwrap();
        session
    }

    #[test]
    fn test_session_requires_camera_permission() {
        let state = PermissionState {
            camera: Permission::Denied,
            gallery: Permission::Granted,
        };
        assert_eq!(
            CaptureSession::new(&state).unwrap_err(),
            SessionError::CameraNotGranted
        );

        let unresolved = PermissionState::default();
        assert!(CaptureSession::new(&unresolved).is_err());
    }

    #[test]
    fn test_toggle_alternates_from_back() {
        let mut session = CaptureSession::new(&granted(true)).unwrap();
        assert_eq!(session.facing(), CameraFacing::Back);

        let expected = [
            CameraFacing::Front,
            CameraFacing::Back,
            CameraFacing::Front,
            CameraFacing::Back,
            CameraFacing::Front,
        ];
        for facing in expected {
            assert_eq!(session.toggle_facing().unwrap(), facing);
            assert_eq!(session.state(), SessionState::Live);
        }
    }

    #[test]
    fn test_toggle_disallowed_while_reviewing() {
        let mut session = reviewing(true);
        let before = session.facing();
        assert!(matches!(
            session.toggle_facing(),
            Err(SessionError::NotAllowed {
                action: Control::ToggleFacing,
                state: SessionState::Reviewing
            })
        ));
        assert_eq!(session.facing(), before);
    }

    #[test]
    fn test_capture_moves_to_reviewing() {
        let mut session = CaptureSession::new(&granted(true)).unwrap();
        let request = session.begin_capture().unwrap();
        assert_eq!(request.options, CaptureOptions::REVIEW);
        assert_eq!(request.facing, CameraFacing::Back);
        assert_eq!(session.in_flight(), Some(Operation::Capture));
        assert!(session.controls().is_empty());

        session.finish_capture(Ok(photo())).unwrap();
        assert_eq!(session.state(), SessionState::Reviewing);
        let held = session.photo().unwrap();
        assert!(held.preview.as_ref().unwrap().bytes().is_ok());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_capture_disallowed_while_reviewing() {
        let mut session = reviewing(true);
        let err = session.begin_capture().unwrap_err();
        assert_eq!(
            err,
            SessionError::NotAllowed {
                action: Control::Capture,
                state: SessionState::Reviewing
            }
        );
        assert_eq!(session.photo(), Some(&photo()));
    }

    #[test]
    fn test_capture_failure_stays_live() {
        let mut session = CaptureSession::new(&granted(true)).unwrap();
        session.begin_capture().unwrap();
        let result = session.finish_capture(Err(CaptureError::Device("unplugged".into())));
        assert!(result.is_err());
        assert_eq!(session.state(), SessionState::Live);
        assert!(session.photo().is_none());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_capture_without_preview_is_rejected() {
        let mut session = CaptureSession::new(&granted(true)).unwrap();
        session.begin_capture().unwrap();
        let mut bare = photo();
        bare.preview = None;
        assert!(session.finish_capture(Ok(bare)).is_err());
        assert_eq!(session.state(), SessionState::Live);
    }

    #[test]
    fn test_second_capture_while_in_flight_is_busy() {
        let mut session = CaptureSession::new(&granted(true)).unwrap();
        session.begin_capture().unwrap();
        assert_eq!(
            session.begin_capture().unwrap_err(),
            SessionError::Busy(Operation::Capture)
        );
        assert_eq!(
            session.toggle_facing().unwrap_err(),
            SessionError::Busy(Operation::Capture)
        );
    }

    #[test]
    fn test_every_review_action_returns_to_live() {
        let mut shared = reviewing(true);
        shared.begin_share().unwrap();
        shared.finish_share(Ok(())).unwrap();

        let mut saved = reviewing(true);
        saved.begin_save().unwrap();
        saved
            .finish_save(Ok(PathBuf::from("/tmp/IMG_1.jpg")))
            .unwrap();

        let mut discarded = reviewing(true);
        discarded.discard().unwrap();

        for session in [shared, saved, discarded] {
            assert_eq!(session.state(), SessionState::Live);
            assert!(session.photo().is_none());
            assert_eq!(
                session.controls(),
                vec![Control::ToggleFacing, Control::Capture]
            );
        }
    }

    #[test]
    fn test_save_offered_only_with_gallery_permission() {
        let with_gallery = reviewing(true);
        assert_eq!(
            with_gallery.controls(),
            vec![Control::Share, Control::Save, Control::Discard]
        );

        let mut without_gallery = reviewing(false);
        assert_eq!(
            without_gallery.controls(),
            vec![Control::Share, Control::Discard]
        );
        assert_eq!(
            without_gallery.begin_save().unwrap_err(),
            SessionError::GalleryNotGranted
        );
        assert_eq!(without_gallery.state(), SessionState::Reviewing);
    }

    #[test]
    fn test_failed_save_keeps_photo_and_discard_still_works() {
        let mut session = reviewing(true);
        session.begin_save().unwrap();
        assert!(
            session
                .finish_save(Err(SaveError::Failed("disk full".into())))
                .is_err()
        );
        assert_eq!(session.state(), SessionState::Reviewing);
        assert!(session.photo().is_some());
        assert!(session.offers(Control::Discard));

        session.discard().unwrap();
        assert_eq!(session.state(), SessionState::Live);
        assert!(session.photo().is_none());
    }

    #[test]
    fn test_failed_share_keeps_photo() {
        let mut session = reviewing(false);
        session.begin_share().unwrap();
        assert!(
            session
                .finish_share(Err(ShareError::Failed("no handler".into())))
                .is_err()
        );
        assert_eq!(session.state(), SessionState::Reviewing);
        assert!(session.offers(Control::Share));
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut session = CaptureSession::new(&granted(true)).unwrap();
        assert!(session.finish_capture(Ok(photo())).is_err());
        assert_eq!(session.state(), SessionState::Live);
    }

    #[test]
    fn test_facing_parse() {
        assert_eq!("front".parse::<CameraFacing>(), Ok(CameraFacing::Front));
        assert_eq!("REAR".parse::<CameraFacing>(), Ok(CameraFacing::Back));
        assert!("sideways".parse::<CameraFacing>().is_err());
    }
}
