// SPDX-License-Identifier: GPL-3.0-only

//! Permission gate
//!
//! Camera and gallery authorization are requested together, once per process.
//! Until both requests come back the gate reports [`GateView::Resolving`];
//! afterwards the camera result decides whether the capture workflow is
//! reachable at all.

use crate::backends::{Authorizer, BackendError};
use crate::errors::SessionError;
use crate::session::CaptureSession;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Status reported by an authorization request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Anything else the host reports (dismissed, restricted, undetermined)
    Other,
}

/// Tri-state authorization value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Request not resolved yet
    #[default]
    Unknown,
    Granted,
    Denied,
}

impl Permission {
    /// Only `granted` counts; every other status and every request failure is
    /// treated as denied.
    pub fn from_request(result: Result<PermissionStatus, BackendError>) -> Self {
        match result {
            Ok(PermissionStatus::Granted) => Permission::Granted,
            Ok(_) => Permission::Denied,
            Err(_) => Permission::Denied,
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Permission::Granted)
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Permission::Unknown)
    }
}

/// Resolved authorization for the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionState {
    pub camera: Permission,
    pub gallery: Permission,
}

/// What the UI can reach given the camera permission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    /// Requests still outstanding; show a placeholder
    Resolving,
    /// Camera denied; terminal message, nothing else reachable
    Denied,
    /// Camera granted; the capture session is available
    Ready(PermissionState),
}

/// Resolves camera and gallery permission exactly once
#[derive(Debug, Default)]
pub struct PermissionGate {
    state: PermissionState,
    started: bool,
}

impl PermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue both authorization requests concurrently and wait for both
    pub async fn request_all(camera: &dyn Authorizer, gallery: &dyn Authorizer) -> PermissionState {
        info!(camera = camera.name(), gallery = gallery.name(), "Requesting permissions");
        let (camera_result, gallery_result) =
            futures::join!(camera.request(), gallery.request());

        for (authorizer, result) in [(camera, &camera_result), (gallery, &gallery_result)] {
            if let Err(e) = result {
                warn!(authorizer = authorizer.name(), error = %e, "Authorization request failed");
            }
        }

        let state = PermissionState {
            camera: Permission::from_request(camera_result),
            gallery: Permission::from_request(gallery_result),
        };
        info!(camera = ?state.camera, gallery = ?state.gallery, "Permissions resolved");
        state
    }

    /// Mark resolution as started
    ///
    /// Returns false if it was already started, in which case the caller must
    /// not issue the requests again.
    pub fn begin(&mut self) -> bool {
        if self.started {
            warn!("Permission resolution already started, not requesting again");
            return false;
        }
        self.started = true;
        true
    }

    /// Record the resolved permissions. Later calls are ignored.
    pub fn resolve(&mut self, state: PermissionState) {
        if self.is_resolved() {
            warn!("Permissions already resolved, ignoring new result");
            return;
        }
        self.started = true;
        self.state = state;
    }

    /// Resolve both permissions, once
    pub async fn initialize(
        &mut self,
        camera: &dyn Authorizer,
        gallery: &dyn Authorizer,
    ) -> PermissionState {
        if self.begin() {
            let state = Self::request_all(camera, gallery).await;
            self.resolve(state);
        }
        self.state
    }

    pub fn state(&self) -> PermissionState {
        self.state
    }

    pub fn is_resolved(&self) -> bool {
        self.state.camera.is_resolved()
    }

    pub fn view(&self) -> GateView {
        match self.state.camera {
            Permission::Unknown => GateView::Resolving,
            Permission::Denied => GateView::Denied,
            Permission::Granted => GateView::Ready(self.state),
        }
    }

    /// Open a capture session if the camera is granted
    pub fn open_session(&self) -> Result<CaptureSession, SessionError> {
        CaptureSession::new(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        result: Result<PermissionStatus, BackendError>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(result: Result<PermissionStatus, BackendError>) -> Self {
            Self {
                result,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Authorizer for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn request(&self) -> Result<PermissionStatus, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Permission::from_request(Ok(PermissionStatus::Granted)),
            Permission::Granted
        );
        assert_eq!(
            Permission::from_request(Ok(PermissionStatus::Denied)),
            Permission::Denied
        );
        assert_eq!(
            Permission::from_request(Ok(PermissionStatus::Other)),
            Permission::Denied
        );
        assert_eq!(
            Permission::from_request(Err(BackendError::NotAvailable("no camera".into()))),
            Permission::Denied
        );
    }

    #[test]
    fn test_unresolved_gate_is_resolving() {
        let gate = PermissionGate::new();
        assert_eq!(gate.view(), GateView::Resolving);
        assert!(gate.open_session().is_err());
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let camera = Fixed::new(Ok(PermissionStatus::Granted));
        let gallery = Fixed::new(Ok(PermissionStatus::Denied));
        let mut gate = PermissionGate::new();

        let first = gate.initialize(&camera, &gallery).await;
        let second = gate.initialize(&camera, &gallery).await;

        assert_eq!(first, second);
        assert_eq!(camera.calls.load(Ordering::SeqCst), 1);
        assert_eq!(gallery.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            gate.view(),
            GateView::Ready(PermissionState {
                camera: Permission::Granted,
                gallery: Permission::Denied,
            })
        );
    }

    #[tokio::test]
    async fn test_failed_request_is_denied_without_affecting_the_other() {
        let camera = Fixed::new(Ok(PermissionStatus::Granted));
        let gallery = Fixed::new(Err(BackendError::IoError("read-only".into())));

        let state = PermissionGate::request_all(&camera, &gallery).await;

        assert_eq!(state.camera, Permission::Granted);
        assert_eq!(state.gallery, Permission::Denied);
        assert_eq!(camera.calls.load(Ordering::SeqCst), 1);
        assert_eq!(gallery.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolved_state_never_changes() {
        let mut gate = PermissionGate::new();
        gate.resolve(PermissionState {
            camera: Permission::Denied,
            gallery: Permission::Granted,
        });
        gate.resolve(PermissionState {
            camera: Permission::Granted,
            gallery: Permission::Granted,
        });
        assert_eq!(gate.view(), GateView::Denied);
        assert!(!gate.begin());
    }
}
