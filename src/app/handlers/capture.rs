// SPDX-License-Identifier: GPL-3.0-only

//! Capture operations handlers
//!
//! Handles the viewfinder facing and photo capture.

use crate::app::state::{AppModel, Message, Notification};
use crate::app::{Task, task};
use crate::errors::CaptureError;
use crate::session::{CameraFacing, CapturedPhoto};
use tracing::{debug, warn};

impl AppModel {
    /// Ask the camera to show `facing` in the viewfinder
    pub(crate) fn start_preview(&self, facing: CameraFacing) -> Option<Task> {
        let camera = self.capabilities.camera.clone();
        task(async move {
            let result = camera.start_preview(facing).await;
            Message::PreviewStarted(facing, result)
        })
    }

    pub(crate) fn handle_toggle_facing(&mut self) -> Option<Task> {
        let session = self.session.as_mut()?;
        match session.toggle_facing() {
            Ok(facing) => self.start_preview(facing),
            Err(e) => {
                debug!(error = %e, "Toggle ignored");
                None
            }
        }
    }

    pub(crate) fn handle_preview_started(
        &mut self,
        facing: CameraFacing,
        result: Result<(), CaptureError>,
    ) -> Option<Task> {
        if let Err(e) = result {
            warn!(%facing, error = %e, "Viewfinder could not start");
            self.notification = Some(Notification::error(e.to_string()));
        }
        None
    }

    /// Start a capture in the background
    pub(crate) fn handle_capture(&mut self) -> Option<Task> {
        let session = self.session.as_mut()?;
        let request = match session.begin_capture() {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "Capture ignored");
                return None;
            }
        };

        self.notification = None;
        let camera = self.capabilities.camera.clone();
        task(async move {
            let result = camera.capture(request.facing, request.options).await;
            Message::Captured(result)
        })
    }

    pub(crate) fn handle_captured(
        &mut self,
        result: Result<CapturedPhoto, CaptureError>,
    ) -> Option<Task> {
        let session = self.session.as_mut()?;
        if let Err(e) = session.finish_capture(result) {
            self.notification = Some(Notification::error(e.to_string()));
        }
        None
    }
}
