// SPDX-License-Identifier: GPL-3.0-only

//! Permission resolution handlers

use crate::app::state::{AppModel, Message};
use crate::app::{Task, task};
use crate::permissions::{GateView, PermissionGate, PermissionState};
use tracing::{error, info};

impl AppModel {
    /// Issue both authorization requests, once
    pub(crate) fn handle_request_permissions(&mut self) -> Option<Task> {
        if !self.gate.begin() {
            return None;
        }

        let camera = self.capabilities.camera_permission.clone();
        let gallery = self.capabilities.gallery_permission.clone();
        task(async move {
            let state = PermissionGate::request_all(camera.as_ref(), gallery.as_ref()).await;
            Message::PermissionsResolved(state)
        })
    }

    /// Record the result and open the session if the camera is granted
    pub(crate) fn handle_permissions_resolved(&mut self, state: PermissionState) -> Option<Task> {
        if self.gate.is_resolved() {
            return None;
        }
        self.gate.resolve(state);

        match self.gate.view() {
            GateView::Ready(_) => match self.gate.open_session() {
                Ok(session) => {
                    let facing = session.facing();
                    self.session = Some(session);
                    self.start_preview(facing)
                }
                Err(e) => {
                    error!(error = %e, "Failed to open capture session");
                    None
                }
            },
            GateView::Denied => {
                info!("Camera permission denied, capture unavailable for this session");
                None
            }
            GateView::Resolving => None,
        }
    }
}
