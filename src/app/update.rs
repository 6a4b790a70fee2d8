// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function dispatches to handler methods grouped by
//! workflow stage in the `handlers` submodules.

use crate::app::Task;
use crate::app::state::{AppModel, Message};
use tracing::debug;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Option<Task> {
        debug!(?message, "update");

        match message {
            // ===== Permissions =====
            Message::RequestPermissions => self.handle_request_permissions(),
            Message::PermissionsResolved(state) => self.handle_permissions_resolved(state),

            // ===== Live =====
            Message::ToggleFacing => self.handle_toggle_facing(),
            Message::PreviewStarted(facing, result) => self.handle_preview_started(facing, result),
            Message::Capture => self.handle_capture(),
            Message::Captured(result) => self.handle_captured(result),

            // ===== Reviewing =====
            Message::Share => self.handle_share(),
            Message::Shared(result) => self.handle_shared(result),
            Message::Save => self.handle_save(),
            Message::Saved(result) => self.handle_saved(result),
            Message::Discard => self.handle_discard(),

            // ===== UI =====
            Message::DismissNotification => {
                self.notification = None;
                None
            }
        }
    }
}
