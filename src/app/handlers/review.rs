// SPDX-License-Identifier: GPL-3.0-only

//! Review handlers
//!
//! Share, save and discard all return to the viewfinder on success. A failed
//! share or save keeps the photo so the user can retry or discard.

use crate::app::state::{AppModel, Message, Notification};
use crate::app::{Task, task};
use crate::errors::{SaveError, ShareError};
use std::path::PathBuf;
use tracing::debug;

impl AppModel {
    pub(crate) fn handle_share(&mut self) -> Option<Task> {
        let session = self.session.as_mut()?;
        let source = match session.begin_share() {
            Ok(source) => source,
            Err(e) => {
                debug!(error = %e, "Share ignored");
                return None;
            }
        };

        self.notification = None;
        let share = self.capabilities.share.clone();
        task(async move { Message::Shared(share.share(&source).await) })
    }

    pub(crate) fn handle_shared(&mut self, result: Result<(), ShareError>) -> Option<Task> {
        let session = self.session.as_mut()?;
        if let Err(e) = session.finish_share(result) {
            self.notification = Some(Notification::error(e.to_string()));
        }
        None
    }

    pub(crate) fn handle_save(&mut self) -> Option<Task> {
        let session = self.session.as_mut()?;
        let source = match session.begin_save() {
            Ok(source) => source,
            Err(e) => {
                debug!(error = %e, "Save ignored");
                return None;
            }
        };

        self.notification = None;
        let gallery = self.capabilities.gallery.clone();
        task(async move { Message::Saved(gallery.save(&source).await) })
    }

    pub(crate) fn handle_saved(&mut self, result: Result<PathBuf, SaveError>) -> Option<Task> {
        let session = self.session.as_mut()?;
        self.notification = Some(match session.finish_save(result) {
            Ok(path) => Notification::info(format!("Saved: {}", path.display())),
            Err(e) => Notification::error(e.to_string()),
        });
        None
    }

    pub(crate) fn handle_discard(&mut self) -> Option<Task> {
        let session = self.session.as_mut()?;
        match session.discard() {
            Ok(()) => self.notification = None,
            Err(e) => debug!(error = %e, "Discard ignored"),
        }
        None
    }
}
