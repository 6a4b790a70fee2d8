// SPDX-License-Identifier: MPL-2.0

//! Application model
//!
//! An Elm-style model: input and completed background calls arrive as
//! [`Message`]s, [`AppModel::update`] applies them one at a time and may hand
//! back a [`Task`] for the front end to run. The task resolves to the next
//! message. The front end renders [`AppModel::screen`] after every update.
//!
//! # Architecture
//!
//! - `state`: AppModel, Message, Screen, Notification
//! - `update`: Message dispatch
//! - `handlers`: Permission, capture and review handlers

mod handlers;
mod state;
mod update;

pub use state::{AppModel, Message, Notification, NotificationKind, Screen};

use crate::backends::Capabilities;
use crate::permissions::{GateView, PermissionGate};
use crate::session::CaptureSession;
use futures::future::BoxFuture;
use std::future::Future;

/// Background work that produces the next message
pub type Task = BoxFuture<'static, Message>;

pub(crate) fn task<F>(future: F) -> Option<Task>
where
    F: Future<Output = Message> + Send + 'static,
{
    Some(Box::pin(future))
}

impl AppModel {
    /// Create the model and the startup task (permission resolution)
    pub fn new(capabilities: Capabilities) -> (Self, Option<Task>) {
        let mut model = Self {
            capabilities,
            gate: PermissionGate::new(),
            session: None,
            notification: None,
        };
        let startup = model.update(Message::RequestPermissions);
        (model, startup)
    }

    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Screen for the current state
    pub fn screen(&self) -> Screen<'_> {
        match (self.gate.view(), &self.session) {
            (GateView::Resolving, _) => Screen::ResolvingPermissions,
            (GateView::Denied, _) => Screen::CameraDenied,
            // Ready but no session means opening it failed; nothing is reachable
            (GateView::Ready(_), None) => Screen::CameraDenied,
            (GateView::Ready(_), Some(session)) => {
                let controls = session.controls();
                let busy = session.is_busy();
                match session.photo() {
                    None => Screen::Live {
                        facing: session.facing(),
                        controls,
                        busy,
                    },
                    Some(photo) => Screen::Reviewing {
                        photo,
                        controls,
                        busy,
                    },
                }
            }
        }
    }
}
