// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests driving the application model the way a front end does:
//! dispatch a message, run the returned task, feed its result back

mod common;

use common::{Harness, MockCamera, MockGallery, MockShare};
use std::sync::Arc;
use quickshot::app::{AppModel, Message, NotificationKind, Screen, Task};
use quickshot::session::{CameraFacing, Control, SessionState};

/// Run a task chain to completion
async fn settle(model: &mut AppModel, mut task: Option<Task>) {
    while let Some(pending) = task {
        let message = pending.await;
        task = model.update(message);
    }
}

async fn start(h: &Harness) -> AppModel {
    let (mut model, startup) = AppModel::new(h.capabilities());
    assert_eq!(model.screen(), Screen::ResolvingPermissions);
    settle(&mut model, startup).await;
    model
}

async fn send(model: &mut AppModel, message: Message) {
    let task = model.update(message);
    settle(model, task).await;
}

#[tokio::test]
async fn test_startup_resolves_to_live_and_starts_preview() {
    let h = Harness::new(true, true);
    let model = start(&h).await;

    assert_eq!(
        model.screen(),
        Screen::Live {
            facing: CameraFacing::Back,
            controls: vec![Control::ToggleFacing, Control::Capture],
            busy: false,
        }
    );
    assert_eq!(*h.camera.previews.lock().unwrap(), vec![CameraFacing::Back]);
}

#[tokio::test]
async fn test_camera_denied_exposes_nothing() {
    let h = Harness::new(false, true);
    let mut model = start(&h).await;

    assert_eq!(model.screen(), Screen::CameraDenied);
    assert!(model.screen().controls().is_empty());

    // Controls sent anyway change nothing and reach no capability
    for control in [
        Control::ToggleFacing,
        Control::Capture,
        Control::Share,
        Control::Save,
        Control::Discard,
    ] {
        send(&mut model, Message::for_control(control)).await;
        assert_eq!(model.screen(), Screen::CameraDenied);
    }
    assert!(model.session().is_none());
    assert!(h.camera.captures.lock().unwrap().is_empty());

    // Asking again does not re-request
    send(&mut model, Message::RequestPermissions).await;
    assert_eq!(model.screen(), Screen::CameraDenied);
}

#[tokio::test]
async fn test_toggle_restarts_preview_with_new_facing() {
    let h = Harness::new(true, true);
    let mut model = start(&h).await;

    send(&mut model, Message::ToggleFacing).await;
    send(&mut model, Message::ToggleFacing).await;

    assert_eq!(
        *h.camera.previews.lock().unwrap(),
        vec![CameraFacing::Back, CameraFacing::Front, CameraFacing::Back]
    );
}

#[tokio::test]
async fn test_capture_then_save_without_gallery_hides_save() {
    let h = Harness::new(true, false);
    let mut model = start(&h).await;

    send(&mut model, Message::Capture).await;
    match model.screen() {
        Screen::Reviewing { photo, controls, busy } => {
            assert!(photo.preview.is_some());
            assert_eq!(controls, vec![Control::Share, Control::Discard]);
            assert!(!busy);
        }
        other => panic!("expected reviewing, got {:?}", other),
    }

    send(&mut model, Message::Save).await;
    assert!(h.gallery.saved.lock().unwrap().is_empty());
    assert_eq!(
        model.session().map(|s| s.state()),
        Some(SessionState::Reviewing)
    );
}

#[tokio::test]
async fn test_controls_disabled_while_capture_in_flight() {
    let h = Harness::new(true, true);
    let mut model = start(&h).await;

    let pending = model.update(Message::Capture).expect("capture task");
    match model.screen() {
        Screen::Live { controls, busy, .. } => {
            assert!(busy);
            assert!(controls.is_empty());
        }
        other => panic!("expected live, got {:?}", other),
    }

    // A second tap while suspended starts nothing
    assert!(model.update(Message::Capture).is_none());

    let next = model.update(pending.await);
    settle(&mut model, next).await;
    assert_eq!(h.camera.captures.lock().unwrap().len(), 1);
    assert!(matches!(model.screen(), Screen::Reviewing { busy: false, .. }));
}

#[tokio::test]
async fn test_capture_failure_notifies_and_stays_live() {
    let mut h = Harness::new(true, true);
    h.camera = MockCamera::failing();
    let mut model = start(&h).await;

    send(&mut model, Message::Capture).await;

    assert!(matches!(model.screen(), Screen::Live { busy: false, .. }));
    let notification = model.notification().expect("error notification");
    assert_eq!(notification.kind, NotificationKind::Error);

    send(&mut model, Message::DismissNotification).await;
    assert!(model.notification().is_none());
}

#[tokio::test]
async fn test_share_save_discard_all_return_to_live() {
    let h = Harness::new(true, true);
    let mut model = start(&h).await;

    for action in [Message::Share, Message::Save, Message::Discard] {
        send(&mut model, Message::Capture).await;
        assert!(matches!(model.screen(), Screen::Reviewing { .. }));
        send(&mut model, action).await;
        assert!(matches!(model.screen(), Screen::Live { .. }));
        assert!(model.session().unwrap().photo().is_none());
    }

    assert_eq!(h.share.shared.lock().unwrap().len(), 1);
    assert_eq!(h.gallery.saved.lock().unwrap().len(), 1);
    assert_eq!(h.camera.captures.lock().unwrap().len(), 3);
}

/// Assert a failed review action left the photo in place, then discard it
async fn assert_kept_for_review(model: &mut AppModel) {
    let notification = model.notification().expect("error notification");
    assert_eq!(notification.kind, NotificationKind::Error);

    match model.screen() {
        Screen::Reviewing { controls, busy, .. } => {
            assert!(!busy);
            assert!(controls.contains(&Control::Share));
            assert!(controls.contains(&Control::Discard));
        }
        other => panic!("expected reviewing, got {:?}", other),
    }

    send(model, Message::Discard).await;
    assert!(matches!(model.screen(), Screen::Live { .. }));
    assert!(model.session().unwrap().photo().is_none());
}

#[tokio::test]
async fn test_share_failure_notifies_and_keeps_photo() {
    let mut h = Harness::new(true, true);
    h.share = Arc::new(MockShare {
        fail: true,
        ..Default::default()
    });
    let mut model = start(&h).await;

    send(&mut model, Message::Capture).await;
    send(&mut model, Message::Share).await;

    assert_eq!(h.share.shared.lock().unwrap().len(), 1);
    assert_kept_for_review(&mut model).await;
}

#[tokio::test]
async fn test_save_failure_notifies_and_keeps_photo() {
    let mut h = Harness::new(true, true);
    h.gallery = Arc::new(MockGallery {
        fail: true,
        ..Default::default()
    });
    let mut model = start(&h).await;

    send(&mut model, Message::Capture).await;
    send(&mut model, Message::Save).await;

    assert_eq!(h.gallery.saved.lock().unwrap().len(), 1);
    assert!(model.screen().offers(Control::Save));
    assert_kept_for_review(&mut model).await;
}

#[tokio::test]
async fn test_successful_save_reports_gallery_path() {
    let h = Harness::new(true, true);
    let mut model = start(&h).await;

    send(&mut model, Message::Capture).await;
    send(&mut model, Message::Save).await;

    assert!(matches!(model.screen(), Screen::Live { .. }));
    let notification = model.notification().expect("saved notification");
    assert_eq!(notification.kind, NotificationKind::Info);
    assert_eq!(
        notification.message,
        "Saved: /tmp/quickshot-test/gallery/IMG_1.jpg"
    );

    // The next capture clears it
    send(&mut model, Message::Capture).await;
    assert!(model.notification().is_none());
}
