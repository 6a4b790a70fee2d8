// SPDX-License-Identifier: GPL-3.0-only

//! XDG desktop portal calls
//!
//! Portal interfaces are reached over the session bus. Methods such as
//! `Camera.AccessCamera` and `OpenURI.OpenFile` answer asynchronously with a
//! `Response` signal on a request object whose path is derived from our
//! unique bus name and a handle token, so we subscribe before calling.
//!
//! Without a session bus or portal the camera nodes are probed directly.

use crate::backends::{Authorizer, BackendError, BackendResult};
use crate::permissions::PermissionStatus;
use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};
use v4l::capability::Flags;
use v4l::prelude::*;
use zbus::zvariant::{DynamicType, Fd, OwnedObjectPath, OwnedValue, Value};

const PORTAL_DESTINATION: &str = "org.freedesktop.portal.Desktop";
const PORTAL_PATH: &str = "/org/freedesktop/portal/desktop";
const CAMERA_INTERFACE: &str = "org.freedesktop.portal.Camera";
const OPEN_URI_INTERFACE: &str = "org.freedesktop.portal.OpenURI";
const REQUEST_INTERFACE: &str = "org.freedesktop.portal.Request";

/// Map a portal response code to a permission status
///
/// 0 = success, 1 = cancelled by the user, anything else = ended otherwise.
pub fn status_from_response(code: u32) -> PermissionStatus {
    match code {
        0 => PermissionStatus::Granted,
        1 => PermissionStatus::Denied,
        _ => PermissionStatus::Other,
    }
}

/// Object path the portal will use for a request with `token`
pub fn request_path(unique_name: &str, token: &str) -> String {
    let sender = unique_name.trim_start_matches(':').replace('.', "_");
    format!("{}/request/{}/{}", PORTAL_PATH, sender, token)
}

fn handle_token() -> String {
    format!("quickshot_{}", uuid::Uuid::new_v4().simple())
}

/// Call a portal method that answers through a `Request` object
///
/// The options inside `body` must carry `handle_token = token`. Returns the
/// response code.
async fn call_with_response<B>(
    connection: &zbus::Connection,
    interface: &str,
    method: &str,
    body: &B,
    token: &str,
) -> BackendResult<u32>
where
    B: Serialize + DynamicType,
{
    let unique_name = connection
        .unique_name()
        .map(|name| name.as_str().to_string())
        .ok_or_else(|| BackendError::DBus("Connection has no unique name".to_string()))?;
    let expected_path = request_path(&unique_name, token);

    let request = zbus::Proxy::new(
        connection,
        PORTAL_DESTINATION,
        expected_path.as_str(),
        REQUEST_INTERFACE,
    )
    .await?;
    let mut responses = request.receive_signal("Response").await?;

    let portal = zbus::Proxy::new(connection, PORTAL_DESTINATION, PORTAL_PATH, interface).await?;

    debug!(method, request = %expected_path, "Calling portal");
    let handle: OwnedObjectPath = portal.call(method, body).await?;

    // Older portals ignore the token and pick their own path
    let message = if handle.as_str() == expected_path {
        responses.next().await
    } else {
        warn!(expected = %expected_path, got = %handle, "Portal chose a different request path");
        let request =
            zbus::Proxy::new(connection, PORTAL_DESTINATION, handle.as_str(), REQUEST_INTERFACE)
                .await?;
        let mut responses = request.receive_signal("Response").await?;
        responses.next().await
    };

    let message = message
        .ok_or_else(|| BackendError::DBus("Request closed without a response".to_string()))?;
    let (code, _results): (u32, HashMap<String, OwnedValue>) = message.body().deserialize()?;

    info!(method, code, "Portal answered");
    Ok(code)
}

/// Offer `path` to the user's choice of application
///
/// With `ask` the portal always shows its application chooser. Returns the
/// response code.
pub async fn open_file(path: &Path, ask: bool) -> BackendResult<u32> {
    let file = tokio::fs::File::open(path).await?.into_std().await;
    let connection = zbus::Connection::session().await?;

    let token = handle_token();
    let mut options: HashMap<&str, Value> = HashMap::new();
    options.insert("handle_token", Value::new(token.as_str()));
    options.insert("ask", Value::new(ask));
    options.insert("writable", Value::new(false));

    call_with_response(
        &connection,
        OPEN_URI_INTERFACE,
        "OpenFile",
        &("", Fd::from(&file), options),
        &token,
    )
    .await
}

/// Portal-backed camera authorization with a device probe fallback
#[derive(Debug, Default)]
pub struct PortalCameraAuthorizer;

impl PortalCameraAuthorizer {
    pub fn new() -> Self {
        Self
    }

    async fn access_camera(&self) -> BackendResult<PermissionStatus> {
        let connection = zbus::Connection::session().await?;

        let camera =
            zbus::Proxy::new(&connection, PORTAL_DESTINATION, PORTAL_PATH, CAMERA_INTERFACE)
                .await?;

        let present: bool = camera.get_property("IsCameraPresent").await?;
        if !present {
            info!("Portal reports no camera present");
            return Ok(PermissionStatus::Denied);
        }

        let token = handle_token();
        let mut options: HashMap<&str, Value> = HashMap::new();
        options.insert("handle_token", Value::new(token.as_str()));

        let code = call_with_response(
            &connection,
            CAMERA_INTERFACE,
            "AccessCamera",
            &(options,),
            &token,
        )
        .await?;
        Ok(status_from_response(code))
    }
}

#[async_trait]
impl Authorizer for PortalCameraAuthorizer {
    fn name(&self) -> &'static str {
        "camera-portal"
    }

    async fn request(&self) -> Result<PermissionStatus, BackendError> {
        match self.access_camera().await {
            Ok(status) => Ok(status),
            Err(e) => {
                warn!(error = %e, "Camera portal unavailable, probing devices");
                DeviceProbeAuthorizer.request().await
            }
        }
    }
}

/// Camera authorization by opening the device nodes
///
/// Granted if any capture node can be opened. No nodes at all, or only nodes
/// we may not open, resolve to denied.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeviceProbeAuthorizer;

impl DeviceProbeAuthorizer {
    fn probe() -> PermissionStatus {
        let nodes = v4l::context::enum_devices();
        if nodes.is_empty() {
            info!("No video devices present");
            return PermissionStatus::Denied;
        }

        for node in nodes {
            match Device::with_path(node.path()) {
                Ok(dev) => {
                    let can_capture = dev
                        .query_caps()
                        .map(|caps| caps.capabilities.contains(Flags::VIDEO_CAPTURE))
                        .unwrap_or(false);
                    if can_capture {
                        debug!(path = %node.path().display(), "Capture device accessible");
                        return PermissionStatus::Granted;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                    debug!(path = %node.path().display(), "Capture device not accessible");
                }
                Err(e) => {
                    debug!(path = %node.path().display(), error = %e, "Cannot open video device");
                }
            }
        }

        PermissionStatus::Denied
    }
}

#[async_trait]
impl Authorizer for DeviceProbeAuthorizer {
    fn name(&self) -> &'static str {
        "camera-probe"
    }

    async fn request(&self) -> Result<PermissionStatus, BackendError> {
        tokio::task::spawn_blocking(Self::probe)
            .await
            .map_err(|e| BackendError::Other(format!("Probe task error: {}", e)))
    }
}
