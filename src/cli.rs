// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Reporting camera and gallery permissions
//! - Taking a photo and saving or sharing it

use quickshot::backends::Capabilities;
use quickshot::backends::camera::v4l2;
use quickshot::config::Config;
use quickshot::errors::{AppError, AppResult};
use quickshot::permissions::{Permission, PermissionGate, PermissionState};
use quickshot::session::CameraFacing;
use quickshot::storage;

fn runtime() -> AppResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AppError::Other(format!("Failed to start runtime: {}", e)))
}

/// List all available cameras
pub fn list_cameras() -> AppResult<()> {
    let cameras = v4l2::enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for camera in &cameras {
        let facing = camera
            .location
            .map(|l| l.as_str())
            .unwrap_or("unknown");
        println!("  {} [{}]", camera, facing);
        println!("      Driver: {} ({})", camera.driver, camera.bus_info);

        match v4l2::device_formats(camera) {
            Ok(formats) if !formats.is_empty() => {
                // Show top 3 resolutions
                let res_strs: Vec<String> = formats.iter().take(3).map(|f| f.to_string()).collect();
                println!("      Formats: {}", res_strs.join(", "));
            }
            Ok(_) => {}
            Err(e) => println!("      Formats: unavailable ({})", e),
        }
        println!();
    }

    Ok(())
}

fn describe(permission: Permission) -> &'static str {
    match permission {
        Permission::Granted => "granted",
        Permission::Denied => "denied",
        Permission::Unknown => "unknown",
    }
}

/// Resolve permissions once and print the result
pub fn print_permissions(config: &Config, json: bool) -> AppResult<()> {
    let capabilities = Capabilities::desktop(config);
    let state: PermissionState = runtime()?.block_on(PermissionGate::request_all(
        capabilities.camera_permission.as_ref(),
        capabilities.gallery_permission.as_ref(),
    ));

    if json {
        let text = serde_json::to_string_pretty(&state)
            .map_err(|e| AppError::Other(format!("Failed to serialize permissions: {}", e)))?;
        println!("{}", text);
    } else {
        println!("Camera:  {}", describe(state.camera));
        println!("Gallery: {}", describe(state.gallery));
    }

    Ok(())
}

/// Take a photo, then save it to the gallery or hand it to the share flow
pub fn take_photo(config: &Config, facing: CameraFacing, share: bool) -> AppResult<()> {
    let capabilities = Capabilities::desktop(config);
    storage::prune_staging(&storage::staging_directory(), storage::staging_cutoff());

    runtime()?.block_on(async {
        let mut gate = PermissionGate::new();
        gate.initialize(
            capabilities.camera_permission.as_ref(),
            capabilities.gallery_permission.as_ref(),
        )
        .await;

        let mut session = gate
            .open_session()
            .map_err(|_| AppError::CameraPermissionDenied)?;
        if session.facing() != facing {
            session.toggle_facing()?;
        }

        println!("Using {} camera", session.facing());
        println!("Capturing...");
        let photo = session.capture(capabilities.camera.as_ref()).await?;
        println!("Captured {}x{}", photo.width, photo.height);

        if share {
            session.share(capabilities.share.as_ref()).await?;
            println!("Shared");
            return Ok(());
        }

        if !session.gallery_granted() {
            let staged = session
                .photo()
                .map(|p| p.source.to_string())
                .unwrap_or_default();
            println!("Gallery permission not granted; photo left at {}", staged);
            return Err(AppError::GalleryPermissionDenied);
        }

        let saved = session.save(capabilities.gallery.as_ref()).await?;
        println!("Photo saved: {}", saved.display());
        Ok(())
    })
}
