// SPDX-License-Identifier: MPL-2.0

//! Quickshot - take a photo, review it, then share, save or discard it
//!
//! This library provides the core of the capture utility: the permission
//! gate, the capture/review session, and the desktop implementations of the
//! camera, share and gallery capabilities.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`permissions`]: Camera and gallery authorization, resolved once
//! - [`session`]: The Live/Reviewing capture session
//! - [`app`]: Message-driven application model on top of both
//! - [`backends`]: Capability traits and their desktop implementations
//! - [`pipelines`]: Photo encoding and staging
//! - [`config`]: User configuration handling
//! - [`storage`]: Staging and gallery file management
//! - [`terminal`]: Interactive terminal front end
//!
//! # Example
//!
//! ```ignore
//! let config = quickshot::Config::load();
//! quickshot::terminal::run(quickshot::backends::Capabilities::desktop(&config))?;
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod permissions;
pub mod pipelines;
pub mod session;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{AppModel, Message, Screen};
pub use config::Config;
pub use permissions::{Permission, PermissionGate, PermissionState};
pub use session::{CameraFacing, CaptureSession, CapturedPhoto, Control, SessionState};
