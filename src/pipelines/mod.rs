// SPDX-License-Identifier: MPL-2.0

//! Capture pipelines
//!
//! - [`photo`]: still photo encoding, staging and inline preview

pub mod photo;
