// SPDX-License-Identifier: GPL-3.0-only

//! Message handlers organized by workflow stage
//!
//! - `permissions`: one-time permission resolution and session opening
//! - `capture`: facing toggle, viewfinder and photo capture
//! - `review`: share, save and discard

mod capture;
mod permissions;
mod review;
