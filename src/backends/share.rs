// SPDX-License-Identifier: GPL-3.0-only

//! Share capability
//!
//! Desktop Linux has no share sheet. The closest equivalent is the portal's
//! `OpenURI.OpenFile` with `ask` set, which lets the user pick the
//! application that receives the photo. Without a portal the photo is handed
//! to the default handler for its type. Either way the flow counts as
//! finished once the chooser or launcher has returned, whatever the user
//! does with the file afterwards.

use crate::backends::{ShareCapability, portal};
use crate::errors::ShareError;
use crate::session::SourceHandle;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{info, warn};

/// Map the chooser's response code to the share outcome
///
/// Picking an application and cancelling the chooser both finish the flow.
pub fn share_outcome(code: u32) -> Result<(), ShareError> {
    match code {
        0 => Ok(()),
        1 => {
            info!("Share chooser dismissed");
            Ok(())
        }
        other => Err(ShareError::Failed(format!(
            "Share chooser ended unexpectedly (response {})",
            other
        ))),
    }
}

/// Shares through the portal's application chooser
#[derive(Debug, Clone)]
pub struct DesktopShare {
    use_portal: bool,
}

impl DesktopShare {
    pub fn new(use_portal: bool) -> Self {
        Self { use_portal }
    }

    async fn open_with_default(path: PathBuf) -> Result<(), ShareError> {
        info!(path = %path.display(), "Opening photo with default handler");

        tokio::task::spawn_blocking(move || open::that(&path))
            .await
            .map_err(|e| ShareError::Failed(format!("Share task error: {}", e)))?
            .map_err(|e| ShareError::Failed(e.to_string()))
    }
}

#[async_trait]
impl ShareCapability for DesktopShare {
    async fn share(&self, source: &SourceHandle) -> Result<(), ShareError> {
        let path = source.path().to_path_buf();
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ShareError::MissingSource(source.to_string()));
        }

        if self.use_portal {
            info!(path = %path.display(), "Offering photo through the portal chooser");
            match portal::open_file(&path, true).await {
                Ok(code) => return share_outcome(code),
                Err(e) => warn!(error = %e, "OpenURI portal unavailable, using default handler"),
            }
        }

        Self::open_with_default(path).await
    }
}
