// SPDX-License-Identifier: GPL-3.0-only

use crate::constants;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Read-only settings for the capture utility
///
/// Loaded from `config.toml` in the user's config directory. Every field has
/// a default, so a partial file is fine.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gallery subfolder under the pictures directory
    pub save_folder: String,
    /// Longest edge of the inline review preview, in pixels
    pub preview_max_edge: u32,
    /// Frames discarded while the sensor settles before a still is kept
    pub warmup_frames: u32,
    /// V4L2 device pinned to the front facing (e.g. "/dev/video2")
    pub front_device: Option<String>,
    /// V4L2 device pinned to the back facing
    pub back_device: Option<String>,
    /// Use the desktop portal for camera access and sharing instead of probing
    /// devices and opening the default handler
    pub use_portal: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            save_folder: constants::DEFAULT_SAVE_FOLDER.to_string(),
            preview_max_edge: constants::PREVIEW_MAX_EDGE,
            warmup_frames: constants::WARMUP_FRAMES,
            front_device: None,
            back_device: None,
            use_portal: true,
        }
    }
}

impl Config {
    /// Default location: `$XDG_CONFIG_HOME/quickshot/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(constants::APP_NAME).join("config.toml"))
    }

    /// Load from the default location
    ///
    /// A missing file yields defaults. A malformed file is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                let cause = std::error::Error::source(&e)
                    .map(|source| source.to_string())
                    .unwrap_or_default();
                warn!(error = %e, %cause, "Ignoring config file");
                Self::default()
            }
        }
    }

    /// Load from an explicit path; any problem is an error
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), ?config, "Config loaded");
        Ok(config)
    }

    /// Directory photos are saved into
    pub fn gallery_directory(&self) -> PathBuf {
        dirs::picture_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join(&self.save_folder)
    }
}
