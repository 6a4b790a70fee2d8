// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use quickshot::Config;
use quickshot::constants;
use quickshot::errors::ConfigError;

#[test]
fn test_config_default() {
    let config = Config::default();

    // Check sensible defaults
    assert_eq!(config.save_folder, constants::DEFAULT_SAVE_FOLDER);
    assert_eq!(config.preview_max_edge, constants::PREVIEW_MAX_EDGE);
    assert_eq!(config.warmup_frames, constants::WARMUP_FRAMES);
    assert!(config.use_portal, "Portal should be used by default");
    assert!(config.front_device.is_none());
    assert!(config.back_device.is_none());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "save_folder = \"Snaps\"\nfront_device = \"/dev/video2\"\n",
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.save_folder, "Snaps");
    assert_eq!(config.front_device.as_deref(), Some("/dev/video2"));
    assert_eq!(config.preview_max_edge, constants::PREVIEW_MAX_EDGE);
    assert!(config.gallery_directory().ends_with("Snaps"));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "preview_max_edge = \"big\"").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(&err, ConfigError::Parse { path: p, .. } if *p == path));

    // The toml diagnostic stays reachable through the error chain
    let source = std::error::Error::source(&err).expect("parse error source");
    assert!(source.to_string().contains("preview_max_edge"));
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
    match err {
        ConfigError::Read { source, .. } => {
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
        }
        other => panic!("expected read error, got {:?}", other),
    }
}

#[test]
fn test_config_round_trips_through_toml() {
    let config = Config {
        back_device: Some("/dev/video0".to_string()),
        use_portal: false,
        ..Config::default()
    };
    let text = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}
