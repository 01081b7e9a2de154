//! Integration tests for configuration loading
//!
//! Covers:
//! - Explicit TOML file loading and missing-file errors
//! - Priority order: overrides > TOML > compiled defaults
//! - Validation after merge
//!
//! Note: Uses serial_test because `load` consults the per-user config
//! directory, which depends on HOME/XDG_CONFIG_HOME.

use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;
use ytspec_common::config::{
    ConfigOverrides, DecodeErrorPolicy, PipelineConfig, SampleFunction, SinkKind,
};
use ytspec_common::output::OutputShape;
use ytspec_common::Error;

fn write_config(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn test_load_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        audio_dir = "/data/audio"
        extension = "wav"
        on_decode_error = "continue_with_empty"

        [extractor]
        sample_function = "peak"

        [output]
        sink = "database"
        shape = "structured"

        [output.database]
        url = "sqlite://clips.db?mode=rwc"
        table = "clips"

        [logging]
        level = "debug"
        "#,
    );

    let config = PipelineConfig::load(Some(&path), ConfigOverrides::default()).unwrap();

    assert_eq!(config.audio_dir, PathBuf::from("/data/audio"));
    assert_eq!(config.extension, "wav");
    assert_eq!(config.on_decode_error, DecodeErrorPolicy::ContinueWithEmpty);
    assert_eq!(config.extractor.sample_function, SampleFunction::Peak);
    assert_eq!(config.output.sink, SinkKind::Database);
    assert_eq!(config.output.shape, OutputShape::Structured);
    assert_eq!(config.output.database.table, "clips");
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_missing_explicit_file_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = PipelineConfig::load(Some(&missing), ConfigOverrides::default());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_malformed_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "resolution = \"fast\"");

    let result = PipelineConfig::load(Some(&path), ConfigOverrides::default());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_overrides_beat_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        resolution = 2

        [output]
        sink = "json_file"
        "#,
    );

    let config = PipelineConfig::load(
        Some(&path),
        ConfigOverrides {
            resolution: Some(16),
            sink: Some(SinkKind::Stdout),
            shape: Some(OutputShape::Flat),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(config.resolution.get(), 16);
    assert_eq!(config.output.sink, SinkKind::Stdout);
    assert_eq!(config.output.shape, OutputShape::Flat);
}

#[test]
fn test_validation_runs_after_merge() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[output]\nsink = \"http_post\"\n");

    let missing_url = PipelineConfig::load(Some(&path), ConfigOverrides::default());
    assert!(matches!(missing_url, Err(Error::Config(_))));

    let with_url = PipelineConfig::load(
        Some(&path),
        ConfigOverrides {
            http_url: Some("http://127.0.0.1:8080/spectrogram".to_string()),
            ..Default::default()
        },
    );
    assert!(with_url.is_ok());
}

#[test]
fn test_zero_resolution_override_rejected() {
    let result = PipelineConfig::default().with_overrides(ConfigOverrides {
        resolution: Some(0),
        ..Default::default()
    });
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_no_config_anywhere_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let old_home = env::var_os("HOME");
    let old_xdg = env::var_os("XDG_CONFIG_HOME");
    env::set_var("HOME", dir.path());
    env::set_var("XDG_CONFIG_HOME", dir.path().join(".config"));

    let config = PipelineConfig::load(None, ConfigOverrides::default());

    match old_home {
        Some(v) => env::set_var("HOME", v),
        None => env::remove_var("HOME"),
    }
    match old_xdg {
        Some(v) => env::set_var("XDG_CONFIG_HOME", v),
        None => env::remove_var("XDG_CONFIG_HOME"),
    }

    assert_eq!(config.unwrap(), PipelineConfig::default());
}
