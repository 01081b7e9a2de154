//! Configuration loading and validation
//!
//! One `PipelineConfig` is built at startup and passed to the runner. Sources,
//! highest priority first:
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. TOML config file
//! 4. Compiled defaults
//!
//! Items 1 and 2 arrive together as [`ConfigOverrides`] (the binary's argument
//! parser reads both). This module owns items 3 and 4 and the merge.

use crate::model::Resolution;
use crate::output::OutputShape;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Environment variable naming an explicit TOML config file
pub const ENV_CONFIG: &str = "YTSPEC_CONFIG";
/// Environment variable naming the clip when no argument is given
pub const ENV_VIDEO_ID: &str = "YTSPEC_VIDEO_ID";
pub const ENV_AUDIO_DIR: &str = "YTSPEC_AUDIO_DIR";
pub const ENV_RESOLUTION: &str = "YTSPEC_RESOLUTION";
pub const ENV_SINK: &str = "YTSPEC_SINK";
pub const ENV_HTTP_URL: &str = "YTSPEC_HTTP_URL";
pub const ENV_DATABASE_URL: &str = "YTSPEC_DATABASE_URL";

/// Complete configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the input audio files
    pub audio_dir: PathBuf,
    /// Extension appended to the sanitized clip name (no leading dot)
    pub extension: String,
    /// Amplitude slices per second
    pub resolution: Resolution,
    /// What to do when the audio stream cannot be decoded
    pub on_decode_error: DecodeErrorPolicy,
    pub extractor: ExtractorConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("./audio"),
            extension: "flac".to_string(),
            resolution: Resolution::default(),
            on_decode_error: DecodeErrorPolicy::default(),
            extractor: ExtractorConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Decode failure handling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeErrorPolicy {
    /// Fail the run
    #[default]
    Abort,
    /// Log the failure and emit an empty result
    ///
    /// A decode error partway through the stream discards the slices decoded
    /// before it; the emitted result is always empty, never partial.
    ContinueWithEmpty,
}

impl FromStr for DecodeErrorPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "abort" => Ok(Self::Abort),
            "continue_with_empty" => Ok(Self::ContinueWithEmpty),
            other => Err(Error::Config(format!(
                "unknown decode error policy '{}' (expected abort or continue_with_empty)",
                other
            ))),
        }
    }
}

/// Tuning passed through to the amplitude extractor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub sample_function: SampleFunction,
}

/// Reduction applied to each slice of decoded samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFunction {
    /// Root mean square of the slice
    #[default]
    Rms,
    /// Largest absolute sample in the slice
    Peak,
}

/// Output selection and sink parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub sink: SinkKind,
    pub shape: OutputShape,
    /// Round normalized values to this many decimal places (half-up)
    pub value_places: Option<u32>,
    pub json_file: JsonFileConfig,
    pub http: HttpConfig,
    pub database: DatabaseConfig,
}

/// Which sink receives the result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    Stdout,
    JsonFile,
    HttpPost,
    Database,
}

impl FromStr for SinkKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stdout" => Ok(Self::Stdout),
            "json_file" => Ok(Self::JsonFile),
            "http_post" => Ok(Self::HttpPost),
            "database" => Ok(Self::Database),
            other => Err(Error::Config(format!(
                "unknown sink '{}' (expected stdout, json_file, http_post or database)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonFileConfig {
    /// Output file, overwritten on every run
    pub path: PathBuf,
}

impl Default for JsonFileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./out.json"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Endpoint receiving the JSON POST
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite://spectrograms.db?mode=rwc`
    pub url: Option<String>,
    /// Table keyed by clip identifier
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            table: "spectrograms".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub audio_dir: Option<PathBuf>,
    pub resolution: Option<u32>,
    pub sink: Option<SinkKind>,
    pub shape: Option<OutputShape>,
    pub on_decode_error: Option<DecodeErrorPolicy>,
    pub http_url: Option<String>,
    pub database_url: Option<String>,
}

impl PipelineConfig {
    /// Load TOML (if any), apply overrides, validate
    ///
    /// An explicitly named config file must exist. The per-user default file
    /// is optional; without it compiled defaults are used.
    pub fn load(explicit_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let base = match explicit_path {
            Some(path) => Self::from_toml_file(path)?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_toml_file(&path)?,
                None => {
                    debug!("No config file found, using compiled defaults");
                    Self::default()
                }
            },
        };

        let config = base.with_overrides(overrides)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file; absent keys take their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Layer command-line/environment values over this configuration
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(dir) = overrides.audio_dir {
            self.audio_dir = dir;
        }
        if let Some(resolution) = overrides.resolution {
            self.resolution = Resolution::new(resolution)?;
        }
        if let Some(sink) = overrides.sink {
            self.output.sink = sink;
        }
        if let Some(shape) = overrides.shape {
            self.output.shape = shape;
        }
        if let Some(policy) = overrides.on_decode_error {
            self.on_decode_error = policy;
        }
        if let Some(url) = overrides.http_url {
            self.output.http.url = Some(url);
        }
        if let Some(url) = overrides.database_url {
            self.output.database.url = Some(url);
        }
        Ok(self)
    }

    /// Reject combinations the selected sink cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() || self.extension.contains(['/', '\\']) {
            return Err(Error::Config(format!(
                "invalid audio extension '{}'",
                self.extension
            )));
        }

        if let Some(places) = self.output.value_places {
            if places > 15 {
                return Err(Error::Config(format!(
                    "value_places {} exceeds f64 precision",
                    places
                )));
            }
        }

        match self.output.sink {
            SinkKind::Stdout | SinkKind::JsonFile => {}
            SinkKind::HttpPost => {
                if self.output.http.url.as_deref().map_or(true, str::is_empty) {
                    return Err(Error::Config(
                        "http_post sink requires output.http.url".to_string(),
                    ));
                }
            }
            SinkKind::Database => {
                if self.output.database.url.as_deref().map_or(true, str::is_empty) {
                    return Err(Error::Config(
                        "database sink requires output.database.url".to_string(),
                    ));
                }
                if !is_sql_identifier(&self.output.database.table) {
                    return Err(Error::Config(format!(
                        "database table '{}' is not a valid identifier",
                        self.output.database.table
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Per-user config file location (`<config_dir>/ytspec/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ytspec").join("config.toml"))
}

/// ASCII letter or underscore followed by letters, digits or underscores
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
