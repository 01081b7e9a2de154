//! Clip input resolution
//!
//! The clip is named by one positional argument or by `YTSPEC_VIDEO_ID`.
//! The name is reduced to a safe base filename before it touches the
//! filesystem, then resolved to `<audio_dir>/<name>.<extension>`.

use std::fs::File;
use std::path::{Path, PathBuf};

use ytspec_common::config::PipelineConfig;
use ytspec_common::{Error, Result};

/// A resolved clip: identifier plus the audio file it is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipInput {
    /// Sanitized name, used as the result identifier
    pub id: String,
    /// Audio file path
    pub path: PathBuf,
}

impl ClipInput {
    /// Resolve a raw clip name against the configured audio directory
    ///
    /// # Errors
    /// * `Error::InvalidInput` - no name given, or nothing left after sanitizing
    pub fn resolve(target: Option<&str>, config: &PipelineConfig) -> Result<Self> {
        let raw = target
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "no clip given (pass a file name or hash, or set {})",
                    ytspec_common::config::ENV_VIDEO_ID
                ))
            })?;

        let id = sanitize_base_name(raw)?;
        if id != raw {
            tracing::debug!(raw, sanitized = %id, "Sanitized clip name");
        }

        let path = config
            .audio_dir
            .join(format!("{}.{}", id, config.extension));

        Ok(Self { id, path })
    }

    /// Container hint for the extractor
    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|e| e.to_str())
    }

    /// Open the audio file for reading
    ///
    /// # Errors
    /// * `Error::Input` - missing or unreadable file
    pub fn open(&self) -> Result<File> {
        open_audio(&self.path)
    }
}

/// Open an audio file, mapping failures to `Error::Input`
pub fn open_audio(path: &Path) -> Result<File> {
    File::open(path)
        .map_err(|e| Error::Input(format!("Failed to open audio file {}: {}", path.display(), e)))
}

/// Reduce an arbitrary string to a safe base filename
///
/// - Only the final `/` or `\` separated component is kept
/// - Joining characters (space `&` `_` `=` `+` `:`) become `-`
/// - Anything other than ASCII alphanumerics, `-` and `.` is dropped
/// - Runs of `-` collapse to one
/// - Leading `.`/`-` and trailing `-` are trimmed, so `..` cannot survive
///
/// # Errors
/// * `Error::InvalidInput` - the result is empty
pub fn sanitize_base_name(raw: &str) -> Result<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let mut cleaned = String::with_capacity(base.len());
    for c in base.chars() {
        let c = match c {
            ' ' | '&' | '_' | '=' | '+' | ':' => '-',
            c if c.is_ascii_alphanumeric() || matches!(c, '-' | '.') => c,
            _ => continue,
        };
        if c == '-' && cleaned.ends_with('-') {
            continue;
        }
        cleaned.push(c);
    }

    let trimmed = cleaned
        .trim_start_matches(['.', '-'])
        .trim_end_matches('-');

    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!(
            "clip name '{}' has no usable characters",
            raw
        )));
    }

    Ok(trimmed.to_string())
}
