//! Settings loading: format detection, file discovery, parsing, validation.
//!
//! The output is a resolved [`BufferConfig`]. Out-of-range values are
//! rejected here, before the controller ever sees them.

use std::path::{Path, PathBuf};

use log::info;
use warpbuffer_core::fixed::Fixed64;
use warpbuffer_power::config::BufferConfig;

use crate::schema::{SETTINGS_BASE_NAME, SettingsData};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two settings files with different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A value is non-positive or not finite.
    #[error("setting '{field}' out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    /// The resource name is empty.
    #[error("setting 'resource' must not be empty")]
    EmptyResource,

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported settings file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

const EXTENSIONS: [(&str, Format); 3] = [
    ("ron", Format::Ron),
    ("toml", Format::Toml),
    ("json", Format::Json),
];

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, SettingsError> {
    let ext = path.extension().and_then(|e| e.to_str());
    EXTENSIONS
        .iter()
        .find(|(name, _)| Some(*name) == ext)
        .map(|(_, format)| *format)
        .ok_or_else(|| SettingsError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Look for `settings.{ron,toml,json}` in `dir`.
///
/// Returns `Ok(None)` if there is none, or `Err(ConflictingFormats)` if more
/// than one format is present.
pub fn find_settings_file(dir: &Path) -> Result<Option<PathBuf>, SettingsError> {
    let mut found: Option<PathBuf> = None;

    for (ext, _) in &EXTENSIONS {
        let candidate = dir.join(format!("{SETTINGS_BASE_NAME}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(SettingsError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

// ===========================================================================
// Parsing and validation
// ===========================================================================

/// Deserialize settings text in the given format. `origin` is only used in
/// error messages.
pub fn parse_settings(
    content: &str,
    format: Format,
    origin: &Path,
) -> Result<SettingsData, SettingsError> {
    let parse_err = |detail: String| SettingsError::Parse {
        file: origin.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// Convert to fixed point, then require a strictly positive result. Values
/// that round to zero or do not fit are out of range.
fn positive(field: &'static str, value: f64) -> Result<Fixed64, SettingsError> {
    value
        .is_finite()
        .then(|| Fixed64::checked_from_num(value))
        .flatten()
        .filter(|v| *v > Fixed64::ZERO)
        .ok_or(SettingsError::OutOfRange { field, value })
}

/// Validate raw settings and resolve them into a [`BufferConfig`].
pub fn resolve(data: &SettingsData) -> Result<BufferConfig, SettingsError> {
    let buffer_scale = positive("buffer_scaling", data.buffer_scaling)?;
    let warp_threshold = positive("time_warp_limit", data.time_warp_limit)?;
    let config = BufferConfig::new(buffer_scale, warp_threshold);
    match data.resource.as_deref() {
        Some("") => Err(SettingsError::EmptyResource),
        Some(resource) => Ok(config.with_resource(resource)),
        None => Ok(config),
    }
}

// ===========================================================================
// Entry points
// ===========================================================================

/// Read, parse and validate one settings file.
pub fn load_settings(path: &Path) -> Result<BufferConfig, SettingsError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    let data = parse_settings(&content, format, path)?;
    let config = resolve(&data)?;
    info!(
        "loaded settings from {}: buffer scale {}, warp limit {}, resource {}",
        path.display(),
        data.buffer_scaling,
        data.time_warp_limit,
        config.resource
    );
    Ok(config)
}

/// Load the settings file in `dir`, or fall back to the defaults when there
/// is none.
pub fn load_settings_dir(dir: &Path) -> Result<BufferConfig, SettingsError> {
    match find_settings_file(dir)? {
        Some(path) => load_settings(&path),
        None => {
            info!("no settings file in {}, using defaults", dir.display());
            Ok(BufferConfig::default())
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
