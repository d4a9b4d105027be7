//! Configuration for the signature field editor.
//!
//! Settings are grouped into sections:
//! - Zoom limits and step size
//! - Field defaults (size, label, handle tolerance)
//! - Page render limits
//! - Signature request limits (message length, expiration)
//!
//! Files may be JSON or TOML. Every section and key is optional; missing
//! values take their defaults.

use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Zoom settings. Zoom is a multiplier on top of the fit-to-container scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    /// Smallest allowed zoom level
    pub min: f64,
    /// Largest allowed zoom level
    pub max: f64,
    /// Increment applied by zoom in/out and wheel gestures
    pub step: f64,
    /// Zoom level used when a document is opened
    pub default: f64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            min: 0.5,
            max: 3.0,
            step: 0.1,
            default: 1.0,
        }
    }
}

/// Field placement settings.
///
/// Sizes are in viewer pixels and are converted to PDF units with the scale
/// in effect when the gesture happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Width of a newly created field
    pub default_width_px: f64,
    /// Height of a newly created field
    pub default_height_px: f64,
    /// Smallest width or height a resize may produce
    pub min_size_px: f64,
    /// Distance from a corner that still grabs the resize handle
    pub handle_tolerance_px: f64,
    /// Label given to new fields
    pub default_label: String,
    /// Whether new fields are required
    pub required_by_default: bool,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            default_width_px: 300.0,
            default_height_px: 150.0,
            min_size_px: 50.0,
            handle_tolerance_px: 20.0,
            default_label: "Signature".to_string(),
            required_by_default: true,
        }
    }
}

/// Page render settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Upper bound on the fit-to-container scale, keeps small pages from
    /// rendering oversized.
    pub max_fit_scale: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { max_fit_scale: 2.0 }
    }
}

/// Signature request settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSettings {
    /// Maximum length of the message sent to the receiver, in characters
    pub max_message_len: usize,
    /// Expiration used when the caller does not pick one
    pub default_expiration_days: u32,
    /// Longest expiration accepted
    pub max_expiration_days: u32,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            max_message_len: 300,
            default_expiration_days: 7,
            max_expiration_days: 365,
        }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub zoom: ZoomSettings,
    pub fields: FieldSettings,
    pub render: RenderSettings,
    pub request: RequestSettings,
}

impl EditorSettings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the platform config file location
    /// (`<config dir>/sweatshares/editor.toml`).
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no config directory for this platform".to_string())
        })?;
        Ok(dir.join("sweatshares").join("editor.toml"))
    }

    /// Load settings from a `.json` or `.toml` file and validate them.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let settings: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::LoadError(format!(
                "{} must be .json or .toml",
                path.display()
            )));
        };

        settings.validate()?;
        tracing::debug!(path = %path.display(), "loaded editor settings");
        Ok(settings)
    }

    /// Load settings from `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save settings to a `.json` or `.toml` file, creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(SettingsError::SaveError(format!(
                "{} must be .json or .toml",
                path.display()
            )));
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate settings
    pub fn validate(&self) -> SettingsResult<()> {
        let zoom = &self.zoom;
        if !(zoom.min > 0.0) || !zoom.min.is_finite() {
            return Err(SettingsError::invalid("zoom.min", "must be > 0"));
        }
        if !(zoom.max >= zoom.min) || !zoom.max.is_finite() {
            return Err(SettingsError::invalid("zoom.max", "must be >= zoom.min"));
        }
        if !(zoom.step > 0.0) {
            return Err(SettingsError::invalid("zoom.step", "must be > 0"));
        }
        if zoom.default < zoom.min || zoom.default > zoom.max {
            return Err(SettingsError::invalid(
                "zoom.default",
                format!("must lie in [{}, {}]", zoom.min, zoom.max),
            ));
        }

        let fields = &self.fields;
        if !(fields.default_width_px > 0.0) || !(fields.default_height_px > 0.0) {
            return Err(SettingsError::invalid(
                "fields.default_size",
                "width and height must be > 0",
            ));
        }
        if !(fields.min_size_px > 0.0) {
            return Err(SettingsError::invalid("fields.min_size_px", "must be > 0"));
        }
        if fields.min_size_px > fields.default_width_px.min(fields.default_height_px) {
            return Err(SettingsError::invalid(
                "fields.min_size_px",
                "must not exceed the default field size",
            ));
        }
        if fields.handle_tolerance_px < 0.0 {
            return Err(SettingsError::invalid(
                "fields.handle_tolerance_px",
                "must be >= 0",
            ));
        }
        if fields.default_label.trim().is_empty() {
            return Err(SettingsError::invalid(
                "fields.default_label",
                "must not be empty",
            ));
        }

        if !(self.render.max_fit_scale > 0.0) {
            return Err(SettingsError::invalid("render.max_fit_scale", "must be > 0"));
        }

        let request = &self.request;
        if request.max_message_len == 0 {
            return Err(SettingsError::invalid("request.max_message_len", "must be > 0"));
        }
        if request.default_expiration_days == 0
            || request.default_expiration_days > request.max_expiration_days
        {
            return Err(SettingsError::invalid(
                "request.default_expiration_days",
                format!("must lie in [1, {}]", request.max_expiration_days),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = EditorSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.zoom.min, 0.5);
        assert_eq!(settings.zoom.max, 3.0);
        assert_eq!(settings.fields.default_width_px, 300.0);
        assert_eq!(settings.fields.default_height_px, 150.0);
        assert_eq!(settings.fields.min_size_px, 50.0);
        assert_eq!(settings.request.max_message_len, 300);
    }

    #[test]
    fn test_validate_rejects_inverted_zoom() {
        let mut settings = EditorSettings::default();
        settings.zoom.max = 0.25;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("zoom.max"));
    }

    #[test]
    fn test_validate_rejects_empty_label() {
        let mut settings = EditorSettings::default();
        settings.fields.default_label = "   ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let settings: EditorSettings = toml::from_str("[zoom]\nmax = 4.0\n").unwrap();
        assert_eq!(settings.zoom.max, 4.0);
        assert_eq!(settings.zoom.min, 0.5);
        assert_eq!(settings.fields, FieldSettings::default());
    }
}
