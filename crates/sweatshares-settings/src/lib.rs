//! SweatShares Settings Crate
//!
//! Handles editor configuration: defaults, JSON/TOML persistence and validation.

pub mod config;
pub mod error;

pub use config::{EditorSettings, FieldSettings, RenderSettings, RequestSettings, ZoomSettings};
pub use error::{SettingsError, SettingsResult};
