//! Serializable profile bundling render configuration and palette.
//!
//! A [`Profile`] is what front ends load at start-up: the CLI reads it from a
//! JSON file, the browser entry point receives it as a JS object.
//!
//! # Example
//!
//! ```
//! use qr_overlay::{Profile, RenderConfig, PaletteConfig};
//!
//! let profile = Profile::new()
//!     .with_render(RenderConfig::default().with_default_data("HELLO"))
//!     .with_palette(PaletteConfig::default());
//!
//! let json = profile.to_json().unwrap();
//! let restored = Profile::from_json(&json).unwrap();
//! assert_eq!(restored.render.default_data.as_deref(), Some("HELLO"));
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::colors::PaletteConfig;
use crate::config::RenderConfig;
use crate::error::Result;

/// All start-up settings in one JSON-friendly value.
///
/// # JSON Format
///
/// ```json
/// {
///   "render": {
///     "logoUrl": "../assets/logo.png",
///     "overlayUrl": "../assets/overlay.png",
///     "svgSize": 400,
///     "overlayOffset": { "x": 3.0, "y": 1.0 }
///   },
///   "palette": {
///     "dotsColor": "#15a6d3",
///     "background": "rgba(0,0,0,0)"
///   }
/// }
/// ```
///
/// Missing sections and fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub render: RenderConfig,
    pub palette: PaletteConfig,
}

impl Profile {
    /// Creates a profile with default render settings and palette.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }

    pub fn with_palette(mut self, palette: PaletteConfig) -> Self {
        self.palette = palette;
        self
    }

    /// Serializes the profile to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the profile to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes and validates a profile from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(json)?;
        profile.render.validate()?;
        Ok(profile)
    }

    /// Reads a profile from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// JSON schema of [`Profile`], for editors and config tooling.
#[cfg(feature = "jsonschema")]
pub fn profile_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(Profile)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::Color;
    use crate::config::Offset;
    use crate::error::Error;

    #[test]
    fn profile_json_format() {
        let json = Profile::new().to_json_pretty().unwrap();

        assert!(json.contains("\"render\""));
        assert!(json.contains("\"overlayOffset\""));
        assert!(json.contains("\"cornerDotGradient\""));
        assert!(!json.contains("defaultData"));
    }

    #[test]
    fn empty_profile_deserializes() {
        let profile = Profile::from_json("{}").unwrap();
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let json = r##"{
            "render": { "overlayOffset": { "x": 10, "y": 20 } },
            "palette": { "cornerSquare": "#000000" }
        }"##;
        let profile = Profile::from_json(json).unwrap();

        assert_eq!(profile.render.overlay_offset, Offset::new(10.0, 20.0));
        assert_eq!(profile.render.svg_size, 400);
        assert_eq!(profile.palette.corner_square, Color::black());
        assert_eq!(profile.palette.dots_color, PaletteConfig::default().dots_color);
    }

    #[test]
    fn invalid_render_config_is_rejected() {
        let err = Profile::from_json(r#"{"render": {"svgSize": 0}}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn profile_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        std::fs::write(&path, r#"{"render": {"defaultData": "from file"}}"#).unwrap();

        let profile = Profile::from_file(&path).unwrap();
        assert_eq!(profile.render.default_data.as_deref(), Some("from file"));
    }
}
