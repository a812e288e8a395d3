//! Session configuration: asset references, canvas size and overlay offset.

use serde::{Deserialize, Serialize};

use crate::colors::PaletteConfig;
use crate::error::{Error, Result};
use crate::style::{QrStyle, SMALLEST_SYMBOL};

pub const DEFAULT_LOGO_URL: &str = "../assets/logo.png";
pub const DEFAULT_OVERLAY_URL: &str = "../assets/overlay.png";
pub const DEFAULT_SVG_SIZE: u32 = 400;

/// Position of the overlay image inside the rendered surface, in SVG user units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Configuration for one rendering session.
///
/// Supplied once at start-up and read by both the rendering wrapper and the
/// UI controller. Image references are resolved by an
/// [`AssetSource`](crate::assets::AssetSource), so they may be paths, URLs or
/// `data:` URLs depending on the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    /// Image embedded in the middle of the code.
    pub logo_url: String,

    /// Decorative image composited on top of the finished code.
    pub overlay_url: String,

    /// Width and height of the surface and of the overlay image.
    pub svg_size: u32,

    /// Where the overlay's top-left corner lands.
    pub overlay_offset: Offset,

    /// Text placed in the input on start-up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_data: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            logo_url: DEFAULT_LOGO_URL.to_string(),
            overlay_url: DEFAULT_OVERLAY_URL.to_string(),
            svg_size: DEFAULT_SVG_SIZE,
            overlay_offset: Offset::new(3.0, 1.0),
            default_data: None,
        }
    }
}

impl RenderConfig {
    pub fn with_overlay(mut self, overlay_url: impl Into<String>, offset: Offset) -> Self {
        self.overlay_url = overlay_url.into();
        self.overlay_offset = offset;
        self
    }

    pub fn with_logo(mut self, logo_url: impl Into<String>) -> Self {
        self.logo_url = logo_url.into();
        self
    }

    pub fn with_svg_size(mut self, svg_size: u32) -> Self {
        self.svg_size = svg_size;
        self
    }

    pub fn with_default_data(mut self, data: impl Into<String>) -> Self {
        self.default_data = Some(data.into());
        self
    }

    /// Checks the values the renderer cannot work without.
    pub fn validate(&self) -> Result<()> {
        if self.svg_size == 0 {
            return Err(Error::Config("svgSize must be greater than zero".into()));
        }
        let style = QrStyle::from_config(self, &PaletteConfig::default());
        if style.dot_size(SMALLEST_SYMBOL) <= 0.0 {
            return Err(Error::Config(format!(
                "svgSize {} leaves no room for a {SMALLEST_SYMBOL}-module code inside a {}px margin",
                self.svg_size, style.margin
            )));
        }
        if self.overlay_url.trim().is_empty() {
            return Err(Error::Config("overlayUrl must not be empty".into()));
        }
        if !self.overlay_offset.x.is_finite() || !self.overlay_offset.y.is_finite() {
            return Err(Error::Config("overlayOffset must be finite".into()));
        }
        Ok(())
    }
}
