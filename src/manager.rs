//! Rendering wrapper around the styler.
//!
//! [`QrCodeManager`] owns one [`QrStyler`] and adds what the stock styled code
//! lacks: the logo loaded from the configured reference and the decorative
//! overlay image composited on top once the code is drawn.

use crate::assets::{AssetSource, EmbeddedImage, fetch_image};
use crate::colors::PaletteConfig;
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::style::QrStyle;
use crate::styler::{Logo, QrStyler};
use crate::surface::raster;
use crate::surface::{OverlayImage, RenderSurface};
use crate::view::Download;

/// Trims `text` the way the page does: Unicode whitespace plus the byte order
/// mark, which `str::trim` keeps.
pub fn trim_input(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Renders codes and packages them for download.
#[derive(Debug)]
pub struct QrCodeManager {
    config: RenderConfig,
    styler: QrStyler,
    /// `None` until the logo has been looked up; `Some(None)` if it could not be used.
    logo: Option<Option<Logo>>,
    ready: bool,
}

impl QrCodeManager {
    /// Creates a manager with the stock style for `config` and `palette`.
    pub fn new(config: RenderConfig, palette: &PaletteConfig) -> Result<Self> {
        config.validate()?;
        let style = QrStyle::from_config(&config, palette);
        Ok(Self::with_style(config, style))
    }

    /// Creates a manager with a custom style. The overlay still follows `config`.
    pub fn with_style(config: RenderConfig, style: QrStyle) -> Self {
        Self {
            config,
            styler: QrStyler::new(style),
            logo: None,
            ready: false,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Whether a generate has completed and a download is available.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn surface(&self) -> Option<&RenderSurface> {
        self.styler.surface()
    }

    /// Serialized SVG of the current surface.
    pub fn svg_markup(&self) -> Option<String> {
        self.surface().map(RenderSurface::to_svg_string)
    }

    /// Renders `text` and composites the overlay on top.
    ///
    /// The styler finishes drawing before this continues, so the overlay is
    /// always appended to a complete surface. An overlay that cannot be
    /// fetched fails the whole call; the freshly drawn code is kept without
    /// an overlay and the ready flag is left as it was.
    pub async fn generate<A: AssetSource>(&mut self, text: &str, assets: &A) -> Result<()> {
        let text = trim_input(text);
        if text.is_empty() {
            return Err(Error::EmptyData);
        }

        let logo = self.load_logo(assets).await;
        self.styler.update(text, logo.as_ref())?;

        let overlay = fetch_image(assets, &self.config.overlay_url).await?;
        let overlay = OverlayImage::from_config(overlay.data_url(), &self.config);
        let surface = self
            .styler
            .surface_mut()
            .ok_or_else(|| Error::Render("styler produced no surface".into()))?;
        surface.attach_overlay(&overlay);

        self.ready = true;
        tracing::info!(
            chars = text.chars().count(),
            modules = self.styler.module_count(),
            "qr code generated"
        );
        Ok(())
    }

    /// Packages the current surface as `qr-code.svg`, or `None` before the
    /// first render.
    pub fn download(&self) -> Option<Download> {
        let Some(markup) = self.svg_markup() else {
            tracing::debug!("download requested before any render");
            return None;
        };
        tracing::info!(bytes = markup.len(), "download prepared");
        Some(Download::svg(markup))
    }

    /// Rasterizes the current surface to PNG bytes, `size` pixels on the long side.
    pub fn render_png(&self, size: u32) -> Result<Option<Vec<u8>>> {
        self.svg_markup()
            .map(|markup| raster::render_png(&markup, size))
            .transpose()
    }

    async fn load_logo<A: AssetSource>(&mut self, assets: &A) -> Option<Logo> {
        if let Some(cached) = &self.logo {
            return cached.clone();
        }
        let logo = match fetch_image(assets, &self.config.logo_url).await {
            Ok(image) => logo_from(&image, &self.config.logo_url),
            Err(e) => {
                tracing::warn!(error = %e, "rendering without logo");
                None
            }
        };
        self.logo = Some(logo.clone());
        logo
    }
}

fn logo_from(image: &EmbeddedImage, reference: &str) -> Option<Logo> {
    let logo = image.to_logo();
    if logo.is_none() {
        tracing::warn!(reference, mime = %image.mime, "logo has no readable size, rendering without it");
    }
    logo
}

// ============================================================================
// Tests
// ============================================================================
