//! Decorative overlay image composited over the rendered code.

use super::{RenderSurface, SvgElement};
use crate::config::{Offset, RenderConfig};

/// Class marking the overlay element so a later render can find and replace it.
pub const OVERLAY_CLASS: &str = "qr-overlay";

// ============================================================================
// OverlayImage
// ============================================================================

/// An `<image>` element placed on top of everything else in the surface.
///
/// The overlay is square, `size` user units on each side, with its top-left
/// corner at `offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayImage {
    /// Embeddable image reference, normally a `data:` URL.
    pub href: String,

    /// Width and height in user units.
    pub size: u32,

    /// Top-left corner in user units.
    pub offset: Offset,
}

impl OverlayImage {
    pub fn new(href: impl Into<String>, size: u32, offset: Offset) -> Self {
        Self {
            href: href.into(),
            size,
            offset,
        }
    }

    /// An overlay sized and positioned by the render configuration.
    pub fn from_config(href: impl Into<String>, config: &RenderConfig) -> Self {
        Self::new(href, config.svg_size, config.overlay_offset)
    }

    pub fn to_element(&self) -> SvgElement {
        SvgElement::new("image")
            .attr("class", OVERLAY_CLASS)
            .attr("href", &self.href)
            .attr("width", self.size)
            .attr("height", self.size)
            .attr("x", self.offset.x)
            .attr("y", self.offset.y)
    }
}

impl RenderSurface {
    /// Appends the overlay as the last element, replacing any earlier overlay.
    pub fn attach_overlay(&mut self, overlay: &OverlayImage) {
        let replaced = self.remove_class(OVERLAY_CLASS);
        if replaced > 0 {
            tracing::debug!(replaced, "replacing existing overlay");
        }
        self.append_child(overlay.to_element());
    }

    /// Overlay elements currently in the surface.
    pub fn overlays(&self) -> Vec<&SvgElement> {
        self.find_all(|el| el.name() == "image" && el.has_class(OVERLAY_CLASS))
    }
}

// ============================================================================
// Tests
// ============================================================================
