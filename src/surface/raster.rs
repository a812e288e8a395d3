//! Raster previews of a surface using resvg/usvg.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::error::{Error, Result};

/// Renders SVG markup to an RGBA image at the specified size.
///
/// The SVG is scaled to fit within `size x size` pixels while preserving
/// aspect ratio (the larger dimension will be `size`).
pub fn render_svg(svg_data: &str, size: u32) -> Result<RgbaImage> {
    let opts = Options::default();
    let tree = Tree::from_str(svg_data, &opts).map_err(|e| Error::Render(e.to_string()))?;

    let svg_size = tree.size();
    let scale = (size as f32) / svg_size.width().max(svg_size.height());
    let width = (svg_size.width() * scale).ceil() as u32;
    let height = (svg_size.height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Render(format!("cannot allocate {width}x{height} pixmap")))?;
    let transform = Transform::from_scale(scale, scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(pixmap_to_rgba_image(&pixmap))
}

/// Renders SVG markup straight to PNG bytes.
pub fn render_png(svg_data: &str, size: u32) -> Result<Vec<u8>> {
    let img = render_svg(svg_data, size)?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| Error::Render(e.to_string()))?;
    Ok(buf)
}

/// Intrinsic width and height of an SVG document, if it parses.
pub fn svg_dimensions(svg_data: &[u8]) -> Option<(f32, f32)> {
    let tree = Tree::from_data(svg_data, &Options::default()).ok()?;
    let size = tree.size();
    Some((size.width(), size.height()))
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    RgbaImage::from_fn(pixmap.width(), pixmap.height(), |x, y| {
        // tiny_skia stores premultiplied alpha
        let [r, g, b, a] = pixmap
            .pixel(x, y)
            .map(|p| [p.red(), p.green(), p.blue(), p.alpha()])
            .unwrap_or([0, 0, 0, 0]);
        Rgba(unpremultiply(r, g, b, a))
    })
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let a_f = a as f32 / 255.0;
    [
        (r as f32 / a_f).round().min(255.0) as u8,
        (g as f32 / a_f).round().min(255.0) as u8,
        (b as f32 / a_f).round().min(255.0) as u8,
        a,
    ]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50"><rect width="100" height="50" fill="#ff0000"/></svg>"##;

    #[test]
    fn render_keeps_aspect_ratio() {
        let img = render_svg(SIMPLE_SVG, 40).unwrap();
        assert_eq!(img.width(), 40);
        assert_eq!(img.height(), 20);
        assert_eq!(img.get_pixel(5, 5).0, [255, 0, 0, 255]);
    }

    #[test]
    fn render_png_has_signature() {
        let png = render_png(SIMPLE_SVG, 16).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn invalid_markup_is_a_render_error() {
        assert!(matches!(render_svg("<not svg", 10), Err(Error::Render(_))));
    }

    #[test]
    fn svg_dimensions_reads_root_size() {
        assert_eq!(svg_dimensions(SIMPLE_SVG.as_bytes()), Some((100.0, 50.0)));
        assert_eq!(svg_dimensions(b"garbage"), None);
    }

    #[test]
    fn unpremultiply_restores_channels() {
        assert_eq!(unpremultiply(20, 10, 0, 51), [100, 50, 0, 51]);
        assert_eq!(unpremultiply(10, 10, 10, 0), [0, 0, 0, 0]);
    }
}
