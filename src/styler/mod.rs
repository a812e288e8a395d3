//! Styled QR rendering.
//!
//! [`QrStyler`] encodes text with the `qrcode` crate and draws the matrix into
//! a fresh [`RenderSurface`] using the shapes and paints of a [`QrStyle`]:
//!
//! 1. background rect
//! 2. data modules, plus decorative padding modules for the circle shape
//! 3. the three finder patterns
//! 4. the logo, with the modules behind it hidden
//!
//! Rendering is synchronous; once [`QrStyler::update`] returns the surface is
//! complete and safe to mutate.

pub mod corners;
pub mod dots;
pub mod gradient;

use std::f32::consts::FRAC_PI_2;
use std::sync::atomic::{AtomicUsize, Ordering};

use qrcode::{QrCode, Version};

use crate::error::{Error, Result};
use crate::style::{DotType, QrStyle, Shape};
use crate::surface::{RenderSurface, SvgElement};

use corners::{DOT_MASK, SQUARE_MASK, corner_dot, corner_square, mask_at};
use dots::draw_dot;
use gradient::{Region, apply_paint};

/// Class of the logo `<image>`.
pub const LOGO_CLASS: &str = "qr-logo";

/// Side of a finder pattern in modules.
const FINDER: usize = 7;

static NEXT_INSTANCE: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// Logo
// ============================================================================

/// An embeddable logo with its intrinsic size.
#[derive(Debug, Clone, PartialEq)]
pub struct Logo {
    pub href: String,
    pub width: f32,
    pub height: f32,
}

impl Logo {
    pub fn new(href: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            href: href.into(),
            width,
            height,
        }
    }
}

/// Space reserved for the logo and the module block it hides.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogoSize {
    pub width: f32,
    pub height: f32,
    pub hide_x_dots: usize,
    pub hide_y_dots: usize,
}

/// Fits a logo of `original_width x original_height` into at most
/// `max_hidden_dots` modules, never wider or taller than `max_axis_dots`.
///
/// The hidden block always has an odd number of modules per side so it stays
/// centered on the matrix.
pub fn calculate_logo_size(
    original_width: f32,
    original_height: f32,
    max_hidden_dots: usize,
    max_axis_dots: usize,
    dot_size: f32,
) -> LogoSize {
    if original_width <= 0.0 || original_height <= 0.0 || max_hidden_dots == 0 || dot_size <= 0.0 {
        return LogoSize::default();
    }

    let k = original_height / original_width;
    let mut hide_x = ((max_hidden_dots as f32 / k).sqrt().floor() as usize).max(1);
    if max_axis_dots > 0 && max_axis_dots < hide_x {
        hide_x = max_axis_dots;
    }
    if hide_x % 2 == 0 {
        hide_x -= 1;
    }
    let mut width = hide_x as f32 * dot_size;
    let mut hide_y = odd_span(hide_x as f32 * k);
    let mut height = (width * k).round();

    let too_tall = max_axis_dots > 0 && max_axis_dots < hide_y;
    if hide_y * hide_x > max_hidden_dots || too_tall {
        if too_tall {
            hide_y = max_axis_dots;
            if hide_y % 2 == 0 {
                hide_y -= 1;
            }
        } else {
            hide_y = hide_y.saturating_sub(2).max(1);
        }
        height = hide_y as f32 * dot_size;
        hide_x = odd_span(hide_y as f32 / k);
        width = (height / k).round();
    }

    LogoSize {
        width,
        height,
        hide_x_dots: hide_x,
        hide_y_dots: hide_y,
    }
}

/// Smallest odd module count covering `span` modules.
fn odd_span(span: f32) -> usize {
    (1.0 + 2.0 * ((span - 1.0) / 2.0).ceil()).max(1.0) as usize
}

// ============================================================================
// Matrix
// ============================================================================

/// Square module matrix, row major.
#[derive(Debug, Clone)]
struct Matrix {
    count: usize,
    dark: Vec<bool>,
}

impl Matrix {
    fn encode(data: &str, style: &QrStyle) -> Result<Self> {
        let level = style.qr_options.error_correction_level.into();
        let code = match style.qr_options.type_number {
            0 => QrCode::with_error_correction_level(data.as_bytes(), level),
            n @ 1..=40 => QrCode::with_version(data.as_bytes(), Version::Normal(n as i16), level),
            n => return Err(Error::Config(format!("QR type number {n} is outside 0-40"))),
        }
        .map_err(|e| Error::Encode(e.to_string()))?;

        let dark = code
            .to_colors()
            .into_iter()
            .map(|c| c == qrcode::Color::Dark)
            .collect();
        Ok(Self {
            count: code.width(),
            dark,
        })
    }

    fn is_dark(&self, row: i32, col: i32) -> bool {
        let n = self.count as i32;
        if !(0..n).contains(&row) || !(0..n).contains(&col) {
            return false;
        }
        self.dark[row as usize * self.count + col as usize]
    }
}

// ============================================================================
// Layout
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Layout {
    count: usize,
    min_size: f32,
    dot_size: f32,
    x0: f32,
    y0: f32,
}

impl Layout {
    fn new(style: &QrStyle, count: usize) -> Result<Self> {
        let min_size = style.drawable_size();
        let round = |v: f32| if style.dots_options.round_size { v.floor() } else { v };
        let dot_size = style.dot_size(count);
        if dot_size <= 0.0 {
            return Err(Error::Render(format!(
                "{}x{} with margin {} leaves no room for {count} modules",
                style.width, style.height, style.margin
            )));
        }
        let span = count as f32 * dot_size;
        Ok(Self {
            count,
            min_size,
            dot_size,
            x0: round((style.width as f32 - span) / 2.0),
            y0: round((style.height as f32 - span) / 2.0),
        })
    }

    fn span(&self) -> f32 {
        self.count as f32 * self.dot_size
    }
}

// ============================================================================
// QrStyler
// ============================================================================

/// Draws styled codes into a [`RenderSurface`].
///
/// Each styler gets a process-unique instance number used in gradient ids, so
/// several rendered codes can share one page without their `<defs>` clashing.
#[derive(Debug)]
pub struct QrStyler {
    style: QrStyle,
    instance: usize,
    surface: Option<RenderSurface>,
    module_count: usize,
}

impl QrStyler {
    pub fn new(style: QrStyle) -> Self {
        Self {
            style,
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            surface: None,
            module_count: 0,
        }
    }

    pub fn style(&self) -> &QrStyle {
        &self.style
    }

    /// The surface of the last successful update.
    pub fn surface(&self) -> Option<&RenderSurface> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut RenderSurface> {
        self.surface.as_mut()
    }

    /// Modules per side of the last encoded matrix.
    pub fn module_count(&self) -> usize {
        self.module_count
    }

    /// Encodes `data` and redraws the surface from scratch.
    ///
    /// On error the previous surface is kept.
    pub fn update(&mut self, data: &str, logo: Option<&Logo>) -> Result<&mut RenderSurface> {
        let matrix = Matrix::encode(data, &self.style)?;
        let layout = Layout::new(&self.style, matrix.count)?;

        let logo_size = logo
            .map(|logo| self.logo_size(logo, &layout))
            .filter(|size| size.width > 0.0 && size.height > 0.0);
        let hidden = logo_size
            .filter(|_| self.style.image_options.hide_background_dots)
            .map(|size| (size.hide_x_dots, size.hide_y_dots));

        let mut surface = RenderSurface::new(self.style.width, self.style.height);
        self.draw_background(&mut surface);
        self.draw_dots(&mut surface, &matrix, &layout, hidden);
        self.draw_corners(&mut surface, &layout);
        if let (Some(logo), Some(size)) = (logo, logo_size) {
            self.draw_logo(&mut surface, &layout, logo, size);
        }

        tracing::debug!(
            modules = matrix.count,
            dot_size = layout.dot_size,
            instance = self.instance,
            "qr code drawn"
        );
        self.module_count = matrix.count;
        Ok(self.surface.insert(surface))
    }

    fn logo_size(&self, logo: &Logo, layout: &Layout) -> LogoSize {
        let ratio = self.style.qr_options.error_correction_level.recovery_ratio();
        let cover = self.style.image_options.image_size * ratio;
        let count = layout.count;
        let max_hidden = (cover * (count * count) as f32).floor() as usize;
        calculate_logo_size(
            logo.width,
            logo.height,
            max_hidden,
            count.saturating_sub(2 * FINDER),
            layout.dot_size,
        )
    }

    fn draw_background(&self, surface: &mut RenderSurface) {
        let options = &self.style.background_options;
        let (width, height) = (self.style.width as f32, self.style.height as f32);
        let size = width.min(height);
        let x = (width - size) / 2.0;
        let y = (height - size) / 2.0;

        let mut rect = SvgElement::new("rect")
            .attr("x", x)
            .attr("y", y)
            .attr("width", size)
            .attr("height", size);
        if options.round > 0.0 {
            rect.set_attr("rx", size / 2.0 * options.round.min(1.0));
        }
        let id = format!("background-color-{}", self.instance);
        apply_paint(
            surface,
            &mut rect,
            options.color,
            options.gradient.as_ref(),
            0.0,
            Region::new(0.0, 0.0, width, height),
            &id,
        );
        surface.append_child(rect);
    }

    fn draw_dots(
        &self,
        surface: &mut RenderSurface,
        matrix: &Matrix,
        layout: &Layout,
        hidden: Option<(usize, usize)>,
    ) {
        let options = &self.style.dots_options;
        let count = layout.count as i32;
        let size = layout.dot_size;
        let visible = |row: i32, col: i32| {
            if let Some((hide_x, hide_y)) = hidden {
                let (hx, hy) = (hide_x as i32, hide_y as i32);
                let in_rows = 2 * row >= count - hy && 2 * row < count + hy;
                let in_cols = 2 * col >= count - hx && 2 * col < count + hx;
                if in_rows && in_cols {
                    return false;
                }
            }
            !in_finder(row, col, count)
        };

        let mut group = SvgElement::new("g").attr("class", "qr-dots");
        for row in 0..count {
            for col in 0..count {
                if !visible(row, col) || !matrix.is_dark(row, col) {
                    continue;
                }
                group.push(draw_dot(
                    options.kind,
                    layout.x0 + col as f32 * size,
                    layout.y0 + row as f32 * size,
                    size,
                    |dx, dy| visible(row + dy, col + dx) && matrix.is_dark(row + dy, col + dx),
                ));
            }
        }

        if self.style.shape == Shape::Circle {
            self.draw_circle_padding(&mut group, matrix, layout);
        }

        let id = format!("dot-color-{}", self.instance);
        let (width, height) = (self.style.width as f32, self.style.height as f32);
        apply_paint(
            surface,
            &mut group,
            options.color,
            options.gradient.as_ref(),
            0.0,
            Region::new(0.0, 0.0, width, height),
            &id,
        );
        surface.append_child(group);
    }

    /// Fills the ring between the shrunken matrix and the circle with modules
    /// borrowed from the matrix edges.
    fn draw_circle_padding(&self, group: &mut SvgElement, matrix: &Matrix, layout: &Layout) {
        let count = layout.count;
        let size = layout.dot_size;
        let extra = ((layout.min_size / size - count as f32) / 2.0).floor().max(0.0) as usize;
        if extra == 0 {
            return;
        }
        let fake = count + 2 * extra;
        let x0 = layout.x0 - extra as f32 * size;
        let y0 = layout.y0 - extra as f32 * size;
        let center = (fake / 2) as f32;

        let source = |k: usize| {
            if k < 2 * extra {
                k
            } else if k >= count {
                k - 2 * extra
            } else {
                k - extra
            }
        };
        let mut padding = vec![false; fake * fake];
        for row in 0..fake {
            for col in 0..fake {
                let inner = (extra.saturating_sub(1)..=fake - extra).contains(&row)
                    && (extra.saturating_sub(1)..=fake - extra).contains(&col);
                let (dr, dc) = (row as f32 - center, col as f32 - center);
                if inner || (dr * dr + dc * dc).sqrt() > center {
                    continue;
                }
                padding[row * fake + col] = matrix.is_dark(source(col) as i32, source(row) as i32);
            }
        }

        let at = |row: i32, col: i32| {
            let n = fake as i32;
            (0..n).contains(&row) && (0..n).contains(&col) && padding[(row * n + col) as usize]
        };
        for row in 0..fake as i32 {
            for col in 0..fake as i32 {
                if !at(row, col) {
                    continue;
                }
                group.push(draw_dot(
                    self.style.dots_options.kind,
                    x0 + col as f32 * size,
                    y0 + row as f32 * size,
                    size,
                    |dx, dy| at(row + dy, col + dx),
                ));
            }
        }
    }

    fn draw_corners(&self, surface: &mut RenderSurface, layout: &Layout) {
        let size = layout.dot_size;
        let square_size = size * FINDER as f32;
        let dot_size = size * 3.0;
        let shift = size * (layout.count - FINDER) as f32;
        let square_options = &self.style.corners_square_options;
        let dot_options = &self.style.corners_dot_options;
        let dot_kind = self.style.dots_options.kind;

        for (column, row, rotation) in [(0, 0, 0.0), (1, 0, FRAC_PI_2), (0, 1, -FRAC_PI_2)] {
            let x = layout.x0 + column as f32 * shift;
            let y = layout.y0 + row as f32 * shift;

            let mut square = SvgElement::new("g").attr("class", "qr-corner-square");
            match square_options.kind {
                Some(kind) => square.push(corner_square(kind, x, y, square_size, rotation)),
                None => push_masked(&mut square, &SQUARE_MASK, dot_kind, x, y, size),
            }
            let id = format!("corners-square-color-{column}-{row}-{}", self.instance);
            apply_paint(
                surface,
                &mut square,
                square_options.color,
                square_options.gradient.as_ref(),
                rotation,
                Region::square(x, y, square_size),
                &id,
            );
            surface.append_child(square);

            let (dx, dy) = (x + size * 2.0, y + size * 2.0);
            let mut dot = SvgElement::new("g").attr("class", "qr-corner-dot");
            match dot_options.kind {
                Some(kind) => dot.push(corner_dot(kind, dx, dy, dot_size, rotation)),
                None => push_masked(&mut dot, &DOT_MASK, dot_kind, x, y, size),
            }
            let id = format!("corners-dot-color-{column}-{row}-{}", self.instance);
            apply_paint(
                surface,
                &mut dot,
                dot_options.color,
                dot_options.gradient.as_ref(),
                rotation,
                Region::square(dx, dy, dot_size),
                &id,
            );
            surface.append_child(dot);
        }
    }

    fn draw_logo(&self, surface: &mut RenderSurface, layout: &Layout, logo: &Logo, size: LogoSize) {
        let margin = self.style.image_options.margin as f32;
        let x = layout.x0 + margin + (layout.span() - size.width) / 2.0;
        let y = layout.y0 + margin + (layout.span() - size.height) / 2.0;
        let width = (size.width - 2.0 * margin).max(0.0);
        let height = (size.height - 2.0 * margin).max(0.0);

        surface.append_child(
            SvgElement::new("image")
                .attr("class", LOGO_CLASS)
                .attr("href", &logo.href)
                .attr("x", x)
                .attr("y", y)
                .attr("width", width)
                .attr("height", height),
        );
    }
}

/// Whether `(row, col)` lies on a finder ring or finder center.
fn in_finder(row: i32, col: i32, count: i32) -> bool {
    let shift = count - FINDER as i32;
    [&SQUARE_MASK, &DOT_MASK].into_iter().any(|mask| {
        mask_at(mask, row, col) || mask_at(mask, row - shift, col) || mask_at(mask, row, col - shift)
    })
}

/// Draws every cell of a 7x7 `mask` as a module of `kind`.
fn push_masked(
    group: &mut SvgElement,
    mask: &[[bool; 7]; 7],
    kind: DotType,
    x: f32,
    y: f32,
    size: f32,
) {
    for row in 0..FINDER as i32 {
        for col in 0..FINDER as i32 {
            if !mask_at(mask, row, col) {
                continue;
            }
            group.push(draw_dot(
                kind,
                x + col as f32 * size,
                y + row as f32 * size,
                size,
                |dx, dy| mask_at(mask, row + dy, col + dx),
            ));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
