//! Module shapes.
//!
//! Each dark module is drawn as a figure whose outline depends on which of
//! its four neighbours are also drawn. `neighbor(dx, dy)` answers that for the
//! module at the given offset.

use std::f32::consts::{FRAC_PI_2, PI};

use crate::style::DotType;
use crate::surface::SvgElement;

/// Draws one module of `size` with its top-left corner at `(x, y)`.
pub fn draw_dot(
    kind: DotType,
    x: f32,
    y: f32,
    size: f32,
    neighbor: impl Fn(i32, i32) -> bool,
) -> SvgElement {
    match kind {
        DotType::Square => basic_square(x, y, size),
        DotType::Dots => basic_dot(x, y, size),
        DotType::Rounded => rounded(x, y, size, neighbor),
        DotType::Classy => classy(x, y, size, neighbor),
    }
}

struct Neighbors {
    left: bool,
    right: bool,
    top: bool,
    bottom: bool,
}

impl Neighbors {
    fn of(neighbor: impl Fn(i32, i32) -> bool) -> Self {
        Self {
            left: neighbor(-1, 0),
            right: neighbor(1, 0),
            top: neighbor(0, -1),
            bottom: neighbor(0, 1),
        }
    }

    fn count(&self) -> usize {
        [self.left, self.right, self.top, self.bottom]
            .into_iter()
            .filter(|n| *n)
            .count()
    }
}

fn rounded(x: f32, y: f32, size: f32, neighbor: impl Fn(i32, i32) -> bool) -> SvgElement {
    let n = Neighbors::of(neighbor);
    let count = n.count();

    if count == 0 {
        return basic_dot(x, y, size);
    }
    if count > 2 || (n.left && n.right) || (n.top && n.bottom) {
        return basic_square(x, y, size);
    }
    if count == 2 {
        let rotation = if n.left && n.top {
            FRAC_PI_2
        } else if n.top && n.right {
            PI
        } else if n.right && n.bottom {
            -FRAC_PI_2
        } else {
            0.0
        };
        return basic_corner_rounded(x, y, size, rotation);
    }

    let rotation = if n.top {
        FRAC_PI_2
    } else if n.right {
        PI
    } else if n.bottom {
        -FRAC_PI_2
    } else {
        0.0
    };
    basic_side_rounded(x, y, size, rotation)
}

fn classy(x: f32, y: f32, size: f32, neighbor: impl Fn(i32, i32) -> bool) -> SvgElement {
    let n = Neighbors::of(neighbor);

    if n.count() == 0 {
        return basic_corners_rounded(x, y, size, FRAC_PI_2);
    }
    if !n.left && !n.top {
        return basic_corner_rounded(x, y, size, -FRAC_PI_2);
    }
    if !n.right && !n.bottom {
        return basic_corner_rounded(x, y, size, FRAC_PI_2);
    }
    basic_square(x, y, size)
}

// ============================================================================
// Basic figures
// ============================================================================

pub fn basic_dot(x: f32, y: f32, size: f32) -> SvgElement {
    SvgElement::new("circle")
        .attr("cx", x + size / 2.0)
        .attr("cy", y + size / 2.0)
        .attr("r", size / 2.0)
}

pub fn basic_square(x: f32, y: f32, size: f32) -> SvgElement {
    SvgElement::new("rect")
        .attr("x", x)
        .attr("y", y)
        .attr("width", size)
        .attr("height", size)
}

/// Square with one fully rounded side, facing left before rotation.
fn basic_side_rounded(x: f32, y: f32, size: f32, rotation: f32) -> SvgElement {
    let h = size / 2.0;
    let d = format!("M {x} {y} v {size} h {h} a {h} {h} 0 0 0 0 {}", -size);
    rotated(SvgElement::new("path").attr("d", d), x, y, size, rotation)
}

/// Square with its top-right corner rounded before rotation.
fn basic_corner_rounded(x: f32, y: f32, size: f32, rotation: f32) -> SvgElement {
    let h = size / 2.0;
    let d = format!("M {x} {y} v {size} h {size} v {} a {h} {h} 0 0 0 {} {}", -h, -h, -h);
    rotated(SvgElement::new("path").attr("d", d), x, y, size, rotation)
}

/// Leaf shape: two opposite corners rounded.
fn basic_corners_rounded(x: f32, y: f32, size: f32, rotation: f32) -> SvgElement {
    let h = size / 2.0;
    let d = format!(
        "M {x} {y} v {h} a {h} {h} 0 0 0 {h} {h} h {h} v {} a {h} {h} 0 0 0 {} {}",
        -h, -h, -h
    );
    rotated(SvgElement::new("path").attr("d", d), x, y, size, rotation)
}

/// Rotates `el` around the center of its `size` box.
pub fn rotated(el: SvgElement, x: f32, y: f32, size: f32, rotation: f32) -> SvgElement {
    if rotation == 0.0 {
        return el;
    }
    let cx = x + size / 2.0;
    let cy = y + size / 2.0;
    el.attr(
        "transform",
        format!("rotate({},{cx},{cy})", rotation.to_degrees()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none(_: i32, _: i32) -> bool {
        false
    }

    fn all(_: i32, _: i32) -> bool {
        true
    }

    #[test]
    fn square_and_dots_ignore_neighbors() {
        let sq = draw_dot(DotType::Square, 8.0, 16.0, 8.0, none);
        assert_eq!(sq.to_string(), r#"<rect x="8" y="16" width="8" height="8"/>"#);

        let dot = draw_dot(DotType::Dots, 0.0, 0.0, 8.0, all);
        assert_eq!(dot.to_string(), r#"<circle cx="4" cy="4" r="4"/>"#);
    }

    #[test]
    fn rounded_isolated_module_is_a_circle() {
        assert_eq!(draw_dot(DotType::Rounded, 0.0, 0.0, 4.0, none).name(), "circle");
        assert_eq!(draw_dot(DotType::Rounded, 0.0, 0.0, 4.0, all).name(), "rect");
    }

    #[test]
    fn rounded_end_of_line_is_rotated() {
        // only the right neighbour: rounded side faces left, rotated half a turn
        let el = draw_dot(DotType::Rounded, 0.0, 0.0, 4.0, |dx, dy| dx == 1 && dy == 0);
        assert_eq!(el.name(), "path");
        assert_eq!(el.get_attr("transform"), Some("rotate(180,2,2)"));
    }

    #[test]
    fn classy_shapes() {
        let lone = draw_dot(DotType::Classy, 0.0, 0.0, 4.0, none);
        assert_eq!(lone.name(), "path");
        assert_eq!(lone.get_attr("transform"), Some("rotate(90,2,2)"));

        let inner = draw_dot(DotType::Classy, 0.0, 0.0, 4.0, all);
        assert_eq!(inner.name(), "rect");

        // top-left end of a run
        let start = draw_dot(DotType::Classy, 0.0, 0.0, 4.0, |dx, dy| (dx, dy) == (1, 0));
        assert_eq!(start.get_attr("transform"), Some("rotate(-90,2,2)"));
    }

    #[test]
    fn zero_rotation_has_no_transform() {
        let el = rotated(SvgElement::new("path"), 0.0, 0.0, 4.0, 0.0);
        assert_eq!(el.get_attr("transform"), None);
    }
}
