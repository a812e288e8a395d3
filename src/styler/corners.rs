//! Finder-pattern figures.

use super::dots::{basic_dot, basic_square, rotated};
use crate::style::{CornerDotType, CornerSquareType};
use crate::surface::SvgElement;

/// Outer 7x7 ring of a finder pattern.
pub const SQUARE_MASK: [[bool; 7]; 7] = {
    let mut mask = [[false; 7]; 7];
    let mut i = 0;
    while i < 7 {
        mask[0][i] = true;
        mask[6][i] = true;
        mask[i][0] = true;
        mask[i][6] = true;
        i += 1;
    }
    mask
};

/// 3x3 center of a finder pattern, in the same 7x7 frame.
pub const DOT_MASK: [[bool; 7]; 7] = {
    let mut mask = [[false; 7]; 7];
    let mut row = 2;
    while row < 5 {
        let mut col = 2;
        while col < 5 {
            mask[row][col] = true;
            col += 1;
        }
        row += 1;
    }
    mask
};

/// Looks up a mask cell, treating everything outside the frame as empty.
pub fn mask_at(mask: &[[bool; 7]; 7], row: i32, col: i32) -> bool {
    if !(0..7).contains(&row) || !(0..7).contains(&col) {
        return false;
    }
    mask[row as usize][col as usize]
}

/// Draws a whole finder ring of `size` (7 modules) at `(x, y)`.
pub fn corner_square(kind: CornerSquareType, x: f32, y: f32, size: f32, rotation: f32) -> SvgElement {
    let dot = size / 7.0;
    let d = match kind {
        CornerSquareType::Square => {
            let inner = size - 2.0 * dot;
            format!(
                "M {x} {y} v {size} h {size} v {} z M {} {} h {inner} v {inner} h {} z",
                -size,
                x + dot,
                y + dot,
                -inner
            )
        }
        CornerSquareType::Dot => {
            let r = size / 2.0;
            let cx = x + r;
            let inner = r - dot;
            format!(
                "M {cx} {y} a {r} {r} 0 1 0 0.1 0 z m 0 {dot} a {inner} {inner} 0 1 1 -0.1 0 Z"
            )
        }
        CornerSquareType::ExtraRounded => {
            let (a, b, c) = (2.5 * dot, 2.0 * dot, 1.5 * dot);
            format!(
                "M {x} {} v {b} a {a} {a} 0 0 0 {a} {a} h {b} a {a} {a} 0 0 0 {a} {} v {} \
                 a {a} {a} 0 0 0 {} {} h {} a {a} {a} 0 0 0 {} {a} \
                 M {} {} h {b} a {c} {c} 0 0 1 {c} {c} v {b} a {c} {c} 0 0 1 {} {c} \
                 h {} a {c} {c} 0 0 1 {} {} v {} a {c} {c} 0 0 1 {c} {}",
                y + a,
                -a,
                -b,
                -a,
                -a,
                -b,
                -a,
                x + a,
                y + dot,
                -c,
                -b,
                -c,
                -c,
                -b,
                -c
            )
        }
    };
    let path = SvgElement::new("path")
        .attr("clip-rule", "evenodd")
        .attr("fill-rule", "evenodd")
        .attr("d", d);
    rotated(path, x, y, size, rotation)
}

/// Draws a finder center of `size` (3 modules) at `(x, y)`.
pub fn corner_dot(kind: CornerDotType, x: f32, y: f32, size: f32, rotation: f32) -> SvgElement {
    let el = match kind {
        CornerDotType::Dot => basic_dot(x, y, size),
        CornerDotType::Square => basic_square(x, y, size),
    };
    rotated(el, x, y, size, rotation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_cover_finder_pattern() {
        let ring = SQUARE_MASK.iter().flatten().filter(|c| **c).count();
        let center = DOT_MASK.iter().flatten().filter(|c| **c).count();
        assert_eq!(ring, 24);
        assert_eq!(center, 9);
        assert!(mask_at(&DOT_MASK, 3, 3));
        assert!(!mask_at(&SQUARE_MASK, 3, 3));
        assert!(!mask_at(&SQUARE_MASK, -1, 0));
        assert!(!mask_at(&SQUARE_MASK, 0, 7));
    }

    #[test]
    fn square_ring_has_hole() {
        let el = corner_square(CornerSquareType::Square, 0.0, 0.0, 70.0, 0.0);
        assert_eq!(el.get_attr("fill-rule"), Some("evenodd"));
        assert_eq!(
            el.get_attr("d"),
            Some("M 0 0 v 70 h 70 v -70 z M 10 10 h 50 v 50 h -50 z")
        );
    }

    #[test]
    fn every_corner_square_type_is_a_path() {
        for kind in [
            CornerSquareType::Square,
            CornerSquareType::Dot,
            CornerSquareType::ExtraRounded,
        ] {
            let el = corner_square(kind, 5.0, 5.0, 56.0, std::f32::consts::FRAC_PI_2);
            assert_eq!(el.name(), "path");
            assert!(el.get_attr("transform").is_some());
        }
    }

    #[test]
    fn corner_dot_shapes() {
        assert_eq!(corner_dot(CornerDotType::Dot, 0.0, 0.0, 6.0, 0.0).name(), "circle");
        assert_eq!(corner_dot(CornerDotType::Square, 0.0, 0.0, 6.0, 0.0).name(), "rect");
    }
}
