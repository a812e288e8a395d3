//! Solid and gradient paint for groups of shapes.
//!
//! Gradients use `userSpaceOnUse` units so one definition spans every shape in
//! a group, the same way a single gradient rect clipped to the shapes would.

use std::f32::consts::PI;

use crate::colors::{Color, ColorStop, Gradient, GradientType};
use crate::surface::{RenderSurface, SvgElement};

/// Box a gradient is stretched over, in user units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn square(x: f32, y: f32, size: f32) -> Self {
        Self::new(x, y, size, size)
    }

    fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Sets the fill of `target`.
///
/// A gradient wins over the flat color; it is written into the surface's
/// `<defs>` under `id` and referenced from the fill.
pub fn apply_paint(
    surface: &mut RenderSurface,
    target: &mut SvgElement,
    color: Color,
    gradient: Option<&Gradient>,
    additional_rotation: f32,
    region: Region,
    id: &str,
) {
    match gradient {
        Some(gradient) => {
            surface
                .defs_mut()
                .push(gradient_element(gradient, additional_rotation, region, id));
            target.set_attr("fill", format!("url(#{id})"));
        }
        None => {
            target.set_attr("fill", color.hex());
            if let Some(opacity) = color.opacity() {
                target.set_attr("fill-opacity", opacity);
            }
        }
    }
}

/// Builds the `<linearGradient>` or `<radialGradient>` definition.
pub fn gradient_element(
    gradient: &Gradient,
    additional_rotation: f32,
    region: Region,
    id: &str,
) -> SvgElement {
    let (cx, cy) = region.center();
    let mut el = match gradient.kind {
        GradientType::Radial => {
            let r = region.width.max(region.height) / 2.0;
            SvgElement::new("radialGradient")
                .attr("id", id)
                .attr("gradientUnits", "userSpaceOnUse")
                .attr("fx", cx)
                .attr("fy", cy)
                .attr("cx", cx)
                .attr("cy", cy)
                .attr("r", r)
        }
        GradientType::Linear => {
            let [x1, y1, x2, y2] = linear_endpoints(gradient.rotation + additional_rotation, region);
            SvgElement::new("linearGradient")
                .attr("id", id)
                .attr("gradientUnits", "userSpaceOnUse")
                .attr("x1", x1.round())
                .attr("y1", y1.round())
                .attr("x2", x2.round())
                .attr("y2", y2.round())
        }
    };
    for stop in &gradient.color_stops {
        el.push(stop_element(stop));
    }
    el
}

fn stop_element(stop: &ColorStop) -> SvgElement {
    let mut el = SvgElement::new("stop")
        .attr("offset", format!("{}%", stop.offset * 100.0))
        .attr("stop-color", stop.color.hex());
    if let Some(opacity) = stop.color.opacity() {
        el.set_attr("stop-opacity", opacity);
    }
    el
}

/// Start and end of a linear gradient crossing `region` at `rotation` radians.
///
/// The line runs through the center and meets the pair of edges the angle
/// points at, so 0 goes left to right and a quarter turn goes top to bottom.
fn linear_endpoints(rotation: f32, region: Region) -> [f32; 4] {
    let rotation = rotation % (2.0 * PI);
    let positive = (rotation + 2.0 * PI) % (2.0 * PI);
    let (cx, cy) = region.center();
    let (hw, hh) = (region.width / 2.0, region.height / 2.0);
    let tan = rotation.tan();

    if positive <= 0.25 * PI || positive > 1.75 * PI {
        [cx - hw, cy - hh * tan, cx + hw, cy + hh * tan]
    } else if positive <= 0.75 * PI {
        [cx - hw / tan, cy - hh, cx + hw / tan, cy + hh]
    } else if positive <= 1.25 * PI {
        [cx + hw, cy + hh * tan, cx - hw, cy - hh * tan]
    } else {
        [cx + hw / tan, cy + hh, cx - hw / tan, cy - hh]
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    fn stops() -> Vec<ColorStop> {
        vec![
            ColorStop::new(0.0, Color::rgb(0x20, 0xe3, 0xff)),
            ColorStop::new(1.0, Color::rgba(0x15, 0xa6, 0xd3, 128)),
        ]
    }

    #[test]
    fn flat_color_sets_fill() {
        let mut surface = RenderSurface::new(10, 10);
        let mut g = SvgElement::new("g");
        let region = Region::square(0.0, 0.0, 10.0);
        apply_paint(&mut surface, &mut g, Color::rgb(255, 0, 0), None, 0.0, region, "a");

        assert_eq!(g.get_attr("fill"), Some("#ff0000"));
        assert_eq!(g.get_attr("fill-opacity"), None);
        assert!(surface.root().is_empty());
    }

    #[test]
    fn translucent_color_sets_opacity() {
        let mut surface = RenderSurface::new(10, 10);
        let mut g = SvgElement::new("g");
        let region = Region::square(0.0, 0.0, 10.0);
        apply_paint(&mut surface, &mut g, Color::transparent(), None, 0.0, region, "a");
        assert_eq!(g.get_attr("fill-opacity"), Some("0"));
    }

    #[test]
    fn gradient_goes_into_defs() {
        let mut surface = RenderSurface::new(400, 400);
        let mut g = SvgElement::new("g");
        let gradient = Gradient::radial(stops());
        let region = Region::square(0.0, 0.0, 400.0);
        apply_paint(&mut surface, &mut g, Color::black(), Some(&gradient), 0.0, region, "dot-color-0");

        assert_eq!(g.get_attr("fill"), Some("url(#dot-color-0)"));
        let defs = surface.root().elements().next().unwrap();
        let radial = defs.elements().next().unwrap();
        assert_eq!(radial.name(), "radialGradient");
        assert_eq!(radial.get_attr("cx"), Some("200"));
        assert_eq!(radial.get_attr("r"), Some("200"));

        let offsets: Vec<_> = radial.elements().map(|s| s.get_attr("offset").unwrap().to_string()).collect();
        assert_eq!(offsets, ["0%", "100%"]);
        let last = radial.elements().last().unwrap();
        assert_eq!(last.get_attr("stop-color"), Some("#15a6d3"));
        assert_eq!(last.get_attr("stop-opacity"), Some("0.502"));
    }

    #[test]
    fn linear_endpoints_follow_rotation() {
        let region = Region::square(0.0, 0.0, 100.0);
        let horizontal = linear_endpoints(0.0, region);
        assert_eq!(horizontal, [0.0, 50.0, 100.0, 50.0]);

        let vertical = linear_endpoints(FRAC_PI_2, region);
        assert!((vertical[0] - 50.0).abs() < 1e-3);
        assert_eq!(vertical[1], 0.0);
        assert!((vertical[2] - 50.0).abs() < 1e-3);
        assert_eq!(vertical[3], 100.0);

        let reversed = linear_endpoints(PI, region);
        assert_eq!(reversed[0], 100.0);
        assert_eq!(reversed[2], 0.0);
    }

    #[test]
    fn corner_rotation_is_added_to_gradient_rotation() {
        let gradient = Gradient::linear(0.0, stops());
        let region = Region::square(10.0, 10.0, 20.0);
        let el = gradient_element(&gradient, FRAC_PI_2, region, "corners-dot-color-1-0-0");
        assert_eq!(el.get_attr("x1"), Some("20"));
        assert_eq!(el.get_attr("y1"), Some("10"));
        assert_eq!(el.get_attr("y2"), Some("30"));
    }
}
