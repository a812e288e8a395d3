//! Colors, gradients and the palette used to style the code.
//!
//! Colors are kept as [`Srgba<u8>`] and travel through JSON as CSS strings,
//! so a palette file reads the same as the stylesheet values it replaces:
//!
//! ```json
//! { "dotsColor": "#15a6d3", "background": "rgba(0,0,0,0)" }
//! ```

use std::fmt;
use std::str::FromStr;

use palette::{Srgb, Srgba};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================================================
// Color
// ============================================================================

/// An sRGB color with alpha, serialized as a CSS color string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub Srgba<u8>);

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(Srgba::new(r, g, b, 255))
    }

    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(Srgba::new(r, g, b, a))
    }

    pub fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// The color without alpha as `#rrggbb`.
    pub fn hex(&self) -> String {
        let c = self.0.color;
        format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
    }

    /// Opacity in `0.0..=1.0`, or `None` when the color is fully opaque.
    pub fn opacity(&self) -> Option<f32> {
        (self.0.alpha < 255).then(|| (self.0.alpha as f32 / 255.0 * 1000.0).round() / 1000.0)
    }

    pub fn is_opaque(&self) -> bool {
        self.0.alpha == 255
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || Error::InvalidColor(s.to_string());

        if trimmed.eq_ignore_ascii_case("transparent") {
            return Ok(Self::transparent());
        }

        if let Some(args) = function_args(trimmed, "rgba").or_else(|| function_args(trimmed, "rgb")) {
            let parts: Vec<&str> = args.split(',').map(str::trim).collect();
            let channel = |p: &str| -> Result<u8, Error> {
                let v: f32 = p.parse().map_err(|_| invalid())?;
                if !(0.0..=255.0).contains(&v) {
                    return Err(invalid());
                }
                Ok(v.round() as u8)
            };
            return match parts.as_slice() {
                [r, g, b] => Ok(Self::rgb(channel(r)?, channel(g)?, channel(b)?)),
                [r, g, b, a] => {
                    let alpha: f32 = a.parse().map_err(|_| invalid())?;
                    if !(0.0..=1.0).contains(&alpha) {
                        return Err(invalid());
                    }
                    Ok(Self::rgba(
                        channel(r)?,
                        channel(g)?,
                        channel(b)?,
                        (alpha * 255.0).round() as u8,
                    ))
                }
                _ => Err(invalid()),
            };
        }

        if !trimmed.starts_with('#') {
            return Err(invalid());
        }
        let rgb: Srgb<u8> = trimmed.parse().map_err(|_| invalid())?;
        Ok(Self::rgb(rgb.red, rgb.green, rgb.blue))
    }
}

/// Returns the text between `name(` and `)`, case-insensitively.
fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let head = s.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    s.get(name.len()..)?.strip_prefix('(')?.strip_suffix(')')
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opacity() {
            None => f.write_str(&self.hex()),
            Some(alpha) => {
                let c = self.0.color;
                write!(f, "rgba({},{},{},{})", c.red, c.green, c.blue, alpha)
            }
        }
    }
}

#[cfg(feature = "jsonschema")]
impl schemars::JsonSchema for Color {
    fn schema_name() -> String {
        "Color".to_owned()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        <String as schemars::JsonSchema>::json_schema(generator)
    }
}

// ============================================================================
// Gradients
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum GradientType {
    #[default]
    Linear,
    Radial,
}

/// A single stop of a gradient; `offset` runs from 0.0 to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

impl ColorStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// Gradient fill for a group of shapes.
///
/// `rotation` is in radians and only affects linear gradients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    #[serde(rename = "type", default)]
    pub kind: GradientType,
    #[serde(default)]
    pub rotation: f32,
    pub color_stops: Vec<ColorStop>,
}

impl Gradient {
    pub fn linear(rotation: f32, color_stops: Vec<ColorStop>) -> Self {
        Self {
            kind: GradientType::Linear,
            rotation,
            color_stops,
        }
    }

    pub fn radial(color_stops: Vec<ColorStop>) -> Self {
        Self {
            kind: GradientType::Radial,
            rotation: 0.0,
            color_stops,
        }
    }
}

// ============================================================================
// PaletteConfig
// ============================================================================

/// Named colors and gradient stops passed through to the styler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct PaletteConfig {
    pub dots_color: Color,
    pub dots_gradient: Vec<ColorStop>,
    pub corner_square: Color,
    pub corner_dot: Color,
    pub corner_dot_gradient: Vec<ColorStop>,
    pub background: Color,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        let cyan = Color::rgb(0x20, 0xe3, 0xff);
        let blue = Color::rgb(0x15, 0xa6, 0xd3);
        Self {
            dots_color: blue,
            dots_gradient: vec![ColorStop::new(0.0, cyan), ColorStop::new(1.0, blue)],
            corner_square: Color::rgb(0xff, 0x94, 0x2b),
            corner_dot: Color::black(),
            corner_dot_gradient: vec![ColorStop::new(0.0, blue), ColorStop::new(1.0, cyan)],
            background: Color::transparent(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_colors() {
        assert_eq!("#15a6d3".parse::<Color>().unwrap(), Color::rgb(0x15, 0xa6, 0xd3));
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::white());
        assert!("15a6d3".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
    }

    #[test]
    fn parse_css_functions() {
        assert_eq!("rgba(0,0,0,0)".parse::<Color>().unwrap(), Color::transparent());
        assert_eq!(
            "rgb(255, 148, 43)".parse::<Color>().unwrap(),
            Color::rgb(255, 148, 43)
        );
        assert_eq!(
            "RGBA(10, 20, 30, 0.5)".parse::<Color>().unwrap(),
            Color::rgba(10, 20, 30, 128)
        );
        assert!("rgba(0,0,0,2)".parse::<Color>().is_err());
        assert!("rgb(300,0,0)".parse::<Color>().is_err());
        assert!("hsl(0,0,0)".parse::<Color>().is_err());
    }

    #[test]
    fn display_matches_css() {
        assert_eq!(Color::rgb(0xff, 0x94, 0x2b).to_string(), "#ff942b");
        assert_eq!(Color::transparent().to_string(), "rgba(0,0,0,0)");
        assert_eq!(Color::transparent().opacity(), Some(0.0));
        assert_eq!(Color::black().opacity(), None);
    }

    #[test]
    fn palette_json_uses_css_strings() {
        let json = serde_json::to_string(&PaletteConfig::default()).unwrap();
        assert!(json.contains("\"dotsColor\":\"#15a6d3\""));
        assert!(json.contains("\"background\":\"rgba(0,0,0,0)\""));

        let restored: PaletteConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, PaletteConfig::default());
    }

    #[test]
    fn palette_rejects_bad_color() {
        let err = serde_json::from_str::<PaletteConfig>(r#"{"dotsColor":"blue-ish"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn gradient_type_field_is_named_type() {
        let gradient: Gradient = serde_json::from_str(
            r##"{"type":"radial","colorStops":[{"offset":0,"color":"#000"}]}"##,
        )
        .unwrap();
        assert_eq!(gradient.kind, GradientType::Radial);
        assert_eq!(gradient.rotation, 0.0);
        assert_eq!(gradient.color_stops.len(), 1);
    }
}
