//! Style options consumed by the [`QrStyler`](crate::styler::QrStyler).
//!
//! [`QrStyle::from_config`] builds the stock look: round "classy" dots with a
//! radial cyan-to-blue gradient, orange finder squares, gradient finder
//! centers, a centered logo and a circular silhouette.

use std::f32::consts::SQRT_2;

use serde::{Deserialize, Serialize};

use crate::colors::{Color, Gradient, PaletteConfig};
use crate::config::RenderConfig;

/// Quiet zone around the code, in pixels.
pub const DEFAULT_MARGIN: u32 = 77;

/// Width in modules of a version 1 symbol, the smallest there is.
pub const SMALLEST_SYMBOL: usize = 21;

/// Overall silhouette of the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    #[default]
    Square,
    /// The matrix is shrunk and surrounded by mirrored modules out to a circle.
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum ErrorCorrection {
    L,
    #[default]
    M,
    Q,
    H,
}

impl ErrorCorrection {
    /// Share of the symbol that may be damaged and still decode.
    pub fn recovery_ratio(self) -> f32 {
        match self {
            Self::L => 0.07,
            Self::M => 0.15,
            Self::Q => 0.25,
            Self::H => 0.30,
        }
    }
}

impl From<ErrorCorrection> for qrcode::EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => qrcode::EcLevel::L,
            ErrorCorrection::M => qrcode::EcLevel::M,
            ErrorCorrection::Q => qrcode::EcLevel::Q,
            ErrorCorrection::H => qrcode::EcLevel::H,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct QrOptions {
    /// Symbol version 1-40, or 0 to pick the smallest that fits.
    pub type_number: u8,
    pub error_correction_level: ErrorCorrection,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct ImageOptions {
    /// Skip the modules that sit behind the logo.
    pub hide_background_dots: bool,
    /// Fraction of the error-correction budget the logo may cover.
    pub image_size: f32,
    /// Inset of the logo inside its reserved area, in pixels.
    pub margin: u32,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            hide_background_dots: true,
            image_size: 0.4,
            margin: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum DotType {
    #[default]
    Square,
    Dots,
    Rounded,
    Classy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum CornerSquareType {
    Square,
    Dot,
    ExtraRounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "kebab-case")]
pub enum CornerDotType {
    Square,
    Dot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct DotsOptions {
    #[serde(rename = "type")]
    pub kind: DotType,
    pub color: Color,
    /// Snap the module size to whole pixels.
    pub round_size: bool,
    pub gradient: Option<Gradient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct BackgroundOptions {
    /// Corner rounding from 0.0 (square) to 1.0 (circle).
    pub round: f32,
    pub color: Color,
    pub gradient: Option<Gradient>,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self {
            round: 0.0,
            color: Color::white(),
            gradient: None,
        }
    }
}

/// Options for the three 7x7 finder squares.
///
/// With no `kind` the finder squares are drawn module by module using the dot type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct CornersSquareOptions {
    #[serde(rename = "type")]
    pub kind: Option<CornerSquareType>,
    pub color: Color,
    pub gradient: Option<Gradient>,
}

/// Options for the 3x3 centers of the finder squares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct CornersDotOptions {
    #[serde(rename = "type")]
    pub kind: Option<CornerDotType>,
    pub color: Color,
    pub gradient: Option<Gradient>,
}

/// Complete option set for one styler instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct QrStyle {
    pub width: u32,
    pub height: u32,
    pub shape: Shape,
    pub margin: u32,
    pub qr_options: QrOptions,
    pub image_options: ImageOptions,
    pub dots_options: DotsOptions,
    pub background_options: BackgroundOptions,
    pub corners_square_options: CornersSquareOptions,
    pub corners_dot_options: CornersDotOptions,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            width: 300,
            height: 300,
            shape: Shape::Square,
            margin: 0,
            qr_options: QrOptions::default(),
            image_options: ImageOptions::default(),
            dots_options: DotsOptions::default(),
            background_options: BackgroundOptions::default(),
            corners_square_options: CornersSquareOptions::default(),
            corners_dot_options: CornersDotOptions::default(),
        }
    }
}

impl QrStyle {
    /// The stock style for a render configuration and palette.
    pub fn from_config(config: &RenderConfig, palette: &PaletteConfig) -> Self {
        Self {
            width: config.svg_size,
            height: config.svg_size,
            shape: Shape::Circle,
            margin: DEFAULT_MARGIN,
            qr_options: QrOptions {
                type_number: 0,
                error_correction_level: ErrorCorrection::Q,
            },
            image_options: ImageOptions {
                hide_background_dots: true,
                image_size: 0.4,
                margin: 3,
            },
            dots_options: DotsOptions {
                kind: DotType::Classy,
                color: palette.dots_color,
                round_size: true,
                gradient: Some(Gradient::radial(palette.dots_gradient.clone())),
            },
            background_options: BackgroundOptions {
                round: 0.0,
                color: palette.background,
                gradient: None,
            },
            corners_square_options: CornersSquareOptions {
                kind: None,
                color: palette.corner_square,
                gradient: None,
            },
            corners_dot_options: CornersDotOptions {
                kind: None,
                color: palette.corner_dot,
                gradient: Some(Gradient::linear(0.0, palette.corner_dot_gradient.clone())),
            },
        }
    }

    /// Side of the square the code is laid out in, before the shape adjustment.
    pub fn drawable_size(&self) -> f32 {
        self.width
            .min(self.height)
            .saturating_sub(self.margin.saturating_mul(2)) as f32
    }

    /// Side of one module for a symbol `count` modules wide. Zero or less
    /// means the symbol does not fit.
    pub fn dot_size(&self, count: usize) -> f32 {
        let real_size = match self.shape {
            Shape::Circle => self.drawable_size() / SQRT_2,
            Shape::Square => self.drawable_size(),
        };
        let size = real_size / count as f32;
        if self.dots_options.round_size { size.floor() } else { size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::GradientType;

    #[test]
    fn stock_style_follows_config() {
        let config = RenderConfig::default().with_svg_size(500);
        let palette = PaletteConfig::default();
        let style = QrStyle::from_config(&config, &palette);

        assert_eq!(style.width, 500);
        assert_eq!(style.height, 500);
        assert_eq!(style.margin, 77);
        assert_eq!(style.shape, Shape::Circle);
        assert_eq!(style.qr_options.error_correction_level, ErrorCorrection::Q);
        assert_eq!(style.dots_options.kind, DotType::Classy);
        assert_eq!(
            style.dots_options.gradient.as_ref().unwrap().kind,
            GradientType::Radial
        );
        assert_eq!(style.corners_square_options.color, palette.corner_square);
        assert_eq!(style.background_options.color, Color::transparent());
    }

    #[test]
    fn drawable_size_never_underflows() {
        let style = QrStyle {
            width: 100,
            height: 120,
            margin: 77,
            ..QrStyle::default()
        };
        assert_eq!(style.drawable_size(), 0.0);
    }

    #[test]
    fn huge_margin_saturates() {
        let style = QrStyle {
            margin: u32::MAX,
            ..QrStyle::default()
        };
        assert_eq!(style.drawable_size(), 0.0);
        assert!(style.dot_size(SMALLEST_SYMBOL) <= 0.0);
    }

    #[test]
    fn stock_dot_size_floors_after_circle_shrink() {
        let style = QrStyle::from_config(&RenderConfig::default(), &PaletteConfig::default());
        // (400 - 154) / sqrt(2) / 21 = 8.28
        assert_eq!(style.dot_size(SMALLEST_SYMBOL), 8.0);
    }

    #[test]
    fn ec_level_maps_to_encoder() {
        assert_eq!(qrcode::EcLevel::from(ErrorCorrection::Q), qrcode::EcLevel::Q);
        assert!(ErrorCorrection::H.recovery_ratio() > ErrorCorrection::L.recovery_ratio());
    }
}
