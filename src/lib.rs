//! qr-overlay: styled QR codes with a decorative overlay, saved as SVG
//!
//! This crate renders text as a stylized QR code (round "classy" dots,
//! gradient fills, a circular silhouette and a centered logo), composites an
//! overlay image on top and packages the result as `qr-code.svg`.
//!
//! # Example
//!
//! ```
//! use qr_overlay::{QrCodeManager, RenderConfig, PaletteConfig};
//! use qr_overlay::assets::MemoryAssets;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let overlay = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#;
//! let assets = MemoryAssets::new().with("../assets/overlay.png", overlay);
//!
//! let mut manager = QrCodeManager::new(RenderConfig::default(), &PaletteConfig::default())?;
//! manager.generate("HELLO", &assets).await?;
//!
//! let download = manager.download().unwrap();
//! assert_eq!(download.file_name, "qr-code.svg");
//! # Ok::<(), qr_overlay::Error>(())
//! # }).unwrap();
//! ```
//!
//! # Page Controller
//!
//! [`UiController`] drives a [`View`](view::View) the way the browser page
//! is driven: typing toggles the generate button, generating shows the code
//! and enables download.
//!
//! ```
//! use qr_overlay::{UiController, RenderConfig, PaletteConfig};
//! use qr_overlay::assets::MemoryAssets;
//! use qr_overlay::view::{HeadlessView, View};
//!
//! let mut ui = UiController::new(
//!     RenderConfig::default(),
//!     &PaletteConfig::default(),
//!     HeadlessView::new(),
//!     MemoryAssets::new(),
//! )
//! .unwrap();
//! ui.init();
//! assert!(!ui.is_generate_enabled());
//!
//! ui.view_mut().set_input_value("HELLO");
//! ui.on_input();
//! assert!(ui.is_generate_enabled());
//! assert!(!ui.is_download_enabled());
//! ```

pub mod assets;
pub mod colors;
pub mod config;
pub mod error;
pub mod manager;
pub mod profile;
pub mod style;
pub mod styler;
pub mod surface;
pub mod ui;
pub mod view;

#[cfg(feature = "web")]
pub mod web;

pub use colors::{Color, ColorStop, Gradient, GradientType, PaletteConfig};
pub use config::{Offset, RenderConfig};
pub use error::{Error, Result};
pub use manager::QrCodeManager;
pub use profile::Profile;
pub use style::QrStyle;
pub use styler::QrStyler;
pub use surface::{OverlayImage, RenderSurface};
pub use ui::UiController;
pub use view::{Download, ElementIds};

#[cfg(feature = "web")]
pub use web::QrApp;
