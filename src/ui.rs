//! UI controller: page events in, manager calls and button states out.

use crate::assets::AssetSource;
use crate::colors::PaletteConfig;
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::manager::{QrCodeManager, trim_input};
use crate::view::{Control, ElementIds, View};

/// Drives one page.
///
/// The generate button is enabled exactly when the trimmed input is
/// non-empty. The download button stays disabled until the first successful
/// generate and is never disabled again.
#[derive(Debug)]
pub struct UiController<V: View, A: AssetSource> {
    view: V,
    assets: A,
    manager: QrCodeManager,
    generate_enabled: bool,
    download_enabled: bool,
}

impl<V: View, A: AssetSource> UiController<V, A> {
    /// Binds the default element ids and builds the manager.
    pub fn new(config: RenderConfig, palette: &PaletteConfig, view: V, assets: A) -> Result<Self> {
        Self::with_ids(config, palette, view, assets, &ElementIds::default())
    }

    /// Fails with [`Error::MissingElement`] before anything else if the
    /// page lacks one of `ids`.
    pub fn with_ids(
        config: RenderConfig,
        palette: &PaletteConfig,
        mut view: V,
        assets: A,
        ids: &ElementIds,
    ) -> Result<Self> {
        view.bind(ids)?;
        let manager = QrCodeManager::new(config, palette)?;
        let mut controller = Self {
            view,
            assets,
            manager,
            generate_enabled: false,
            download_enabled: false,
        };
        controller.set_enabled(Control::Generate, false);
        controller.set_enabled(Control::Download, false);
        Ok(controller)
    }

    /// Sizes the canvas, applies the default input and syncs the generate button.
    pub fn init(&mut self) {
        let size = self.manager.config().svg_size;
        self.view.set_canvas_size(size, size);
        if let Some(data) = self.manager.config().default_data.clone() {
            self.view.set_input_value(&data);
        }
        self.on_input();
    }

    pub fn on_input(&mut self) {
        let has_text = !trim_input(&self.view.input_value()).is_empty();
        self.set_enabled(Control::Generate, has_text);
    }

    /// Renders the current input. Blank input is ignored.
    ///
    /// The generate button is synced with the input afterwards, whatever the
    /// outcome, since input events can be missed while a render is in flight.
    pub async fn on_generate(&mut self) -> Result<()> {
        let result = self.generate_current().await;
        self.on_input();
        result
    }

    async fn generate_current(&mut self) -> Result<()> {
        let text = self.view.input_value();
        let text = trim_input(&text);
        if text.is_empty() {
            return Ok(());
        }

        self.manager.generate(text, &self.assets).await?;
        let surface = self
            .manager
            .surface()
            .ok_or_else(|| Error::Render("nothing rendered".into()))?;
        self.view.show_surface(surface);
        self.set_enabled(Control::Download, true);
        Ok(())
    }

    /// Saves the current render, if there is one.
    pub fn on_download(&mut self) -> Result<()> {
        match self.manager.download() {
            Some(download) => self.view.save_file(download),
            None => Ok(()),
        }
    }

    pub fn is_generate_enabled(&self) -> bool {
        self.generate_enabled
    }

    pub fn is_download_enabled(&self) -> bool {
        self.download_enabled
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn manager(&self) -> &QrCodeManager {
        &self.manager
    }

    fn set_enabled(&mut self, control: Control, enabled: bool) {
        match control {
            Control::Generate => self.generate_enabled = enabled,
            Control::Download => self.download_enabled = enabled,
        }
        self.view.set_control_enabled(control, enabled);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use proptest::prelude::*;

    use super::*;
    use crate::assets::MemoryAssets;
    use crate::assets::tests::tiny_png;
    use crate::config::{DEFAULT_LOGO_URL, DEFAULT_OVERLAY_URL, Offset};
    use crate::surface::RenderSurface;
    use crate::view::{Download, HeadlessView};

    fn assets() -> MemoryAssets {
        MemoryAssets::new()
            .with(DEFAULT_LOGO_URL, tiny_png())
            .with(DEFAULT_OVERLAY_URL, tiny_png())
    }

    fn controller(config: RenderConfig) -> UiController<HeadlessView, MemoryAssets> {
        let mut ui =
            UiController::new(config, &PaletteConfig::default(), HeadlessView::new(), assets())
                .unwrap();
        ui.init();
        ui
    }

    fn type_text(ui: &mut UiController<HeadlessView, MemoryAssets>, text: &str) {
        ui.view_mut().set_input_value(text);
        ui.on_input();
    }

    #[test]
    fn generate_enabled_iff_trimmed_input_non_empty() {
        let mut ui = controller(RenderConfig::default());
        for (input, enabled) in [
            ("", false),
            ("   ", false),
            ("\t\n", false),
            ("\u{feff}", false),
            ("a", true),
            ("  HELLO  ", true),
            ("\u{3000}x", true),
        ] {
            type_text(&mut ui, input);
            assert_eq!(ui.is_generate_enabled(), enabled, "{input:?}");
            assert_eq!(ui.view().is_enabled(Control::Generate), enabled, "{input:?}");
        }
    }

    proptest! {
        #[test]
        fn generate_button_tracks_any_input(inputs in prop::collection::vec(
            prop_oneof![
                ".*",
                "[ \t\n\u{a0}\u{3000}\u{feff}]{0,6}",
                "[ \u{feff}]{0,3}[a-z]{1,4}[ \u{feff}]{0,3}",
            ],
            1..8,
        )) {
            let mut ui = controller(RenderConfig::default());
            for input in &inputs {
                type_text(&mut ui, input);
                let expected = !input
                    .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
                    .is_empty();
                prop_assert_eq!(ui.is_generate_enabled(), expected);
                prop_assert_eq!(ui.view().is_enabled(Control::Generate), expected);
            }
        }
    }

    /// Returns the queued values one per read, then repeats the last one.
    struct ScriptedView {
        inner: HeadlessView,
        reads: RefCell<Vec<String>>,
    }

    impl ScriptedView {
        fn new(reads: &[&str]) -> Self {
            Self {
                inner: HeadlessView::new(),
                reads: RefCell::new(reads.iter().rev().map(|s| s.to_string()).collect()),
            }
        }
    }

    impl View for ScriptedView {
        fn bind(&mut self, ids: &ElementIds) -> Result<()> {
            self.inner.bind(ids)
        }

        fn input_value(&self) -> String {
            let mut reads = self.reads.borrow_mut();
            if reads.len() > 1 {
                reads.pop().unwrap_or_default()
            } else {
                reads.last().cloned().unwrap_or_default()
            }
        }

        fn set_input_value(&mut self, value: &str) {
            self.inner.set_input_value(value);
        }

        fn set_control_enabled(&mut self, control: Control, enabled: bool) {
            self.inner.set_control_enabled(control, enabled);
        }

        fn set_canvas_size(&mut self, width: u32, height: u32) {
            self.inner.set_canvas_size(width, height);
        }

        fn show_surface(&mut self, surface: &RenderSurface) {
            self.inner.show_surface(surface);
        }

        fn save_file(&mut self, download: Download) -> Result<()> {
            self.inner.save_file(download)
        }
    }

    #[tokio::test]
    async fn input_cleared_during_generate_disables_generate() {
        // init and the render see HELLO; the input is empty by the time the render ends
        let view = ScriptedView::new(&["HELLO", "HELLO", ""]);
        let mut ui =
            UiController::new(RenderConfig::default(), &PaletteConfig::default(), view, assets())
                .unwrap();
        ui.init();
        assert!(ui.is_generate_enabled());

        ui.on_generate().await.unwrap();
        assert!(ui.manager().surface().is_some());
        assert!(ui.is_download_enabled());
        assert!(!ui.is_generate_enabled());
        assert!(!ui.view().inner.is_enabled(Control::Generate));
    }

    #[tokio::test]
    async fn generate_resyncs_after_failure() {
        let view = ScriptedView::new(&["HELLO", "HELLO", ""]);
        let assets = MemoryAssets::new().with(DEFAULT_LOGO_URL, tiny_png());
        let mut ui =
            UiController::new(RenderConfig::default(), &PaletteConfig::default(), view, assets)
                .unwrap();
        ui.init();
        assert!(ui.is_generate_enabled());

        assert!(ui.on_generate().await.is_err());
        assert!(!ui.is_generate_enabled());
        assert!(!ui.is_download_enabled());
    }

    #[test]
    fn init_sizes_canvas_and_applies_default_data() {
        let ui = controller(RenderConfig::default().with_default_data("https://example.com"));
        assert_eq!(ui.view().canvas_size(), Some((400, 400)));
        assert_eq!(ui.view().input_value(), "https://example.com");
        assert!(ui.is_generate_enabled());
        assert!(!ui.is_download_enabled());
    }

    #[tokio::test]
    async fn download_enabled_after_first_success_and_stays() {
        let mut ui = controller(RenderConfig::default());
        assert!(!ui.is_download_enabled());

        type_text(&mut ui, "HELLO");
        ui.on_generate().await.unwrap();
        assert!(ui.is_download_enabled());
        assert!(ui.view().is_enabled(Control::Download));

        type_text(&mut ui, "");
        ui.on_generate().await.unwrap();
        assert!(ui.is_download_enabled());
    }

    #[tokio::test]
    async fn blank_generate_is_a_no_op() {
        let mut ui = controller(RenderConfig::default());
        type_text(&mut ui, "  ");
        ui.on_generate().await.unwrap();
        assert!(ui.manager().surface().is_none());
        assert!(ui.view().canvas().is_none());
        assert!(!ui.is_download_enabled());
    }

    #[tokio::test]
    async fn hello_shows_one_overlay_at_offset() {
        let mut ui = controller(RenderConfig::default());
        type_text(&mut ui, "HELLO");
        ui.on_generate().await.unwrap();
        ui.on_generate().await.unwrap();

        let overlays = ui.manager().surface().unwrap().overlays();
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].get_attr("x"), Some("3"));
        assert_eq!(overlays[0].get_attr("y"), Some("1"));
        assert_eq!(ui.view().canvas(), ui.manager().svg_markup().as_deref());
    }

    #[tokio::test]
    async fn overlay_follows_configured_size_and_offset() {
        let config = RenderConfig::default()
            .with_svg_size(400)
            .with_overlay(DEFAULT_OVERLAY_URL, Offset::new(3.0, 1.0));
        let mut ui = controller(config);
        type_text(&mut ui, "HELLO");
        ui.on_generate().await.unwrap();

        let surface = ui.manager().surface().unwrap();
        let overlay = surface.overlays()[0];
        assert_eq!(overlay.get_attr("width"), Some("400"));
        assert_eq!(overlay.get_attr("height"), Some("400"));
        assert_eq!(overlay.get_attr("x"), Some("3"));
        assert_eq!(overlay.get_attr("y"), Some("1"));
    }

    #[tokio::test]
    async fn download_saves_well_formed_svg_of_current_surface() {
        let mut ui = controller(RenderConfig::default());
        ui.on_download().unwrap();
        assert!(ui.view().saved().is_empty());

        type_text(&mut ui, "HELLO");
        ui.on_generate().await.unwrap();
        ui.on_download().unwrap();

        let saved = &ui.view().saved()[0];
        assert_eq!(saved.file_name, "qr-code.svg");
        assert_eq!(Some(saved.contents.clone()), ui.manager().svg_markup());
        let opts = resvg::usvg::Options::default();
        assert!(resvg::usvg::Tree::from_str(&saved.contents, &opts).is_ok());
    }

    #[tokio::test]
    async fn overlay_fetch_failure_reaches_caller() {
        let assets = MemoryAssets::new().with(DEFAULT_LOGO_URL, tiny_png());
        let mut ui = UiController::new(
            RenderConfig::default(),
            &PaletteConfig::default(),
            HeadlessView::new(),
            assets,
        )
        .unwrap();
        ui.init();
        type_text(&mut ui, "HELLO");

        let err = ui.on_generate().await.unwrap_err();
        assert!(matches!(err, Error::AssetFetch { .. }));
        assert!(!ui.is_download_enabled());
    }

    #[test]
    fn missing_element_fails_construction() {
        let view = HeadlessView::new().without_element("downloadBtn");
        let err = UiController::new(
            RenderConfig::default(),
            &PaletteConfig::default(),
            view,
            MemoryAssets::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingElement(id) if id == "downloadBtn"));
    }

    #[test]
    fn custom_element_ids_are_bound() {
        let ids = ElementIds {
            input: "text".into(),
            ..ElementIds::default()
        };
        let view = HeadlessView::new().with_elements(&ids);
        let result = UiController::with_ids(
            RenderConfig::default(),
            &PaletteConfig::default(),
            view,
            MemoryAssets::new(),
            &ids,
        );
        assert!(result.is_ok());
    }
}
