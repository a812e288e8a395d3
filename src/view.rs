//! The page the controller drives.
//!
//! A [`View`] exposes just the four elements the app needs: a text input, a
//! canvas area, and the generate and download buttons. The browser build
//! implements it over the DOM; [`HeadlessView`] keeps the same state in memory
//! for the command line and tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::surface::RenderSurface;

pub const DOWNLOAD_FILE_NAME: &str = "qr-code.svg";
pub const DOWNLOAD_MIME_TYPE: &str = "image/svg+xml;charset=utf-8";

// ============================================================================
// Download
// ============================================================================

/// A file handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: String,
    pub contents: String,
}

impl Download {
    /// The serialized SVG under the standard file name.
    pub fn svg(contents: String) -> Self {
        Self {
            file_name: DOWNLOAD_FILE_NAME.to_string(),
            mime_type: DOWNLOAD_MIME_TYPE.to_string(),
            contents,
        }
    }
}

// ============================================================================
// Elements
// ============================================================================

/// Buttons whose enabled state the controller manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Generate,
    Download,
}

/// Ids of the page elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct ElementIds {
    pub input: String,
    pub canvas: String,
    pub generate: String,
    pub download: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            input: "qrDataInput".to_string(),
            canvas: "canvas".to_string(),
            generate: "generateBtn".to_string(),
            download: "downloadBtn".to_string(),
        }
    }
}

impl ElementIds {
    pub fn all(&self) -> [&str; 4] {
        [
            self.input.as_str(),
            self.canvas.as_str(),
            self.generate.as_str(),
            self.download.as_str(),
        ]
    }

    pub fn control(&self, control: Control) -> &str {
        match control {
            Control::Generate => &self.generate,
            Control::Download => &self.download,
        }
    }
}

// ============================================================================
// View
// ============================================================================

/// Element access the controller needs from a page.
pub trait View {
    /// Resolves every element in `ids`, failing with
    /// [`Error::MissingElement`] for the first one that is absent.
    fn bind(&mut self, ids: &ElementIds) -> Result<()>;

    fn input_value(&self) -> String;

    fn set_input_value(&mut self, value: &str);

    fn set_control_enabled(&mut self, control: Control, enabled: bool);

    fn set_canvas_size(&mut self, width: u32, height: u32);

    /// Replaces the canvas content with the rendered surface.
    fn show_surface(&mut self, surface: &RenderSurface);

    fn save_file(&mut self, download: Download) -> Result<()>;
}

// ============================================================================
// HeadlessView
// ============================================================================

/// In-memory page, optionally writing downloads to a directory.
#[derive(Debug, Clone)]
pub struct HeadlessView {
    present: HashSet<String>,
    input: String,
    enabled: HashSet<Control>,
    canvas_size: Option<(u32, u32)>,
    canvas: Option<String>,
    output_dir: Option<PathBuf>,
    saved: Vec<Download>,
}

impl Default for HeadlessView {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessView {
    /// A page containing the default elements, both buttons disabled.
    pub fn new() -> Self {
        Self {
            present: ElementIds::default().all().map(str::to_string).into(),
            input: String::new(),
            enabled: HashSet::new(),
            canvas_size: None,
            canvas: None,
            output_dir: None,
            saved: Vec::new(),
        }
    }

    /// Same page but with the listed element ids instead of the defaults.
    pub fn with_elements(mut self, ids: &ElementIds) -> Self {
        self.present = ids.all().map(str::to_string).into();
        self
    }

    /// Removes one element, as if the page markup lacked it.
    pub fn without_element(mut self, id: &str) -> Self {
        self.present.remove(id);
        self
    }

    /// Writes saved files into `dir` as well as keeping them.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn is_enabled(&self, control: Control) -> bool {
        self.enabled.contains(&control)
    }

    pub fn canvas_size(&self) -> Option<(u32, u32)> {
        self.canvas_size
    }

    /// Markup currently shown in the canvas.
    pub fn canvas(&self) -> Option<&str> {
        self.canvas.as_deref()
    }

    pub fn saved(&self) -> &[Download] {
        &self.saved
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }
}

impl View for HeadlessView {
    fn bind(&mut self, ids: &ElementIds) -> Result<()> {
        match ids.all().into_iter().find(|id| !self.present.contains(*id)) {
            Some(missing) => Err(Error::MissingElement(missing.to_string())),
            None => Ok(()),
        }
    }

    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        self.input = value.to_string();
    }

    fn set_control_enabled(&mut self, control: Control, enabled: bool) {
        if enabled {
            self.enabled.insert(control);
        } else {
            self.enabled.remove(&control);
        }
    }

    fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas_size = Some((width, height));
    }

    fn show_surface(&mut self, surface: &RenderSurface) {
        self.canvas = Some(surface.to_svg_string());
    }

    fn save_file(&mut self, download: Download) -> Result<()> {
        if let Some(dir) = &self.output_dir {
            let path = dir.join(&download.file_name);
            std::fs::write(&path, &download.contents)?;
            tracing::info!(path = %path.display(), bytes = download.contents.len(), "saved file");
        }
        self.saved.push(download);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ids_match_page_markup() {
        let ids = ElementIds::default();
        assert_eq!(ids.all(), ["qrDataInput", "canvas", "generateBtn", "downloadBtn"]);
        assert_eq!(ids.control(Control::Download), "downloadBtn");
    }

    #[test]
    fn element_ids_deserialize_partially() {
        let ids: ElementIds = serde_json::from_str(r#"{"input":"text"}"#).unwrap();
        assert_eq!(ids.input, "text");
        assert_eq!(ids.canvas, "canvas");
    }

    #[test]
    fn bind_reports_first_missing_element() {
        let mut view = HeadlessView::new().without_element("generateBtn");
        let err = view.bind(&ElementIds::default()).unwrap_err();
        assert!(matches!(err, Error::MissingElement(id) if id == "generateBtn"));
        assert!(HeadlessView::new().bind(&ElementIds::default()).is_ok());
    }

    #[test]
    fn controls_start_disabled() {
        let mut view = HeadlessView::new();
        assert!(!view.is_enabled(Control::Generate));
        view.set_control_enabled(Control::Generate, true);
        assert!(view.is_enabled(Control::Generate));
        assert!(!view.is_enabled(Control::Download));
    }

    #[test]
    fn save_file_writes_into_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut view = HeadlessView::new().with_output_dir(dir.path());
        view.save_file(Download::svg("<svg/>".to_string())).unwrap();

        let written = std::fs::read_to_string(dir.path().join("qr-code.svg")).unwrap();
        assert_eq!(written, "<svg/>");
        assert_eq!(view.saved()[0].mime_type, "image/svg+xml;charset=utf-8");
    }
}
