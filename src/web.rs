//! Browser front end for WASM builds.
//!
//! [`QrApp`] mounts the controller on a page that already contains the input,
//! canvas and button elements, wires their `input` and `click` events, and
//! loads images with `window.fetch`.
//!
//! # Feature Flag
//!
//! ```toml
//! [dependencies]
//! qr-overlay = { version = "0.1", default-features = false, features = ["web"] }
//! ```
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { QrApp } from 'qr-overlay';
//!
//! await init();
//! const app = QrApp.mount({ render: { defaultData: 'https://example.com' } });
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    Blob, BlobPropertyBag, Document, HtmlAnchorElement, HtmlButtonElement, HtmlElement,
    HtmlInputElement, Response, Url,
};

use crate::assets::AssetSource;
use crate::error::{Error, Result};
use crate::profile::Profile;
use crate::surface::RenderSurface;
use crate::ui::UiController;
use crate::view::{Control, Download, ElementIds, View};

type Controller = UiController<DomView, FetchAssets>;

fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| Error::Config("no document available".into()))
}

fn js_reason(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn report(error: &Error) {
    tracing::error!(%error, "qr-overlay");
    web_sys::console::error_1(&JsValue::from_str(&error.to_string()));
}

// ============================================================================
// DomView
// ============================================================================

#[derive(Debug, Clone)]
struct Elements {
    input: HtmlInputElement,
    canvas: HtmlElement,
    generate: HtmlButtonElement,
    download: HtmlButtonElement,
}

/// [`View`] over the live DOM.
#[derive(Debug, Default)]
pub struct DomView {
    elements: Option<Elements>,
}

impl DomView {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup<T: JsCast>(document: &Document, id: &str) -> Result<T> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<T>().ok())
            .ok_or_else(|| Error::MissingElement(id.to_string()))
    }

    fn trigger_download(download: &Download) -> std::result::Result<(), JsValue> {
        let parts = js_sys::Array::of1(&JsValue::from_str(&download.contents));
        let options = BlobPropertyBag::new();
        options.set_type(&download.mime_type);
        let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
        let url = Url::create_object_url_with_blob(&blob)?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
        let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
        anchor.set_href(&url);
        anchor.set_download(&download.file_name);
        // some browsers only follow clicks on attached anchors
        body.append_child(&anchor)?;
        anchor.click();
        anchor.remove();
        Url::revoke_object_url(&url)
    }
}

impl View for DomView {
    fn bind(&mut self, ids: &ElementIds) -> Result<()> {
        let document = document()?;
        self.elements = Some(Elements {
            input: Self::lookup(&document, &ids.input)?,
            canvas: Self::lookup(&document, &ids.canvas)?,
            generate: Self::lookup(&document, &ids.generate)?,
            download: Self::lookup(&document, &ids.download)?,
        });
        Ok(())
    }

    fn input_value(&self) -> String {
        self.elements
            .as_ref()
            .map(|el| el.input.value())
            .unwrap_or_default()
    }

    fn set_input_value(&mut self, value: &str) {
        if let Some(el) = &self.elements {
            el.input.set_value(value);
        }
    }

    fn set_control_enabled(&mut self, control: Control, enabled: bool) {
        if let Some(el) = &self.elements {
            let button = match control {
                Control::Generate => &el.generate,
                Control::Download => &el.download,
            };
            button.set_disabled(!enabled);
        }
    }

    fn set_canvas_size(&mut self, width: u32, height: u32) {
        if let Some(el) = &self.elements {
            let style = el.canvas.style();
            let _ = style.set_property("width", &format!("{width}px"));
            let _ = style.set_property("height", &format!("{height}px"));
        }
    }

    fn show_surface(&mut self, surface: &RenderSurface) {
        if let Some(el) = &self.elements {
            el.canvas.set_inner_html(&surface.to_svg_string());
        }
    }

    fn save_file(&mut self, download: Download) -> Result<()> {
        Self::trigger_download(&download).map_err(|e| Error::Render(js_reason(e)))
    }
}

// ============================================================================
// FetchAssets
// ============================================================================

/// [`AssetSource`] backed by `window.fetch`, resolving relative to the page.
#[derive(Debug, Clone, Default)]
pub struct FetchAssets;

impl AssetSource for FetchAssets {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let window = web_sys::window().ok_or_else(|| Error::asset_fetch(reference, "no window"))?;
        let response: Response = JsFuture::from(window.fetch_with_str(reference))
            .await
            .and_then(|value| value.dyn_into())
            .map_err(|e| Error::asset_fetch(reference, js_reason(e)))?;
        if !response.ok() {
            return Err(Error::asset_fetch(
                reference,
                format!("HTTP {}", response.status()),
            ));
        }
        let buffer = response
            .array_buffer()
            .map(JsFuture::from)
            .map_err(|e| Error::asset_fetch(reference, js_reason(e)))?
            .await
            .map_err(|e| Error::asset_fetch(reference, js_reason(e)))?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }
}

// ============================================================================
// QrApp
// ============================================================================

/// Button states mirrored out of the controller so they stay readable while
/// a generate holds it.
#[derive(Debug, Default)]
struct Buttons {
    generate: Cell<bool>,
    download: Cell<bool>,
}

impl Buttons {
    fn sync(&self, ui: &Controller) {
        self.generate.set(ui.is_generate_enabled());
        self.download.set(ui.is_download_enabled());
    }
}

/// The mounted app, exposed to JavaScript.
#[wasm_bindgen]
pub struct QrApp {
    controller: Rc<RefCell<Controller>>,
    buttons: Rc<Buttons>,
}

#[wasm_bindgen]
impl QrApp {
    /// Binds the page and wires its events.
    ///
    /// `profile` is a partial profile object; `undefined` uses the defaults.
    pub fn mount(profile: JsValue) -> std::result::Result<QrApp, JsError> {
        let profile: Profile = if profile.is_undefined() || profile.is_null() {
            Profile::default()
        } else {
            serde_wasm_bindgen::from_value(profile).map_err(|e| JsError::new(&e.to_string()))?
        };

        let ids = ElementIds::default();
        let mut controller = UiController::with_ids(
            profile.render,
            &profile.palette,
            DomView::new(),
            FetchAssets,
            &ids,
        )?;
        controller.init();
        let buttons = Rc::new(Buttons::default());
        buttons.sync(&controller);
        let controller = Rc::new(RefCell::new(controller));

        let document = document()?;
        let input: HtmlInputElement = DomView::lookup(&document, &ids.input)?;
        let generate: HtmlButtonElement = DomView::lookup(&document, &ids.generate)?;
        let download: HtmlButtonElement = DomView::lookup(&document, &ids.download)?;

        listen(&input, "input", {
            let controller = controller.clone();
            let buttons = buttons.clone();
            move || match controller.try_borrow_mut() {
                Ok(mut ui) => {
                    ui.on_input();
                    buttons.sync(&ui);
                }
                // on_generate resyncs the button from the input when it finishes
                Err(_) => tracing::debug!("input deferred while generating"),
            }
        });
        listen(&generate, "click", {
            let controller = controller.clone();
            let buttons = buttons.clone();
            move || {
                let controller = controller.clone();
                let buttons = buttons.clone();
                spawn_local(async move {
                    // held across the await so overlapping clicks are dropped
                    #[allow(clippy::await_holding_refcell_ref)]
                    let Ok(mut ui) = controller.try_borrow_mut() else {
                        tracing::debug!("generate ignored while generating");
                        return;
                    };
                    let result = ui.on_generate().await;
                    buttons.sync(&ui);
                    if let Err(e) = result {
                        report(&e);
                    }
                });
            }
        });
        listen(&download, "click", {
            let controller = controller.clone();
            move || {
                let result = match controller.try_borrow_mut() {
                    Ok(mut ui) => ui.on_download(),
                    Err(_) => Ok(()),
                };
                if let Err(e) = result {
                    report(&e);
                }
            }
        });

        Ok(QrApp {
            controller,
            buttons,
        })
    }

    #[wasm_bindgen(js_name = "isGenerateEnabled")]
    pub fn is_generate_enabled(&self) -> bool {
        self.buttons.generate.get()
    }

    #[wasm_bindgen(js_name = "isDownloadEnabled")]
    pub fn is_download_enabled(&self) -> bool {
        self.buttons.download.get()
    }

    /// SVG markup of the last render, if any.
    #[wasm_bindgen(js_name = "svgMarkup")]
    pub fn svg_markup(&self) -> Option<String> {
        self.controller
            .try_borrow()
            .ok()
            .and_then(|ui| ui.manager().svg_markup())
    }
}

fn listen(target: &web_sys::EventTarget, event: &str, mut handler: impl FnMut() + 'static) {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| handler());
    if let Err(e) = target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
        tracing::warn!(event, reason = %js_reason(e), "listener not attached");
    }
    // listeners live as long as the page
    closure.forget();
}

// ============================================================================
// Tests
// ============================================================================
