//! In-memory SVG surface produced by the styler.
//!
//! The surface is a small element tree rather than a string so the rendering
//! wrapper can mutate it in place (append the overlay, replace a previous
//! one) before serializing it for download or display.
//!
//! # Layout
//!
//! ```text
//! <svg xmlns=... width height viewBox>
//!   <defs>            gradients, created on first use
//!   <rect>            background
//!   <g>               dots, corner squares, corner dots
//!   <image>           logo
//!   <image class="qr-overlay">   appended after rendering
//! </svg>
//! ```

pub mod overlay;
pub mod raster;

pub use overlay::{OVERLAY_CLASS, OverlayImage};

use std::fmt::{self, Display, Write};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

// ============================================================================
// Nodes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(SvgElement),
    Text(String),
}

/// One SVG element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgElement {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl SvgElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`set_attr`](Self::set_attr).
    pub fn attr(mut self, key: &str, value: impl Display) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder form of [`push`](Self::push).
    pub fn child(mut self, child: SvgElement) -> Self {
        self.push(child);
        self
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set_attr(&mut self, key: &str, value: impl Display) {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push(&mut self, child: SvgElement) {
        self.children.push(Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Direct child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &SvgElement> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
    }

    /// Removes direct children matching `pred`, returning how many were removed.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&SvgElement) -> bool) -> usize {
        let before = self.children.len();
        self.children.retain(|node| match node {
            Node::Element(el) => !pred(el),
            Node::Text(_) => true,
        });
        before - self.children.len()
    }

    /// Collects this element and all descendants matching `pred`, depth first.
    pub fn find_all<'a>(&'a self, pred: &impl Fn(&SvgElement) -> bool, out: &mut Vec<&'a SvgElement>) {
        if pred(self) {
            out.push(self);
        }
        for el in self.elements() {
            el.find_all(pred, out);
        }
    }

    fn write_markup(&self, out: &mut String) -> fmt::Result {
        write!(out, "<{}", self.name)?;
        for (key, value) in &self.attrs {
            write!(out, " {}=\"{}\"", key, escape_xml(value))?;
        }
        if self.children.is_empty() {
            return out.write_str("/>");
        }
        out.write_char('>')?;
        for node in &self.children {
            match node {
                Node::Element(el) => el.write_markup(out)?,
                Node::Text(text) => out.write_str(&escape_xml(text))?,
            }
        }
        write!(out, "</{}>", self.name)
    }
}

impl Display for SvgElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_markup(&mut out)?;
        f.write_str(&out)
    }
}

/// Escapes the five XML special characters.
pub fn escape_xml(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// ============================================================================
// RenderSurface
// ============================================================================

/// The root `<svg>` document a render cycle draws into.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSurface {
    root: SvgElement,
    width: u32,
    height: u32,
}

impl RenderSurface {
    pub fn new(width: u32, height: u32) -> Self {
        let root = SvgElement::new("svg")
            .attr("xmlns", SVG_NS)
            .attr("xmlns:xlink", XLINK_NS)
            .attr("width", width)
            .attr("height", height)
            .attr("viewBox", format!("0 0 {width} {height}"));
        Self { root, width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn root(&self) -> &SvgElement {
        &self.root
    }

    /// The `<defs>` element, created as the first child on first use.
    pub fn defs_mut(&mut self) -> &mut SvgElement {
        let has_defs = matches!(self.root.children.first(), Some(Node::Element(el)) if el.name == "defs");
        if !has_defs {
            self.root
                .children
                .insert(0, Node::Element(SvgElement::new("defs")));
        }
        match &mut self.root.children[0] {
            Node::Element(el) => el,
            Node::Text(_) => unreachable!("defs is always an element"),
        }
    }

    pub fn append_child(&mut self, element: SvgElement) {
        self.root.push(element);
    }

    /// Removes top-level elements carrying `class`.
    pub fn remove_class(&mut self, class: &str) -> usize {
        self.root.remove_where(|el| el.has_class(class))
    }

    /// All elements in the document matching `pred`.
    pub fn find_all(&self, pred: impl Fn(&SvgElement) -> bool) -> Vec<&SvgElement> {
        let mut found = Vec::new();
        self.root.find_all(&pred, &mut found);
        found
    }

    /// Serializes the document as standalone SVG markup.
    pub fn to_svg_string(&self) -> String {
        self.root.to_string()
    }
}

impl Display for RenderSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.root, f)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_surface_markup() {
        let surface = RenderSurface::new(400, 400);
        assert_eq!(
            surface.to_svg_string(),
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="400" height="400" viewBox="0 0 400 400"/>"#
        );
    }

    #[test]
    fn attributes_are_escaped() {
        let el = SvgElement::new("text").attr("data-x", "a<b & \"c\"");
        assert_eq!(el.to_string(), r#"<text data-x="a&lt;b &amp; &quot;c&quot;"/>"#);
    }

    #[test]
    fn set_attr_replaces_value() {
        let mut el = SvgElement::new("rect").attr("x", 1);
        el.set_attr("x", 2.5);
        assert_eq!(el.get_attr("x"), Some("2.5"));
        assert_eq!(el.to_string(), r#"<rect x="2.5"/>"#);
    }

    #[test]
    fn defs_created_once_as_first_child() {
        let mut surface = RenderSurface::new(10, 10);
        surface.append_child(SvgElement::new("rect"));
        surface.defs_mut().push(SvgElement::new("linearGradient"));
        surface.defs_mut().push(SvgElement::new("radialGradient"));

        let names: Vec<_> = surface.root().elements().map(|e| e.name().to_string()).collect();
        assert_eq!(names, ["defs", "rect"]);
        assert_eq!(surface.root().elements().next().unwrap().elements().count(), 2);
    }

    #[test]
    fn remove_and_find_by_class() {
        let mut surface = RenderSurface::new(10, 10);
        surface.append_child(SvgElement::new("image").attr("class", "logo"));
        surface.append_child(SvgElement::new("image").attr("class", "qr-overlay extra"));
        surface.append_child(SvgElement::new("g").child(SvgElement::new("image")));

        assert_eq!(surface.find_all(|e| e.name() == "image").len(), 3);
        assert_eq!(surface.remove_class("qr-overlay"), 1);
        assert_eq!(surface.find_all(|e| e.name() == "image").len(), 2);
    }

    #[test]
    fn nested_children_serialize_in_order() {
        let mut g = SvgElement::new("g").attr("fill", "#000");
        g.push(SvgElement::new("rect").attr("x", 0));
        g.push_text("t");
        assert_eq!(g.to_string(), r##"<g fill="#000"><rect x="0"/>t</g>"##);
    }
}
