//! Loading the logo and overlay images.
//!
//! Image references are resolved through an [`AssetSource`]: files on disk
//! for the command line, HTTP with the `http` feature, the browser's `fetch`
//! with the `web` feature, or an in-memory map in tests. Whatever the source,
//! the bytes end up in an [`EmbeddedImage`] that can be inlined as a `data:`
//! URL so the downloaded SVG is self-contained.

use std::collections::HashMap;
use std::future::Future;
use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};
use crate::styler::Logo;
use crate::surface::raster::svg_dimensions;

pub const SVG_MIME: &str = "image/svg+xml";
const OCTET_STREAM: &str = "application/octet-stream";

// ============================================================================
// AssetSource
// ============================================================================

/// Resolves an image reference (path or URL) to its bytes.
pub trait AssetSource {
    fn fetch(&self, reference: &str) -> impl Future<Output = Result<Vec<u8>>>;
}

/// Reads references as paths relative to a root directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileAssets {
    root: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileAssets {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl AssetSource for FileAssets {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let path = self.root.join(reference);
        tracing::debug!(path = %path.display(), "reading asset");
        tokio::fs::read(&path)
            .await
            .map_err(|e| Error::asset_fetch(reference, e))
    }
}

/// Resolves references against a base URL and downloads them.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpAssets {
    client: reqwest::Client,
    base: reqwest::Url,
}

#[cfg(feature = "http")]
impl HttpAssets {
    pub fn new(base: &str) -> Result<Self> {
        let base = reqwest::Url::parse(base).map_err(|e| Error::Config(format!("base URL `{base}`: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }
}

#[cfg(feature = "http")]
impl AssetSource for HttpAssets {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let url = self
            .base
            .join(reference)
            .map_err(|e| Error::asset_fetch(reference, e))?;
        tracing::debug!(%url, "downloading asset");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::asset_fetch(reference, e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::asset_fetch(reference, e))?;
        Ok(bytes.to_vec())
    }
}

/// Serves fixed bytes by reference.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reference: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(reference, bytes);
        self
    }

    pub fn insert(&mut self, reference: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(reference.into(), bytes.into());
    }

    pub fn remove(&mut self, reference: &str) -> Option<Vec<u8>> {
        self.entries.remove(reference)
    }
}

impl AssetSource for MemoryAssets {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        self.entries
            .get(reference)
            .cloned()
            .ok_or_else(|| Error::asset_fetch(reference, "not found"))
    }
}

// ============================================================================
// EmbeddedImage
// ============================================================================

/// Image bytes with their media type.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedImage {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl EmbeddedImage {
    /// Wraps bytes, sniffing the media type from their content.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            mime: sniff_mime(&bytes).to_string(),
            bytes,
        }
    }

    /// Base64 `data:` URL of the image.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }

    /// Intrinsic width and height, if the image can be read.
    pub fn dimensions(&self) -> Option<(f32, f32)> {
        if self.mime == SVG_MIME {
            return svg_dimensions(&self.bytes);
        }
        let (width, height) = image::ImageReader::new(Cursor::new(&self.bytes))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()?;
        Some((width as f32, height as f32))
    }

    /// The image as a logo the styler can size and place.
    pub fn to_logo(&self) -> Option<Logo> {
        let (width, height) = self.dimensions()?;
        Some(Logo::new(self.data_url(), width, height))
    }
}

/// Loads an image, decoding inline `data:` URLs without touching the source.
pub async fn fetch_image<A: AssetSource>(source: &A, reference: &str) -> Result<EmbeddedImage> {
    if let Some(inline) = reference.strip_prefix("data:") {
        return decode_data_url(reference, inline);
    }
    let bytes = source.fetch(reference).await?;
    if bytes.is_empty() {
        return Err(Error::asset_fetch(reference, "empty response"));
    }
    Ok(EmbeddedImage::from_bytes(bytes))
}

fn decode_data_url(reference: &str, inline: &str) -> Result<EmbeddedImage> {
    let (header, payload) = inline
        .split_once(',')
        .ok_or_else(|| Error::asset_fetch(reference, "malformed data URL"))?;
    let (mime, is_base64) = match header.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (header, false),
    };
    let bytes = if is_base64 {
        STANDARD
            .decode(payload)
            .map_err(|e| Error::asset_fetch(reference, e))?
    } else {
        payload.as_bytes().to_vec()
    };
    let mime = if mime.is_empty() {
        sniff_mime(&bytes).to_string()
    } else {
        mime.to_string()
    };
    Ok(EmbeddedImage { mime, bytes })
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let head = head.trim_start();
    if head.starts_with("<svg") || head.starts_with("<?xml") {
        SVG_MIME
    } else {
        OCTET_STREAM
    }
}

// ============================================================================
// Tests
// ============================================================================
