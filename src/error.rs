//! Error types for QR generation and the UI layer.

use thiserror::Error;

/// Result type alias for crate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring, rendering or saving a code.
#[derive(Error, Debug)]
pub enum Error {
    /// A view element the controller needs is not present.
    #[error("required element `#{0}` not found")]
    MissingElement(String),

    /// An image asset could not be loaded.
    #[error("failed to fetch asset `{reference}`: {reason}")]
    AssetFetch { reference: String, reason: String },

    /// The QR encoder rejected the data.
    #[error("failed to encode QR code: {0}")]
    Encode(String),

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A color string that is neither hex nor `rgb()`/`rgba()`.
    #[error("invalid color `{0}`")]
    InvalidColor(String),

    /// Generate was asked to encode blank text.
    #[error("cannot generate a QR code from empty data")]
    EmptyData,

    /// The surface could not be rasterized.
    #[error("rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn asset_fetch(reference: impl Into<String>, reason: impl ToString) -> Self {
        Self::AssetFetch {
            reference: reference.into(),
            reason: reason.to_string(),
        }
    }
}
