//! Core data types for the Lumen classification pipeline.
//!
//! `ImageInput` and `PixelBuffer` cover the input side; `ScoreEntry` and
//! `RankedResult` are the output shapes the surrounding transport layer
//! serializes verbatim.

use std::fmt;
use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

/// Canonical pixel representation all downstream stages consume.
///
/// Height × width × 3 unsigned 8-bit samples (RGB). Created by the
/// format resolver, owned by the request, discarded when it completes.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    inner: RgbImage,
}

impl PixelBuffer {
    /// Wrap an already-materialized RGB image.
    pub fn from_rgb8(image: RgbImage) -> Self {
        Self { inner: image }
    }

    /// Convert any decoded image into the canonical RGB8 form.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            inner: image.to_rgb8(),
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Image height in pixels.
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Borrow the underlying RGB8 image.
    pub fn as_rgb8(&self) -> &RgbImage {
        &self.inner
    }
}

/// The representation a caller supplied an image in.
///
/// Exactly one variant per request. The string-typed variants are
/// disambiguated once, up front, by [`ImageInput::from_text`] — resolution
/// itself never falls back from one variant to another.
#[derive(Debug, Clone)]
pub enum ImageInput {
    /// Already-decoded pixels; passed through unchanged
    Pixels(PixelBuffer),

    /// Encoded image bytes (JPEG/PNG/...), with an optional caller mime hint
    Bytes {
        data: Vec<u8>,
        mime_hint: Option<String>,
    },

    /// Remote image to fetch over HTTP(S)
    Url(String),

    /// Local image file to read
    Path(PathBuf),

    /// Base64 text, optionally prefixed with a `data:<mime>;base64,` header
    Base64(String),
}

impl ImageInput {
    /// Classify a caller-supplied string by the fixed precedence chain:
    /// `http://`/`https://` prefix → URL, existing local path → file,
    /// anything else → base64 text.
    ///
    /// The decision is made exactly once here; a string that lands in the
    /// base64 branch is never re-tried as a URL or path.
    pub fn from_text(text: &str) -> Self {
        if text.starts_with("http://") || text.starts_with("https://") {
            return ImageInput::Url(text.to_string());
        }
        if Path::new(text).exists() {
            return ImageInput::Path(PathBuf::from(text));
        }
        ImageInput::Base64(text.to_string())
    }

    /// Encoded bytes without a mime hint.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        ImageInput::Bytes {
            data,
            mime_hint: None,
        }
    }

    /// Which variant this input is; used in decode error reporting.
    pub fn kind(&self) -> InputKind {
        match self {
            ImageInput::Pixels(_) => InputKind::Pixels,
            ImageInput::Bytes { .. } => InputKind::Bytes,
            ImageInput::Url(_) => InputKind::Url,
            ImageInput::Path(_) => InputKind::Path,
            ImageInput::Base64(_) => InputKind::Base64,
        }
    }
}

/// Names of the input variants, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pixels,
    Bytes,
    Url,
    Path,
    Base64,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InputKind::Pixels => "pixel buffer",
            InputKind::Bytes => "raw bytes",
            InputKind::Url => "url",
            InputKind::Path => "file path",
            InputKind::Base64 => "base64",
        };
        f.write_str(name)
    }
}

/// One label with its softmax confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// The caller-supplied label, unchanged
    pub label: String,

    /// Confidence in [0, 1]; all entries of a result sum to ~1.0
    pub confidence: f32,
}

/// The full ranked result of one classification request.
///
/// Serializes as `{prediction, other_predictions, model_name}` — the shape
/// existing clients of the service depend on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedResult {
    /// The label with the maximum raw similarity
    pub prediction: ScoreEntry,

    /// Every label's entry, sorted by confidence descending
    pub other_predictions: Vec<ScoreEntry>,

    /// The model identifier the caller requested, echoed back
    pub model_name: String,
}
