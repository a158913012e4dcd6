//! Input normalization: every `ImageInput` variant resolves to one
//! canonical pixel buffer plus a best-effort mime type.
//!
//! Resolution is a decision tree over the variants, not a
//! try-all-and-catch cascade: each branch either succeeds or fails with a
//! `DecodeError` naming that branch. Disambiguation of string inputs
//! happens earlier, in `ImageInput::from_text`.

use std::io::Cursor;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::ImageFormat;

use crate::error::DecodeError;
use crate::types::{ImageInput, InputKind, PixelBuffer};

/// Mime used when no better source (hint, header, extension, detection)
/// is available. Matches the service's historical default for raw pixels.
pub const DEFAULT_MIME: &str = "image/jpeg";

/// A resolved input: canonical pixels and the mime type we believe the
/// original encoding had.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub pixels: PixelBuffer,
    pub mime_type: String,
}

/// Resolves heterogeneous image inputs to `ResolvedImage`.
///
/// Stateless apart from a shared HTTP client; a pure function of its
/// input. Fetching has no internal timeout or retry — callers needing
/// bounded latency wrap the call with an external deadline.
pub struct FormatResolver {
    http: reqwest::Client,
}

impl Default for FormatResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatResolver {
    /// Create a resolver with a fresh HTTP client.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }

    /// Resolve an input to canonical pixels.
    pub async fn resolve(&self, input: ImageInput) -> Result<ResolvedImage, DecodeError> {
        match input {
            ImageInput::Pixels(pixels) => {
                tracing::trace!("Input is already a pixel buffer");
                Ok(ResolvedImage {
                    pixels,
                    mime_type: DEFAULT_MIME.to_string(),
                })
            }
            ImageInput::Bytes { data, mime_hint } => {
                tracing::trace!("Input is {} encoded bytes", data.len());
                let (pixels, detected) = decode_bytes(data, InputKind::Bytes).await?;
                Ok(ResolvedImage {
                    pixels,
                    mime_type: pick_mime(mime_hint, detected),
                })
            }
            ImageInput::Url(url) => self.resolve_url(url).await,
            ImageInput::Path(path) => resolve_path(path).await,
            ImageInput::Base64(text) => resolve_base64(text).await,
        }
    }

    async fn resolve_url(&self, url: String) -> Result<ResolvedImage, DecodeError> {
        tracing::debug!("Fetching image from {}", url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| DecodeError::Fetch {
                url: url.clone(),
                message: e.to_string(),
            })?;

        // Mime comes from the response headers, parameters stripped.
        let header_mime = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DecodeError::Fetch {
                url: url.clone(),
                message: e.to_string(),
            })?
            .to_vec();

        let (pixels, detected) = decode_bytes(bytes, InputKind::Url).await?;
        Ok(ResolvedImage {
            pixels,
            mime_type: pick_mime(header_mime, detected),
        })
    }
}

async fn resolve_path(path: PathBuf) -> Result<ResolvedImage, DecodeError> {
    tracing::debug!("Reading image file {:?}", path);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| DecodeError::FileRead {
            path: path.clone(),
            message: e.to_string(),
        })?;

    // Mime guessed from the file extension; content detection is the fallback.
    let ext_mime = ImageFormat::from_path(&path)
        .ok()
        .map(|f| f.to_mime_type().to_string());

    let (pixels, detected) = decode_bytes(bytes, InputKind::Path).await?;
    Ok(ResolvedImage {
        pixels,
        mime_type: pick_mime(ext_mime, detected),
    })
}

async fn resolve_base64(text: String) -> Result<ResolvedImage, DecodeError> {
    let (header_mime, payload) = split_data_header(&text);
    tracing::trace!("Decoding base64 payload of {} chars", payload.len());

    let bytes = BASE64
        .decode(payload)
        .map_err(|e| DecodeError::Base64 {
            message: e.to_string(),
        })?;

    let (pixels, detected) = decode_bytes(bytes, InputKind::Base64).await?;
    Ok(ResolvedImage {
        pixels,
        mime_type: pick_mime(header_mime, detected),
    })
}

/// Split an optional `data:<mime>;base64,` header off a base64 string,
/// returning the mime (if the header named one) and the payload.
fn split_data_header(text: &str) -> (Option<String>, &str) {
    if let Some(rest) = text.strip_prefix("data:") {
        if let Some((header, payload)) = rest.split_once(',') {
            let mime = header.strip_suffix(";base64").unwrap_or(header);
            let mime = (!mime.is_empty()).then(|| mime.to_string());
            return (mime, payload);
        }
    }
    (None, text)
}

/// Variant-specific mime first, then what the decoder detected, then the
/// default.
fn pick_mime(preferred: Option<String>, detected: Option<&'static str>) -> String {
    preferred
        .or_else(|| detected.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_MIME.to_string())
}

/// Decode encoded image bytes off the async runtime.
async fn decode_bytes(
    bytes: Vec<u8>,
    kind: InputKind,
) -> Result<(PixelBuffer, Option<&'static str>), DecodeError> {
    tokio::task::spawn_blocking(move || decode_bytes_sync(bytes, kind))
        .await
        .map_err(|e| DecodeError::Malformed {
            kind,
            message: format!("Decode task join error: {e}"),
        })?
}

/// Synchronous decode (runs in spawn_blocking). Format is sniffed from
/// the content, not trusted from any name.
fn decode_bytes_sync(
    bytes: Vec<u8>,
    kind: InputKind,
) -> Result<(PixelBuffer, Option<&'static str>), DecodeError> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::Malformed {
            kind,
            message: format!("Cannot detect image format: {e}"),
        })?;
    let detected = reader.format().map(|f| f.to_mime_type());
    let image = reader.decode().map_err(|e| DecodeError::Malformed {
        kind,
        message: e.to_string(),
    })?;
    Ok((PixelBuffer::from_dynamic(image), detected))
}
