//! # Image Probing
//!
//! Images are referenced from the SVG, never embedded or decoded, but their
//! raw pixel size is needed for layout. This module reads just enough of an
//! image source to learn that size.
//!
//! Supported `src` formats:
//! - `data:image/...;base64,...`: data URI, used as the `href` as is
//! - File path (absolute or `./`/`../` relative): read from disk, the path
//!   becomes the `href`
//! - Raw base64-encoded image data: wrapped into a data URI

use std::io::Cursor;

use base64::Engine;
use image::ImageFormat;

use crate::error::{Result, TrellisError};

/// What an [`Image`](crate::element::Image) needs to know about its source.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    /// Value for the `xlink:href` attribute.
    pub href: String,
    pub width: u32,
    pub height: u32,
}

/// Read the pixel size of `src`.
pub fn probe(src: &str) -> Result<ImageSource> {
    if src.starts_with("data:image/") {
        let comma = src
            .find(',')
            .ok_or_else(|| TrellisError::Image("invalid data URI: missing comma".to_string()))?;
        let bytes = base64_decode(&src[comma + 1..])?;
        let (_, width, height) = dimensions(&bytes)?;
        return Ok(ImageSource {
            href: src.to_string(),
            width,
            height,
        });
    }

    // Only explicit path prefixes, base64 payloads contain '/' too.
    if src.starts_with('/') || src.starts_with("./") || src.starts_with("../") {
        let bytes = std::fs::read(src)
            .map_err(|e| TrellisError::Image(format!("failed to read image file '{}': {}", src, e)))?;
        let (_, width, height) = dimensions(&bytes)?;
        return Ok(ImageSource {
            href: src.to_string(),
            width,
            height,
        });
    }

    let bytes = base64_decode(src)?;
    let (format, width, height) = dimensions(&bytes)?;
    Ok(ImageSource {
        href: format!("data:{};base64,{}", mime_type(format), src.trim()),
        width,
        height,
    })
}

fn base64_decode(input: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| TrellisError::Image(format!("base64 decode error: {}", e)))
}

/// Format and size from the image header, without decoding pixels.
fn dimensions(data: &[u8]) -> Result<(ImageFormat, u32, u32)> {
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| TrellisError::Image(format!("format detection error: {}", e)))?;
    let format = reader
        .format()
        .ok_or_else(|| TrellisError::Image("unsupported image format".to_string()))?;
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| TrellisError::Image(format!("failed to read dimensions: {}", e)))?;
    tracing::debug!(?format, width, height, "probed image");
    Ok((format, width, height))
}

fn mime_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::WebP => "image/webp",
        _ => "image/png",
    }
}
