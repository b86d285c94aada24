//! Background image decoding.
//!
//! Backgrounds are stored as `data:` URLs. Only the natural pixel size is
//! needed for the contain-fit mapping, so decoding stops at the header.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageReader;
use thiserror::Error;

use crate::geometry::Size;

#[derive(Debug, Error)]
pub enum ImageSourceError {
    #[error("Not a data URL")]
    NotDataUrl,

    #[error("Only base64 data URLs are supported")]
    NotBase64,

    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Split a `data:[<mime>][;base64],<payload>` URL and decode the payload.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, ImageSourceError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or(ImageSourceError::NotDataUrl)?;
    let (meta, payload) = rest.split_once(',').ok_or(ImageSourceError::NotDataUrl)?;
    if !meta.ends_with(";base64") {
        return Err(ImageSourceError::NotBase64);
    }
    Ok(STANDARD.decode(payload.trim())?)
}

/// Natural pixel size of an encoded image.
pub fn natural_size(bytes: &[u8]) -> Result<Size, ImageSourceError> {
    let (width, height) = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    Ok(Size::new(f64::from(width), f64::from(height)))
}

/// Natural pixel size of a background given as a data URL.
pub fn natural_size_of_data_url(url: &str) -> Result<Size, ImageSourceError> {
    let bytes = decode_data_url(url)?;
    natural_size(&bytes)
}
