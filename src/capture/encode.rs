//! Lossless PNG encoding — functional core.
//!
//! Pixel data in, a conformant PNG byte stream out. No infrastructure
//! dependencies, no side effects.

use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Encodes a frame as a PNG byte stream.
///
/// The output is a complete PNG file (signature, IHDR, IDAT, IEND) that
/// any standard decoder reads back pixel-identical — the format is
/// lossless for RGBA input.
///
/// Frames with zero width or height are rejected with
/// [`EncodeError::EmptyFrame`]: the PNG header cannot express a
/// 0-pixel dimension, so there is no valid encoding to produce. On any
/// failure the partially written buffer is dropped here and never
/// escapes.
pub fn encode_png(frame: &DynamicImage) -> Result<Vec<u8>, EncodeError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(EncodeError::EmptyFrame);
    }

    let mut bytes: Vec<u8> = Vec::new();
    frame
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| EncodeError::Encoding(e.to_string()))?;

    Ok(bytes)
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("frame has zero width or height")]
    EmptyFrame,

    #[error("PNG encoding failed: {0}")]
    Encoding(String),
}
