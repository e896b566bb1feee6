//! Primary-display capture using the `xcap` crate.
//!
//! This is the infrastructure layer — the only file that talks to the
//! display server. Everything downstream operates on the returned
//! `DynamicImage` and never touches the OS.

use image::DynamicImage;
use xcap::Monitor;

/// Captures the primary display's current content as an RGBA image.
///
/// Best-effort single-frame snapshot: content changing mid-grab may tear
/// across the frame. A headless environment (no display server, no
/// monitors) reports [`CaptureError`]; callers treat that as a skipped
/// cycle rather than a fatal fault.
pub fn capture_primary_display() -> Result<DynamicImage, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::Unavailable(e.to_string()))?;

    // Fallback: if no monitor reports as primary, use the first one
    let primary = monitors
        .iter()
        .find(|m| m.is_primary().unwrap_or(false))
        .or_else(|| monitors.first())
        .ok_or(CaptureError::NoDisplay)?;

    let frame = primary
        .capture_image()
        .map_err(|e| CaptureError::Unavailable(e.to_string()))?;

    log::debug!(
        "captured {}x{} frame from primary display",
        frame.width(),
        frame.height()
    );

    Ok(DynamicImage::ImageRgba8(frame))
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no display attached")]
    NoDisplay,

    #[error("display unavailable: {0}")]
    Unavailable(String),
}
