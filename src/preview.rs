//! `screen://` preview resource.
//!
//! Lets the UI redisplay the current screen content without touching the
//! delivery path. Every request re-captures the display; there is no
//! caching and no coupling to the delivery bridge, so a preview fetch can
//! never consume a delivery and repeated fetches simply grab fresh frames.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};
use tauri::http::{header::CONTENT_TYPE, Request, Response, StatusCode};

use crate::capture::{self, CaptureError};

/// URI scheme the provider is registered under; the UI loads
/// `screen://localhost/<id>` (or `http://screen.localhost/<id>` on
/// Windows). The id only labels the request — any id yields a fresh
/// capture of the primary display.
pub const URI_SCHEME: &str = "screen";

/// Serves one preview request from the webview.
pub fn handle(request: &Request<Vec<u8>>) -> Response<Vec<u8>> {
    log::debug!("preview requested: {}", request.uri());
    respond(capture::capture_primary_display())
}

fn respond(frame: Result<DynamicImage, CaptureError>) -> Response<Vec<u8>> {
    let frame = match frame {
        Ok(frame) => frame,
        Err(e) => {
            log::warn!("preview capture unavailable: {e}");
            return message_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string());
        }
    };

    // The webview needs a displayable image back over the protocol, so
    // the raster is serialized inline here, independent of the delivery
    // encoder.
    let mut bytes: Vec<u8> = Vec::new();
    if let Err(e) = frame.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png) {
        log::error!("preview serialization failed: {e}");
        return message_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    match Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "image/png")
        .body(bytes)
    {
        Ok(response) => response,
        Err(e) => {
            log::error!("preview response assembly failed: {e}");
            message_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn message_response(status: StatusCode, message: String) -> Response<Vec<u8>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(message.into_bytes())
        .unwrap_or_else(|_| Response::new(Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn healthy_capture_yields_a_png_response() {
        let frame =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([0, 128, 255, 255])));

        let response = respond(Ok(frame));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "image/png");
        assert_eq!(&response.body()[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn unavailable_capture_yields_service_unavailable() {
        let response = respond(Err(CaptureError::NoDisplay));

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }
}
