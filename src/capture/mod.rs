//! Capture domain — public API.
//!
//! Everything that reads the display or turns a frame into portable
//! bytes lives here. External code should only use the functions
//! exported from this module.

mod encode;
mod screenshot;

pub use encode::{encode_png, EncodeError};
pub use screenshot::{capture_primary_display, CaptureError};
