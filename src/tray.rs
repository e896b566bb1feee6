//! System tray setup and click handler.
//!
//! The tray is the always-available entry point: left-click (or the
//! "Capture screen" menu item) fires one delivery cycle, and "Quit"
//! requests termination.

use tauri::{
    image::Image as TrayImage,
    menu::{MenuBuilder, MenuItemBuilder},
    tray::TrayIconBuilder,
    AppHandle,
};

use crate::lifecycle::QuitSignal;

/// Sets up the tray icon with its menu and click handler.
pub fn setup_tray(app: &AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    let capture_item = MenuItemBuilder::with_id("capture", "Capture screen").build(app)?;
    let quit_item = MenuItemBuilder::with_id("quit", "Quit Screen Relay").build(app)?;
    let menu = MenuBuilder::new(app)
        .item(&capture_item)
        .item(&quit_item)
        .build()?;

    let _tray = TrayIconBuilder::new()
        .icon(tray_icon())
        .tooltip("Screen Relay — click to capture")
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray_icon, event| {
            if let tauri::tray::TrayIconEvent::Click {
                button: tauri::tray::MouseButton::Left,
                ..
            } = event
            {
                log::info!("tray icon clicked — triggering capture");
                crate::trigger_capture(tray_icon.app_handle());
            }
        })
        .on_menu_event(|app, event| {
            if event.id() == "capture" {
                log::info!("capture requested from tray menu");
                crate::trigger_capture(app);
            } else if event.id() == "quit" {
                log::info!("quit requested from tray menu");
                app.request_quit();
            }
        })
        .build(app)?;

    Ok(())
}

/// Solid accent-color square, built in code so the tray needs no
/// bundled asset.
fn tray_icon() -> TrayImage<'static> {
    const SIDE: u32 = 32;
    const ACCENT_RGBA: [u8; 4] = [0x2d, 0x7d, 0xf6, 0xff];

    let mut rgba = Vec::with_capacity((SIDE * SIDE * 4) as usize);
    for _ in 0..SIDE * SIDE {
        rgba.extend_from_slice(&ACCENT_RGBA);
    }
    TrayImage::new_owned(rgba, SIDE, SIDE)
}
