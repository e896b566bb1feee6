//! Screen Relay — Tauri application shell around the capture pipeline.
//!
//! Wires together:
//! - Capture domain (capture/) — display snapshot + PNG encoding
//! - Delivery bridge (delivery) — hands each encoded frame to the
//!   consumer registered by the embedder, once per trigger
//! - Lifecycle (lifecycle) — quit policy and termination signaling
//! - Preview resource (preview) — `screen://` scheme for redisplaying
//!   the screen inside the UI
//! - Trigger surfaces — `capture_screen` command, tray, global shortcut

pub mod capture;
pub mod config;
pub mod delivery;
pub mod lifecycle;
mod preview;
mod tray;

pub use config::RunConfig;
pub use delivery::{register_consumer, DeliveryBridge, DeliveryReport, FrameConsumer};
pub use lifecycle::QuitPolicy;

use tauri::{AppHandle, Manager, State};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};

use crate::lifecycle::QuitSignal;

/// Accelerator that fires a capture cycle from anywhere.
const CAPTURE_SHORTCUT: &str = "CmdOrCtrl+Shift+S";

/// Tauri command: run one capture → encode → deliver cycle.
///
/// This is the entry point the UI invokes; failures come back as a
/// string for the IPC boundary and the cycle delivers nothing.
#[tauri::command]
fn capture_screen(
    app: AppHandle,
    bridge: State<'_, DeliveryBridge>,
) -> Result<DeliveryReport, String> {
    bridge.on_trigger(&app).map_err(|e| e.to_string())
}

/// Tauri command: ask the event loop to terminate. Safe to call while
/// already terminating.
#[tauri::command]
fn request_quit(app: AppHandle) {
    app.request_quit();
}

/// Shared trigger path for tray clicks and the global shortcut, where
/// there is no caller to report to — failures are already logged by the
/// bridge.
pub(crate) fn trigger_capture(app: &AppHandle) {
    let bridge = app.state::<DeliveryBridge>();
    let _ = bridge.on_trigger(app);
}

/// Runs the app with an explicitly supplied frame consumer.
pub fn run(consumer: FrameConsumer, config: RunConfig) {
    run_app(DeliveryBridge::new(consumer, config.quit_policy));
}

/// Runs the app resolving the frame consumer from the process-wide
/// registry; [`register_consumer`] must have been called first.
pub fn run_registered(config: RunConfig) -> Result<(), delivery::DeliveryError> {
    let bridge = DeliveryBridge::from_registry(config.quit_policy)?;
    run_app(bridge);
    Ok(())
}

fn run_app(bridge: DeliveryBridge) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .plugin(
            tauri_plugin_global_shortcut::Builder::new()
                .with_handler(|app, _shortcut, event| {
                    if event.state() == ShortcutState::Pressed {
                        log::info!("capture shortcut pressed");
                        trigger_capture(app);
                    }
                })
                .build(),
        )
        .manage(bridge)
        .register_uri_scheme_protocol(preview::URI_SCHEME, |_ctx, request| {
            preview::handle(&request)
        })
        .invoke_handler(tauri::generate_handler![capture_screen, request_quit])
        .setup(|app| {
            log::info!("screen-relay starting up");

            tray::setup_tray(app.handle())?;
            app.global_shortcut().register(CAPTURE_SHORTCUT)?;

            log::info!("tray and {CAPTURE_SHORTCUT} shortcut ready");
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error running screen-relay");
}
