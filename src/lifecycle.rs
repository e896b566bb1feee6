//! Process lifecycle — when and how the event loop is told to stop.

use serde::{Deserialize, Serialize};

/// Termination policy, fixed when the delivery bridge is constructed.
///
/// Deployment configuration, not a runtime negotiation: a bridge never
/// changes policy after construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuitPolicy {
    /// Keep running until an external actor requests termination.
    #[default]
    Explicit,

    /// Request termination right after the first successful delivery.
    /// This is the one-shot capture-tool mode.
    AfterDelivery,
}

/// Sink for termination requests.
///
/// The production implementation exits the Tauri event loop; tests
/// substitute a counter to observe how often termination was requested.
pub trait QuitSignal {
    /// Asks the hosting event loop to terminate. Idempotent — calling it
    /// while already terminating is safe and does nothing further.
    fn request_quit(&self);
}

impl QuitSignal for tauri::AppHandle {
    fn request_quit(&self) {
        log::info!("termination requested");
        self.exit(0);
    }
}
