//! Deployment configuration.
//!
//! The only tunable is the quit policy. Resolution order: the
//! `SCREEN_RELAY_QUIT` environment variable (a `.env` file next to the
//! binary is honored), then the JSON config file under the platform
//! config directory, then the default (explicit quit). Embedders that
//! call the library directly can skip all of this and pass a
//! [`RunConfig`] by hand.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::lifecycle::QuitPolicy;

/// Environment variable selecting the quit policy.
/// Accepts `auto`/`after-delivery`/`oneshot` and `explicit`/`stay`.
pub const QUIT_POLICY_ENV: &str = "SCREEN_RELAY_QUIT";

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub quit_policy: QuitPolicy,
}

impl RunConfig {
    /// Resolves the configuration for this deployment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        if let Ok(raw) = std::env::var(QUIT_POLICY_ENV) {
            match parse_quit_policy(&raw) {
                Some(quit_policy) => return Self { quit_policy },
                None => log::warn!("unrecognized {QUIT_POLICY_ENV}={raw}, falling back"),
            }
        }

        config_path()
            .and_then(|path| read_config(&path))
            .unwrap_or_default()
    }
}

fn parse_quit_policy(raw: &str) -> Option<QuitPolicy> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "auto" | "after-delivery" | "oneshot" => Some(QuitPolicy::AfterDelivery),
        "explicit" | "stay" => Some(QuitPolicy::Explicit),
        _ => None,
    }
}

fn config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("screen-relay").join("config.json"))
}

/// Reads a config file, treating a missing or malformed file as absent.
fn read_config(path: &Path) -> Option<RunConfig> {
    let raw = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(config) => {
            log::debug!("loaded config from {}", path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("ignoring malformed config {}: {e}", path.display());
            None
        }
    }
}
