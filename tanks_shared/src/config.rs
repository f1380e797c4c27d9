//! Configuration system.
//!
//! Loads game configuration from JSON strings/files (file IO left to app).

use serde::{Deserialize, Serialize};

/// Root configuration shared by client/server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Relay address, e.g. `127.0.0.1:9000`.
    pub server_addr: String,
    /// Player display name. Empty means a pseudo-random fallback is used.
    #[serde(default)]
    pub player_name: String,
    /// Root directory for models/textures/sounds.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    /// Free-fly camera instead of vehicle follow.
    #[serde(default)]
    pub observer: bool,
    /// Run without a server; the local integrator drives the vehicle.
    #[serde(default)]
    pub offline: bool,
    /// Period of the input-send timer, independent of the frame rate.
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,
}

fn default_assets_dir() -> String {
    "assets".to_string()
}

fn default_send_interval_ms() -> u64 {
    33
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:9000".to_string(),
            player_name: String::new(),
            assets_dir: default_assets_dir(),
            observer: false,
            offline: false,
            send_interval_ms: default_send_interval_ms(),
        }
    }
}

impl GameConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
