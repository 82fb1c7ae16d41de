use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::application::instrumentation::GestureConfig;
use crate::domain::error::{AppError, Result};

pub const CONFIG_FILE: &str = "rdebug.toml";
pub const ENV_PREFIX: &str = "RDEBUG_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    /// Collection origin baked into served scripts when no `serverUrl` is given.
    pub public_url: String,
    pub log_filter: String,
    pub gesture_window_ms: i64,
    pub gesture_threshold: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        let gesture = GestureConfig::default();
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database_url: "sqlite://rdebug.db".to_string(),
            max_connections: 4,
            public_url: "http://localhost:3000".to_string(),
            log_filter: "info".to_string(),
            gesture_window_ms: gesture.window_ms,
            gesture_threshold: gesture.threshold,
        }
    }
}

impl AppConfig {
    /// Defaults, then `rdebug.toml`, then `RDEBUG_*` variables (a `.env` file is loaded first).
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract::<AppConfig>()
            .map_err(|e| AppError::ConfigError(format!("Failed to load configuration: {}", e)))
            .and_then(AppConfig::validated)
    }

    fn validated(self) -> Result<Self> {
        if self.gesture_window_ms <= 0 || self.gesture_threshold == 0 {
            return Err(AppError::ConfigError(
                "Gesture window and threshold must be positive.".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(AppError::ConfigError(
                "max_connections must be at least 1.".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn gesture(&self) -> GestureConfig {
        GestureConfig {
            window_ms: self.gesture_window_ms,
            threshold: self.gesture_threshold,
        }
    }
}
