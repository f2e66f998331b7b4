//! # Scanner Configuration
//!
//! Timing and behavior knobs for the scan controller.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TAPCART_POLL_READ_TIMEOUT_MS=2500                                  │
//! │     TAPCART_DEVELOPMENT=true                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/kiosk/scanner.toml (Linux)                               │
//! │     ~/Library/Application Support/com.tapcart.kiosk/scanner.toml       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # scanner.toml
//! [scanner]
//! manual_read_timeout_ms = 5000   # one-shot read from the Scan button
//! poll_read_timeout_ms = 2000     # each read inside the continuous scan
//! post_read_cooldown_ms = 1500    # loop pause after a tag was read
//! poll_interval_ms = 300          # loop pause between every iteration
//! detection_cooldown_ms = 1500    # duplicate suppression window
//! write_timeout_ms = 15000
//! max_consecutive_failures = 5    # 0 = never escalate
//! development = false             # hides "not supported" notices
//!
//! [device]
//! name = "Counter Kiosk"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{NfcError, NfcResult};

// =============================================================================
// Scanner Section
// =============================================================================

/// `[scanner]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerSection {
    #[serde(default = "default_manual_read_timeout_ms")]
    pub manual_read_timeout_ms: u64,

    #[serde(default = "default_poll_read_timeout_ms")]
    pub poll_read_timeout_ms: u64,

    #[serde(default = "default_post_read_cooldown_ms")]
    pub post_read_cooldown_ms: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_detection_cooldown_ms")]
    pub detection_cooldown_ms: u64,

    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,

    /// Unclassified read failures in a row before the listener hears about
    /// it. Zero keeps retrying silently.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,

    /// Development build: an unsupported device is not reported to the user.
    #[serde(default)]
    pub development: bool,
}

fn default_manual_read_timeout_ms() -> u64 {
    5000
}

fn default_poll_read_timeout_ms() -> u64 {
    2000
}

fn default_post_read_cooldown_ms() -> u64 {
    1500
}

fn default_poll_interval_ms() -> u64 {
    300
}

fn default_detection_cooldown_ms() -> u64 {
    1500
}

fn default_write_timeout_ms() -> u64 {
    15_000
}

fn default_max_consecutive_failures() -> u32 {
    5
}

impl Default for ScannerSection {
    fn default() -> Self {
        ScannerSection {
            manual_read_timeout_ms: default_manual_read_timeout_ms(),
            poll_read_timeout_ms: default_poll_read_timeout_ms(),
            post_read_cooldown_ms: default_post_read_cooldown_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            detection_cooldown_ms: default_detection_cooldown_ms(),
            write_timeout_ms: default_write_timeout_ms(),
            max_consecutive_failures: default_max_consecutive_failures(),
            development: false,
        }
    }
}

// =============================================================================
// Device Section
// =============================================================================

/// `[device]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSection {
    /// Human-readable reader name, used in logs.
    #[serde(default = "default_device_name")]
    pub name: String,
}

fn default_device_name() -> String {
    "TapCart Reader".to_string()
}

impl Default for DeviceSection {
    fn default() -> Self {
        DeviceSection {
            name: default_device_name(),
        }
    }
}

// =============================================================================
// Scanner Config
// =============================================================================

/// Complete scanner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default)]
    pub scanner: ScannerSection,

    #[serde(default)]
    pub device: DeviceSection,
}

impl ScannerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (scanner.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> NfcResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading scanner config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load scanner config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> NfcResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| NfcError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Scanner config saved");
        Ok(())
    }

    /// Validates the configuration. Every timeout and pause must be > 0.
    pub fn validate(&self) -> NfcResult<()> {
        let s = &self.scanner;
        let timings = [
            ("manual_read_timeout_ms", s.manual_read_timeout_ms),
            ("poll_read_timeout_ms", s.poll_read_timeout_ms),
            ("post_read_cooldown_ms", s.post_read_cooldown_ms),
            ("poll_interval_ms", s.poll_interval_ms),
            ("detection_cooldown_ms", s.detection_cooldown_ms),
            ("write_timeout_ms", s.write_timeout_ms),
        ];

        for (name, value) in timings {
            if value == 0 {
                return Err(NfcError::InvalidConfig(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        if self.device.name.trim().is_empty() {
            return Err(NfcError::InvalidConfig("device name must not be empty".into()));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let s = &mut self.scanner;
        let millis: [(&str, &mut u64); 6] = [
            ("TAPCART_MANUAL_READ_TIMEOUT_MS", &mut s.manual_read_timeout_ms),
            ("TAPCART_POLL_READ_TIMEOUT_MS", &mut s.poll_read_timeout_ms),
            ("TAPCART_POST_READ_COOLDOWN_MS", &mut s.post_read_cooldown_ms),
            ("TAPCART_POLL_INTERVAL_MS", &mut s.poll_interval_ms),
            ("TAPCART_DETECTION_COOLDOWN_MS", &mut s.detection_cooldown_ms),
            ("TAPCART_WRITE_TIMEOUT_MS", &mut s.write_timeout_ms),
        ];

        for (key, field) in millis {
            if let Some(raw) = var(key) {
                match raw.parse::<u64>() {
                    Ok(ms) => {
                        debug!(key, ms, "Overriding scanner timing from environment");
                        *field = ms;
                    }
                    Err(_) => warn!(key, value = %raw, "Ignoring non-numeric override"),
                }
            }
        }

        if let Some(raw) = var("TAPCART_MAX_CONSECUTIVE_FAILURES") {
            match raw.parse::<u32>() {
                Ok(n) => s.max_consecutive_failures = n,
                Err(_) => warn!(value = %raw, "Ignoring non-numeric failure limit"),
            }
        }

        if let Some(raw) = var("TAPCART_DEVELOPMENT") {
            match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" => s.development = true,
                "0" | "false" | "no" => s.development = false,
                _ => warn!(value = %raw, "Unknown development flag in environment"),
            }
        }

        if let Some(name) = var("TAPCART_DEVICE_NAME") {
            self.device.name = name;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tapcart", "kiosk")
            .map(|dirs| dirs.config_dir().join("scanner.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn manual_read_timeout(&self) -> Duration {
        Duration::from_millis(self.scanner.manual_read_timeout_ms)
    }

    pub fn poll_read_timeout(&self) -> Duration {
        Duration::from_millis(self.scanner.poll_read_timeout_ms)
    }

    pub fn post_read_cooldown(&self) -> Duration {
        Duration::from_millis(self.scanner.post_read_cooldown_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.scanner.poll_interval_ms)
    }

    pub fn detection_cooldown(&self) -> Duration {
        Duration::from_millis(self.scanner.detection_cooldown_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.scanner.write_timeout_ms)
    }

    pub fn max_consecutive_failures(&self) -> u32 {
        self.scanner.max_consecutive_failures
    }

    pub fn is_development(&self) -> bool {
        self.scanner.development
    }
}
