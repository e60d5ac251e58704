//! Configuration for the lock gate and analytics
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/finos/config.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! The `FINOS_PIN` environment variable replaces the PIN from either layer.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::lock::Pin;
use crate::models::DEFAULT_NEEDS;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/finos.toml");

/// Environment variable that overrides the configured PIN
pub const PIN_ENV_VAR: &str = "FINOS_PIN";

/// Upper bound for `lockout_secs` and `inactivity_secs` (one day)
pub const MAX_TIMER_SECS: i64 = 24 * 60 * 60;

/// Lock gate constants
#[derive(Debug, Clone)]
pub struct LockConfig {
    pub pin: Pin,
    /// Wrong PINs before lockout
    pub max_attempts: u32,
    pub lockout_duration: Duration,
    /// Idle time before an unlocked session relocks
    pub inactivity_limit: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            pin: Pin::default(),
            max_attempts: 3,
            lockout_duration: Duration::minutes(5),
            inactivity_limit: Duration::minutes(5),
        }
    }
}

/// Analytics settings
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Expense categories counted as needs
    pub needs: Vec<String>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            needs: DEFAULT_NEEDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Default currency symbol for reports
pub const DEFAULT_CURRENCY: &str = "₱";

/// Report formatting
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub currency: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FinosConfig {
    pub lock: LockConfig,
    pub analytics: AnalyticsConfig,
    pub display: DisplayConfig,
}

impl FinosConfig {
    /// Load from an explicit path, the data-dir override, or the embedded
    /// defaults, then apply `FINOS_PIN`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = load_config(explicit)?;
        if let Ok(pin) = std::env::var(PIN_ENV_VAR) {
            config.lock.pin = Pin::new(&pin)
                .map_err(|e| Error::Config(format!("{}: {}", PIN_ENV_VAR, e)))?;
            debug!("PIN taken from environment");
        }
        Ok(config)
    }

    /// Parse a TOML document; missing sections and keys keep their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Embedded defaults
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG)
    }
}

/// Get the default override config path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finos").join("config.toml"))
}

/// The file `FinosConfig::load` would read, if any
pub fn resolved_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    }
}

/// Load configuration (override first, then default)
fn load_config(explicit: Option<&Path>) -> Result<FinosConfig> {
    let content = match resolved_config_path(explicit) {
        Some(path) => {
            debug!(path = %path.display(), "Loading config");
            fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    lock: Option<RawLock>,
    analytics: Option<RawAnalytics>,
    display: Option<RawDisplay>,
}

#[derive(Debug, Deserialize)]
struct RawLock {
    pin: Option<String>,
    max_attempts: Option<u32>,
    lockout_secs: Option<i64>,
    inactivity_secs: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawAnalytics {
    needs: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    currency: Option<String>,
}

fn parse_config(content: &str) -> Result<FinosConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = FinosConfig::default();

    if let Some(lock) = raw.lock {
        if let Some(pin) = lock.pin {
            config.lock.pin = Pin::new(&pin)?;
        }
        if let Some(max_attempts) = lock.max_attempts {
            if max_attempts == 0 {
                return Err(Error::Config("max_attempts must be at least 1".into()));
            }
            config.lock.max_attempts = max_attempts;
        }
        if let Some(secs) = lock.lockout_secs {
            config.lock.lockout_duration = positive_secs("lockout_secs", secs)?;
        }
        if let Some(secs) = lock.inactivity_secs {
            config.lock.inactivity_limit = positive_secs("inactivity_secs", secs)?;
        }
    }

    if let Some(needs) = raw.analytics.and_then(|a| a.needs) {
        config.analytics.needs = needs
            .into_iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
    }

    if let Some(currency) = raw.display.and_then(|d| d.currency) {
        let currency = currency.trim();
        if currency.is_empty() {
            return Err(Error::Config("currency cannot be empty".into()));
        }
        config.display.currency = currency.to_string();
    }

    Ok(config)
}

fn positive_secs(key: &str, secs: i64) -> Result<Duration> {
    if secs <= 0 || secs > MAX_TIMER_SECS {
        return Err(Error::Config(format!(
            "{} must be between 1 and {}",
            key, MAX_TIMER_SECS
        )));
    }
    Duration::try_seconds(secs)
        .ok_or_else(|| Error::Config(format!("{} is out of range", key)))
}
