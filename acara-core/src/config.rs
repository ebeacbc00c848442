//! Client configuration.
//!
//! Read once at startup: a TOML file at `<config dir>/acara/config.toml`,
//! with environment variables taking precedence over file values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AcaraError, AcaraResult};

/// Default cache validity window in minutes.
pub const DEFAULT_CACHE_MINUTES: u32 = 10;

/// Default recipient for OTP codes.
pub const DEFAULT_ADMIN_PHONE: &str = "62895803292514";

fn default_cache_minutes() -> u32 {
    DEFAULT_CACHE_MINUTES
}

fn default_admin_phone() -> String {
    DEFAULT_ADMIN_PHONE.to_string()
}

/// Configuration at ~/.config/acara/config.toml, overridable per key with
/// `ACARA_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcaraConfig {
    /// GET endpoint returning the full event collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_url: Option<String>,

    /// POST endpoint accepting one new event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_url: Option<String>,

    /// Cache validity window in minutes.
    #[serde(default = "default_cache_minutes")]
    pub cache_minutes: u32,

    /// Webhook that relays OTP codes to the admin phone; unset means
    /// log-only delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_webhook_url: Option<String>,

    /// Phone number OTP codes are sent to.
    #[serde(default = "default_admin_phone")]
    pub admin_phone: String,
}

impl Default for AcaraConfig {
    fn default() -> Self {
        Self {
            events_url: None,
            submit_url: None,
            cache_minutes: DEFAULT_CACHE_MINUTES,
            otp_webhook_url: None,
            admin_phone: default_admin_phone(),
        }
    }
}

impl AcaraConfig {
    pub fn config_path() -> AcaraResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AcaraError::Config("Could not determine config directory".into()))?
            .join("acara");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (if present) and apply environment overrides.
    pub fn load() -> AcaraResult<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| AcaraError::Config(format!("Could not read config file: {e}")))?;
            toml::from_str(&content)
                .map_err(|e| AcaraError::Config(format!("Could not parse config file: {e}")))?
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("ACARA_EVENTS_URL") {
            self.events_url = Some(url);
        }
        if let Ok(url) = std::env::var("ACARA_SUBMIT_URL") {
            self.submit_url = Some(url);
        }
        if let Ok(minutes) = std::env::var("ACARA_CACHE_MINUTES") {
            if let Ok(minutes) = minutes.parse() {
                self.cache_minutes = minutes;
            }
        }
        if let Ok(url) = std::env::var("ACARA_OTP_WEBHOOK_URL") {
            self.otp_webhook_url = Some(url);
        }
        if let Ok(phone) = std::env::var("ACARA_ADMIN_PHONE") {
            self.admin_phone = phone;
        }
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AcaraResult<()> {
        let contents = format!(
            "\
# acara configuration

# GET endpoint returning the event collection:
# events_url = \"https://example.com/webhook/events\"

# POST endpoint accepting a new event:
# submit_url = \"https://example.com/webhook/events/new\"

# How long a sync stays fresh, in minutes:
# cache_minutes = {DEFAULT_CACHE_MINUTES}

# Webhook that relays OTP codes (unset = log-only delivery):
# otp_webhook_url = \"https://example.com/webhook/otp\"

# Phone number OTP codes are sent to:
# admin_phone = \"{DEFAULT_ADMIN_PHONE}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AcaraError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AcaraError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
