//! Configuration types.

use std::time::Duration;

use crate::error::ConfigError;

/// Full wizard configuration.
#[derive(Debug, Clone, Default)]
pub struct WizardConfig {
    pub api: ApiConfig,
    pub upload: UploadConfig,
    pub dev: DevConfig,
}

impl WizardConfig {
    /// Build configuration from `ONBOARD_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api: ApiConfig {
                base_url: env_or("ONBOARD_API_BASE_URL", ApiConfig::DEFAULT_BASE_URL),
                log_responses: env_flag("ONBOARD_LOG_API_RESPONSES")?,
            },
            upload: UploadConfig {
                folder: env_or("ONBOARD_UPLOAD_FOLDER", UploadConfig::DEFAULT_FOLDER),
                cleanup_delay: UploadConfig::default().cleanup_delay,
            },
            dev: DevConfig {
                auto_verify_otp: env_flag("ONBOARD_AUTO_VERIFY_OTP")?,
                show_otp: env_flag("ONBOARD_SHOW_OTP")?,
                auto_verify_delay: Duration::from_millis(env_parsed(
                    "ONBOARD_AUTO_VERIFY_DELAY_MS",
                    1000,
                )?),
            },
        })
    }
}

/// Where and how to reach the wizard's backend API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for all API calls, e.g. `http://localhost:3000/api`.
    pub base_url: String,
    /// Log every API response body at debug level.
    pub log_responses: bool,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            log_responses: false,
        }
    }
}

/// Media upload settings.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Target folder the backend signs uploads for.
    pub folder: String,
    /// How long a finished slot's progress entry lingers before removal.
    pub cleanup_delay: Duration,
}

impl UploadConfig {
    pub const DEFAULT_FOLDER: &str = "ads";
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            folder: Self::DEFAULT_FOLDER.to_string(),
            cleanup_delay: Duration::from_secs(2),
        }
    }
}

/// Development affordances. All off by default; never enable in production.
#[derive(Debug, Clone)]
pub struct DevConfig {
    /// Auto-fill the OTP input from the server response and submit it
    /// automatically after `auto_verify_delay`.
    pub auto_verify_otp: bool,
    /// Print the server-supplied OTP for the operator.
    pub show_otp: bool,
    /// Delay before the automatic OTP verification fires.
    pub auto_verify_delay: Duration,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            auto_verify_otp: false,
            show_otp: false,
            auto_verify_delay: Duration::from_millis(1000),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(false),
        Ok(v) => match v.as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" | "" => Ok(false),
            other => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected a boolean, got {other:?}"),
            }),
        },
    }
}

fn env_parsed(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected an integer, got {v:?}"),
        }),
    }
}
