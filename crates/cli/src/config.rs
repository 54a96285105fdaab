//! Runtime configuration, assembled once at startup.
//!
//! Everything the components need is collected into an explicit [`Config`]
//! value in `main` and handed down; nothing reads process-global state after
//! that point.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, TetherError};

/// Broker endpoint used when `TETHER_BROKER_URL` is not set. The path prefix
/// is part of the base URL; operation paths are appended to it.
pub const DEFAULT_BROKER_URL: &str = "https://device-central.example.com/api";

/// Default number of registration attempts.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 5;

/// Fixed wait between registration attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);

/// Registration retry behavior: bounded attempts with a fixed inter-attempt
/// delay. Only the registration path retries; every other broker call is
/// fire-once.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RETRY_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the broker API, without a trailing slash.
    pub broker_url: String,
    /// Bearer credential attached to every broker request. Never blank.
    pub token: String,
    pub retry: RetryPolicy,
    /// Path to the adb public key sent with registration.
    pub adb_key_path: PathBuf,
}

impl Config {
    /// Reads configuration from the environment. Fails fast with
    /// [`TetherError::MissingCredential`] when the token is absent or blank.
    pub fn from_env() -> Result<Self> {
        let token = validate_token(std::env::var("TETHER_TOKEN").ok())?;

        let broker_url = std::env::var("TETHER_BROKER_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BROKER_URL.to_string());

        let adb_key_path = std::env::var_os("TETHER_ADB_KEY")
            .map(PathBuf::from)
            .unwrap_or_else(default_adb_key_path);

        Ok(Self {
            broker_url: broker_url.trim_end_matches('/').to_string(),
            token,
            retry: RetryPolicy::default(),
            adb_key_path,
        })
    }
}

fn validate_token(raw: Option<String>) -> Result<String> {
    let token = raw.unwrap_or_default();
    let token = token.trim();
    if token.is_empty() {
        return Err(TetherError::MissingCredential);
    }
    Ok(token.to_string())
}

fn default_adb_key_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".android")
        .join("adbkey.pub")
}
