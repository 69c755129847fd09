//! # Facilitator Configuration
//!
//! Where the facilitator lives and how long to wait for it.
//! Values are loaded from environment variables.

use payx_core::PaywallError;
use std::env;
use std::time::Duration;

/// Public facilitator used when `FACILITATOR_URL` is unset
pub const DEFAULT_FACILITATOR_URL: &str = "https://x402.org/facilitator";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Facilitator API configuration
#[derive(Debug, Clone)]
pub struct FacilitatorConfig {
    /// Base URL, without trailing slash
    pub url: String,

    /// Transport timeout for each call
    pub timeout: Duration,
}

impl FacilitatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `FACILITATOR_URL` (default `https://x402.org/facilitator`)
    /// - `FACILITATOR_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> Result<Self, PaywallError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let url = env::var("FACILITATOR_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FACILITATOR_URL.to_string());

        let timeout = match env::var("FACILITATOR_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map(Duration::from_secs).map_err(|_| {
                PaywallError::Configuration(format!(
                    "FACILITATOR_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                    raw
                ))
            })?,
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let config = Self {
            url: String::new(),
            timeout,
        }
        .with_url(url);

        config.validate()?;
        Ok(config)
    }

    /// Create config for an explicit URL (for testing)
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
        .with_url(url)
    }

    /// Builder: set the facilitator URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    /// Full URL of a facilitator endpoint (`verify`, `settle`, `supported`)
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.url, name)
    }

    fn validate(&self) -> Result<(), PaywallError> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(PaywallError::Configuration(format!(
                "FACILITATOR_URL must be an http(s) URL, got {:?}",
                self.url
            )));
        }
        Ok(())
    }
}

impl Default for FacilitatorConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FACILITATOR_URL)
    }
}
