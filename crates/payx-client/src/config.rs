//! # Client Configuration
//!
//! Configuration for the payment client.

use payx_core::{ClientEnvironment, PaywallError, PaywallResult};

/// Largest payment the client signs without asking: 100 USDC in atomic units
pub const DEFAULT_MAX_PAYMENT: u64 = 100_000_000;

/// Paywall used when `PAYX_BASE_URL` is unset
pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Payment client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Paywall base URL; relative endpoints are joined onto it
    pub base_url: String,
    /// Where the client runs
    pub environment: ClientEnvironment,
    /// Upper bound on `maxAmountRequired`, in atomic units
    pub max_amount: u64,
}

impl ClientConfig {
    /// Load from environment variables
    ///
    /// Reads:
    /// - `PAYX_BASE_URL` (defaults to the local paywall)
    /// - `PAYX_MAX_PAYMENT` (atomic USDC units)
    /// - `PAYX_EMBEDDED` (`1` when hosted inside a Mini App)
    pub fn from_env() -> PaywallResult<Self> {
        dotenvy::dotenv().ok();

        let base_url =
            std::env::var("PAYX_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let max_amount = match std::env::var("PAYX_MAX_PAYMENT") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                PaywallError::Configuration(format!(
                    "PAYX_MAX_PAYMENT must be atomic USDC units, got {:?}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_MAX_PAYMENT,
        };

        let embedded = std::env::var("PAYX_EMBEDDED").as_deref() == Ok("1");

        let config = Self::new(base_url).with_max_amount(max_amount);
        let environment = ClientEnvironment::detect(&config.base_url, embedded);
        Ok(config.with_environment(environment))
    }

    /// Create a config for `base_url`, detecting the environment from it
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            environment: ClientEnvironment::detect(&base_url, false),
            base_url,
            max_amount: DEFAULT_MAX_PAYMENT,
        }
    }

    pub fn with_environment(mut self, environment: ClientEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_max_amount(mut self, max_amount: u64) -> Self {
        self.max_amount = max_amount;
        self
    }

    /// Absolute URL for `endpoint`
    pub fn resolve(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
