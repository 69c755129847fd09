//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the payment verifier, configuration, tier catalog and manifest.

use payx_core::{
    BoxedPaymentVerifier, MiniAppManifest, Network, PaymentRequirements, PaymentTier,
    PaywallError, PaywallResult, TierCatalog,
};
use payx_facilitator::FacilitatorConfig;
use std::path::PathBuf;
use std::sync::Arc;

/// Merchant address used when `ADDRESS` is unset
pub const DEFAULT_PAY_TO: &str = "0xda8d766bc482a7953b72283f56c12ce00da6a86a";

/// Name shown on the landing page and in the manifest
pub const APP_NAME: &str = "PAYx402";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL; resource URLs in payment requirements start with it
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Merchant address receiving USDC (`ADDRESS`)
    pub pay_to: String,
    /// Network tiers charge on unless they pin one (`NETWORK`)
    pub network: Network,
    /// Facilitator endpoint and credentials
    pub facilitator: FacilitatorConfig,
    /// RPC endpoint for the wallet front-end (`BASE_RPC_URL`)
    pub base_rpc_url: Option<String>,
    /// Running on Vercel (`VERCEL=1`)
    pub is_vercel: bool,
    /// Directory holding the logo
    pub public_dir: PathBuf,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> PaywallResult<Self> {
        dotenvy::dotenv().ok();

        let facilitator = FacilitatorConfig::from_env()?;
        Self::from_lookup(|key| std::env::var(key).ok(), facilitator)
    }

    /// Build from any key/value source
    pub fn from_lookup<F>(lookup: F, facilitator: FacilitatorConfig) -> PaywallResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                PaywallError::Configuration(format!("PORT must be a port number, got {:?}", raw))
            })?,
            None => 3001,
        };

        let network = match var("NETWORK") {
            Some(raw) => raw.parse::<Network>()?,
            None => Network::BaseSepolia,
        };

        let pay_to = var("ADDRESS").unwrap_or_else(|| DEFAULT_PAY_TO.to_string());
        if !is_evm_address(&pay_to) {
            return Err(PaywallError::Configuration(format!(
                "ADDRESS must be a 0x-prefixed 20-byte hex address, got {:?}",
                pay_to
            )));
        }

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            base_url: var("BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}", port))
                .trim_end_matches('/')
                .to_string(),
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            pay_to,
            network,
            facilitator,
            base_rpc_url: var("BASE_RPC_URL"),
            is_vercel: var("VERCEL").as_deref() == Some("1"),
            public_dir: var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> PaywallResult<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port).parse().map_err(|_| {
            PaywallError::Configuration(format!(
                "Invalid socket address: {}:{}",
                self.host, self.port
            ))
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn is_evm_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .map(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Verifies and settles payments
    pub verifier: BoxedPaymentVerifier,
    /// Gated tiers
    pub catalog: Arc<TierCatalog>,
    /// Farcaster manifest
    pub manifest: Arc<MiniAppManifest>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Assemble state from loaded parts
    pub fn new(
        config: AppConfig,
        catalog: TierCatalog,
        manifest: MiniAppManifest,
        verifier: BoxedPaymentVerifier,
    ) -> Self {
        Self {
            verifier,
            catalog: Arc::new(catalog),
            manifest: Arc::new(manifest),
            config,
        }
    }

    /// Payment requirements for `tier` at this deployment
    pub fn requirements_for(&self, tier: &PaymentTier) -> PaymentRequirements {
        PaymentRequirements::exact_for_tier(
            tier,
            tier.network_or(self.config.network),
            format!("{}{}", self.config.base_url, tier.route()),
            &self.config.pay_to,
        )
    }
}

const CONFIG_DIRS: [&str; 3] = ["config", "../config", "../../config"];

/// Load the tier catalog from `config/tiers.toml`, or the built-in tiers
pub fn load_tier_catalog() -> anyhow::Result<TierCatalog> {
    for dir in CONFIG_DIRS {
        let path = format!("{}/tiers.toml", dir);
        if let Ok(content) = std::fs::read_to_string(&path) {
            let catalog = TierCatalog::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            catalog
                .validate()
                .map_err(|e| anyhow::anyhow!("Invalid tiers in {}: {}", path, e))?;
            tracing::info!("Loaded {} tiers from {}", catalog.tiers.len(), path);
            return Ok(catalog);
        }
    }

    tracing::warn!("No tier catalog found, using built-in tiers");
    Ok(TierCatalog::builtin())
}

/// Load the manifest from `config/farcaster.json`, or derive one from the base URL
pub fn load_manifest(base_url: &str) -> anyhow::Result<MiniAppManifest> {
    for dir in CONFIG_DIRS {
        let path = format!("{}/farcaster.json", dir);
        if let Ok(content) = std::fs::read_to_string(&path) {
            let manifest = MiniAppManifest::from_json(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded Mini App manifest from {}", path);
            return Ok(manifest);
        }
    }

    tracing::warn!("No Mini App manifest found, serving an unassociated default");
    Ok(MiniAppManifest::new(APP_NAME, base_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> PaywallResult<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned(), FacilitatorConfig::default())
    }

    #[test]
    fn test_app_config_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3001);
        assert_eq!(config.base_url, "http://localhost:3001");
        assert_eq!(config.pay_to, DEFAULT_PAY_TO);
        assert_eq!(config.network, Network::BaseSepolia);
        assert!(!config.is_vercel);
        assert!(config.base_rpc_url.is_none());
    }

    #[test]
    fn test_app_config_overrides() {
        let config = config_from(&[
            ("PORT", "3002"),
            ("NETWORK", "base"),
            ("BASE_URL", "https://payx.example/"),
            ("VERCEL", "1"),
            ("BASE_RPC_URL", "https://mainnet.base.org"),
        ])
        .unwrap();
        assert_eq!(config.port, 3002);
        assert_eq!(config.network, Network::Base);
        assert_eq!(config.base_url, "https://payx.example");
        assert!(config.is_vercel);
        assert!(config.base_rpc_url.is_some());
    }

    #[test]
    fn test_app_config_rejects_bad_values() {
        assert!(config_from(&[("NETWORK", "solana")]).is_err());
        assert!(config_from(&[("PORT", "http")]).is_err());
        assert!(config_from(&[("ADDRESS", "0x1234")]).is_err());
    }

    #[test]
    fn test_socket_addr() {
        let mut config = config_from(&[]).unwrap();
        config.host = "0.0.0.0".to_string();
        config.port = 3000;

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }
}
