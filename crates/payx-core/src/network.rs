//! # Networks
//!
//! EVM networks the paywall can charge on, with the USDC deployment
//! (contract address and EIP-712 domain) for each.

use crate::error::PaywallError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// USDC uses six decimal places on every supported network
pub const USDC_DECIMALS: u32 = 6;

/// Supported x402 networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    Base,
    BaseSepolia,
    Avalanche,
    AvalancheFuji,
}

impl Network {
    /// Returns the x402 network identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Base => "base",
            Network::BaseSepolia => "base-sepolia",
            Network::Avalanche => "avalanche",
            Network::AvalancheFuji => "avalanche-fuji",
        }
    }

    /// USDC contract address on this network
    pub fn usdc_address(&self) -> &'static str {
        match self {
            Network::Base => "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
            Network::BaseSepolia => "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
            Network::Avalanche => "0xB97EF9Ef8734C71904D8002F8b6Bc66Dd9c48a6E",
            Network::AvalancheFuji => "0x5425890298aed601595a70AB815c96711a31Bc65",
        }
    }

    /// EIP-712 domain `(name, version)` of the USDC contract.
    /// Wallets need it to sign `transferWithAuthorization`.
    pub fn usdc_eip712_domain(&self) -> (&'static str, &'static str) {
        match self {
            Network::BaseSepolia => ("USDC", "2"),
            _ => ("USD Coin", "2"),
        }
    }

    /// EIP-155 chain id
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Base => 8453,
            Network::BaseSepolia => 84532,
            Network::Avalanche => 43114,
            Network::AvalancheFuji => 43113,
        }
    }

    /// All supported networks
    pub fn all() -> &'static [Network] {
        &[
            Network::Base,
            Network::BaseSepolia,
            Network::Avalanche,
            Network::AvalancheFuji,
        ]
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = PaywallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::all()
            .iter()
            .copied()
            .find(|n| n.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| PaywallError::UnsupportedNetwork {
                network: s.to_string(),
            })
    }
}
