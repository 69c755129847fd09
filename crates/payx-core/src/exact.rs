//! # Exact EVM Scheme
//!
//! Body of an x402 `exact` payment on an EVM network: an EIP-3009
//! `transferWithAuthorization` signed over the token contract's EIP-712
//! domain. Typing and hashing come from alloy.
//!
//! ```text
//! PaymentRequirements ──▶ ExactEvmAuthorization ──▶ eip712 digest ──▶ signature
//!        │                                               ▲
//!        └── token_domain (name, version, chain, asset) ─┘
//! ```

use crate::error::{PaywallError, PaywallResult};
use crate::network::Network;
use crate::protocol::{PaymentPayload, PaymentRequirements, EXACT_SCHEME, X402_VERSION};
use alloy_primitives::{Address, Signature, B256, U256};
use alloy_sol_types::{sol, Eip712Domain, SolStruct};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Clock skew allowance applied to `validAfter`
pub const VALID_AFTER_SKEW_SECONDS: u64 = 600;

sol! {
    /// EIP-3009 authorization as typed for EIP-712
    struct TransferWithAuthorization {
        address from;
        address to;
        uint256 value;
        uint256 validAfter;
        uint256 validBefore;
        bytes32 nonce;
    }
}

/// Authorization fields as they travel in `X-PAYMENT`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactEvmAuthorization {
    pub from: Address,
    pub to: Address,
    /// Atomic units, as a decimal string
    pub value: String,
    /// Unix seconds, as a decimal string
    pub valid_after: String,
    /// Unix seconds, as a decimal string
    pub valid_before: String,
    pub nonce: B256,
}

impl ExactEvmAuthorization {
    /// Authorize `from` to pay exactly what `requirements` ask, starting at `now`.
    pub fn for_requirements(
        from: Address,
        requirements: &PaymentRequirements,
        now: u64,
        nonce: B256,
    ) -> PaywallResult<Self> {
        let to = requirements.pay_to.parse::<Address>().map_err(|e| {
            PaywallError::InvalidRequest(format!(
                "payTo is not an address ({}): {}",
                requirements.pay_to, e
            ))
        })?;

        Ok(Self {
            from,
            to,
            value: requirements.amount()?.to_string(),
            valid_after: now.saturating_sub(VALID_AFTER_SKEW_SECONDS).to_string(),
            valid_before: (now + requirements.max_timeout_seconds).to_string(),
            nonce,
        })
    }

    /// EIP-712 digest the payer signs
    pub fn signing_hash(&self, domain: &Eip712Domain) -> PaywallResult<B256> {
        let typed = TransferWithAuthorization {
            from: self.from,
            to: self.to,
            value: parse_uint("value", &self.value)?,
            validAfter: parse_uint("validAfter", &self.valid_after)?,
            validBefore: parse_uint("validBefore", &self.valid_before)?,
            nonce: self.nonce,
        };
        Ok(typed.eip712_signing_hash(domain))
    }
}

fn parse_uint(field: &str, value: &str) -> PaywallResult<U256> {
    U256::from_str_radix(value, 10).map_err(|e| {
        PaywallError::InvalidPaymentHeader(format!(
            "{} is not a decimal integer ({}): {}",
            field, value, e
        ))
    })
}

/// Signed `exact` payment on an EVM network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactEvmPayload {
    /// 65-byte signature, 0x-prefixed hex
    pub signature: String,
    pub authorization: ExactEvmAuthorization,
}

impl ExactEvmPayload {
    /// Address whose key produced `signature` over this authorization
    pub fn recover_signer(&self, domain: &Eip712Domain) -> PaywallResult<Address> {
        let signature = self.signature.parse::<Signature>().map_err(|e| {
            PaywallError::InvalidPaymentHeader(format!("signature is not 65 hex bytes: {}", e))
        })?;
        let hash = self.authorization.signing_hash(domain)?;
        signature
            .recover_address_from_prehash(&hash)
            .map_err(|e| PaywallError::InvalidPaymentHeader(format!("unrecoverable signature: {}", e)))
    }
}

/// EIP-712 domain of the token `requirements` charge in.
///
/// `extra.name` and `extra.version` win over the network's USDC defaults.
pub fn token_domain(requirements: &PaymentRequirements) -> PaywallResult<Eip712Domain> {
    let (default_name, default_version) = requirements.network.usdc_eip712_domain();
    let extra = |key: &str| {
        requirements
            .extra
            .as_ref()
            .and_then(|extra| extra.get(key))
            .and_then(|value| value.as_str())
            .map(String::from)
    };

    let asset = requirements.asset.parse::<Address>().map_err(|e| {
        PaywallError::InvalidRequest(format!(
            "asset is not an address ({}): {}",
            requirements.asset, e
        ))
    })?;

    Ok(Eip712Domain::new(
        Some(Cow::Owned(extra("name").unwrap_or_else(|| default_name.to_string()))),
        Some(Cow::Owned(
            extra("version").unwrap_or_else(|| default_version.to_string()),
        )),
        Some(U256::from(requirements.network.chain_id())),
        Some(asset),
        None,
    ))
}

impl PaymentPayload {
    /// Wrap a signed EVM authorization for `X-PAYMENT`
    pub fn exact_evm(network: Network, payload: &ExactEvmPayload) -> PaywallResult<Self> {
        Ok(Self {
            x402_version: X402_VERSION,
            scheme: EXACT_SCHEME.to_string(),
            network,
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Typed view of an `exact` EVM body
    pub fn as_exact_evm(&self) -> PaywallResult<ExactEvmPayload> {
        if self.scheme != EXACT_SCHEME {
            return Err(PaywallError::InvalidPaymentHeader(format!(
                "scheme {} is not {}",
                self.scheme, EXACT_SCHEME
            )));
        }
        serde_json::from_value(self.payload.clone()).map_err(|e| {
            PaywallError::InvalidPaymentHeader(format!("not an exact EVM payload: {}", e))
        })
    }
}
