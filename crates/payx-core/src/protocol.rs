//! # x402 Wire Types
//!
//! x402 version 1 messages exchanged between client, paywall and facilitator.
//!
//! ```text
//! client ── GET /payment/5usdc ─────────────────────▶ paywall
//! client ◀─ 402 PaymentRequired { accepts: [..] } ──── paywall
//! client ── GET + X-PAYMENT: base64(PaymentPayload) ▶ paywall ── /verify ─▶ facilitator
//!                                                        paywall ── /settle ─▶ facilitator
//! client ◀─ 200 + X-PAYMENT-RESPONSE: base64(SettleResponse)
//! ```

use crate::error::{PaywallError, PaywallResult};
use crate::network::Network;
use crate::tier::PaymentTier;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Protocol version spoken by this crate
pub const X402_VERSION: u8 = 1;

/// Request header carrying the signed payment
pub const PAYMENT_HEADER: &str = "X-PAYMENT";

/// Response header carrying the settlement result
pub const PAYMENT_RESPONSE_HEADER: &str = "X-PAYMENT-RESPONSE";

/// Legacy response header some deployments use for the transaction hash
pub const TRANSACTION_HASH_HEADER: &str = "X-TRANSACTION-HASH";

/// The only scheme the paywall offers
pub const EXACT_SCHEME: &str = "exact";

/// Error text returned when a gated request carries no payment
pub const MISSING_PAYMENT_ERROR: &str = "X-PAYMENT header is required";

/// Error text returned when a payment names another scheme or network
pub const NO_MATCHING_REQUIREMENTS_ERROR: &str = "Unable to find matching payment requirements";

/// Default authorization window granted to the payer
pub const DEFAULT_MAX_TIMEOUT_SECONDS: u64 = 60;

/// What the paywall accepts for one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: String,
    pub network: Network,
    /// Amount in atomic units, as a decimal string
    pub max_amount_required: String,
    pub resource: String,
    pub description: String,
    pub mime_type: String,
    pub pay_to: String,
    pub max_timeout_seconds: u64,
    /// Token contract address
    pub asset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
}

impl PaymentRequirements {
    /// Requirements for `tier`, served at `resource` and paid to `pay_to`
    pub fn exact_for_tier(
        tier: &PaymentTier,
        network: Network,
        resource: impl Into<String>,
        pay_to: impl Into<String>,
    ) -> Self {
        let (name, version) = network.usdc_eip712_domain();
        Self {
            scheme: EXACT_SCHEME.to_string(),
            network,
            max_amount_required: tier.price.atomic().to_string(),
            resource: resource.into(),
            description: tier.description(),
            mime_type: "application/json".to_string(),
            pay_to: pay_to.into(),
            max_timeout_seconds: DEFAULT_MAX_TIMEOUT_SECONDS,
            asset: network.usdc_address().to_string(),
            output_schema: None,
            extra: Some(serde_json::json!({ "name": name, "version": version })),
        }
    }

    /// Parsed `max_amount_required`
    pub fn amount(&self) -> PaywallResult<u64> {
        self.max_amount_required.parse().map_err(|_| {
            PaywallError::InvalidRequest(format!(
                "maxAmountRequired is not an integer: {}",
                self.max_amount_required
            ))
        })
    }
}

/// Body of a 402 response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    pub x402_version: u8,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub accepts: Vec<PaymentRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

impl PaymentRequired {
    pub fn new(error: impl Into<String>, accepts: Vec<PaymentRequirements>) -> Self {
        Self {
            x402_version: X402_VERSION,
            error: error.into(),
            accepts,
            payer: None,
        }
    }

    pub fn with_payer(mut self, payer: Option<String>) -> Self {
        self.payer = payer;
        self
    }

    /// First requirement using the exact scheme
    pub fn exact_requirement(&self) -> Option<&PaymentRequirements> {
        self.accepts.iter().find(|r| r.scheme == EXACT_SCHEME)
    }
}

/// Signed payment sent by the client in `X-PAYMENT`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub x402_version: u8,
    pub scheme: String,
    pub network: Network,
    /// Scheme-specific body (signature and authorization for `exact`)
    pub payload: serde_json::Value,
}

impl PaymentPayload {
    /// Decode from an `X-PAYMENT` header value
    pub fn from_header(value: &str) -> PaywallResult<Self> {
        decode_header(value)
    }

    /// Encode as an `X-PAYMENT` header value
    pub fn to_header(&self) -> PaywallResult<String> {
        encode_header(self)
    }

    /// Payer address claimed by an `exact` authorization, if present
    pub fn payer(&self) -> Option<&str> {
        self.payload
            .get("authorization")
            .and_then(|a| a.get("from"))
            .and_then(|v| v.as_str())
    }

    /// Whether this payment answers `requirements` (same scheme and network)
    pub fn matches(&self, requirements: &PaymentRequirements) -> bool {
        self.scheme == requirements.scheme && self.network == requirements.network
    }
}

/// Request body for the facilitator's `/verify` and `/settle`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilitatorRequest<'a> {
    pub x402_version: u8,
    pub payment_payload: &'a PaymentPayload,
    pub payment_requirements: &'a PaymentRequirements,
}

impl<'a> FacilitatorRequest<'a> {
    pub fn new(
        payment_payload: &'a PaymentPayload,
        payment_requirements: &'a PaymentRequirements,
    ) -> Self {
        Self {
            x402_version: payment_payload.x402_version,
            payment_payload,
            payment_requirements,
        }
    }
}

/// Response from the facilitator's `/verify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

impl VerifyResponse {
    /// `VerificationFailed` unless the facilitator accepted the payment
    pub fn ensure_valid(self) -> PaywallResult<Self> {
        if self.is_valid {
            return Ok(self);
        }
        Err(PaywallError::VerificationFailed {
            reason: self
                .invalid_reason
                .unwrap_or_else(|| "Payment verification failed".to_string()),
            payer: self.payer,
        })
    }
}

/// Response from the facilitator's `/settle`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettleResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
    /// Transaction hash, if settlement succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    pub network: String,
}

impl SettleResponse {
    /// `SettlementFailed` unless the transfer went through
    pub fn ensure_success(self) -> PaywallResult<Self> {
        if self.success {
            return Ok(self);
        }
        Err(PaywallError::SettlementFailed {
            reason: self
                .error_reason
                .unwrap_or_else(|| "Payment settlement failed".to_string()),
            payer: self.payer,
        })
    }

    /// Decode from an `X-PAYMENT-RESPONSE` header value
    pub fn from_header(value: &str) -> PaywallResult<Self> {
        decode_header(value)
    }

    /// Encode as an `X-PAYMENT-RESPONSE` header value
    pub fn to_header(&self) -> PaywallResult<String> {
        encode_header(self)
    }
}

/// One scheme/network pair a facilitator can handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedKind {
    pub x402_version: u8,
    pub scheme: String,
    pub network: String,
}

/// Response from the facilitator's `/supported`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportedResponse {
    #[serde(default)]
    pub kinds: Vec<SupportedKind>,
}

impl SupportedResponse {
    pub fn supports(&self, scheme: &str, network: Network) -> bool {
        self.kinds
            .iter()
            .any(|k| k.scheme == scheme && k.network == network.as_str())
    }
}

fn encode_header<T: Serialize>(value: &T) -> PaywallResult<String> {
    let json = serde_json::to_vec(value)?;
    Ok(STANDARD.encode(json))
}

fn decode_header<T: DeserializeOwned>(value: &str) -> PaywallResult<T> {
    let bytes = STANDARD
        .decode(value.trim())
        .map_err(|e| PaywallError::InvalidPaymentHeader(format!("not base64: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| PaywallError::InvalidPaymentHeader(format!("not a payment object: {}", e)))
}
