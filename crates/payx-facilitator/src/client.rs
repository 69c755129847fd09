//! # Facilitator Client
//!
//! HTTP implementation of `PaymentVerifier` against an x402 facilitator.
//! Verification and settlement both happen on the facilitator's side.

use crate::config::FacilitatorConfig;
use async_trait::async_trait;
use payx_core::{
    protocol::EXACT_SCHEME, FacilitatorRequest, Network, PaymentPayload, PaymentRequirements,
    PaymentVerifier, PaywallError, PaywallResult, SettleResponse, SupportedResponse,
    VerifyResponse,
};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

const PROVIDER: &str = "facilitator";

/// Talks to a remote x402 facilitator
pub struct FacilitatorClient {
    config: FacilitatorConfig,
    client: Client,
}

impl FacilitatorClient {
    /// Create a new facilitator client
    pub fn new(config: FacilitatorConfig) -> PaywallResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PaywallError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaywallResult<Self> {
        let config = FacilitatorConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &FacilitatorConfig {
        &self.config
    }

    /// Ask the facilitator which scheme/network pairs it handles.
    #[instrument(skip(self), fields(url = %self.config.url))]
    pub async fn supported(&self) -> PaywallResult<SupportedResponse> {
        let response = self
            .client
            .get(self.config.endpoint("supported"))
            .send()
            .await
            .map_err(|e| PaywallError::NetworkError(e.to_string()))?;

        read_reply(response).await
    }

    /// Fail unless the facilitator lists exact payments on `network`.
    ///
    /// Transport and provider errors pass through unchanged so the caller can
    /// tell an unreachable facilitator from an unsupported network.
    pub async fn ensure_supported(&self, network: Network) -> PaywallResult<()> {
        let supported = self.supported().await?;
        if supported.supports(EXACT_SCHEME, network) {
            return Ok(());
        }

        let offered: Vec<&str> = supported
            .kinds
            .iter()
            .filter(|k| k.scheme == EXACT_SCHEME)
            .map(|k| k.network.as_str())
            .collect();
        Err(PaywallError::UnsupportedNetwork {
            network: format!(
                "{} is not offered by {} (offers: {})",
                network,
                self.config.url,
                offered.join(", ")
            ),
        })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> PaywallResult<R> {
        let url = self.config.endpoint(endpoint);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("Facilitator unreachable: {}", e);
                PaywallError::NetworkError(e.to_string())
            })?;

        read_reply(response).await
    }
}

async fn read_reply<R: DeserializeOwned>(response: reqwest::Response) -> PaywallResult<R> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| PaywallError::NetworkError(e.to_string()))?;

    if !status.is_success() {
        error!("Facilitator error: status={}, body={}", status, body);

        if let Ok(error_response) = serde_json::from_str::<FacilitatorErrorResponse>(&body) {
            if let Some(message) = error_response.message() {
                return Err(PaywallError::ProviderError {
                    provider: PROVIDER.to_string(),
                    message,
                });
            }
        }

        return Err(PaywallError::ProviderError {
            provider: PROVIDER.to_string(),
            message: format!("HTTP {}: {}", status, body),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        PaywallError::Serialization(format!("Failed to parse facilitator response: {}", e))
    })
}

#[async_trait]
impl PaymentVerifier for FacilitatorClient {
    #[instrument(skip(self, payload, requirements), fields(resource = %requirements.resource))]
    async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> PaywallResult<VerifyResponse> {
        let reply: VerifyResponse = self
            .post("verify", &FacilitatorRequest::new(payload, requirements))
            .await?;

        if reply.is_valid {
            debug!("Payment verified: payer={:?}", reply.payer);
        } else {
            warn!(
                "Payment rejected: reason={:?}, payer={:?}",
                reply.invalid_reason, reply.payer
            );
        }
        Ok(reply)
    }

    #[instrument(skip(self, payload, requirements), fields(resource = %requirements.resource))]
    async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> PaywallResult<SettleResponse> {
        let reply: SettleResponse = self
            .post("settle", &FacilitatorRequest::new(payload, requirements))
            .await?;

        if reply.success {
            info!(
                "Payment settled: tx={:?}, network={}",
                reply.transaction, reply.network
            );
        } else {
            warn!("Settlement failed: reason={:?}", reply.error_reason);
        }
        Ok(reply)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Facilitator API Types
// =============================================================================

/// Error bodies vary between facilitator deployments
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacilitatorErrorResponse {
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    invalid_reason: Option<String>,
    #[serde(default)]
    error_reason: Option<String>,
}

impl FacilitatorErrorResponse {
    fn message(self) -> Option<String> {
        let error = self.error.and_then(|e| match e {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => other
                .get("message")
                .and_then(|m| m.as_str())
                .map(String::from)
                .or_else(|| Some(other.to_string())),
        });
        error.or(self.invalid_reason).or(self.error_reason)
    }
}
