//! # Payment Client
//!
//! Pays for a tier endpoint with the x402 challenge/response round:
//!
//! 1. `GET endpoint`; anything but a 402 is classified as-is
//! 2. Pick the `exact` requirement from the 402 and check it against the cap
//! 3. Sign with the wallet and resend with `X-PAYMENT`
//! 4. Classify the final reply and pick up the settlement receipt

use crate::attempt::{AttemptTracker, PaymentAttempt};
use crate::config::ClientConfig;
use crate::signer::LocalWalletSigner;
use crate::wallet::check_wallet;
use payx_core::{
    classify_response, protocol::TRANSACTION_HASH_HEADER, BoxedWalletSigner, ClientEnvironment,
    FailureKind, PaymentFailure, PaymentRequired, PaymentRequirements, PaywallError,
    PaywallResult, SettleResponse, WalletSigner, PAYMENT_HEADER, PAYMENT_RESPONSE_HEADER,
};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// A paid (or free) endpoint's successful reply
#[derive(Debug, Clone, PartialEq)]
pub struct PaidResponse {
    /// Parsed JSON body, unchanged
    pub body: Value,
    /// Settlement transaction, when the server reported one
    pub transaction_hash: Option<String>,
    /// Decoded `X-PAYMENT-RESPONSE`
    pub settlement: Option<SettleResponse>,
}

/// x402 client for PAYx402 tier endpoints
pub struct PaymentClient {
    config: ClientConfig,
    http: Client,
    signer: Option<BoxedWalletSigner>,
    attempts: AttemptTracker,
}

impl PaymentClient {
    /// Create a new client without a wallet.
    ///
    /// Requests carry no timeout: a payment waits as long as the wallet and
    /// the paywall take to answer.
    pub fn new(config: ClientConfig) -> PaywallResult<Self> {
        let http = Client::builder().build().map_err(|e| {
            PaywallError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            config,
            http,
            signer: None,
            attempts: AttemptTracker::new(),
        })
    }

    /// Create from environment variables, signing with `PAYX_PRIVATE_KEY` when set
    pub fn from_env() -> PaywallResult<Self> {
        let client = Self::new(ClientConfig::from_env()?)?;
        Ok(match LocalWalletSigner::from_env()? {
            Some(wallet) => {
                info!("Signing payments as {:?}", wallet.address());
                client.with_signer(Arc::new(wallet))
            }
            None => client,
        })
    }

    /// Attach the wallet used to sign payments
    pub fn with_signer(mut self, signer: BoxedWalletSigner) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn environment(&self) -> ClientEnvironment {
        self.config.environment
    }

    /// Wallet attached and able to sign
    pub fn is_connected(&self) -> bool {
        self.signer.as_ref().map(|s| s.is_ready()).unwrap_or(false)
    }

    /// Watch the attempt state
    pub fn subscribe(&self) -> watch::Receiver<PaymentAttempt> {
        self.attempts.subscribe()
    }

    /// Current attempt state
    pub fn attempt(&self) -> PaymentAttempt {
        self.attempts.current()
    }

    /// Pay for `endpoint` and return its confirmation.
    ///
    /// Wallet problems fail before any request is sent.
    #[instrument(skip(self), fields(environment = %self.config.environment))]
    pub async fn make_payment(&self, endpoint: &str) -> Result<PaidResponse, PaymentFailure> {
        if let Err(failure) = check_wallet(self.config.environment, self.signer.as_deref()) {
            warn!("Wallet not ready: {}", failure);
            self.attempts.reject(endpoint, &failure.message);
            return Err(failure);
        }

        self.attempts.start(endpoint);
        let result = self.pay(endpoint).await;

        match &result {
            Ok(paid) => {
                info!(
                    "Payment for {} succeeded: tx={:?}",
                    endpoint, paid.transaction_hash
                );
                self.attempts.finish(None);
            }
            Err(failure) => {
                warn!("Payment for {} failed ({:?}): {}", endpoint, failure.kind, failure);
                self.attempts.finish(Some(&failure.message));
            }
        }

        result
    }

    async fn pay(&self, endpoint: &str) -> Result<PaidResponse, PaymentFailure> {
        let url = self.config.resolve(endpoint);
        let environment = self.config.environment;

        let challenge = Reply::fetch(self.http.get(&url)).await?;
        if challenge.status != 402 {
            return challenge.into_paid(environment);
        }

        let Some(requirements) = challenge.exact_requirement() else {
            debug!("402 without an exact requirement");
            return challenge.into_paid(environment);
        };
        self.check_amount(&requirements)?;

        let signer = self.signer.as_ref().ok_or_else(|| {
            PaymentFailure::new(FailureKind::Wallet, crate::wallet::NOT_CONNECTED_MESSAGE)
        })?;
        let header = signer
            .sign(&requirements)
            .await
            .and_then(|payload| payload.to_header())
            .map_err(|e| PaymentFailure::new(FailureKind::Wallet, e.to_string()))?;

        debug!(
            "Paying {} atomic units on {} to {}",
            requirements.max_amount_required, requirements.network, requirements.pay_to
        );

        Reply::fetch(self.http.get(&url).header(PAYMENT_HEADER, header))
            .await?
            .into_paid(environment)
    }

    fn check_amount(&self, requirements: &PaymentRequirements) -> Result<(), PaymentFailure> {
        let requested = requirements
            .amount()
            .map_err(|e| PaymentFailure::new(FailureKind::PaymentRequired, e.to_string()))?;

        if requested > self.config.max_amount {
            let err = PaywallError::AmountExceedsMaximum {
                requested,
                max: self.config.max_amount,
            };
            return Err(PaymentFailure::new(FailureKind::PaymentRequired, err.to_string()));
        }
        Ok(())
    }
}

/// A fully read HTTP reply
struct Reply {
    status: u16,
    content_type: Option<String>,
    settlement: Option<SettleResponse>,
    transaction_hash: Option<String>,
    body: Vec<u8>,
}

impl Reply {
    async fn fetch(request: RequestBuilder) -> Result<Self, PaymentFailure> {
        let response = request.send().await.map_err(PaymentFailure::network)?;

        let headers = response.headers();
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };

        let content_type = header(CONTENT_TYPE.as_str());
        let settlement = header(PAYMENT_RESPONSE_HEADER)
            .and_then(|value| SettleResponse::from_header(&value).ok());
        let transaction_hash = settlement
            .as_ref()
            .and_then(|s| s.transaction.clone())
            .or_else(|| header(TRANSACTION_HASH_HEADER));

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(PaymentFailure::network)?
            .to_vec();

        Ok(Self {
            status,
            content_type,
            settlement,
            transaction_hash,
            body,
        })
    }

    fn exact_requirement(&self) -> Option<PaymentRequirements> {
        serde_json::from_slice::<PaymentRequired>(&self.body)
            .ok()?
            .exact_requirement()
            .cloned()
    }

    fn into_paid(self, environment: ClientEnvironment) -> Result<PaidResponse, PaymentFailure> {
        let body = classify_response(
            self.status,
            self.content_type.as_deref(),
            &self.body,
            environment,
        )?;

        Ok(PaidResponse {
            body,
            transaction_hash: self.transaction_hash,
            settlement: self.settlement,
        })
    }
}
