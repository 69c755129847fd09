//! # Collaborator Traits
//!
//! The two seams where real payment work happens outside this workspace.
//!
//! ```text
//! ┌──────────────────────────────┐        ┌──────────────────────────────┐
//! │  PaymentVerifier (server)    │        │  WalletSigner (client)       │
//! │  ├── verify()                │        │  ├── address()               │
//! │  ├── settle()                │        │  ├── is_ready()              │
//! │  └── provider_name()         │        │  └── sign()                  │
//! └──────────────────────────────┘        └──────────────────────────────┘
//!                ▲                                        ▲
//!      ┌─────────┴─────────┐                    wallet SDK / local key
//!      │ FacilitatorClient │
//!      └───────────────────┘
//! ```

use crate::error::PaywallResult;
use crate::protocol::{PaymentPayload, PaymentRequirements, SettleResponse, VerifyResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Verifies and settles payments on behalf of the paywall.
///
/// An invalid payment is a successful call returning
/// `VerifyResponse { is_valid: false, .. }`. `Err` is reserved for failures
/// to reach or understand the verifier.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    /// Check a signed payment against the requirements.
    async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> PaywallResult<VerifyResponse>;

    /// Execute a verified payment on chain.
    async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> PaywallResult<SettleResponse>;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared verifier (dynamic dispatch)
pub type BoxedPaymentVerifier = Arc<dyn PaymentVerifier>;

/// Produces signed payments from a wallet.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Connected account, if any
    fn address(&self) -> Option<String>;

    /// Whether the wallet can sign right now.
    /// An embedded host may report an address before its signing bridge is up.
    fn is_ready(&self) -> bool {
        self.address().is_some()
    }

    /// Sign a payment satisfying `requirements`.
    async fn sign(&self, requirements: &PaymentRequirements) -> PaywallResult<PaymentPayload>;
}

/// Type alias for a shared signer
pub type BoxedWalletSigner = Arc<dyn WalletSigner>;
