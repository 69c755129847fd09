//! # payx-core
//!
//! Core types and traits for the PAYx402 paywall.
//!
//! This crate provides:
//! - `PaymentTier` and `TierCatalog` for the fixed-price routes
//! - `Network` with the USDC deployment per chain
//! - x402 wire types (`PaymentRequirements`, `PaymentPayload`, facilitator replies)
//! - The `exact` EVM payload (EIP-3009 authorization, EIP-712 domain) on alloy types
//! - `PaymentVerifier` and `WalletSigner` collaborator traits
//! - `classify_response` and `ClientEnvironment` for client-side payment outcomes
//! - `MiniAppManifest` for the Farcaster well-known document
//! - `PaywallError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use payx_core::{ClientEnvironment, Network, PaymentRequirements, TierCatalog, classify_response};
//!
//! let catalog = TierCatalog::builtin();
//! let tier = catalog.by_route("/payment/5usdc").unwrap();
//!
//! // What the paywall asks for
//! let req = PaymentRequirements::exact_for_tier(tier, Network::Base, "https://payx.example/payment/5usdc", pay_to);
//!
//! // What the client shows
//! let env = ClientEnvironment::detect(page_url, has_marker);
//! match classify_response(status, content_type, &body, env) {
//!     Ok(confirmation) => println!("{}", confirmation["message"]),
//!     Err(failure) => eprintln!("Payment failed: {}", failure),
//! }
//! ```

pub mod classify;
pub mod confirmation;
pub mod environment;
pub mod error;
pub mod exact;
pub mod manifest;
pub mod network;
pub mod protocol;
pub mod tier;
pub mod verifier;

// Re-exports for convenience
pub use classify::{classify_response, FailureKind, PaymentFailure, PaymentOutcome};
pub use confirmation::{PaymentConfirmation, PaymentSummary};
pub use environment::ClientEnvironment;
pub use error::{PaywallError, PaywallResult};
pub use exact::{token_domain, ExactEvmAuthorization, ExactEvmPayload};
pub use manifest::{AccountAssociation, FrameMetadata, MiniAppManifest};
pub use network::Network;
pub use protocol::{
    FacilitatorRequest, PaymentPayload, PaymentRequired, PaymentRequirements, SettleResponse,
    SupportedKind, SupportedResponse, VerifyResponse, PAYMENT_HEADER, PAYMENT_RESPONSE_HEADER,
    X402_VERSION,
};
pub use tier::{PaymentTier, Price, TierCatalog, TOKENS_PER_USDC};
pub use verifier::{BoxedPaymentVerifier, BoxedWalletSigner, PaymentVerifier, WalletSigner};
