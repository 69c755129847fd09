//! # Wallet Readiness
//!
//! Pre-flight checks run before any request is sent.

use payx_core::{ClientEnvironment, FailureKind, PaymentFailure, WalletSigner};

pub const CONNECT_IN_HOST_MESSAGE: &str = "Please connect your wallet in Farcaster first.";
pub const HOST_SIGNER_UNAVAILABLE_MESSAGE: &str =
    "Wallet client not available. Please ensure your wallet is properly connected in Farcaster.";
pub const NOT_CONNECTED_MESSAGE: &str = "Wallet not connected. Please connect your wallet first.";

/// Check that `signer` can pay in `environment`.
pub fn check_wallet(
    environment: ClientEnvironment,
    signer: Option<&dyn WalletSigner>,
) -> Result<(), PaymentFailure> {
    let message = match (environment, signer) {
        (ClientEnvironment::Embedded, None) => Some(CONNECT_IN_HOST_MESSAGE),
        (ClientEnvironment::Embedded, Some(s)) if s.address().is_none() => {
            Some(CONNECT_IN_HOST_MESSAGE)
        }
        (ClientEnvironment::Embedded, Some(s)) if !s.is_ready() => {
            Some(HOST_SIGNER_UNAVAILABLE_MESSAGE)
        }
        (ClientEnvironment::Standalone, None) => Some(NOT_CONNECTED_MESSAGE),
        (ClientEnvironment::Standalone, Some(s)) if !s.is_ready() => Some(NOT_CONNECTED_MESSAGE),
        _ => None,
    };

    match message {
        Some(message) => Err(PaymentFailure::new(FailureKind::Wallet, message)),
        None => Ok(()),
    }
}
