//! # Paywall Error Types
//!
//! Typed error handling for the PAYx402 paywall.
//! All fallible paywall operations return `Result<T, PaywallError>`.

use thiserror::Error;

/// Core error type for all paywall operations
#[derive(Debug, Error)]
pub enum PaywallError {
    /// Configuration errors (missing address, unknown network)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Payment tier not found in catalog
    #[error("Payment tier not found: {tier_id}")]
    TierNotFound { tier_id: String },

    /// Malformed or negative price string
    #[error("Invalid price: {message}")]
    InvalidPrice { message: String },

    /// Network identifier not supported
    #[error("Unsupported network: {network}")]
    UnsupportedNetwork { network: String },

    /// Facilitator API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with the facilitator
    #[error("Network error: {0}")]
    NetworkError(String),

    /// X-PAYMENT header missing or undecodable
    #[error("Invalid payment header: {0}")]
    InvalidPaymentHeader(String),

    /// Facilitator rejected the payment payload
    #[error("Payment verification failed: {reason}")]
    VerificationFailed {
        reason: String,
        payer: Option<String>,
    },

    /// Facilitator could not settle a verified payment
    #[error("Payment settlement failed: {reason}")]
    SettlementFailed {
        reason: String,
        payer: Option<String>,
    },

    /// Requested amount exceeds the client's allowed maximum
    #[error("Payment amount {requested} exceeds allowed maximum {max}")]
    AmountExceedsMaximum { requested: u64, max: u64 },

    /// Wallet signer refused or failed to sign
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PaywallError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaywallError::NetworkError(_) | PaywallError::ProviderError { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaywallError::Configuration(_) => 500,
            PaywallError::InvalidRequest(_) => 400,
            PaywallError::TierNotFound { .. } => 404,
            PaywallError::InvalidPrice { .. } => 400,
            PaywallError::UnsupportedNetwork { .. } => 400,
            PaywallError::ProviderError { .. } => 502,
            PaywallError::NetworkError(_) => 503,
            PaywallError::InvalidPaymentHeader(_) => 402,
            PaywallError::VerificationFailed { .. } => 402,
            PaywallError::SettlementFailed { .. } => 402,
            PaywallError::AmountExceedsMaximum { .. } => 400,
            PaywallError::SigningFailed(_) => 400,
            PaywallError::Internal(_) => 500,
            PaywallError::Serialization(_) => 500,
        }
    }
}

impl From<serde_json::Error> for PaywallError {
    fn from(err: serde_json::Error) -> Self {
        PaywallError::Serialization(err.to_string())
    }
}

/// Result type alias for paywall operations
pub type PaywallResult<T> = Result<T, PaywallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(PaywallError::NetworkError("timeout".into()).is_retryable());
        assert!(PaywallError::ProviderError {
            provider: "facilitator".into(),
            message: "bad gateway".into()
        }
        .is_retryable());
        assert!(!PaywallError::InvalidRequest("bad data".into()).is_retryable());
        assert!(!PaywallError::VerificationFailed {
            reason: "insufficient_funds".into(),
            payer: None,
        }
        .is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PaywallError::TierNotFound {
                tier_id: "x".into()
            }
            .status_code(),
            404
        );
        assert_eq!(
            PaywallError::SettlementFailed {
                reason: "unexpected_settle_error".into(),
                payer: None,
            }
            .status_code(),
            402
        );
        assert_eq!(PaywallError::NetworkError("down".into()).status_code(), 503);
    }
}
