//! # Payment Confirmation
//!
//! The canned body returned by a gated route once its payment settles.

use crate::tier::PaymentTier;
use serde::{Deserialize, Serialize};

pub const CONFIRMATION_MESSAGE: &str =
    "Payment confirmed! Your PAYX tokens will be sent to your wallet soon.";

/// Distribution happens out of band; the paywall only records the promise.
pub const CONFIRMATION_STATUS: &str = "Payment recorded - Tokens will be distributed later";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub success: bool,
    pub message: String,
    pub payment: PaymentSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    /// e.g. "5 USDC"
    pub amount: String,
    /// e.g. "25,000 PAYX"
    pub tokens: String,
    pub status: String,
}

impl PaymentConfirmation {
    pub fn for_tier(tier: &PaymentTier) -> Self {
        Self {
            success: true,
            message: CONFIRMATION_MESSAGE.to_string(),
            payment: PaymentSummary {
                amount: tier.amount_label(),
                tokens: tier.tokens_label(),
                status: CONFIRMATION_STATUS.to_string(),
            },
        }
    }
}
