//! # Payment Response Classification
//!
//! Turns the final HTTP response of a payment attempt into either the
//! confirmation body or a single user-facing message.

use crate::environment::ClientEnvironment;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const INSUFFICIENT_FUNDS_MESSAGE: &str =
    "Insufficient USDC balance. Please ensure you have enough USDC in your wallet on Base network.";
pub const PAYMENT_REQUIRED_MESSAGE: &str =
    "Payment required. Please complete the payment in your wallet.";
pub const EMBEDDED_PROCESSING_MESSAGE: &str = "Payment transaction is being processed. In Farcaster, transactions may take a bit longer to confirm. Please wait a moment and check your wallet.";
pub const SETTLEMENT_FAILED_MESSAGE: &str = "Payment settlement failed. The transaction may still be processing. Please wait a moment and check your wallet.";
pub const NOT_FOUND_MESSAGE: &str =
    "Payment endpoint not found (404). Please check server configuration.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";

/// Failure categories surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Request never produced a response
    Network,
    /// 402 after the payment round
    PaymentRequired,
    /// 404
    NotFound,
    /// 500
    Server,
    /// Body could not be read as JSON
    Parse,
    /// Any other non-success status
    Http,
    /// Wallet not connected or not ready to sign
    Wallet,
}

/// A failed payment attempt
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct PaymentFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl PaymentFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The request could not reach the server
    pub fn network(cause: impl std::fmt::Display) -> Self {
        Self::new(FailureKind::Network, format!("Network error: {}", cause))
    }
}

/// `Ok(confirmation body)` or the classified failure
pub type PaymentOutcome = Result<Value, PaymentFailure>;

/// Classify a response.
///
/// A successful response yields its JSON body unchanged.
pub fn classify_response(
    status: u16,
    content_type: Option<&str>,
    body: &[u8],
    environment: ClientEnvironment,
) -> PaymentOutcome {
    if (200..300).contains(&status) {
        return serde_json::from_slice(body).map_err(|e| {
            PaymentFailure::new(
                FailureKind::Parse,
                format!("Could not read payment confirmation: {}", e),
            )
        });
    }

    let ErrorBody { data, text } = read_error_body(status, content_type, body);

    let failure = match status {
        402 => PaymentFailure::new(
            FailureKind::PaymentRequired,
            payment_required_message(data.get("error"), environment),
        ),
        404 => PaymentFailure::new(FailureKind::NotFound, NOT_FOUND_MESSAGE),
        500 => PaymentFailure::new(FailureKind::Server, SERVER_ERROR_MESSAGE),
        _ => {
            let message = non_empty_str(data.get("message"))
                .or_else(|| non_empty_str(data.get("error")))
                .map(str::to_string)
                .or_else(|| Some(text.clone()).filter(|t| !t.is_empty()))
                .unwrap_or_else(|| format!("Payment failed with status {}", status));
            PaymentFailure::new(FailureKind::Http, message)
        }
    };
    Err(failure)
}

struct ErrorBody {
    data: Value,
    text: String,
}

fn read_error_body(status: u16, content_type: Option<&str>, body: &[u8]) -> ErrorBody {
    let is_json = content_type
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false);

    if is_json {
        match serde_json::from_slice::<Value>(body) {
            Ok(data) => ErrorBody {
                data,
                text: String::new(),
            },
            Err(_) => ErrorBody {
                data: Value::Object(Default::default()),
                text: format!("Status {}: {}", status, reason_phrase(status)),
            },
        }
    } else {
        let text = String::from_utf8_lossy(body).into_owned();
        ErrorBody {
            data: serde_json::json!({ "message": text }),
            text,
        }
    }
}

/// Reduce the `error` member of a 402 body to text.
fn error_text(error: Option<&Value>) -> String {
    match error {
        // Falsy values carry no text
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Object(obj)) => ["message", "error", "reason"]
            .iter()
            .find_map(|key| non_empty_str(obj.get(*key)))
            .map(str::to_string)
            .or_else(|| serde_json::to_string_pretty(obj).ok())
            .unwrap_or_else(|| "Payment settlement failed".to_string()),
        Some(other) => other.to_string(),
    }
}

fn payment_required_message(error: Option<&Value>, environment: ClientEnvironment) -> String {
    let text = error_text(error);

    if text.contains("insufficient_funds") {
        INSUFFICIENT_FUNDS_MESSAGE.to_string()
    } else if text.contains("X-PAYMENT") {
        PAYMENT_REQUIRED_MESSAGE.to_string()
    } else if !text.trim().is_empty() {
        format!(
            "Payment error: {}. Please check your wallet and try again.",
            text
        )
    } else if environment.is_embedded() {
        EMBEDDED_PROCESSING_MESSAGE.to_string()
    } else {
        SETTLEMENT_FAILED_MESSAGE.to_string()
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown Status",
    }
}
