//! # Request Handlers
//!
//! Axum request handlers for the paywall.
//! Gated handlers only run after the x402 gate has verified a payment.

use crate::state::{AppState, APP_NAME};
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use payx_core::{PaymentConfirmation, PaywallError};
use serde::Serialize;
use tracing::{info, instrument};

// =============================================================================
// Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub(crate) fn paywall_error_to_response(err: PaywallError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "payx-paywall",
        "version": env!("CARGO_PKG_VERSION"),
        "network": state.config.network,
        "tiers": state.catalog.active_tiers().count(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Confirmation for a paid tier
#[instrument(skip(state))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(tier_id): Path<String>,
) -> Result<Json<PaymentConfirmation>, (StatusCode, Json<ErrorResponse>)> {
    let tier = state.catalog.get(&tier_id).ok_or_else(|| {
        paywall_error_to_response(PaywallError::TierNotFound {
            tier_id: tier_id.clone(),
        })
    })?;

    info!(
        "Payment confirmed: tier={}, amount={}, tokens={}",
        tier.id,
        tier.amount_label(),
        tier.tokens_label()
    );

    Ok(Json(PaymentConfirmation::for_tier(tier)))
}

/// Farcaster Mini App manifest
pub async fn farcaster_manifest(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.manifest.as_ref().clone())
}

/// Landing page linking the standard tiers; promotional tiers stay unlisted
pub async fn landing_page(State(state): State<AppState>) -> Response {
    let links: String = state
        .catalog
        .active_tiers()
        .filter(|tier| !tier.promotional)
        .map(|tier| {
            format!(
                r#"    <a href="{}">{} → {}</a>"#,
                tier.route(),
                tier.amount_label(),
                tier.tokens_label()
            ) + "\n"
        })
        .collect();

    let page = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{name} - x402 Payment</title>
  <style>
    body {{ font-family: monospace; background: #000814; color: #0052FF; padding: 40px 20px; }}
    .container {{ background: #001d3d; max-width: 700px; margin: 0 auto; padding: 30px; border: 4px solid #0052FF; }}
    a {{ display: block; background: #001845; color: #0052FF; text-decoration: none; padding: 16px 20px; margin-bottom: 16px; border: 3px solid #0052FF; text-align: center; }}
    a:hover {{ background: #0052FF; color: #fff; }}
    .info {{ margin-top: 30px; color: #4d94ff; line-height: 2; }}
  </style>
</head>
<body>
  <div class="container">
    <img src="/logo.png" alt="{name}" width="64" height="64">
    <h1>{name}</h1>
    <p>Buy PAYX Tokens with USDC</p>
{links}    <div class="info">
      <p>Network: {network}</p>
      <p>Choose an amount, approve the USDC payment in your wallet, and the payment is recorded.</p>
      <p>PAYX tokens will be distributed to your wallet later.</p>
    </div>
  </div>
</body>
</html>
"#,
        name = APP_NAME,
        links = links,
        network = state.config.network,
    );

    let mut response = Html(page).into_response();
    if state.config.is_vercel {
        response.headers_mut().insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=60"),
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error", 400).with_details("more");
        assert_eq!(err.error, "Test error");
        assert_eq!(err.code, 400);
        assert_eq!(err.details.as_deref(), Some("more"));
    }

    #[test]
    fn test_paywall_error_conversion() {
        let (status, json) = paywall_error_to_response(PaywallError::TierNotFound {
            tier_id: "7usdc".to_string(),
        });
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json.0.error, "Payment tier not found: 7usdc");
    }
}
