//! # x402 Gate
//!
//! Middleware that holds tier routes behind an x402 payment.
//!
//! ```text
//! request ──▶ X-PAYMENT? ──no──▶ 402 { accepts }
//!                 │ yes
//!                 ▼
//!            decode ──err──▶ 402 "Invalid or malformed payment header"
//!                 ▼
//!            scheme/network ──mismatch──▶ 402 "Unable to find matching payment requirements"
//!                 ▼
//!            verify ──invalid/err──▶ 402 { error, payer }
//!                 ▼
//!            handler ──status ≥ 400──▶ returned unsettled
//!                 ▼
//!            settle ──fail/err──▶ 402 { error }
//!                 ▼
//!            response + X-PAYMENT-RESPONSE
//! ```

use crate::handlers::paywall_error_to_response;
use crate::state::AppState;
use axum::{
    extract::{Path, Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use payx_core::{
    protocol::{MISSING_PAYMENT_ERROR, NO_MATCHING_REQUIREMENTS_ERROR},
    PaymentPayload, PaymentRequired, PaymentRequirements, PaywallError, PaywallResult,
    PAYMENT_HEADER,
};
use tracing::{debug, error, info, warn};

const INVALID_HEADER_ERROR: &str = "Invalid or malformed payment header";

fn payment_required(
    error: impl Into<String>,
    requirements: &PaymentRequirements,
    payer: Option<String>,
) -> Response {
    let body = PaymentRequired::new(error, vec![requirements.clone()]).with_payer(payer);
    (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response()
}

/// 402 carrying the facilitator's reason code, or the error text otherwise
fn reject(err: PaywallError, requirements: &PaymentRequirements) -> Response {
    match err {
        PaywallError::VerificationFailed { reason, payer }
        | PaywallError::SettlementFailed { reason, payer } => {
            payment_required(reason, requirements, payer)
        }
        PaywallError::InvalidPaymentHeader(_) => {
            payment_required(INVALID_HEADER_ERROR, requirements, None)
        }
        other => payment_required(other.to_string(), requirements, None),
    }
}

/// Decode `X-PAYMENT` and check it is a well-formed exact EVM payment
fn decode_payment(header: &HeaderValue) -> PaywallResult<PaymentPayload> {
    let value = header
        .to_str()
        .map_err(|e| PaywallError::InvalidPaymentHeader(e.to_string()))?;
    let payload = PaymentPayload::from_header(value)?;
    payload.as_exact_evm()?;
    Ok(payload)
}

/// Gate a tier route on a verified, settled payment.
///
/// The tier comes from the same decoded path parameter the handler reads.
/// Ids that are not an active tier pass through to the handler's 404.
pub async fn x402_gate(
    State(state): State<AppState>,
    Path(tier_id): Path<String>,
    request: Request,
    next: Next,
) -> Response {
    let Some(tier) = state.catalog.get(&tier_id).cloned() else {
        return next.run(request).await;
    };
    let requirements = state.requirements_for(&tier);

    let Some(header) = request.headers().get(PAYMENT_HEADER) else {
        debug!("No payment for tier {}, issuing challenge", tier.id);
        return payment_required(MISSING_PAYMENT_ERROR, &requirements, None);
    };

    let payload = match decode_payment(header) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Rejected payment header for tier {}: {}", tier.id, e);
            return reject(e, &requirements);
        }
    };

    if !payload.matches(&requirements) {
        warn!(
            "Payment for tier {} is {} on {}, expected {} on {}",
            tier.id, payload.scheme, payload.network, requirements.scheme, requirements.network
        );
        return payment_required(
            NO_MATCHING_REQUIREMENTS_ERROR,
            &requirements,
            payload.payer().map(String::from),
        );
    }

    let verifier = state.verifier.clone();

    let verdict = verifier
        .verify(&payload, &requirements)
        .await
        .and_then(|verdict| verdict.ensure_valid());
    match verdict {
        Ok(verdict) => {
            debug!("Payment verified for tier {}: payer={:?}", tier.id, verdict.payer);
        }
        Err(e) => {
            warn!("Verification via {} failed: {}", verifier.provider_name(), e);
            return reject(e, &requirements);
        }
    }

    let mut response = next.run(request).await;
    if response.status().as_u16() >= 400 {
        warn!(
            "Handler for tier {} returned {}, skipping settlement",
            tier.id,
            response.status()
        );
        return response;
    }

    let receipt = match verifier
        .settle(&payload, &requirements)
        .await
        .and_then(|receipt| receipt.ensure_success())
    {
        Ok(receipt) => receipt,
        Err(e) => {
            error!("Settlement via {} failed: {}", verifier.provider_name(), e);
            return reject(e, &requirements);
        }
    };

    let encoded = match receipt.to_header().and_then(|v| {
        HeaderValue::from_str(&v).map_err(|e| PaywallError::Internal(e.to_string()))
    }) {
        Ok(value) => value,
        Err(e) => {
            error!("Failed to encode settlement receipt: {}", e);
            let err = PaywallError::Internal(format!("Failed to encode settlement receipt: {}", e));
            return paywall_error_to_response(err).into_response();
        }
    };

    info!(
        "Tier {} paid: tx={:?}, payer={:?}",
        tier.id, receipt.transaction, receipt.payer
    );
    response
        .headers_mut()
        .insert(HeaderName::from_static("x-payment-response"), encoded);
    response
}
