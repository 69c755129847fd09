//! # payx-wasm
//!
//! WebAssembly bindings for the PAYx402 front-end.
//!
//! This crate provides WASM-compatible functions for:
//! - Classifying payment responses into user-facing messages
//! - Detecting whether the page runs inside a Mini App host
//! - Rendering the tier buttons
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { classify_payment_response, detect_environment } from 'payx-wasm';
//!
//! await init();
//!
//! const embedded = detect_environment(location.href, !!document.querySelector('[data-farcaster]')) === 'embedded';
//! const body = new Uint8Array(await response.arrayBuffer());
//! const outcome = classify_payment_response(response.status, response.headers.get('content-type'), body, embedded);
//!
//! if (!outcome.ok) showError(outcome.message);
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

use payx_core::{classify_response, tier::group_thousands, ClientEnvironment, Price, TierCatalog};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Classified payment response for JS callers
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct WasmPaymentOutcome {
    ok: bool,
    kind: Option<String>,
    message: Option<String>,
    body: Option<String>,
}

#[wasm_bindgen]
impl WasmPaymentOutcome {
    #[wasm_bindgen(getter)]
    pub fn ok(&self) -> bool {
        self.ok
    }

    /// Failure kind (`payment_required`, `not_found`, ...)
    #[wasm_bindgen(getter)]
    pub fn kind(&self) -> Option<String> {
        self.kind.clone()
    }

    /// Message to show the user
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> Option<String> {
        self.message.clone()
    }

    /// Confirmation body as JSON text
    #[wasm_bindgen(getter)]
    pub fn body(&self) -> Option<String> {
        self.body.clone()
    }
}

/// Classify a response to a payment request
#[wasm_bindgen]
pub fn classify_payment_response(
    status: u16,
    content_type: Option<String>,
    body: &[u8],
    embedded: bool,
) -> WasmPaymentOutcome {
    let environment = if embedded {
        ClientEnvironment::Embedded
    } else {
        ClientEnvironment::Standalone
    };

    match classify_response(status, content_type.as_deref(), body, environment) {
        Ok(value) => WasmPaymentOutcome {
            ok: true,
            kind: None,
            message: None,
            body: Some(value.to_string()),
        },
        Err(failure) => WasmPaymentOutcome {
            ok: false,
            kind: serde_json::to_value(failure.kind)
                .ok()
                .and_then(|v| v.as_str().map(String::from)),
            message: Some(failure.message),
            body: None,
        },
    }
}

/// `embedded` or `standalone`
#[wasm_bindgen]
pub fn detect_environment(url: &str, has_marker: bool) -> String {
    ClientEnvironment::detect(url, has_marker).as_str().to_string()
}

/// Wallet connector to offer first
#[wasm_bindgen]
pub fn preferred_connector(url: &str, has_marker: bool) -> String {
    ClientEnvironment::detect(url, has_marker)
        .preferred_connector()
        .to_string()
}

/// Format USDC atomic units for display (`10000` → `$0.01`)
#[wasm_bindgen]
pub fn format_price(atomic: u64) -> String {
    Price::from_atomic(atomic).display()
}

/// Format a token count (`25000` → `25,000 PAYX`)
#[wasm_bindgen]
pub fn format_tokens(tokens: u64) -> String {
    format!("{} PAYX", group_thousands(tokens))
}

#[derive(Serialize)]
struct TierButton {
    id: String,
    route: String,
    amount: String,
    tokens: String,
    description: String,
}

/// Built-in tiers as JSON, one entry per payment button
#[wasm_bindgen]
pub fn tier_buttons() -> String {
    let buttons: Vec<TierButton> = TierCatalog::builtin()
        .active_tiers()
        .map(|tier| TierButton {
            id: tier.id.clone(),
            route: tier.route(),
            amount: tier.amount_label(),
            tokens: tier.tokens_label(),
            description: tier.description(),
        })
        .collect();

    serde_json::to_string(&buttons).unwrap_or_else(|_| "[]".to_string())
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use payx_core::classify::{EMBEDDED_PROCESSING_MESSAGE, INSUFFICIENT_FUNDS_MESSAGE};

    #[test]
    fn test_classify_success() {
        let body = br#"{"success":true,"payment":{"amount":"1 USDC"}}"#;
        let outcome =
            classify_payment_response(200, Some("application/json".to_string()), body, false);
        assert!(outcome.ok());
        assert!(outcome.message().is_none());

        let parsed: serde_json::Value = serde_json::from_str(&outcome.body().unwrap()).unwrap();
        assert_eq!(parsed["payment"]["amount"], "1 USDC");
    }

    #[test]
    fn test_classify_payment_required() {
        let body = br#"{"x402Version":1,"error":"insufficient_funds","accepts":[]}"#;
        let outcome =
            classify_payment_response(402, Some("application/json".to_string()), body, false);
        assert!(!outcome.ok());
        assert_eq!(outcome.kind().as_deref(), Some("payment_required"));
        assert_eq!(outcome.message().as_deref(), Some(INSUFFICIENT_FUNDS_MESSAGE));

        let outcome =
            classify_payment_response(402, Some("application/json".to_string()), b"{}", true);
        assert_eq!(outcome.message().as_deref(), Some(EMBEDDED_PROCESSING_MESSAGE));
    }

    #[test]
    fn test_detect_environment() {
        assert_eq!(detect_environment("https://warpcast.com/~/apps", false), "embedded");
        assert_eq!(detect_environment("https://payx.example", true), "embedded");
        assert_eq!(detect_environment("https://payx.example", false), "standalone");
        assert_eq!(preferred_connector("https://payx.example", false), "injected");
        assert_eq!(preferred_connector("https://farcaster.xyz/app", false), "farcaster");
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_price(10_000), "$0.01");
        assert_eq!(format_price(5_000_000), "$5");
        assert_eq!(format_tokens(500_000), "500,000 PAYX");
    }

    #[test]
    fn test_tier_buttons() {
        let buttons: Vec<serde_json::Value> = serde_json::from_str(&tier_buttons()).unwrap();
        assert_eq!(buttons.len(), 5);
        assert_eq!(buttons[0]["route"], "/payment/test");
        assert_eq!(buttons[2]["tokens"], "25,000 PAYX");
    }
}
