//! # Routes
//!
//! Axum router configuration for the paywall.

use crate::gate;
use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderName, HeaderValue},
    middleware,
    routing::get,
    Router,
};
use tower::Layer;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeFile,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

/// Cache policy for the logo
pub const LOGO_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Create the main application router
///
/// Routes:
/// - Gated (x402):
///   - GET /payment/{tier_id} - Payment confirmation
///
/// - Public:
///   - GET /                            - Landing page
///   - GET /health                      - Health check
///   - GET /.well-known/farcaster.json  - Mini App manifest
///   - GET /logo.png                    - Logo
pub fn create_router(state: AppState) -> Router {
    // Wallet front-ends are served from other origins and need the receipt header
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static("x-payment-response")]);

    let logo = SetResponseHeaderLayer::overriding(
        header::CACHE_CONTROL,
        HeaderValue::from_static(LOGO_CACHE_CONTROL),
    )
    .layer(ServeFile::new(state.config.public_dir.join("logo.png")));

    // Payment routes behind the x402 gate
    let payment_routes = Router::new()
        .route("/payment/{tier_id}", get(handlers::confirm_payment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            gate::x402_gate,
        ));

    Router::new()
        .route("/", get(handlers::landing_page))
        .route("/health", get(handlers::health))
        .route(
            "/.well-known/farcaster.json",
            get(handlers::farcaster_manifest),
        )
        .route_service("/logo.png", logo)
        .merge(payment_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AppConfig, DEFAULT_PAY_TO};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use payx_core::{
        MiniAppManifest, Network, PaymentPayload, PaymentRequired, PaymentRequirements,
        PaymentVerifier, PaywallError, PaywallResult, SettleResponse, TierCatalog,
        VerifyResponse, X402_VERSION,
    };
    use payx_facilitator::FacilitatorConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const PAYER: &str = "0x1111111111111111111111111111111111111111";

    /// Verifier with scripted verdicts that counts its calls
    #[derive(Default)]
    struct ScriptedVerifier {
        reject_with: Option<String>,
        settle_error: Option<String>,
        unreachable: bool,
        verify_calls: AtomicUsize,
        settle_calls: AtomicUsize,
    }

    #[async_trait]
    impl PaymentVerifier for ScriptedVerifier {
        async fn verify(
            &self,
            payload: &PaymentPayload,
            _requirements: &PaymentRequirements,
        ) -> PaywallResult<VerifyResponse> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            if self.unreachable {
                return Err(PaywallError::NetworkError("connection refused".into()));
            }
            Ok(VerifyResponse {
                is_valid: self.reject_with.is_none(),
                invalid_reason: self.reject_with.clone(),
                payer: payload.payer().map(String::from),
            })
        }

        async fn settle(
            &self,
            payload: &PaymentPayload,
            requirements: &PaymentRequirements,
        ) -> PaywallResult<SettleResponse> {
            self.settle_calls.fetch_add(1, Ordering::SeqCst);
            Ok(SettleResponse {
                success: self.settle_error.is_none(),
                error_reason: self.settle_error.clone(),
                payer: payload.payer().map(String::from),
                transaction: self.settle_error.is_none().then(|| "0xfeed".to_string()),
                network: requirements.network.to_string(),
            })
        }

        fn provider_name(&self) -> &'static str {
            "scripted"
        }
    }

    fn config_with(extra: &[(&str, &str)]) -> AppConfig {
        AppConfig::from_lookup(
            |key| match key {
                "BASE_URL" => Some("https://payx.example".to_string()),
                "NETWORK" => Some("base-sepolia".to_string()),
                _ => extra
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| v.to_string()),
            },
            FacilitatorConfig::default(),
        )
        .unwrap()
    }

    fn server_for(config: AppConfig, verifier: Arc<ScriptedVerifier>) -> TestServer {
        let manifest = MiniAppManifest::new("PAYx402", &config.base_url);
        let state = AppState::new(config, TierCatalog::builtin(), manifest, verifier);
        TestServer::new(create_router(state)).unwrap()
    }

    fn server_with(verifier: Arc<ScriptedVerifier>) -> TestServer {
        server_for(config_with(&[]), verifier)
    }

    const PAYMENT: HeaderName = HeaderName::from_static("x-payment");

    fn encode(payload: PaymentPayload) -> HeaderValue {
        HeaderValue::from_str(&payload.to_header().unwrap()).unwrap()
    }

    fn payment_on(network: Network) -> HeaderValue {
        encode(PaymentPayload {
            x402_version: X402_VERSION,
            scheme: "exact".to_string(),
            network,
            payload: serde_json::json!({
                "signature": format!("0x{}", "ab".repeat(65)),
                "authorization": {
                    "from": PAYER,
                    "to": DEFAULT_PAY_TO,
                    "value": "5000000",
                    "validAfter": "0",
                    "validBefore": "9999999999",
                    "nonce": format!("0x{}", "01".repeat(32))
                }
            }),
        })
    }

    fn payment_header() -> HeaderValue {
        payment_on(Network::BaseSepolia)
    }

    #[tokio::test]
    async fn test_challenge_without_payment() {
        let verifier = Arc::new(ScriptedVerifier::default());
        let server = server_with(verifier.clone());

        let response = server.get("/payment/5usdc").await;
        response.assert_status(StatusCode::PAYMENT_REQUIRED);

        let body: PaymentRequired = response.json();
        assert_eq!(body.x402_version, 1);
        assert_eq!(body.error, "X-PAYMENT header is required");
        let req = body.exact_requirement().unwrap();
        assert_eq!(req.max_amount_required, "5000000");
        assert_eq!(req.network, Network::BaseSepolia);
        assert_eq!(req.resource, "https://payx.example/payment/5usdc");
        assert_eq!(req.asset, Network::BaseSepolia.usdc_address());
        assert_eq!(verifier.verify_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_percent_encoded_tier_is_still_gated() {
        let verifier = Arc::new(ScriptedVerifier::default());
        let server = server_with(verifier.clone());

        let response = server.get("/payment/100%75sdc").await;
        response.assert_status(StatusCode::PAYMENT_REQUIRED);

        let body: PaymentRequired = response.json();
        let req = body.exact_requirement().unwrap();
        assert_eq!(req.max_amount_required, "100000000");
        assert_eq!(req.resource, "https://payx.example/payment/100usdc");
        assert_eq!(verifier.verify_calls.load(Ordering::SeqCst), 0);
        assert_eq!(verifier.settle_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_paid_request_is_settled() {
        let verifier = Arc::new(ScriptedVerifier::default());
        let server = server_with(verifier.clone());

        let response = server
            .get("/payment/5usdc")
            .add_header(PAYMENT, payment_header())
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["payment"]["amount"], "5 USDC");
        assert_eq!(body["payment"]["tokens"], "25,000 PAYX");

        let receipt_header = response.header("x-payment-response");
        let receipt = SettleResponse::from_header(receipt_header.to_str().unwrap()).unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.transaction.as_deref(), Some("0xfeed"));
        assert_eq!(receipt.payer.as_deref(), Some(PAYER));
        assert_eq!(verifier.settle_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_payment() {
        let verifier = Arc::new(ScriptedVerifier {
            reject_with: Some("insufficient_funds".to_string()),
            ..Default::default()
        });
        let server = server_with(verifier.clone());

        let response = server
            .get("/payment/1usdc")
            .add_header(PAYMENT, payment_header())
            .await;
        response.assert_status(StatusCode::PAYMENT_REQUIRED);

        let body: PaymentRequired = response.json();
        assert_eq!(body.error, "insufficient_funds");
        assert_eq!(body.payer.as_deref(), Some(PAYER));
        assert_eq!(verifier.settle_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_header() {
        let verifier = Arc::new(ScriptedVerifier::default());
        let server = server_with(verifier.clone());

        let response = server
            .get("/payment/1usdc")
            .add_header(PAYMENT, HeaderValue::from_static("not-a-payment"))
            .await;
        response.assert_status(StatusCode::PAYMENT_REQUIRED);

        let body: PaymentRequired = response.json();
        assert_eq!(body.error, "Invalid or malformed payment header");
        assert_eq!(verifier.verify_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_payload_without_authorization_is_malformed() {
        let verifier = Arc::new(ScriptedVerifier::default());
        let server = server_with(verifier.clone());

        let header = encode(PaymentPayload {
            x402_version: X402_VERSION,
            scheme: "exact".to_string(),
            network: Network::BaseSepolia,
            payload: serde_json::json!({ "signature": "0xsig" }),
        });
        let response = server.get("/payment/1usdc").add_header(PAYMENT, header).await;
        response.assert_status(StatusCode::PAYMENT_REQUIRED);

        let body: PaymentRequired = response.json();
        assert_eq!(body.error, "Invalid or malformed payment header");
        assert_eq!(verifier.verify_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_payment_on_other_network() {
        let verifier = Arc::new(ScriptedVerifier::default());
        let server = server_with(verifier.clone());

        let response = server
            .get("/payment/1usdc")
            .add_header(PAYMENT, payment_on(Network::Base))
            .await;
        response.assert_status(StatusCode::PAYMENT_REQUIRED);

        let body: PaymentRequired = response.json();
        assert_eq!(body.error, "Unable to find matching payment requirements");
        assert_eq!(body.payer.as_deref(), Some(PAYER));
        assert_eq!(verifier.verify_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreachable_facilitator() {
        let verifier = Arc::new(ScriptedVerifier {
            unreachable: true,
            ..Default::default()
        });
        let server = server_with(verifier);

        let response = server
            .get("/payment/10usdc")
            .add_header(PAYMENT, payment_header())
            .await;
        response.assert_status(StatusCode::PAYMENT_REQUIRED);

        let body: PaymentRequired = response.json();
        assert_eq!(body.error, "Network error: connection refused");
        assert_eq!(body.accepts.len(), 1);
    }

    #[tokio::test]
    async fn test_settlement_failure() {
        let verifier = Arc::new(ScriptedVerifier {
            settle_error: Some("unexpected_settle_error".to_string()),
            ..Default::default()
        });
        let server = server_with(verifier);

        let response = server
            .get("/payment/100usdc")
            .add_header(PAYMENT, payment_header())
            .await;
        response.assert_status(StatusCode::PAYMENT_REQUIRED);

        let body: PaymentRequired = response.json();
        assert_eq!(body.error, "unexpected_settle_error");
        assert_eq!(body.payer.as_deref(), Some(PAYER));
        assert!(response.maybe_header("x-payment-response").is_none());
    }

    #[tokio::test]
    async fn test_unknown_tier_is_not_gated() {
        let verifier = Arc::new(ScriptedVerifier::default());
        let server = server_with(verifier.clone());

        let response = server
            .get("/payment/7usdc")
            .add_header(PAYMENT, payment_header())
            .await;
        response.assert_status_not_found();

        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], 404);
        assert_eq!(verifier.verify_calls.load(Ordering::SeqCst), 0);
        assert_eq!(verifier.settle_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_manifest_and_health() {
        let server = server_with(Arc::new(ScriptedVerifier::default()));

        let manifest: serde_json::Value = server.get("/.well-known/farcaster.json").await.json();
        assert_eq!(manifest["frame"]["homeUrl"], "https://payx.example");
        assert_eq!(manifest["frame"]["iconUrl"], "https://payx.example/logo.png");

        let health: serde_json::Value = server.get("/health").await.json();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["network"], "base-sepolia");
        assert_eq!(health["tiers"], 5);
    }

    #[tokio::test]
    async fn test_landing_page_lists_standard_tiers() {
        let server = server_with(Arc::new(ScriptedVerifier::default()));

        let response = server.get("/").await;
        response.assert_status_ok();
        let html = response.text();
        assert_eq!(html.matches(r#"href="/payment/"#).count(), 4);
        assert!(html.contains("100 USDC → 500,000 PAYX"));
        assert!(!html.contains(r#"href="/payment/test""#));
        assert!(response.maybe_header("cache-control").is_none());
    }

    #[tokio::test]
    async fn test_landing_page_is_cached_on_vercel() {
        let server = server_for(
            config_with(&[("VERCEL", "1")]),
            Arc::new(ScriptedVerifier::default()),
        );

        let response = server.get("/").await;
        response.assert_status_ok();
        assert_eq!(response.header("cache-control"), "public, max-age=60");
    }

    #[tokio::test]
    async fn test_logo_is_served_immutable() {
        let public = tempfile::tempdir().unwrap();
        let png = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        std::fs::write(public.path().join("logo.png"), png).unwrap();

        let dir = public.path().to_string_lossy().to_string();
        let server = server_for(
            config_with(&[("PUBLIC_DIR", dir.as_str())]),
            Arc::new(ScriptedVerifier::default()),
        );

        let response = server.get("/logo.png").await;
        response.assert_status_ok();
        assert_eq!(response.header("cache-control"), LOGO_CACHE_CONTROL);
        assert_eq!(response.header("content-type"), "image/png");
        assert_eq!(response.as_bytes().as_ref(), &png[..]);
    }
}
