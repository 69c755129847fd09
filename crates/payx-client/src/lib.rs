//! # payx-client
//!
//! x402 payment client for PAYx402 tier endpoints.
//!
//! The client runs the challenge/response round against the paywall:
//!
//! 1. **Wallet check** - embedded and standalone hosts report different
//!    readiness problems before anything is sent
//! 2. **Challenge** - the 402 reply names the price, asset and recipient
//! 3. **Payment** - the wallet signs, the request is resent with `X-PAYMENT`
//! 4. **Outcome** - the reply is classified into a confirmation or a
//!    user-facing failure message
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use payx_client::{ClientConfig, LocalWalletSigner, PaymentClient};
//! use std::sync::Arc;
//!
//! let wallet = LocalWalletSigner::from_private_key(&key)?;
//! let client = PaymentClient::new(ClientConfig::new("https://payx.example"))?
//!     .with_signer(Arc::new(wallet));
//!
//! // Render attempt state while the payment runs
//! let mut attempts = client.subscribe();
//!
//! match client.make_payment("/payment/5usdc").await {
//!     Ok(paid) => println!("{} (tx {:?})", paid.body["message"], paid.transaction_hash),
//!     Err(failure) => eprintln!("{}", failure),
//! }
//! ```

pub mod attempt;
pub mod client;
pub mod config;
pub mod signer;
pub mod wallet;

// Re-exports
pub use attempt::{AttemptTracker, PaymentAttempt};
pub use client::{PaidResponse, PaymentClient};
pub use config::{ClientConfig, DEFAULT_MAX_PAYMENT};
pub use signer::LocalWalletSigner;
pub use wallet::check_wallet;
