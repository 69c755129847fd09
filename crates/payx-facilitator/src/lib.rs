//! # payx-facilitator
//!
//! x402 facilitator client for the PAYx402 paywall.
//!
//! The facilitator verifies signed USDC authorizations and settles them on
//! chain. This crate speaks its HTTP API:
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | POST | `/verify` | Check a payment payload against requirements |
//! | POST | `/settle` | Execute a verified payment |
//! | GET | `/supported` | List scheme/network pairs |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use payx_facilitator::FacilitatorClient;
//! use payx_core::PaymentVerifier;
//!
//! let facilitator = FacilitatorClient::from_env()?;
//!
//! let verdict = facilitator.verify(&payload, &requirements).await?;
//! if verdict.is_valid {
//!     let receipt = facilitator.settle(&payload, &requirements).await?;
//! }
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::FacilitatorClient;
pub use config::{FacilitatorConfig, DEFAULT_FACILITATOR_URL};
